//! A pager adapter over a fixed list of titled pages.

use std::rc::Rc;

use crate::logging::targets;

/// The pager a [`ViewPagerAdapter`] places pages into.
pub trait PagerContainer<V: ?Sized> {
    fn add_page(&self, page: Rc<V>);

    fn remove_page(&self, page: &Rc<V>);
}

/// Serves a fixed list of `(title, page)` pairs to a pager.
#[derive(Debug)]
pub struct ViewPagerAdapter<V: ?Sized> {
    pages: Vec<(String, Rc<V>)>,
}

impl<V: ?Sized> Clone for ViewPagerAdapter<V> {
    fn clone(&self) -> Self {
        Self {
            pages: self.pages.clone(),
        }
    }
}

impl<V: ?Sized> ViewPagerAdapter<V> {
    pub fn new(pages: Vec<(String, Rc<V>)>) -> Self {
        Self { pages }
    }

    pub fn count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_title(&self, position: usize) -> Option<&str> {
        self.pages.get(position).map(|(title, _)| title.as_str())
    }

    /// Add the page at `position` to `container` and return it.
    pub fn instantiate_item(
        &self,
        container: &dyn PagerContainer<V>,
        position: usize,
    ) -> Option<Rc<V>> {
        let Some((_, page)) = self.pages.get(position) else {
            tracing::warn!(
                target: targets::PAGER,
                position,
                count = self.pages.len(),
                "page requested out of range"
            );
            return None;
        };
        container.add_page(Rc::clone(page));
        Some(Rc::clone(page))
    }

    /// Remove a page previously returned by [`instantiate_item`](Self::instantiate_item).
    pub fn destroy_item(&self, container: &dyn PagerContainer<V>, _position: usize, page: &Rc<V>) {
        container.remove_page(page);
    }

    /// Check whether `view` is the page `object` stands for.
    pub fn is_view_from_object(&self, view: &Rc<V>, object: &Rc<V>) -> bool {
        Rc::ptr_eq(view, object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, PartialEq)]
    struct Page(&'static str);

    #[derive(Default)]
    struct Pager {
        shown: RefCell<Vec<Rc<Page>>>,
    }

    impl PagerContainer<Page> for Pager {
        fn add_page(&self, page: Rc<Page>) {
            self.shown.borrow_mut().push(page);
        }

        fn remove_page(&self, page: &Rc<Page>) {
            self.shown.borrow_mut().retain(|p| !Rc::ptr_eq(p, page));
        }
    }

    fn adapter() -> ViewPagerAdapter<Page> {
        ViewPagerAdapter::new(vec![
            ("Apps".to_string(), Rc::new(Page("apps"))),
            ("Work".to_string(), Rc::new(Page("work"))),
        ])
    }

    #[test]
    fn test_titles_and_count() {
        let adapter = adapter();
        assert_eq!(adapter.count(), 2);
        assert_eq!(adapter.page_title(1), Some("Work"));
        assert_eq!(adapter.page_title(2), None);
    }

    #[test]
    fn test_instantiate_and_destroy() {
        let adapter = adapter();
        let pager = Pager::default();

        let work = adapter.instantiate_item(&pager, 1).unwrap();
        assert_eq!(*work, Page("work"));
        assert_eq!(pager.shown.borrow().len(), 1);

        adapter.destroy_item(&pager, 1, &work);
        assert!(pager.shown.borrow().is_empty());
        assert!(adapter.instantiate_item(&pager, 5).is_none());
    }

    #[test]
    fn test_log_target_is_module_path() {
        assert_eq!(targets::PAGER, module_path!());
    }

    #[test]
    fn test_identity_not_equality() {
        let adapter = adapter();
        let pager = Pager::default();
        let apps = adapter.instantiate_item(&pager, 0).unwrap();
        let again = adapter.instantiate_item(&pager, 0).unwrap();
        let lookalike = Rc::new(Page("apps"));

        assert!(adapter.is_view_from_object(&apps, &again));
        assert!(!adapter.is_view_from_object(&apps, &lookalike));
    }
}
