//! Helpers over the host view tree.
//!
//! Host views are shared, interior-mutable objects owned by the UI thread,
//! reached here through [`View`] and [`ViewGroup`] handles.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::iter::FusedIterator;
use std::rc::Rc;

use crate::logging::targets;

/// Whether a view is drawn and whether it takes up layout space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Visible,
    /// Hidden but still laid out.
    Invisible,
    /// Hidden and not laid out.
    Gone,
}

/// A node of the view tree.
pub trait View {
    fn visibility(&self) -> Visibility;

    fn set_visibility(&self, visibility: Visibility);

    /// This view as a group, if it has children.
    fn as_group(&self) -> Option<&dyn ViewGroup> {
        None
    }
}

/// A view that contains child views.
pub trait ViewGroup: View {
    fn child_count(&self) -> usize;

    fn child_at(&self, index: usize) -> Option<Rc<dyn View>>;
}

/// Check whether `view` is visible.
pub fn is_visible(view: &dyn View) -> bool {
    view.visibility() == Visibility::Visible
}

/// Show `view`, or hide it without keeping its layout space.
pub fn set_visible(view: &dyn View, visible: bool) {
    view.set_visibility(if visible {
        Visibility::Visible
    } else {
        Visibility::Gone
    });
}

/// Iterator over the direct children of a group.
///
/// Positions the group reports as empty are skipped.
pub struct Children<'a> {
    group: &'a dyn ViewGroup,
    front: usize,
    back: usize,
}

impl fmt::Debug for Children<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Children")
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}

impl Iterator for Children<'_> {
    type Item = Rc<dyn View>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            let child = self.group.child_at(self.front);
            self.front += 1;
            if child.is_some() {
                return child;
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.back - self.front))
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            self.back -= 1;
            let child = self.group.child_at(self.back);
            if child.is_some() {
                return child;
            }
        }
        None
    }
}

impl FusedIterator for Children<'_> {}

/// The direct children of `group`, first to last.
pub fn children(group: &dyn ViewGroup) -> Children<'_> {
    Children {
        group,
        front: 0,
        back: group.child_count(),
    }
}

pub fn for_each_child(group: &dyn ViewGroup, mut action: impl FnMut(&Rc<dyn View>)) {
    children(group).for_each(|child| action(&child));
}

/// Children paired with their positions in the group.
fn indexed(
    group: &dyn ViewGroup,
) -> impl DoubleEndedIterator<Item = (usize, Rc<dyn View>)> + '_ {
    (0..group.child_count())
        .filter_map(move |index| group.child_at(index).map(|child| (index, child)))
}

/// Visit children first to last. Indices are positions in the group.
pub fn for_each_child_indexed(group: &dyn ViewGroup, mut action: impl FnMut(&Rc<dyn View>, usize)) {
    indexed(group).for_each(|(index, child)| action(&child, index));
}

pub fn for_each_child_reversed(group: &dyn ViewGroup, mut action: impl FnMut(&Rc<dyn View>)) {
    children(group).rev().for_each(|child| action(&child));
}

/// Visit children last to first. Indices are positions in the group.
pub fn for_each_child_reversed_indexed(
    group: &dyn ViewGroup,
    mut action: impl FnMut(&Rc<dyn View>, usize),
) {
    indexed(group)
        .rev()
        .for_each(|(index, child)| action(&child, index));
}

/// Every non-group descendant of `group`, depth first.
pub fn all_leaf_children(group: &dyn ViewGroup) -> Vec<Rc<dyn View>> {
    let mut leaves = Vec::new();
    collect_leaves(group, &mut leaves);
    leaves
}

fn collect_leaves(group: &dyn ViewGroup, out: &mut Vec<Rc<dyn View>>) {
    for child in children(group) {
        match child.as_group() {
            Some(nested) => collect_leaves(nested, out),
            None => out.push(Rc::clone(&child)),
        }
    }
}

type AttachCallback = Box<dyn FnOnce()>;

/// Tracks a view's window attachment and defers work until it is attached.
#[derive(Default)]
pub struct AttachNotifier {
    attached: Cell<bool>,
    pending: RefCell<Vec<AttachCallback>>,
}

impl fmt::Debug for AttachNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachNotifier")
            .field("attached", &self.attached.get())
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

impl AttachNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// Run `callback` now if attached, otherwise on the next attach.
    ///
    /// A detach before that attach drops the callback unrun.
    pub fn run_on_attached(&self, callback: impl FnOnce() + 'static) {
        if self.attached.get() {
            callback();
        } else {
            self.pending.borrow_mut().push(Box::new(callback));
        }
    }

    /// Mark the view attached and run the pending callbacks.
    pub fn dispatch_attached(&self) {
        self.attached.set(true);
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for callback in pending {
            callback();
        }
    }

    /// Mark the view detached, dropping pending callbacks.
    pub fn dispatch_detached(&self) {
        self.attached.set(false);
        let dropped = std::mem::take(&mut *self.pending.borrow_mut());
        if !dropped.is_empty() {
            tracing::trace!(
                target: targets::VIEW,
                count = dropped.len(),
                "detached before attach callbacks ran"
            );
        }
    }
}
