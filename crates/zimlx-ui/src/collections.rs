//! Collection helpers: key comparators, set toggling and snapshot iteration.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

/// A comparator ordering by the key `extract` returns.
pub fn comparing<T, U, F>(extract: F) -> impl Fn(&T, &T) -> Ordering
where
    U: Ord,
    F: Fn(&T) -> U,
{
    move |a, b| extract(a).cmp(&extract(b))
}

/// Break ties of `first` by the key `extract` returns.
pub fn then_comparing<T, U, C, F>(first: C, extract: F) -> impl Fn(&T, &T) -> Ordering
where
    U: Ord,
    C: Fn(&T, &T) -> Ordering,
    F: Fn(&T) -> U,
{
    move |a, b| first(a, b).then_with(|| extract(a).cmp(&extract(b)))
}

/// Make `set` contain `value` exactly when `present` is true.
///
/// Returns whether the set changed.
pub fn add_or_remove<E: Hash + Eq>(set: &mut HashSet<E>, value: E, present: bool) -> bool {
    if present {
        set.insert(value)
    } else {
        set.remove(&value)
    }
}

/// Collect values from `generator` until it returns `None`.
pub fn list_while_some<T>(generator: impl FnMut() -> Option<T>) -> Vec<T> {
    std::iter::from_fn(generator).collect()
}

/// Run `action` on a snapshot of `items`.
///
/// `action` may add or remove items while the iteration runs; those changes
/// apply to the next call, not to this one.
pub fn safe_for_each<T: Clone>(items: &RefCell<Vec<T>>, mut action: impl FnMut(T)) {
    let snapshot = items.borrow().clone();
    for item in snapshot {
        action(item);
    }
}
