//! Selection change observers.
//!
//! Observers watch a selection handler for transitions. Each transition
//! runs in two phases:
//!
//! 1. **Veto**: every observer's [`before_change`] is asked; the first
//!    `false` aborts the transition and the handler's state is untouched
//! 2. **Notify**: once the new selection is installed, every observer's
//!    [`after_change`] sees the old and new snapshots
//!
//! Observers must not call back into the handler that is notifying them.
//! No ordering is guaranteed between observers.
//!
//! [`before_change`]: SelectionObserver::before_change
//! [`after_change`]: SelectionObserver::after_change

use slotmap::{SlotMap, new_key_type};

use crate::selection::Selection;

new_key_type! {
    /// A unique identifier for a registered observer.
    ///
    /// Use this ID to remove a specific observer via
    /// [`ObserverList::remove`]. The ID remains valid until the observer
    /// is explicitly removed or the handler is dropped.
    pub struct ObserverId;
}

/// Watches selection transitions, with an optional veto.
///
/// Both methods have default implementations, so an observer can
/// implement only the phase it cares about.
pub trait SelectionObserver<T, I>: Send + Sync {
    /// Called before a transition is committed. Returning `false` vetoes
    /// the change; the handler keeps `old` and reports `Ok(false)`.
    fn before_change(&self, old: &Selection<T, I>, new: &Selection<T, I>) -> bool {
        let _ = (old, new);
        true
    }

    /// Called after a transition has been committed.
    fn after_change(&self, old: &Selection<T, I>, new: &Selection<T, I>) {
        let _ = (old, new);
    }
}

/// Observer built from a notify closure. See [`ObserverList::on_change`].
struct FnObserver<F> {
    callback: F,
}

impl<T, I, F> SelectionObserver<T, I> for FnObserver<F>
where
    F: Fn(&Selection<T, I>, &Selection<T, I>) + Send + Sync,
{
    fn after_change(&self, old: &Selection<T, I>, new: &Selection<T, I>) {
        (self.callback)(old, new)
    }
}

/// The set of observers registered with a handler.
pub struct ObserverList<T, I> {
    observers: SlotMap<ObserverId, Box<dyn SelectionObserver<T, I>>>,
}

impl<T, I> ObserverList<T, I> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            observers: SlotMap::with_key(),
        }
    }

    /// Registers an observer and returns its removal id.
    pub fn add(&mut self, observer: Box<dyn SelectionObserver<T, I>>) -> ObserverId {
        self.observers.insert(observer)
    }

    /// Registers a notify-only closure observer.
    pub fn on_change<F>(&mut self, callback: F) -> ObserverId
    where
        F: Fn(&Selection<T, I>, &Selection<T, I>) + Send + Sync + 'static,
    {
        self.add(Box::new(FnObserver { callback }))
    }

    /// Removes an observer by id.
    ///
    /// Returns `true` if the observer was found and removed.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id).is_some()
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Runs the veto phase. Stops at the first observer that rejects.
    pub fn approves(&self, old: &Selection<T, I>, new: &Selection<T, I>) -> bool {
        self.observers
            .iter()
            .all(|(_, observer)| observer.before_change(old, new))
    }

    /// Runs the notify phase.
    pub fn notify(&self, old: &Selection<T, I>, new: &Selection<T, I>) {
        for (_, observer) in self.observers.iter() {
            observer.after_change(old, new);
        }
    }
}

impl<T, I> Default for ObserverList<T, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, I> std::fmt::Debug for ObserverList<T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Rejecting;

    impl SelectionObserver<i64, u64> for Rejecting {
        fn before_change(&self, _old: &Selection<i64, u64>, _new: &Selection<i64, u64>) -> bool {
            false
        }
    }

    #[test]
    fn test_empty_list_approves() {
        let list: ObserverList<i64, u64> = ObserverList::new();
        assert!(list.approves(&Selection::empty(), &Selection::from_items(vec![1])));
    }

    #[test]
    fn test_single_veto_rejects() {
        let mut list: ObserverList<i64, u64> = ObserverList::new();
        list.on_change(|_, _| {});
        list.add(Box::new(Rejecting));
        assert!(!list.approves(&Selection::empty(), &Selection::from_items(vec![1])));
    }

    #[test]
    fn test_notify_reaches_all_observers() {
        let mut list: ObserverList<i64, u64> = ObserverList::new();
        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let calls = calls.clone();
            list.on_change(move |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }
        list.notify(&Selection::empty(), &Selection::from_items(vec![7]));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_removed_observer_is_not_called() {
        let mut list: ObserverList<i64, u64> = ObserverList::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = list.on_change(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(list.remove(id));
        assert!(!list.remove(id));
        list.notify(&Selection::empty(), &Selection::empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
