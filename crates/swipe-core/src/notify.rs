#![forbid(unsafe_code)]

//! Change notification for engine state.
//!
//! [`Listeners<T>`] holds subscriber callbacks as weak references. The
//! strong side lives in the [`Subscription`] guard handed back to the caller,
//! so dropping the guard unsubscribes without touching the listener list.
//! Dead entries are pruned lazily on the next [`notify`](Listeners::notify).
//!
//! # Invariants
//!
//! 1. `version` increments by exactly 1 on each `notify()`, with or without
//!    live subscribers.
//! 2. Subscribers are notified in registration order.
//! 3. A callback is never invoked after its guard has been dropped.
//!
//! # Failure Modes
//!
//! - **Re-entrant mutation**: a callback that reaches back into the engine
//!   that owns these listeners (for example through an `Rc<RefCell<_>>`)
//!   will hit a borrow panic. Subscribers should only read the snapshot.

use std::any::Any;
use std::rc::{Rc, Weak};

use tracing::trace_span;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// Ordered list of weakly held subscriber callbacks.
pub struct Listeners<T> {
    subscribers: Vec<CallbackWeak<T>>,
    version: u64,
}

impl<T> std::fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("subscriber_count", &self.subscribers.len())
            .field("version", &self.version)
            .finish()
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Listeners<T> {
    /// Create an empty listener list at version 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            version: 0,
        }
    }

    /// Number of `notify()` calls so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: 'static> Listeners<T> {
    /// Register a callback. It stays registered while the returned guard is
    /// alive.
    pub fn subscribe(&mut self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.subscribers.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Bump the version and deliver `value` to every live subscriber.
    pub fn notify(&mut self, value: &T) {
        self.version += 1;

        self.subscribers.retain(|w| w.strong_count() > 0);
        if self.subscribers.is_empty() {
            return;
        }

        // Upgrade up front so a guard dropped mid-propagation cannot shift
        // the iteration.
        let callbacks: Vec<CallbackRc<T>> =
            self.subscribers.iter().filter_map(Weak::upgrade).collect();

        let _span = trace_span!(
            "swipe.notify",
            version = self.version,
            subscribers = callbacks.len()
        )
        .entered();

        for cb in &callbacks {
            cb(value);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping it releases the only strong reference to the callback, so the
/// weak entry in the listener list can no longer be upgraded.
pub struct Subscription {
    _guard: Box<dyn Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn notify_reaches_subscriber_with_value() {
        let mut listeners = Listeners::new();
        let last_seen = Rc::new(Cell::new(0));
        let last_clone = Rc::clone(&last_seen);

        let _sub = listeners.subscribe(move |val: &i32| last_clone.set(*val));

        listeners.notify(&42);
        assert_eq!(last_seen.get(), 42);

        listeners.notify(&7);
        assert_eq!(last_seen.get(), 7);
    }

    #[test]
    fn version_counts_every_notify() {
        let mut listeners: Listeners<u8> = Listeners::new();
        assert_eq!(listeners.version(), 0);
        for _ in 0..5 {
            listeners.notify(&0);
        }
        assert_eq!(listeners.version(), 5);
    }

    #[test]
    fn subscription_drop_unsubscribes() {
        let mut listeners = Listeners::new();
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);

        let sub = listeners.subscribe(move |_: &()| count_clone.set(count_clone.get() + 1));

        listeners.notify(&());
        assert_eq!(count.get(), 1);

        drop(sub);

        listeners.notify(&());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dead_subscribers_pruned_on_notify() {
        let mut listeners = Listeners::new();
        let _s1 = listeners.subscribe(|_: &()| {});
        let s2 = listeners.subscribe(|_: &()| {});
        assert_eq!(listeners.subscriber_count(), 2);

        drop(s2);
        // Not yet pruned.
        assert_eq!(listeners.subscriber_count(), 2);

        listeners.notify(&());
        assert_eq!(listeners.subscriber_count(), 1);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let mut listeners = Listeners::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let log1 = Rc::clone(&log);
        let _s1 = listeners.subscribe(move |_: &()| log1.borrow_mut().push('A'));
        let log2 = Rc::clone(&log);
        let _s2 = listeners.subscribe(move |_: &()| log2.borrow_mut().push('B'));
        let log3 = Rc::clone(&log);
        let _s3 = listeners.subscribe(move |_: &()| log3.borrow_mut().push('C'));

        listeners.notify(&());
        assert_eq!(*log.borrow(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn debug_format_reports_counts() {
        let mut listeners: Listeners<u8> = Listeners::new();
        let _sub = listeners.subscribe(|_| {});
        listeners.notify(&1);
        let dbg = format!("{listeners:?}");
        assert!(dbg.contains("subscriber_count: 1"));
        assert!(dbg.contains("version: 1"));
    }
}
