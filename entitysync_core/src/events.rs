//! Minimal typed pub/sub with synchronous dispatch, used to observe
//! `synchronized`, `clientSentMessages`, and `serverSentMessages` without
//! coupling callers to a specific endpoint's internals.

use parking_lot::Mutex;
use std::sync::Arc;

type Listener<E> = Box<dyn Fn(&E) + Send + Sync>;

/// A single event channel for payload type `E`. Subscribers are invoked
/// synchronously, in subscription order, on the thread that calls
/// [`EventEmitter::emit`] — there is no queuing or cross-thread dispatch,
/// consistent with a single-threaded cooperative model.
pub struct EventEmitter<E> {
    listeners: Mutex<Vec<Listener<E>>>,
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl<E> EventEmitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) {
        self.listeners.lock().push(Box::new(listener));
    }

    pub fn emit(&self, event: &E) {
        for listener in self.listeners.lock().iter() {
            listener(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// Convenience alias for sharing one emitter between an endpoint and its
/// observers without cloning the listener list.
pub type SharedEventEmitter<E> = Arc<EventEmitter<E>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use test_log::test;

    #[test]
    fn listeners_are_invoked_synchronously_on_emit() {
        let emitter: EventEmitter<u32> = EventEmitter::new();
        let total = Arc::new(AtomicU32::new(0));
        let total_clone = total.clone();
        emitter.subscribe(move |n| {
            total_clone.fetch_add(*n, Ordering::SeqCst);
        });
        emitter.emit(&5);
        emitter.emit(&7);
        assert_eq!(total.load(Ordering::SeqCst), 12);
    }
}
