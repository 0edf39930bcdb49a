//! Single-writer, multi-reader signal streams.
//!
//! Each subscriber gets its own queue, so delivery is thread-safe
//! cross-thread posting in emission order, never direct mutation from
//! the emitting thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

type Subscribers<T> = Mutex<Vec<(u64, Sender<T>)>>;

/// A broadcast stream of values. Cloning shares the subscriber list,
/// so the producer side can move into a worker thread.
pub struct Signal<T> {
    subscribers: Arc<Subscribers<T>>,
    next_id: Arc<AtomicU64>,
}

impl<T: Clone> Signal<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register a new observer. The subscription receives every value
    /// emitted after this call, in order.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = unbounded();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push((id, tx));
        Subscription {
            id,
            rx,
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Post a value to every live subscriber. Disconnected receivers
    /// are pruned as a side effect.
    pub fn emit(&self, value: T) {
        let mut subs = self.subscribers.lock();
        subs.retain(|(_, tx)| tx.send(value.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<T: Clone> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

/// A handle on one observer's queue. Unsubscribes on drop or via
/// `unsubscribe`.
pub struct Subscription<T> {
    id: u64,
    rx: Receiver<T>,
    subscribers: Arc<Subscribers<T>>,
}

impl<T> Subscription<T> {
    /// Next value, if one is already queued.
    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Block up to `timeout` for the next value.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }

    /// Explicitly deregister. Dropping the subscription does the same.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.subscribers.lock().retain(|(id, _)| *id != self.id);
    }
}
