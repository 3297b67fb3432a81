//! Notification Bus
//!
//! The bus is a registry of change callbacks, fired whenever any cell's
//! observable state changes. Blocked cells use one-shot subscriptions to
//! retry their evaluation; external observers (a render scheduler, for
//! example) use persistent subscriptions to learn that another pass is
//! worth running.
//!
//! # Delivery discipline
//!
//! `changed` iterates over a snapshot taken at the start of delivery.
//! Callbacks are free to subscribe or unsubscribe (including removing
//! themselves) without corrupting the in-progress delivery. One-shot
//! subscriptions are removed from the registry before their callback runs,
//! so a re-entrant `changed` cannot fire them twice.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;

/// Unique identifier for a bus subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Entry {
    callback: Callback,
    once: bool,
}

/// Insertion-ordered registry of change callbacks.
pub struct Bus {
    subscribers: Mutex<IndexMap<SubscriptionId, Entry>>,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(IndexMap::new()),
        }
    }

    /// Register a callback to run on every change notification.
    ///
    /// Returns a handle that removes the registration when its
    /// [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(self: &Arc<Self>, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.insert(Arc::new(callback), false);
        Subscription {
            id,
            bus: Arc::downgrade(self),
        }
    }

    /// Register a callback that fires on the next notification only.
    ///
    /// Used by cells to retry evaluation once a dependency settles. The
    /// callback only needs `Send`: it lives inside a `Mutex`, which is
    /// `Sync` for any `Send` payload.
    pub(crate) fn subscribe_once<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let slot = Mutex::new(Some(callback));
        self.insert(
            Arc::new(move || {
                if let Some(callback) = slot.lock().take() {
                    callback();
                }
            }),
            true,
        );
    }

    fn insert(&self, callback: Callback, once: bool) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.subscribers
            .lock()
            .insert(id, Entry { callback, once });
        id
    }

    /// Notify every currently registered callback.
    pub fn changed(&self) {
        let snapshot: Vec<Callback> = {
            let mut subscribers = self.subscribers.lock();
            let snapshot = subscribers
                .values()
                .map(|entry| Arc::clone(&entry.callback))
                .collect();
            // One-shot entries are consumed by this delivery; drop them
            // before any callback runs so re-entrant notifications cannot
            // fire them again.
            subscribers.retain(|_, entry| !entry.once);
            snapshot
        };

        for callback in snapshot {
            callback();
        }
    }

    /// Remove every registration. Test/reset utility.
    pub fn clear(&self) {
        self.subscribers.lock().clear();
    }

    /// Number of currently registered callbacks.
    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().shift_remove(&id);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a persistent bus subscription.
pub struct Subscription {
    id: SubscriptionId,
    bus: Weak<Bus>,
}

impl Subscription {
    /// Remove the registration. A no-op if the bus is already gone.
    pub fn unsubscribe(self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }

    /// The identifier of this subscription.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
