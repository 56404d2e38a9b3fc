//! Set of live stream subscribers.
//!
//! Traversal works on a copy-on-read snapshot: [`SubscriberRegistry::for_each`]
//! clones the `Arc` handles under a short read lock and releases the lock
//! before calling back. Consequences:
//!
//! - the callback may `register`/`unregister` freely (including removing the
//!   subscriber it was just handed) without deadlock, skipping, or visiting
//!   anything twice;
//! - every subscriber registered before the snapshot is visited exactly once;
//!   ones registered afterwards are not visited;
//! - a subscriber unregistered by another thread after the snapshot may still
//!   be visited once. Its sink may still accept the write, which is harmless.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use relay_core::SubscriberId;
use tokio::sync::mpsc;
use tracing::debug;

use super::subscriber::{StreamFrame, Subscriber};

/// Thread-safe subscriber set, keyed by [`SubscriberId`].
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: RwLock<HashMap<SubscriberId, Arc<Subscriber>>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber writing into `tx` and return its handle.
    ///
    /// Registering a sink that is already present returns the existing
    /// handle, so a sink is never in the set twice.
    pub fn register(&self, tx: mpsc::Sender<StreamFrame>) -> Arc<Subscriber> {
        let mut subs = self.subscribers.write();
        if let Some(existing) = subs.values().find(|s| s.uses_sink(&tx)) {
            return Arc::clone(existing);
        }
        let subscriber = Arc::new(Subscriber::new(tx));
        let _ = subs.insert(subscriber.id.clone(), Arc::clone(&subscriber));
        debug!(subscriber_id = %subscriber.id, live = subs.len(), "subscriber registered");
        subscriber
    }

    /// Remove a subscriber. Returns whether it was present; removing an
    /// absent id is a no-op.
    pub fn unregister(&self, id: &SubscriberId) -> bool {
        let mut subs = self.subscribers.write();
        let removed = subs.remove(id).is_some();
        if removed {
            debug!(subscriber_id = %id, live = subs.len(), "subscriber unregistered");
        }
        removed
    }

    /// Call `f` once for each subscriber registered when the call began.
    pub fn for_each(&self, mut f: impl FnMut(&Arc<Subscriber>)) {
        for subscriber in &self.snapshot() {
            f(subscriber);
        }
    }

    /// Handles of every subscriber registered right now.
    pub fn snapshot(&self) -> Vec<Arc<Subscriber>> {
        self.subscribers.read().values().cloned().collect()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.subscribers.read().contains_key(id)
    }

    /// Ids of every registered subscriber, unordered.
    pub fn ids(&self) -> Vec<SubscriberId> {
        self.subscribers.read().keys().cloned().collect()
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
