//! Status feed for observing sync attempts.
//!
//! The feed emits one event per status transition of an attempt, enabling
//! status displays and logging without polling the store.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut subscription = engine.events().subscribe();
//!
//! tokio::spawn(async move {
//!     while let Some(event) = subscription.receiver.recv().await {
//!         println!("{}: {}", event.status, event.message);
//!     }
//! });
//! ```

use parking_lot::RwLock;
use roster_storage::SyncStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A status transition of a sync attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    /// The new status.
    pub status: SyncStatus,
    /// Human-readable detail; empty when there is nothing to add.
    pub message: String,
}

impl SyncEvent {
    /// Creates an event.
    pub fn new(status: SyncStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Identifies a subscription for [`SyncEvents::unsubscribe`].
pub type SubscriptionId = u64;

/// A live subscription to the feed.
#[derive(Debug)]
pub struct Subscription {
    /// Handle for unsubscribing.
    pub id: SubscriptionId,
    /// Receives events emitted after subscribing.
    pub receiver: UnboundedReceiver<SyncEvent>,
}

/// Distributes sync status events to subscribers.
///
/// - Preserves emission order per subscriber
/// - Supports multiple subscribers
/// - Prunes subscribers whose receiver was dropped
/// - Retains the last event for polling
#[derive(Debug, Default)]
pub struct SyncEvents {
    subscribers: RwLock<Vec<(SubscriptionId, UnboundedSender<SyncEvent>)>>,
    last: RwLock<Option<SyncEvent>>,
    next_id: AtomicU64,
}

impl SyncEvents {
    /// Creates an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to the feed.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().push((id, sender));
        Subscription { id, receiver }
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    /// Emits an event to all live subscribers.
    pub fn emit(&self, event: SyncEvent) {
        self.subscribers
            .write()
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
        *self.last.write() = Some(event);
    }

    /// Returns the most recent event.
    pub fn last_event(&self) -> Option<SyncEvent> {
        self.last.read().clone()
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}
