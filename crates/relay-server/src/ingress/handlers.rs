//! Store mutation followed by fan-out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use relay_core::{MessageId, MessageStatus, MessageStore, RelayEvent, StatusEvent};
use serde::Serialize;
use tracing::{debug, info};

use super::record::{SendRecord, StatusUpdate};
use crate::metrics::{MESSAGES_TOTAL, STATUS_UPDATES_TOTAL};
use crate::stream::broadcast::Broadcaster;

/// Response to a successful `send`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    /// Id assigned to the new message.
    pub id: MessageId,
    /// Always `sent`.
    pub status: MessageStatus,
    /// When the message was accepted.
    pub time: DateTime<Utc>,
}

/// Ingress operations over the shared store and broadcaster.
#[derive(Clone)]
pub struct Ingress {
    store: Arc<MessageStore>,
    broadcaster: Arc<Broadcaster>,
}

impl Ingress {
    /// Create ingress over `store` and `broadcaster`.
    pub fn new(store: Arc<MessageStore>, broadcaster: Arc<Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// Append the message and broadcast it as a `message` event.
    ///
    /// The store append happens before the broadcast, so a subscriber never
    /// sees a message the store does not hold.
    pub fn handle_send(&self, record: SendRecord) -> SendReceipt {
        let message = self.store.append(record.user, record.content);
        let receipt = SendReceipt {
            id: message.id.clone(),
            status: message.status,
            time: message.created_at,
        };
        info!(message_id = %receipt.id, user = %message.user, "message received");
        counter!(MESSAGES_TOTAL).increment(1);
        let _ = self.broadcaster.broadcast(&RelayEvent::Message(message));
        receipt
    }

    /// Apply the status and broadcast it as a `status` event.
    ///
    /// The event always goes out: for an id unknown to the store, and for
    /// status text that names no known status (which leaves the store alone).
    pub fn handle_status(&self, update: StatusUpdate) {
        match update.status {
            Some(status) => {
                let found = self
                    .store
                    .update_status(&update.message_id, status, &update.by_user);
                if !found {
                    debug!(message_id = %update.message_id, "status for unknown message");
                }
            }
            None => {
                debug!(
                    message_id = %update.message_id,
                    status = %update.status_text,
                    "unrecognized status, broadcast only"
                );
            }
        }
        let label = update.status.map_or("other", MessageStatus::as_str);
        counter!(STATUS_UPDATES_TOTAL, "status" => label).increment(1);
        let _ = self.broadcaster.broadcast(&RelayEvent::Status(StatusEvent {
            message_id: update.message_id,
            status: update.status_text,
            by_user: update.by_user,
        }));
    }
}
