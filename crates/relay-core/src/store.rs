//! Append-only in-memory message log.
//!
//! The log is never pruned or capped; it lives as long as the process. All
//! synchronization is internal, so callers share a `MessageStore` behind an
//! `Arc` without any locking of their own. Messages never leave the store by
//! reference: every read hands back clones.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::ids::MessageId;
use crate::message::{Message, MessageStatus};

#[derive(Default)]
struct Log {
    messages: Vec<Message>,
    /// Position of each message in `messages`.
    index: HashMap<MessageId, usize>,
}

/// Thread-safe message log.
#[derive(Default)]
pub struct MessageStore {
    log: RwLock<Log>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new `sent` message and return a copy of it.
    pub fn append(&self, user: impl Into<String>, content: impl Into<String>) -> Message {
        let message = Message::new(user, content);
        let mut log = self.log.write();
        let position = log.messages.len();
        let _ = log.index.insert(message.id.clone(), position);
        log.messages.push(message.clone());
        debug!(message_id = %message.id, position, "message appended");
        message
    }

    /// Overwrite the status of message `id`.
    ///
    /// Returns `false` and leaves the log untouched when the id is unknown.
    /// `by_user` is only recorded in the trace; the store keeps the latest
    /// status, not who set it.
    pub fn update_status(&self, id: &MessageId, status: MessageStatus, by_user: &str) -> bool {
        let mut log = self.log.write();
        let Some(&position) = log.index.get(id) else {
            debug!(message_id = %id, %status, by_user, "status update for unknown message");
            return false;
        };
        let previous = std::mem::replace(&mut log.messages[position].status, status);
        debug!(message_id = %id, from = %previous, to = %status, by_user, "message status updated");
        true
    }

    /// Copy of the message with `id`, if present.
    pub fn get(&self, id: &MessageId) -> Option<Message> {
        let log = self.log.read();
        log.index.get(id).map(|&i| log.messages[i].clone())
    }

    /// Copy of the whole log, in append order.
    pub fn snapshot(&self) -> Vec<Message> {
        self.log.read().messages.clone()
    }

    /// Number of messages ever appended.
    pub fn len(&self) -> usize {
        self.log.read().messages.len()
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
