//! Chat message records and delivery status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::MessageId;

/// Delivery state of a message as reported by clients.
///
/// Clients normally move a message `sent → delivered → seen`, but the relay
/// does not police the order: any reported status overwrites the current one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Accepted by the relay.
    #[default]
    Sent,
    /// Received by at least one client.
    Delivered,
    /// Displayed to a reader.
    Seen,
}

impl MessageStatus {
    /// Wire representation (`"sent"`, `"delivered"`, `"seen"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Seen => "seen",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string that is not one of `sent`, `delivered`, `seen`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown message status: {0:?}")]
pub struct ParseStatusError(pub String);

impl FromStr for MessageStatus {
    type Err = ParseStatusError;

    /// Case-insensitive; browsers send `"Seen"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "seen" => Ok(Self::Seen),
            _ => Err(ParseStatusError(s.to_owned())),
        }
    }
}

/// One chat message.
///
/// Serializes to the `message` event payload: `{id, user, content, time, status}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id assigned on append.
    pub id: MessageId,
    /// Display name of the author.
    pub user: String,
    /// Message body, verbatim.
    pub content: String,
    /// When the relay accepted the message.
    #[serde(rename = "time")]
    pub created_at: DateTime<Utc>,
    /// Latest reported delivery status.
    pub status: MessageStatus,
}

impl Message {
    /// Build a freshly sent message stamped with the current time.
    pub fn new(user: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            user: user.into(),
            content: content.into(),
            created_at: Utc::now(),
            status: MessageStatus::Sent,
        }
    }
}

/// A status change announced to every subscriber.
///
/// Never stored. Serializes to `{id, status, byUser}`. `status` is the
/// reported text: a known status in its wire form, anything else verbatim
/// (possibly empty).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Message the status refers to; may be unknown to the store.
    #[serde(rename = "id")]
    pub message_id: MessageId,
    /// Reported status text.
    pub status: String,
    /// Who reported it.
    #[serde(rename = "byUser")]
    pub by_user: String,
}
