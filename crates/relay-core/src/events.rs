//! Events pushed to stream subscribers.

use std::fmt;

use serde::Serialize;

use crate::message::{Message, StatusEvent};

/// Name of a pushed event, used as the SSE `event:` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A new chat message.
    Message,
    /// A delivery status change.
    Status,
}

impl EventKind {
    /// Event name on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One broadcast unit. Built per broadcast call and dropped afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayEvent {
    /// A message was appended to the store.
    Message(Message),
    /// A client reported a status change.
    Status(StatusEvent),
}

impl RelayEvent {
    /// Which named event this is.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Message(_) => EventKind::Message,
            Self::Status(_) => EventKind::Status,
        }
    }

    /// Serialize the payload alone (no envelope); the event name travels
    /// separately in the stream framing.
    pub fn payload_json(&self) -> serde_json::Result<String> {
        match self {
            Self::Message(m) => serde_json::to_string(m),
            Self::Status(s) => serde_json::to_string(s),
        }
    }
}

impl From<Message> for RelayEvent {
    fn from(m: Message) -> Self {
        Self::Message(m)
    }
}

impl From<StatusEvent> for RelayEvent {
    fn from(s: StatusEvent) -> Self {
        Self::Status(s)
    }
}
