//! # relay-core
//!
//! Foundation types for the chat relay.
//!
//! - [`ids`]: branded UUID v7 identifiers for messages and stream subscribers
//! - [`message`]: the [`Message`] record, [`MessageStatus`], and [`StatusEvent`]
//! - [`events`]: [`RelayEvent`], the unit handed to the broadcaster
//! - [`store`]: [`MessageStore`], the append-only in-memory message log
//! - [`logging`]: `tracing` subscriber setup

#![deny(unsafe_code)]

pub mod events;
pub mod ids;
pub mod logging;
pub mod message;
pub mod store;

pub use events::{EventKind, RelayEvent};
pub use ids::{MessageId, SubscriberId};
pub use message::{Message, MessageStatus, ParseStatusError, StatusEvent};
pub use store::MessageStore;
