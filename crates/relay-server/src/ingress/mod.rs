//! Request ingress: decode a record, mutate the store, broadcast the result.

pub mod handlers;
pub mod record;

pub use handlers::{Ingress, SendReceipt};
pub use record::{IngressError, SendRecord, StatusRecord, StatusUpdate};
