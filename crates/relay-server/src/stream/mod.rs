//! Event-stream plumbing: subscribers, their registry, fan-out, and the
//! per-connection keep-alive session.

pub mod broadcast;
pub mod registry;
pub mod session;
pub mod subscriber;
