//! # relay-server
//!
//! Axum HTTP server and Server-Sent Events fan-out for the chat relay.
//!
//! - [`stream`]: subscriber registry, broadcaster, and keep-alive sessions
//! - [`ingress`]: `send`/`status` record decoding and store mutation
//! - [`http`]: route handlers (`/api/*`, `/health`, `/metrics`)
//! - [`server`]: router assembly, listener, and shared state
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod http;
pub mod ingress;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod stream;

pub use config::ServerConfig;
pub use server::{AppState, RelayServer};
