//! One connected event-stream client.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use relay_core::{EventKind, SubscriberId};
use thiserror::Error;
use tokio::sync::mpsc;

/// A unit written to a subscriber's sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamFrame {
    /// A named event with its serialized payload. The payload is shared by
    /// every subscriber of one broadcast.
    Event {
        /// Event name.
        kind: EventKind,
        /// JSON payload.
        data: Arc<str>,
    },
    /// No-op write used to probe liveness.
    KeepAlive,
}

/// Why a write to a subscriber's sink failed. Either way the subscriber is
/// treated as gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The receiving side (the client's response stream) was dropped.
    #[error("subscriber stream closed")]
    Closed,
    /// The client stopped draining its buffer.
    #[error("subscriber buffer full")]
    Full,
}

/// A connected stream client: its output sink plus liveness bookkeeping.
///
/// Identity is the sink. The registry hands out `Arc<Subscriber>` handles;
/// the receiving half of the sink backs the client's response body.
#[derive(Debug)]
pub struct Subscriber {
    /// Registry key.
    pub id: SubscriberId,
    tx: mpsc::Sender<StreamFrame>,
    /// When the stream opened.
    pub connected_at: Instant,
    frames_written: AtomicU64,
}

impl Subscriber {
    /// Wrap a sink under a fresh id.
    pub fn new(tx: mpsc::Sender<StreamFrame>) -> Self {
        Self {
            id: SubscriberId::new(),
            tx,
            connected_at: Instant::now(),
            frames_written: AtomicU64::new(0),
        }
    }

    /// Non-blocking write of one frame.
    pub fn write(&self, frame: StreamFrame) -> Result<(), WriteError> {
        match self.tx.try_send(frame) {
            Ok(()) => {
                let _ = self.frames_written.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(WriteError::Closed),
            Err(mpsc::error::TrySendError::Full(_)) => Err(WriteError::Full),
        }
    }

    /// Whether this subscriber writes into `tx`.
    pub fn uses_sink(&self, tx: &mpsc::Sender<StreamFrame>) -> bool {
        self.tx.same_channel(tx)
    }

    /// Frames successfully written, keep-alives included.
    pub fn frames_written(&self) -> u64 {
        self.frames_written.load(Ordering::Relaxed)
    }

    /// Time since the stream opened.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
