//! Per-connection stream lifecycle.
//!
//! ```text
//! open():  create sink ─► register ─► Open
//! run():   Open ─► every interval: keep-alive write
//!                    ├─ ok            ─► Open
//!                    ├─ write failed  ─► Closed(Disconnected)
//!                    └─ pruned by a broadcast ─► Closed(Pruned)
//!          Open ─► shutdown token ─► Closed(Shutdown)
//! Closed:  unregister ─► drop sink (ends the client's response stream)
//! ```
//!
//! A vanished client is noticed at the next keep-alive write at the latest,
//! so detection latency is bounded by one interval.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::registry::SubscriberRegistry;
use super::subscriber::{StreamFrame, Subscriber};
use crate::metrics::{
    STREAM_CONNECTIONS_ACTIVE, STREAM_CONNECTIONS_TOTAL, STREAM_DURATION_SECONDS,
};

/// Why a session closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// A keep-alive write failed: the client went away or stopped reading.
    Disconnected,
    /// A broadcast already pruned this subscriber.
    Pruned,
    /// The server is shutting down.
    Shutdown,
}

/// One open event stream, registered with the registry until [`run`] returns.
///
/// [`run`]: StreamSession::run
pub struct StreamSession {
    subscriber: Arc<Subscriber>,
    registry: Arc<SubscriberRegistry>,
    keepalive: Duration,
}

impl StreamSession {
    /// Create a sink holding up to `buffer` frames and register it.
    ///
    /// The returned receiver is the client's side of the stream; it ends once
    /// the session closes and the registry has let go of the subscriber.
    pub fn open(
        registry: Arc<SubscriberRegistry>,
        keepalive: Duration,
        buffer: usize,
    ) -> (Self, mpsc::Receiver<StreamFrame>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let subscriber = registry.register(tx);
        counter!(STREAM_CONNECTIONS_TOTAL).increment(1);
        gauge!(STREAM_CONNECTIONS_ACTIVE).increment(1.0);
        info!(subscriber_id = %subscriber.id, "stream opened");
        let session = Self {
            subscriber,
            registry,
            keepalive,
        };
        (session, rx)
    }

    /// Handle of the registered subscriber.
    pub fn subscriber(&self) -> &Arc<Subscriber> {
        &self.subscriber
    }

    /// Drive keep-alives until the stream closes, then unregister.
    #[instrument(skip_all, fields(subscriber_id = %self.subscriber.id))]
    pub async fn run(self, shutdown: CancellationToken) -> SessionEnd {
        let mut ticker = time::interval(self.keepalive);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        let _ = ticker.tick().await;

        let end = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.registry.contains(&self.subscriber.id) {
                        break SessionEnd::Pruned;
                    }
                    if let Err(e) = self.subscriber.write(StreamFrame::KeepAlive) {
                        debug!(reason = %e, "keep-alive failed");
                        break SessionEnd::Disconnected;
                    }
                }
                () = shutdown.cancelled() => break SessionEnd::Shutdown,
            }
        };

        let _ = self.registry.unregister(&self.subscriber.id);
        gauge!(STREAM_CONNECTIONS_ACTIVE).decrement(1.0);
        histogram!(STREAM_DURATION_SECONDS).record(self.subscriber.age().as_secs_f64());
        info!(?end, frames = self.subscriber.frames_written(), "stream closed");
        end
    }
}
