//! Event fan-out to every registered subscriber.

use std::sync::Arc;

use metrics::counter;
use relay_core::RelayEvent;
use tracing::{debug, warn};

use super::registry::SubscriberRegistry;
use super::subscriber::StreamFrame;
use crate::metrics::{BROADCASTS_TOTAL, BROADCAST_PRUNED_TOTAL};

/// Outcome of one broadcast. Informational: nothing is ever reported back
/// to the ingress caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers that accepted the event.
    pub delivered: usize,
    /// Subscribers whose write failed and were unregistered.
    pub pruned: usize,
}

/// Serializes events once and writes them to every subscriber.
pub struct Broadcaster {
    registry: Arc<SubscriberRegistry>,
}

impl Broadcaster {
    /// Create a broadcaster over `registry`.
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this broadcaster writes to.
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Push `event` to every subscriber registered when the call begins.
    ///
    /// A subscriber whose write fails is unregistered during the same
    /// traversal and gets nothing further. Failures never reach the caller.
    pub fn broadcast(&self, event: &RelayEvent) -> BroadcastReport {
        let kind = event.kind();
        let data: Arc<str> = match event.payload_json() {
            Ok(json) => json.into(),
            Err(e) => {
                warn!(event_type = %kind, error = %e, "failed to serialize event");
                return BroadcastReport::default();
            }
        };
        let frame = StreamFrame::Event { kind, data };

        let mut report = BroadcastReport::default();
        self.registry.for_each(|subscriber| {
            match subscriber.write(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    if self.registry.unregister(&subscriber.id) {
                        report.pruned += 1;
                    }
                    debug!(subscriber_id = %subscriber.id, reason = %e, "pruned subscriber");
                }
            }
        });

        counter!(BROADCASTS_TOTAL, "event" => kind.as_str()).increment(1);
        if report.pruned > 0 {
            counter!(BROADCAST_PRUNED_TOTAL).increment(report.pruned as u64);
        }
        debug!(
            event_type = %kind,
            delivered = report.delivered,
            pruned = report.pruned,
            "broadcast event"
        );
        report
    }
}
