//! Prometheus metrics recorder and `/metrics` rendering.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the global Prometheus recorder.
///
/// Returns the handle used to render `/metrics`. Call once at startup, before
/// anything is recorded; a second install fails.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric names shared by every recording site.

/// Messages appended through ingress (counter).
pub const MESSAGES_TOTAL: &str = "relay_messages_total";
/// Status updates received through ingress (counter, labels: status).
pub const STATUS_UPDATES_TOTAL: &str = "relay_status_updates_total";
/// Events broadcast (counter, labels: event).
pub const BROADCASTS_TOTAL: &str = "relay_broadcasts_total";
/// Subscribers pruned after a failed broadcast write (counter).
pub const BROADCAST_PRUNED_TOTAL: &str = "relay_broadcast_pruned_total";
/// Event streams opened (counter).
pub const STREAM_CONNECTIONS_TOTAL: &str = "relay_stream_connections_total";
/// Open event streams (gauge).
pub const STREAM_CONNECTIONS_ACTIVE: &str = "relay_stream_connections_active";
/// Event stream lifetime in seconds (histogram).
pub const STREAM_DURATION_SECONDS: &str = "relay_stream_duration_seconds";
