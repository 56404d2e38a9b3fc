//! Axum handlers for the relay's HTTP surface.

use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

use crate::health::{self, HealthResponse};
use crate::ingress::{IngressError, SendReceipt, SendRecord, StatusRecord, StatusUpdate};
use crate::metrics;
use crate::server::AppState;
use crate::stream::session::StreamSession;
use crate::stream::subscriber::StreamFrame;

/// POST /api/send
pub async fn send_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SendReceipt>, IngressError> {
    let record =
        SendRecord::from_slice(&body).inspect_err(|e| warn!(error = %e, "rejected send"))?;
    Ok(Json(state.ingress.handle_send(record)))
}

/// POST /api/status
pub async fn update_status(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, IngressError> {
    let record =
        StatusRecord::from_slice(&body).inspect_err(|e| warn!(error = %e, "rejected status"))?;
    state.ingress.handle_status(StatusUpdate::from(record));
    Ok(StatusCode::OK)
}

/// GET /api/stream
///
/// Registers a subscriber and spawns its keep-alive session. The response
/// body ends when the session closes.
pub async fn open_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (session, rx) = StreamSession::open(
        Arc::clone(&state.registry),
        state.config.keepalive_interval,
        state.config.subscriber_buffer,
    );
    let _ = tokio::spawn(session.run(state.shutdown.token()));
    Sse::new(ReceiverStream::new(rx).map(|frame| Ok(sse_event(frame))))
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.registry.len(),
        state.store.len(),
    ))
}

/// GET /metrics
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            metrics::render(handle),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `event: <type>` + `data: <json>` for events, a `: keepalive` comment
/// otherwise.
fn sse_event(frame: StreamFrame) -> Event {
    match frame {
        StreamFrame::Event { kind, data } => Event::default().event(kind.as_str()).data(data),
        StreamFrame::KeepAlive => Event::default().comment("keepalive"),
    }
}
