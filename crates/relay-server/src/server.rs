//! `RelayServer`: Axum HTTP server wiring store, registry, and broadcaster.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use relay_core::MessageStore;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::http;
use crate::ingress::Ingress;
use crate::shutdown::ShutdownCoordinator;
use crate::stream::broadcast::Broadcaster;
use crate::stream::registry::SubscriberRegistry;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Message log.
    pub store: Arc<MessageStore>,
    /// Live stream subscribers.
    pub registry: Arc<SubscriberRegistry>,
    /// Send/status operations.
    pub ingress: Ingress,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Runtime configuration.
    pub config: Arc<ServerConfig>,
    /// Prometheus handle backing `/metrics`, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

/// The relay server.
pub struct RelayServer {
    config: Arc<ServerConfig>,
    store: Arc<MessageStore>,
    registry: Arc<SubscriberRegistry>,
    broadcaster: Arc<Broadcaster>,
    ingress: Ingress,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    metrics: Option<PrometheusHandle>,
}

impl RelayServer {
    /// Create a server with an empty store and no subscribers.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(MessageStore::new());
        let registry = Arc::new(SubscriberRegistry::new());
        let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&registry)));
        let ingress = Ingress::new(Arc::clone(&store), Arc::clone(&broadcaster));
        Self {
            config: Arc::new(config),
            store,
            registry,
            broadcaster,
            ingress,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Serve `/metrics` from `handle`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            store: Arc::clone(&self.store),
            registry: Arc::clone(&self.registry),
            ingress: self.ingress.clone(),
            shutdown: Arc::clone(&self.shutdown),
            start_time: self.start_time,
            config: Arc::clone(&self.config),
            metrics: self.metrics.clone(),
        };

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = Router::new()
            .route("/api/send", post(http::send_message))
            .route("/api/status", post(http::update_status))
            .route("/api/stream", get(http::open_stream))
            .route("/health", get(http::health_handler))
            .route("/metrics", get(http::render_metrics))
            .with_state(state);

        let router = match &self.config.static_dir {
            Some(dir) => router.fallback_service(ServeDir::new(dir)),
            None => router,
        };

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until shutdown is signalled.
    ///
    /// Returns the bound address (useful with port `0`) and the serve task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await });
            if let Err(e) = serve.await {
                error!(error = %e, "server error");
            }
            info!("server stopped");
        });

        info!(%addr, "relay listening");
        Ok((addr, handle))
    }

    /// Get the message store.
    pub fn store(&self) -> &Arc<MessageStore> {
        &self.store
    }

    /// Get the subscriber registry.
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Get the broadcaster.
    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Get the ingress operations.
    pub fn ingress(&self) -> &Ingress {
        &self.ingress
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use futures::StreamExt;
    use tower::ServiceExt;

    use crate::ingress::SendRecord;

    fn make_server() -> RelayServer {
        RelayServer::new(ServerConfig::default())
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn send_returns_receipt_and_stores() {
        let server = make_server();
        let resp = server
            .router()
            .oneshot(post("/api/send", r#"{"user":"alice","content":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v = json_body(resp).await;
        assert_eq!(v["status"], "sent");
        assert!(v["id"].is_string());
        assert!(v["time"].is_string());
        assert_eq!(server.store().len(), 1);
        assert_eq!(server.store().snapshot()[0].user, "alice");
    }

    #[tokio::test]
    async fn send_ignores_content_type() {
        let server = make_server();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/send")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(r#"{"content":"no user"}"#))
            .unwrap();
        let resp = server.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(server.store().snapshot()[0].user, "");
    }

    #[tokio::test]
    async fn send_rejects_non_object() {
        let server = make_server();
        let resp = server
            .router()
            .oneshot(post("/api/send", "[1,2,3]"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(resp).await["error"].is_string());
        assert!(server.store().is_empty());
    }

    #[tokio::test]
    async fn status_updates_known_message() {
        let server = make_server();
        let receipt = server.ingress().handle_send(SendRecord {
            user: "alice".into(),
            content: "hi".into(),
        });
        let body = format!(r#"{{"id":"{}","status":"Seen","byUser":"bob"}}"#, receipt.id);
        let resp = server
            .router()
            .oneshot(post("/api/status", &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            server.store().get(&receipt.id).unwrap().status,
            relay_core::MessageStatus::Seen
        );
    }

    #[tokio::test]
    async fn status_with_unknown_id_is_ok() {
        let server = make_server();
        let resp = server
            .router()
            .oneshot(post(
                "/api/status",
                r#"{"id":"missing","status":"delivered","byUser":"bob"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn status_without_status_field_reaches_stream() {
        let server = make_server();
        let resp = server.router().oneshot(get("/api/stream")).await.unwrap();
        let mut stream = resp.into_body().into_data_stream();

        let resp = server
            .router()
            .oneshot(post("/api/status", r#"{"id":"m1","byUser":"carol"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let text = String::from_utf8(chunk.to_vec()).unwrap();
        assert_eq!(
            text,
            "event: status\ndata: {\"id\":\"m1\",\"status\":\"\",\"byUser\":\"carol\"}\n\n"
        );
    }

    #[tokio::test]
    async fn status_with_unrecognized_text_is_accepted() {
        let server = make_server();
        let receipt = server.ingress().handle_send(SendRecord::default());
        let body = format!(r#"{{"id":"{}","status":"read"}}"#, receipt.id);
        let resp = server
            .router()
            .oneshot(post("/api/status", &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            server.store().get(&receipt.id).unwrap().status,
            relay_core::MessageStatus::Sent
        );
    }

    #[tokio::test]
    async fn ingress_routes_reject_get() {
        let server = make_server();
        for uri in ["/api/send", "/api/status"] {
            let resp = server.router().oneshot(get(uri)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        }
    }

    #[tokio::test]
    async fn stream_delivers_named_events() {
        let server = make_server();
        let resp = server.router().oneshot(get("/api/stream")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(server.registry().len(), 1);

        let _ = server.ingress().handle_send(SendRecord {
            user: "alice".into(),
            content: "hello".into(),
        });

        let mut body = resp.into_body().into_data_stream();
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let text = String::from_utf8(chunk.to_vec()).unwrap();
        assert!(text.starts_with("event: message\ndata: {"), "{text}");
        assert!(text.contains(r#""content":"hello""#), "{text}");
        assert!(text.ends_with("\n\n"), "{text}");
    }

    #[tokio::test]
    async fn shutdown_ends_open_streams() {
        let server = make_server();
        let resp = server.router().oneshot(get("/api/stream")).await.unwrap();
        let mut body = resp.into_body().into_data_stream();

        server.shutdown().shutdown();
        let end = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .unwrap();
        assert!(end.is_none());
        assert!(server.registry().is_empty());
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let server = make_server();
        let _ = server.ingress().handle_send(SendRecord::default());
        let resp = server.router().oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v = json_body(resp).await;
        assert_eq!(v["status"], "ok");
        assert_eq!(v["messages"], 1);
        assert_eq!(v["connections"], 0);
    }

    #[tokio::test]
    async fn metrics_without_recorder_is_not_found() {
        let server = make_server();
        let resp = server.router().oneshot(get("/metrics")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_renders_with_handle() {
        let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let server = make_server().with_metrics(handle);
        let resp = server.router().oneshot(get("/metrics")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let server = make_server();
        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap();
        let resp = server.router().oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn unknown_route_without_static_dir_is_not_found() {
        let server = make_server();
        let resp = server.router().oneshot(get("/index.html")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn static_dir_is_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>relay</h1>").unwrap();
        let server = RelayServer::new(ServerConfig {
            static_dir: Some(dir.path().to_path_buf()),
            ..ServerConfig::default()
        });
        let resp = server.router().oneshot(get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        assert_eq!(&body[..], b"<h1>relay</h1>");
    }

    #[tokio::test]
    async fn listen_binds_ephemeral_port() {
        let server = make_server();
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);
        server.shutdown().shutdown();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
