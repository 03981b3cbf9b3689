//! `FolioServer`: Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use folio_core::{CredentialStore, PortfolioValue};
use folio_settings::AuthSettings;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api;
use crate::config::ServerConfig;
use crate::errors::ServerError;
use crate::health::{self, HealthResponse};
use crate::pages::{configure, dashboard, login};
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::broadcast::BroadcastManager;
use crate::websocket::connection::ClientConnection;
use crate::websocket::session::run_ws_session;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Connection registry and update fan-out.
    pub broadcast: Arc<BroadcastManager>,
    /// The live balance.
    pub value: Arc<PortfolioValue>,
    /// Exchange credentials saved from `/config`.
    pub credentials: Arc<CredentialStore>,
    /// Credentials accepted by `/login`.
    pub auth: Arc<AuthSettings>,
    /// Server settings (heartbeat, queue sizes).
    pub config: Arc<ServerConfig>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle; `/metrics` is 404 without one.
    pub metrics: Option<PrometheusHandle>,
}

/// The dashboard server.
pub struct FolioServer {
    config: Arc<ServerConfig>,
    value: Arc<PortfolioValue>,
    broadcast: Arc<BroadcastManager>,
    credentials: Arc<CredentialStore>,
    auth: Arc<AuthSettings>,
    shutdown: Arc<ShutdownCoordinator>,
    metrics: Option<PrometheusHandle>,
    start_time: Instant,
}

impl FolioServer {
    /// Create a server publishing `value`.
    pub fn new(config: ServerConfig, value: Arc<PortfolioValue>, auth: AuthSettings) -> Self {
        Self {
            config: Arc::new(config),
            broadcast: Arc::new(BroadcastManager::new(Arc::clone(&value))),
            value,
            credentials: Arc::new(CredentialStore::new()),
            auth: Arc::new(auth),
            shutdown: Arc::new(ShutdownCoordinator::new()),
            metrics: None,
            start_time: Instant::now(),
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
            broadcast: Arc::clone(&self.broadcast),
            value: Arc::clone(&self.value),
            credentials: Arc::clone(&self.credentials),
            auth: Arc::clone(&self.auth),
            config: Arc::clone(&self.config),
            shutdown: Arc::clone(&self.shutdown),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        Router::new()
            .route("/", get(dashboard::dashboard_page))
            .route("/login", get(login::login_page).post(login::login_submit))
            .route(
                "/config",
                get(configure::config_page).post(configure::config_submit),
            )
            .route("/api/portfolio", get(api::portfolio))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws", get(ws_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Bind the configured address and serve until shutdown.
    ///
    /// Returns the bound address (useful with port `0`) and the serve task.
    pub async fn listen(&self) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        info!(%local_addr, "folio server listening");
        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = served {
                error!(error = %e, "server stopped with error");
            }
        });
        Ok((local_addr, handle))
    }

    /// Get the broadcast manager.
    pub fn broadcast(&self) -> &Arc<BroadcastManager> {
        &self.broadcast
    }

    /// Get the credential store.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
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

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.broadcast.connection_count().await;
    Json(health::health_check(
        state.start_time,
        connections,
        state.value.get(),
    ))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /ws
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let conn_id = ClientConnection::generate_id();
    let token = state.shutdown.token();
    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| {
            run_ws_session(socket, conn_id, state.broadcast, state.config, token)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn make_server() -> FolioServer {
        let value = Arc::new(PortfolioValue::new(10_000.0).unwrap());
        FolioServer::new(ServerConfig::default(), value, AuthSettings::default())
    }

    async fn body_string(resp: Response) -> String {
        let body = axum::body::to_bytes(resp.into_body(), 100_000)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn server_with_default_config() {
        let server = make_server();
        assert_eq!(server.config().host, "127.0.0.1");
        assert_eq!(server.config().port, 0);
        assert_eq!(server.broadcast().connection_count().await, 0);
        assert!(!server.shutdown().is_shutting_down());
    }

    #[tokio::test]
    async fn dashboard_is_html() {
        let resp = make_server().router().oneshot(get_req("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let ct = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_owned();
        assert!(ct.starts_with("text/html"), "{ct}");
        assert!(body_string(resp).await.contains("portfolioValue"));
    }

    #[tokio::test]
    async fn portfolio_endpoint_returns_value() {
        let resp = make_server()
            .router()
            .oneshot(get_req("/api/portfolio"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let parsed: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(parsed, serde_json::json!({"portfolio_value": 10_000.0}));
    }

    #[tokio::test]
    async fn repeated_queries_agree() {
        let app = make_server().router();
        let a = body_string(app.clone().oneshot(get_req("/api/portfolio")).await.unwrap()).await;
        let b = body_string(app.oneshot(get_req("/api/portfolio")).await.unwrap()).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let resp = make_server()
            .router()
            .oneshot(get_req("/health"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let parsed: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["connections"], 0);
        assert_eq!(parsed["portfolio_value"], 10_000.0);
        assert!(parsed["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn login_page_renders() {
        let resp = make_server()
            .router()
            .oneshot(get_req("/login"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("name=\"password\""));
    }

    #[tokio::test]
    async fn login_success_redirects_to_dashboard() {
        let resp = make_server()
            .router()
            .oneshot(form_post("/login", "username=admin&password=password"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn login_failure_is_plain_text() {
        let resp = make_server()
            .router()
            .oneshot(form_post("/login", "username=admin&password=wrong"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, login::LOGIN_FAILED);
    }

    #[tokio::test]
    async fn login_uses_configured_credentials() {
        let value = Arc::new(PortfolioValue::new(0.0).unwrap());
        let auth = AuthSettings {
            username: "ops".into(),
            password: "s3cret".into(),
        };
        let app = FolioServer::new(ServerConfig::default(), value, auth).router();

        let resp = app
            .clone()
            .oneshot(form_post("/login", "username=admin&password=password"))
            .await
            .unwrap();
        assert_eq!(body_string(resp).await, login::LOGIN_FAILED);

        let resp = app
            .oneshot(form_post("/login", "username=ops&password=s3cret"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn config_save_stores_credentials() {
        let server = make_server();
        let resp = server
            .router()
            .oneshot(form_post("/config", "api_key=abcd1234&secret_key=shh"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, configure::CONFIG_SAVED);
        assert!(server.credentials().is_configured());
        assert_eq!(server.credentials().api_key_hint().as_deref(), Some("****1234"));
    }

    #[tokio::test]
    async fn config_page_shows_hint_not_key() {
        let server = make_server();
        server.credentials().save("abcd1234", "shh").unwrap();
        let resp = server.router().oneshot(get_req("/config")).await.unwrap();
        let html = body_string(resp).await;
        assert!(html.contains("****1234"));
        assert!(!html.contains("abcd1234"));
        assert!(!html.contains("shh"));
    }

    #[tokio::test]
    async fn config_blank_field_rejected() {
        let server = make_server();
        let resp = server
            .router()
            .oneshot(form_post("/config", "api_key=abc&secret_key="))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, configure::CONFIG_INCOMPLETE);
        assert!(!server.credentials().is_configured());
    }

    #[tokio::test]
    async fn config_missing_field_rejected() {
        let resp = make_server()
            .router()
            .oneshot(form_post("/config", "api_key=abc"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn metrics_disabled_without_handle() {
        let resp = make_server()
            .router()
            .oneshot(get_req("/metrics"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_rendered_with_handle() {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let resp = make_server()
            .with_metrics(handle)
            .router()
            .oneshot(get_req("/metrics"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let ct = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_owned();
        assert!(ct.starts_with("text/plain"));
    }

    #[tokio::test]
    async fn ws_requires_upgrade() {
        let resp = make_server().router().oneshot(get_req("/ws")).await.unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let resp = make_server()
            .router()
            .oneshot(get_req("/nonexistent"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listen_binds_ephemeral_port_and_stops() {
        let server = make_server();
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);
        server.shutdown().shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
