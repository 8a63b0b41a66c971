// HTTP request handlers

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::discovery::advertised_ip;
use super::rpc::{handle_rpc, ErrorCode, RpcResponse};
use super::session::Track;
use super::RelayServer;

pub const SERVICE_NAME: &str = "NPRPC Music Server";

/// Create the main application router
pub fn create_router(server: Arc<RelayServer>) -> Router {
    let body_limit = server.config().max_body_bytes;

    Router::new()
        .route(
            "/rpc",
            post(handle_rpc).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/health", get(health_check))
        .route("/discovery", get(discovery))
        .with_state(server)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub discord_connected: bool,
    #[serde(serialize_with = "super::session::track_or_empty")]
    pub current_track: Option<Track>,
}

/// Handle GET /health - connection flag and current track
pub async fn health_check(State(server): State<Arc<RelayServer>>) -> Json<HealthStatus> {
    let snapshot = server.session_manager().snapshot().await;

    Json(HealthStatus {
        status: "ok".to_string(),
        discord_connected: snapshot.connected,
        current_track: snapshot.current_track,
    })
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub rpc: &'static str,
    pub health: &'static str,
    pub discovery: &'static str,
}

/// Discovery response consumed by the phone app's LAN scan
#[derive(Debug, Serialize)]
pub struct DiscoveryInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub server_url: String,
    pub endpoints: Endpoints,
    pub status: &'static str,
    pub discord_connected: bool,
}

/// Handle GET /discovery - where to reach this server and what it offers
pub async fn discovery(State(server): State<Arc<RelayServer>>) -> Json<DiscoveryInfo> {
    let config = server.config();
    let ip = advertised_ip(&config.host).await;

    Json(DiscoveryInfo {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        server_url: format!("http://{}:{}", ip, config.port),
        endpoints: Endpoints {
            rpc: "/rpc",
            health: "/health",
            discovery: "/discovery",
        },
        status: "running",
        discord_connected: server.session_manager().is_connected().await,
    })
}

/// A panicking handler still answers with a JSON-RPC internal error
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");

    let code = ErrorCode::InternalError;
    let body = RpcResponse::failure(
        Value::Null,
        code.code(),
        format!("{}: {}", code.message(), detail),
    );
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
