//! HTTP route definitions

use axum::{
    extract::State,
    http::{header, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::ws::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - support multiple origins (comma-separated in CLIENT_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    ticks: u64,
    connections: usize,
    players: usize,
    queued: usize,
    active_matches: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.stats.snapshot();
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        ticks: stats.ticks,
        connections: stats.connections,
        players: stats.players,
        queued: stats.queued,
        active_matches: stats.active_matches,
    })
}
