use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

/// GET /
async fn root() -> Json<Value> {
    Json(json!({
        "message": "SkyRank API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "websocket": "/ws",
        },
    }))
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let ranking_configured = state.config.ranking.is_configured();
    let ranking_mode = if state.ranker.has_service() { "model" } else { "fallback" };
    Json(json!({
        "status": "healthy",
        "rankingConfigured": ranking_configured,
        "services": {
            "http": "running",
            "websocket": "running",
            "ranking": ranking_mode,
        },
    }))
}
