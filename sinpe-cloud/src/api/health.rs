//! Health check endpoint

use axum::{Json, extract::State};

use crate::db;
use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = if db::ping(&state.pool).await {
        "ok"
    } else {
        "unreachable"
    };

    Json(serde_json::json!({
        "status": "ok",
        "service": "sinpe-cloud",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    }))
}
