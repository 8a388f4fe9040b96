//! Audit log endpoint (Bitácora)

use axum::{Json, extract::State};
use shared::models::AuditEntry;

use super::ApiResult;
use crate::db::audit;
use crate::state::AppState;

/// GET /api/audit-log, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<AuditEntry>> {
    Ok(Json(audit::list(&state.pool).await?))
}
