//! Monthly commission report endpoints

use axum::{Json, extract::State};
use chrono::Utc;
use shared::models::{MonthlyReport, ReportRun};

use super::ApiResult;
use crate::auth::Principal;
use crate::db::reports;
use crate::service::report;
use crate::state::AppState;

/// GET /api/reports
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<MonthlyReport>> {
    Ok(Json(reports::list(&state.pool).await?))
}

/// POST /api/reports/generate
///
/// Generates or refreshes the current month's report for every configured merchant.
pub async fn generate(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<ReportRun> {
    tracing::info!(by = %principal.subject, "Monthly report generation requested");
    let summary = report::generate_monthly_reports(&state.pool, Utc::now()).await?;
    Ok(Json(summary))
}
