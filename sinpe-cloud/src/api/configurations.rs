//! Commission configuration endpoints (Configuraciones)

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Configuration, ConfigurationCreate, ConfigurationUpdate};
use shared::util::now_millis;
use validator::Validate;

use super::{ApiResult, write_result};
use crate::auth::Principal;
use crate::db::configurations;
use crate::error::ServiceError;
use crate::state::AppState;

const TABLE: &str = "configurations";

/// GET /api/configurations
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Configuration>> {
    Ok(Json(configurations::find_all(&state.pool).await?))
}

/// GET /api/configurations/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Configuration> {
    let config = configurations::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ConfigurationNotFound))?;
    Ok(Json(config))
}

/// POST /api/configurations
///
/// A second configuration for the same merchant is refused; the error echoes
/// the requested merchant so the form can keep it selected.
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(form): Json<ConfigurationCreate>,
) -> ApiResult<Configuration> {
    form.validate()?;

    let result = configurations::create(&state.pool, &form, now_millis()).await;
    let config = write_result(&state, TABLE, ErrorCode::ConfigurationNotFound, result)
        .await
        .map_err(|err| match err {
            ServiceError::App(app) if app.code == ErrorCode::ConfigurationExists => {
                ServiceError::App(app.with_detail("merchant_id", form.merchant_id))
            }
            other => other,
        })?;

    tracing::info!(
        configuration_id = config.id,
        merchant_id = config.merchant_id,
        by = %principal.subject,
        "Configuration created"
    );
    Ok(Json(config))
}

/// PUT /api/configurations/{id}
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(form): Json<ConfigurationUpdate>,
) -> ApiResult<Configuration> {
    form.validate()?;

    let result = configurations::update(&state.pool, id, &form, now_millis()).await;
    let config = write_result(&state, TABLE, ErrorCode::ConfigurationNotFound, result).await?;

    tracing::info!(configuration_id = id, by = %principal.subject, "Configuration updated");
    Ok(Json(config))
}

/// DELETE /api/configurations/{id}
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<Configuration> {
    let result = configurations::delete(&state.pool, id).await;
    let config = write_result(&state, TABLE, ErrorCode::ConfigurationNotFound, result).await?;

    tracing::info!(configuration_id = id, by = %principal.subject, "Configuration deleted");
    Ok(Json(config))
}
