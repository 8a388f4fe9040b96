//! Merchant directory endpoints (Comercios)

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Merchant, MerchantCreate, MerchantUpdate};
use shared::util::now_millis;
use validator::Validate;

use super::{ApiResult, write_result};
use crate::auth::Principal;
use crate::db::{RepoError, merchants};
use crate::state::AppState;

const TABLE: &str = "merchants";

pub const MERCHANT_IN_USE: &str =
    "No se puede eliminar el comercio porque tiene cajas, empleados, configuración o reportes asociados.";

/// GET /api/merchants
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Merchant>> {
    Ok(Json(merchants::find_all(&state.pool).await?))
}

/// GET /api/merchants/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Merchant> {
    let merchant = merchants::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MerchantNotFound))?;
    Ok(Json(merchant))
}

/// POST /api/merchants
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(form): Json<MerchantCreate>,
) -> ApiResult<Merchant> {
    let form = form.trimmed();
    form.validate()?;

    let result = merchants::create(&state.pool, &form, now_millis()).await;
    let merchant = write_result(&state, TABLE, ErrorCode::MerchantNotFound, result).await?;

    tracing::info!(merchant_id = merchant.id, by = %principal.subject, "Merchant created");
    Ok(Json(merchant))
}

/// PUT /api/merchants/{id}
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(form): Json<MerchantUpdate>,
) -> ApiResult<Merchant> {
    let form = form.trimmed();
    form.validate()?;

    let result = merchants::update(&state.pool, id, &form, now_millis()).await;
    let merchant = write_result(&state, TABLE, ErrorCode::MerchantNotFound, result).await?;

    tracing::info!(merchant_id = id, by = %principal.subject, "Merchant updated");
    Ok(Json(merchant))
}

/// DELETE /api/merchants/{id}
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<Merchant> {
    let merchant = match merchants::delete(&state.pool, id).await {
        Err(RepoError::ForeignKey(_)) => {
            tracing::warn!(merchant_id = id, "Merchant delete refused, still referenced");
            return Err(AppError::with_message(ErrorCode::MerchantInUse, MERCHANT_IN_USE).into());
        }
        result => write_result(&state, TABLE, ErrorCode::MerchantNotFound, result).await?,
    };

    tracing::info!(merchant_id = id, by = %principal.subject, "Merchant deleted");
    Ok(Json(merchant))
}
