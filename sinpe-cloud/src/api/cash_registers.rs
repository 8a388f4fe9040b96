//! Cash register endpoints (Cajas)
//!
//! Staff see and manage every register; a Cashier only sees the registers of
//! the merchant their employee record belongs to.

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{CashRegister, CashRegisterCreate, CashRegisterUpdate};
use shared::util::now_millis;
use validator::Validate;

use super::{ApiResult, write_result};
use crate::auth::Principal;
use crate::db::cash_registers;
use crate::service::ledger::FOREIGN_REGISTER;
use crate::state::AppState;

const TABLE: &str = "cash_registers";

/// GET /api/cash-registers
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Vec<CashRegister>> {
    let registers = match principal.merchant_scope()? {
        None => cash_registers::find_all(&state.pool).await?,
        Some(merchant_id) => cash_registers::list_by_merchant(&state.pool, merchant_id).await?,
    };
    Ok(Json(registers))
}

/// GET /api/cash-registers/{id}
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<CashRegister> {
    let register = cash_registers::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CashRegisterNotFound))?;

    if !principal.can_access_merchant(register.merchant_id)? {
        return Err(AppError::with_message(ErrorCode::CashRegisterForeign, FOREIGN_REGISTER).into());
    }
    Ok(Json(register))
}

/// POST /api/cash-registers
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(form): Json<CashRegisterCreate>,
) -> ApiResult<CashRegister> {
    principal.require_staff()?;
    let form = form.trimmed();
    form.validate()?;

    let result = cash_registers::create(&state.pool, &form, now_millis()).await;
    let register = write_result(&state, TABLE, ErrorCode::CashRegisterNotFound, result).await?;

    tracing::info!(
        register_id = register.id,
        merchant_id = register.merchant_id,
        by = %principal.subject,
        "Cash register created"
    );
    Ok(Json(register))
}

/// PUT /api/cash-registers/{id}
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(form): Json<CashRegisterUpdate>,
) -> ApiResult<CashRegister> {
    principal.require_staff()?;
    let form = form.trimmed();
    form.validate()?;

    let result = cash_registers::update(&state.pool, id, &form, now_millis()).await;
    let register = write_result(&state, TABLE, ErrorCode::CashRegisterNotFound, result).await?;

    tracing::info!(register_id = id, by = %principal.subject, "Cash register updated");
    Ok(Json(register))
}

/// DELETE /api/cash-registers/{id}
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<CashRegister> {
    principal.require_staff()?;

    let result = cash_registers::delete(&state.pool, id).await;
    let register = write_result(&state, TABLE, ErrorCode::CashRegisterNotFound, result).await?;

    tracing::info!(register_id = id, by = %principal.subject, "Cash register deleted");
    Ok(Json(register))
}
