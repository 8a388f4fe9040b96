//! Employee directory endpoints (Usuarios)

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Employee, EmployeeCreate, EmployeeUpdate};
use shared::util::now_millis;
use validator::Validate;

use super::{ApiResult, write_result};
use crate::auth::Principal;
use crate::db::employees;
use crate::state::AppState;

const TABLE: &str = "employees";

/// GET /api/employees
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Employee>> {
    Ok(Json(employees::find_all(&state.pool).await?))
}

/// GET /api/employees/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Employee> {
    let employee = employees::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;
    Ok(Json(employee))
}

/// POST /api/employees
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(form): Json<EmployeeCreate>,
) -> ApiResult<Employee> {
    let form = form.trimmed();
    form.validate()?;

    let result = employees::create(&state.pool, &form, now_millis()).await;
    let employee = write_result(&state, TABLE, ErrorCode::EmployeeNotFound, result).await?;

    tracing::info!(employee_id = employee.id, by = %principal.subject, "Employee created");
    Ok(Json(employee))
}

/// PUT /api/employees/{id}
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(form): Json<EmployeeUpdate>,
) -> ApiResult<Employee> {
    let form = form.trimmed();
    form.validate()?;

    let result = employees::update(&state.pool, id, &form, now_millis()).await;
    let employee = write_result(&state, TABLE, ErrorCode::EmployeeNotFound, result).await?;

    tracing::info!(employee_id = id, by = %principal.subject, "Employee updated");
    Ok(Json(employee))
}

/// DELETE /api/employees/{id}
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<Employee> {
    let result = employees::delete(&state.pool, id).await;
    let employee = write_result(&state, TABLE, ErrorCode::EmployeeNotFound, result).await?;

    tracing::info!(employee_id = id, by = %principal.subject, "Employee deleted");
    Ok(Json(employee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{cookie, send, session, state};
    use crate::db::{audit, testing};
    use crate::error::IDENTIFICATION_EXISTS;
    use http::StatusCode;
    use serde_json::json;
    use shared::models::Role;

    fn form(merchant_id: i64, national_id: &str) -> serde_json::Value {
        json!({
            "merchant_id": merchant_id,
            "names": " Ana ",
            "surname1": "Mora",
            "surname2": "Solís",
            "national_id": national_id,
            "email": "Ana@Example.com",
        })
    }

    #[tokio::test]
    async fn test_create_normalizes_and_audits() {
        let state = state().await;
        let admin = cookie(session(&state, "acc-1", Role::Administrator));
        let merchant = testing::merchant(&state.pool, "3-101-1").await;

        let (status, _, created) =
            send(&state, "POST", "/api/employees", admin, Some(form(merchant.id, "112340567"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["names"], "Ana");
        assert_eq!(created["email"], "ana@example.com");
        assert_eq!(created["identity_account_id"], serde_json::Value::Null);

        let entries = audit::list(&state.pool).await.unwrap();
        assert_eq!(entries[0].event_table, "employees");
        assert_eq!(entries[0].event_type, "Registrar");
    }

    #[tokio::test]
    async fn test_duplicate_national_id() {
        let state = state().await;
        let admin = cookie(session(&state, "acc-1", Role::Administrator));
        let merchant = testing::merchant(&state.pool, "3-101-1").await;
        send(&state, "POST", "/api/employees", admin.clone(), Some(form(merchant.id, "112340567"))).await;

        let (status, _, err) =
            send(&state, "POST", "/api/employees", admin, Some(form(merchant.id, "112340567"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["message"], IDENTIFICATION_EXISTS);
        assert_eq!(err["details"]["field"], "national_id");
    }

    #[tokio::test]
    async fn test_missing_employee() {
        let state = state().await;
        let admin = cookie(session(&state, "acc-1", Role::Accountant));
        let (status, _, err) = send(&state, "DELETE", "/api/employees/5", admin, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["code"], ErrorCode::EmployeeNotFound.code());
    }
}
