//! SINPE payment endpoints for the web back office

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::{PaymentCreate, SinpePayment, SyncOutcome};
use shared::util::now_millis;

use super::ApiResult;
use crate::auth::Principal;
use crate::service::ledger;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub outcome: SyncOutcome,
    pub message: &'static str,
}

/// POST /api/payments
pub async fn register(
    State(state): State<AppState>,
    principal: Principal,
    Json(form): Json<PaymentCreate>,
) -> ApiResult<SinpePayment> {
    let scope = principal.merchant_scope()?;
    let payment = ledger::register_payment(&state.pool, form, scope, now_millis()).await?;
    Ok(Json(payment))
}

/// GET /api/payments/register/{phone}
pub async fn list_by_register(
    State(state): State<AppState>,
    principal: Principal,
    Path(phone): Path<String>,
) -> ApiResult<Vec<SinpePayment>> {
    let scope = principal.merchant_scope()?;
    let payments = ledger::payments_for_register(&state.pool, phone.trim(), scope).await?;
    Ok(Json(payments))
}

/// POST /api/payments/{id}/synchronize
pub async fn synchronize(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<SyncResponse> {
    let scope = principal.merchant_scope()?;
    if scope.is_some() {
        let payment = ledger::find_payment(&state.pool, id).await?;
        ledger::register_for_phone(&state.pool, &payment.destination_phone, scope).await?;
    }

    let outcome = ledger::synchronize(&state.pool, id).await?;
    Ok(Json(SyncResponse {
        outcome,
        message: ledger::outcome_message(outcome),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{cookie, send, session, state};
    use crate::db::testing;
    use http::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;
    use shared::error::ErrorCode;
    use shared::models::Role;

    fn body(destination: &str) -> serde_json::Value {
        json!({
            "origin_phone": "60001111",
            "origin_name": "Luis",
            "destination_phone": destination,
            "destination_name": "Soda",
            "amount": "1500.50",
            "description": "Almuerzo",
        })
    }

    #[tokio::test]
    async fn test_register_and_list_newest_first() {
        let state = state().await;
        let admin = cookie(session(&state, "acc-1", Role::Administrator));
        let merchant = testing::merchant(&state.pool, "3-101-1").await;
        testing::register(&state.pool, merchant.id, "88887777").await;
        testing::payment_at(&state.pool, "88887777", Decimal::ONE, 1).await;

        let (status, _, created) =
            send(&state, "POST", "/api/payments", admin.clone(), Some(body("88887777"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["amount"], "1500.50");
        assert_eq!(created["synchronized"], false);

        let (status, _, list) =
            send(&state, "GET", "/api/payments/register/88887777", admin, None).await;
        assert_eq!(status, StatusCode::OK);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_register_refusals() {
        let state = state().await;
        let admin = cookie(session(&state, "acc-1", Role::Administrator));

        let (status, _, err) =
            send(&state, "POST", "/api/payments", admin.clone(), Some(body("80000000"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["message"], ledger::REGISTER_NOT_FOUND);

        let mut zero = body("80000000");
        zero["amount"] = json!(0);
        let (status, _, err) = send(&state, "POST", "/api/payments", admin, Some(zero)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], ErrorCode::ValidationFailed.code());
    }

    #[tokio::test]
    async fn test_synchronize_twice() {
        let state = state().await;
        let admin = cookie(session(&state, "acc-1", Role::Accountant));
        let payment = testing::payment_at(&state.pool, "88887777", Decimal::TEN, 1).await;
        let uri = format!("/api/payments/{}/synchronize", payment.id);

        let (status, _, first) = send(&state, "POST", &uri, admin.clone(), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["outcome"], "synchronized");
        assert_eq!(first["message"], ledger::SYNCHRONIZED);

        let (_, _, second) = send(&state, "POST", &uri, admin.clone(), None).await;
        assert_eq!(second["outcome"], "already_synchronized");
        assert_eq!(second["message"], ledger::ALREADY_SYNCHRONIZED);

        let (status, _, _) = send(&state, "POST", "/api/payments/999/synchronize", admin, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_requires_session() {
        let state = state().await;
        let (status, _, _) = send(&state, "POST", "/api/payments", None, Some(body("88887777"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
