//! API routes for sinpe-cloud

pub mod audit_log;
pub mod auth;
pub mod cash_registers;
pub mod configurations;
pub mod employees;
pub mod health;
pub mod merchants;
pub mod payments;
pub mod reports;
pub mod sync;

use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use shared::error::{AppError, ErrorCode};
use tower_http::trace::TraceLayer;

use crate::auth::{require_api_client, require_session, require_staff};
use crate::db::RepoError;
use crate::error::{ServiceError, ServiceResult, audited};
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, ServiceError>;

/// Audit-on-failure for a directory write; a missing row is reported as `not_found`
pub(crate) async fn write_result<T>(
    state: &AppState,
    table: &'static str,
    not_found: ErrorCode,
    result: Result<T, RepoError>,
) -> ServiceResult<T> {
    match result {
        Err(RepoError::NotFound(_)) => Err(AppError::new(not_found).into()),
        other => audited(&state.pool, table, other).await,
    }
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Directories, reports and audit log (Administrator / Accountant)
    let staff = Router::new()
        .route(
            "/api/merchants",
            get(merchants::list).post(merchants::create),
        )
        .route(
            "/api/merchants/{id}",
            get(merchants::get)
                .put(merchants::update)
                .delete(merchants::delete),
        )
        .route(
            "/api/configurations",
            get(configurations::list).post(configurations::create),
        )
        .route(
            "/api/configurations/{id}",
            get(configurations::get)
                .put(configurations::update)
                .delete(configurations::delete),
        )
        .route(
            "/api/employees",
            get(employees::list).post(employees::create),
        )
        .route(
            "/api/employees/{id}",
            get(employees::get)
                .put(employees::update)
                .delete(employees::delete),
        )
        .route("/api/reports", get(reports::list))
        .route("/api/reports/generate", post(reports::generate))
        .route("/api/audit-log", get(audit_log::list))
        .layer(middleware::from_fn(require_staff));

    // Any signed-in role; cashiers are confined to their merchant by the handlers
    let web = Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/api/cash-registers",
            get(cash_registers::list).post(cash_registers::create),
        )
        .route(
            "/api/cash-registers/{id}",
            get(cash_registers::get)
                .put(cash_registers::update)
                .delete(cash_registers::delete),
        )
        .route("/api/payments", post(payments::register))
        .route(
            "/api/payments/register/{phone}",
            get(payments::list_by_register),
        )
        .route(
            "/api/payments/{id}/synchronize",
            post(payments::synchronize),
        )
        .merge(staff)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    // Merchant systems (bearer token)
    let sync = Router::new()
        .route("/api/sinpe/consultar", get(sync::consult))
        .route("/api/sinpe/sincronizar/{id}", post(sync::synchronize))
        .route("/api/sinpe/recibir", post(sync::receive))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_client,
        ));

    // Public
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", post(auth::logout))
        .route("/api/auth/token", get(sync::issue_token));

    Router::new()
        .merge(public)
        .merge(web)
        .merge(sync)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for router-level tests

    use axum::body::Body;
    use http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use shared::models::Role;
    use tower::ServiceExt;

    use super::create_router;
    use crate::auth::session::SESSION_COOKIE;
    use crate::config::Config;
    use crate::db::testing;
    use crate::state::AppState;

    pub async fn state() -> AppState {
        AppState::new(testing::pool().await, Config::for_tests())
    }

    /// `Cookie` header value carrying a fresh session for `role`
    pub fn session(state: &AppState, account_id: &str, role: Role) -> String {
        let token = state
            .jwt
            .issue_session(account_id, "someone@example.com", role)
            .unwrap();
        format!("{SESSION_COOKIE}={token}")
    }

    pub fn bearer(state: &AppState, merchant_id: i64) -> String {
        format!("Bearer {}", state.jwt.issue_api_token(merchant_id).unwrap())
    }

    /// Send one request through a fresh router; returns status, headers and JSON body
    pub async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        auth: Option<(header::HeaderName, String)>,
        body: Option<Value>,
    ) -> (StatusCode, http::HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((name, value)) = auth {
            builder = builder.header(name, value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, headers, json)
    }

    pub fn cookie(value: String) -> Option<(header::HeaderName, String)> {
        Some((header::COOKIE, value))
    }

    pub fn authorization(value: String) -> Option<(header::HeaderName, String)> {
        Some((header::AUTHORIZATION, value))
    }
}
