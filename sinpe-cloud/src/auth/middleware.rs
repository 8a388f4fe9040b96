//! Authentication middleware
//!
//! `require_session` and `require_api_client` authenticate and insert the
//! [`Principal`] into request extensions; `require_staff` gates routes on it.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::AppError;

use super::jwt::JwtService;
use super::principal::{Principal, authenticate_bearer, authenticate_session};
use super::session::{SESSION_COOKIE, read_cookie};
use crate::state::AppState;

/// Web surface: session cookie required
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = read_cookie(req.headers(), SESSION_COOKIE).map(str::to_owned) else {
        tracing::warn!(uri = %req.uri(), "Missing session cookie");
        return Err(AppError::not_authenticated());
    };

    let principal = authenticate_session(&state, &token).await?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Administrator or Accountant only; runs after `require_session`
pub async fn require_staff(req: Request, next: Next) -> Result<Response, AppError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .ok_or_else(AppError::not_authenticated)?;
    principal.require_staff()?;
    Ok(next.run(req).await)
}

/// Sync API: merchant bearer token required
///
/// Failures use the Sync API envelope (`{Mensaje}`) with status 401.
pub async fn require_api_client(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(JwtService::extract_from_header)
        .ok_or_else(|| {
            tracing::warn!(uri = %req.uri(), "Missing bearer token");
            error_response("Token de autenticación requerido.")
        })?;

    let principal = authenticate_bearer(&state.jwt, token)
        .map_err(|_| error_response("Token inválido o expirado."))?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn error_response(message: &str) -> Response {
    let body = serde_json::json!({ "Mensaje": message });
    (http::StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}
