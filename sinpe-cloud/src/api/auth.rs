//! Identity account endpoints: register, login, logout, me

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use http::header::SET_COOKIE;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{LoginRequest, MIN_PASSWORD_LEN, RegisterRequest, Role, UserProfile};
use shared::util::now_millis;
use validator::ValidateEmail;

use super::ApiResult;
use crate::auth::Principal;
use crate::auth::session::{clear_session_cookie, session_cookie};
use crate::db::{self, employees, users};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::{hash_password, verify_password};

pub const EMPLOYEE_EMAIL_MISSING: &str =
    "Error: El correo no está registrado como empleado (Tabla Usuarios).";
pub const INVALID_EMAIL: &str = "El correo electrónico no es válido.";
pub const ROLE_NOT_ALLOWED: &str = "El rol indicado no se puede registrar.";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Issue the session cookie and answer with the caller's profile
fn signed_in(
    state: &AppState,
    user: &users::User,
    role: Role,
    merchant_id: Option<i64>,
) -> Result<impl IntoResponse + use<>, ServiceError> {
    let token = state
        .jwt
        .issue_session(&user.id, &user.email, role)
        .map_err(|e| AppError::internal(e.to_string()))?;
    let cookie = session_cookie(
        &token,
        state.config.session_hours * 3600,
        state.config.secure_cookies(),
    );

    let profile = UserProfile {
        id: user.id.clone(),
        email: Some(user.email.clone()),
        role,
        merchant_id,
    };
    Ok(([(SET_COOKIE, cookie)], Json(profile)))
}

/// POST /auth/register
///
/// A Cashier account needs an employee with the same email; the employee is
/// linked to the new account in the same transaction.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let email = normalize_email(&req.email);
    if !email.validate_email() {
        return Err(AppError::field(ErrorCode::ValidationFailed, "email", INVALID_EMAIL).into());
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::field(
            ErrorCode::PasswordTooShort,
            "password",
            ErrorCode::PasswordTooShort.message(),
        )
        .into());
    }
    if req.password != req.confirm_password {
        return Err(AppError::field(
            ErrorCode::PasswordMismatch,
            "confirm_password",
            ErrorCode::PasswordMismatch.message(),
        )
        .into());
    }
    if !req.role.is_registrable() {
        return Err(AppError::field(ErrorCode::ValidationFailed, "role", ROLE_NOT_ALLOWED).into());
    }

    let employee = if req.role == Role::Cashier {
        let employee = employees::find_by_email(&state.pool, &email)
            .await?
            .ok_or_else(|| {
                tracing::warn!(email = %email, "Cashier registration without employee record");
                AppError::field(
                    ErrorCode::EmployeeEmailNotRegistered,
                    "email",
                    EMPLOYEE_EMAIL_MISSING,
                )
            })?;
        Some(employee)
    } else {
        None
    };

    let password_hash =
        hash_password(&req.password).map_err(|e| AppError::internal(e.to_string()))?;
    let user = users::User {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        password_hash,
        role: req.role.as_str().to_string(),
        created_at: now_millis(),
    };

    let mut tx = db::begin_write(&state.pool).await?;
    users::create(&mut *tx, &user).await?;
    if let Some(employee) = &employee {
        employees::link_identity(&mut *tx, employee, &user.id, user.created_at).await?;
    }
    tx.commit().await?;

    tracing::info!(account_id = %user.id, role = %req.role, "Account registered");
    signed_in(
        &state,
        &user,
        req.role,
        employee.map(|employee| employee.merchant_id),
    )
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let email = normalize_email(&req.email);
    let user = users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &user.password_hash) {
        tracing::warn!(email = %email, "Login with wrong password");
        return Err(AppError::invalid_credentials().into());
    }

    let role: Role = user
        .role
        .parse()
        .map_err(|e: shared::models::UnknownRole| AppError::internal(e.to_string()))?;
    let merchant_id = if role == Role::Cashier {
        employees::find_by_identity(&state.pool, &user.id)
            .await?
            .map(|employee| employee.merchant_id)
    } else {
        None
    };

    tracing::info!(account_id = %user.id, role = %role, "Login");
    signed_in(&state, &user, role, merchant_id)
}

/// POST /auth/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_session_cookie(state.config.secure_cookies());
    ([(SET_COOKIE, cookie)], Json(ApiResponse::ok()))
}

/// GET /auth/me
pub async fn me(State(state): State<AppState>, principal: Principal) -> ApiResult<UserProfile> {
    users::find_by_id(&state.pool, &principal.subject)
        .await?
        .ok_or_else(AppError::not_authenticated)?;
    Ok(Json(principal.profile()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{cookie, send, state};
    use crate::db::{employees::fixtures, testing};
    use http::StatusCode;
    use serde_json::json;

    fn register_body(email: &str, role: &str) -> serde_json::Value {
        json!({
            "email": email,
            "password": "secreto1",
            "confirm_password": "secreto1",
            "role": role,
        })
    }

    fn session_from(headers: &http::HeaderMap) -> String {
        let set_cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn account_count(state: &AppState) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&state.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login_and_me() {
        let state = state().await;
        let (status, headers, body) = send(
            &state,
            "POST",
            "/auth/register",
            None,
            Some(register_body("  Ana@Example.COM ", "Administrador")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ana@example.com");
        assert!(
            headers
                .get(SET_COOKIE)
                .unwrap()
                .to_str()
                .unwrap()
                .contains("HttpOnly")
        );

        let (status, headers, _) = send(
            &state,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "ANA@example.com", "password": "secreto1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, me) =
            send(&state, "GET", "/auth/me", cookie(session_from(&headers)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["role"], "Administrador");
    }

    #[tokio::test]
    async fn test_login_failures_share_one_answer() {
        let state = state().await;
        send(
            &state,
            "POST",
            "/auth/register",
            None,
            Some(register_body("ana@example.com", "Contador")),
        )
        .await;

        let (wrong_pw, _, a) = send(
            &state,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "ana@example.com", "password": "otra-clave"})),
        )
        .await;
        let (unknown, _, b) = send(
            &state,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "nadie@example.com", "password": "secreto1"})),
        )
        .await;
        assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown, StatusCode::UNAUTHORIZED);
        assert_eq!(a["message"], b["message"]);
    }

    #[tokio::test]
    async fn test_cashier_requires_employee_email() {
        let state = state().await;
        let (status, _, body) = send(
            &state,
            "POST",
            "/auth/register",
            None,
            Some(register_body("caja@example.com", "Cajero")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], EMPLOYEE_EMAIL_MISSING);
        assert_eq!(account_count(&state).await, 0);
    }

    #[tokio::test]
    async fn test_cashier_registration_links_employee() {
        let state = state().await;
        let merchant = testing::merchant(&state.pool, "3-101-000001").await;
        let employee = employees::create(
            &state.pool,
            &fixtures::form(merchant.id, "112340567", "Caja@Example.com"),
            1,
        )
        .await
        .unwrap();

        let (status, _, body) = send(
            &state,
            "POST",
            "/auth/register",
            None,
            Some(register_body("caja@example.com", "Cajero")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["merchant_id"], merchant.id);

        let linked = employees::find_by_id(&state.pool, employee.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(linked.identity_account_id.as_deref(), body["id"].as_str());
    }

    #[tokio::test]
    async fn test_register_password_rules() {
        let state = state().await;
        let mut short = register_body("ana@example.com", "Administrador");
        short["password"] = json!("12345");
        short["confirm_password"] = json!("12345");
        let (status, _, body) = send(&state, "POST", "/auth/register", None, Some(short)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], ErrorCode::PasswordTooShort.code());

        let mut mismatch = register_body("ana@example.com", "Administrador");
        mismatch["confirm_password"] = json!("secreto2");
        let (_, _, body) = send(&state, "POST", "/auth/register", None, Some(mismatch)).await;
        assert_eq!(body["code"], ErrorCode::PasswordMismatch.code());

        let (status, _, _) = send(
            &state,
            "POST",
            "/auth/register",
            None,
            Some(register_body("api@example.com", "ComercioAPI")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(account_count(&state).await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let state = state().await;
        let body = register_body("ana@example.com", "Administrador");
        send(&state, "POST", "/auth/register", None, Some(body.clone())).await;
        let (status, _, _) = send(&state, "POST", "/auth/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(account_count(&state).await, 1);
    }

    #[tokio::test]
    async fn test_logout_expires_cookie() {
        let state = state().await;
        let (status, headers, _) = send(&state, "POST", "/auth/logout", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let set_cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let state = state().await;
        let (status, _, _) = send(&state, "GET", "/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
