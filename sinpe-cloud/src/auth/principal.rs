//! Authenticated principal
//!
//! Both authenticators (session cookie, bearer token) produce the same
//! [`Principal`]; authorization checks only ever look at this type.

use axum::extract::FromRequestParts;
use http::request::Parts;
use shared::error::{AppError, ErrorCode};
use shared::models::{Role, UserProfile};

use super::jwt::{JwtError, JwtService, TOKEN_API, TOKEN_SESSION};
use crate::db::employees;
use crate::error::ServiceError;
use crate::state::AppState;

pub const CASHIER_NOT_LINKED: &str =
    "Su usuario Cajero no está enlazado a un Comercio. Contacte al Administrador.";

/// Request-scoped identity
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    /// Identity account id, or merchant id for API clients
    pub subject: String,
    pub email: Option<String>,
    pub role: Role,
    /// Cashier: merchant of the linked employee. API client: token subject.
    pub merchant_id: Option<i64>,
}

impl Principal {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff() {
            Ok(())
        } else {
            tracing::warn!(subject = %self.subject, role = %self.role, "Staff role required");
            Err(AppError::with_message(
                ErrorCode::RoleRequired,
                "Administrator or Accountant role required",
            ))
        }
    }

    /// Merchant the principal is confined to; `None` means every merchant
    pub fn merchant_scope(&self) -> Result<Option<i64>, AppError> {
        match self.role {
            Role::Administrator | Role::Accountant => Ok(None),
            Role::Cashier => self.merchant_id.map(Some).ok_or_else(|| {
                tracing::warn!(subject = %self.subject, "Cashier without linked employee");
                AppError::with_message(ErrorCode::CashierNotLinked, CASHIER_NOT_LINKED)
            }),
            Role::MerchantApi => self
                .merchant_id
                .map(Some)
                .ok_or_else(|| AppError::invalid_token("API token without merchant")),
        }
    }

    /// Whether a row owned by `merchant_id` is visible to this principal
    pub fn can_access_merchant(&self, merchant_id: i64) -> Result<bool, AppError> {
        Ok(self
            .merchant_scope()?
            .is_none_or(|own| own == merchant_id))
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.subject.clone(),
            email: self.email.clone(),
            role: self.role,
            merchant_id: self.merchant_id,
        }
    }
}

fn token_error(err: JwtError) -> AppError {
    tracing::warn!(error = %err, "Token rejected");
    match err {
        JwtError::ExpiredToken => AppError::token_expired(),
        _ => AppError::invalid_token("Invalid token"),
    }
}

/// Session cookie authenticator
///
/// Cashiers get their merchant from the employee linked to the account, looked
/// up on every request so re-linking takes effect immediately.
pub async fn authenticate_session(state: &AppState, token: &str) -> Result<Principal, AppError> {
    let claims = state.jwt.validate_token(token).map_err(token_error)?;
    if claims.token_type != TOKEN_SESSION {
        return Err(AppError::invalid_token("Not a session token"));
    }
    let role: Role = claims
        .role
        .parse()
        .map_err(|e| AppError::invalid_token(format!("Malformed claims: {e}")))?;
    if !role.is_registrable() {
        return Err(AppError::invalid_token("Not a session role"));
    }

    let merchant_id = if role == Role::Cashier {
        employees::find_by_identity(&state.pool, &claims.sub)
            .await
            .map_err(|e| AppError::from(ServiceError::from(e)))?
            .map(|employee| employee.merchant_id)
    } else {
        None
    };

    Ok(Principal {
        subject: claims.sub,
        email: claims.email,
        role,
        merchant_id,
    })
}

/// Bearer token authenticator for merchant systems
pub fn authenticate_bearer(jwt: &JwtService, token: &str) -> Result<Principal, AppError> {
    let claims = jwt.validate_token(token).map_err(token_error)?;
    if claims.token_type != TOKEN_API || claims.role != Role::MerchantApi.as_str() {
        return Err(AppError::invalid_token("Not an API token"));
    }
    let merchant_id: i64 = claims
        .sub
        .parse()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::invalid_token("Malformed merchant subject"))?;

    Ok(Principal {
        subject: claims.sub,
        email: None,
        role: Role::MerchantApi,
        merchant_id: Some(merchant_id),
    })
}

/// Reads the principal inserted by the auth middleware
impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(AppError::not_authenticated)
    }
}
