//! Unified service-layer error type for sinpe-cloud
//!
//! `ServiceError` bridges repository errors (`RepoError`, `sqlx::Error`) and the
//! API-layer error (`AppError`), so handlers can use `?` throughout. Constraint
//! violations reported by SQLite become the same field-level errors a form
//! check would have produced.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use sqlx::SqlitePool;
use validator::ValidationErrors;

use crate::db::RepoError;
use crate::db::audit::{self, AuditEvent};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const IDENTIFICATION_EXISTS: &str = "La identificación ingresada ya existe.";
pub const CONFIGURATION_EXISTS: &str = "Este comercio ya tiene una configuración registrada. Solo se permite una configuración por comercio.";
pub const SINPE_PHONE_EXISTS: &str = "Ya existe una caja con ese teléfono SINPE.";
pub const MERCHANT_MISSING: &str = "El comercio indicado no existe.";

/// Service-layer error
///
/// - `Db`: storage or infrastructure failure (logged, audited, generic message)
/// - `App`: business-rule error, passed through to the client
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        RepoError::from(e).into()
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(e: ValidationErrors) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => {
                ServiceError::App(AppError::with_message(ErrorCode::NotFound, msg))
            }
            RepoError::Duplicate(columns) => ServiceError::App(duplicate(&columns)),
            RepoError::ForeignKey(_) => ServiceError::App(AppError::field(
                ErrorCode::MerchantNotFound,
                "merchant_id",
                MERCHANT_MISSING,
            )),
            RepoError::InvalidData(msg) => ServiceError::App(AppError::validation(msg)),
            RepoError::Snapshot(e) => ServiceError::Db(e.into()),
            RepoError::Database(e) => ServiceError::Db(e.into()),
        }
    }
}

/// Translate a UNIQUE violation (`table.column`) into the user-facing error
fn duplicate(columns: &str) -> AppError {
    match columns {
        "merchants.legal_id" => {
            AppError::field(ErrorCode::LegalIdExists, "legal_id", IDENTIFICATION_EXISTS)
        }
        "employees.national_id" => AppError::field(
            ErrorCode::NationalIdExists,
            "national_id",
            IDENTIFICATION_EXISTS,
        ),
        "configurations.merchant_id" => {
            AppError::field(ErrorCode::ConfigurationExists, "merchant_id", CONFIGURATION_EXISTS)
        }
        "cash_registers.sinpe_phone" => {
            AppError::field(ErrorCode::SinpePhoneExists, "sinpe_phone", SINPE_PHONE_EXISTS)
        }
        "users.email" => AppError::field(
            ErrorCode::EmailAlreadyRegistered,
            "email",
            ErrorCode::EmailAlreadyRegistered.message(),
        ),
        other => AppError::with_message(ErrorCode::AlreadyExists, format!("Duplicate: {other}")),
    }
}

impl ServiceError {
    /// Append an Error entry to the audit log for system failures
    ///
    /// Written on the pool after the failed unit of work was rolled back;
    /// a failure to audit is logged and otherwise ignored.
    pub async fn audited(self, pool: &SqlitePool, table: &'static str) -> Self {
        if let ServiceError::Db(err) = &self {
            let event = AuditEvent::error(table, err.as_ref());
            if let Err(audit_err) = audit::record(pool, &event).await {
                tracing::error!(error = %audit_err, table, "Failed to audit error");
            }
        }
        self
    }

    /// Replace the message shown for system failures
    pub fn with_failure_message(self, code: ErrorCode, message: &str) -> Self {
        match self {
            ServiceError::Db(err) => {
                tracing::error!(error = %err, "Service database error");
                ServiceError::App(AppError::with_message(code, message))
            }
            app => app,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Run the audit-on-failure policy over a repository result
pub async fn audited<T>(
    pool: &SqlitePool,
    table: &'static str,
    result: Result<T, RepoError>,
) -> ServiceResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => Err(ServiceError::from(err).audited(pool, table).await),
    }
}
