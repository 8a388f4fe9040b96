//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound
            | Self::MerchantNotFound
            | Self::ConfigurationNotFound
            | Self::PaymentNotFound
            | Self::CashRegisterNotFound
            | Self::EmployeeNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists
            | Self::EmailAlreadyRegistered
            | Self::ConfigurationExists
            | Self::MerchantInUse => StatusCode::CONFLICT,

            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            Self::PermissionDenied
            | Self::RoleRequired
            | Self::CashierNotLinked
            | Self::ExternalSyncNotAllowed
            | Self::ConfigurationInactive
            | Self::CashRegisterInactive
            | Self::CashRegisterForeign => StatusCode::FORBIDDEN,

            Self::InternalError | Self::ReportGenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation, duplicate keys surfaced on a field)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
