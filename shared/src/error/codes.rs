//! Unified error codes for the SINPE back office
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Merchant errors
//! - 4xxx: Configuration errors
//! - 5xxx: Payment errors
//! - 6xxx: Cash register errors
//! - 7xxx: Report errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so web clients can switch on
/// a stable number instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Password shorter than the minimum length
    PasswordTooShort = 1005,
    /// Password and confirmation differ
    PasswordMismatch = 1006,
    /// Email already has an identity account
    EmailAlreadyRegistered = 1007,
    /// Cashier registration without a matching employee
    EmployeeEmailNotRegistered = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Cashier account is not linked to any merchant
    CashierNotLinked = 2003,
    /// Merchant is not enabled for the external sync API
    ExternalSyncNotAllowed = 2004,

    // ==================== 3xxx: Merchant ====================
    /// Merchant not found
    MerchantNotFound = 3001,
    /// Legal identification already registered
    LegalIdExists = 3002,
    /// Merchant still has dependent records
    MerchantInUse = 3003,

    // ==================== 4xxx: Configuration ====================
    /// Configuration not found
    ConfigurationNotFound = 4001,
    /// Merchant already has a configuration
    ConfigurationExists = 4002,
    /// Merchant has no active configuration
    ConfigurationInactive = 4003,

    // ==================== 5xxx: Payment ====================
    /// Payment not found
    PaymentNotFound = 5001,

    // ==================== 6xxx: Cash register ====================
    /// Cash register not found
    CashRegisterNotFound = 6001,
    /// Cash register is inactive
    CashRegisterInactive = 6002,
    /// SINPE phone already assigned to another register
    SinpePhoneExists = 6003,
    /// Cash register belongs to a different merchant
    CashRegisterForeign = 6004,

    // ==================== 7xxx: Report ====================
    /// Report generation failed
    ReportGenerationFailed = 7002,

    // ==================== 8xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// National identification already registered
    NationalIdExists = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::PasswordTooShort => "Password must be at least 6 characters",
            ErrorCode::PasswordMismatch => "Password and confirmation do not match",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::EmployeeEmailNotRegistered => "Email is not registered as an employee",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::CashierNotLinked => "Cashier account is not linked to a merchant",
            ErrorCode::ExternalSyncNotAllowed => "Merchant is not enabled for external sync",

            // Merchant
            ErrorCode::MerchantNotFound => "Merchant not found",
            ErrorCode::LegalIdExists => "Legal identification already exists",
            ErrorCode::MerchantInUse => "Merchant has dependent records",

            // Configuration
            ErrorCode::ConfigurationNotFound => "Configuration not found",
            ErrorCode::ConfigurationExists => "Merchant already has a configuration",
            ErrorCode::ConfigurationInactive => "Merchant has no active configuration",

            // Payment
            ErrorCode::PaymentNotFound => "Payment not found",

            // Cash register
            ErrorCode::CashRegisterNotFound => "Cash register not found",
            ErrorCode::CashRegisterInactive => "Cash register is inactive",
            ErrorCode::SinpePhoneExists => "SINPE phone is already assigned",
            ErrorCode::CashRegisterForeign => "Cash register belongs to another merchant",

            // Report
            ErrorCode::ReportGenerationFailed => "Report generation failed",

            // Employee
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::NationalIdExists => "National identification already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::PasswordTooShort),
            1006 => Ok(ErrorCode::PasswordMismatch),
            1007 => Ok(ErrorCode::EmailAlreadyRegistered),
            1008 => Ok(ErrorCode::EmployeeEmailNotRegistered),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::CashierNotLinked),
            2004 => Ok(ErrorCode::ExternalSyncNotAllowed),

            // Merchant
            3001 => Ok(ErrorCode::MerchantNotFound),
            3002 => Ok(ErrorCode::LegalIdExists),
            3003 => Ok(ErrorCode::MerchantInUse),

            // Configuration
            4001 => Ok(ErrorCode::ConfigurationNotFound),
            4002 => Ok(ErrorCode::ConfigurationExists),
            4003 => Ok(ErrorCode::ConfigurationInactive),

            // Payment
            5001 => Ok(ErrorCode::PaymentNotFound),

            // Cash register
            6001 => Ok(ErrorCode::CashRegisterNotFound),
            6002 => Ok(ErrorCode::CashRegisterInactive),
            6003 => Ok(ErrorCode::SinpePhoneExists),
            6004 => Ok(ErrorCode::CashRegisterForeign),

            // Report
            7002 => Ok(ErrorCode::ReportGenerationFailed),

            // Employee
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8002 => Ok(ErrorCode::NationalIdExists),

            // System
            9001 => Ok(ErrorCode::InternalError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[ErrorCode] = &[
        ErrorCode::Success,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::InvalidRequest,
        ErrorCode::NotAuthenticated,
        ErrorCode::InvalidCredentials,
        ErrorCode::TokenExpired,
        ErrorCode::TokenInvalid,
        ErrorCode::PasswordTooShort,
        ErrorCode::PasswordMismatch,
        ErrorCode::EmailAlreadyRegistered,
        ErrorCode::EmployeeEmailNotRegistered,
        ErrorCode::PermissionDenied,
        ErrorCode::RoleRequired,
        ErrorCode::CashierNotLinked,
        ErrorCode::ExternalSyncNotAllowed,
        ErrorCode::MerchantNotFound,
        ErrorCode::LegalIdExists,
        ErrorCode::MerchantInUse,
        ErrorCode::ConfigurationNotFound,
        ErrorCode::ConfigurationExists,
        ErrorCode::ConfigurationInactive,
        ErrorCode::PaymentNotFound,
        ErrorCode::CashRegisterNotFound,
        ErrorCode::CashRegisterInactive,
        ErrorCode::SinpePhoneExists,
        ErrorCode::CashRegisterForeign,
        ErrorCode::ReportGenerationFailed,
        ErrorCode::EmployeeNotFound,
        ErrorCode::NationalIdExists,
        ErrorCode::InternalError,
    ];

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::ExternalSyncNotAllowed.code(), 2004);
        assert_eq!(ErrorCode::LegalIdExists.code(), 3002);
        assert_eq!(ErrorCode::ConfigurationExists.code(), 4002);
        assert_eq!(ErrorCode::PaymentNotFound.code(), 5001);
        assert_eq!(ErrorCode::CashRegisterInactive.code(), 6002);
        assert_eq!(ErrorCode::ReportGenerationFailed.code(), 7002);
        assert_eq!(ErrorCode::NationalIdExists.code(), 8002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
    }

    #[test]
    fn test_try_from_covers_every_code() {
        for code in ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(*code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::ConfigurationExists).unwrap();
        assert_eq!(json, "4002");

        let code: ErrorCode = serde_json::from_str("6001").unwrap();
        assert_eq!(code, ErrorCode::CashRegisterNotFound);

        let result: Result<ErrorCode, _> = serde_json::from_str("42");
        assert!(result.is_err());
    }

    #[test]
    fn test_messages_are_not_empty() {
        for code in ALL {
            assert!(!code.message().is_empty(), "{code:?} has no message");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::PaymentNotFound.to_string(), "5001");
    }
}
