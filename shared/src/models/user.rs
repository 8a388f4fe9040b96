//! Identity account and role models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum password length for identity accounts
pub const MIN_PASSWORD_LEN: usize = 6;

/// Authorization role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Administrador")]
    Administrator,
    #[serde(rename = "Contador")]
    Accountant,
    #[serde(rename = "Cajero")]
    Cashier,
    /// Merchant system using the sync API with a bearer token
    #[serde(rename = "ComercioAPI")]
    MerchantApi,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "Administrador",
            Self::Accountant => "Contador",
            Self::Cashier => "Cajero",
            Self::MerchantApi => "ComercioAPI",
        }
    }

    /// Administrator or Accountant
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Administrator | Self::Accountant)
    }

    /// Roles an identity account may register with
    pub fn is_registrable(&self) -> bool {
        !matches!(self, Self::MerchantApi)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Administrador" => Ok(Self::Administrator),
            "Contador" => Ok(Self::Accountant),
            "Cajero" => Ok(Self::Cashier),
            "ComercioAPI" => Ok(Self::MerchantApi),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

/// Authenticated principal as returned to web clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    pub merchant_id: Option<i64>,
}
