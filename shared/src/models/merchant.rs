//! Merchant Model (Comercio)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Legal identification kinds
pub const LEGAL_ID_INDIVIDUAL: i32 = 1;
pub const LEGAL_ID_CORPORATE: i32 = 2;

/// Merchant - tenant root of the data model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Merchant {
    pub id: i64,
    /// Legal identification, unique across merchants
    pub legal_id: String,
    /// 1 = Individual, 2 = Corporate
    pub legal_id_type: i32,
    pub name: String,
    /// Merchant category (1 restaurant, 2 supermarket, 3 hardware store, 4 other)
    pub category: i32,
    pub phone: String,
    pub email: String,
    pub address: String,
    /// Unix millis
    pub registered_at: i64,
    pub modified_at: Option<i64>,
    pub active: bool,
}

/// Create merchant payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MerchantCreate {
    #[validate(length(min = 1, max = 30))]
    pub legal_id: String,
    #[validate(range(min = 1, max = 2))]
    pub legal_id_type: i32,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1, max = 4))]
    pub category: i32,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[validate(email, length(max = 200))]
    pub email: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
}

impl MerchantCreate {
    pub fn trimmed(self) -> Self {
        Self {
            legal_id: self.legal_id.trim().to_string(),
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            address: self.address.trim().to_string(),
            ..self
        }
    }
}

/// Update merchant payload
///
/// Legal identification and registration date are fixed after creation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MerchantUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1, max = 4))]
    pub category: i32,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[validate(email, length(max = 200))]
    pub email: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    pub active: bool,
}

impl MerchantUpdate {
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            address: self.address.trim().to_string(),
            ..self
        }
    }
}
