//! SINPE Payment Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::cash_register::trim_optional;

/// Received SINPE mobile payment
///
/// `synchronized` flips from false to true once and never reverts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinpePayment {
    pub id: i64,
    pub origin_phone: String,
    pub origin_name: String,
    /// Routing key, matches a cash register's SINPE phone
    pub destination_phone: String,
    pub destination_name: String,
    pub amount: Decimal,
    pub description: Option<String>,
    /// Server time at creation (Unix millis)
    pub registered_at: i64,
    pub synchronized: bool,
}

/// Register payment payload (web form and sync API)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentCreate {
    #[validate(custom(function = "crate::validation::sinpe_phone"))]
    pub origin_phone: String,
    #[validate(length(min = 1, max = 200))]
    pub origin_name: String,
    #[validate(custom(function = "crate::validation::sinpe_phone"))]
    pub destination_phone: String,
    #[validate(length(min = 1, max = 200))]
    pub destination_name: String,
    #[validate(custom(function = "crate::validation::payment_amount"))]
    pub amount: Decimal,
    #[validate(length(max = 50))]
    pub description: Option<String>,
}

impl PaymentCreate {
    pub fn trimmed(self) -> Self {
        Self {
            origin_phone: self.origin_phone.trim().to_string(),
            origin_name: self.origin_name.trim().to_string(),
            destination_phone: self.destination_phone.trim().to_string(),
            destination_name: self.destination_name.trim().to_string(),
            description: trim_optional(self.description),
            amount: self.amount,
        }
    }
}

/// Outcome of a synchronize request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Flag flipped by this call
    Synchronized,
    /// Already synchronized earlier; nothing changed
    AlreadySynchronized,
}
