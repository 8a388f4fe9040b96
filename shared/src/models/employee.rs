//! Employee Model (Usuario)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Employee of a merchant, optionally linked to an identity account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub merchant_id: i64,
    /// Identity account (users.id) set when a Cashier registers
    pub identity_account_id: Option<String>,
    pub names: String,
    pub surname1: String,
    pub surname2: String,
    /// Unique across all employees
    pub national_id: String,
    pub email: String,
    pub registered_at: i64,
    pub modified_at: Option<i64>,
    pub active: bool,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeCreate {
    #[validate(range(min = 1))]
    pub merchant_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub names: String,
    #[validate(length(min = 1, max = 100))]
    pub surname1: String,
    #[validate(length(min = 1, max = 100))]
    pub surname2: String,
    #[validate(length(min = 1, max = 10))]
    pub national_id: String,
    #[validate(email, length(max = 200))]
    pub email: String,
}

/// Update employee payload
///
/// The identity link is only written by registration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeUpdate {
    #[validate(range(min = 1))]
    pub merchant_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub names: String,
    #[validate(length(min = 1, max = 100))]
    pub surname1: String,
    #[validate(length(min = 1, max = 100))]
    pub surname2: String,
    #[validate(length(min = 1, max = 10))]
    pub national_id: String,
    #[validate(email, length(max = 200))]
    pub email: String,
    pub active: bool,
}

macro_rules! trim_employee_fields {
    ($form:expr) => {
        Self {
            names: $form.names.trim().to_string(),
            surname1: $form.surname1.trim().to_string(),
            surname2: $form.surname2.trim().to_string(),
            national_id: $form.national_id.trim().to_string(),
            email: $form.email.trim().to_lowercase(),
            ..$form
        }
    };
}

impl EmployeeCreate {
    pub fn trimmed(self) -> Self {
        trim_employee_fields!(self)
    }
}

impl EmployeeUpdate {
    pub fn trimmed(self) -> Self {
        trim_employee_fields!(self)
    }
}
