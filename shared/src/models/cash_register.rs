//! Cash Register Model (Caja)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Cash register; its SINPE phone routes incoming payments to the merchant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CashRegister {
    pub id: i64,
    pub merchant_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Unique across registers
    pub sinpe_phone: String,
    pub registered_at: i64,
    pub modified_at: Option<i64>,
    pub active: bool,
}

/// Create cash register payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CashRegisterCreate {
    #[validate(range(min = 1))]
    pub merchant_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    #[validate(custom(function = "crate::validation::sinpe_phone"))]
    pub sinpe_phone: String,
}

impl CashRegisterCreate {
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: trim_optional(self.description),
            sinpe_phone: self.sinpe_phone.trim().to_string(),
            ..self
        }
    }
}

/// Update cash register payload (owning merchant is fixed)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CashRegisterUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    #[validate(custom(function = "crate::validation::sinpe_phone"))]
    pub sinpe_phone: String,
    pub active: bool,
}

impl CashRegisterUpdate {
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: trim_optional(self.description),
            sinpe_phone: self.sinpe_phone.trim().to_string(),
            ..self
        }
    }
}

/// Trim an optional text field, collapsing blank input to `None`
pub fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_description_becomes_none() {
        let form = CashRegisterCreate {
            merchant_id: 1,
            name: " Caja 1 ".into(),
            description: Some("   ".into()),
            sinpe_phone: " 88887777 ".into(),
        }
        .trimmed();
        assert_eq!(form.name, "Caja 1");
        assert_eq!(form.description, None);
        assert_eq!(form.sinpe_phone, "88887777");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_phone() {
        let form = CashRegisterUpdate {
            name: "Caja".into(),
            description: None,
            sinpe_phone: "8888".into(),
            active: true,
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("sinpe_phone"));
    }
}
