//! Commission Configuration Model (Configuración)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Channel the merchant is allowed to operate through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigType {
    /// Web platform only
    Platform = 1,
    /// External sync API only
    External = 2,
    /// Platform and external sync API
    Both = 3,
}

impl ConfigType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Platform),
            2 => Some(Self::External),
            3 => Some(Self::Both),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Only External and Both may use the sync API
    pub fn allows_external_api(self) -> bool {
        matches!(self, Self::External | Self::Both)
    }
}

/// Per-merchant configuration, at most one per merchant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Configuration {
    pub id: i64,
    pub merchant_id: i64,
    /// See [`ConfigType`]
    pub config_type: i32,
    /// Whole percentage, 0..=100
    pub commission_percent: i32,
    pub registered_at: i64,
    pub modified_at: Option<i64>,
    pub active: bool,
}

impl Configuration {
    pub fn kind(&self) -> Option<ConfigType> {
        ConfigType::from_code(self.config_type)
    }

    /// Active and typed External or Both
    pub fn allows_external_api(&self) -> bool {
        self.active && self.kind().is_some_and(ConfigType::allows_external_api)
    }
}

/// Create configuration payload
///
/// Registration date, active flag and modification date are set by the server.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfigurationCreate {
    #[validate(range(min = 1))]
    pub merchant_id: i64,
    #[validate(range(min = 1, max = 3))]
    pub config_type: i32,
    #[validate(range(min = 0, max = 100))]
    pub commission_percent: i32,
}

/// Update configuration payload (merchant is fixed)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfigurationUpdate {
    #[validate(range(min = 1, max = 3))]
    pub config_type: i32,
    #[validate(range(min = 0, max = 100))]
    pub commission_percent: i32,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(config_type: i32, active: bool) -> Configuration {
        Configuration {
            id: 1,
            merchant_id: 1,
            config_type,
            commission_percent: 10,
            registered_at: 0,
            modified_at: None,
            active,
        }
    }

    #[test]
    fn test_external_api_gate() {
        assert!(!config(1, true).allows_external_api());
        assert!(config(2, true).allows_external_api());
        assert!(config(3, true).allows_external_api());
        assert!(!config(3, false).allows_external_api());
        assert!(!config(9, true).allows_external_api());
    }

    #[test]
    fn test_commission_bounds() {
        let ok = ConfigurationCreate {
            merchant_id: 1,
            config_type: 3,
            commission_percent: 100,
        };
        assert!(ok.validate().is_ok());

        let bad = ConfigurationCreate {
            commission_percent: 101,
            ..ok
        };
        assert!(bad.validate().is_err());
    }
}
