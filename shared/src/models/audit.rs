//! Audit Log Model (Bitácora)

use serde::{Deserialize, Serialize};

/// Kind of audited event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEventType {
    #[serde(rename = "Registrar")]
    Create,
    #[serde(rename = "Editar")]
    Edit,
    #[serde(rename = "Eliminar")]
    Delete,
    #[serde(rename = "Error")]
    Error,
}

impl AuditEventType {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Registrar",
            Self::Edit => "Editar",
            Self::Delete => "Eliminar",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit log row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AuditEntry {
    pub id: i64,
    pub event_table: String,
    pub event_type: String,
    pub event_time: i64,
    pub description: String,
    pub stack_trace: Option<String>,
    /// Serialized JSON snapshot before the change
    pub data_before: Option<String>,
    /// Serialized JSON snapshot after the change
    pub data_after: Option<String>,
}
