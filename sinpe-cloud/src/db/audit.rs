//! Audit log (Bitácora) - append-only
//!
//! `record` is the only write path. Mutating repository functions call it
//! with their open transaction; error events are written on their own after
//! the failed unit of work has been rolled back.

use serde::Serialize;
use shared::models::{AuditEntry, AuditEventType};
use sqlx::{SqliteExecutor, SqlitePool};

use super::RepoResult;

/// Event to append to the audit log
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub table: &'static str,
    pub event_type: AuditEventType,
    pub description: String,
    pub stack_trace: Option<String>,
    pub data_before: Option<String>,
    pub data_after: Option<String>,
}

impl AuditEvent {
    pub fn created<T: Serialize>(
        table: &'static str,
        description: impl Into<String>,
        after: &T,
    ) -> RepoResult<Self> {
        Ok(Self {
            table,
            event_type: AuditEventType::Create,
            description: description.into(),
            stack_trace: None,
            data_before: None,
            data_after: Some(serde_json::to_string(after)?),
        })
    }

    pub fn edited<B: Serialize, A: Serialize>(
        table: &'static str,
        description: impl Into<String>,
        before: &B,
        after: &A,
    ) -> RepoResult<Self> {
        Ok(Self {
            table,
            event_type: AuditEventType::Edit,
            description: description.into(),
            stack_trace: None,
            data_before: Some(serde_json::to_string(before)?),
            data_after: Some(serde_json::to_string(after)?),
        })
    }

    pub fn deleted<T: Serialize>(
        table: &'static str,
        description: impl Into<String>,
        before: &T,
    ) -> RepoResult<Self> {
        Ok(Self {
            table,
            event_type: AuditEventType::Delete,
            description: description.into(),
            stack_trace: None,
            data_before: Some(serde_json::to_string(before)?),
            data_after: None,
        })
    }

    /// Error event: the message becomes the description, the source chain the trace
    pub fn error(table: &'static str, err: &(dyn std::error::Error + 'static)) -> Self {
        Self {
            table,
            event_type: AuditEventType::Error,
            description: err.to_string(),
            stack_trace: Some(error_chain(err)),
            data_before: None,
            data_after: None,
        }
    }
}

/// Render an error and all of its sources, one per line
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = format!("{err}");
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\ncaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Append one entry; returns the new entry id
pub async fn record<'e, E>(executor: E, event: &AuditEvent) -> RepoResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO audit_log (event_table, event_type, event_time, description, stack_trace, data_before, data_after) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(event.table)
    .bind(event.event_type.as_str())
    .bind(now)
    .bind(&event.description)
    .bind(&event.stack_trace)
    .bind(&event.data_before)
    .bind(&event.data_after)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

/// All entries, newest first
pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<AuditEntry>> {
    let rows = sqlx::query_as::<_, AuditEntry>(
        "SELECT id, event_table, event_type, event_time, description, stack_trace, data_before, data_after FROM audit_log ORDER BY event_time DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer(#[source] std::io::Error);

    #[tokio::test]
    async fn test_record_and_list_newest_first() {
        let pool = testing::pool().await;
        let first = AuditEvent::created("merchants", "Comercio 1 registrado", &serde_json::json!({"id": 1}))
            .unwrap();
        let second = AuditEvent::deleted("merchants", "Comercio 1 eliminado", &serde_json::json!({"id": 1}))
            .unwrap();
        let first_id = record(&pool, &first).await.unwrap();
        let second_id = record(&pool, &second).await.unwrap();

        let entries = list(&pool).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second_id);
        assert_eq!(entries[1].id, first_id);
        assert_eq!(entries[0].event_type, "Eliminar");
        assert_eq!(entries[0].data_before.as_deref(), Some(r#"{"id":1}"#));
        assert_eq!(entries[1].data_after.as_deref(), Some(r#"{"id":1}"#));
    }

    #[tokio::test]
    async fn test_error_event_keeps_source_chain() {
        let pool = testing::pool().await;
        let err = Outer(std::io::Error::other("disk gone"));
        record(&pool, &AuditEvent::error("sinpe_payments", &err))
            .await
            .unwrap();

        let entries = list(&pool).await.unwrap();
        assert_eq!(entries[0].event_type, "Error");
        assert_eq!(entries[0].description, "outer failure");
        assert_eq!(
            entries[0].stack_trace.as_deref(),
            Some("outer failure\ncaused by: disk gone")
        );
    }

    #[tokio::test]
    async fn test_entries_cannot_be_mutated() {
        let pool = testing::pool().await;
        let event = AuditEvent::created("merchants", "x", &1).unwrap();
        let id = record(&pool, &event).await.unwrap();

        let update = sqlx::query("UPDATE audit_log SET description = 'y' WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM audit_log WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await;
        assert!(delete.is_err());
    }
}
