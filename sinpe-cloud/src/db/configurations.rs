//! Configuration Repository

use super::audit::{self, AuditEvent};
use super::{RepoError, RepoResult, begin_write};
use shared::models::{Configuration, ConfigurationCreate, ConfigurationUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const TABLE: &str = "configurations";

const COLUMNS: &str =
    "id, merchant_id, config_type, commission_percent, registered_at, modified_at, active";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Configuration>> {
    let rows = sqlx::query_as::<_, Configuration>(&format!(
        "SELECT {COLUMNS} FROM configurations ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Configuration>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, Configuration>(&format!(
        "SELECT {COLUMNS} FROM configurations WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// The merchant's configuration, only while it is active
pub async fn find_active_by_merchant<'e, E>(
    executor: E,
    merchant_id: i64,
) -> RepoResult<Option<Configuration>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, Configuration>(&format!(
        "SELECT {COLUMNS} FROM configurations WHERE merchant_id = ? AND active = 1"
    ))
    .bind(merchant_id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// Insert the merchant's configuration
///
/// A second configuration for the same merchant fails with
/// `Duplicate("configurations.merchant_id")` and writes nothing.
pub async fn create(
    pool: &SqlitePool,
    data: &ConfigurationCreate,
    now: i64,
) -> RepoResult<Configuration> {
    let mut tx = begin_write(pool).await?;

    let config = sqlx::query_as::<_, Configuration>(&format!(
        "INSERT INTO configurations (merchant_id, config_type, commission_percent, registered_at, modified_at, active) VALUES (?, ?, ?, ?, NULL, 1) RETURNING {COLUMNS}"
    ))
    .bind(data.merchant_id)
    .bind(data.config_type)
    .bind(data.commission_percent)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let event = AuditEvent::created(
        TABLE,
        format!("Configuración {} registrada", config.id),
        &config,
    )?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(config)
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &ConfigurationUpdate,
    now: i64,
) -> RepoResult<Configuration> {
    let mut tx = begin_write(pool).await?;

    let before = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Configuration {id} not found")))?;

    let after = sqlx::query_as::<_, Configuration>(&format!(
        "UPDATE configurations SET config_type = ?, commission_percent = ?, active = ?, modified_at = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(data.config_type)
    .bind(data.commission_percent)
    .bind(data.active)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Configuration {id} not found")))?;

    let event = AuditEvent::edited(
        TABLE,
        format!("Configuración {id} editada"),
        &before,
        &after,
    )?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(after)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Configuration> {
    let mut tx = begin_write(pool).await?;

    let before = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Configuration {id} not found")))?;

    sqlx::query("DELETE FROM configurations WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let event = AuditEvent::deleted(TABLE, format!("Configuración {id} eliminada"), &before)?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(before)
}
