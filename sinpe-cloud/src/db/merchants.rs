//! Merchant Repository

use super::audit::{self, AuditEvent};
use super::{RepoError, RepoResult, begin_write};
use shared::models::{Merchant, MerchantCreate, MerchantUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const TABLE: &str = "merchants";

const COLUMNS: &str = "id, legal_id, legal_id_type, name, category, phone, email, address, registered_at, modified_at, active";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Merchant>> {
    let merchants = sqlx::query_as::<_, Merchant>(&format!(
        "SELECT {COLUMNS} FROM merchants ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(merchants)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Merchant>>
where
    E: SqliteExecutor<'e>,
{
    let merchant = sqlx::query_as::<_, Merchant>(&format!(
        "SELECT {COLUMNS} FROM merchants WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(merchant)
}

/// Insert a merchant; legal id uniqueness is enforced by the schema
pub async fn create(pool: &SqlitePool, data: &MerchantCreate, now: i64) -> RepoResult<Merchant> {
    let mut tx = begin_write(pool).await?;

    let merchant = sqlx::query_as::<_, Merchant>(&format!(
        "INSERT INTO merchants (legal_id, legal_id_type, name, category, phone, email, address, registered_at, active) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1) RETURNING {COLUMNS}"
    ))
    .bind(&data.legal_id)
    .bind(data.legal_id_type)
    .bind(&data.name)
    .bind(data.category)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.address)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let event = AuditEvent::created(
        TABLE,
        format!("Comercio {} registrado", merchant.id),
        &merchant,
    )?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(merchant)
}

/// Editable fields only; legal id and registration date never change
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &MerchantUpdate,
    now: i64,
) -> RepoResult<Merchant> {
    let mut tx = begin_write(pool).await?;

    let before = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Merchant {id} not found")))?;

    let after = sqlx::query_as::<_, Merchant>(&format!(
        "UPDATE merchants SET name = ?, category = ?, phone = ?, email = ?, address = ?, active = ?, modified_at = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(&data.name)
    .bind(data.category)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.address)
    .bind(data.active)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Merchant {id} not found")))?;

    let event = AuditEvent::edited(TABLE, format!("Comercio {id} editado"), &before, &after)?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(after)
}

/// Hard delete; fails with a foreign key error while other rows reference the merchant
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Merchant> {
    let mut tx = begin_write(pool).await?;

    let before = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Merchant {id} not found")))?;

    sqlx::query("DELETE FROM merchants WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let event = AuditEvent::deleted(TABLE, format!("Comercio {id} eliminado"), &before)?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(before)
}
