//! Cash Register Repository

use super::audit::{self, AuditEvent};
use super::{RepoError, RepoResult, begin_write};
use shared::models::{CashRegister, CashRegisterCreate, CashRegisterUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const TABLE: &str = "cash_registers";

const COLUMNS: &str =
    "id, merchant_id, name, description, sinpe_phone, registered_at, modified_at, active";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<CashRegister>> {
    let rows = sqlx::query_as::<_, CashRegister>(&format!(
        "SELECT {COLUMNS} FROM cash_registers ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_by_merchant(pool: &SqlitePool, merchant_id: i64) -> RepoResult<Vec<CashRegister>> {
    let rows = sqlx::query_as::<_, CashRegister>(&format!(
        "SELECT {COLUMNS} FROM cash_registers WHERE merchant_id = ? ORDER BY id"
    ))
    .bind(merchant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<CashRegister>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, CashRegister>(&format!(
        "SELECT {COLUMNS} FROM cash_registers WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// Resolve the register a SINPE phone routes to
pub async fn find_by_phone<'e, E>(executor: E, sinpe_phone: &str) -> RepoResult<Option<CashRegister>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, CashRegister>(&format!(
        "SELECT {COLUMNS} FROM cash_registers WHERE sinpe_phone = ?"
    ))
    .bind(sinpe_phone)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// SINPE phones of every register the merchant owns
pub async fn phones_by_merchant<'e, E>(executor: E, merchant_id: i64) -> RepoResult<Vec<String>>
where
    E: SqliteExecutor<'e>,
{
    let phones = sqlx::query_scalar::<_, String>(
        "SELECT sinpe_phone FROM cash_registers WHERE merchant_id = ? ORDER BY id",
    )
    .bind(merchant_id)
    .fetch_all(executor)
    .await?;
    Ok(phones)
}

pub async fn create(
    pool: &SqlitePool,
    data: &CashRegisterCreate,
    now: i64,
) -> RepoResult<CashRegister> {
    let mut tx = begin_write(pool).await?;

    let register = sqlx::query_as::<_, CashRegister>(&format!(
        "INSERT INTO cash_registers (merchant_id, name, description, sinpe_phone, registered_at, active) VALUES (?, ?, ?, ?, ?, 1) RETURNING {COLUMNS}"
    ))
    .bind(data.merchant_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.sinpe_phone)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let event = AuditEvent::created(TABLE, format!("Caja {} registrada", register.id), &register)?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(register)
}

/// Owning merchant is fixed after creation
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &CashRegisterUpdate,
    now: i64,
) -> RepoResult<CashRegister> {
    let mut tx = begin_write(pool).await?;

    let before = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Cash register {id} not found")))?;

    let after = sqlx::query_as::<_, CashRegister>(&format!(
        "UPDATE cash_registers SET name = ?, description = ?, sinpe_phone = ?, active = ?, modified_at = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.sinpe_phone)
    .bind(data.active)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Cash register {id} not found")))?;

    let event = AuditEvent::edited(TABLE, format!("Caja {id} editada"), &before, &after)?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(after)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<CashRegister> {
    let mut tx = begin_write(pool).await?;

    let before = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Cash register {id} not found")))?;

    sqlx::query("DELETE FROM cash_registers WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let event = AuditEvent::deleted(TABLE, format!("Caja {id} eliminada"), &before)?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    #[tokio::test]
    async fn test_phone_routes_to_register() {
        let pool = testing::pool().await;
        let merchant = testing::merchant(&pool, "3-101-000001").await;
        let register = testing::register(&pool, merchant.id, "88887777").await;

        let found = find_by_phone(&pool, "88887777").await.unwrap().unwrap();
        assert_eq!(found, register);
        assert!(find_by_phone(&pool, "80000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_rejected() {
        let pool = testing::pool().await;
        let a = testing::merchant(&pool, "3-101-000001").await;
        let b = testing::merchant(&pool, "3-101-000002").await;
        testing::register(&pool, a.id, "88887777").await;

        let form = CashRegisterCreate {
            merchant_id: b.id,
            name: "Caja B".into(),
            description: None,
            sinpe_phone: "88887777".into(),
        };
        let err = create(&pool, &form, 1).await.unwrap_err();
        assert!(
            matches!(err, RepoError::Duplicate(ref cols) if cols == "cash_registers.sinpe_phone")
        );
    }

    #[tokio::test]
    async fn test_listing_is_scoped_and_ordered() {
        let pool = testing::pool().await;
        let a = testing::merchant(&pool, "3-101-000001").await;
        let b = testing::merchant(&pool, "3-101-000002").await;
        let first = testing::register(&pool, a.id, "88880001").await;
        testing::register(&pool, b.id, "88880002").await;
        let third = testing::register(&pool, a.id, "88880003").await;

        let own = list_by_merchant(&pool, a.id).await.unwrap();
        assert_eq!(own, vec![first, third]);
        assert_eq!(
            phones_by_merchant(&pool, a.id).await.unwrap(),
            vec!["88880001", "88880003"]
        );
        assert_eq!(find_all(&pool).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_keeps_merchant() {
        let pool = testing::pool().await;
        let merchant = testing::merchant(&pool, "3-101-000001").await;
        let register = testing::register(&pool, merchant.id, "88887777").await;

        let form = CashRegisterUpdate {
            name: "Caja Principal".into(),
            description: Some("Mostrador".into()),
            sinpe_phone: "88887778".into(),
            active: false,
        };
        let updated = update(&pool, register.id, &form, 7).await.unwrap();
        assert_eq!(updated.merchant_id, merchant.id);
        assert_eq!(updated.sinpe_phone, "88887778");
        assert_eq!(updated.description.as_deref(), Some("Mostrador"));
        assert!(!updated.active);
        assert_eq!(updated.modified_at, Some(7));
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let pool = testing::pool().await;
        let merchant = testing::merchant(&pool, "3-101-000001").await;
        let register = testing::register(&pool, merchant.id, "88887777").await;

        delete(&pool, register.id).await.unwrap();
        assert!(matches!(
            delete(&pool, register.id).await.unwrap_err(),
            RepoError::NotFound(_)
        ));
    }
}
