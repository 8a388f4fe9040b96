//! SINPE Payment Repository
//!
//! Amounts are stored as integer cents and mapped to `Decimal` on the way out.

use super::audit::{self, AuditEvent};
use super::{RepoError, RepoResult, begin_write};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{PaymentCreate, SinpePayment, SyncOutcome};
use shared::util::{from_cents, to_cents};
use sqlx::{FromRow, SqliteExecutor, SqlitePool};

const TABLE: &str = "sinpe_payments";

const COLUMNS: &str = "id, origin_phone, origin_name, destination_phone, destination_name, amount_cents, description, registered_at, synchronized";

#[derive(Debug, FromRow)]
struct PaymentRow {
    id: i64,
    origin_phone: String,
    origin_name: String,
    destination_phone: String,
    destination_name: String,
    amount_cents: i64,
    description: Option<String>,
    registered_at: i64,
    synchronized: bool,
}

impl From<PaymentRow> for SinpePayment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            origin_phone: row.origin_phone,
            origin_name: row.origin_name,
            destination_phone: row.destination_phone,
            destination_name: row.destination_name,
            amount: from_cents(row.amount_cents),
            description: row.description,
            registered_at: row.registered_at,
            synchronized: row.synchronized,
        }
    }
}

/// Fields captured in the audit log when a payment is synchronized
#[derive(Debug, Serialize)]
struct SyncSnapshot<'a> {
    id: i64,
    synchronized: bool,
    destination_phone: &'a str,
    amount: Decimal,
    registered_at: i64,
}

impl<'a> SyncSnapshot<'a> {
    fn of(payment: &'a SinpePayment, synchronized: bool) -> Self {
        Self {
            id: payment.id,
            synchronized,
            destination_phone: &payment.destination_phone,
            amount: payment.amount,
            registered_at: payment.registered_at,
        }
    }
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<SinpePayment>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, PaymentRow>(&format!(
        "SELECT {COLUMNS} FROM sinpe_payments WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(SinpePayment::from))
}

/// Payments routed to one register phone, newest first
pub async fn list_by_destination(
    pool: &SqlitePool,
    destination_phone: &str,
) -> RepoResult<Vec<SinpePayment>> {
    let rows = sqlx::query_as::<_, PaymentRow>(&format!(
        "SELECT {COLUMNS} FROM sinpe_payments WHERE destination_phone = ? ORDER BY registered_at DESC, id DESC"
    ))
    .bind(destination_phone)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(SinpePayment::from).collect())
}

/// Persist a received payment, unsynchronized, stamped with `registered_at`
///
/// Register resolution happens in the ledger service; this only writes.
pub async fn create(
    pool: &SqlitePool,
    data: &PaymentCreate,
    registered_at: i64,
) -> RepoResult<SinpePayment> {
    let amount_cents = to_cents(data.amount)
        .filter(|cents| *cents > 0)
        .ok_or_else(|| RepoError::InvalidData(format!("amount out of range: {}", data.amount)))?;

    let mut tx = begin_write(pool).await?;

    let row = sqlx::query_as::<_, PaymentRow>(&format!(
        "INSERT INTO sinpe_payments (origin_phone, origin_name, destination_phone, destination_name, amount_cents, description, registered_at, synchronized) VALUES (?, ?, ?, ?, ?, ?, ?, 0) RETURNING {COLUMNS}"
    ))
    .bind(&data.origin_phone)
    .bind(&data.origin_name)
    .bind(&data.destination_phone)
    .bind(&data.destination_name)
    .bind(amount_cents)
    .bind(&data.description)
    .bind(registered_at)
    .fetch_one(&mut *tx)
    .await?;
    let payment = SinpePayment::from(row);

    let event = AuditEvent::created(TABLE, format!("SINPE {} registrado", payment.id), &payment)?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(payment)
}

/// Flip `synchronized` to true exactly once
///
/// The guarded UPDATE makes a concurrent second caller observe
/// `AlreadySynchronized` instead of writing a second audit entry.
pub async fn mark_synchronized(pool: &SqlitePool, id: i64) -> RepoResult<SyncOutcome> {
    let mut tx = begin_write(pool).await?;

    let payment = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payment {id} not found")))?;
    if payment.synchronized {
        return Ok(SyncOutcome::AlreadySynchronized);
    }

    let result =
        sqlx::query("UPDATE sinpe_payments SET synchronized = 1 WHERE id = ? AND synchronized = 0")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    if result.rows_affected() == 0 {
        return Ok(SyncOutcome::AlreadySynchronized);
    }

    let event = AuditEvent::edited(
        TABLE,
        format!("SINPE {id} sincronizado"),
        &SyncSnapshot::of(&payment, false),
        &SyncSnapshot::of(&payment, true),
    )?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(SyncOutcome::Synchronized)
}

/// Payment count and collected amount for the merchant's registers in `[from, to)`
///
/// Summed as `Decimal`: a month of large transfers overflows an SQLite
/// integer `SUM` over cents.
pub async fn totals_for_merchant<'e, E>(
    executor: E,
    merchant_id: i64,
    from: i64,
    to: i64,
) -> RepoResult<(i64, Decimal)>
where
    E: SqliteExecutor<'e>,
{
    let amounts = sqlx::query_scalar::<_, i64>(
        "SELECT p.amount_cents FROM sinpe_payments p \
         WHERE p.destination_phone IN (SELECT sinpe_phone FROM cash_registers WHERE merchant_id = ?) \
         AND p.registered_at >= ? AND p.registered_at < ?",
    )
    .bind(merchant_id)
    .bind(from)
    .bind(to)
    .fetch_all(executor)
    .await?;

    let total = amounts
        .iter()
        .try_fold(Decimal::ZERO, |sum, cents| sum.checked_add(from_cents(*cents)))
        .ok_or_else(|| {
            RepoError::InvalidData(format!("collected total overflows for merchant {merchant_id}"))
        })?;
    Ok((amounts.len() as i64, total))
}
