//! Monthly Report Repository

use super::audit::{self, AuditEvent};
use super::{RepoError, RepoResult};
use rust_decimal::Decimal;
use shared::models::{MonthlyReport, ReportTotals};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor, SqlitePool};
use std::str::FromStr;

const TABLE: &str = "monthly_reports";

const COLUMNS: &str = "id, merchant_id, register_count, total_collected, payment_count, total_commission, report_month, generated_at";

#[derive(Debug, FromRow)]
struct ReportRow {
    id: i64,
    merchant_id: i64,
    register_count: i64,
    total_collected: String,
    payment_count: i64,
    total_commission: String,
    report_month: i64,
    generated_at: i64,
}

fn decimal(column: &str, value: &str) -> RepoResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| RepoError::InvalidData(format!("{column} is not a decimal ({value}): {e}")))
}

/// Amounts are persisted with exactly two decimals
fn money_text(mut value: Decimal) -> String {
    value.rescale(2);
    value.to_string()
}

impl TryFrom<ReportRow> for MonthlyReport {
    type Error = RepoError;

    fn try_from(row: ReportRow) -> RepoResult<Self> {
        Ok(Self {
            id: row.id,
            merchant_id: row.merchant_id,
            register_count: row.register_count,
            total_collected: decimal("total_collected", &row.total_collected)?,
            payment_count: row.payment_count,
            total_commission: decimal("total_commission", &row.total_commission)?,
            report_month: row.report_month,
            generated_at: row.generated_at,
        })
    }
}

/// Result of writing one merchant's month
#[derive(Debug, Clone, PartialEq)]
pub enum ReportWrite {
    Created(MonthlyReport),
    Updated(MonthlyReport),
    /// No existing row and nothing to report
    Skipped,
}

/// All reports, newest month first
pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<MonthlyReport>> {
    let rows = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {COLUMNS} FROM monthly_reports ORDER BY report_month DESC, merchant_id, id"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(MonthlyReport::try_from).collect()
}

pub async fn find_by_merchant_month<'e, E>(
    executor: E,
    merchant_id: i64,
    report_month: i64,
) -> RepoResult<Option<MonthlyReport>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {COLUMNS} FROM monthly_reports WHERE merchant_id = ? AND report_month = ?"
    ))
    .bind(merchant_id)
    .bind(report_month)
    .fetch_optional(executor)
    .await?;
    row.map(MonthlyReport::try_from).transpose()
}

/// Overwrite the month's figures or insert a new report, auditing either write
///
/// An existing report is always overwritten, even with empty totals.
pub async fn upsert(
    conn: &mut SqliteConnection,
    merchant_id: i64,
    totals: &ReportTotals,
    report_month: i64,
    now: i64,
) -> RepoResult<ReportWrite> {
    let collected = money_text(totals.total_collected);
    let commission = money_text(totals.total_commission);

    if let Some(before) = find_by_merchant_month(&mut *conn, merchant_id, report_month).await? {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "UPDATE monthly_reports SET register_count = ?, total_collected = ?, payment_count = ?, total_commission = ?, generated_at = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(totals.register_count)
        .bind(&collected)
        .bind(totals.payment_count)
        .bind(&commission)
        .bind(now)
        .bind(before.id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Report {} not found", before.id)))?;
        let after = MonthlyReport::try_from(row)?;

        let event = AuditEvent::edited(
            TABLE,
            format!("Reporte {} actualizado", after.id),
            &ReportTotals::from(&before),
            &ReportTotals::from(&after),
        )?;
        audit::record(&mut *conn, &event).await?;
        return Ok(ReportWrite::Updated(after));
    }

    if totals.is_empty() {
        return Ok(ReportWrite::Skipped);
    }

    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "INSERT INTO monthly_reports (merchant_id, register_count, total_collected, payment_count, total_commission, report_month, generated_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(merchant_id)
    .bind(totals.register_count)
    .bind(&collected)
    .bind(totals.payment_count)
    .bind(&commission)
    .bind(report_month)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    let report = MonthlyReport::try_from(row)?;

    let event = AuditEvent::created(TABLE, format!("Reporte {} generado", report.id), &report)?;
    audit::record(&mut *conn, &event).await?;
    Ok(ReportWrite::Created(report))
}
