//! Monthly commission report generator
//!
//! One run covers the calendar month containing `now` (UTC). Each merchant
//! is written in its own transaction; a failure stops the run but keeps the
//! merchants already committed.

use chrono::{DateTime, Datelike, Months, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use shared::error::ErrorCode;
use shared::models::{ReportRun, ReportTotals};
use sqlx::SqlitePool;

use crate::db::reports::{self, ReportWrite};
use crate::db::{self, cash_registers, configurations, merchants, payments};
use crate::error::{ServiceError, ServiceResult};

const TABLE: &str = "monthly_reports";

pub const GENERATION_FAILED: &str =
    "Ocurrió un error inesperado al generar los reportes. Por favor, revise la Bitácora.";

/// `[first instant of the month, first instant of the next month)` in Unix millis
pub fn month_window(now: DateTime<Utc>) -> Option<(i64, i64)> {
    let first = now
        .date_naive()
        .with_day(1)?
        .and_hms_opt(0, 0, 0)?
        .and_utc();
    let next = first.checked_add_months(Months::new(1))?;
    Some((first.timestamp_millis(), next.timestamp_millis()))
}

/// `total * percent / 100`, rounded half away from zero to cents
pub fn commission(total: Decimal, percent: i32) -> Decimal {
    (total * Decimal::from(percent) / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Generate or refresh every merchant's report for the current month
///
/// Merchants without an active configuration are skipped silently. Any
/// system failure is audited and reported with a generic message.
pub async fn generate_monthly_reports(
    pool: &SqlitePool,
    now: DateTime<Utc>,
) -> ServiceResult<ReportRun> {
    match run(pool, now).await {
        Ok(summary) => {
            tracing::info!(
                report_month = summary.report_month,
                created = summary.created,
                updated = summary.updated,
                skipped = summary.skipped,
                "Monthly reports generated"
            );
            Ok(summary)
        }
        Err(err) => Err(err
            .audited(pool, TABLE)
            .await
            .with_failure_message(ErrorCode::ReportGenerationFailed, GENERATION_FAILED)),
    }
}

async fn run(pool: &SqlitePool, now: DateTime<Utc>) -> ServiceResult<ReportRun> {
    let (from, to) = month_window(now)
        .ok_or_else(|| ServiceError::Db(format!("no month window for {now}").into()))?;
    let generated_at = now.timestamp_millis();

    let mut summary = ReportRun {
        report_month: from,
        ..ReportRun::default()
    };

    for merchant in merchants::find_all(pool).await? {
        let mut tx = db::begin_write(pool).await?;

        let Some(config) = configurations::find_active_by_merchant(&mut *tx, merchant.id).await?
        else {
            summary.skipped += 1;
            continue;
        };

        let phones = cash_registers::phones_by_merchant(&mut *tx, merchant.id).await?;
        let (payment_count, total_collected) =
            payments::totals_for_merchant(&mut *tx, merchant.id, from, to).await?;

        let totals = ReportTotals {
            register_count: phones.len() as i64,
            total_collected,
            payment_count,
            total_commission: commission(total_collected, config.commission_percent),
        };

        match reports::upsert(&mut tx, merchant.id, &totals, from, generated_at).await? {
            ReportWrite::Created(_) => summary.created += 1,
            ReportWrite::Updated(_) => summary.updated += 1,
            ReportWrite::Skipped => summary.skipped += 1,
        }
        tx.commit().await?;
    }

    Ok(summary)
}
