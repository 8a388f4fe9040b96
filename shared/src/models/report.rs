//! Monthly Report Model (Reporte)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Commission report for one merchant and calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub id: i64,
    pub merchant_id: i64,
    pub register_count: i64,
    pub total_collected: Decimal,
    pub payment_count: i64,
    pub total_commission: Decimal,
    /// First instant of the reported month (Unix millis, UTC)
    pub report_month: i64,
    /// Last time this row was written by the generator
    pub generated_at: i64,
}

/// Aggregated figures for one merchant and month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub register_count: i64,
    pub total_collected: Decimal,
    pub payment_count: i64,
    pub total_commission: Decimal,
}

impl ReportTotals {
    /// Nothing to report: no registers and no payments
    pub fn is_empty(&self) -> bool {
        self.payment_count == 0 && self.register_count == 0
    }
}

impl From<&MonthlyReport> for ReportTotals {
    fn from(report: &MonthlyReport) -> Self {
        Self {
            register_count: report.register_count,
            total_collected: report.total_collected,
            payment_count: report.payment_count,
            total_commission: report.total_commission,
        }
    }
}

/// Summary of one generator run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRun {
    /// First instant of the processed month
    pub report_month: i64,
    pub created: u32,
    pub updated: u32,
    /// Merchants without an active configuration or with nothing to report
    pub skipped: u32,
}
