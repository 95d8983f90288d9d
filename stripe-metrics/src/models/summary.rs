//! Aggregated invoice and charge figures. Money is in minor units.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RevenueSummary {
    /// Sum of `amount_paid` across paid invoices.
    pub total_revenue: i64,
    pub paid_invoices: i64,
    pub unpaid_invoices: i64,
    pub overdue_invoices: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChargeSummary {
    pub total_charges: i64,
    pub successful_amount: i64,
    pub failed_count: i64,
    pub refunded_count: i64,
    pub refunded_amount: i64,
}
