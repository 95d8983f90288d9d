//! Invoice revenue and charge summaries.

use crate::models::{ChargeRecord, ChargeStatus, ChargeSummary, InvoiceRecord, RevenueSummary};
use chrono::{DateTime, Utc};

pub fn revenue_summary(invoices: &[InvoiceRecord], now: DateTime<Utc>) -> RevenueSummary {
    invoices
        .iter()
        .fold(RevenueSummary::default(), |mut summary, invoice| {
            if invoice.paid {
                summary.total_revenue += invoice.amount_paid;
                summary.paid_invoices += 1;
            } else {
                summary.unpaid_invoices += 1;
                if invoice.is_overdue(now) {
                    summary.overdue_invoices += 1;
                }
            }
            summary
        })
}

pub fn charge_summary(charges: &[ChargeRecord]) -> ChargeSummary {
    charges
        .iter()
        .fold(ChargeSummary::default(), |mut summary, charge| {
            summary.total_charges += 1;
            if charge.paid {
                summary.successful_amount += charge.amount;
            }
            if charge.status == ChargeStatus::Failed {
                summary.failed_count += 1;
            }
            if charge.refunded {
                summary.refunded_count += 1;
                summary.refunded_amount += charge.amount_refunded;
            }
            summary
        })
}
