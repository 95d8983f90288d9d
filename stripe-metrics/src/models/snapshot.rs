//! Metrics snapshot and the closed set of single-value KPIs.

use super::money::to_major_units;
use crate::error::MetricsError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Flat aggregate built once per metrics request. Money is in minor units.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub mrr: i64,
    pub arr: i64,
    pub active_subscribers: i64,
    pub total_customers: i64,
    pub available_balance: i64,
    pub pending_balance: i64,
    pub new_mrr: i64,
    pub churned_mrr: i64,
    pub net_new_mrr: i64,
    /// Percentage in `[0, 100]`.
    pub churn_rate: f64,
    pub arpu: i64,
    pub trialing_count: i64,
    pub past_due_count: i64,
    pub canceled_in_window: i64,
}

/// Single-value KPIs a caller can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kpi {
    Mrr,
    Arr,
    Subscribers,
    Customers,
    Balance,
    PendingBalance,
    NewMrr,
    ChurnedMrr,
    NetNewMrr,
    ChurnRate,
    Arpu,
    Trialing,
    PastDue,
    CanceledInWindow,
}

impl Kpi {
    pub const ALL: [Kpi; 14] = [
        Kpi::Mrr,
        Kpi::Arr,
        Kpi::Subscribers,
        Kpi::Customers,
        Kpi::Balance,
        Kpi::PendingBalance,
        Kpi::NewMrr,
        Kpi::ChurnedMrr,
        Kpi::NetNewMrr,
        Kpi::ChurnRate,
        Kpi::Arpu,
        Kpi::Trialing,
        Kpi::PastDue,
        Kpi::CanceledInWindow,
    ];

    /// Query name used by callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kpi::Mrr => "mrr",
            Kpi::Arr => "arr",
            Kpi::Subscribers => "subscribers",
            Kpi::Customers => "customers",
            Kpi::Balance => "balance",
            Kpi::PendingBalance => "pending_balance",
            Kpi::NewMrr => "new_mrr",
            Kpi::ChurnedMrr => "churned_mrr",
            Kpi::NetNewMrr => "net_new_mrr",
            Kpi::ChurnRate => "churn_rate",
            Kpi::Arpu => "arpu",
            Kpi::Trialing => "trialing",
            Kpi::PastDue => "past_due",
            Kpi::CanceledInWindow => "canceled_30d",
        }
    }

    /// Display label for the value.
    pub fn label(&self) -> &'static str {
        match self {
            Kpi::Mrr => "MRR",
            Kpi::Arr => "ARR",
            Kpi::Subscribers => "Active Subscribers",
            Kpi::Customers => "Total Customers",
            Kpi::Balance => "Available Balance",
            Kpi::PendingBalance => "Pending Balance",
            Kpi::NewMrr => "New MRR",
            Kpi::ChurnedMrr => "Churned MRR",
            Kpi::NetNewMrr => "Net New MRR",
            Kpi::ChurnRate => "Churn Rate %",
            Kpi::Arpu => "ARPU",
            Kpi::Trialing => "Trialing",
            Kpi::PastDue => "Past Due",
            Kpi::CanceledInWindow => "Canceled In Window",
        }
    }
}

impl FromStr for Kpi {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kpi::ALL
            .into_iter()
            .find(|kpi| kpi.as_str() == s)
            .ok_or_else(|| MetricsError::UnknownMetric(s.to_string()))
    }
}

impl fmt::Display for Kpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum KpiAmount {
    /// Major currency units.
    Money(Decimal),
    Count(i64),
    Percent(f64),
}

/// One KPI read out of a snapshot, tagged with its name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiValue {
    pub kpi: Kpi,
    pub label: &'static str,
    pub amount: KpiAmount,
}

impl MetricsSnapshot {
    /// Read one KPI, converting money with the settlement currency exponent.
    pub fn kpi(&self, kpi: Kpi, exponent: u32) -> KpiValue {
        let money = |minor: i64| KpiAmount::Money(to_major_units(minor, exponent));
        let amount = match kpi {
            Kpi::Mrr => money(self.mrr),
            Kpi::Arr => money(self.arr),
            Kpi::Subscribers => KpiAmount::Count(self.active_subscribers),
            Kpi::Customers => KpiAmount::Count(self.total_customers),
            Kpi::Balance => money(self.available_balance),
            Kpi::PendingBalance => money(self.pending_balance),
            Kpi::NewMrr => money(self.new_mrr),
            Kpi::ChurnedMrr => money(self.churned_mrr),
            Kpi::NetNewMrr => money(self.net_new_mrr),
            Kpi::ChurnRate => KpiAmount::Percent(self.churn_rate),
            Kpi::Arpu => money(self.arpu),
            Kpi::Trialing => KpiAmount::Count(self.trialing_count),
            Kpi::PastDue => KpiAmount::Count(self.past_due_count),
            Kpi::CanceledInWindow => KpiAmount::Count(self.canceled_in_window),
        };

        KpiValue {
            kpi,
            label: kpi.label(),
            amount,
        }
    }
}
