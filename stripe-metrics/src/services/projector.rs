//! Tabular projector.
//!
//! Turns fetched records into column-aligned tables for external rendering.
//! Every column holds exactly one entry per record. Money leaves the engine
//! here, converted to major units with the currency's minor-unit exponent.

use super::normalizer::subscription_mrr;
use crate::models::{
    minor_unit_exponent, to_major_units, ChargeRecord, InvoiceRecord, ProductRevenue,
    SubscriptionRecord,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ColumnValues {
    Text(Vec<String>),
    Money(Vec<Decimal>),
    Integer(Vec<i64>),
    Bool(Vec<bool>),
    Timestamp(Vec<DateTime<Utc>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Text(values) => values.len(),
            ColumnValues::Money(values) => values.len(),
            ColumnValues::Integer(values) => values.len(),
            ColumnValues::Bool(values) => values.len(),
            ColumnValues::Timestamp(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: &'static str,
    pub values: ColumnValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: &'static str,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&ColumnValues> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| &column.values)
    }

    /// Number of rows; all columns share it.
    pub fn row_count(&self) -> usize {
        self.columns.first().map(|column| column.values.len()).unwrap_or(0)
    }
}

fn column<T, F>(
    name: &'static str,
    records: &[T],
    wrap: fn(Vec<F>) -> ColumnValues,
    f: impl Fn(&T) -> F,
) -> Column {
    Column {
        name,
        values: wrap(records.iter().map(f).collect()),
    }
}

fn money(minor: i64, currency: &str) -> Decimal {
    to_major_units(minor, minor_unit_exponent(currency))
}

pub fn subscriptions_table(subscriptions: &[SubscriptionRecord]) -> Table {
    Table {
        name: "subscriptions",
        columns: vec![
            column("id", subscriptions, ColumnValues::Text, |s| s.id.clone()),
            column("status", subscriptions, ColumnValues::Text, |s| {
                s.status.as_str().to_string()
            }),
            column("customer", subscriptions, ColumnValues::Text, |s| {
                s.customer_id.clone()
            }),
            column("mrr", subscriptions, ColumnValues::Money, |s| {
                money(subscription_mrr(s), &s.currency)
            }),
            column("plan", subscriptions, ColumnValues::Text, |s| s.plan_label()),
            column("interval", subscriptions, ColumnValues::Text, |s| {
                s.interval_label().to_string()
            }),
            column("created", subscriptions, ColumnValues::Timestamp, |s| s.created),
        ],
    }
}

pub fn invoices_table(invoices: &[InvoiceRecord]) -> Table {
    Table {
        name: "invoices",
        columns: vec![
            column("id", invoices, ColumnValues::Text, |i| i.id.clone()),
            column("customer", invoices, ColumnValues::Text, |i| i.customer_id.clone()),
            column("status", invoices, ColumnValues::Text, |i| {
                i.status.as_str().to_string()
            }),
            column("amount", invoices, ColumnValues::Money, |i| money(i.total, &i.currency)),
            column("amount_paid", invoices, ColumnValues::Money, |i| {
                money(i.amount_paid, &i.currency)
            }),
            column("created", invoices, ColumnValues::Timestamp, |i| i.created),
            column("paid", invoices, ColumnValues::Bool, |i| i.paid),
        ],
    }
}

pub fn charges_table(charges: &[ChargeRecord]) -> Table {
    Table {
        name: "charges",
        columns: vec![
            column("id", charges, ColumnValues::Text, |c| c.id.clone()),
            column("customer", charges, ColumnValues::Text, |c| c.customer_id.clone()),
            column("status", charges, ColumnValues::Text, |c| {
                c.status.as_str().to_string()
            }),
            column("amount", charges, ColumnValues::Money, |c| money(c.amount, &c.currency)),
            column("created", charges, ColumnValues::Timestamp, |c| c.created),
            column("paid", charges, ColumnValues::Bool, |c| c.paid),
            column("refunded", charges, ColumnValues::Bool, |c| c.refunded),
            column("amount_refunded", charges, ColumnValues::Money, |c| {
                money(c.amount_refunded, &c.currency)
            }),
        ],
    }
}

/// Product revenue table, sorted by product id for stable presentation.
pub fn product_revenue_table(products: &[ProductRevenue], currency: &str) -> Table {
    let mut sorted = products.to_vec();
    sorted.sort_by(|a, b| a.product_id.cmp(&b.product_id));

    Table {
        name: "products",
        columns: vec![
            column("product_id", &sorted, ColumnValues::Text, |p| p.product_id.clone()),
            column("product", &sorted, ColumnValues::Text, |p| p.product_name.clone()),
            column("mrr", &sorted, ColumnValues::Money, |p| money(p.revenue, currency)),
            column("subscriptions", &sorted, ColumnValues::Integer, |p| {
                p.subscription_count
            }),
        ],
    }
}
