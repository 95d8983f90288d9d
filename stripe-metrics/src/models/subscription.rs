//! Subscription model.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Subscription status as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Unpaid,
    Incomplete,
    IncompleteExpired,
    Paused,
    Unknown,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Unknown => "unknown",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "past_due" => SubscriptionStatus::PastDue,
            "canceled" => SubscriptionStatus::Canceled,
            "unpaid" => SubscriptionStatus::Unpaid,
            "incomplete" => SubscriptionStatus::Incomplete,
            "incomplete_expired" => SubscriptionStatus::IncompleteExpired,
            "paused" => SubscriptionStatus::Paused,
            _ => SubscriptionStatus::Unknown,
        }
    }
}

/// Recurring billing interval of a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Day,
    Week,
    Month,
    Year,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Day => "day",
            BillingInterval::Week => "week",
            BillingInterval::Month => "month",
            BillingInterval::Year => "year",
        }
    }

    /// Returns `None` for intervals the provider may add later.
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "day" => Some(BillingInterval::Day),
            "week" => Some(BillingInterval::Week),
            "month" => Some(BillingInterval::Month),
            "year" => Some(BillingInterval::Year),
            _ => None,
        }
    }
}

/// One priced line of a subscription.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub price_id: String,
    /// Price nickname, when the merchant set one.
    pub nickname: Option<String>,
    pub product_id: Option<String>,
    /// Product display name; only present when the product was expanded.
    pub product_name: Option<String>,
    /// Amount in smallest currency unit.
    pub unit_amount: i64,
    pub quantity: i64,
    /// `None` for one-time prices embedded in a subscription.
    pub interval: Option<BillingInterval>,
}

/// Subscription as fetched from the provider. Read-only after fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRecord {
    pub id: String,
    pub status: SubscriptionStatus,
    pub customer_id: String,
    pub currency: String,
    pub created: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub items: Vec<LineItem>,
}

impl SubscriptionRecord {
    /// Plan label of the first line item: price nickname, else product id.
    pub fn plan_label(&self) -> String {
        self.items
            .first()
            .and_then(|item| item.nickname.clone().or_else(|| item.product_id.clone()))
            .unwrap_or_default()
    }

    /// Interval label of the first line item, empty when not recurring.
    pub fn interval_label(&self) -> &'static str {
        self.items
            .first()
            .and_then(|item| item.interval)
            .map(|interval| interval.as_str())
            .unwrap_or("")
    }
}
