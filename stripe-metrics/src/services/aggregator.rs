//! Subscription aggregator: MRR, ARR and ARPU over active subscriptions.

use super::normalizer::subscription_mrr;
use crate::models::SubscriptionRecord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubscriptionSummary {
    pub mrr: i64,
    pub arr: i64,
    pub active_subscribers: i64,
    pub arpu: i64,
}

/// Aggregate the active subscription set.
///
/// Callers pass only active subscriptions; other statuses are counted
/// separately and never contribute to MRR.
pub fn summarize(active: &[SubscriptionRecord]) -> SubscriptionSummary {
    let mrr = active
        .iter()
        .map(subscription_mrr)
        .fold(0, i64::saturating_add);
    let active_subscribers = active.len() as i64;

    SubscriptionSummary {
        mrr,
        arr: mrr.saturating_mul(12),
        active_subscribers,
        arpu: arpu(mrr, active_subscribers),
    }
}

/// MRR per subscriber, zero when there are no subscribers.
pub fn arpu(mrr: i64, subscribers: i64) -> i64 {
    if subscribers > 0 {
        mrr / subscribers
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillingInterval, LineItem, SubscriptionStatus};
    use chrono::Utc;

    fn monthly(id: &str, amount: i64) -> SubscriptionRecord {
        SubscriptionRecord {
            id: id.to_string(),
            status: SubscriptionStatus::Active,
            customer_id: format!("cus_{}", id),
            currency: "usd".to_string(),
            created: Utc::now(),
            canceled_at: None,
            items: vec![LineItem {
                price_id: "price_monthly".to_string(),
                nickname: None,
                product_id: None,
                product_name: None,
                unit_amount: amount,
                quantity: 1,
                interval: Some(BillingInterval::Month),
            }],
        }
    }

    #[test]
    fn empty_set_is_all_zero() {
        assert_eq!(summarize(&[]), SubscriptionSummary::default());
    }

    #[test]
    fn three_monthly_subscriptions() {
        let subs = vec![monthly("a", 1000), monthly("b", 2000), monthly("c", 1500)];
        let summary = summarize(&subs);
        assert_eq!(summary.mrr, 4500);
        assert_eq!(summary.arr, 54000);
        assert_eq!(summary.active_subscribers, 3);
        assert_eq!(summary.arpu, 1500);
    }

    #[test]
    fn arr_is_twelve_times_mrr() {
        let subs = vec![monthly("a", 333), monthly("b", 7)];
        let summary = summarize(&subs);
        assert_eq!(summary.arr, summary.mrr * 12);
    }

    #[test]
    fn arpu_truncates() {
        assert_eq!(arpu(1000, 3), 333);
        assert_eq!(arpu(1000, 0), 0);
    }
}
