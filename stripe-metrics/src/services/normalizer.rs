//! Monthly revenue normalization.

use crate::models::{BillingInterval, LineItem, SubscriptionRecord};

/// Monthly-equivalent revenue of one line item, in minor units.
///
/// Yearly amounts use truncating integer division. Line items without a
/// recurring interval contribute zero.
pub fn monthly_contribution(item: &LineItem) -> i64 {
    let Some(interval) = item.interval else {
        return 0;
    };

    let amount = item.unit_amount.saturating_mul(item.quantity);
    match interval {
        BillingInterval::Year => amount / 12,
        BillingInterval::Month => amount,
        BillingInterval::Week => amount.saturating_mul(4),
        BillingInterval::Day => amount.saturating_mul(30),
    }
}

/// Sum of the monthly contributions of every line item.
pub fn subscription_mrr(subscription: &SubscriptionRecord) -> i64 {
    subscription
        .items
        .iter()
        .map(monthly_contribution)
        .fold(0, i64::saturating_add)
}
