//! Churn engine: new, churned and net-new MRR plus churn rate over a
//! trailing window.
//!
//! The subscriber population at the start of the window is not measured; it
//! is estimated from current figures (see [`estimated_starting_population`]).

use super::aggregator::SubscriptionSummary;
use super::normalizer::subscription_mrr;
use crate::models::SubscriptionRecord;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Trailing time window `[start, now]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChurnWindow {
    pub start: DateTime<Utc>,
}

impl ChurnWindow {
    /// Window of `length` ending at `now`. A length reaching past the
    /// earliest representable time starts the window there.
    pub fn trailing(now: DateTime<Utc>, length: Duration) -> Self {
        Self {
            start: now
                .checked_sub_signed(length)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Trailing window of `days` days; out-of-range lengths are treated as
    /// unbounded.
    pub fn trailing_days(now: DateTime<Utc>, days: i64) -> Self {
        match Duration::try_days(days) {
            Some(length) => Self::trailing(now, length),
            None => Self {
                start: DateTime::<Utc>::MIN_UTC,
            },
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ChurnReport {
    pub new_mrr: i64,
    pub churned_mrr: i64,
    pub net_new_mrr: i64,
    pub canceled_count: i64,
    /// Percentage in `[0, 100]`.
    pub churn_rate: f64,
}

/// MRR of active subscriptions created inside the window.
pub fn new_mrr(active: &[SubscriptionRecord], window: &ChurnWindow) -> i64 {
    active
        .iter()
        .filter(|sub| window.contains(sub.created))
        .map(subscription_mrr)
        .sum()
}

/// Count and MRR of canceled subscriptions whose cancellation falls inside
/// the window. Subscriptions without a cancellation time are skipped.
pub fn churned(canceled: &[SubscriptionRecord], window: &ChurnWindow) -> (i64, i64) {
    canceled
        .iter()
        .filter(|sub| sub.canceled_at.is_some_and(|at| window.contains(at)))
        .fold((0, 0), |(count, mrr), sub| (count + 1, mrr + subscription_mrr(sub)))
}

/// Subscriber count at the start of the window: current active, minus the
/// new subscribers (approximated as `new_mrr / max(arpu, 1)`), plus the
/// subscribers canceled inside the window.
pub fn estimated_starting_population(
    active_subscribers: i64,
    new_mrr: i64,
    arpu: i64,
    canceled_count: i64,
) -> i64 {
    let new_subscribers = new_mrr / arpu.max(1);
    active_subscribers - new_subscribers + canceled_count
}

/// Canceled share of the estimated starting population, as a percentage.
/// Zero when the estimate is not positive.
pub fn churn_rate(active_subscribers: i64, new_mrr: i64, arpu: i64, canceled_count: i64) -> f64 {
    let population =
        estimated_starting_population(active_subscribers, new_mrr, arpu, canceled_count);
    if population <= 0 {
        return 0.0;
    }

    (canceled_count as f64 / population as f64 * 100.0).clamp(0.0, 100.0)
}

/// Derive the churn figures from the active set (already summarized) and
/// the canceled listing.
pub fn compute(
    summary: &SubscriptionSummary,
    active: &[SubscriptionRecord],
    canceled: &[SubscriptionRecord],
    window: &ChurnWindow,
) -> ChurnReport {
    let new_mrr = new_mrr(active, window);
    let (canceled_count, churned_mrr) = churned(canceled, window);

    ChurnReport {
        new_mrr,
        churned_mrr,
        net_new_mrr: new_mrr - churned_mrr,
        canceled_count,
        churn_rate: churn_rate(summary.active_subscribers, new_mrr, summary.arpu, canceled_count),
    }
}
