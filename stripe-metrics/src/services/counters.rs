//! Balance and customer counters.

use super::fetcher::Fetcher;
use super::provider::BillingProvider;
use crate::error::FetchError;
use crate::models::{Balance, BalanceAmount, BalanceTotals};

/// Available and pending totals in one settlement currency. Missing entries
/// count as zero.
pub fn balance_totals(balance: &Balance, currency: &str) -> BalanceTotals {
    let sum = |amounts: &[BalanceAmount]| -> i64 {
        amounts
            .iter()
            .filter(|entry| entry.currency.eq_ignore_ascii_case(currency))
            .map(|entry| entry.amount)
            .sum()
    };

    BalanceTotals {
        available: sum(&balance.available),
        pending: sum(&balance.pending),
    }
}

/// Fetch the balance snapshot and restrict it to `currency`.
pub async fn fetch_balance_totals<P>(
    fetcher: &Fetcher<'_, P>,
    currency: &str,
) -> Result<BalanceTotals, FetchError>
where
    P: BillingProvider + ?Sized,
{
    let balance = fetcher.balance().await?;
    Ok(balance_totals(&balance, currency))
}
