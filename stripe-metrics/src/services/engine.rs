//! Metrics engine: fans a request out to the aggregators and merges the
//! results. Nothing is cached; every call re-fetches.

use super::churn::{self, ChurnWindow};
use super::fetcher::Fetcher;
use super::health::{check_health, HealthReport};
use super::projector::{self, Table};
use super::provider::BillingProvider;
use super::stripe::StripeClient;
use super::{aggregator, counters, products, summaries};
use crate::config::{EngineSettings, MetricsConfig};
use crate::error::{FetchError, MetricsError};
use crate::models::{
    minor_unit_exponent, ChargeSummary, Kpi, KpiValue, MetricsSnapshot, ProductRevenue,
    RevenueSummary, SubscriptionStatus,
};
use chrono::{DateTime, Utc};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

pub struct MetricsEngine<P> {
    provider: P,
    settings: EngineSettings,
}

impl MetricsEngine<StripeClient> {
    /// Build an engine over the live Stripe API. Returns `Ok(None)` when no
    /// API key is configured.
    pub fn from_config(config: &MetricsConfig) -> Result<Option<Self>, FetchError> {
        let Some(api_key) = config.stripe.api_key.clone() else {
            return Ok(None);
        };
        let client = StripeClient::new(api_key, &config.stripe)?;
        Ok(Some(Self::new(client, config.engine.clone())))
    }
}

impl<P> MetricsEngine<P>
where
    P: BillingProvider,
{
    pub fn new(provider: P, settings: EngineSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn fetcher<'a>(&'a self, cancel: &'a CancellationToken) -> Fetcher<'a, P> {
        Fetcher::new(&self.provider, cancel, self.settings.page_size)
    }

    fn window(&self, now: DateTime<Utc>) -> ChurnWindow {
        ChurnWindow::trailing_days(now, self.settings.churn_window_days)
    }

    fn exponent(&self) -> u32 {
        minor_unit_exponent(&self.settings.currency)
    }

    pub async fn snapshot(&self, cancel: &CancellationToken) -> Result<MetricsSnapshot, MetricsError> {
        self.snapshot_at(Utc::now(), cancel).await
    }

    /// Compute a snapshot with the churn window ending at `now`.
    pub async fn snapshot_at(
        &self,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<MetricsSnapshot, MetricsError> {
        let started = Instant::now();
        let fetcher = self.fetcher(cancel);
        let window = self.window(now);

        let (active, canceled, trialing_count, past_due_count, total_customers, balance) = tokio::try_join!(
            fetcher.subscriptions(SubscriptionStatus::Active),
            fetcher.subscriptions(SubscriptionStatus::Canceled),
            fetcher.count_subscriptions(SubscriptionStatus::Trialing),
            fetcher.count_subscriptions(SubscriptionStatus::PastDue),
            fetcher.count_customers(),
            counters::fetch_balance_totals(&fetcher, &self.settings.currency),
        )?;

        let summary = aggregator::summarize(&active);
        let churn = churn::compute(&summary, &active, &canceled, &window);

        let snapshot = MetricsSnapshot {
            mrr: summary.mrr,
            arr: summary.arr,
            active_subscribers: summary.active_subscribers,
            total_customers,
            available_balance: balance.available,
            pending_balance: balance.pending,
            new_mrr: churn.new_mrr,
            churned_mrr: churn.churned_mrr,
            net_new_mrr: churn.net_new_mrr,
            churn_rate: churn.churn_rate,
            arpu: summary.arpu,
            trialing_count,
            past_due_count,
            canceled_in_window: churn.canceled_count,
        };

        tracing::info!(
            mrr = snapshot.mrr,
            active_subscribers = snapshot.active_subscribers,
            churn_rate = snapshot.churn_rate,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Metrics snapshot computed"
        );

        Ok(snapshot)
    }

    pub async fn kpi(&self, kpi: Kpi, cancel: &CancellationToken) -> Result<KpiValue, MetricsError> {
        let snapshot = self.snapshot(cancel).await?;
        Ok(snapshot.kpi(kpi, self.exponent()))
    }

    /// Resolve a KPI by query name. Unknown names fail before any fetch.
    pub async fn kpi_by_name(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<KpiValue, MetricsError> {
        let kpi: Kpi = name.parse()?;
        self.kpi(kpi, cancel).await
    }

    /// Active subscriptions with their normalized MRR.
    pub async fn subscriptions_table(&self, cancel: &CancellationToken) -> Result<Table, MetricsError> {
        let active = self
            .fetcher(cancel)
            .subscriptions(SubscriptionStatus::Active)
            .await?;
        Ok(projector::subscriptions_table(&active))
    }

    pub async fn invoices_table(&self, cancel: &CancellationToken) -> Result<Table, MetricsError> {
        let invoices = self.fetcher(cancel).invoices().await?;
        Ok(projector::invoices_table(&invoices))
    }

    pub async fn charges_table(&self, cancel: &CancellationToken) -> Result<Table, MetricsError> {
        let charges = self.fetcher(cancel).charges().await?;
        Ok(projector::charges_table(&charges))
    }

    /// Revenue per product. Unordered.
    pub async fn product_revenue(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProductRevenue>, MetricsError> {
        let active = self
            .fetcher(cancel)
            .subscriptions(SubscriptionStatus::Active)
            .await?;
        Ok(products::group_by_product(&active))
    }

    pub async fn product_revenue_table(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Table, MetricsError> {
        let products = self.product_revenue(cancel).await?;
        Ok(projector::product_revenue_table(
            &products,
            &self.settings.currency,
        ))
    }

    pub async fn revenue_summary(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RevenueSummary, MetricsError> {
        let invoices = self.fetcher(cancel).invoices().await?;
        Ok(summaries::revenue_summary(&invoices, Utc::now()))
    }

    pub async fn charge_summary(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ChargeSummary, MetricsError> {
        let charges = self.fetcher(cancel).charges().await?;
        Ok(summaries::charge_summary(&charges))
    }

    pub async fn health(&self) -> HealthReport {
        check_health(Some(&self.provider)).await
    }
}
