//! Billing provider capability consumed by the engine.

use crate::error::FetchError;
use crate::models::{
    Balance, ChargeRecord, CustomerRef, InvoiceRecord, ListParams, Page, SubscriptionRecord,
};
use async_trait::async_trait;

/// Remote billing provider. Each `list_*` call returns exactly one page;
/// walking the cursor is the fetcher's job.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    async fn list_subscriptions(
        &self,
        params: &ListParams,
    ) -> Result<Page<SubscriptionRecord>, FetchError>;

    async fn list_invoices(&self, params: &ListParams) -> Result<Page<InvoiceRecord>, FetchError>;

    async fn list_charges(&self, params: &ListParams) -> Result<Page<ChargeRecord>, FetchError>;

    async fn list_customers(&self, params: &ListParams) -> Result<Page<CustomerRef>, FetchError>;

    async fn get_balance(&self) -> Result<Balance, FetchError>;

    /// Lightweight authorized call used to validate the credential.
    async fn ping(&self) -> Result<(), FetchError>;
}
