//! Paginated collection fetcher.
//!
//! Walks `starting_after` cursors until the provider reports no further
//! pages. Any failed page, or cancellation, aborts the whole listing and
//! discards what was gathered so far. No retries happen here.

use super::metrics;
use super::provider::BillingProvider;
use crate::error::FetchError;
use crate::models::{
    Balance, ChargeRecord, Collection, InvoiceRecord, ListParams, Listed, Page,
    SubscriptionRecord, SubscriptionStatus, MAX_PAGE_SIZE,
};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Expansion needed to read prices on subscription items.
pub const EXPAND_ITEM_PRICES: &str = "data.items.data.price";

/// Stateless view over a provider bound to one request's cancellation token.
pub struct Fetcher<'a, P: ?Sized> {
    provider: &'a P,
    cancel: &'a CancellationToken,
    page_size: u32,
}

impl<'a, P> Fetcher<'a, P>
where
    P: BillingProvider + ?Sized,
{
    pub fn new(provider: &'a P, cancel: &'a CancellationToken, page_size: u32) -> Self {
        Self {
            provider,
            cancel,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Run one remote call, racing it against cancellation.
    pub async fn call<T, Fut>(&self, operation: &str, fut: Fut) -> Result<T, FetchError>
    where
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            result = fut => result,
        };

        if let Err(err) = &result {
            metrics::record_error(operation, err.kind());
            tracing::warn!(operation, error = %err, "Stripe call failed");
        }

        result
    }

    /// Collect every record of a listing, page by page.
    pub async fn collect<T, F, Fut>(
        &self,
        collection: Collection,
        filter: ListParams,
        fetch_page: F,
    ) -> Result<Vec<T>, FetchError>
    where
        T: Listed,
        F: Fn(ListParams) -> Fut,
        Fut: Future<Output = Result<Page<T>, FetchError>>,
    {
        let mut params = filter;
        if params.limit.is_none() {
            params.limit = Some(self.page_size);
        }

        let mut records = Vec::new();
        let mut page_number: u32 = 0;

        loop {
            page_number += 1;
            let page = self
                .call(collection.as_str(), fetch_page(params.clone()))
                .await
                .map_err(|err| {
                    tracing::warn!(
                        collection = %collection,
                        page = page_number,
                        discarded = records.len(),
                        "Listing aborted"
                    );
                    err
                })?;

            metrics::record_page(collection.as_str());
            tracing::debug!(
                collection = %collection,
                page = page_number,
                records = page.data.len(),
                has_more = page.has_more,
                "Fetched page"
            );

            let next_cursor = if page.has_more {
                page.data.last().map(|record| record.cursor_id().to_string())
            } else {
                None
            };
            records.extend(page.data);

            match next_cursor {
                Some(cursor) => params.starting_after = Some(cursor),
                None => break,
            }
        }

        Ok(records)
    }

    /// All subscriptions with the given status, prices expanded.
    pub async fn subscriptions(
        &self,
        status: SubscriptionStatus,
    ) -> Result<Vec<SubscriptionRecord>, FetchError> {
        let provider = self.provider;
        let filter = ListParams::with_status(status).expand(EXPAND_ITEM_PRICES);
        self.collect(Collection::Subscriptions, filter, move |params| async move {
            provider.list_subscriptions(&params).await
        })
        .await
    }

    /// Number of subscriptions with the given status.
    pub async fn count_subscriptions(&self, status: SubscriptionStatus) -> Result<i64, FetchError> {
        let provider = self.provider;
        let records = self
            .collect(
                Collection::Subscriptions,
                ListParams::with_status(status),
                move |params| async move { provider.list_subscriptions(&params).await },
            )
            .await?;
        Ok(records.len() as i64)
    }

    pub async fn invoices(&self) -> Result<Vec<InvoiceRecord>, FetchError> {
        let provider = self.provider;
        self.collect(
            Collection::Invoices,
            ListParams::default(),
            move |params| async move { provider.list_invoices(&params).await },
        )
        .await
    }

    pub async fn charges(&self) -> Result<Vec<ChargeRecord>, FetchError> {
        let provider = self.provider;
        self.collect(
            Collection::Charges,
            ListParams::default(),
            move |params| async move { provider.list_charges(&params).await },
        )
        .await
    }

    /// Cardinality of the unfiltered customer listing.
    pub async fn count_customers(&self) -> Result<i64, FetchError> {
        let provider = self.provider;
        let customers = self
            .collect(
                Collection::Customers,
                ListParams::default(),
                move |params| async move { provider.list_customers(&params).await },
            )
            .await?;
        Ok(customers.len() as i64)
    }

    pub async fn balance(&self) -> Result<Balance, FetchError> {
        self.call("get_balance", self.provider.get_balance()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerRef;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider whose customer listing is served from fixed pages.
    struct PagedCustomers {
        pages: Vec<Result<Page<CustomerRef>, FetchError>>,
        calls: AtomicUsize,
        seen: Mutex<Vec<ListParams>>,
    }

    impl PagedCustomers {
        fn new(pages: Vec<Result<Page<CustomerRef>, FetchError>>) -> Self {
            Self {
                pages,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    fn customers(ids: &[&str], has_more: bool) -> Result<Page<CustomerRef>, FetchError> {
        Ok(Page {
            data: ids
                .iter()
                .map(|id| CustomerRef { id: id.to_string() })
                .collect(),
            has_more,
        })
    }

    #[async_trait]
    impl BillingProvider for PagedCustomers {
        async fn list_subscriptions(
            &self,
            _params: &ListParams,
        ) -> Result<Page<SubscriptionRecord>, FetchError> {
            Ok(Page::last(vec![]))
        }

        async fn list_invoices(
            &self,
            _params: &ListParams,
        ) -> Result<Page<InvoiceRecord>, FetchError> {
            Ok(Page::last(vec![]))
        }

        async fn list_charges(
            &self,
            _params: &ListParams,
        ) -> Result<Page<ChargeRecord>, FetchError> {
            Ok(Page::last(vec![]))
        }

        async fn list_customers(
            &self,
            params: &ListParams,
        ) -> Result<Page<CustomerRef>, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(params.clone());
            self.pages[n].clone()
        }

        async fn get_balance(&self) -> Result<Balance, FetchError> {
            Ok(Balance::default())
        }

        async fn ping(&self) -> Result<(), FetchError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn walks_cursor_until_exhausted() {
        let provider = PagedCustomers::new(vec![
            customers(&["cus_1", "cus_2"], true),
            customers(&["cus_3", "cus_4"], true),
            customers(&["cus_5"], false),
        ]);
        let cancel = CancellationToken::new();
        let fetcher = Fetcher::new(&provider, &cancel, 2);

        let count = fetcher.count_customers().await.unwrap();

        assert_eq!(count, 5);
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].starting_after, None);
        assert_eq!(seen[0].limit, Some(2));
        assert_eq!(seen[1].starting_after.as_deref(), Some("cus_2"));
        assert_eq!(seen[2].starting_after.as_deref(), Some("cus_4"));
    }

    #[tokio::test]
    async fn failure_on_middle_page_discards_everything() {
        let provider = PagedCustomers::new(vec![
            customers(&["cus_1"], true),
            Err(FetchError::Transport("connection reset".to_string())),
            customers(&["cus_3"], false),
        ]);
        let cancel = CancellationToken::new();
        let fetcher = Fetcher::new(&provider, &cancel, 1);

        let err = fetcher.count_customers().await.unwrap_err();

        assert_eq!(err, FetchError::Transport("connection reset".to_string()));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn has_more_with_empty_page_stops() {
        let provider = PagedCustomers::new(vec![customers(&[], true)]);
        let cancel = CancellationToken::new();
        let fetcher = Fetcher::new(&provider, &cancel, 10);

        assert_eq!(fetcher.count_customers().await.unwrap(), 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_first_page() {
        let provider = PagedCustomers::new(vec![customers(&["cus_1"], false)]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let fetcher = Fetcher::new(&provider, &cancel, 10);

        let err = fetcher.count_customers().await.unwrap_err();

        assert_eq!(err, FetchError::Cancelled);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn page_size_is_clamped_to_provider_range() {
        let provider = PagedCustomers::new(vec![customers(&[], false)]);
        let cancel = CancellationToken::new();
        let fetcher = Fetcher::new(&provider, &cancel, 500);

        fetcher.count_customers().await.unwrap();

        assert_eq!(provider.seen.lock().unwrap()[0].limit, Some(MAX_PAGE_SIZE));
    }
}
