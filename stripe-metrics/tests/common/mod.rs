//! Common test utilities for stripe-metrics integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, Once};
use stripe_metrics::config::EngineSettings;
use stripe_metrics::models::{
    Balance, BalanceAmount, BillingInterval, ChargeRecord, ChargeStatus, Collection, CustomerRef,
    InvoiceRecord, InvoiceStatus, LineItem, ListParams, Listed, Page, SubscriptionRecord,
    SubscriptionStatus,
};
use stripe_metrics::services::{BillingProvider, MetricsEngine};
use stripe_metrics::FetchError;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,stripe_metrics=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Fixed reference time for window-dependent assertions.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub fn item(
    price_id: &str,
    product_id: Option<&str>,
    unit_amount: i64,
    interval: Option<BillingInterval>,
) -> LineItem {
    LineItem {
        price_id: price_id.to_string(),
        nickname: None,
        product_id: product_id.map(str::to_string),
        product_name: None,
        unit_amount,
        quantity: 1,
        interval,
    }
}

pub fn monthly_item(product_id: &str, unit_amount: i64) -> LineItem {
    item(
        &format!("price_{}", product_id),
        Some(product_id),
        unit_amount,
        Some(BillingInterval::Month),
    )
}

pub fn subscription(
    id: &str,
    status: SubscriptionStatus,
    created: DateTime<Utc>,
    items: Vec<LineItem>,
) -> SubscriptionRecord {
    SubscriptionRecord {
        id: id.to_string(),
        status,
        customer_id: format!("cus_{}", id),
        currency: "usd".to_string(),
        created,
        canceled_at: None,
        items,
    }
}

pub fn canceled(id: &str, canceled_at: DateTime<Utc>, items: Vec<LineItem>) -> SubscriptionRecord {
    SubscriptionRecord {
        canceled_at: Some(canceled_at),
        ..subscription(id, SubscriptionStatus::Canceled, canceled_at - Duration::days(90), items)
    }
}

pub fn invoice(id: &str, status: InvoiceStatus, total: i64, paid: bool) -> InvoiceRecord {
    InvoiceRecord {
        id: id.to_string(),
        customer_id: "cus_1".to_string(),
        status,
        total,
        amount_paid: if paid { total } else { 0 },
        currency: "usd".to_string(),
        created: days_ago(3),
        due_date: None,
        paid,
    }
}

pub fn charge(id: &str, status: ChargeStatus, amount: i64) -> ChargeRecord {
    ChargeRecord {
        id: id.to_string(),
        amount,
        currency: "usd".to_string(),
        status,
        customer_id: "cus_1".to_string(),
        created: days_ago(1),
        paid: status == ChargeStatus::Succeeded,
        refunded: false,
        amount_refunded: 0,
    }
}

pub fn balance_amount(amount: i64, currency: &str) -> BalanceAmount {
    BalanceAmount {
        amount,
        currency: currency.to_string(),
    }
}

/// In-memory provider that pages like Stripe: `limit` caps the page,
/// `starting_after` resumes after the given id, `has_more` reports whether
/// records remain.
pub struct MockProvider {
    subscriptions: Vec<SubscriptionRecord>,
    invoices: Vec<InvoiceRecord>,
    charges: Vec<ChargeRecord>,
    customers: Vec<CustomerRef>,
    balance: Balance,
    /// Errors keyed by collection and 1-based call number.
    faults: HashMap<(Collection, usize), FetchError>,
    ping_error: Option<FetchError>,
    hang: bool,
    calls: Mutex<HashMap<Collection, usize>>,
    requests: Mutex<Vec<(Collection, ListParams)>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            invoices: Vec::new(),
            charges: Vec::new(),
            customers: Vec::new(),
            balance: Balance::default(),
            faults: HashMap::new(),
            ping_error: None,
            hang: false,
            calls: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_subscriptions(mut self, subscriptions: Vec<SubscriptionRecord>) -> Self {
        self.subscriptions.extend(subscriptions);
        self
    }

    pub fn with_invoices(mut self, invoices: Vec<InvoiceRecord>) -> Self {
        self.invoices = invoices;
        self
    }

    pub fn with_charges(mut self, charges: Vec<ChargeRecord>) -> Self {
        self.charges = charges;
        self
    }

    pub fn with_customers(mut self, count: usize) -> Self {
        self.customers = (1..=count)
            .map(|n| CustomerRef {
                id: format!("cus_{:04}", n),
            })
            .collect();
        self
    }

    pub fn with_balance(mut self, available: Vec<BalanceAmount>, pending: Vec<BalanceAmount>) -> Self {
        self.balance = Balance { available, pending };
        self
    }

    /// Fail the `call`-th request (1-based) against `collection`.
    pub fn fail_on(mut self, collection: Collection, call: usize, error: FetchError) -> Self {
        self.faults.insert((collection, call), error);
        self
    }

    pub fn fail_ping(mut self, error: FetchError) -> Self {
        self.ping_error = Some(error);
        self
    }

    /// Never answer any request.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn calls(&self, collection: Collection) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&collection)
            .copied()
            .unwrap_or(0)
    }

    pub fn requests(&self, collection: Collection) -> Vec<ListParams> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == collection)
            .map(|(_, params)| params.clone())
            .collect()
    }

    async fn begin(&self, collection: Collection, params: &ListParams) -> Result<(), FetchError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let counter = calls.entry(collection).or_insert(0);
            *counter += 1;
            *counter
        };
        self.requests
            .lock()
            .unwrap()
            .push((collection, params.clone()));

        if self.hang {
            std::future::pending::<()>().await;
        }

        match self.faults.get(&(collection, call)) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn page<T: Listed + Clone>(records: &[T], params: &ListParams) -> Page<T> {
    let start = params
        .starting_after
        .as_ref()
        .and_then(|cursor| records.iter().position(|r| r.cursor_id() == cursor))
        .map(|index| index + 1)
        .unwrap_or(0);
    let limit = params.limit.unwrap_or(10) as usize;
    let end = (start + limit).min(records.len());

    Page {
        data: records[start..end].to_vec(),
        has_more: end < records.len(),
    }
}

#[async_trait]
impl BillingProvider for MockProvider {
    async fn list_subscriptions(
        &self,
        params: &ListParams,
    ) -> Result<Page<SubscriptionRecord>, FetchError> {
        self.begin(Collection::Subscriptions, params).await?;
        let matching: Vec<SubscriptionRecord> = self
            .subscriptions
            .iter()
            .filter(|sub| params.status.map_or(true, |status| sub.status == status))
            .cloned()
            .collect();
        Ok(page(&matching, params))
    }

    async fn list_invoices(&self, params: &ListParams) -> Result<Page<InvoiceRecord>, FetchError> {
        self.begin(Collection::Invoices, params).await?;
        Ok(page(&self.invoices, params))
    }

    async fn list_charges(&self, params: &ListParams) -> Result<Page<ChargeRecord>, FetchError> {
        self.begin(Collection::Charges, params).await?;
        Ok(page(&self.charges, params))
    }

    async fn list_customers(&self, params: &ListParams) -> Result<Page<CustomerRef>, FetchError> {
        self.begin(Collection::Customers, params).await?;
        Ok(page(&self.customers, params))
    }

    async fn get_balance(&self) -> Result<Balance, FetchError> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(self.balance.clone())
    }

    async fn ping(&self) -> Result<(), FetchError> {
        match &self.ping_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Engine over `provider` with the default settings and the given page size.
pub fn engine(provider: MockProvider, page_size: u32) -> MetricsEngine<MockProvider> {
    init_tracing();
    MetricsEngine::new(
        provider,
        EngineSettings {
            page_size,
            ..EngineSettings::default()
        },
    )
}
