//! Live Stripe REST client.
//!
//! Issues one HTTP request per page and maps Stripe's wire objects onto the
//! domain records. Transient failures (429, 5xx, connection errors) are
//! retried here with backoff; everything above this layer sees either a
//! page or a final error.

use super::metrics;
use super::provider::BillingProvider;
use crate::config::StripeSettings;
use crate::error::FetchError;
use crate::models::{
    Balance, BalanceAmount, BillingInterval, ChargeRecord, ChargeStatus, CustomerRef,
    InvoiceRecord, InvoiceStatus, LineItem, ListParams, Page, SubscriptionRecord,
    SubscriptionStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use service_core::retry::{retry_with_backoff_hint, RetryConfig};
use std::time::{Duration, Instant};

pub struct StripeClient {
    client: Client,
    api_key: Secret<String>,
    base_url: String,
    retry: RetryConfig,
}

impl StripeClient {
    pub fn new(api_key: Secret<String>, settings: &StripeSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        let retry = RetryConfig {
            max_retries: settings.max_retries,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            ..RetryConfig::default()
        };

        Ok(Self {
            client,
            api_key,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        if !self.is_configured() {
            return Err(FetchError::MissingCredential);
        }

        retry_with_backoff_hint(
            &self.retry,
            operation,
            FetchError::is_retryable,
            FetchError::retry_after,
            || self.get_once(operation, path, query),
        )
        .await
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        let started = Instant::now();

        let result = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .query(query)
            .send()
            .await;
        metrics::observe_request(operation, started.elapsed().as_secs_f64());

        let response =
            result.map_err(|e| FetchError::Transport(format!("Failed to reach Stripe: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, retry_after, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read Stripe response: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| FetchError::Decode(format!("{}: {}", path, e)))
    }

    async fn list<W, T>(
        &self,
        operation: &str,
        path: &str,
        params: &ListParams,
        convert: fn(W) -> Result<T, FetchError>,
    ) -> Result<Page<T>, FetchError>
    where
        W: DeserializeOwned,
    {
        let list: StripeList<W> = self.get(operation, path, &list_query(params)).await?;
        let data = list
            .data
            .into_iter()
            .map(convert)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            data,
            has_more: list.has_more,
        })
    }
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn list_subscriptions(
        &self,
        params: &ListParams,
    ) -> Result<Page<SubscriptionRecord>, FetchError> {
        self.list("list_subscriptions", "subscriptions", params, subscription_record)
            .await
    }

    async fn list_invoices(&self, params: &ListParams) -> Result<Page<InvoiceRecord>, FetchError> {
        self.list("list_invoices", "invoices", params, invoice_record)
            .await
    }

    async fn list_charges(&self, params: &ListParams) -> Result<Page<ChargeRecord>, FetchError> {
        self.list("list_charges", "charges", params, charge_record)
            .await
    }

    async fn list_customers(&self, params: &ListParams) -> Result<Page<CustomerRef>, FetchError> {
        self.list("list_customers", "customers", params, customer_ref)
            .await
    }

    async fn get_balance(&self) -> Result<Balance, FetchError> {
        let balance: StripeBalance = self.get("get_balance", "balance", &[]).await?;
        Ok(Balance {
            available: balance.available.into_iter().map(balance_amount).collect(),
            pending: balance.pending.into_iter().map(balance_amount).collect(),
        })
    }

    async fn ping(&self) -> Result<(), FetchError> {
        let _: StripeBalance = self.get("ping", "balance", &[]).await?;
        Ok(())
    }
}

fn list_query(params: &ListParams) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(limit) = params.limit {
        query.push(("limit", limit.to_string()));
    }
    if let Some(cursor) = &params.starting_after {
        query.push(("starting_after", cursor.clone()));
    }
    if let Some(status) = params.status {
        query.push(("status", status.as_str().to_string()));
    }
    for path in &params.expand {
        query.push(("expand[]", path.clone()));
    }
    query
}

fn error_from_response(status: StatusCode, retry_after: Option<u64>, body: &str) -> FetchError {
    let detail = serde_json::from_str::<StripeErrorBody>(body)
        .map(|body| body.error)
        .ok();
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Unauthorized(message),
        StatusCode::NOT_FOUND => FetchError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited { retry_after },
        _ => FetchError::Api {
            status: status.as_u16(),
            code: detail.and_then(|d| d.code),
            message,
        },
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, FetchError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| FetchError::Decode(format!("Timestamp out of range: {}", secs)))
}

fn optional_timestamp(secs: Option<i64>) -> Result<Option<DateTime<Utc>>, FetchError> {
    secs.map(timestamp).transpose()
}

// Wire types

#[derive(Debug, Deserialize)]
struct StripeList<T> {
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// A reference that is either a bare id or the expanded object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Expandable<T> {
    Id(String),
    Object(T),
}

trait HasId {
    fn id(&self) -> &str;
}

impl<T: HasId> Expandable<T> {
    fn id(&self) -> &str {
        match self {
            Expandable::Id(id) => id,
            Expandable::Object(object) => object.id(),
        }
    }
}

fn expandable_id<T: HasId>(value: &Option<Expandable<T>>) -> String {
    value
        .as_ref()
        .map(|v| v.id().to_string())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
}

impl HasId for StripeCustomer {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Deserialize)]
struct StripeProduct {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

impl HasId for StripeProduct {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Deserialize)]
struct StripeRecurring {
    interval: String,
}

#[derive(Debug, Deserialize)]
struct StripePrice {
    id: String,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    unit_amount: Option<i64>,
    #[serde(default)]
    product: Option<Expandable<StripeProduct>>,
    #[serde(default)]
    recurring: Option<StripeRecurring>,
}

#[derive(Debug, Deserialize)]
struct StripeSubscriptionItem {
    #[serde(default)]
    quantity: Option<i64>,
    #[serde(default)]
    price: Option<StripePrice>,
}

#[derive(Debug, Default, Deserialize)]
struct StripeItems {
    #[serde(default)]
    data: Vec<StripeSubscriptionItem>,
}

#[derive(Debug, Deserialize)]
struct StripeSubscription {
    id: String,
    status: String,
    #[serde(default)]
    customer: Option<Expandable<StripeCustomer>>,
    #[serde(default)]
    currency: String,
    created: i64,
    #[serde(default)]
    canceled_at: Option<i64>,
    #[serde(default)]
    items: StripeItems,
}

#[derive(Debug, Deserialize)]
struct StripeInvoice {
    id: String,
    #[serde(default)]
    customer: Option<Expandable<StripeCustomer>>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    total: i64,
    #[serde(default)]
    amount_paid: i64,
    #[serde(default)]
    currency: String,
    created: i64,
    #[serde(default)]
    due_date: Option<i64>,
    #[serde(default)]
    paid: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct StripeCharge {
    id: String,
    amount: i64,
    #[serde(default)]
    currency: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    customer: Option<Expandable<StripeCustomer>>,
    created: i64,
    #[serde(default)]
    paid: bool,
    #[serde(default)]
    refunded: bool,
    #[serde(default)]
    amount_refunded: i64,
}

#[derive(Debug, Deserialize)]
struct StripeBalanceAmount {
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct StripeBalance {
    #[serde(default)]
    available: Vec<StripeBalanceAmount>,
    #[serde(default)]
    pending: Vec<StripeBalanceAmount>,
}

fn line_item(item: StripeSubscriptionItem) -> Option<LineItem> {
    let price = item.price?;
    let (product_id, product_name) = match price.product {
        Some(Expandable::Id(id)) => (Some(id), None),
        Some(Expandable::Object(product)) => (Some(product.id), product.name),
        None => (None, None),
    };

    Some(LineItem {
        price_id: price.id,
        nickname: price.nickname.filter(|n| !n.is_empty()),
        product_id,
        product_name,
        unit_amount: price.unit_amount.unwrap_or(0),
        quantity: item.quantity.unwrap_or(0),
        interval: price
            .recurring
            .and_then(|r| BillingInterval::from_string(&r.interval)),
    })
}

fn subscription_record(sub: StripeSubscription) -> Result<SubscriptionRecord, FetchError> {
    Ok(SubscriptionRecord {
        customer_id: expandable_id(&sub.customer),
        status: SubscriptionStatus::from_string(&sub.status),
        created: timestamp(sub.created)?,
        canceled_at: optional_timestamp(sub.canceled_at)?,
        items: sub.items.data.into_iter().filter_map(line_item).collect(),
        currency: sub.currency.to_lowercase(),
        id: sub.id,
    })
}

fn invoice_record(invoice: StripeInvoice) -> Result<InvoiceRecord, FetchError> {
    let status = invoice
        .status
        .as_deref()
        .map(InvoiceStatus::from_string)
        .unwrap_or(InvoiceStatus::Draft);

    Ok(InvoiceRecord {
        customer_id: expandable_id(&invoice.customer),
        paid: invoice.paid.unwrap_or(status == InvoiceStatus::Paid),
        status,
        total: invoice.total,
        amount_paid: invoice.amount_paid,
        currency: invoice.currency.to_lowercase(),
        created: timestamp(invoice.created)?,
        due_date: optional_timestamp(invoice.due_date)?,
        id: invoice.id,
    })
}

fn charge_record(charge: StripeCharge) -> Result<ChargeRecord, FetchError> {
    Ok(ChargeRecord {
        customer_id: expandable_id(&charge.customer),
        status: ChargeStatus::from_string(&charge.status),
        amount: charge.amount,
        currency: charge.currency.to_lowercase(),
        created: timestamp(charge.created)?,
        paid: charge.paid,
        refunded: charge.refunded,
        amount_refunded: charge.amount_refunded,
        id: charge.id,
    })
}

fn customer_ref(customer: StripeCustomer) -> Result<CustomerRef, FetchError> {
    Ok(CustomerRef { id: customer.id })
}

fn balance_amount(amount: StripeBalanceAmount) -> BalanceAmount {
    BalanceAmount {
        amount: amount.amount,
        currency: amount.currency.to_lowercase(),
    }
}
