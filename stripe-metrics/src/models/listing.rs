//! Paginated listing primitives shared by the provider and the fetcher.

use super::{ChargeRecord, InvoiceRecord, SubscriptionRecord, SubscriptionStatus};
use std::fmt;

/// Provider page size upper bound.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Remote object collections that can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Subscriptions,
    Invoices,
    Charges,
    Customers,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Subscriptions => "subscriptions",
            Collection::Invoices => "invoices",
            Collection::Charges => "charges",
            Collection::Customers => "customers",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter and cursor for one page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Status equality filter (subscriptions only).
    pub status: Option<SubscriptionStatus>,
    /// Nested references to expand, e.g. `data.items.data.price`.
    pub expand: Vec<String>,
    /// Page size cap.
    pub limit: Option<u32>,
    /// Id of the last record of the previous page.
    pub starting_after: Option<String>,
}

impl ListParams {
    pub fn with_status(status: SubscriptionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn expand(mut self, path: impl Into<String>) -> Self {
        self.expand.push(path.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.clamp(1, MAX_PAGE_SIZE));
        self
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn last(data: Vec<T>) -> Self {
        Self {
            data,
            has_more: false,
        }
    }
}

/// Records that can act as a pagination cursor.
pub trait Listed {
    fn cursor_id(&self) -> &str;
}

/// Customer entry; only the cardinality of the listing is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRef {
    pub id: String,
}

impl Listed for CustomerRef {
    fn cursor_id(&self) -> &str {
        &self.id
    }
}

impl Listed for SubscriptionRecord {
    fn cursor_id(&self) -> &str {
        &self.id
    }
}

impl Listed for InvoiceRecord {
    fn cursor_id(&self) -> &str {
        &self.id
    }
}

impl Listed for ChargeRecord {
    fn cursor_id(&self) -> &str {
        &self.id
    }
}
