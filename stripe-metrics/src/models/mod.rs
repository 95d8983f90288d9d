//! Domain models for stripe-metrics.

mod balance;
mod charge;
mod invoice;
mod listing;
mod money;
mod product;
mod snapshot;
mod subscription;
mod summary;

pub use balance::{Balance, BalanceAmount, BalanceTotals};
pub use charge::{ChargeRecord, ChargeStatus};
pub use invoice::{InvoiceRecord, InvoiceStatus};
pub use listing::{Collection, CustomerRef, ListParams, Listed, Page, MAX_PAGE_SIZE};
pub use money::{minor_unit_exponent, to_major_units};
pub use product::ProductRevenue;
pub use snapshot::{Kpi, KpiAmount, KpiValue, MetricsSnapshot};
pub use subscription::{BillingInterval, LineItem, SubscriptionRecord, SubscriptionStatus};
pub use summary::{ChargeSummary, RevenueSummary};
