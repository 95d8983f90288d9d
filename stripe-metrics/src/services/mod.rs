pub mod aggregator;
pub mod churn;
pub mod counters;
pub mod engine;
pub mod fetcher;
pub mod health;
pub mod metrics;
pub mod normalizer;
pub mod products;
pub mod projector;
pub mod provider;
pub mod stripe;
pub mod summaries;

pub use engine::MetricsEngine;
pub use fetcher::Fetcher;
pub use health::{check_health, HealthReport, HealthState};
pub use metrics::gather_metrics;
pub use projector::{Column, ColumnValues, Table};
pub use provider::BillingProvider;
pub use stripe::StripeClient;
