//! service-core: Shared infrastructure for the stripe-metrics workspace.
pub mod config;
pub mod error;
pub mod observability;
pub mod retry;

pub use tokio;
pub use tracing;
