//! Stripe metrics - subscription revenue KPIs computed from live Stripe data.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use error::{FetchError, MetricsError};
pub use services::MetricsEngine;
