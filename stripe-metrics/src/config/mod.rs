//! Configuration module for stripe-metrics.

use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com/v1";

/// Longest accepted churn window, about ten years.
pub const MAX_CHURN_WINDOW_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub stripe: StripeSettings,
    pub engine: EngineSettings,
}

#[derive(Debug, Clone)]
pub struct StripeSettings {
    /// `None` when no key was configured.
    pub api_key: Option<Secret<String>>,
    pub api_base_url: String,
    pub timeout_seconds: u64,
    /// Transport-level retries for rate limits and 5xx responses.
    pub max_retries: u32,
}

impl Default for StripeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: 30,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Settlement currency for balances and KPI money conversion.
    pub currency: String,
    pub churn_window_days: i64,
    pub page_size: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            churn_window_days: 30,
            page_size: 100,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value: {}", name, value))
        }),
        Err(_) => Ok(default),
    }
}

impl MetricsConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let api_key = env::var("STRIPE_API_KEY")
            .ok()
            .map(Secret::new)
            .filter(|key| !key.expose_secret().trim().is_empty());

        let churn_window_days = parse_var("STRIPE_CHURN_WINDOW_DAYS", 30i64)?;
        if !(1..=MAX_CHURN_WINDOW_DAYS).contains(&churn_window_days) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "STRIPE_CHURN_WINDOW_DAYS must be between 1 and {}, got {}",
                MAX_CHURN_WINDOW_DAYS,
                churn_window_days
            )));
        }

        let page_size: u32 = parse_var("STRIPE_PAGE_SIZE", 100u32)?;

        Ok(Self {
            stripe: StripeSettings {
                api_key,
                api_base_url: env::var("STRIPE_API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
                timeout_seconds: common.http_timeout_seconds,
                max_retries: parse_var("STRIPE_MAX_RETRIES", 2u32)?,
            },
            engine: EngineSettings {
                currency: env::var("STRIPE_CURRENCY")
                    .unwrap_or_else(|_| "usd".to_string())
                    .to_lowercase(),
                churn_window_days,
                page_size: page_size.clamp(1, crate::models::MAX_PAGE_SIZE),
            },
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "stripe-metrics".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            common,
        })
    }
}
