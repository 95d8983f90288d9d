//! Credential health check.

use super::provider::BillingProvider;
use crate::error::FetchError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    MissingCredential,
    Unauthorized,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub state: HealthState,
    pub message: String,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.state == HealthState::Healthy
    }

    pub fn missing_credential() -> Self {
        Self {
            state: HealthState::MissingCredential,
            message: "API key is missing".to_string(),
        }
    }
}

/// Ping the provider. `None` means no credential was configured.
pub async fn check_health<P>(provider: Option<&P>) -> HealthReport
where
    P: BillingProvider + ?Sized,
{
    let Some(provider) = provider else {
        return HealthReport::missing_credential();
    };

    match provider.ping().await {
        Ok(()) => HealthReport {
            state: HealthState::Healthy,
            message: "Connected to Stripe".to_string(),
        },
        Err(FetchError::MissingCredential) => HealthReport::missing_credential(),
        Err(err @ FetchError::Unauthorized(_)) => {
            tracing::warn!(error = %err, "Stripe rejected the API key");
            HealthReport {
                state: HealthState::Unauthorized,
                message: format!("Stripe API error: {}", err),
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "Stripe health check failed");
            HealthReport {
                state: HealthState::Unreachable,
                message: format!("Stripe API error: {}", err),
            }
        }
    }
}
