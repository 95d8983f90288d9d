//! Error types for provider calls and metric requests.

use std::time::Duration;
use thiserror::Error;

/// Failure of a remote listing or call. Always fatal to the current request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("API key is missing")]
    MissingCredential,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited by provider")]
    RateLimited { retry_after: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Provider error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Transient failures worth retrying at the transport layer.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RateLimited { .. } | FetchError::Transport(_) => true,
            FetchError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Delay the provider asked for before the next attempt.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FetchError::RateLimited {
                retry_after: Some(secs),
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::MissingCredential => "missing_credential",
            FetchError::Unauthorized(_) => "unauthorized",
            FetchError::RateLimited { .. } => "rate_limited",
            FetchError::NotFound(_) => "not_found",
            FetchError::Api { .. } => "api",
            FetchError::Transport(_) => "transport",
            FetchError::Decode(_) => "decode",
            FetchError::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}
