//! Stripe metrics entry point: checks the credential, computes one snapshot
//! and logs it.

use stripe_metrics::config::MetricsConfig;
use stripe_metrics::services::{check_health, gather_metrics, MetricsEngine};

use service_core::observability::init_tracing;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = MetricsConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        api_base_url = %config.stripe.api_base_url,
        currency = %config.engine.currency,
        churn_window_days = config.engine.churn_window_days,
        page_size = config.engine.page_size,
        "Starting stripe-metrics"
    );

    let engine = MetricsEngine::from_config(&config)?;
    let health = check_health(engine.as_ref().map(|e| e.provider())).await;
    let Some(engine) = engine.filter(|_| health.is_healthy()) else {
        tracing::error!(state = ?health.state, message = %health.message, "Stripe is not available");
        anyhow::bail!(health.message);
    };
    tracing::info!(message = %health.message, "Health check passed");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received, cancelling in-flight requests");
            on_signal.cancel();
        }
    });

    let snapshot = engine.snapshot(&cancel).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to compute metrics snapshot");
        e
    })?;

    tracing::info!(
        snapshot = %serde_json::to_string(&snapshot)?,
        "Metrics snapshot"
    );
    tracing::debug!(metrics = %gather_metrics(), "Prometheus metrics");

    Ok(())
}
