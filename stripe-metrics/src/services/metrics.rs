//! Prometheus metrics for stripe-metrics.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Pages fetched by collection.
pub static PAGES_FETCHED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "stripe_pages_fetched_total",
        "Total number of list pages fetched from Stripe",
        &["collection"]
    )
    .expect("Failed to register stripe_pages_fetched_total")
});

/// Failed remote calls by operation and error kind.
pub static FETCH_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "stripe_fetch_errors_total",
        "Total number of failed Stripe calls by operation and error kind",
        &["operation", "kind"]
    )
    .expect("Failed to register stripe_fetch_errors_total")
});

/// HTTP round-trip duration by operation.
pub static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "stripe_request_duration_seconds",
        "Stripe API request duration in seconds",
        &["operation"],
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register stripe_request_duration_seconds")
});

pub fn record_page(collection: &str) {
    PAGES_FETCHED_TOTAL.with_label_values(&[collection]).inc();
}

pub fn record_error(operation: &str, kind: &str) {
    FETCH_ERRORS_TOTAL.with_label_values(&[operation, kind]).inc();
}

pub fn observe_request(operation: &str, seconds: f64) {
    REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(seconds);
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_else(|e| format!("# Failed to encode metrics: {}\n", e))
}
