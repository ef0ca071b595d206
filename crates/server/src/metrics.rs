//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the catalog server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Admin gate failures and admin mutations
//! - Catalog size and downloads (partly collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use tracing::error;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cinelinks_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .expect("valid histogram definition")
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinelinks_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .expect("valid counter definition")
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cinelinks_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .expect("valid gauge definition")
});

// =============================================================================
// Admin Metrics
// =============================================================================

/// Rejected admin requests.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cinelinks_auth_failures_total",
            "Total rejected admin requests",
        ),
        &["reason"],
    )
    .expect("valid counter definition")
});

/// Successful admin mutations by action.
pub static ADMIN_MUTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cinelinks_admin_mutations_total",
            "Catalog changes made through the admin gate",
        ),
        &["action"],
    )
    .expect("valid counter definition")
});

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Downloads recorded since startup.
pub static CATALOG_DOWNLOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "cinelinks_catalog_downloads_total",
        "Download actions recorded since startup",
    )
    .expect("valid counter definition")
});

/// Active catalog entries (collected dynamically).
pub static CATALOG_ENTRIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cinelinks_catalog_entries",
        "Number of active entries in the catalog",
    )
    .expect("valid gauge definition")
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // HTTP
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        // Admin
        Box::new(AUTH_FAILURES_TOTAL.clone()),
        Box::new(ADMIN_MUTATIONS_TOTAL.clone()),
        // Catalog
        Box::new(CATALOG_DOWNLOADS_TOTAL.clone()),
        Box::new(CATALOG_ENTRIES.clone()),
    ];

    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            error!("Failed to register metric: {}", e);
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the store, not just this process.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    if let Ok(stats) = state.catalog().stats() {
        CATALOG_ENTRIES.set(stats.total as i64);
    }
}
