// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for a conversion run.
//!
//! All metrics carry the `nginx2traefik_` prefix. A batch run has no HTTP
//! endpoint; the CLI writes [`gather_metrics`] output to a file for the
//! node-exporter textfile collector.
//!
//! # Metrics Categories
//!
//! - **Ingress Metrics** - Per-Ingress outcome and conversion duration
//! - **Annotation Metrics** - Report outcome per annotation
//! - **Resource Metrics** - Generated Traefik and cert-manager resources
//! - **Certificate Lookup Metrics** - Cluster lookups and cache behavior
//!
//! # Example
//!
//! ```rust,no_run
//! use nginx2traefik::metrics::{gather_metrics, record_ingress};
//!
//! record_ingress("converted", std::time::Duration::from_millis(3));
//! let text = gather_metrics().unwrap();
//! assert!(text.contains("nginx2traefik_ingresses_total"));
//! ```

use crate::report::AnnotationStatus;
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

const METRICS_NAMESPACE: &str = "nginx2traefik";

/// Ingress converted with no hard error
pub const OUTCOME_CONVERTED: &str = "converted";

/// Ingress conversion aborted by a hard error; partial output kept
pub const OUTCOME_ABORTED: &str = "aborted";

/// Certificate lookup outcomes
pub const LOOKUP_FOUND: &str = "found";
pub const LOOKUP_NOT_FOUND: &str = "not_found";
pub const LOOKUP_CRD_ABSENT: &str = "crd_absent";
pub const LOOKUP_ERROR: &str = "error";
pub const LOOKUP_CACHED: &str = "cached";

// ============================================================================
// Global Metrics Registry
// ============================================================================

pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Ingress Metrics
// ============================================================================

/// Total number of Ingresses processed
///
/// Labels:
/// - `outcome`: `converted` or `aborted`
pub static INGRESSES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_ingresses_total"),
        "Total number of Ingresses processed by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of a single Ingress conversion in seconds
pub static CONVERSION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_conversion_duration_seconds"),
        "Duration of a single Ingress conversion in seconds by outcome",
    )
    .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]);
    let histogram = HistogramVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Annotation Metrics
// ============================================================================

/// Report entries by status
///
/// Labels:
/// - `status`: `converted`, `warning`, `skipped`, `ignored`
pub static ANNOTATION_OUTCOMES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_annotation_outcomes_total"),
        "Total number of annotation report entries by status",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Resource Metrics
// ============================================================================

/// Generated resources by kind
///
/// Labels:
/// - `kind`: `Middleware`, `IngressRoute`, `TLSOption`, `Certificate`
pub static RESOURCES_GENERATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_generated_total"),
        "Total number of generated resources by kind",
    );
    let counter = CounterVec::new(opts, &["kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Certificate Lookup Metrics
// ============================================================================

/// Certificate lookups by outcome
///
/// Labels:
/// - `outcome`: `found`, `not_found`, `crd_absent`, `error`, `cached`
pub static CERTIFICATE_LOOKUPS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_certificate_lookups_total"),
        "Total number of cert-manager Certificate lookups by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a processed Ingress
///
/// # Arguments
/// * `outcome` - [`OUTCOME_CONVERTED`] or [`OUTCOME_ABORTED`]
/// * `duration` - Time spent converting it
pub fn record_ingress(outcome: &str, duration: Duration) {
    INGRESSES_TOTAL.with_label_values(&[outcome]).inc();
    CONVERSION_DURATION_SECONDS
        .with_label_values(&[outcome])
        .observe(duration.as_secs_f64());
}

pub fn record_annotation_outcome(status: AnnotationStatus) {
    ANNOTATION_OUTCOMES_TOTAL
        .with_label_values(&[status.to_string().as_str()])
        .inc();
}

/// Record `count` generated resources of `kind`. Zero counts are not recorded.
pub fn record_resources_generated(kind: &str, count: usize) {
    if count == 0 {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    RESOURCES_GENERATED_TOTAL
        .with_label_values(&[kind])
        .inc_by(count as f64);
}

pub fn record_certificate_lookup(outcome: &str) {
    CERTIFICATE_LOOKUPS_TOTAL
        .with_label_values(&[outcome])
        .inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
