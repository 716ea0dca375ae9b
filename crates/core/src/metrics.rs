//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Batches (outcome, duration, size)
//! - Records (accepted, rejected, errored, duplicate)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Batch Metrics
// =============================================================================

/// Batches processed total by result.
pub static BATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("streamsift_batches_total", "Total ranking batches processed"),
        &["result"], // "success", "invalid_config", "worker_spawn", "worker_terminated", "timeout"
    )
    .unwrap()
});

/// Batch duration in seconds.
pub static BATCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "streamsift_batch_duration_seconds",
            "Duration of a ranking batch",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
        &["executor"],
    )
    .unwrap()
});

/// Records received per batch.
pub static BATCH_SIZE: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("streamsift_batch_size", "Number of raw records per batch")
            .buckets(vec![0.0, 1.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Record Metrics
// =============================================================================

/// Records processed total by outcome.
pub static RECORDS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("streamsift_records_total", "Total raw records processed"),
        &["outcome"], // "accepted", "rejected", "error", "duplicate"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Collectors to register with a prometheus registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(BATCHES_TOTAL.clone()),
        Box::new(BATCH_DURATION.clone()),
        Box::new(BATCH_SIZE.clone()),
        Box::new(RECORDS_TOTAL.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        RECORDS_TOTAL.with_label_values(&["accepted"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"streamsift_records_total".to_string()));
    }
}
