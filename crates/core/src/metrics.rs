//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Discovery (files found per run)
//! - Conversion (per-file results and encoder wall time)
//! - Runs (completed or cancelled)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Discovery
// =============================================================================

/// Files found by the walker, accepted or not.
pub static FILES_DISCOVERED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "audiobatch_files_discovered_total",
        "Total files discovered in input trees",
    )
    .unwrap()
});

// =============================================================================
// Conversion
// =============================================================================

/// Files processed by result.
pub static FILES_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audiobatch_files_total", "Total files processed by result"),
        &["result"], // "converted", "skipped", "failed"
    )
    .unwrap()
});

/// Encoder wall time per file in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "audiobatch_conversion_duration_seconds",
            "Duration of a single file conversion",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 200.0]),
        &["format", "quality"],
    )
    .unwrap()
});

// =============================================================================
// Runs
// =============================================================================

/// Runs finished, by outcome.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audiobatch_runs_total", "Total batch runs"),
        &["outcome"], // "completed", "cancelled"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(FILES_DISCOVERED.clone()),
        Box::new(FILES_PROCESSED.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(RUNS_TOTAL.clone()),
    ]
}
