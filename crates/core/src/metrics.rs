//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Jobs (runs, durations, stalls)
//! - Encoding (per-format conversions, segmentations)
//! - Publication (uploaded files and bytes)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Job Metrics
// =============================================================================

/// Transcode jobs total by result.
pub static JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("chorale_jobs_total", "Total transcode jobs"),
        &["result"], // "completed", "failed"
    )
    .unwrap()
});

/// Job duration in seconds, end to end.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "chorale_job_duration_seconds",
            "Duration of transcode jobs end to end",
        )
        .buckets(vec![
            1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0,
        ]),
        &["result"],
    )
    .unwrap()
});

/// Stalled jobs re-queued.
pub static JOB_STALLS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "chorale_job_stalls_total",
        "Total jobs re-queued after a stall",
    )
    .unwrap()
});

// =============================================================================
// Encoding Metrics
// =============================================================================

/// Derivative encodes total by format and result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("chorale_conversions_total", "Total derivative encodes"),
        &["format", "result"], // result: "success", "failed"
    )
    .unwrap()
});

/// Single-format encode duration in seconds.
pub static CONVERSION_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "chorale_conversion_duration_seconds",
            "Duration of single-format encodes",
        )
        .buckets(vec![0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
    )
    .unwrap()
});

/// HLS segmentation runs by result.
pub static SEGMENTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("chorale_segmentations_total", "Total HLS segmentation runs"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Publication Metrics
// =============================================================================

/// Bytes uploaded to the final bucket.
pub static UPLOADED_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "chorale_uploaded_bytes_total",
        "Total bytes uploaded to the final bucket",
    )
    .unwrap()
});

/// Files uploaded to the final bucket.
pub static FILES_UPLOADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "chorale_files_uploaded_total",
        "Total files uploaded to the final bucket",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Jobs
        Box::new(JOBS_TOTAL.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(JOB_STALLS.clone()),
        // Encoding
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(SEGMENTATIONS_TOTAL.clone()),
        // Publication
        Box::new(UPLOADED_BYTES.clone()),
        Box::new(FILES_UPLOADED.clone()),
    ]
}
