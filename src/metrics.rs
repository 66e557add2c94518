// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for mask resolution.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding process is responsible for choosing the exporter.
//!
//! # Metric Naming Convention
//! - `numeric_field_mask_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `result`: hit, miss
//! - `reason`: capacity, expired
//! - `kind`: error kind (see [`FieldMaskError::kind`](crate::FieldMaskError::kind))

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Record a mask cache lookup
pub fn record_cache_lookup(hit: bool) {
    counter!(
        "numeric_field_mask_cache_lookups_total",
        "result" => if hit { "hit" } else { "miss" }
    )
    .increment(1);
}

/// Record mask cache evictions
pub fn record_cache_eviction(reason: &'static str, count: usize) {
    counter!(
        "numeric_field_mask_cache_evictions_total",
        "reason" => reason
    )
    .increment(count as u64);
}

/// Set current number of cached masks
pub fn set_cache_entries(count: usize) {
    gauge!("numeric_field_mask_cache_entries").set(count as f64);
}

/// Record how long an uncached resolution took
pub fn record_resolve_latency(duration: Duration) {
    histogram!("numeric_field_mask_resolve_seconds").record(duration.as_secs_f64());
}

/// Record a failed resolution
pub fn record_resolve_error(kind: &'static str) {
    counter!(
        "numeric_field_mask_resolve_errors_total",
        "kind" => kind
    )
    .increment(1);
}

/// RAII timer that records resolve latency on drop.
pub struct ResolveTimer {
    start: Instant,
}

impl ResolveTimer {
    /// Start a new timer
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for ResolveTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResolveTimer {
    fn drop(&mut self) {
        record_resolve_latency(self.start.elapsed());
    }
}
