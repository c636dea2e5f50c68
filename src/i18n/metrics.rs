//! Translation lookup metrics.
//!
//! Counts every catalog lookup and every miss (a key rendered as its
//! sentinel or replaced by a fallback), so missing strings show up in logs
//! and reports instead of silently on screen.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Lookup counters. Use [`LookupMetrics::global`] in application code.
#[derive(Debug, Default)]
pub struct LookupMetrics {
    lookups: AtomicUsize,
    misses: AtomicUsize,
}

static METRICS: OnceLock<LookupMetrics> = OnceLock::new();

impl LookupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the process-wide metrics instance.
    pub fn global() -> &'static LookupMetrics {
        METRICS.get_or_init(LookupMetrics::new)
    }

    pub fn record_hit(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let lookups = self.lookups();
        let misses = self.misses();
        let miss_rate = if lookups > 0 {
            (misses as f64 / lookups as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            lookups,
            misses,
            miss_rate,
        }
    }
}

/// Snapshot of lookup statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub lookups: usize,
    pub misses: usize,

    /// Miss rate as a percentage (0-100)
    pub miss_rate: f64,
}
