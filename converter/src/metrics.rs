//! Metrics collection for converter monitoring.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Converter metrics.
#[derive(Debug, Default)]
pub struct ConverterMetrics {
    /// Rate fetches started.
    pub fetches_issued: AtomicU64,
    /// Fetches whose record was installed.
    pub fetches_applied: AtomicU64,
    /// Fetches resolved after a newer fetch was issued.
    pub fetches_discarded: AtomicU64,
    /// Fetches that failed or timed out.
    pub fetches_failed: AtomicU64,
    /// Calculator results written to an amount.
    pub amounts_applied: AtomicU64,
    /// Currency swaps.
    pub swaps: AtomicU64,
}

impl ConverterMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_issued(&self) {
        self.fetches_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetch_applied(&self) {
        self.fetches_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetch_discarded(&self) {
        self.fetches_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetch_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn amount_applied(&self) {
        self.amounts_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn swapped(&self) {
        self.swaps.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fetches_issued: self.fetches_issued.load(Ordering::Relaxed),
            fetches_applied: self.fetches_applied.load(Ordering::Relaxed),
            fetches_discarded: self.fetches_discarded.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            amounts_applied: self.amounts_applied.load(Ordering::Relaxed),
            swaps: self.swaps.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub fetches_issued: u64,
    pub fetches_applied: u64,
    pub fetches_discarded: u64,
    pub fetches_failed: u64,
    pub amounts_applied: u64,
    pub swaps: u64,
}

impl MetricsSnapshot {
    /// Fetches issued but not yet resolved either way.
    pub fn fetches_outstanding(&self) -> u64 {
        self.fetches_issued
            .saturating_sub(self.fetches_applied + self.fetches_discarded + self.fetches_failed)
    }
}
