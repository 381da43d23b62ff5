//! Hub counters for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single hub instance
#[derive(Debug, Default)]
pub struct HubMetrics {
    /// Requests accepted into buffers
    submitted_count: AtomicU64,
    /// Non-empty batches handed to dispatchers
    batch_count: AtomicU64,
    /// Requests contained in those batches
    dispatched_count: AtomicU64,
    /// Requests rejected because their service was unregistered
    abandoned_count: AtomicU64,
}

impl HubMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total submitted requests
    pub fn submitted_count(&self) -> u64 {
        self.submitted_count.load(Ordering::Relaxed)
    }

    /// Increment submitted count
    pub fn inc_submitted_count(&self) {
        self.submitted_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total dispatched batches
    pub fn batch_count(&self) -> u64 {
        self.batch_count.load(Ordering::Relaxed)
    }

    /// Get total dispatched requests
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched_count.load(Ordering::Relaxed)
    }

    /// Record one dispatched batch of the given size
    pub fn record_batch(&self, size: usize) {
        self.batch_count.fetch_add(1, Ordering::Relaxed);
        self.dispatched_count.fetch_add(size as u64, Ordering::Relaxed);
    }

    /// Get total abandoned requests
    pub fn abandoned_count(&self) -> u64 {
        self.abandoned_count.load(Ordering::Relaxed)
    }

    /// Record requests rejected at unregistration
    pub fn record_abandoned(&self, count: usize) {
        self.abandoned_count.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submitted_count: self.submitted_count(),
            batch_count: self.batch_count(),
            dispatched_count: self.dispatched_count(),
            abandoned_count: self.abandoned_count(),
        }
    }
}

/// Point-in-time copy of hub counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Requests accepted into buffers
    pub submitted_count: u64,
    /// Non-empty batches handed to dispatchers
    pub batch_count: u64,
    /// Requests contained in those batches
    pub dispatched_count: u64,
    /// Requests rejected because their service was unregistered
    pub abandoned_count: u64,
}
