//! Metrics collection and reporting

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics collector for moderation throughput and decision rates
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    total_requests: AtomicU64,
    approved: AtomicU64,
    flagged: AtomicU64,
    rejected: AtomicU64,
    analyzer_failures: AtomicU64,
    total_latency_us: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                total_requests: AtomicU64::new(0),
                approved: AtomicU64::new(0),
                flagged: AtomicU64::new(0),
                rejected: AtomicU64::new(0),
                analyzer_failures: AtomicU64::new(0),
                total_latency_us: AtomicU64::new(0),
            }),
        }
    }

    /// Record a request
    pub fn record_request(&self) {
        self.inner.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an approved decision
    pub fn record_approved(&self) {
        self.inner.approved.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a flagged-for-review decision
    pub fn record_flagged(&self) {
        self.inner.flagged.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected decision
    pub fn record_rejected(&self) {
        self.inner.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an analyzer failure absorbed by a fallback
    pub fn record_analyzer_failure(&self) {
        self.inner.analyzer_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record end-to-end pipeline latency
    pub fn record_latency(&self, latency_us: u64) {
        self.inner
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.inner.total_requests.load(Ordering::Relaxed),
            approved: self.inner.approved.load(Ordering::Relaxed),
            flagged: self.inner.flagged.load(Ordering::Relaxed),
            rejected: self.inner.rejected.load(Ordering::Relaxed),
            analyzer_failures: self.inner.analyzer_failures.load(Ordering::Relaxed),
            total_latency_us: self.inner.total_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub approved: u64,
    pub flagged: u64,
    pub rejected: u64,
    pub analyzer_failures: u64,
    pub total_latency_us: u64,
}

impl MetricsSnapshot {
    /// Calculate average latency per request
    pub fn avg_latency_us(&self) -> u64 {
        if self.total_requests == 0 {
            0
        } else {
            self.total_latency_us / self.total_requests
        }
    }

    /// Share of requests that auto-approved
    pub fn approval_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.approved as f64 / self.total_requests as f64
        }
    }

    /// Share of requests routed to human review (flagged or rejected)
    pub fn review_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.flagged + self.rejected) as f64 / self.total_requests as f64
        }
    }
}
