use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct AtomicMetrics {
    commissions_processed: AtomicU64,
    commissions_reused: AtomicU64,
    payouts_created: AtomicU64,
    payouts_rejected: AtomicU64,
    batch_runs: AtomicU64,
    batch_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub commissions_processed: u64,
    pub commissions_reused: u64,
    pub payouts_created: u64,
    pub payouts_rejected: u64,
    pub batch_runs: u64,
    pub batch_failures: u64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_commissions_processed(&self) {
        self.commissions_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_commissions_reused(&self) {
        self.commissions_reused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_payouts_created(&self) {
        self.payouts_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_payouts_rejected(&self) {
        self.payouts_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_batch_runs(&self) {
        self.batch_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_batch_failures(&self) {
        self.batch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            commissions_processed: self.commissions_processed.load(Ordering::Relaxed),
            commissions_reused: self.commissions_reused.load(Ordering::Relaxed),
            payouts_created: self.payouts_created.load(Ordering::Relaxed),
            payouts_rejected: self.payouts_rejected.load(Ordering::Relaxed),
            batch_runs: self.batch_runs.load(Ordering::Relaxed),
            batch_failures: self.batch_failures.load(Ordering::Relaxed),
        }
    }
}
