//! Delivery statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lifetime delivery counters, shared across the orchestrator, retry
/// scheduler, and broadcaster. Cheap to bump from any task.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    created: AtomicU64,
    delivered_realtime: AtomicU64,
    delivered_email: AtomicU64,
    fallbacks: AtomicU64,
    retries: AtomicU64,
    permanent_failures: AtomicU64,
    broadcasts: AtomicU64,
}

/// A point-in-time copy of the counters, for the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Notifications created.
    pub created: u64,
    /// Successful real-time deliveries.
    pub delivered_realtime: u64,
    /// Successful email deliveries.
    pub delivered_email: u64,
    /// Email deliveries that ran as a real-time fallback.
    pub fallbacks: u64,
    /// Retry attempts executed.
    pub retries: u64,
    /// Notifications whose delivery permanently failed.
    pub permanent_failures: u64,
    /// Broadcast operations executed.
    pub broadcasts: u64,
}

impl DeliveryStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A notification was created.
    pub fn record_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    /// A real-time push succeeded.
    pub fn record_realtime_delivery(&self) {
        self.delivered_realtime.fetch_add(1, Ordering::Relaxed);
    }

    /// An email delivery succeeded.
    pub fn record_email_delivery(&self) {
        self.delivered_email.fetch_add(1, Ordering::Relaxed);
    }

    /// An email ran as a fallback for a failed real-time push.
    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// A retry attempt was executed.
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// A notification exhausted its retries.
    pub fn record_permanent_failure(&self) {
        self.permanent_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A broadcast operation ran.
    pub fn record_broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            delivered_realtime: self.delivered_realtime.load(Ordering::Relaxed),
            delivered_email: self.delivered_email.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            permanent_failures: self.permanent_failures.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = DeliveryStats::new();
        stats.record_created();
        stats.record_created();
        stats.record_realtime_delivery();
        stats.record_fallback();

        let snap = stats.snapshot();
        assert_eq!(snap.created, 2);
        assert_eq!(snap.delivered_realtime, 1);
        assert_eq!(snap.fallbacks, 1);
        assert_eq!(snap.permanent_failures, 0);
    }
}
