use crate::stats::snapshot::StatsSnapshot;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::{Duration, Instant};

/// Run-wide counters, shared across workers. Purely informational; the
/// aggregator, not these counters, is the source of truth for results.
#[derive(Clone)]
pub struct RunStats {
    rows_queued: Arc<AtomicU64>,
    rows_completed: Arc<AtomicU64>,
    rows_defaulted: Arc<AtomicU64>,
    requests_success: Arc<AtomicU64>,
    requests_failed: Arc<AtomicU64>,
    active_workers: Arc<AtomicU64>,
    total_response_time_ms: Arc<AtomicU64>,
    start_time: Arc<Instant>,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            rows_queued: Arc::new(AtomicU64::new(0)),
            rows_completed: Arc::new(AtomicU64::new(0)),
            rows_defaulted: Arc::new(AtomicU64::new(0)),
            requests_success: Arc::new(AtomicU64::new(0)),
            requests_failed: Arc::new(AtomicU64::new(0)),
            active_workers: Arc::new(AtomicU64::new(0)),
            total_response_time_ms: Arc::new(AtomicU64::new(0)),
            start_time: Arc::new(Instant::now()),
        }
    }
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queued(&self) {
        self.rows_queued.fetch_add(1, Ordering::SeqCst);
    }

    pub fn increment_completed(&self) {
        self.rows_completed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn increment_defaulted(&self) {
        self.rows_defaulted.fetch_add(1, Ordering::SeqCst);
    }

    pub fn increment_active_workers(&self) {
        self.active_workers.fetch_add(1, Ordering::SeqCst);
    }

    pub fn decrement_active_workers(&self) {
        self.active_workers.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn record_success(&self, duration: Duration) {
        self.requests_success.fetch_add(1, Ordering::SeqCst);
        self.total_response_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn record_failure(&self, duration: Duration) {
        self.requests_failed.fetch_add(1, Ordering::SeqCst);
        self.total_response_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let success = self.requests_success.load(Ordering::SeqCst);
        let failed = self.requests_failed.load(Ordering::SeqCst);
        let total = success + failed;
        let total_time = self.total_response_time_ms.load(Ordering::SeqCst);

        let success_rate = if total > 0 {
            (success as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        let avg_response_time_ms = if total > 0 { total_time / total } else { 0 };

        StatsSnapshot {
            rows_queued: self.rows_queued.load(Ordering::SeqCst),
            rows_completed: self.rows_completed.load(Ordering::SeqCst),
            rows_defaulted: self.rows_defaulted.load(Ordering::SeqCst),
            requests_success: success,
            requests_failed: failed,
            active_workers: self.active_workers.load(Ordering::SeqCst),
            success_rate,
            avg_response_time_ms,
            elapsed_seconds: self.start_time.elapsed().as_secs_f64(),
        }
    }
}
