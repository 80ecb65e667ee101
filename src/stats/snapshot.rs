use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub rows_queued: u64,
    pub rows_completed: u64,
    pub rows_defaulted: u64,
    pub requests_success: u64,
    pub requests_failed: u64,
    pub active_workers: u64,
    pub success_rate: f64,
    pub avg_response_time_ms: u64,
    pub elapsed_seconds: f64,
}
