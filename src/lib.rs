pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod jobs;
pub mod pool;
pub mod stats;
pub mod table;

pub use aggregate::Aggregator;
pub use error::{Error, Result};
pub use extract::{Pipeline, PoolMetrics};
pub use jobs::{DecimalsJob, PoolMetricsJob};
pub use pool::{RowJob, Scheduler};
pub use stats::{RunStats, StatsSnapshot};
pub use table::{Task, TokenTable};
