pub mod collector;
pub mod snapshot;

pub use collector::RunStats;
pub use snapshot::StatsSnapshot;
