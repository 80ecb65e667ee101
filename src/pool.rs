use crate::aggregate::Aggregator;
use crate::error::{Error, Result};
use crate::stats::collector::RunStats;
use crate::stats::snapshot::StatsSnapshot;
use crate::table::Task;
use async_trait::async_trait;
use futures::stream::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;

/// One row's worth of work: everything between dequeuing a task and having a
/// value ready for the aggregator. Implementations hold no per-task state.
#[async_trait]
pub trait RowJob: Send + Sync {
    type Value: Clone + Send + Sync + 'static;

    /// Substituted whenever `process` fails; also the coercion value for the
    /// aggregator.
    fn fallback(&self) -> Self::Value;

    async fn process(&self, task: &Task) -> Result<Self::Value>;
}

/// Fixed-size worker pool over a materialized task list. Per task:
/// process, substitute the fallback on any error, pace, record. A failing
/// row never stops the pool or touches other rows.
pub struct Scheduler {
    workers: usize,
    delay: Duration,
    stats: Arc<RunStats>,
}

impl Scheduler {
    pub fn new(workers: usize, delay: Duration, stats: Option<Arc<RunStats>>) -> Self {
        Self {
            workers: workers.max(1),
            delay,
            stats: stats.unwrap_or_else(|| Arc::new(RunStats::new())),
        }
    }

    pub async fn run<J: RowJob>(
        &self,
        job: Arc<J>,
        tasks: Vec<Task>,
        aggregator: Arc<Aggregator<J::Value>>,
    ) {
        let total = tasks.len();
        log::info!("processing {} rows with {} workers", total, self.workers);

        let (tasks_tx, tasks_rx) = mpsc::channel(total.max(1));
        let stats_seed = self.stats.clone();
        tokio::spawn(async move {
            for task in tasks {
                stats_seed.increment_queued();
                let _ = tasks_tx.send(task).await;
            }
        });

        let delay = self.delay;
        tokio_stream::wrappers::ReceiverStream::new(tasks_rx)
            .for_each_concurrent(self.workers, |task| {
                let job = job.clone();
                let aggregator = aggregator.clone();
                let stats = self.stats.clone();

                async move {
                    stats.increment_active_workers();
                    let start = std::time::Instant::now();

                    let value = match job.process(&task).await {
                        Ok(value) => {
                            stats.record_success(start.elapsed());
                            log::info!("row {} done", task.index + 1);
                            value
                        }
                        Err(e) => {
                            match &e {
                                Error::UnsupportedNetwork(_) => {
                                    log::error!("row {}: {}, substituting default", task.index + 1, e)
                                }
                                // Already names its row.
                                Error::MalformedRow(_) => {
                                    log::warn!("{e}, substituting default")
                                }
                                _ => {
                                    log::warn!("row {}: {}, substituting default", task.index + 1, e)
                                }
                            }
                            stats.record_failure(start.elapsed());
                            stats.increment_defaulted();
                            job.fallback()
                        }
                    };

                    // Rate-limit pacing, charged per completed task per worker.
                    sleep(delay).await;
                    aggregator.record(task.index, value).await;
                    stats.increment_completed();
                    stats.decrement_active_workers();
                }
            })
            .await;

        log::info!("all {total} rows processed");
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn watch_stats(&self) -> watch::Receiver<StatsSnapshot> {
        let (tx, rx) = watch::channel(self.stats.snapshot());
        let stats = self.stats.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(500));
            loop {
                interval.tick().await;
                if tx.send(stats.snapshot()).is_err() {
                    break;
                }
            }
        });
        rx
    }
}
