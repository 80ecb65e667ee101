use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokentab::aggregate::Aggregator;
use tokentab::config::{ConfigLoader, JobConfig};
use tokentab::extract::PoolMetrics;
use tokentab::fetch::DEFAULT_DECIMALS;
use tokentab::jobs::{DecimalsJob, PoolMetricsJob};
use tokentab::pool::Scheduler;
use tokentab::stats::StatsSnapshot;
use tokentab::table::{self, TokenTable};
use tokio::task::JoinHandle;

/// Worker count used by the metrics entry point when no config file is given.
const METRICS_ENTRY_WORKERS: usize = 10;

#[derive(Parser)]
#[command(name = "tokentab")]
#[command(version = "0.1.0")]
#[command(about = "Enrich token tables with market and on-chain metadata", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape FDV, liquidity and 24h volume for every row
    Metrics {
        /// Path to the input CSV (column 1: network, column 2: address)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Path to a configuration file (JSON/YAML/TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show progress bar (stderr)
        #[arg(short, long, default_value_t = true)]
        progress: bool,
    },
    /// Query token decimals over JSON-RPC for every row
    Decimals {
        /// Path to the input CSV (column 1: network, column 2: address)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Path to a configuration file (JSON/YAML/TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show progress bar (stderr)
        #[arg(short, long, default_value_t = true)]
        progress: bool,
    },
    /// Validate a configuration file
    Check {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    let cli = Cli::parse();
    let logger = env_logger::Builder::from_default_env().build();
    let multi = Arc::new(MultiProgress::new());

    match cli.command {
        Commands::Metrics {
            input,
            config,
            progress,
        } => {
            init_logging(progress, &multi, logger)?;
            let cfg = resolve_config(config.as_deref(), input, Some(METRICS_ENTRY_WORKERS))?;
            run_metrics(cfg, progress, multi).await?;
        }
        Commands::Decimals {
            input,
            config,
            progress,
        } => {
            init_logging(progress, &multi, logger)?;
            let cfg = resolve_config(config.as_deref(), input, None)?;
            run_decimals(cfg, progress, multi).await?;
        }
        Commands::Check { config } => match ConfigLoader::load(&config) {
            Ok(cfg) => {
                println!("✅ Config is valid:");
                println!("   Input: {}", cfg.input);
                println!("   Workers: {}", cfg.workers);
                println!("   Delay: {}ms", cfg.delay_ms);
                println!("   Networks: {}", cfg.rpc_endpoints.len());
            }
            Err(e) => {
                eprintln!("❌ Config error: {e}");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

fn init_logging(
    progress: bool,
    multi: &Arc<MultiProgress>,
    logger: env_logger::Logger,
) -> anyhow::Result<()> {
    if progress {
        indicatif_log_bridge::LogWrapper::new((**multi).clone(), logger).try_init()?;
    } else {
        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(log::LevelFilter::Info);
    }
    Ok(())
}

fn resolve_config(
    config: Option<&Path>,
    input: Option<PathBuf>,
    entry_workers: Option<usize>,
) -> anyhow::Result<JobConfig> {
    let mut cfg = match config {
        Some(path) => {
            log::info!("Loading config from {:?}", path);
            ConfigLoader::load(path)?
        }
        None => {
            let mut cfg = JobConfig::default();
            if let Some(workers) = entry_workers {
                cfg.workers = workers;
            }
            cfg
        }
    };

    if let Some(input) = input {
        cfg.input = input.to_string_lossy().into_owned();
    }
    Ok(cfg)
}

async fn run_metrics(cfg: JobConfig, progress: bool, multi: Arc<MultiProgress>) -> anyhow::Result<()> {
    let mut table = TokenTable::load(&cfg.input)?;
    let tasks = table.tasks();

    let aggregator = Arc::new(Aggregator::new(tasks.len()));
    let job = Arc::new(PoolMetricsJob::new(
        cfg.base_url.clone(),
        Duration::from_secs(cfg.timeout_secs),
    ));
    let scheduler = Scheduler::new(cfg.workers, Duration::from_millis(cfg.delay_ms), None);

    let progress_task = if progress {
        Some(spawn_progress(&scheduler, &multi)?)
    } else {
        None
    };

    scheduler.run(job, tasks, aggregator.clone()).await;
    finish_progress(progress_task, &scheduler);

    let rows = aggregator.finish(PoolMetrics::zero()).await;
    table.apply_metrics(rows);

    let input_path = PathBuf::from(&cfg.input);
    let result_path = table::derived_path(&input_path, "_result");
    table.save(&result_path)?;
    log::info!("results saved to {}", result_path.display());
    table.save(&input_path)?;
    log::info!("input file updated in place");

    print_summary(&scheduler.snapshot());
    Ok(())
}

async fn run_decimals(cfg: JobConfig, progress: bool, multi: Arc<MultiProgress>) -> anyhow::Result<()> {
    let input_path = PathBuf::from(&cfg.input);
    let mut table = TokenTable::load(&input_path)?;
    let tasks = table.tasks();

    table::backup(&input_path)?;

    let aggregator = Arc::new(Aggregator::new(tasks.len()));
    let job = Arc::new(DecimalsJob::new(
        cfg.rpc_endpoints.clone(),
        Duration::from_secs(cfg.timeout_secs),
    ));
    let scheduler = Scheduler::new(cfg.workers, Duration::from_millis(cfg.delay_ms), None);

    let progress_task = if progress {
        Some(spawn_progress(&scheduler, &multi)?)
    } else {
        None
    };

    scheduler.run(job, tasks, aggregator.clone()).await;
    finish_progress(progress_task, &scheduler);

    let values = aggregator.finish(DEFAULT_DECIMALS).await;

    let mut histogram: BTreeMap<u32, usize> = BTreeMap::new();
    for value in &values {
        *histogram.entry(*value).or_default() += 1;
    }

    table.apply_decimals(values);
    let output_path = table::derived_path(&input_path, "_with_decimals");
    table.save(&output_path)?;
    log::info!("results saved to {}", output_path.display());

    log::info!("decimals distribution:");
    for (decimals, count) in &histogram {
        log::info!("  {decimals}: {count} tokens");
    }

    print_summary(&scheduler.snapshot());
    Ok(())
}

fn spawn_progress(
    scheduler: &Scheduler,
    multi: &MultiProgress,
) -> anyhow::Result<(ProgressBar, JoinHandle<()>)> {
    let pb = multi.add(ProgressBar::new(0));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let mut stats_rx = scheduler.watch_stats();
    let pb_clone = pb.clone();
    let task = tokio::spawn(async move {
        while stats_rx.changed().await.is_ok() {
            let snapshot: StatsSnapshot = stats_rx.borrow().clone();
            pb_clone.set_length(snapshot.rows_queued);
            pb_clone.set_position(snapshot.rows_completed);
            pb_clone.set_message(format!(
                "Defaults: {} | Success: {:.1}%",
                snapshot.rows_defaulted, snapshot.success_rate
            ));
        }
    });

    Ok((pb, task))
}

fn finish_progress(handle: Option<(ProgressBar, JoinHandle<()>)>, scheduler: &Scheduler) {
    if let Some((pb, task)) = handle {
        task.abort();
        let snapshot = scheduler.snapshot();
        pb.finish_with_message(format!(
            "Defaults: {} | Success: {:.1}% - Completed",
            snapshot.rows_defaulted, snapshot.success_rate
        ));
    }
}

fn print_summary(snapshot: &StatsSnapshot) {
    println!("\n✅ Run completed:");
    println!("   Rows processed: {}", snapshot.rows_completed);
    println!("   Defaults substituted: {}", snapshot.rows_defaulted);
    println!("   Success rate: {:.1}%", snapshot.success_rate);
    println!("   Average request: {}ms", snapshot.avg_response_time_ms);
    println!("   Total time: {:.1}s", snapshot.elapsed_seconds);
}
