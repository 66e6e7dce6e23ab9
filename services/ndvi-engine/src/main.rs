//! NDVI engine batch runner.
//!
//! Reads raw observations as JSON, scores and caches them, and prints
//! per-field summaries as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ndvi_common::today_utc;
use ndvi_engine::{Baseline, BatchInput, BatchReport, EngineConfig, Pipeline};
use storage::{CacheBackend, MemoryCache, RedisCache};

#[derive(Parser, Debug)]
#[command(name = "ndvi-engine")]
#[command(about = "Score, cache and summarize satellite NDVI observations")]
struct Args {
    /// JSON input file (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, env = "NDVI_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Historical mean applied to fields without their own baseline
    #[arg(long, requires = "hist_std")]
    hist_mean: Option<f64>,

    /// Historical standard deviation paired with --hist-mean
    #[arg(long, requires = "hist_mean")]
    hist_std: Option<f64>,

    /// Evaluate ages as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    let config = EngineConfig::load(args.config.as_deref())?;
    info!(
        max_entries = config.cache.max_entries,
        redis = config.cache.redis_url.is_some(),
        min_confidence = config.quality.min_confidence,
        trend_threshold = config.analytics.trend_threshold,
        "Loaded configuration"
    );

    let text = read_input(args.input.as_ref())?;
    let input = BatchInput::from_json(&text).context("Failed to parse input observations")?;

    let baseline = match (args.hist_mean, args.hist_std) {
        (Some(mean), Some(std)) => Some(Baseline { mean, std }),
        _ => None,
    };
    let today = args.today.unwrap_or_else(today_utc);

    let report = match &config.cache.redis_url {
        Some(url) => {
            let backend = RedisCache::connect(url, config.cache.redis_prefix.clone()).await?;
            run_batch(backend, &config, input, today, baseline).await?
        }
        None => {
            let backend = MemoryCache::new(config.cache.max_entries);
            run_batch(backend, &config, input, today, baseline).await?
        }
    };

    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);
    Ok(())
}

async fn run_batch<B: CacheBackend>(
    backend: B,
    config: &EngineConfig,
    input: BatchInput,
    today: NaiveDate,
    baseline: Option<Baseline>,
) -> Result<BatchReport> {
    info!(backend = backend.name(), "Cache backend ready");
    let pipeline = Pipeline::new(backend, config)?;
    Ok(pipeline.run(input, today, baseline).await?)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input: {:?}", path)),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}
