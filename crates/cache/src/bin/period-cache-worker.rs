//! period-cache-worker — host loop for the time period activity cache.
//!
//! Loads period definitions from the periods directory, keeps them in sync
//! with the filesystem, and refreshes the activity cache on a fixed tick.
//! Every change in a period's activity shows up in the log as a
//! `TIMEPERIOD TRANSITION: name;from;to` line.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use periodwatch_cache::PeriodActivityCache;
use periodwatch_core::Config;
use periodwatch_periods::{LoadStatus, PeriodLoader, PeriodRegistry, PeriodSource, WeeklyEvaluator};

// ── CLI ─────────────────────────────────────────────────────────────

/// Time period activity cache worker.
#[derive(Parser, Debug)]
#[command(name = "period-cache-worker", version, about)]
struct Cli {
    /// Config profile; keys are looked up as `{PROFILE}_{KEY}` first.
    /// Defaults to PERIODWATCH_PROFILE.
    #[arg(long)]
    profile: Option<String>,

    /// Directory containing period YAML files (overrides PERIODS_DIR).
    #[arg(long)]
    periods_dir: Option<PathBuf>,

    /// Seconds between refreshes (overrides CACHE_TICK_SECS).
    #[arg(long)]
    tick_secs: Option<u64>,

    /// Do not watch the periods directory for changes.
    #[arg(long)]
    no_watch: bool,

    /// Refresh once, print the cache as JSON, and exit.
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.periods_dir {
            config.periods.dir = dir.clone();
        }
        if let Some(tick) = self.tick_secs {
            config.cache.tick_secs = tick;
        }
        if self.no_watch || self.once {
            config.periods.watch = false;
        }
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    periodwatch_core::config::load_dotenv();
    let cli = Cli::parse();

    let mut config = match &cli.profile {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;
    config.log_summary();

    let registry = PeriodRegistry::new();
    let mut loader = PeriodLoader::new(config.periods.dir.clone(), registry.clone());
    let results = loader
        .load_all()
        .with_context(|| format!("failed to load periods from {}", config.periods.dir.display()))?;
    let failed = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Failed { .. }))
        .count();
    if failed > 0 {
        warn!(failed, "some period files could not be loaded");
    }

    let source: Arc<dyn PeriodSource> = Arc::new(registry);
    let evaluator = Arc::new(WeeklyEvaluator::new(Arc::clone(&source)));
    let cache = PeriodActivityCache::new(source, evaluator);

    if cli.once {
        cache.refresh(Utc::now());
        println!("{}", serde_json::to_string_pretty(&cache.snapshot())?);
        return Ok(());
    }

    if config.periods.watch {
        loader.watch().context("failed to start periods watcher")?;
    }

    cache.log_current_periods();

    let mut interval = tokio::time::interval(config.cache.tick());
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(periods = cache.len(), tick_secs = config.cache.tick_secs, "period-cache-worker started");
    loop {
        tokio::select! {
            _ = interval.tick() => cache.refresh(Utc::now()),
            res = &mut shutdown => {
                if let Err(e) = res {
                    warn!(error = %e, "failed to listen for shutdown signal");
                }
                break;
            }
        }
    }

    info!("period-cache-worker exited cleanly");
    Ok(())
}
