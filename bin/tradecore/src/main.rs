use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::{Config, StrategyStore};
use engine::persistence::DEFAULT_LOG_LIMIT;
use engine::{BinanceMarketData, SqliteStore, TradingCore};
use strategy::FileStrategyStore;

#[derive(Parser)]
#[command(name = "tradecore")]
#[command(about = "Indicator-driven trading decision core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduler loop until Ctrl-C (default)
    Run {
        /// Seconds between ticks; overrides CORE_INTERVAL_SECS
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Run a single tick and exit
    Once,

    /// Print the most recent decision logs
    Logs {
        #[arg(short, long, default_value_t = DEFAULT_LOG_LIMIT)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("Failed to load configuration")?;

    // ── Database ──────────────────────────────────────────────────────────────
    let store = SqliteStore::connect(&cfg.database_url)
        .await
        .context("Failed to open database")?;

    match cli.command.unwrap_or(Command::Run { interval: None }) {
        Command::Logs { limit } => print_logs(&store, limit).await,
        Command::Once => {
            let core = build_core(&cfg, store)?;
            let processed = core.run_once().await;
            println!("Processed {processed} strategy/asset pair(s)");
            Ok(())
        }
        Command::Run { interval } => {
            let core = build_core(&cfg, store)?;
            let interval_secs = interval.unwrap_or(cfg.interval_secs);

            let (shutdown_tx, _) = broadcast::channel::<()>(1);
            let handle = core.start(interval_secs, shutdown_tx);

            info!("Trading core running. Waiting for shutdown signal.");
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            info!("Shutdown signal received. Stopping trading core.");
            handle.stop().await;
            Ok(())
        }
    }
}

fn build_core(cfg: &Config, store: SqliteStore) -> anyhow::Result<TradingCore> {
    let store = Arc::new(store);

    let strategies: Arc<dyn StrategyStore> = match &cfg.strategy_config_path {
        Some(path) => {
            info!(path = %path, "Reading strategies from file");
            Arc::new(FileStrategyStore::new(path))
        }
        None => store.clone(),
    };

    let market = BinanceMarketData::new(
        cfg.market_data_url.as_str(),
        Duration::from_secs(cfg.http_timeout_secs),
    )
    .context("Failed to build market data client")?;

    Ok(
        TradingCore::new(strategies, Arc::new(market), store, cfg.exchange.as_str())
            .with_candle_limit(cfg.candle_limit),
    )
}

async fn print_logs(store: &SqliteStore, limit: u32) -> anyhow::Result<()> {
    let logs = store
        .recent_decision_logs(limit)
        .await
        .context("Failed to read decision logs")?;

    if logs.is_empty() {
        println!("No decision logs yet.");
    }
    for log in logs {
        println!(
            "[{}] {} {} ({:.2}%)",
            log.created_at.format("%Y-%m-%d %H:%M:%S"),
            log.asset,
            log.signal_type,
            log.confidence
        );
        println!("{}\n", log.reasoning);
    }
    Ok(())
}
