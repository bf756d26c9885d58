use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use common::{Config, CoreDecision, CoreState, DecisionSink, MarketDataProvider, StrategyRecord, StrategyStore};
use strategy::evaluate;

/// Lower bound on the pause between two ticks.
pub const MIN_INTERVAL_SECS: u64 = 10;

/// Pause between ticks for a configured interval.
pub fn clamp_interval(interval_secs: u64) -> Duration {
    Duration::from_secs(interval_secs.max(MIN_INTERVAL_SECS))
}

/// Handle to a running scheduler loop. Owned by whoever started it.
pub struct CoreHandle {
    task: JoinHandle<()>,
    shutdown: broadcast::Sender<()>,
    state: Arc<RwLock<CoreState>>,
}

impl CoreHandle {
    pub async fn state(&self) -> CoreState {
        *self.state.read().await
    }

    /// Signal cancellation and wait for the loop to exit. An in-flight tick
    /// is allowed to finish first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            error!("Trading core task failed: {e}");
        }
    }
}

/// The scheduler: on every tick evaluates each active strategy against each
/// of its watched assets and persists the outcome.
#[derive(Clone)]
pub struct TradingCore {
    strategies: Arc<dyn StrategyStore>,
    market: Arc<dyn MarketDataProvider>,
    sink: Arc<dyn DecisionSink>,
    exchange: String,
    candle_limit: u32,
}

impl TradingCore {
    pub fn new(
        strategies: Arc<dyn StrategyStore>,
        market: Arc<dyn MarketDataProvider>,
        sink: Arc<dyn DecisionSink>,
        exchange: impl Into<String>,
    ) -> Self {
        Self {
            strategies,
            market,
            sink,
            exchange: exchange.into(),
            candle_limit: Config::DEFAULT_CANDLE_LIMIT,
        }
    }

    pub fn with_candle_limit(mut self, candle_limit: u32) -> Self {
        self.candle_limit = candle_limit;
        self
    }

    /// Spawn the loop. It keeps running until a message is sent on
    /// `shutdown` (or [`CoreHandle::stop`] is called).
    pub fn start(self, interval_secs: u64, shutdown: broadcast::Sender<()>) -> CoreHandle {
        let shutdown_rx = shutdown.subscribe();
        let state = Arc::new(RwLock::new(CoreState::Running));
        let task = tokio::spawn(self.run(clamp_interval(interval_secs), shutdown_rx, state.clone()));
        CoreHandle {
            task,
            shutdown,
            state,
        }
    }

    async fn run(
        self,
        interval: Duration,
        mut shutdown_rx: broadcast::Receiver<()>,
        state: Arc<RwLock<CoreState>>,
    ) {
        info!(interval_secs = interval.as_secs(), exchange = %self.exchange, "Trading core started");

        loop {
            match shutdown_rx.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => break,
            }

            let processed = self.run_once().await;
            if processed > 0 {
                info!(processed, "Tick complete");
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown_rx.recv() => break,
            }
        }

        *state.write().await = CoreState::Stopped;
        info!("Trading core stopped");
    }

    /// Run a single tick. Returns the number of (strategy, asset) pairs
    /// processed. Never fails: every error is logged and absorbed, and each
    /// pair runs in its own task so a panic only loses that pair.
    pub async fn run_once(&self) -> usize {
        let strategies = match self.strategies.active_strategies().await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Failed to load active strategies");
                return 0;
            }
        };
        if strategies.is_empty() {
            debug!("No active strategies");
            return 0;
        }

        let mut processed = 0;
        for strategy in &strategies {
            let assets = strategy.watched_assets();
            if assets.is_empty() {
                debug!(strategy_id = strategy.id, "Strategy watches no assets");
                continue;
            }
            for asset in assets {
                let core = self.clone();
                let pair_strategy = strategy.clone();
                let pair_asset = asset.clone();
                let pair = tokio::spawn(async move {
                    core.evaluate_pair(&pair_strategy, &pair_asset).await;
                });
                match pair.await {
                    Ok(()) => processed += 1,
                    Err(e) => error!(
                        strategy_id = strategy.id,
                        asset = %asset,
                        error = %e,
                        "Pair evaluation aborted"
                    ),
                }
            }
        }
        processed
    }

    /// Fetch, evaluate and persist one pair. A failed fetch is evaluated as
    /// an empty series.
    pub async fn evaluate_pair(&self, strategy: &StrategyRecord, asset: &str) -> CoreDecision {
        let timeframe = strategy.timeframe();
        let candles = match self.market.fetch_candles(asset, timeframe, self.candle_limit).await {
            Ok(candles) => candles,
            Err(e) => {
                warn!(strategy_id = strategy.id, asset, timeframe, error = %e, "Candle fetch failed");
                Vec::new()
            }
        };

        let decision = evaluate(strategy, asset, &self.exchange, &candles);
        debug!(
            strategy_id = decision.strategy_id,
            asset,
            signal = %decision.signal,
            confidence = decision.confidence,
            "Decision evaluated"
        );
        self.persist(&decision).await;
        decision
    }

    async fn persist(&self, decision: &CoreDecision) {
        let now = Utc::now();

        if let Err(e) = self.sink.record_decision(&decision.to_decision_log_record(now)).await {
            error!(asset = %decision.asset, error = %e, "Failed to persist decision log");
        }

        if let Some(signal) = decision.to_signal_record(now) {
            match self.sink.record_signal(&signal).await {
                Ok(()) => info!(
                    strategy_id = decision.strategy_id,
                    asset = %decision.asset,
                    signal = %decision.signal,
                    confidence = decision.confidence,
                    "Signal emitted"
                ),
                Err(e) => error!(asset = %decision.asset, error = %e, "Failed to persist signal"),
            }
        }
    }
}
