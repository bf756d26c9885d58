use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{Error, Result, StrategyRecord, StrategyStore};

/// Strategy definitions kept in a TOML file instead of the database.
///
/// Example `config/strategies.toml`:
/// ```toml
/// [[strategy]]
/// id = 1
/// name = "BTC RSI 14"
/// timeframe = "1h"
/// assets_to_monitor = ["BTCUSDT", "ETHUSDT"]
///
/// [strategy.indicators.rsi]
/// period = 14
/// overbought = 70.0
/// oversold = 30.0
///
/// [strategy.entry_rules]
/// required_confirmations = 1
/// min_signal_strength = 0.6
/// ```
/// Indicators may also be given in list form:
/// `indicators = { list = [{ name = "EMA", parameters = { fast = 9, slow = 21 }, weight = 2.0 }] }`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(rename = "strategy", default)]
    pub strategies: Vec<StrategyRecord>,
}

impl StrategyFileConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("invalid strategy file: {e}")))
    }

    pub fn active(self) -> Vec<StrategyRecord> {
        self.strategies.into_iter().filter(|s| s.is_active).collect()
    }
}

/// `StrategyStore` backed by a TOML file. The file is re-read on every call,
/// so edits take effect on the next tick.
pub struct FileStrategyStore {
    path: PathBuf,
}

impl FileStrategyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StrategyStore for FileStrategyStore {
    async fn active_strategies(&self) -> Result<Vec<StrategyRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::Configuration(format!(
                "failed to read strategy config at '{}': {e}",
                self.path.display()
            ))
        })?;
        let strategies = StrategyFileConfig::from_toml_str(&content)?.active();
        debug!(path = %self.path.display(), count = strategies.len(), "Loaded strategies from file");
        Ok(strategies)
    }
}
