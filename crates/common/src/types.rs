use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// One OHLCV bar as returned by the market data source.
/// Sequences are ascending by `open_time`; the provider guarantees the order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Milliseconds since the Unix epoch.
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64,
}

/// Candle bucket length supported by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "3m")]
    M3,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "8h")]
    H8,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "3d")]
    D3,
    #[serde(rename = "1w")]
    W1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 14] = [
        Timeframe::M1,
        Timeframe::M3,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H2,
        Timeframe::H4,
        Timeframe::H6,
        Timeframe::H8,
        Timeframe::H12,
        Timeframe::D1,
        Timeframe::D3,
        Timeframe::W1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M3 => "3m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H2 => "2h",
            Timeframe::H4 => "4h",
            Timeframe::H6 => "6h",
            Timeframe::H8 => "8h",
            Timeframe::H12 => "12h",
            Timeframe::D1 => "1d",
            Timeframe::D3 => "3d",
            Timeframe::W1 => "1w",
        }
    }

    /// Bucket length in minutes.
    pub fn minutes(self) -> i64 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M3 => 3,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
            Timeframe::H2 => 2 * 60,
            Timeframe::H4 => 4 * 60,
            Timeframe::H6 => 6 * 60,
            Timeframe::H8 => 8 * 60,
            Timeframe::H12 => 12 * 60,
            Timeframe::D1 => 24 * 60,
            Timeframe::D3 => 3 * 24 * 60,
            Timeframe::W1 => 7 * 24 * 60,
        }
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == token)
            .ok_or_else(|| Error::Configuration(format!("unrecognized timeframe '{s}'")))
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A strategy as stored by the admin layer. The core only reads it.
///
/// `indicators` and `entry_rules` are kept as raw JSON: the indicator
/// configuration comes in two shapes and is normalized by the strategy crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub assets_to_monitor: Vec<String>,
    #[serde(default)]
    pub indicators: serde_json::Value,
    #[serde(default)]
    pub entry_rules: serde_json::Value,
}

impl StrategyRecord {
    pub const DEFAULT_TIMEFRAME: &'static str = "1h";

    /// Watched assets, trimmed and upper-cased. Blank entries are skipped.
    pub fn watched_assets(&self) -> Vec<String> {
        self.assets_to_monitor
            .iter()
            .map(|a| a.trim().to_uppercase())
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// The configured timeframe, or the default when blank.
    pub fn timeframe(&self) -> &str {
        let tf = self.timeframe.trim();
        if tf.is_empty() {
            Self::DEFAULT_TIMEFRAME
        } else {
            tf
        }
    }
}

fn default_name() -> String {
    "Unnamed".to_string()
}

fn default_timeframe() -> String {
    StrategyRecord::DEFAULT_TIMEFRAME.to_string()
}

fn default_active() -> bool {
    true
}

/// Lifecycle state of the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoreState {
    #[default]
    Stopped,
    Running,
}

impl std::fmt::Display for CoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreState::Stopped => write!(f, "stopped"),
            CoreState::Running => write!(f, "running"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_parses_case_insensitively() {
        assert_eq!(" 4H ".parse::<Timeframe>().unwrap(), Timeframe::H4);
        assert_eq!("1w".parse::<Timeframe>().unwrap(), Timeframe::W1);
    }

    #[test]
    fn unknown_timeframe_is_configuration_error() {
        let err = "2w".parse::<Timeframe>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn timeframe_minutes() {
        assert_eq!(Timeframe::M15.minutes(), 15);
        assert_eq!(Timeframe::H12.minutes(), 720);
        assert_eq!(Timeframe::D3.minutes(), 4320);
        assert_eq!(Timeframe::W1.minutes(), 10080);
    }

    #[test]
    fn watched_assets_are_normalized() {
        let strategy = StrategyRecord {
            id: 1,
            name: "s".into(),
            timeframe: "  ".into(),
            is_active: true,
            assets_to_monitor: vec![" btcusdt".into(), "".into(), "   ".into(), "EthUsdt ".into()],
            indicators: serde_json::Value::Null,
            entry_rules: serde_json::Value::Null,
        };
        assert_eq!(strategy.watched_assets(), vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(strategy.timeframe(), "1h");
    }

    #[test]
    fn strategy_record_defaults() {
        let strategy: StrategyRecord = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert_eq!(strategy.name, "Unnamed");
        assert_eq!(strategy.timeframe, "1h");
        assert!(strategy.is_active);
        assert!(strategy.indicators.is_null());
    }
}
