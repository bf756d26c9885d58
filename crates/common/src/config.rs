use std::str::FromStr;

use crate::{Error, Result};

/// All configuration loaded from environment variables at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Scheduler
    pub interval_secs: u64,

    // Market data
    pub market_data_url: String,
    pub candle_limit: u32,
    pub http_timeout_secs: u64,
    pub exchange: String,

    /// When set, active strategies are read from this TOML file instead of
    /// the `strategies` table.
    pub strategy_config_path: Option<String>,
}

impl Config {
    pub const DEFAULT_INTERVAL_SECS: u64 = 60;
    pub const DEFAULT_MARKET_DATA_URL: &'static str = "https://api.binance.com";
    pub const DEFAULT_CANDLE_LIMIT: u32 = 250;
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        Ok(Config {
            database_url: required_env("DATABASE_URL")?,
            interval_secs: parsed_env("CORE_INTERVAL_SECS")?
                .unwrap_or(Self::DEFAULT_INTERVAL_SECS),
            market_data_url: optional_env("MARKET_DATA_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| Self::DEFAULT_MARKET_DATA_URL.to_string()),
            candle_limit: parsed_env("CANDLE_LIMIT")?.unwrap_or(Self::DEFAULT_CANDLE_LIMIT),
            http_timeout_secs: parsed_env("HTTP_TIMEOUT_SECS")?
                .unwrap_or(Self::DEFAULT_HTTP_TIMEOUT_SECS),
            exchange: optional_env("CORE_EXCHANGE").unwrap_or_else(|| "binance".to_string()),
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH"),
        })
    }
}

fn required_env(key: &str) -> Result<String> {
    optional_env(key).ok_or_else(|| {
        Error::Configuration(format!(
            "Required environment variable '{key}' is not set. Check your .env file."
        ))
    })
}

/// Unset and empty variables are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    match optional_env(key) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            Error::Configuration(format!("{key} has an invalid value: '{raw}'"))
        }),
    }
}
