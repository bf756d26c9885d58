use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Unrecognized timeframe token, malformed indicator shape, bad env value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Empty or too-short candle series, malformed candle rows.
    #[error("Market data unavailable: {0}")]
    DataUnavailable(String),

    /// Network failure, timeout or non-2xx from the market data source.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
