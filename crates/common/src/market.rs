use async_trait::async_trait;

use crate::{Candle, Result};

/// Source of candle series for the trading core.
///
/// `BinanceMarketData` in `crates/engine` implements this against the public
/// REST endpoint. Tests use in-process fakes.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch up to `limit` candles for `symbol`, oldest first.
    ///
    /// An unrecognized `timeframe` token is an `Error::Configuration`;
    /// network and HTTP failures are `Error::Transport`.
    async fn fetch_candles(&self, symbol: &str, timeframe: &str, limit: u32) -> Result<Vec<Candle>>;
}
