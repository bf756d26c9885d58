pub mod binance;
pub mod lifecycle;
pub mod persistence;

pub use binance::BinanceMarketData;
pub use lifecycle::{CoreHandle, TradingCore, MIN_INTERVAL_SECS};
pub use persistence::SqliteStore;
