pub mod config;
pub mod decision;
pub mod error;
pub mod market;
pub mod store;
pub mod types;

pub use config::Config;
pub use decision::*;
pub use error::{Error, Result};
pub use market::MarketDataProvider;
pub use store::{DecisionSink, StrategyStore};
pub use types::*;
