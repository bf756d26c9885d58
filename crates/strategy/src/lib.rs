pub mod config;
pub mod constraints;
pub mod evaluator;
pub mod indicators;
pub mod normalize;
pub mod params;

pub use config::{FileStrategyStore, StrategyFileConfig};
pub use constraints::EntryConstraints;
pub use evaluator::evaluate;
pub use normalize::{
    normalize_indicators, IndicatorConfig, IndicatorEntry, IndicatorKind, IndicatorRequest,
};
