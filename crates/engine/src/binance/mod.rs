pub mod rest;

pub use rest::{interval_code, parse_klines, BinanceMarketData};
