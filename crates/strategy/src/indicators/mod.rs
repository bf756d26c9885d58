//! Pure indicator functions over a series of closing prices (oldest first).
//!
//! Every function returns `None` when the series is too short for the
//! requested period. Callers must treat `None` as "unavailable", never as zero.

pub mod average;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use average::{sma, stddev};
pub use bollinger::{bollinger, Bollinger};
pub use ema::{ema_last, ema_series};
pub use macd::{macd, Macd};
pub use rsi::rsi;
