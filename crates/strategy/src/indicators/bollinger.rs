use super::average::{sma, stddev};

/// Bollinger Bands at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bollinger {
    pub lower: f64,
    pub mid: f64,
    pub upper: f64,
}

/// Middle band SMA(period); outer bands at `mult` standard deviations.
/// Returns `None` when the SMA or standard deviation is unavailable.
pub fn bollinger(closes: &[f64], period: usize, mult: f64) -> Option<Bollinger> {
    let mid = sma(closes, period)?;
    let sd = stddev(closes, period)?;
    Some(Bollinger {
        lower: mid - mult * sd,
        mid,
        upper: mid + mult * sd,
    })
}
