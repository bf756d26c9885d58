use super::ema::ema_series;

/// MACD (Moving Average Convergence/Divergence) at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    /// `macd - signal`
    pub histogram: f64,
}

/// Computes: MACD line = EMA(fast) − EMA(slow), Signal = EMA(macd_line, signal).
///
/// The two EMA series are right-aligned (the longer one loses its prefix)
/// before subtracting.
/// Returns `None` if there are fewer than `slow + signal` prices or any
/// period is zero.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<Macd> {
    let needed = slow.checked_add(signal)?;
    if fast == 0 || slow == 0 || signal == 0 || closes.len() < needed {
        return None;
    }

    let ema_fast = ema_series(closes, fast)?;
    let ema_slow = ema_series(closes, slow)?;

    let len = ema_fast.len().min(ema_slow.len());
    let macd_line: Vec<f64> = ema_fast[ema_fast.len() - len..]
        .iter()
        .zip(&ema_slow[ema_slow.len() - len..])
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema_series(&macd_line, signal)?;

    let macd = *macd_line.last()?;
    let signal = *signal_line.last()?;
    Some(Macd {
        macd,
        signal,
        histogram: macd - signal,
    })
}
