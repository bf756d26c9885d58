/// RSI (Relative Strength Index).
///
/// Uses Wilder's smoothed moving average (same as TradingView / standard RSI):
/// the first average gain/loss is the simple mean of the first `period`
/// deltas, then `avg = (avg * (period - 1) + delta) / period`.
/// Returns `None` if `period` is zero or there are fewer than `period + 1` values.
/// A window with no losses yields exactly 100.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    let needed = period.checked_add(1)?;
    if period == 0 || closes.len() < needed {
        return None;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let initial = &changes[..period];

    let mut avg_gain = initial.iter().filter(|&&c| c > 0.0).sum::<f64>() / period as f64;
    let mut avg_loss =
        initial.iter().filter(|&&c| c < 0.0).map(|c| c.abs()).sum::<f64>() / period as f64;

    // Wilder smoothing over remaining changes
    for &change in &changes[period..] {
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
}
