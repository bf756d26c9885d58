/// Exponential moving average series.
///
/// Seeded with the simple average of the first `period` values, then
/// `ema[t] = price * k + ema[t-1] * (1 - k)` with `k = 2 / (period + 1)`.
/// The result has `values.len() - period + 1` points; the first corresponds
/// to `values[period - 1]`.
/// Returns `None` if `period` is zero or there are fewer than `period` values.
pub fn ema_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }
    let k = 2.0 / (period as f64 + 1.0);

    let mut series = Vec::with_capacity(values.len() - period + 1);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    series.push(ema);

    for &price in &values[period..] {
        ema = price * k + ema * (1.0 - k);
        series.push(ema);
    }
    Some(series)
}

/// Latest point of [`ema_series`].
pub fn ema_last(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).and_then(|s| s.last().copied())
}
