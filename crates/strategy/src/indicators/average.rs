/// Simple moving average of the last `period` values.
/// Returns `None` if `period` is zero or there are fewer than `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Population standard deviation of the last `period` values: the divisor
/// is `period`, not `period - 1`, so the bands match the stored strategies'
/// historical Bollinger readings. Available exactly when `sma` is.
pub fn stddev(values: &[f64], period: usize) -> Option<f64> {
    let mean = sma(values, period)?;
    let window = &values[values.len() - period..];
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_uses_trailing_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((sma(&values, 2).unwrap() - 4.5).abs() < 1e-12);
        assert!((sma(&values, 5).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn sma_unavailable_when_short_or_zero_period() {
        assert!(sma(&[1.0, 2.0], 3).is_none());
        assert!(sma(&[1.0, 2.0], 0).is_none());
        assert!(sma(&[], 1).is_none());
    }

    #[test]
    fn stddev_known_value() {
        // mean 5, squared deviations sum 32 over 8 values -> variance 4
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((stddev(&values, 8).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn stddev_of_flat_series_is_zero() {
        let values = [3.0; 10];
        assert_eq!(stddev(&values, 5), Some(0.0));
        assert!(stddev(&values, 11).is_none());
    }
}
