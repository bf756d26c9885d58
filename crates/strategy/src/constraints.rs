use serde_json::Value;

use crate::params::lenient_f64;

/// Thresholds a direction must pass before a signal is emitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryConstraints {
    /// Minimum number of agreeing indicators. Always >= 1.
    pub required_confirmations: usize,
    /// Minimum winning share of total weight, in [0, 1].
    pub min_signal_strength: f64,
}

impl Default for EntryConstraints {
    fn default() -> Self {
        Self {
            required_confirmations: 1,
            min_signal_strength: 0.6,
        }
    }
}

impl EntryConstraints {
    /// Read from a strategy's `entry_rules` object. Missing or unparsable
    /// values keep their defaults; results are clamped into range.
    pub fn from_rules(rules: &Value) -> Self {
        let defaults = Self::default();
        let Some(obj) = rules.as_object() else {
            return defaults;
        };

        let required_confirmations = obj
            .get("required_confirmations")
            .and_then(lenient_f64)
            .map(|v| v.trunc().max(1.0) as usize)
            .unwrap_or(defaults.required_confirmations);

        let min_signal_strength = obj
            .get("min_signal_strength")
            .and_then(lenient_f64)
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(defaults.min_signal_strength);

        Self {
            required_confirmations,
            min_signal_strength,
        }
    }
}
