use serde_json::{Map, Value};
use tracing::debug;

use crate::params::{lenient_bool, lenient_f64};

/// Indicators the evaluator knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    Rsi,
    /// EMA(fast) vs EMA(slow) crossover.
    Ema,
    Macd,
    Bollinger,
}

impl IndicatorKind {
    /// Matches the accepted aliases, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "RSI" | "R_S_I" => Some(IndicatorKind::Rsi),
            "EMA" | "E_M_A" => Some(IndicatorKind::Ema),
            "MACD" => Some(IndicatorKind::Macd),
            "BOLLINGER BANDS" | "BOLLINGER" | "BB" => Some(IndicatorKind::Bollinger),
            _ => None,
        }
    }

    /// Name used in checks and reasoning.
    pub fn label(self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Bollinger => "Bollinger Bands",
        }
    }
}

/// One canonical indicator request derived from a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRequest {
    pub name: String,
    pub enabled: bool,
    pub parameters: Map<String, Value>,
    /// Always >= 0.
    pub weight: f64,
}

impl IndicatorRequest {
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    /// `None` for names the evaluator does not support.
    pub fn kind(&self) -> Option<IndicatorKind> {
        IndicatorKind::from_name(&self.name)
    }
}

/// Result of normalizing one configuration entry.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorEntry {
    Request(IndicatorRequest),
    /// The entry could not be parsed. It is reported, never scored.
    Malformed { label: String, detail: String },
}

/// The two stored shapes of a strategy's indicator configuration, plus an
/// explicit variant for anything else.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorConfig {
    /// `[{name, enabled, parameters, weight}, ...]` or `{"list": [...]}`.
    List(Vec<Value>),
    /// `{"rsi": {...params}, "ema": {...}}`.
    Keyed(Map<String, Value>),
    Unrecognized(Value),
}

impl IndicatorConfig {
    pub fn parse(raw: &Value) -> Self {
        match raw {
            Value::Null => IndicatorConfig::List(Vec::new()),
            Value::Array(items) => IndicatorConfig::List(items.clone()),
            Value::Object(map) => match map.get("list") {
                Some(Value::Array(items)) => IndicatorConfig::List(items.clone()),
                _ => IndicatorConfig::Keyed(map.clone()),
            },
            other => IndicatorConfig::Unrecognized(other.clone()),
        }
    }

    /// Canonical entry list, in configuration order.
    pub fn normalize(&self) -> Vec<IndicatorEntry> {
        match self {
            IndicatorConfig::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| list_entry(i, item))
                .collect(),
            IndicatorConfig::Keyed(map) => map
                .iter()
                .map(|(key, params)| keyed_entry(key, params))
                .collect(),
            IndicatorConfig::Unrecognized(value) => {
                debug!(kind = json_kind(value), "Unrecognized indicator configuration");
                vec![IndicatorEntry::Malformed {
                    label: "indicators".to_string(),
                    detail: format!("expected a list or an object, got {}", json_kind(value)),
                }]
            }
        }
    }
}

/// Shorthand for `IndicatorConfig::parse(raw).normalize()`.
pub fn normalize_indicators(raw: &Value) -> Vec<IndicatorEntry> {
    IndicatorConfig::parse(raw).normalize()
}

fn list_entry(index: usize, item: &Value) -> IndicatorEntry {
    let label = format!("indicators[{index}]");
    let Some(obj) = item.as_object() else {
        return IndicatorEntry::Malformed {
            label,
            detail: format!("expected an object, got {}", json_kind(item)),
        };
    };

    let name = match obj.get("name").and_then(Value::as_str).map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return IndicatorEntry::Malformed {
                label,
                detail: "missing indicator name".to_string(),
            }
        }
    };

    let parameters = match parameters(obj.get("parameters")) {
        Ok(p) => p,
        Err(detail) => return IndicatorEntry::Malformed { label: name, detail },
    };

    let weight = match obj.get("weight") {
        None | Some(Value::Null) => IndicatorRequest::DEFAULT_WEIGHT,
        Some(raw) => match lenient_f64(raw) {
            Some(w) => w.max(0.0),
            None => {
                return IndicatorEntry::Malformed {
                    label: name,
                    detail: format!("weight is not a number: {raw}"),
                }
            }
        },
    };

    IndicatorEntry::Request(IndicatorRequest {
        name,
        enabled: obj.get("enabled").map(lenient_bool).unwrap_or(true),
        parameters,
        weight,
    })
}

fn keyed_entry(key: &str, params: &Value) -> IndicatorEntry {
    let name = key.trim().to_uppercase();
    if name.is_empty() {
        return IndicatorEntry::Malformed {
            label: "indicators".to_string(),
            detail: "blank indicator name".to_string(),
        };
    }
    match parameters(Some(params)) {
        Ok(parameters) => IndicatorEntry::Request(IndicatorRequest {
            name,
            enabled: true,
            parameters,
            weight: IndicatorRequest::DEFAULT_WEIGHT,
        }),
        Err(detail) => IndicatorEntry::Malformed { label: name, detail },
    }
}

fn parameters(raw: Option<&Value>) -> Result<Map<String, Value>, String> {
    match raw {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(format!("parameters must be an object, got {}", json_kind(other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(entry: &IndicatorEntry) -> &IndicatorRequest {
        match entry {
            IndicatorEntry::Request(r) => r,
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[test]
    fn list_shape_wrapped_in_object() {
        let raw = json!({"list": [
            {"name": "RSI", "enabled": true, "parameters": {"period": 14}, "weight": 2.0},
            {"name": "MACD", "enabled": false},
        ]});
        let entries = normalize_indicators(&raw);
        assert_eq!(entries.len(), 2);
        let rsi = request(&entries[0]);
        assert_eq!(rsi.kind(), Some(IndicatorKind::Rsi));
        assert_eq!(rsi.weight, 2.0);
        assert_eq!(rsi.parameters["period"], 14);
        let macd = request(&entries[1]);
        assert!(!macd.enabled);
        assert_eq!(macd.weight, 1.0);
        assert!(macd.parameters.is_empty());
    }

    #[test]
    fn bare_list_shape() {
        let raw = json!([{"name": "bb", "weight": "0.5"}]);
        let entries = normalize_indicators(&raw);
        let bb = request(&entries[0]);
        assert_eq!(bb.kind(), Some(IndicatorKind::Bollinger));
        assert_eq!(bb.weight, 0.5);
        assert!(bb.enabled);
    }

    #[test]
    fn keyed_shape_uppercases_and_defaults() {
        let raw = json!({"rsi": {"period": 7}, " ema ": {"fast": 5, "slow": 20}, "vwap": null});
        let entries = normalize_indicators(&raw);
        assert_eq!(entries.len(), 3);
        let names: Vec<&str> = entries.iter().map(|e| request(e).name.as_str()).collect();
        assert!(names.contains(&"RSI"));
        assert!(names.contains(&"EMA"));
        assert!(names.contains(&"VWAP"));
        for e in &entries {
            let r = request(e);
            assert!(r.enabled);
            assert_eq!(r.weight, 1.0);
        }
        let vwap = entries.iter().map(request).find(|r| r.name == "VWAP").unwrap();
        assert_eq!(vwap.kind(), None);
    }

    #[test]
    fn list_key_that_is_not_a_list_is_a_keyed_indicator() {
        let entries = normalize_indicators(&json!({"list": {"period": 3}}));
        assert_eq!(request(&entries[0]).name, "LIST");
    }

    #[test]
    fn null_means_no_indicators() {
        assert!(normalize_indicators(&Value::Null).is_empty());
        assert!(normalize_indicators(&json!({})).is_empty());
    }

    #[test]
    fn malformed_entries_are_reported_not_dropped() {
        let raw = json!([
            "RSI",
            {"parameters": {}},
            {"name": "EMA", "parameters": [1, 2]},
            {"name": "MACD", "weight": "heavy"},
        ]);
        let entries = normalize_indicators(&raw);
        assert_eq!(entries.len(), 4);
        assert!(entries
            .iter()
            .all(|e| matches!(e, IndicatorEntry::Malformed { .. })));
        match &entries[2] {
            IndicatorEntry::Malformed { label, detail } => {
                assert_eq!(label, "EMA");
                assert!(detail.contains("parameters"));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn keyed_with_scalar_params_is_malformed() {
        let entries = normalize_indicators(&json!({"rsi": 14}));
        assert!(matches!(&entries[0], IndicatorEntry::Malformed { label, .. } if label == "RSI"));
    }

    #[test]
    fn unrecognized_shape_yields_single_malformed_entry() {
        let entries = normalize_indicators(&json!("rsi,ema"));
        assert_eq!(entries.len(), 1);
        assert!(matches!(&entries[0], IndicatorEntry::Malformed { label, .. } if label == "indicators"));
    }

    #[test]
    fn negative_weight_clamped() {
        let entries = normalize_indicators(&json!([{"name": "RSI", "weight": -2}]));
        assert_eq!(request(&entries[0]).weight, 0.0);
    }

    #[test]
    fn aliases() {
        for name in ["rsi", "R_S_I", "Ema", "E_M_A", "macd", "Bollinger Bands", "bollinger", "BB"] {
            assert!(IndicatorKind::from_name(name).is_some(), "{name}");
        }
        assert!(IndicatorKind::from_name("SMA").is_none());
    }
}
