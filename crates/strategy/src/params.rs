use serde_json::{Map, Value};

/// Reads a JSON number or a numeric string. Non-finite results are rejected.
pub fn lenient_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Truthiness used for `enabled` flags; `null` counts as the default (true).
pub fn lenient_bool(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "" | "0" | "false" | "no" | "off"
        ),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First present key among `keys`, in order.
fn first_present<'a>(params: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| params.get(*k))
}

/// Largest accepted period. Far above any candle window, so a capped value
/// still reads as "unavailable".
pub const MAX_PERIOD: usize = 100_000;

/// Integer parameter (truncated). Missing, zero, negative or unparsable
/// values take `default`; larger values are capped at [`MAX_PERIOD`].
pub fn param_usize(params: &Map<String, Value>, keys: &[&str], default: usize) -> usize {
    first_present(params, keys)
        .and_then(lenient_f64)
        .map(f64::trunc)
        .filter(|v| *v >= 1.0)
        .map(|v| v.min(MAX_PERIOD as f64) as usize)
        .unwrap_or(default)
}

/// Float parameter. Missing, zero or unparsable values take `default`.
pub fn param_f64(params: &Map<String, Value>, keys: &[&str], default: f64) -> f64 {
    first_present(params, keys)
        .and_then(lenient_f64)
        .filter(|v| *v != 0.0)
        .unwrap_or(default)
}
