//! Decision Evaluator: scores one strategy against one asset's candles.
//!
//! Each enabled indicator contributes a strict long or short hit (or nothing).
//! A direction wins only with enough confirmations, no opposing hit at all,
//! and a sufficient share of the total configured weight.

use serde_json::{Map, Value};
use tracing::debug;

use common::{Bias, Candle, CheckValue, CoreDecision, IndicatorCheck, SignalType, StrategyRecord};

use crate::constraints::EntryConstraints;
use crate::indicators::{bollinger, ema_last, macd, rsi};
use crate::normalize::{normalize_indicators, IndicatorEntry, IndicatorKind, IndicatorRequest};
use crate::params::{param_f64, param_usize};

/// Evaluate `strategy` for `asset` over `candles` (oldest first).
///
/// Pure and deterministic: identical inputs give identical decisions.
/// An empty series yields HOLD with no checks.
pub fn evaluate(
    strategy: &StrategyRecord,
    asset: &str,
    exchange: &str,
    candles: &[Candle],
) -> CoreDecision {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let (signal, confidence, checks) = if closes.is_empty() {
        (SignalType::Hold, 0.0, Vec::new())
    } else {
        let entries = normalize_indicators(&strategy.indicators);
        let constraints = EntryConstraints::from_rules(&strategy.entry_rules);
        score(&entries, constraints, &closes)
    };

    CoreDecision {
        asset: asset.to_string(),
        strategy_id: strategy.id,
        strategy_name: strategy.name.clone(),
        timeframe: strategy.timeframe().to_string(),
        exchange: exchange.to_string(),
        signal,
        confidence,
        checks,
        price: closes.last().copied(),
    }
}

/// Runs every enabled entry against `closes` and applies the final rule.
/// `closes` must be non-empty.
pub fn score(
    entries: &[IndicatorEntry],
    constraints: EntryConstraints,
    closes: &[f64],
) -> (SignalType, f64, Vec<IndicatorCheck>) {
    let mut tally = Tally::default();
    let mut checks = Vec::with_capacity(entries.len());

    for entry in entries {
        match entry {
            IndicatorEntry::Malformed { label, detail } => {
                checks.push(IndicatorCheck::neutral(
                    label.clone(),
                    format!("Unrecognized indicator configuration: {detail} (skipped)"),
                ));
            }
            IndicatorEntry::Request(request) if request.enabled => {
                tally.total_weight += request.weight;
                checks.push(check_request(request, closes, &mut tally));
            }
            IndicatorEntry::Request(_) => {}
        }
    }

    let (signal, confidence) = tally.decide(constraints);
    (signal, confidence, checks)
}

fn check_request(request: &IndicatorRequest, closes: &[f64], tally: &mut Tally) -> IndicatorCheck {
    let Some(kind) = request.kind() else {
        debug!(indicator = %request.name, "Indicator not supported, skipping");
        return IndicatorCheck::neutral(
            request.name.clone(),
            "Indicator not supported by the core (skipped)",
        );
    };

    let reading = match kind {
        IndicatorKind::Rsi => rsi_reading(&request.parameters, closes),
        IndicatorKind::Ema => ema_reading(&request.parameters, closes),
        IndicatorKind::Macd => macd_reading(&request.parameters, closes),
        IndicatorKind::Bollinger => bollinger_reading(&request.parameters, closes),
    };

    match reading {
        Reading::Unavailable { condition } => IndicatorCheck::neutral(kind.label(), condition),
        Reading::Value {
            value,
            long,
            short,
            condition,
        } => {
            if long {
                tally.long_hits += 1;
                tally.long_weight += request.weight;
            }
            if short {
                tally.short_hits += 1;
                tally.short_weight += request.weight;
            }
            let decision_bias = if long {
                Bias::Long
            } else if short {
                Bias::Short
            } else {
                Bias::Neutral
            };
            IndicatorCheck {
                indicator: kind.label().to_string(),
                current_value: Some(value),
                condition,
                result: long || short,
                decision_bias,
            }
        }
    }
}

// ─── Scoring ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Tally {
    long_hits: usize,
    short_hits: usize,
    long_weight: f64,
    short_weight: f64,
    /// Sum of the weights of all enabled indicators.
    total_weight: f64,
}

impl Tally {
    /// Any opposing hit vetoes a direction, whatever the weights.
    fn decide(&self, constraints: EntryConstraints) -> (SignalType, f64) {
        let total = if self.total_weight > 0.0 {
            self.total_weight
        } else {
            (self.long_weight + self.short_weight).max(1.0)
        };
        let long_strength = self.long_weight / total;
        let short_strength = self.short_weight / total;
        let required = constraints.required_confirmations;

        if self.long_hits >= required
            && self.short_hits == 0
            && long_strength >= constraints.min_signal_strength
        {
            (SignalType::Long, round_to(long_strength * 100.0, 2))
        } else if self.short_hits >= required
            && self.long_hits == 0
            && short_strength >= constraints.min_signal_strength
        {
            (SignalType::Short, round_to(short_strength * 100.0, 2))
        } else {
            (SignalType::Hold, 0.0)
        }
    }
}

// ─── Indicator readings ───────────────────────────────────────────────────────

enum Reading {
    Unavailable {
        condition: String,
    },
    Value {
        value: CheckValue,
        long: bool,
        short: bool,
        condition: String,
    },
}

fn rsi_reading(params: &Map<String, Value>, closes: &[f64]) -> Reading {
    let period = param_usize(params, &["period"], 14);
    let oversold = param_f64(params, &["oversold"], 30.0);
    let overbought = param_f64(params, &["overbought"], 70.0);

    let Some(value) = rsi(closes, period) else {
        return Reading::Unavailable {
            condition: format!("RSI(period={period}) available"),
        };
    };

    let long = value <= oversold;
    let short = value >= overbought;
    let condition = if long {
        format!("RSI ≤ {oversold} (oversold)")
    } else if short {
        format!("RSI ≥ {overbought} (overbought)")
    } else {
        format!("RSI ≤ {oversold} or RSI ≥ {overbought}")
    };

    Reading::Value {
        value: CheckValue::Number(round_to(value, 2)),
        long,
        short,
        condition,
    }
}

fn ema_reading(params: &Map<String, Value>, closes: &[f64]) -> Reading {
    let fast = param_usize(params, &["fast_period", "fast"], 12);
    let slow = param_usize(params, &["slow_period", "slow"], 26);

    let (Some(ema_fast), Some(ema_slow)) = (ema_last(closes, fast), ema_last(closes, slow)) else {
        return Reading::Unavailable {
            condition: format!("EMA({fast})/EMA({slow}) available"),
        };
    };

    let long = ema_fast > ema_slow;
    let short = ema_fast < ema_slow;
    let condition = if long {
        format!("EMA({fast}) > EMA({slow})")
    } else if short {
        format!("EMA({fast}) < EMA({slow})")
    } else {
        format!("EMA({fast}) ≠ EMA({slow})")
    };

    Reading::Value {
        value: CheckValue::fields([
            ("ema_fast", round_to(ema_fast, 6)),
            ("ema_slow", round_to(ema_slow, 6)),
        ]),
        long,
        short,
        condition,
    }
}

fn macd_reading(params: &Map<String, Value>, closes: &[f64]) -> Reading {
    let fast = param_usize(params, &["fast"], 12);
    let slow = param_usize(params, &["slow"], 26);
    let signal = param_usize(params, &["signal"], 9);

    let Some(m) = macd(closes, fast, slow, signal) else {
        return Reading::Unavailable {
            condition: format!("MACD({fast},{slow},{signal}) available"),
        };
    };

    let long = m.macd > m.signal;
    let short = m.macd < m.signal;
    let condition = if long {
        "MACD > Signal"
    } else if short {
        "MACD < Signal"
    } else {
        "MACD ≈ Signal"
    };

    Reading::Value {
        value: CheckValue::fields([
            ("macd", round_to(m.macd, 6)),
            ("signal", round_to(m.signal, 6)),
            ("hist", round_to(m.histogram, 6)),
        ]),
        long,
        short,
        condition: condition.to_string(),
    }
}

fn bollinger_reading(params: &Map<String, Value>, closes: &[f64]) -> Reading {
    let period = param_usize(params, &["period"], 20);
    let mult = param_f64(params, &["std_dev", "std"], 2.0);

    let (Some(bands), Some(&close)) = (bollinger(closes, period, mult), closes.last()) else {
        return Reading::Unavailable {
            condition: format!("BB(period={period}) available"),
        };
    };

    let long = close <= bands.lower;
    let short = close >= bands.upper;
    let condition = if long {
        "Price ≤ lower BB band"
    } else if short {
        "Price ≥ upper BB band"
    } else {
        "Price inside BB bands"
    };

    Reading::Value {
        value: CheckValue::fields([
            ("close", round_to(close, 6)),
            ("lower", round_to(bands.lower, 6)),
            ("mid", round_to(bands.mid, 6)),
            ("upper", round_to(bands.upper, 6)),
        ]),
        long,
        short,
        condition: condition.to_string(),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
