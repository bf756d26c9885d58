use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Timeframe;

/// Final direction of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum SignalType {
    Long,
    Short,
    Hold,
}

impl SignalType {
    /// True for LONG and SHORT.
    pub fn is_actionable(self) -> bool {
        !matches!(self, SignalType::Hold)
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalType::Long => write!(f, "LONG"),
            SignalType::Short => write!(f, "SHORT"),
            SignalType::Hold => write!(f, "HOLD"),
        }
    }
}

/// Which side a single indicator check argues for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bias {
    Long,
    Short,
    Neutral,
}

impl std::fmt::Display for Bias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bias::Long => write!(f, "LONG"),
            Bias::Short => write!(f, "SHORT"),
            Bias::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Observed indicator output recorded in a check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckValue {
    Number(f64),
    Fields(BTreeMap<String, f64>),
}

impl CheckValue {
    pub fn fields<const N: usize>(pairs: [(&str, f64); N]) -> Self {
        CheckValue::Fields(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

impl std::fmt::Display for CheckValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckValue::Number(v) => write!(f, "{v}"),
            CheckValue::Fields(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Outcome of evaluating one indicator against the candle series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorCheck {
    pub indicator: String,
    /// `None` when the indicator could not be computed or is unsupported.
    pub current_value: Option<CheckValue>,
    pub condition: String,
    pub result: bool,
    pub decision_bias: Bias,
}

impl IndicatorCheck {
    /// A check that never scores: insufficient history, unsupported or malformed.
    pub fn neutral(indicator: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            indicator: indicator.into(),
            current_value: None,
            condition: condition.into(),
            result: false,
            decision_bias: Bias::Neutral,
        }
    }
}

/// Decision for one (strategy, asset) pair on one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreDecision {
    pub asset: String,
    pub strategy_id: i64,
    pub strategy_name: String,
    pub timeframe: String,
    pub exchange: String,
    pub signal: SignalType,
    /// Winning side's share of total weight, in percent. 0 for HOLD.
    pub confidence: f64,
    pub checks: Vec<IndicatorCheck>,
    /// Latest close, absent when no candles were available.
    pub price: Option<f64>,
}

impl CoreDecision {
    /// Human-readable audit narrative stored with the decision log.
    pub fn reasoning(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Strategy: {} (ID: {})", self.strategy_name, self.strategy_id);
        let _ = writeln!(
            out,
            "Asset: {} | Exchange: {} | TF: {}",
            self.asset, self.exchange, self.timeframe
        );
        out.push('\n');

        if self.checks.is_empty() {
            out.push_str("- No active indicator conditions (or no market data).\n");
        }
        for check in &self.checks {
            let value = check
                .current_value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "n/a".to_string());
            let result = if check.result { "TRUE" } else { "FALSE" };
            let _ = writeln!(
                out,
                "- {}: {} -> {} => {} (bias: {})",
                check.indicator, value, check.condition, result, check.decision_bias
            );
        }

        out.push('\n');
        let _ = write!(out, "Final decision: {}", self.signal);
        out
    }

    /// Structured form of the decision stored as `indicators_data`.
    pub fn indicators_data(&self) -> serde_json::Value {
        serde_json::json!({
            "strategy_id": self.strategy_id,
            "strategy_name": self.strategy_name,
            "timeframe": self.timeframe,
            "exchange": self.exchange,
            "price": self.price,
            "checks": self.checks,
            "final_decision": self.signal,
        })
    }

    pub fn to_decision_log_record(&self, created_at: DateTime<Utc>) -> DecisionLogRecord {
        DecisionLogRecord {
            asset: self.asset.clone(),
            signal_type: self.signal,
            reasoning: self.reasoning(),
            confidence: self.confidence,
            indicators_data: self.indicators_data(),
            created_at,
        }
    }

    /// Actionable-signal record. `None` for HOLD decisions.
    pub fn to_signal_record(&self, created_at: DateTime<Utc>) -> Option<SignalRecord> {
        if !self.signal.is_actionable() {
            return None;
        }
        Some(SignalRecord {
            asset: self.asset.clone(),
            signal_type: self.signal,
            price: self.price,
            amount: None,
            timeframe_minutes: self.timeframe.parse::<Timeframe>().ok().map(Timeframe::minutes),
            strategy_id: (self.strategy_id != 0).then_some(self.strategy_id),
            created_at,
        })
    }
}

/// Append-only audit record written for every decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogRecord {
    pub asset: String,
    pub signal_type: SignalType,
    pub reasoning: String,
    pub confidence: f64,
    pub indicators_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Append-only record written only for LONG/SHORT decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub asset: String,
    pub signal_type: SignalType,
    pub price: Option<f64>,
    pub amount: Option<f64>,
    pub timeframe_minutes: Option<i64>,
    pub strategy_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(signal: SignalType, checks: Vec<IndicatorCheck>) -> CoreDecision {
        CoreDecision {
            asset: "BTCUSDT".into(),
            strategy_id: 7,
            strategy_name: "Mean reversion".into(),
            timeframe: "4h".into(),
            exchange: "binance".into(),
            signal,
            confidence: if signal.is_actionable() { 100.0 } else { 0.0 },
            checks,
            price: Some(64_000.5),
        }
    }

    fn rsi_check() -> IndicatorCheck {
        IndicatorCheck {
            indicator: "RSI".into(),
            current_value: Some(CheckValue::Number(25.0)),
            condition: "RSI ≤ 30 (oversold)".into(),
            result: true,
            decision_bias: Bias::Long,
        }
    }

    #[test]
    fn reasoning_lists_every_check_and_the_decision() {
        let d = decision(
            SignalType::Long,
            vec![rsi_check(), IndicatorCheck::neutral("ICHIMOKU", "not supported")],
        );
        let text = d.reasoning();
        assert!(text.starts_with("Strategy: Mean reversion (ID: 7)\n"));
        assert!(text.contains("Asset: BTCUSDT | Exchange: binance | TF: 4h"));
        assert!(text.contains("- RSI: 25 -> RSI ≤ 30 (oversold) => TRUE (bias: LONG)"));
        assert!(text.contains("- ICHIMOKU: n/a -> not supported => FALSE (bias: NEUTRAL)"));
        assert!(text.ends_with("Final decision: LONG"));
    }

    #[test]
    fn reasoning_without_checks_has_placeholder() {
        let text = decision(SignalType::Hold, vec![]).reasoning();
        assert!(text.contains("No active indicator conditions"));
        assert!(text.ends_with("Final decision: HOLD"));
    }

    #[test]
    fn indicators_data_shape() {
        let data = decision(SignalType::Long, vec![rsi_check()]).indicators_data();
        assert_eq!(data["strategy_id"], 7);
        assert_eq!(data["final_decision"], "LONG");
        assert_eq!(data["checks"][0]["decision_bias"], "LONG");
        assert_eq!(data["checks"][0]["current_value"], 25.0);
        assert_eq!(data["price"], 64_000.5);
    }

    #[test]
    fn structured_value_serializes_as_object() {
        let value = CheckValue::fields([("ema_fast", 1.5), ("ema_slow", 1.25)]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["ema_fast"], 1.5);
        assert_eq!(value.to_string(), "{ema_fast: 1.5, ema_slow: 1.25}");
    }

    #[test]
    fn hold_produces_no_signal_record() {
        let d = decision(SignalType::Hold, vec![]);
        assert!(d.to_signal_record(Utc::now()).is_none());
    }

    #[test]
    fn signal_record_carries_minutes_and_strategy() {
        let mut d = decision(SignalType::Short, vec![]);
        let rec = d.to_signal_record(Utc::now()).unwrap();
        assert_eq!(rec.signal_type, SignalType::Short);
        assert_eq!(rec.timeframe_minutes, Some(240));
        assert_eq!(rec.strategy_id, Some(7));
        assert_eq!(rec.amount, None);

        d.strategy_id = 0;
        d.timeframe = "90s".into();
        let rec = d.to_signal_record(Utc::now()).unwrap();
        assert_eq!(rec.strategy_id, None);
        assert_eq!(rec.timeframe_minutes, None);
    }
}
