use async_trait::async_trait;

use crate::{DecisionLogRecord, Result, SignalRecord, StrategyRecord};

/// Read access to the strategies owned by the admin layer.
#[async_trait]
pub trait StrategyStore: Send + Sync {
    /// All strategies currently marked active.
    async fn active_strategies(&self) -> Result<Vec<StrategyRecord>>;
}

/// Append-only destination for decision logs and actionable signals.
///
/// Writes are independent of each other; there is no cross-record transaction.
#[async_trait]
pub trait DecisionSink: Send + Sync {
    async fn record_decision(&self, record: &DecisionLogRecord) -> Result<()>;

    async fn record_signal(&self, record: &SignalRecord) -> Result<()>;
}
