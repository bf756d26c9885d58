use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use common::{
    DecisionLogRecord, DecisionSink, Error, Result, SignalRecord, SignalType, StrategyRecord,
    StrategyStore,
};

/// Number of decision logs listed when no limit is given.
pub const DEFAULT_LOG_LIMIT: u32 = 20;

/// SQLite-backed strategy store and decision/signal sink.
#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Open (creating if needed) the database at `url` and apply migrations.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        sqlx::migrate!("../../migrations")
            .run(&db)
            .await
            .map_err(sqlx::Error::from)?;
        info!("Database connected and migrations applied");
        Ok(Self { db })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Most recent decision logs, newest first.
    pub async fn recent_decision_logs(&self, limit: u32) -> Result<Vec<DecisionLogRecord>> {
        let rows: Vec<DecisionLogRow> = sqlx::query_as(
            r#"
            SELECT asset, signal_type, reasoning, confidence, indicators_data, created_at
            FROM decision_logs
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(DecisionLogRow::into_record).collect()
    }
}

#[derive(sqlx::FromRow)]
struct StrategyRow {
    id: i64,
    name: String,
    timeframe: String,
    is_active: bool,
    assets_to_monitor: String,
    indicators: String,
    entry_rules: String,
}

impl StrategyRow {
    /// Malformed JSON columns never drop the strategy: unreadable indicators
    /// are passed on as a raw string (reported as unrecognized by the
    /// evaluator), unreadable assets become an empty watch list.
    fn into_record(self) -> StrategyRecord {
        let assets_to_monitor = serde_json::from_str(&self.assets_to_monitor).unwrap_or_else(|e| {
            warn!(strategy_id = self.id, error = %e, "Malformed assets_to_monitor");
            Vec::new()
        });
        let indicators = serde_json::from_str(&self.indicators).unwrap_or_else(|e| {
            warn!(strategy_id = self.id, error = %e, "Malformed indicators");
            Value::String(self.indicators.clone())
        });
        let entry_rules = serde_json::from_str(&self.entry_rules).unwrap_or_else(|e| {
            warn!(strategy_id = self.id, error = %e, "Malformed entry_rules");
            Value::Null
        });

        StrategyRecord {
            id: self.id,
            name: self.name,
            timeframe: self.timeframe,
            is_active: self.is_active,
            assets_to_monitor,
            indicators,
            entry_rules,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DecisionLogRow {
    asset: String,
    signal_type: SignalType,
    reasoning: String,
    confidence: f64,
    indicators_data: String,
    created_at: String,
}

impl DecisionLogRow {
    fn into_record(self) -> Result<DecisionLogRecord> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| Error::DataUnavailable(format!("bad created_at '{}': {e}", self.created_at)))?
            .with_timezone(&Utc);
        Ok(DecisionLogRecord {
            asset: self.asset,
            signal_type: self.signal_type,
            reasoning: self.reasoning,
            confidence: self.confidence,
            indicators_data: serde_json::from_str(&self.indicators_data)?,
            created_at,
        })
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl StrategyStore for SqliteStore {
    async fn active_strategies(&self) -> Result<Vec<StrategyRecord>> {
        let rows: Vec<StrategyRow> = sqlx::query_as(
            r#"
            SELECT id, name, timeframe, is_active, assets_to_monitor, indicators, entry_rules
            FROM strategies
            WHERE is_active = 1
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(StrategyRow::into_record).collect())
    }
}

#[async_trait]
impl DecisionSink for SqliteStore {
    async fn record_decision(&self, record: &DecisionLogRecord) -> Result<()> {
        let indicators_data = serde_json::to_string(&record.indicators_data)?;

        sqlx::query(
            r#"
            INSERT INTO decision_logs
                (id, asset, signal_type, reasoning, confidence, indicators_data, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&record.asset)
        .bind(record.signal_type)
        .bind(&record.reasoning)
        .bind(record.confidence)
        .bind(indicators_data)
        .bind(timestamp(&record.created_at))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn record_signal(&self, record: &SignalRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO signals
                (id, asset, signal_type, price, amount, timeframe_minutes, strategy_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&record.asset)
        .bind(record.signal_type)
        .bind(record.price)
        .bind(record.amount)
        .bind(record.timeframe_minutes)
        .bind(record.strategy_id)
        .bind(timestamp(&record.created_at))
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
