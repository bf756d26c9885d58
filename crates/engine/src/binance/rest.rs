use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use common::{Candle, Error, MarketDataProvider, Result, Timeframe};

/// Binance caps a single klines request at 1000 rows.
const MAX_LIMIT: u32 = 1000;

/// Public (unauthenticated) Binance REST client for candle data.
pub struct BinanceMarketData {
    base_url: String,
    http: Client,
}

impl BinanceMarketData {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn klines_url(&self, symbol: &str, interval: &str, limit: u32) -> String {
        format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            symbol.trim().to_uppercase(),
            interval,
            limit.clamp(1, MAX_LIMIT)
        )
    }
}

/// Binance interval code for a timeframe.
pub fn interval_code(timeframe: Timeframe) -> &'static str {
    // Binance uses the same tokens for every supported bucket.
    timeframe.as_str()
}

#[async_trait]
impl MarketDataProvider for BinanceMarketData {
    async fn fetch_candles(&self, symbol: &str, timeframe: &str, limit: u32) -> Result<Vec<Candle>> {
        let timeframe: Timeframe = timeframe.parse()?;
        let url = self.klines_url(symbol, interval_code(timeframe), limit);

        debug!(symbol = %symbol, interval = interval_code(timeframe), limit, "Fetching klines");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Transport(e.to_string()))?;

        if !status.is_success() {
            let snippet: String = body.chars().take(200).collect();
            return Err(Error::Transport(format!("HTTP {status} for {symbol}: {snippet}")));
        }
        parse_klines(&body)
    }
}

// ─── Kline JSON parsing ──────────────────────────────────────────────────────

/// Parse a klines payload: an array of
/// `[openTime, open, high, low, close, volume, closeTime, ...]` rows where
/// prices are decimal strings. Extra trailing columns are ignored.
pub fn parse_klines(body: &str) -> Result<Vec<Candle>> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)
        .map_err(|e| Error::DataUnavailable(format!("malformed klines payload: {e}")))?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| parse_row(row).map_err(|msg| Error::DataUnavailable(format!("kline {i}: {msg}"))))
        .collect()
}

fn parse_row(row: &[Value]) -> Result<Candle, String> {
    if row.len() < 7 {
        return Err(format!("expected at least 7 columns, got {}", row.len()));
    }
    Ok(Candle {
        open_time: int_field(&row[0], "open time")?,
        open: price_field(&row[1], "open")?,
        high: price_field(&row[2], "high")?,
        low: price_field(&row[3], "low")?,
        close: price_field(&row[4], "close")?,
        volume: price_field(&row[5], "volume")?,
        close_time: int_field(&row[6], "close time")?,
    })
}

fn int_field(value: &Value, field: &str) -> Result<i64, String> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| format!("invalid {field}: {value}"))
}

fn price_field(value: &Value, field: &str) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
    .ok_or_else(|| format!("invalid {field}: {value}"))
}
