//! Typed shapes of the market data and fiat rate responses.
//!
//! Only the fields we read are declared; everything else in the bodies is
//! ignored. Prices arrive as JSON strings from Kraken and as numbers from the
//! fiat endpoint, and both decode straight into `Decimal`.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// The `{"error": [..], "result": ..}` envelope around every Kraken response.
#[derive(Debug, Clone, Deserialize)]
pub struct KrakenResponse<T> {
    #[serde(default)]
    pub error: Vec<String>,
    pub result: Option<T>,
}

/// `result` of `/0/public/Ticker`, keyed by pair name.
pub type TickerResult = HashMap<String, TickerInfo>;

#[derive(Debug, Clone, Deserialize)]
pub struct TickerInfo {
    /// Last trade closed, `[price, lot volume]`.
    #[serde(default)]
    pub c: Vec<Decimal>,
}

/// `result` of `/0/public/OHLC`: one series per pair plus the `last` cursor.
///
/// Rows stay undecoded here so a single malformed row can be skipped without
/// losing the series.
#[derive(Debug, Clone, Deserialize)]
pub struct OhlcResult {
    #[serde(default)]
    pub last: Option<i64>,
    #[serde(flatten)]
    pub series: HashMap<String, Vec<Value>>,
}

/// One OHLC row: `[time, open, high, low, close, vwap, volume, count]`.
#[derive(Debug, Clone, Deserialize)]
pub struct OhlcRow(
    pub i64,
    pub Decimal,
    pub Decimal,
    pub Decimal,
    pub Decimal,
    pub Decimal,
    pub Decimal,
    pub u64,
);

/// Body of the fixer-style `/latest` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FiatRatesResponse {
    #[serde(default)]
    pub base: Option<String>,
    pub rates: HashMap<String, Option<Decimal>>,
}
