//! Response parsing for the Kraken public market data API.
//!
//! Every Kraken response is an envelope `{"error": [..], "result": {..}}`; a
//! non-empty `error` array means the request failed even with HTTP 200.

use crate::error::ApiError;
use crate::responses::{KrakenResponse, OhlcResult, OhlcRow, TickerResult};
use chrono::{TimeZone, Utc};
use core_types::Candle;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Unwraps the envelope, failing on a non-empty `error` array or a missing
/// `result`.
fn unwrap_result<T>(response: KrakenResponse<T>, pair: &str) -> Result<T, ApiError> {
    if !response.error.is_empty() {
        return Err(ApiError::ApiError(response.error.join(", ")));
    }
    response
        .result
        .ok_or_else(|| ApiError::RateUnavailable(pair.to_string()))
}

/// Picks the entry for `pair`. Kraken sometimes keys the result by an
/// alternative pair name, so when the requested key is absent the first entry
/// is used.
fn take_pair<V>(mut entries: HashMap<String, V>, pair: &str) -> Option<V> {
    match entries.remove(pair) {
        Some(entry) => Some(entry),
        None => entries.into_values().next(),
    }
}

/// Extracts the last trade price (`c[0]`) from a Ticker response.
pub fn parse_ticker(body: &Value, pair: &str) -> Result<Decimal, ApiError> {
    let response = KrakenResponse::<TickerResult>::deserialize(body).map_err(|e| {
        debug!(pair, error = %e, "Unreadable ticker response");
        ApiError::RateUnavailable(pair.to_string())
    })?;
    let ticker = take_pair(unwrap_result(response, pair)?, pair)
        .ok_or_else(|| ApiError::RateUnavailable(pair.to_string()))?;
    match ticker.c.first() {
        Some(price) if *price > Decimal::ZERO => Ok(*price),
        _ => Err(ApiError::RateUnavailable(pair.to_string())),
    }
}

/// Parses OHLC rows `[time, open, high, low, close, vwap, volume, count]`
/// into candles sorted oldest first. Malformed rows are skipped.
pub fn parse_ohlc(body: &Value, pair: &str) -> Result<Vec<Candle>, ApiError> {
    let response = KrakenResponse::<OhlcResult>::deserialize(body)
        .map_err(|e| ApiError::InvalidData(format!("OHLC response for {}: {}", pair, e)))?;
    let rows = take_pair(unwrap_result(response, pair)?.series, pair)
        .ok_or_else(|| ApiError::RateUnavailable(pair.to_string()))?;

    let mut candles: Vec<Candle> = rows.iter().filter_map(parse_ohlc_row).collect();
    if candles.len() != rows.len() {
        debug!(pair, skipped = rows.len() - candles.len(), "Skipped malformed OHLC rows");
    }
    candles.sort_by_key(|c| c.open_time);
    Ok(candles)
}

fn parse_ohlc_row(row: &Value) -> Option<Candle> {
    let OhlcRow(time, open, high, low, close, _vwap, volume, _count) = OhlcRow::deserialize(row).ok()?;
    Some(Candle {
        open_time: Utc.timestamp_opt(time, 0).single()?,
        open,
        high,
        low,
        close,
        volume,
    })
}
