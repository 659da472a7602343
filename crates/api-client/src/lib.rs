use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{AssetSymbol, Candle};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;

pub mod error;
pub mod fiat_rates;
pub mod kraken;
pub mod market;
pub mod responses;
#[cfg(any(test, feature = "stub"))]
pub mod stub;
pub mod transport;

// --- Public API ---
pub use market::MarketDataClient;
pub use transport::ReqwestTransport;

/// Candle interval, in minutes, used for the 24-hour reference price.
pub const REFERENCE_INTERVAL_MINUTES: u32 = 5;

/// The raw HTTP seam every remote source goes through.
///
/// Balance handlers, the market data client and the logo cache only ever see
/// decoded JSON or bytes, which lets the whole pipeline run against an
/// in-memory implementation in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GETs `url` and decodes the body as JSON.
    async fn get_json(&self, url: &str) -> Result<Value, ApiError>;

    /// POSTs `body` as JSON to `url` and decodes the response as JSON.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ApiError>;

    /// GETs `url` and returns the raw body.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}

/// Market prices for crypto assets and fiat/fiat cross rates.
#[async_trait]
pub trait ExchangeRateSource: Send + Sync {
    /// The most recent traded price of `asset` in `fiat`.
    ///
    /// Returns `ApiError::RateUnavailable` when the venue has no usable price,
    /// never a made-up zero.
    async fn spot_price(&self, asset: AssetSymbol, fiat: &str) -> Result<Decimal, ApiError>;

    /// OHLC candles for the pair starting at `since`, oldest first.
    async fn candles_since(
        &self,
        asset: AssetSymbol,
        fiat: &str,
        interval_minutes: u32,
        since: DateTime<Utc>,
    ) -> Result<Vec<Candle>, ApiError>;

    /// Rates of every known fiat currency relative to `base` (the source's
    /// default base when `None`). The base itself is always present with rate 1.
    async fn fiat_cross_rates(&self, base: Option<&str>) -> Result<HashMap<String, Decimal>, ApiError>;

    /// The closing price of the oldest candle opening at or after `at`.
    async fn reference_price(
        &self,
        asset: AssetSymbol,
        fiat: &str,
        at: DateTime<Utc>,
    ) -> Result<Decimal, ApiError> {
        let candles = self
            .candles_since(asset, fiat, REFERENCE_INTERVAL_MINUTES, at)
            .await?;
        candles
            .iter()
            .filter(|c| c.open_time >= at)
            .min_by_key(|c| c.open_time)
            .map(|c| c.close)
            .ok_or_else(|| ApiError::RateUnavailable(asset.market_pair(fiat)))
    }
}
