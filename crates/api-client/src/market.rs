use crate::error::ApiError;
use crate::{fiat_rates, kraken, ExchangeRateSource, HttpTransport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use configuration::Endpoints;
use core_types::{AssetSymbol, Candle};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// `ExchangeRateSource` backed by the Kraken public API for crypto prices and
/// a fixer-compatible endpoint for fiat cross rates.
#[derive(Clone)]
pub struct MarketDataClient {
    transport: Arc<dyn HttpTransport>,
    kraken_url: String,
    fiat_rates_url: String,
}

impl MarketDataClient {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: &Endpoints) -> Self {
        Self {
            transport,
            kraken_url: endpoints.kraken.trim_end_matches('/').to_string(),
            fiat_rates_url: endpoints.fiat_rates.trim_end_matches('/').to_string(),
        }
    }

    pub fn ticker_url(&self, pair: &str) -> String {
        format!("{}/0/public/Ticker?pair={}", self.kraken_url, pair)
    }

    pub fn ohlc_url(&self, pair: &str, interval_minutes: u32, since: DateTime<Utc>) -> String {
        format!(
            "{}/0/public/OHLC?pair={}&interval={}&since={}",
            self.kraken_url,
            pair,
            interval_minutes,
            since.timestamp()
        )
    }

    pub fn fiat_rates_url(&self, base: Option<&str>) -> String {
        match base {
            Some(base) => format!("{}/latest?base={}", self.fiat_rates_url, base),
            None => format!("{}/latest", self.fiat_rates_url),
        }
    }
}

#[async_trait]
impl ExchangeRateSource for MarketDataClient {
    async fn spot_price(&self, asset: AssetSymbol, fiat: &str) -> Result<Decimal, ApiError> {
        let pair = asset.market_pair(fiat);
        let body = self.transport.get_json(&self.ticker_url(&pair)).await?;
        let price = kraken::parse_ticker(&body, &pair)?;
        debug!(pair = pair.as_str(), %price, "Spot price");
        Ok(price)
    }

    async fn candles_since(
        &self,
        asset: AssetSymbol,
        fiat: &str,
        interval_minutes: u32,
        since: DateTime<Utc>,
    ) -> Result<Vec<Candle>, ApiError> {
        let pair = asset.market_pair(fiat);
        let url = self.ohlc_url(&pair, interval_minutes, since);
        let body = self.transport.get_json(&url).await?;
        kraken::parse_ohlc(&body, &pair)
    }

    async fn fiat_cross_rates(&self, base: Option<&str>) -> Result<HashMap<String, Decimal>, ApiError> {
        let body = self.transport.get_json(&self.fiat_rates_url(base)).await?;
        let mut rates = fiat_rates::parse_rates(&body)?;
        if let Some(base) = base {
            rates.insert(base.to_ascii_uppercase(), Decimal::ONE);
        }
        Ok(rates)
    }
}
