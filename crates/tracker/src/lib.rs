//! # Portfolio Tracker
//!
//! Turns configured accounts into a valued snapshot: balances from the asset
//! handlers, spot prices from the `ExchangeRateSource`, positions as their
//! product. A failure is always contained to the asset it happened on.

pub mod clock;
pub mod error;
pub mod snapshot;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::TrackerError;
pub use snapshot::{PortfolioSnapshot, PortfolioSummary};

use api_client::ExchangeRateSource;
use assets::AssetHandler;
use chrono::Duration;
use configuration::Config;
use core_types::AssetSymbol;
use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How far back the performance figure looks.
pub const CHANGE_LOOKBACK_HOURS: i64 = 24;

/// Outcome of valuing one asset.
struct AssetValuation {
    symbol: AssetSymbol,
    balance: Option<Decimal>,
    rate: Option<Decimal>,
}

/// Orchestrates the asset handlers and the market data source.
pub struct PortfolioTracker {
    handlers: HashMap<AssetSymbol, Arc<dyn AssetHandler>>,
    accounts: BTreeMap<AssetSymbol, Vec<String>>,
    rates: Arc<dyn ExchangeRateSource>,
    fiat_currency: String,
    local_currency: String,
    clock: Arc<dyn Clock>,
}

impl PortfolioTracker {
    /// Creates a tracker. Every asset with accounts must have a handler.
    pub fn new(
        handlers: HashMap<AssetSymbol, Arc<dyn AssetHandler>>,
        accounts: BTreeMap<AssetSymbol, Vec<String>>,
        rates: Arc<dyn ExchangeRateSource>,
        fiat_currency: impl Into<String>,
        local_currency: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TrackerError> {
        if let Some(symbol) = accounts.keys().find(|s| !handlers.contains_key(s)) {
            return Err(TrackerError::MissingHandler(*symbol));
        }
        Ok(Self {
            handlers,
            accounts,
            rates,
            fiat_currency: fiat_currency.into(),
            local_currency: local_currency.into(),
            clock,
        })
    }

    /// Creates a tracker from the application configuration.
    pub fn from_config(
        config: &Config,
        handlers: HashMap<AssetSymbol, Arc<dyn AssetHandler>>,
        rates: Arc<dyn ExchangeRateSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TrackerError> {
        Self::new(
            handlers,
            config.asset_accounts()?,
            rates,
            config.fiat_currency.clone(),
            config.local_currency.clone(),
            clock,
        )
    }

    pub fn fiat_currency(&self) -> &str {
        &self.fiat_currency
    }

    pub fn local_currency(&self) -> &str {
        &self.local_currency
    }

    pub fn handler(&self, symbol: AssetSymbol) -> Option<&Arc<dyn AssetHandler>> {
        self.handlers.get(&symbol)
    }

    /// Fetches every configured asset's balance and spot price and values
    /// the portfolio. Never fails as a whole: an asset whose balance cannot be
    /// fetched is left out, an asset without a price keeps its balance but
    /// gets no position.
    pub async fn snapshot(&self) -> PortfolioSnapshot {
        let valuations = join_all(
            self.accounts
                .iter()
                .filter(|(_, accounts)| !accounts.is_empty())
                .filter_map(|(symbol, accounts)| {
                    let handler = self.handlers.get(symbol)?;
                    Some(self.value_asset(*symbol, handler.as_ref(), accounts))
                }),
        )
        .await;

        let mut snapshot = PortfolioSnapshot {
            taken_at: self.clock.now(),
            fiat_currency: self.fiat_currency.clone(),
            balances: BTreeMap::new(),
            rates: BTreeMap::new(),
            positions: BTreeMap::new(),
        };

        for valuation in valuations {
            let Some(balance) = valuation.balance else {
                continue;
            };
            snapshot.balances.insert(valuation.symbol, balance);
            let Some(rate) = valuation.rate else {
                continue;
            };
            snapshot.rates.insert(valuation.symbol, rate);
            match balance.checked_mul(rate) {
                Some(position) => {
                    snapshot.positions.insert(valuation.symbol, position);
                }
                None => warn!(asset = %valuation.symbol, %balance, %rate, "Position overflows, leaving it out"),
            }
        }

        info!(
            assets = snapshot.balances.len(),
            valued = snapshot.positions.len(),
            total = %snapshot.total(),
            fiat = snapshot.fiat_currency.as_str(),
            "Portfolio snapshot taken"
        );
        snapshot
    }

    async fn value_asset(
        &self,
        symbol: AssetSymbol,
        handler: &dyn AssetHandler,
        accounts: &[String],
    ) -> AssetValuation {
        let fiat = handler.fiat_currency();
        let (balance, rate) = futures::join!(
            handler.fetch_balance(accounts),
            self.rates.spot_price(symbol, fiat)
        );

        let balance = match balance {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!(asset = %symbol, error = %e, "Balance unavailable this cycle");
                None
            }
        };
        let rate = match rate {
            Ok(rate) => Some(rate),
            Err(e) => {
                warn!(asset = %symbol, fiat, error = %e, "Rate unavailable this cycle");
                None
            }
        };
        AssetValuation { symbol, balance, rate }
    }

    /// Percentage change of the portfolio value over the last 24 hours.
    ///
    /// The value 24 hours ago prices each currently held asset at the close of
    /// the oldest candle at or after that moment. An asset without such a
    /// candle contributes nothing. Returns `None` when nothing contributes,
    /// instead of dividing by zero.
    ///
    /// The old value covers every asset with a positive balance, while the
    /// current total only covers assets that have a position this cycle. A held
    /// asset whose spot price failed therefore pulls the figure down; this is
    /// logged as a warning for each such asset.
    pub async fn percent_change_24h(&self, snapshot: &PortfolioSnapshot) -> Option<Decimal> {
        let since = self.clock.now() - Duration::hours(CHANGE_LOOKBACK_HOURS);

        let held: Vec<(AssetSymbol, Decimal, &Arc<dyn AssetHandler>)> = snapshot
            .balances
            .iter()
            .filter(|(_, balance)| **balance > Decimal::ZERO)
            .filter_map(|(symbol, balance)| Some((*symbol, *balance, self.handlers.get(symbol)?)))
            .collect();

        let old_values = join_all(held.iter().map(|(symbol, balance, handler)| async move {
            match self
                .rates
                .reference_price(*symbol, handler.fiat_currency(), since)
                .await
            {
                Ok(price) => balance.checked_mul(price),
                Err(e) => {
                    warn!(asset = %symbol, error = %e, "No 24h reference price, asset contributes nothing");
                    None
                }
            }
        }))
        .await;

        for ((symbol, _, _), old_value) in held.iter().zip(&old_values) {
            if old_value.is_some() && snapshot.position(*symbol).is_none() {
                warn!(
                    asset = %symbol,
                    "Asset counts toward the 24h reference value but has no current position, the change understates"
                );
            }
        }

        let old_total: Decimal = old_values.into_iter().flatten().sum();
        change_pct(snapshot.total(), old_total)
    }

    /// Rate that converts the reference fiat currency into the local one.
    pub async fn local_rate(&self) -> Option<Decimal> {
        if self.local_currency.eq_ignore_ascii_case(&self.fiat_currency) {
            return Some(Decimal::ONE);
        }
        match self.rates.fiat_cross_rates(Some(&self.fiat_currency)).await {
            Ok(rates) => {
                let rate = rates.get(&self.local_currency.to_ascii_uppercase()).copied();
                if rate.is_none() {
                    warn!(
                        base = self.fiat_currency.as_str(),
                        local = self.local_currency.as_str(),
                        "Cross rate table has no entry for the local currency"
                    );
                }
                rate
            }
            Err(e) => {
                warn!(error = %e, "Fiat cross rates unavailable");
                None
            }
        }
    }

    /// One full cycle: snapshot, local conversion and 24-hour change.
    pub async fn summary(&self) -> PortfolioSummary {
        let snapshot = self.snapshot().await;
        let (local_rate, change_24h) =
            futures::join!(self.local_rate(), self.percent_change_24h(&snapshot));
        debug!(?local_rate, ?change_24h, "Summary computed");
        PortfolioSummary {
            snapshot,
            local_currency: self.local_currency.clone(),
            local_rate,
            change_24h,
        }
    }
}

/// `100 × (current − old) / old`, or `None` when `old` is zero.
pub fn change_pct(current: Decimal, old: Decimal) -> Option<Decimal> {
    if old.is_zero() {
        return None;
    }
    (current - old)
        .checked_div(old)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::error::ApiError;
    use assets::{AssetError, LogoImage};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use core_types::Candle;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeHandler {
        symbol: AssetSymbol,
        balance: Option<Decimal>,
    }

    #[async_trait]
    impl AssetHandler for FakeHandler {
        fn symbol(&self) -> AssetSymbol {
            self.symbol
        }

        async fn fetch_balance(&self, _accounts: &[String]) -> Result<Decimal, AssetError> {
            self.balance.ok_or(AssetError::Fetch {
                asset: self.symbol,
                source: ApiError::Status {
                    url: "http://balance.test".to_string(),
                    status: 503,
                },
            })
        }

        fn fiat_currency(&self) -> &str {
            "USD"
        }

        async fn logo(&self) -> Option<Arc<LogoImage>> {
            None
        }
    }

    #[derive(Default)]
    struct FakeRates {
        spot: HashMap<AssetSymbol, Decimal>,
        old: HashMap<AssetSymbol, Decimal>,
        cross: Option<HashMap<String, Decimal>>,
        cross_calls: AtomicUsize,
    }

    #[async_trait]
    impl ExchangeRateSource for FakeRates {
        async fn spot_price(&self, asset: AssetSymbol, fiat: &str) -> Result<Decimal, ApiError> {
            self.spot
                .get(&asset)
                .copied()
                .ok_or_else(|| ApiError::RateUnavailable(asset.market_pair(fiat)))
        }

        async fn candles_since(
            &self,
            asset: AssetSymbol,
            _fiat: &str,
            _interval_minutes: u32,
            since: DateTime<Utc>,
        ) -> Result<Vec<Candle>, ApiError> {
            Ok(self
                .old
                .get(&asset)
                .map(|close| Candle {
                    open_time: since,
                    open: *close,
                    high: *close,
                    low: *close,
                    close: *close,
                    volume: Decimal::ONE,
                })
                .into_iter()
                .collect())
        }

        async fn fiat_cross_rates(&self, _base: Option<&str>) -> Result<HashMap<String, Decimal>, ApiError> {
            self.cross_calls.fetch_add(1, Ordering::SeqCst);
            self.cross.clone().ok_or(ApiError::Status {
                url: "http://fx.test".to_string(),
                status: 500,
            })
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn tracker(balances: &[(AssetSymbol, Option<Decimal>)], rates: FakeRates, local: &str) -> (PortfolioTracker, Arc<FakeRates>) {
        let handlers: HashMap<AssetSymbol, Arc<dyn AssetHandler>> = balances
            .iter()
            .map(|(symbol, balance)| {
                let handler: Arc<dyn AssetHandler> = Arc::new(FakeHandler { symbol: *symbol, balance: *balance });
                (*symbol, handler)
            })
            .collect();
        let accounts = balances
            .iter()
            .map(|(symbol, _)| (*symbol, vec![format!("{}-account", symbol)]))
            .collect();
        let rates = Arc::new(rates);
        let tracker = PortfolioTracker::new(handlers, accounts, rates.clone(), "USD", local, Arc::new(FixedClock(now())))
            .unwrap();
        (tracker, rates)
    }

    #[tokio::test]
    async fn test_positions_and_total() {
        let rates = FakeRates {
            spot: HashMap::from([(AssetSymbol::Xbt, dec!(20000)), (AssetSymbol::Eth, dec!(1500))]),
            ..FakeRates::default()
        };
        let (tracker, _) = tracker(
            &[(AssetSymbol::Xbt, Some(dec!(0.5))), (AssetSymbol::Eth, Some(dec!(2.0)))],
            rates,
            "USD",
        );

        let summary = tracker.summary().await;
        let snapshot = &summary.snapshot;
        assert_eq!(snapshot.position(AssetSymbol::Xbt), Some(dec!(10000)));
        assert_eq!(snapshot.position(AssetSymbol::Eth), Some(dec!(3000)));
        assert_eq!(snapshot.total(), dec!(13000));
        assert_eq!(summary.local_rate, Some(Decimal::ONE));
        assert_eq!(summary.local_total(), Some(dec!(13000)));
        assert_eq!(snapshot.taken_at, now());
    }

    #[tokio::test]
    async fn test_failed_rate_keeps_balance_but_drops_position() {
        let (tracker, _) = tracker(&[(AssetSymbol::Xbt, Some(dec!(0.5)))], FakeRates::default(), "USD");

        let snapshot = tracker.snapshot().await;
        assert_eq!(snapshot.balance(AssetSymbol::Xbt), Some(dec!(0.5)));
        assert!(snapshot.positions.is_empty());
        assert_eq!(snapshot.total(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_failed_balance_does_not_block_other_assets() {
        let rates = FakeRates {
            spot: HashMap::from([(AssetSymbol::Xbt, dec!(20000)), (AssetSymbol::Ltc, dec!(70))]),
            ..FakeRates::default()
        };
        let (tracker, _) = tracker(
            &[(AssetSymbol::Xbt, None), (AssetSymbol::Ltc, Some(dec!(10)))],
            rates,
            "USD",
        );

        let snapshot = tracker.snapshot().await;
        assert_eq!(snapshot.balance(AssetSymbol::Xbt), None);
        assert_eq!(snapshot.position(AssetSymbol::Ltc), Some(dec!(700)));
        assert_eq!(snapshot.total(), dec!(700));
    }

    #[tokio::test]
    async fn test_percent_change_uses_reference_prices() {
        let rates = FakeRates {
            spot: HashMap::from([(AssetSymbol::Xbt, dec!(22000))]),
            old: HashMap::from([(AssetSymbol::Xbt, dec!(20000))]),
            ..FakeRates::default()
        };
        let (tracker, _) = tracker(&[(AssetSymbol::Xbt, Some(dec!(1)))], rates, "USD");

        let snapshot = tracker.snapshot().await;
        assert_eq!(tracker.percent_change_24h(&snapshot).await, Some(dec!(10)));
    }

    #[tokio::test]
    async fn test_percent_change_without_history_is_unavailable() {
        let rates = FakeRates {
            spot: HashMap::from([(AssetSymbol::Xbt, dec!(22000))]),
            ..FakeRates::default()
        };
        let (tracker, _) = tracker(&[(AssetSymbol::Xbt, Some(dec!(1)))], rates, "USD");

        let snapshot = tracker.snapshot().await;
        assert_eq!(tracker.percent_change_24h(&snapshot).await, None);
    }

    #[tokio::test]
    async fn test_zero_balances_are_skipped_for_the_reference_value() {
        let rates = FakeRates {
            spot: HashMap::from([(AssetSymbol::Eth, dec!(1500))]),
            old: HashMap::from([(AssetSymbol::Eth, dec!(1000))]),
            ..FakeRates::default()
        };
        let (tracker, _) = tracker(&[(AssetSymbol::Eth, Some(Decimal::ZERO))], rates, "USD");

        let snapshot = tracker.snapshot().await;
        assert_eq!(tracker.percent_change_24h(&snapshot).await, None);
    }

    #[tokio::test]
    async fn test_local_rate_comes_from_cross_rates() {
        let rates = FakeRates {
            spot: HashMap::from([(AssetSymbol::Xbt, dec!(20000))]),
            cross: Some(HashMap::from([("USD".to_string(), Decimal::ONE), ("GBP".to_string(), dec!(0.8))])),
            ..FakeRates::default()
        };
        let (tracker, rates) = tracker(&[(AssetSymbol::Xbt, Some(dec!(0.5)))], rates, "GBP");

        let summary = tracker.summary().await;
        assert_eq!(summary.local_total(), Some(dec!(8000)));
        assert_eq!(rates.cross_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_same_currency_needs_no_cross_rate_call() {
        let (tracker, rates) = tracker(&[(AssetSymbol::Xbt, Some(dec!(1)))], FakeRates::default(), "USD");
        assert_eq!(tracker.local_rate().await, Some(Decimal::ONE));
        assert_eq!(rates.cross_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_cross_rate_makes_local_total_unavailable() {
        let rates = FakeRates {
            spot: HashMap::from([(AssetSymbol::Xbt, dec!(20000))]),
            ..FakeRates::default()
        };
        let (tracker, _) = tracker(&[(AssetSymbol::Xbt, Some(dec!(1)))], rates, "EUR");
        let summary = tracker.summary().await;
        assert_eq!(summary.local_rate, None);
        assert_eq!(summary.local_total(), None);
        assert_eq!(summary.snapshot.total(), dec!(20000));
    }

    #[test]
    fn test_missing_handler_is_rejected() {
        let accounts = BTreeMap::from([(AssetSymbol::Xrp, vec!["r".to_string()])]);
        let result = PortfolioTracker::new(
            HashMap::new(),
            accounts,
            Arc::new(FakeRates::default()),
            "USD",
            "USD",
            Arc::new(SystemClock),
        );
        assert!(matches!(result, Err(TrackerError::MissingHandler(AssetSymbol::Xrp))));
    }

    #[test]
    fn test_change_pct_handles_zero_reference() {
        assert_eq!(change_pct(dec!(100), Decimal::ZERO), None);
        assert_eq!(change_pct(dec!(90), dec!(100)), Some(dec!(-10)));
    }

    proptest! {
        #[test]
        fn prop_position_is_exact_product(sats in 1i64..2_100_000_000_000_000, cents in 1i64..10_000_000_000) {
            let balance = Decimal::new(sats, 8);
            let rate = Decimal::new(cents, 2);
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (tracker, _) = tracker(
                &[(AssetSymbol::Xbt, Some(balance))],
                FakeRates { spot: HashMap::from([(AssetSymbol::Xbt, rate)]), ..FakeRates::default() },
                "USD",
            );
            let snapshot = runtime.block_on(tracker.snapshot());
            let position = snapshot.position(AssetSymbol::Xbt).unwrap();
            prop_assert_eq!(position, balance * rate);
            prop_assert_eq!(position.scale(), 10);
            prop_assert_eq!(position.mantissa(), sats as i128 * cents as i128);
        }
    }

    #[tokio::test]
    async fn test_held_asset_without_spot_price_still_counts_in_the_old_value() {
        let rates = FakeRates {
            spot: HashMap::from([(AssetSymbol::Xbt, dec!(100))]),
            old: HashMap::from([(AssetSymbol::Xbt, dec!(100)), (AssetSymbol::Eth, dec!(50))]),
            ..FakeRates::default()
        };
        let (tracker, _) = tracker(
            &[(AssetSymbol::Xbt, Some(dec!(1))), (AssetSymbol::Eth, Some(dec!(1)))],
            rates,
            "USD",
        );

        let snapshot = tracker.snapshot().await;
        assert_eq!(snapshot.position(AssetSymbol::Eth), None);
        assert_eq!(snapshot.total(), dec!(100));
        let change = tracker.percent_change_24h(&snapshot).await.unwrap();
        assert_eq!(change, change_pct(dec!(100), dec!(150)).unwrap());
        assert!(change < Decimal::ZERO);
    }
}
