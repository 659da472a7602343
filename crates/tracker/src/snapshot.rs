use chrono::{DateTime, Utc};
use core_types::AssetSymbol;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Balances and fiat positions from one aggregation cycle.
///
/// An asset whose price was unavailable appears in `balances` but not in
/// `positions`, and therefore does not count towards [`total`](Self::total).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub taken_at: DateTime<Utc>,
    /// The reference fiat currency positions are expressed in.
    pub fiat_currency: String,
    pub balances: BTreeMap<AssetSymbol, Decimal>,
    /// The spot price used for each valued asset.
    pub rates: BTreeMap<AssetSymbol, Decimal>,
    pub positions: BTreeMap<AssetSymbol, Decimal>,
}

impl PortfolioSnapshot {
    /// Sum of all valued positions, in the reference fiat currency.
    pub fn total(&self) -> Decimal {
        self.positions.values().copied().sum()
    }

    pub fn balance(&self, symbol: AssetSymbol) -> Option<Decimal> {
        self.balances.get(&symbol).copied()
    }

    pub fn position(&self, symbol: AssetSymbol) -> Option<Decimal> {
        self.positions.get(&symbol).copied()
    }

    /// Assets shown with their own card, in display order.
    pub fn held_assets(&self) -> impl Iterator<Item = AssetSymbol> + '_ {
        self.balances.keys().copied()
    }
}

/// Everything the display needs from one cycle: the snapshot plus its
/// conversion into the local currency and the 24-hour change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub snapshot: PortfolioSnapshot,
    pub local_currency: String,
    /// Reference fiat → local currency rate; `None` when the cross rate could
    /// not be obtained.
    pub local_rate: Option<Decimal>,
    /// Percentage change of the valuation over 24 hours; `None` when no
    /// reference value exists.
    pub change_24h: Option<Decimal>,
}

impl PortfolioSummary {
    pub fn local_total(&self) -> Option<Decimal> {
        self.local_rate
            .and_then(|rate| self.snapshot.total().checked_mul(rate))
    }

    pub fn local_position(&self, symbol: AssetSymbol) -> Option<Decimal> {
        let position = self.snapshot.position(symbol)?;
        position.checked_mul(self.local_rate?)
    }
}
