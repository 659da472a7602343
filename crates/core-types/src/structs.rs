use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLC bar from the market data venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Converts an integer amount in an asset's smallest unit into native units.
///
/// `scale_down(150_000_000, 8)` is exactly `1.5`. The conversion is lossless:
/// the result carries `decimals` fractional digits.
pub fn scale_down(smallest_units: i64, decimals: u32) -> Decimal {
    Decimal::new(smallest_units, decimals)
}
