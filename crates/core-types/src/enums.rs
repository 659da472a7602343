use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of crypto assets the tracker knows how to value.
///
/// The variant order is the display order: snapshots are keyed by `AssetSymbol`
/// in ordered maps, so cards and charts always list assets in this sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetSymbol {
    #[serde(alias = "BTC")]
    Xbt,
    Eth,
    Ltc,
    Xrp,
}

impl AssetSymbol {
    pub const ALL: [AssetSymbol; 4] = [
        AssetSymbol::Xbt,
        AssetSymbol::Eth,
        AssetSymbol::Ltc,
        AssetSymbol::Xrp,
    ];

    /// The exchange code of the asset (Kraken uses `XBT` for bitcoin).
    pub fn code(&self) -> &'static str {
        match self {
            AssetSymbol::Xbt => "XBT",
            AssetSymbol::Eth => "ETH",
            AssetSymbol::Ltc => "LTC",
            AssetSymbol::Xrp => "XRP",
        }
    }

    /// The ticker people recognise, used on the display.
    pub fn display_name(&self) -> &'static str {
        match self {
            AssetSymbol::Xbt => "BTC",
            other => other.code(),
        }
    }

    /// Builds the market pair string for this asset against a fiat currency,
    /// e.g. `XXBTZUSD`.
    pub fn market_pair(&self, fiat: &str) -> String {
        format!("X{}Z{}", self.code(), fiat.to_ascii_uppercase())
    }
}

impl fmt::Display for AssetSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AssetSymbol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "XBT" | "BTC" => Ok(AssetSymbol::Xbt),
            "ETH" => Ok(AssetSymbol::Eth),
            "LTC" => Ok(AssetSymbol::Ltc),
            "XRP" => Ok(AssetSymbol::Xrp),
            _ => Err(CoreError::UnknownAsset(s.to_string())),
        }
    }
}
