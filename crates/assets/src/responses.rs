//! Typed shapes of the balance endpoint responses.
//!
//! Fields a provider may leave out are optional; the handler decides that a
//! missing balance counts as zero.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Blockonomics `POST /api/balance`.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockonomicsResponse {
    #[serde(default)]
    pub response: Option<Vec<AddressBalance>>,
}

/// One address in a Blockonomics balance response, amounts in satoshi.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressBalance {
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default)]
    pub confirmed: Option<i64>,
}

/// Ethplorer `getAddressInfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct EthplorerAddress {
    #[serde(rename = "ETH", default)]
    pub eth: Option<EthBalance>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthBalance {
    /// Ether, possibly rounded through a float on the provider side.
    #[serde(default)]
    pub balance: Option<Decimal>,
    /// Exact wei, as a decimal string.
    #[serde(default)]
    pub raw_balance: Option<Decimal>,
}

/// BlockCypher `addrs/{address}`, amounts in litoshi.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockcypherAddress {
    #[serde(default)]
    pub final_balance: Option<i64>,
}

/// Ripple Data API `accounts/{account}/balances`.
#[derive(Debug, Clone, Deserialize)]
pub struct RippleBalances {
    #[serde(default)]
    pub balances: Option<Vec<RippleBalance>>,
}

/// One currency line of a ledger account.
#[derive(Debug, Clone, Deserialize)]
pub struct RippleBalance {
    pub currency: String,
    pub value: Decimal,
}
