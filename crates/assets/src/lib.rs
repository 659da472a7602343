//! # Asset Handlers
//!
//! One `AssetHandler` per supported `AssetSymbol`. Each knows the balance
//! endpoint for its chain, how that endpoint shapes its JSON and how to turn
//! the smallest on-chain unit into native units. Handlers are created through
//! [`factory::create_handlers`], a static mapping over the closed asset set.
//!
//! Balance endpoints are third-party and unreliable. A handler:
//! - propagates transport failures as `AssetError::Fetch`;
//! - treats malformed bodies or missing fields as a zero contribution for
//!   that account, logs it and carries on with the rest.

pub mod bitcoin;
pub mod error;
pub mod ethereum;
pub mod factory;
pub mod litecoin;
pub mod logo;
pub mod responses;
pub mod ripple;

pub use error::AssetError;
pub use factory::{create_handler, create_handlers, HandlerContext};
pub use logo::{LogoCache, LogoImage};

use api_client::error::ApiError;
use async_trait::async_trait;
use core_types::AssetSymbol;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// The capability set every supported asset provides.
#[async_trait]
pub trait AssetHandler: Send + Sync {
    fn symbol(&self) -> AssetSymbol;

    /// Sums the balances of `accounts` in native units (BTC, not satoshi).
    async fn fetch_balance(&self, accounts: &[String]) -> Result<Decimal, AssetError>;

    /// The fiat currency this asset is priced in.
    fn fiat_currency(&self) -> &str;

    /// The palette-reduced logo, or `None` when it cannot be fetched or decoded.
    async fn logo(&self) -> Option<Arc<LogoImage>>;
}

/// Sorts a response into "use it", "count it as zero" or "give up".
///
/// Transport failures abort the asset; anything that reached us but could not
/// be decoded is logged and skipped.
pub(crate) fn usable_body(
    asset: AssetSymbol,
    account: &str,
    response: Result<Value, ApiError>,
) -> Result<Option<Value>, AssetError> {
    match response {
        Ok(body) => Ok(Some(body)),
        Err(source) if source.is_transport() => Err(AssetError::Fetch { asset, source }),
        Err(e) => {
            warn!(asset = %asset, account, error = %e, "Unreadable balance response, counting it as zero");
            Ok(None)
        }
    }
}

/// Decodes a balance body into its typed shape. A body of the wrong shape is
/// logged and yields `None`, which the caller counts as zero.
pub(crate) fn decode<T: DeserializeOwned>(asset: AssetSymbol, account: &str, body: &Value) -> Option<T> {
    match T::deserialize(body) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(asset = %asset, account, error = %e, "Balance response has an unexpected shape");
            None
        }
    }
}

/// Guards the `Balance >= 0` invariant: a negative or missing contribution is
/// logged and counted as zero.
pub(crate) fn contribution(asset: AssetSymbol, account: &str, amount: Option<Decimal>) -> Decimal {
    match amount {
        Some(amount) if amount >= Decimal::ZERO => amount,
        Some(amount) => {
            warn!(asset = %asset, account, %amount, "Negative balance reported, counting it as zero");
            Decimal::ZERO
        }
        None => {
            warn!(asset = %asset, account, "Balance field missing, counting it as zero");
            Decimal::ZERO
        }
    }
}
