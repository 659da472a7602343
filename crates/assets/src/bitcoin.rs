use crate::error::AssetError;
use crate::factory::{HandlerBase, HandlerContext};
use crate::logo::LogoImage;
use crate::responses::BlockonomicsResponse;
use crate::{contribution, decode, usable_body, AssetHandler};
use async_trait::async_trait;
use core_types::{scale_down, AssetSymbol};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Satoshi per bitcoin.
const SATOSHI_DECIMALS: u32 = 8;

/// Bitcoin balances from Blockonomics, which accepts every address in a
/// single POST.
pub struct BitcoinHandler {
    base: HandlerBase,
    url: String,
}

impl BitcoinHandler {
    pub fn new(context: &HandlerContext) -> Self {
        Self {
            base: HandlerBase::new(AssetSymbol::Xbt, context),
            url: format!("{}/api/balance", context.endpoints.blockonomics.trim_end_matches('/')),
        }
    }

    /// Sums `confirmed` satoshi over the `response` list.
    fn sum_confirmed(body: &Value) -> Decimal {
        let Some(response) = decode::<BlockonomicsResponse>(AssetSymbol::Xbt, "*", body) else {
            return Decimal::ZERO;
        };
        let Some(entries) = response.response else {
            warn!(body = %body, "Blockonomics response has no 'response' list, counting it as zero");
            return Decimal::ZERO;
        };
        entries
            .into_iter()
            .map(|entry| {
                let account = entry.addr.as_deref().unwrap_or("?");
                let satoshi = entry.confirmed.map(|s| scale_down(s, SATOSHI_DECIMALS));
                contribution(AssetSymbol::Xbt, account, satoshi)
            })
            .sum()
    }
}

#[async_trait]
impl AssetHandler for BitcoinHandler {
    fn symbol(&self) -> AssetSymbol {
        AssetSymbol::Xbt
    }

    async fn fetch_balance(&self, accounts: &[String]) -> Result<Decimal, AssetError> {
        if accounts.is_empty() {
            return Err(AssetError::NoAccounts(AssetSymbol::Xbt));
        }
        let body = json!({ "addr": accounts.join(" ") });
        let response = self.base.transport.post_json(&self.url, &body).await;
        let balance = match usable_body(AssetSymbol::Xbt, "*", response)? {
            Some(body) => Self::sum_confirmed(&body),
            None => Decimal::ZERO,
        };
        debug!(asset = "XBT", accounts = accounts.len(), %balance, "Fetched balance");
        Ok(balance)
    }

    fn fiat_currency(&self) -> &str {
        &self.base.fiat_currency
    }

    async fn logo(&self) -> Option<Arc<LogoImage>> {
        self.base.logo().await
    }
}
