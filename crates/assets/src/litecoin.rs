use crate::error::AssetError;
use crate::factory::{HandlerBase, HandlerContext};
use crate::logo::LogoImage;
use crate::responses::BlockcypherAddress;
use crate::{contribution, decode, usable_body, AssetHandler};
use async_trait::async_trait;
use core_types::{scale_down, AssetSymbol};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Litoshi per litecoin.
const LITOSHI_DECIMALS: u32 = 8;

/// Litecoin balances from BlockCypher, one request per address.
pub struct LitecoinHandler {
    base: HandlerBase,
    endpoint: String,
}

impl LitecoinHandler {
    pub fn new(context: &HandlerContext) -> Self {
        Self {
            base: HandlerBase::new(AssetSymbol::Ltc, context),
            endpoint: context.endpoints.blockcypher.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, account: &str) -> String {
        format!("{}/v1/ltc/main/addrs/{}", self.endpoint, account)
    }

    fn parse_balance(address: &BlockcypherAddress) -> Option<Decimal> {
        address
            .final_balance
            .map(|litoshi| scale_down(litoshi, LITOSHI_DECIMALS))
    }
}

#[async_trait]
impl AssetHandler for LitecoinHandler {
    fn symbol(&self) -> AssetSymbol {
        AssetSymbol::Ltc
    }

    async fn fetch_balance(&self, accounts: &[String]) -> Result<Decimal, AssetError> {
        if accounts.is_empty() {
            return Err(AssetError::NoAccounts(AssetSymbol::Ltc));
        }
        let mut total = Decimal::ZERO;
        for account in accounts {
            let response = self.base.transport.get_json(&self.url(account)).await;
            if let Some(body) = usable_body(AssetSymbol::Ltc, account, response)? {
                let balance = decode::<BlockcypherAddress>(AssetSymbol::Ltc, account, &body)
                    .and_then(|address| Self::parse_balance(&address));
                total += contribution(AssetSymbol::Ltc, account, balance);
            }
        }
        debug!(asset = "LTC", accounts = accounts.len(), balance = %total, "Fetched balance");
        Ok(total)
    }

    fn fiat_currency(&self) -> &str {
        &self.base.fiat_currency
    }

    async fn logo(&self) -> Option<Arc<LogoImage>> {
        self.base.logo().await
    }
}
