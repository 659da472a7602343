use crate::error::AssetError;
use crate::factory::{HandlerBase, HandlerContext};
use crate::logo::LogoImage;
use crate::responses::RippleBalances;
use crate::{contribution, decode, usable_body, AssetHandler};
use async_trait::async_trait;
use core_types::AssetSymbol;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// XRP balances from the Ripple Data API, one request per account. The
/// response lists every currency held on the ledger account; only native XRP
/// is counted.
pub struct RippleHandler {
    base: HandlerBase,
    endpoint: String,
}

impl RippleHandler {
    pub fn new(context: &HandlerContext) -> Self {
        Self {
            base: HandlerBase::new(AssetSymbol::Xrp, context),
            endpoint: context.endpoints.ripple_data.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, account: &str) -> String {
        format!("{}/v2/accounts/{}/balances", self.endpoint, account)
    }

    fn parse_balance(account: &RippleBalances) -> Option<Decimal> {
        let balances = account.balances.as_ref()?;
        Some(
            balances
                .iter()
                .filter(|b| b.currency == "XRP")
                .map(|b| b.value)
                .sum(),
        )
    }
}

#[async_trait]
impl AssetHandler for RippleHandler {
    fn symbol(&self) -> AssetSymbol {
        AssetSymbol::Xrp
    }

    async fn fetch_balance(&self, accounts: &[String]) -> Result<Decimal, AssetError> {
        if accounts.is_empty() {
            return Err(AssetError::NoAccounts(AssetSymbol::Xrp));
        }
        let mut total = Decimal::ZERO;
        for account in accounts {
            let response = self.base.transport.get_json(&self.url(account)).await;
            if let Some(body) = usable_body(AssetSymbol::Xrp, account, response)? {
                let balance = decode::<RippleBalances>(AssetSymbol::Xrp, account, &body)
                    .and_then(|balances| Self::parse_balance(&balances));
                total += contribution(AssetSymbol::Xrp, account, balance);
            }
        }
        debug!(asset = "XRP", accounts = accounts.len(), balance = %total, "Fetched balance");
        Ok(total)
    }

    fn fiat_currency(&self) -> &str {
        &self.base.fiat_currency
    }

    async fn logo(&self) -> Option<Arc<LogoImage>> {
        self.base.logo().await
    }
}
