use crate::error::AssetError;
use crate::factory::{HandlerBase, HandlerContext};
use crate::logo::LogoImage;
use crate::responses::EthplorerAddress;
use crate::{contribution, decode, usable_body, AssetHandler};
use async_trait::async_trait;
use core_types::AssetSymbol;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Wei per ether.
const WEI_DECIMALS: u32 = 18;

/// Ether balances from Ethplorer, one request per address.
pub struct EthereumHandler {
    base: HandlerBase,
    endpoint: String,
    api_key: String,
}

impl EthereumHandler {
    pub fn new(context: &HandlerContext) -> Self {
        Self {
            base: HandlerBase::new(AssetSymbol::Eth, context),
            endpoint: context.endpoints.ethplorer.trim_end_matches('/').to_string(),
            api_key: context.endpoints.ethplorer_api_key.clone(),
        }
    }

    fn url(&self, account: &str) -> String {
        format!("{}/getAddressInfo/{}?apiKey={}", self.endpoint, account, self.api_key)
    }

    /// Prefers the exact `rawBalance` (wei) and falls back to the floating
    /// `balance` field.
    fn parse_balance(info: &EthplorerAddress) -> Option<Decimal> {
        let eth = info.eth.as_ref()?;
        let raw = eth
            .raw_balance
            .filter(|wei| wei.scale() == 0)
            .and_then(|mut wei| wei.set_scale(WEI_DECIMALS).ok().map(|_| wei.normalize()));
        raw.or(eth.balance)
    }
}

#[async_trait]
impl AssetHandler for EthereumHandler {
    fn symbol(&self) -> AssetSymbol {
        AssetSymbol::Eth
    }

    async fn fetch_balance(&self, accounts: &[String]) -> Result<Decimal, AssetError> {
        if accounts.is_empty() {
            return Err(AssetError::NoAccounts(AssetSymbol::Eth));
        }
        let mut total = Decimal::ZERO;
        for account in accounts {
            let response = self.base.transport.get_json(&self.url(account)).await;
            if let Some(body) = usable_body(AssetSymbol::Eth, account, response)? {
                let balance = decode::<EthplorerAddress>(AssetSymbol::Eth, account, &body)
                    .and_then(|info| Self::parse_balance(&info));
                total += contribution(AssetSymbol::Eth, account, balance);
            }
        }
        debug!(asset = "ETH", accounts = accounts.len(), balance = %total, "Fetched balance");
        Ok(total)
    }

    fn fiat_currency(&self) -> &str {
        &self.base.fiat_currency
    }

    async fn logo(&self) -> Option<Arc<LogoImage>> {
        self.base.logo().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::tests::context;
    use api_client::stub::{StubResponse, StubTransport};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn url(account: &str) -> String {
        format!("http://ethplorer.test/getAddressInfo/{}?apiKey=freekey", account)
    }

    #[tokio::test]
    async fn test_sums_each_address() {
        let stub = Arc::new(
            StubTransport::new()
                .json(url("0xa"), json!({ "address": "0xa", "ETH": { "balance": 1.25 } }))
                .json(url("0xb"), json!({ "address": "0xb", "ETH": { "balance": 0.75, "rawBalance": "750000000000000000" } })),
        );
        let handler = EthereumHandler::new(&context(stub.clone()));
        let balance = handler
            .fetch_balance(&["0xa".to_string(), "0xb".to_string()])
            .await
            .unwrap();
        assert_eq!(balance, dec!(2.0));
        assert_eq!(stub.calls().len(), 2);
    }

    fn info(body: serde_json::Value) -> EthplorerAddress {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_raw_balance_is_exact() {
        let body = info(json!({ "ETH": { "balance": 0.30000000000000004, "rawBalance": "300000000000000001" } }));
        assert_eq!(EthereumHandler::parse_balance(&body), Some(dec!(0.300000000000000001)));
    }

    #[test]
    fn test_balance_given_as_string_is_accepted() {
        let body = info(json!({ "ETH": { "balance": "2.5" } }));
        assert_eq!(EthereumHandler::parse_balance(&body), Some(dec!(2.5)));
    }

    #[test]
    fn test_missing_eth_section_is_unknown() {
        let body = info(json!({ "address": "0xa", "tokens": [] }));
        assert_eq!(EthereumHandler::parse_balance(&body), None);
    }

    #[tokio::test]
    async fn test_error_body_counts_as_zero_and_keeps_going() {
        let stub = Arc::new(
            StubTransport::new()
                .json(url("0xa"), json!({ "error": { "code": 104, "message": "Invalid address format" } }))
                .route(url("0xb"), StubResponse::Garbage("<html>".to_string()))
                .json(url("0xc"), json!({ "ETH": { "balance": 3 } })),
        );
        let handler = EthereumHandler::new(&context(stub));
        let accounts = ["0xa", "0xb", "0xc"].map(String::from);
        assert_eq!(handler.fetch_balance(&accounts).await.unwrap(), dec!(3));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_the_asset() {
        let stub = Arc::new(StubTransport::new().route(url("0xa"), StubResponse::Status(503)));
        let handler = EthereumHandler::new(&context(stub));
        assert!(handler.fetch_balance(&["0xa".to_string()]).await.is_err());
    }
}
