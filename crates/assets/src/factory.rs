use crate::bitcoin::BitcoinHandler;
use crate::ethereum::EthereumHandler;
use crate::litecoin::LitecoinHandler;
use crate::logo::{LogoCache, LogoImage};
use crate::ripple::RippleHandler;
use crate::AssetHandler;
use api_client::HttpTransport;
use configuration::{Config, Endpoints, LogoUrls};
use core_types::AssetSymbol;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a handler needs from the outside world.
#[derive(Clone)]
pub struct HandlerContext {
    pub transport: Arc<dyn HttpTransport>,
    pub logos: Arc<LogoCache>,
    pub fiat_currency: String,
    pub endpoints: Endpoints,
    pub logo_urls: LogoUrls,
}

impl HandlerContext {
    pub fn from_config(config: &Config, transport: Arc<dyn HttpTransport>, logos: Arc<LogoCache>) -> Self {
        Self {
            transport,
            logos,
            fiat_currency: config.fiat_currency.clone(),
            endpoints: config.endpoints.clone(),
            logo_urls: config.logos.clone(),
        }
    }
}

/// State common to every handler: where to fetch, what fiat to price in and
/// which logo to show.
#[derive(Clone)]
pub(crate) struct HandlerBase {
    pub transport: Arc<dyn HttpTransport>,
    pub fiat_currency: String,
    logos: Arc<LogoCache>,
    logo_url: String,
}

impl HandlerBase {
    pub fn new(symbol: AssetSymbol, context: &HandlerContext) -> Self {
        Self {
            transport: context.transport.clone(),
            fiat_currency: context.fiat_currency.clone(),
            logos: context.logos.clone(),
            logo_url: context.logo_urls.for_asset(symbol).to_string(),
        }
    }

    pub async fn logo(&self) -> Option<Arc<LogoImage>> {
        self.logos.get(&self.logo_url).await
    }
}

/// Creates the handler for `symbol`.
///
/// The match is exhaustive, so adding an `AssetSymbol` without a handler is a
/// compile error.
pub fn create_handler(symbol: AssetSymbol, context: &HandlerContext) -> Arc<dyn AssetHandler> {
    match symbol {
        AssetSymbol::Xbt => Arc::new(BitcoinHandler::new(context)),
        AssetSymbol::Eth => Arc::new(EthereumHandler::new(context)),
        AssetSymbol::Ltc => Arc::new(LitecoinHandler::new(context)),
        AssetSymbol::Xrp => Arc::new(RippleHandler::new(context)),
    }
}

/// One handler for every supported asset.
pub fn create_handlers(context: &HandlerContext) -> HashMap<AssetSymbol, Arc<dyn AssetHandler>> {
    AssetSymbol::ALL
        .iter()
        .map(|&symbol| (symbol, create_handler(symbol, context)))
        .collect()
}
