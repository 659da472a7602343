use crate::deck::CardDeck;
use crate::driver::DisplayDriver;
use crate::renderer::CardRenderer;
use assets::LogoImage;
use configuration::{DisplayConfig, FormattingConfig};
use core_types::AssetSymbol;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use tracker::{PortfolioSummary, PortfolioTracker};

/// Turns a fresh portfolio valuation into a deck of cards.
pub struct RenderPipeline {
    tracker: Arc<PortfolioTracker>,
    renderer: CardRenderer,
}

impl RenderPipeline {
    pub fn new(tracker: Arc<PortfolioTracker>, renderer: CardRenderer) -> Self {
        Self { tracker, renderer }
    }

    /// A pipeline composing for the canvas and palette of `driver`.
    pub fn for_driver(
        tracker: Arc<PortfolioTracker>,
        driver: &dyn DisplayDriver,
        display: &DisplayConfig,
        formatting: FormattingConfig,
    ) -> Self {
        let renderer = CardRenderer::new(driver.dimensions(), driver.palette().clone(), display, formatting);
        Self::new(tracker, renderer)
    }

    pub fn renderer(&self) -> &CardRenderer {
        &self.renderer
    }

    /// Values the portfolio and collects the logos it needs. Every call hits
    /// the balance and price sources again; logos come from the shared cache.
    pub async fn compose(&self) -> CardDeck {
        let summary = self.tracker.summary().await;
        let logos = self.fetch_logos(&summary).await;
        let deck = CardDeck::new(self.renderer.clone(), summary, logos);
        info!(cards = deck.len(), "Deck composed");
        deck
    }

    async fn fetch_logos(&self, summary: &PortfolioSummary) -> HashMap<AssetSymbol, Arc<LogoImage>> {
        let lookups = summary.snapshot.held_assets().filter_map(|symbol| {
            let handler = self.tracker.handler(symbol)?.clone();
            Some(async move { (symbol, handler.logo().await) })
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(symbol, logo)| {
                if logo.is_none() {
                    debug!(asset = %symbol, "No logo, card is drawn without one");
                }
                Some((symbol, logo?))
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::card::CardKind;
    use api_client::stub::{StubResponse, StubTransport};
    use api_client::MarketDataClient;
    use assets::{create_handlers, HandlerContext, LogoCache};
    use configuration::{Endpoints, LogoUrls};
    use core_types::Palette;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::io::Cursor;
    use tracker::FixedClock;

    pub(crate) const XBT_LOGO: &str = "http://logos.test/xbt.png";
    pub(crate) const ETH_LOGO: &str = "http://logos.test/eth.png";
    pub(crate) const BALANCE_URL: &str = "http://blockonomics.test/api/balance";

    fn endpoints() -> Endpoints {
        Endpoints {
            kraken: "http://kraken.test".to_string(),
            fiat_rates: "http://fx.test".to_string(),
            blockonomics: "http://blockonomics.test".to_string(),
            ethplorer: "http://ethplorer.test".to_string(),
            ethplorer_api_key: "freekey".to_string(),
            blockcypher: "http://blockcypher.test".to_string(),
            ripple_data: "http://ripple.test".to_string(),
        }
    }

    fn black_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(70, 104, Rgba([0, 0, 0, 255])))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// 0.5 BTC at 20,000 and 2 ETH at 1,500, valued in USD. Only the BTC logo
    /// can be fetched.
    pub(crate) fn stub() -> Arc<StubTransport> {
        Arc::new(
            StubTransport::new()
                .json(BALANCE_URL, json!({"response": [{"addr": "bc1-test", "confirmed": 50_000_000}]}))
                .json(
                    "http://ethplorer.test/getAddressInfo/0xtest?apiKey=freekey",
                    json!({"ETH": {"rawBalance": "2000000000000000000", "balance": 2.0}}),
                )
                .json(
                    "http://kraken.test/0/public/Ticker?pair=XXBTZUSD",
                    json!({"error": [], "result": {"XXBTZUSD": {"c": ["20000.00000", "0.1"]}}}),
                )
                .json(
                    "http://kraken.test/0/public/Ticker?pair=XETHZUSD",
                    json!({"error": [], "result": {"XETHZUSD": {"c": ["1500.00", "1.0"]}}}),
                )
                .route(XBT_LOGO, StubResponse::Bytes(black_png())),
        )
    }

    pub(crate) fn pipeline(stub: Arc<StubTransport>) -> RenderPipeline {
        let palette = Palette::black_white_red();
        let context = HandlerContext {
            transport: stub.clone(),
            logos: Arc::new(LogoCache::new(stub.clone(), palette.clone(), (70, 104))),
            fiat_currency: "USD".to_string(),
            endpoints: endpoints(),
            logo_urls: LogoUrls {
                xbt: XBT_LOGO.to_string(),
                eth: ETH_LOGO.to_string(),
                ltc: "http://logos.test/ltc.png".to_string(),
                xrp: "http://logos.test/xrp.png".to_string(),
            },
        };
        let accounts = BTreeMap::from([
            (AssetSymbol::Xbt, vec!["bc1-test".to_string()]),
            (AssetSymbol::Eth, vec!["0xtest".to_string()]),
        ]);
        let tracker = PortfolioTracker::new(
            create_handlers(&context),
            accounts,
            Arc::new(MarketDataClient::new(stub, &endpoints())),
            "USD",
            "USD",
            Arc::new(FixedClock(chrono::Utc::now())),
        )
        .unwrap();
        let renderer = CardRenderer::new(
            (212, 104),
            palette,
            &DisplayConfig::default(),
            FormattingConfig::default(),
        );
        RenderPipeline::new(Arc::new(tracker), renderer)
    }

    #[tokio::test]
    async fn test_compose_values_and_orders_cards() {
        let deck = pipeline(stub()).compose().await;

        assert_eq!(
            deck.kinds(),
            &[
                CardKind::Chart,
                CardKind::Summary,
                CardKind::Asset(AssetSymbol::Xbt),
                CardKind::Asset(AssetSymbol::Eth),
            ]
        );
        assert_eq!(deck.summary().local_total(), Some(rust_decimal_macros::dec!(13000)));
        // No candles are routed, so there is no 24h reference.
        assert_eq!(deck.summary().change_24h, None);
    }

    #[tokio::test]
    async fn test_logos_are_cached_and_missing_ones_tolerated() {
        let stub = stub();
        let pipeline = pipeline(stub.clone());

        let first: Vec<_> = pipeline.compose().await.collect();
        let _second: Vec<_> = pipeline.compose().await.collect();

        assert_eq!(stub.calls_to(XBT_LOGO), 1);
        assert_eq!(stub.calls_to(ETH_LOGO), 2);
        assert_eq!(stub.calls_to(BALANCE_URL), 2);

        let btc = &first[2];
        assert_eq!(btc.kind, CardKind::Asset(AssetSymbol::Xbt));
        assert_eq!(btc.image().get(5, 50), Some(Palette::FOREGROUND));
    }

    #[tokio::test]
    async fn test_for_driver_takes_canvas_from_driver() {
        let driver = crate::driver::PngDirectoryDriver::new("/tmp/unused", (250, 122), Palette::default());
        let tracker = pipeline(stub()).tracker;
        let pipeline = RenderPipeline::for_driver(
            tracker,
            &driver,
            &DisplayConfig::default(),
            FormattingConfig::default(),
        );
        assert_eq!(pipeline.renderer().dimensions(), (250, 122));
        let card = pipeline.compose().await.next().unwrap();
        assert_eq!((card.width(), card.height()), (250, 122));
    }
}
