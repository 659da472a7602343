use crate::card::{CardKind, DisplayCard};
use crate::chart::BarChart;
use crate::format::{format_balance, format_optional_currency, format_percent};
use crate::text::TextLayout;
use assets::LogoImage;
use configuration::{DisplayConfig, FormattingConfig};
use core_types::{AssetSymbol, Palette};
use std::collections::HashMap;
use std::sync::Arc;
use tracker::PortfolioSummary;

/// Pure card composition for one panel geometry and palette.
#[derive(Debug, Clone)]
pub struct CardRenderer {
    palette: Palette,
    text: TextLayout,
    chart: BarChart,
    formatting: FormattingConfig,
}

impl CardRenderer {
    /// `dimensions` and `palette` are those of the attached display.
    pub fn new(
        dimensions: (u32, u32),
        palette: Palette,
        display: &DisplayConfig,
        formatting: FormattingConfig,
    ) -> Self {
        let (width, height) = dimensions;
        Self {
            palette,
            text: TextLayout {
                width,
                height,
                logo_reserve: display.logo_width + display.logo_gutter,
                min_font_size: display.min_font_size,
            },
            chart: BarChart {
                width,
                height,
                min_font_size: display.min_font_size,
            },
            formatting,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.text.width, self.text.height)
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn summary_lines(&self, summary: &PortfolioSummary) -> Vec<String> {
        vec![
            "Total Holdings".to_string(),
            format_optional_currency(summary.local_total(), &summary.local_currency, &self.formatting),
            "24 Hour change".to_string(),
            format_percent(summary.change_24h),
        ]
    }

    pub fn asset_lines(&self, summary: &PortfolioSummary, symbol: AssetSymbol) -> Vec<String> {
        let balance = summary
            .snapshot
            .balance(symbol)
            .map(format_balance)
            .unwrap_or_else(|| crate::format::NOT_AVAILABLE.to_string());
        vec![
            symbol.display_name().to_string(),
            balance,
            format_optional_currency(
                summary.local_position(symbol),
                &summary.local_currency,
                &self.formatting,
            ),
        ]
    }

    pub fn render(
        &self,
        kind: CardKind,
        position: usize,
        summary: &PortfolioSummary,
        logos: &HashMap<AssetSymbol, Arc<LogoImage>>,
    ) -> DisplayCard {
        let image = match kind {
            CardKind::Chart => self.chart.compose(&summary.snapshot.positions, &self.palette),
            CardKind::Summary => self.text.compose(&self.summary_lines(summary), None, &self.palette),
            CardKind::Asset(symbol) => self.text.compose(
                &self.asset_lines(summary, symbol),
                logos.get(&symbol).map(|logo| logo.as_ref()),
                &self.palette,
            ),
        };
        DisplayCard::new(kind, position, image, self.palette.clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::IndexedImage;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use tracker::PortfolioSnapshot;

    pub(crate) fn summary(local_rate: Option<Decimal>, change: Option<Decimal>) -> PortfolioSummary {
        PortfolioSummary {
            snapshot: PortfolioSnapshot {
                taken_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                fiat_currency: "USD".to_string(),
                balances: BTreeMap::from([
                    (AssetSymbol::Xbt, dec!(0.5)),
                    (AssetSymbol::Eth, dec!(2.0)),
                    (AssetSymbol::Xrp, dec!(100)),
                ]),
                rates: BTreeMap::from([(AssetSymbol::Xbt, dec!(20000)), (AssetSymbol::Eth, dec!(1500))]),
                positions: BTreeMap::from([(AssetSymbol::Xbt, dec!(10000)), (AssetSymbol::Eth, dec!(3000))]),
            },
            local_currency: "USD".to_string(),
            local_rate,
            change_24h: change,
        }
    }

    pub(crate) fn renderer() -> CardRenderer {
        CardRenderer::new(
            (212, 104),
            Palette::black_white_red(),
            &DisplayConfig::default(),
            FormattingConfig::default(),
        )
    }

    #[test]
    fn test_summary_lines() {
        let lines = renderer().summary_lines(&summary(Some(Decimal::ONE), Some(dec!(10))));
        assert_eq!(lines, vec!["Total Holdings", "USD 13,000.00", "24 Hour change", "+10.00 %"]);
    }

    #[test]
    fn test_summary_lines_without_rates() {
        let lines = renderer().summary_lines(&summary(None, None));
        assert_eq!(lines[1], "N/A");
        assert_eq!(lines[3], "N/A");
    }

    #[test]
    fn test_asset_lines() {
        let r = renderer();
        let s = summary(Some(dec!(0.8)), None);
        assert_eq!(r.asset_lines(&s, AssetSymbol::Xbt), vec!["BTC", "0.5", "USD 8,000.00"]);
        assert_eq!(r.asset_lines(&s, AssetSymbol::Eth), vec!["ETH", "2", "USD 2,400.00"]);
        // Balance known, price not.
        assert_eq!(r.asset_lines(&s, AssetSymbol::Xrp), vec!["XRP", "100", "N/A"]);
    }

    #[test]
    fn test_render_uses_logo_when_present() {
        let r = renderer();
        let s = summary(Some(Decimal::ONE), None);
        let logo = Arc::new(IndexedImage::filled(70, 104, Palette::FOREGROUND));
        let logos = HashMap::from([(AssetSymbol::Eth, logo)]);

        let with_logo = r.render(CardKind::Asset(AssetSymbol::Eth), 3, &s, &logos);
        let without_logo = r.render(CardKind::Asset(AssetSymbol::Xbt), 2, &s, &logos);

        assert_eq!(with_logo.position, 3);
        assert_eq!(with_logo.image().get(10, 50), Some(Palette::FOREGROUND));
        assert_eq!(without_logo.image().get(10, 0), Some(Palette::BACKGROUND));
        assert_eq!((with_logo.width(), with_logo.height()), (212, 104));
    }
}
