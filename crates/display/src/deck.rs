use crate::card::{CardKind, DisplayCard};
use crate::renderer::CardRenderer;
use assets::LogoImage;
use core_types::AssetSymbol;
use std::collections::HashMap;
use std::sync::Arc;
use tracker::PortfolioSummary;

/// The cards of one cycle, rendered one at a time as they are pulled.
///
/// Order is fixed: chart, summary, then one card per held asset in
/// `AssetSymbol` order. The deck owns its inputs, so it can be cloned or
/// [`restart`](Self::restart)ed without touching the network again.
#[derive(Debug, Clone)]
pub struct CardDeck {
    renderer: CardRenderer,
    summary: Arc<PortfolioSummary>,
    logos: HashMap<AssetSymbol, Arc<LogoImage>>,
    kinds: Vec<CardKind>,
    next: usize,
}

impl CardDeck {
    pub fn new(
        renderer: CardRenderer,
        summary: PortfolioSummary,
        logos: HashMap<AssetSymbol, Arc<LogoImage>>,
    ) -> Self {
        let kinds = [CardKind::Chart, CardKind::Summary]
            .into_iter()
            .chain(summary.snapshot.held_assets().map(CardKind::Asset))
            .collect();
        Self {
            renderer,
            summary: Arc::new(summary),
            logos,
            kinds,
            next: 0,
        }
    }

    pub fn kinds(&self) -> &[CardKind] {
        &self.kinds
    }

    pub fn summary(&self) -> &PortfolioSummary {
        &self.summary
    }

    /// Rewinds to the chart card.
    pub fn restart(&mut self) {
        self.next = 0;
    }
}

impl Iterator for CardDeck {
    type Item = DisplayCard;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = *self.kinds.get(self.next)?;
        let position = self.next;
        self.next += 1;
        Some(self.renderer.render(kind, position, &self.summary, &self.logos))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.kinds.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CardDeck {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::tests::{renderer, summary};
    use core_types::Palette;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deck_order() {
        let deck = CardDeck::new(renderer(), summary(Some(Decimal::ONE), None), HashMap::new());
        assert_eq!(
            deck.kinds(),
            &[
                CardKind::Chart,
                CardKind::Summary,
                CardKind::Asset(AssetSymbol::Xbt),
                CardKind::Asset(AssetSymbol::Eth),
                CardKind::Asset(AssetSymbol::Xrp),
            ]
        );
        assert_eq!(deck.len(), 5);
    }

    #[test]
    fn test_deck_is_finite_and_restartable() {
        let mut deck = CardDeck::new(renderer(), summary(Some(Decimal::ONE), Some(dec!(2.5))), HashMap::new());
        let first: Vec<DisplayCard> = deck.by_ref().collect();
        assert_eq!(first.len(), 5);
        assert!(deck.next().is_none());
        assert_eq!(first.iter().map(|c| c.position).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);

        deck.restart();
        let second: Vec<DisplayCard> = deck.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_portfolio_still_has_chart_and_summary() {
        let mut empty = summary(None, None);
        empty.snapshot.balances.clear();
        empty.snapshot.positions.clear();
        let deck = CardDeck::new(renderer(), empty, HashMap::new());
        assert_eq!(deck.kinds(), &[CardKind::Chart, CardKind::Summary]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_every_card_pixel_is_a_palette_color(
            xbt in 0i64..10_000_000_000,
            eth in 0i64..10_000_000_000,
            rate in proptest::option::of(1i64..100_000),
            change in proptest::option::of(-10_000i64..10_000),
        ) {
            let mut s = summary(rate.map(|r| Decimal::new(r, 2)), change.map(|c| Decimal::new(c, 2)));
            s.snapshot.positions.insert(AssetSymbol::Xbt, Decimal::new(xbt, 2));
            s.snapshot.positions.insert(AssetSymbol::Eth, Decimal::new(eth, 2));
            let colors = Palette::black_white_red().colors();
            for card in CardDeck::new(renderer(), s, HashMap::new()) {
                prop_assert_eq!((card.width(), card.height()), (212, 104));
                for y in 0..card.height() {
                    for x in 0..card.width() {
                        let color = card.color_at(x, y).unwrap();
                        prop_assert!(colors.contains(&color));
                    }
                }
            }
        }
    }
}
