use crate::canvas::{to_rgb888, RgbCanvas};
use crate::fonts::fit_line;
use core_types::{AssetSymbol, IndexedImage, Palette, Rgb};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const MARGIN: u32 = 3;
const LABEL_SIZE: u32 = 10;
/// Fraction of each slot a bar occupies, in tenths.
const BAR_FILL_TENTHS: u32 = 6;

/// Pixel rectangle of one bar and the slot it sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarGeometry {
    pub symbol: AssetSymbol,
    pub slot_left: i32,
    pub slot_width: u32,
    pub bar: Rectangle,
}

/// Bar chart of fiat positions, one bar per asset in key order, heights
/// proportional to the largest position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarChart {
    pub width: u32,
    pub height: u32,
    pub min_font_size: u32,
}

impl BarChart {
    fn baseline(&self) -> i32 {
        self.height.saturating_sub(MARGIN + LABEL_SIZE + 1) as i32
    }

    fn plot_height(&self) -> u32 {
        (self.baseline() as u32).saturating_sub(MARGIN)
    }

    pub fn bars(&self, positions: &BTreeMap<AssetSymbol, Decimal>) -> Vec<BarGeometry> {
        if positions.is_empty() {
            return Vec::new();
        }
        let plot_width = self.width.saturating_sub(2 * MARGIN);
        let slot_width = plot_width / positions.len() as u32;
        if slot_width == 0 {
            return Vec::new();
        }
        let bar_width = (slot_width * BAR_FILL_TENTHS / 10).clamp(1, slot_width);
        let largest = positions
            .values()
            .copied()
            .filter(|v| *v > Decimal::ZERO)
            .max()
            .unwrap_or(Decimal::ZERO);

        positions
            .iter()
            .enumerate()
            .map(|(i, (symbol, value))| {
                let slot_left = (MARGIN + i as u32 * slot_width) as i32;
                let bar_height = self.bar_height(*value, largest);
                let bar = Rectangle::new(
                    Point::new(
                        slot_left + (slot_width.saturating_sub(bar_width) / 2) as i32,
                        self.baseline() - bar_height as i32,
                    ),
                    Size::new(bar_width, bar_height),
                );
                BarGeometry {
                    symbol: *symbol,
                    slot_left,
                    slot_width,
                    bar,
                }
            })
            .collect()
    }

    fn bar_height(&self, value: Decimal, largest: Decimal) -> u32 {
        if value <= Decimal::ZERO || largest.is_zero() {
            return 0;
        }
        let ratio = (value / largest).to_f64().unwrap_or(0.0);
        let height = (ratio * self.plot_height() as f64).round() as u32;
        height.clamp(1, self.plot_height())
    }

    /// Draws the chart on white in full colour and quantizes it to `palette`.
    pub fn compose(&self, positions: &BTreeMap<AssetSymbol, Decimal>, palette: &Palette) -> IndexedImage {
        let mut canvas = RgbCanvas::new(self.width, self.height, Rgb::WHITE);
        let bar_color = to_rgb888(palette.color(palette.accent_index()));
        let ink = to_rgb888(palette.foreground);

        for geometry in self.bars(positions) {
            let _ = geometry
                .bar
                .into_styled(PrimitiveStyle::with_fill(bar_color))
                .draw(&mut canvas);

            let label = geometry.symbol.display_name();
            let fitted = fit_line(label, LABEL_SIZE, geometry.slot_width, self.min_font_size);
            let x = geometry.slot_left + (geometry.slot_width.saturating_sub(fitted.width) / 2) as i32;
            fitted
                .face
                .draw(&mut canvas, label, Point::new(x, self.baseline() + 2), ink);
        }

        let _ = Line::new(
            Point::new(MARGIN as i32, self.baseline()),
            Point::new(self.width.saturating_sub(MARGIN + 1) as i32, self.baseline()),
        )
        .into_styled(PrimitiveStyle::with_stroke(ink, 1))
        .draw(&mut canvas);

        canvas.quantize(palette)
    }
}
