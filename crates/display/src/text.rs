use crate::canvas::{to_rgb888, RgbCanvas};
use crate::fonts::{fit_line, start_size, FittedLine};
use core_types::{IndexedImage, Palette};
use embedded_graphics::prelude::Point;

/// Fixed geometry of a text card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayout {
    pub width: u32,
    pub height: u32,
    /// Columns kept free on the left when the card carries a logo.
    pub logo_reserve: u32,
    pub min_font_size: u32,
}

/// One line after fitting, with the top-left corner it is drawn at.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub fitted: FittedLine,
    pub origin: Point,
}

impl TextLayout {
    fn text_left(&self, has_logo: bool) -> u32 {
        if has_logo { self.logo_reserve.min(self.width) } else { 0 }
    }

    /// Fits every line on its own, then stacks them with one pixel between
    /// lines and centres the block vertically.
    pub fn place(&self, lines: &[String], has_logo: bool) -> Vec<PlacedLine> {
        let left = self.text_left(has_logo);
        let available = self.width - left;
        let start = start_size(self.height, lines.len());

        let fitted: Vec<FittedLine> = lines
            .iter()
            .map(|line| fit_line(line, start, available, self.min_font_size))
            .collect();

        let spacing = lines.len().saturating_sub(1) as u32;
        let block: u32 = fitted.iter().map(|f| f.face.size()).sum::<u32>() + spacing;
        let mut y = (self.height.saturating_sub(block) / 2) as i32;

        lines
            .iter()
            .zip(fitted)
            .map(|(text, fitted)| {
                let placed = PlacedLine {
                    text: text.clone(),
                    fitted,
                    origin: Point::new(left as i32, y),
                };
                y += fitted.face.size() as i32 + 1;
                placed
            })
            .collect()
    }

    /// Logo at the left edge, vertically centred; lines in the accent colour.
    pub fn compose(&self, lines: &[String], logo: Option<&IndexedImage>, palette: &Palette) -> IndexedImage {
        let mut canvas = RgbCanvas::new(self.width, self.height, palette.background);

        if let Some(logo) = logo {
            let top = self.height.saturating_sub(logo.height()) / 2;
            canvas.paste(logo, palette, Point::new(0, top as i32));
        }

        let ink = to_rgb888(palette.color(palette.accent_index()));
        for line in self.place(lines, logo.is_some()) {
            line.fitted.face.draw(&mut canvas, &line.text, line.origin, ink);
        }

        canvas.quantize(palette)
    }
}
