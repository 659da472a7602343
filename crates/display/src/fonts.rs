use crate::canvas::{RgbCanvas, ScaledTarget};
use embedded_graphics::mono_font::ascii::{
    FONT_4X6, FONT_5X7, FONT_5X8, FONT_6X9, FONT_6X10, FONT_6X12, FONT_7X13, FONT_7X14, FONT_9X15,
    FONT_9X18, FONT_10X20,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};

/// A mono font drawn at an integer magnification.
#[derive(Clone, Copy)]
pub struct FontFace {
    pub font: &'static MonoFont<'static>,
    pub scale: u32,
}

impl FontFace {
    const fn new(font: &'static MonoFont<'static>, scale: u32) -> Self {
        Self { font, scale }
    }

    /// Pixel size of the face, i.e. its line height.
    pub fn size(&self) -> u32 {
        self.font.character_size.height * self.scale
    }

    pub fn text_width(&self, text: &str) -> u32 {
        let style = MonoTextStyle::new(self.font, Rgb888::BLACK);
        style
            .measure_string(text, Point::zero(), Baseline::Top)
            .bounding_box
            .size
            .width
            * self.scale
    }

    /// Draws `text` with its top-left corner at `origin`.
    pub fn draw(&self, canvas: &mut RgbCanvas, text: &str, origin: Point, color: Rgb888) {
        let style = MonoTextStyle::new(self.font, color);
        let mut target = ScaledTarget::new(canvas, origin, self.scale);
        // Drawing into a canvas cannot fail.
        let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut target);
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let glyph = self.font.character_size;
        write!(f, "FontFace({}x{} x{})", glyph.width, glyph.height, self.scale)
    }
}

impl PartialEq for FontFace {
    fn eq(&self, other: &Self) -> bool {
        self.font.character_size == other.font.character_size && self.scale == other.scale
    }
}

/// Available faces, ascending by size.
const LADDER: [FontFace; 17] = [
    FontFace::new(&FONT_4X6, 1),
    FontFace::new(&FONT_5X7, 1),
    FontFace::new(&FONT_5X8, 1),
    FontFace::new(&FONT_6X9, 1),
    FontFace::new(&FONT_6X10, 1),
    FontFace::new(&FONT_6X12, 1),
    FontFace::new(&FONT_7X13, 1),
    FontFace::new(&FONT_7X14, 1),
    FontFace::new(&FONT_9X15, 1),
    FontFace::new(&FONT_9X18, 1),
    FontFace::new(&FONT_10X20, 1),
    FontFace::new(&FONT_6X12, 2),
    FontFace::new(&FONT_7X13, 2),
    FontFace::new(&FONT_7X14, 2),
    FontFace::new(&FONT_9X15, 2),
    FontFace::new(&FONT_9X18, 2),
    FontFace::new(&FONT_10X20, 2),
];

/// The largest face whose size does not exceed `size`, or the smallest face
/// when even that is too big.
pub fn face_for_size(size: u32) -> FontFace {
    LADDER
        .iter()
        .rev()
        .find(|face| face.size() <= size)
        .copied()
        .unwrap_or(LADDER[0])
}

/// Result of fitting one line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedLine {
    /// The requested size the search stopped at.
    pub size: u32,
    pub face: FontFace,
    pub width: u32,
}

impl FittedLine {
    pub fn fits(&self, available_width: u32) -> bool {
        self.width <= available_width
    }
}

/// Greedy per-line fit: starting at `start_size`, shrink one pixel at a time
/// until the line fits `available_width` or `min_size` is reached. A line
/// that is still too wide at the floor is returned as is and will be clipped.
pub fn fit_line(text: &str, start_size: u32, available_width: u32, min_size: u32) -> FittedLine {
    let mut size = start_size.max(min_size);
    loop {
        let face = face_for_size(size);
        let width = face.text_width(text);
        if width <= available_width || size <= min_size {
            return FittedLine { size, face, width };
        }
        size -= 1;
    }
}

/// Font size every line of an `n` line card starts its search at.
pub fn start_size(canvas_height: u32, line_count: usize) -> u32 {
    let n = line_count.max(1) as u32;
    canvas_height.saturating_sub(n) / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ladder_is_ascending() {
        assert!(LADDER.windows(2).all(|w| w[0].size() <= w[1].size()));
        assert_eq!(LADDER[0].size(), 6);
    }

    #[test]
    fn test_face_for_size_picks_largest_not_above() {
        assert_eq!(face_for_size(11).size(), 10);
        assert_eq!(face_for_size(20).size(), 20);
        assert_eq!(face_for_size(33).size(), 30);
        assert_eq!(face_for_size(500).size(), 40);
        assert_eq!(face_for_size(1).size(), 6);
    }

    #[test]
    fn test_start_size() {
        assert_eq!(start_size(104, 4), 25);
        assert_eq!(start_size(104, 3), 33);
        assert_eq!(start_size(104, 0), 103);
        assert_eq!(start_size(2, 4), 0);
    }

    #[test]
    fn test_short_text_keeps_start_size() {
        let fitted = fit_line("BTC", 25, 141, 6);
        assert_eq!(fitted.size, 25);
        assert!(fitted.fits(141));
    }

    #[test]
    fn test_long_text_shrinks_until_it_fits() {
        let text = "USD 1,234,567.89";
        let fitted = fit_line(text, 25, 141, 6);
        assert!(fitted.size < 25);
        assert!(fitted.fits(141));
        // One pixel larger would not have fitted.
        assert!(face_for_size(fitted.size + 1).text_width(text) > 141);
    }

    #[test]
    fn test_fit_stops_at_floor() {
        let text = "this line is far too long for a tiny panel";
        let fitted = fit_line(text, 25, 50, 6);
        assert_eq!(fitted.size, 6);
        assert!(!fitted.fits(50));
    }

    #[test]
    fn test_draw_respects_scale() {
        let mut canvas = RgbCanvas::new(40, 40, core_types::Rgb::WHITE);
        let face = FontFace::new(&FONT_6X10, 2);
        face.draw(&mut canvas, "I", Point::new(0, 0), Rgb888::BLACK);
        let inked = (0..40)
            .flat_map(|y| (0..40).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) == Some(core_types::Rgb::BLACK))
            .count();
        assert!(inked > 0);
        assert_eq!(inked % 4, 0);
        assert!((0..40).all(|x| canvas.pixel(x, 25) == Some(core_types::Rgb::WHITE)));
    }

    proptest! {
        #[test]
        fn prop_fit_is_idempotent(text in "[ -~]{0,40}", start in 0u32..60, width in 1u32..300) {
            let first = fit_line(&text, start, width, 6);
            let second = fit_line(&text, start, width, 6);
            prop_assert_eq!(first, second);
            prop_assert!(first.size >= 6);
            prop_assert!(first.fits(width) || first.size == 6);
        }
    }
}
