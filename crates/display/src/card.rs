use core_types::{AssetSymbol, IndexedImage, Palette, Rgb};
use std::fmt;

/// What a card shows, in deck order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Chart,
    Summary,
    Asset(AssetSymbol),
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardKind::Chart => write!(f, "chart"),
            CardKind::Summary => write!(f, "summary"),
            CardKind::Asset(symbol) => write!(f, "asset:{symbol}"),
        }
    }
}

/// A composed image at the panel's exact size, holding palette indices only.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayCard {
    pub kind: CardKind,
    /// Zero-based position within its deck.
    pub position: usize,
    image: IndexedImage,
    palette: Palette,
}

impl DisplayCard {
    pub fn new(kind: CardKind, position: usize, image: IndexedImage, palette: Palette) -> Self {
        Self {
            kind,
            position,
            image,
            palette,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &IndexedImage {
        &self.image
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn color_at(&self, x: u32, y: u32) -> Option<Rgb> {
        self.image.get(x, y).map(|index| self.palette.color(index))
    }

    /// Expands the indices back into RGB, e.g. for writing a PNG.
    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let Rgb(r, g, b) = self.color_at(x, y).unwrap_or(self.palette.background);
            image::Rgb([r, g, b])
        })
    }
}
