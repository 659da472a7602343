use serde::{Deserialize, Serialize};

/// A 24-bit colour as the display hardware understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);

    fn distance_sq(&self, other: &Rgb) -> u32 {
        let dr = self.0 as i32 - other.0 as i32;
        let dg = self.1 as i32 - other.1 as i32;
        let db = self.2 as i32 - other.2 as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

/// The fixed colour set of a two- or three-colour panel.
///
/// Index 0 is always the background, 1 the foreground and, when present,
/// 2 the accent. Images destined for the panel store these indices only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub background: Rgb,
    pub foreground: Rgb,
    #[serde(default)]
    pub accent: Option<Rgb>,
}

impl Palette {
    pub const BACKGROUND: u8 = 0;
    pub const FOREGROUND: u8 = 1;

    /// The black/white/red palette of the common three-colour e-ink panels.
    pub fn black_white_red() -> Self {
        Self {
            background: Rgb::WHITE,
            foreground: Rgb::BLACK,
            accent: Some(Rgb::RED),
        }
    }

    pub fn colors(&self) -> Vec<Rgb> {
        let mut colors = vec![self.background, self.foreground];
        colors.extend(self.accent);
        colors
    }

    pub fn len(&self) -> usize {
        if self.accent.is_some() { 3 } else { 2 }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index used for highlighted elements. A two-colour panel falls back to
    /// the foreground.
    pub fn accent_index(&self) -> u8 {
        if self.accent.is_some() { 2 } else { Self::FOREGROUND }
    }

    pub fn color(&self, index: u8) -> Rgb {
        match index {
            Self::BACKGROUND => self.background,
            Self::FOREGROUND => self.foreground,
            _ => self.accent.unwrap_or(self.foreground),
        }
    }

    /// Nearest palette entry by squared RGB distance. Ties go to the lower
    /// index, so the mapping is a pure function of the colour.
    pub fn nearest(&self, color: Rgb) -> u8 {
        let mut best = Self::BACKGROUND;
        let mut best_distance = u32::MAX;
        for (index, candidate) in self.colors().iter().enumerate() {
            let distance = candidate.distance_sq(&color);
            if distance < best_distance {
                best_distance = distance;
                best = index as u8;
            }
        }
        best
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::black_white_red()
    }
}

/// A bitmap whose pixels are indices into a [`Palette`].
///
/// Anything stored this way can only ever show palette colours, which is the
/// constraint the panel imposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl IndexedImage {
    /// An image filled with `index`.
    pub fn filled(width: u32, height: u32, index: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![index; (width as usize) * (height as usize)],
        }
    }

    /// Quantizes a full-colour image, given as a per-pixel colour function,
    /// onto `palette` by nearest colour.
    pub fn quantize(width: u32, height: u32, palette: &Palette, color_at: impl Fn(u32, u32) -> Rgb) -> Self {
        let mut pixels = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                pixels.push(palette.nearest(color_at(x, y)));
            }
        }
        Self { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.width && y < self.height {
            self.pixels.get((y * self.width + x) as usize).copied()
        } else {
            None
        }
    }

    /// Writes a pixel; coordinates outside the image are ignored.
    pub fn set(&mut self, x: u32, y: u32, index: u8) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = index;
        }
    }
}
