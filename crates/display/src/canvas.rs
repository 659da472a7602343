use core_types::{IndexedImage, Palette, Rgb};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use std::convert::Infallible;

/// A full-colour drawing surface. Cards are composed here and quantized to
/// the panel palette as the last step.
#[derive(Debug, Clone)]
pub struct RgbCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl RgbCanvas {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![to_rgb888(background); (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.width && y < self.height {
            let c = self.pixels[(y * self.width + x) as usize];
            Some(Rgb(c.r(), c.g(), c.b()))
        } else {
            None
        }
    }

    fn put(&mut self, x: i32, y: i32, color: Rgb888) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            let index = (y as u32 * self.width + x as u32) as usize;
            self.pixels[index] = color;
        }
    }

    /// Paints an already palette-reduced bitmap at `origin`.
    pub fn paste(&mut self, image: &IndexedImage, palette: &Palette, origin: Point) {
        for y in 0..image.height() {
            for x in 0..image.width() {
                if let Some(index) = image.get(x, y) {
                    self.put(origin.x + x as i32, origin.y + y as i32, to_rgb888(palette.color(index)));
                }
            }
        }
    }

    /// Nearest-colour mapping of every pixel onto `palette`.
    pub fn quantize(&self, palette: &Palette) -> IndexedImage {
        IndexedImage::quantize(self.width, self.height, palette, |x, y| {
            let c = self.pixels[(y * self.width + x) as usize];
            Rgb(c.r(), c.g(), c.b())
        })
    }
}

impl OriginDimensions for RgbCanvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for RgbCanvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.put(point.x, point.y, color);
        }
        Ok(())
    }
}

/// Draws into a canvas with every pixel blown up to a `scale × scale` block
/// placed relative to `origin`. Used to render mono fonts above their native
/// size.
pub struct ScaledTarget<'a> {
    canvas: &'a mut RgbCanvas,
    origin: Point,
    scale: u32,
}

impl<'a> ScaledTarget<'a> {
    pub fn new(canvas: &'a mut RgbCanvas, origin: Point, scale: u32) -> Self {
        Self {
            canvas,
            origin,
            scale: scale.max(1),
        }
    }
}

impl OriginDimensions for ScaledTarget<'_> {
    fn size(&self) -> Size {
        Size::new(
            self.canvas.width().div_ceil(self.scale),
            self.canvas.height().div_ceil(self.scale),
        )
    }
}

impl DrawTarget for ScaledTarget<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let scale = self.scale as i32;
        for Pixel(point, color) in pixels {
            let x0 = self.origin.x + point.x * scale;
            let y0 = self.origin.y + point.y * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    self.canvas.put(x0 + dx, y0 + dy, color);
                }
            }
        }
        Ok(())
    }
}

pub fn to_rgb888(color: Rgb) -> Rgb888 {
    Rgb888::new(color.0, color.1, color.2)
}
