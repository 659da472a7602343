use api_client::HttpTransport;
use core_types::{IndexedImage, Palette, Rgb};
use image::{DynamicImage, Rgba};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A logo thumbnail already reduced to the panel palette.
pub type LogoImage = IndexedImage;

/// Process-lifetime cache of decoded logos, keyed by source URL.
///
/// Eviction policy: none. There is one logo per supported asset and each is a
/// few kilobytes, so entries live as long as the cache. Only successful
/// decodes are stored; a failed fetch is retried on the next request.
pub struct LogoCache {
    transport: Arc<dyn HttpTransport>,
    palette: Palette,
    max_size: (u32, u32),
    entries: Mutex<HashMap<String, Arc<LogoImage>>>,
}

impl LogoCache {
    /// `max_size` is the bounding box logos are thumbnailed into; smaller
    /// images are left at their native size.
    pub fn new(transport: Arc<dyn HttpTransport>, palette: Palette, max_size: (u32, u32)) -> Self {
        Self {
            transport,
            palette,
            max_size,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the logo for `url`, downloading it on first use.
    ///
    /// The lock is held across the download so concurrent callers asking for
    /// the same URL trigger a single fetch.
    pub async fn get(&self, url: &str) -> Option<Arc<LogoImage>> {
        let mut entries = self.entries.lock().await;
        if let Some(logo) = entries.get(url) {
            return Some(logo.clone());
        }

        let bytes = match self.transport.get_bytes(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url, error = %e, "Logo unavailable");
                return None;
            }
        };
        let decoded = match image::load_from_memory(&bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(url, error = %e, "Logo could not be decoded");
                return None;
            }
        };

        let logo = Arc::new(reduce(decoded, &self.palette, self.max_size));
        debug!(url, width = logo.width(), height = logo.height(), "Cached logo");
        entries.insert(url.to_string(), logo.clone());
        Some(logo)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Shrinks `image` into `max_size` keeping its aspect ratio, flattens any
/// transparency onto the palette background and maps every pixel to the
/// nearest palette entry.
pub fn reduce(image: DynamicImage, palette: &Palette, max_size: (u32, u32)) -> LogoImage {
    let (max_width, max_height) = max_size;
    let image = if image.width() > max_width || image.height() > max_height {
        image.thumbnail(max_width, max_height)
    } else {
        image
    };
    let rgba = image.to_rgba8();
    let background = palette.background;
    IndexedImage::quantize(rgba.width(), rgba.height(), palette, |x, y| {
        flatten(*rgba.get_pixel(x, y), background)
    })
}

fn flatten(pixel: Rgba<u8>, background: Rgb) -> Rgb {
    let Rgba([r, g, b, a]) = pixel;
    let blend = |fg: u8, bg: u8| -> u8 {
        ((fg as u32 * a as u32 + bg as u32 * (255 - a as u32) + 127) / 255) as u8
    };
    Rgb(blend(r, background.0), blend(g, background.1), blend(b, background.2))
}
