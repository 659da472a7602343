use crate::card::DisplayCard;
use crate::error::DisplayError;
use async_trait::async_trait;
use configuration::DisplayConfig;
use core_types::Palette;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The physical (or emulated) panel cards are pushed to.
///
/// The panel dictates canvas size and palette; composition reads both from
/// here.
#[async_trait]
pub trait DisplayDriver: Send + Sync {
    fn dimensions(&self) -> (u32, u32);

    fn palette(&self) -> &Palette;

    async fn show(&self, card: &DisplayCard) -> Result<(), DisplayError>;
}

/// Stands in for the panel by writing every card as `card-NNN.png`, one file
/// per deck position, overwritten each cycle.
#[derive(Debug, Clone)]
pub struct PngDirectoryDriver {
    directory: PathBuf,
    dimensions: (u32, u32),
    palette: Palette,
}

impl PngDirectoryDriver {
    pub fn new(directory: impl Into<PathBuf>, dimensions: (u32, u32), palette: Palette) -> Self {
        Self {
            directory: directory.into(),
            dimensions,
            palette,
        }
    }

    pub fn from_config(display: &DisplayConfig) -> Self {
        Self::new(
            display.output_dir.clone(),
            (display.width, display.height),
            display.palette.clone(),
        )
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn card_path(&self, position: usize) -> PathBuf {
        self.directory.join(format!("card-{position:03}.png"))
    }
}

#[async_trait]
impl DisplayDriver for PngDirectoryDriver {
    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn palette(&self) -> &Palette {
        &self.palette
    }

    async fn show(&self, card: &DisplayCard) -> Result<(), DisplayError> {
        let actual = (card.width(), card.height());
        if actual != self.dimensions {
            return Err(DisplayError::SizeMismatch {
                expected: self.dimensions,
                actual,
            });
        }

        let path = self.card_path(card.position);
        let partial = path.with_extension("png.partial");
        let rgb = card.to_rgb_image();

        tokio::fs::create_dir_all(&self.directory).await?;
        let encode_target = partial.clone();
        tokio::task::spawn_blocking(move || rgb.save_with_format(&encode_target, image::ImageFormat::Png))
            .await
            .map_err(std::io::Error::other)??;
        tokio::fs::rename(&partial, &path).await?;

        debug!(card = %card.kind, path = %path.display(), "Card written");
        Ok(())
    }
}
