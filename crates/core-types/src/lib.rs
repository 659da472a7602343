pub mod color;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use color::{IndexedImage, Palette, Rgb};
pub use enums::AssetSymbol;
pub use error::CoreError;
pub use structs::{scale_down, Candle};
