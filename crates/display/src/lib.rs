//! # Display
//!
//! Everything between a `PortfolioSummary` and the e-ink panel: composing
//! cards on an RGB canvas, fitting text into the tiny canvas, quantizing to
//! the panel palette and pacing the slideshow.
//!
//! The panel's size and palette are owned by the [`DisplayDriver`]; nothing
//! in here assumes a particular panel.

pub mod canvas;
pub mod card;
pub mod chart;
pub mod deck;
pub mod driver;
pub mod error;
pub mod fonts;
pub mod format;
pub mod pipeline;
pub mod renderer;
pub mod slideshow;
pub mod text;

pub use card::{CardKind, DisplayCard};
pub use deck::CardDeck;
pub use driver::{DisplayDriver, PngDirectoryDriver};
pub use error::DisplayError;
pub use format::{format_currency, format_percent};
pub use pipeline::RenderPipeline;
pub use renderer::CardRenderer;
pub use slideshow::{Pacer, Slideshow, TokioPacer};
