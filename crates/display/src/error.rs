use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Card is {actual:?} but the panel is {expected:?}")]
    SizeMismatch { expected: (u32, u32), actual: (u32, u32) },

    #[error("Failed to write the card: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode the card: {0}")]
    Encode(#[from] image::ImageError),
}
