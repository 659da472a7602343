use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown asset symbol: {0}")]
    UnknownAsset(String),
}
