use core_types::AssetSymbol;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Accounts are configured for {0} but no handler was provided")]
    MissingHandler(AssetSymbol),

    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),
}
