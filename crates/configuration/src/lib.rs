use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{
    Config, DisplayConfig, Endpoints, FormattingConfig, HttpConfig, LogFormat, LoggingConfig,
    LogoUrls,
};

/// Prefix for environment variable overrides, e.g. `INKFOLIO__LOCAL_CURRENCY=GBP`.
pub const ENV_PREFIX: &str = "INKFOLIO";

/// Loads the application configuration from `path` (TOML or JSON, chosen by
/// extension), overlays `INKFOLIO__*` environment variables and validates it.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

/// Parses a configuration document held in memory. Used by tests and tools
/// that embed a config.
pub fn parse_config(document: &str, format: config::FileFormat) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(document, format))
        .build()?
        .try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
