use crate::error::ConfigError;
use crate::settings::{LogFormat, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. When a log
/// directory is configured a daily rolling file is written as well; the
/// returned guard must be kept alive for the file writer to flush.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    let stdout_layer = match config.format {
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
        LogFormat::Json => fmt::layer().json().with_current_span(false).boxed(),
    };

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "inkfolio.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    Registry::default()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    Ok(guard)
}
