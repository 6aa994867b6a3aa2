//! Process-wide logging setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::error::{JobdeskError, Result};

/// Installs the global `tracing` subscriber and routes `log` records into it.
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if a subscriber
/// or logger is already installed; when the `log` slot is taken nothing is
/// installed at all.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| JobdeskError::Logging(format!("invalid level '{}': {}", config.level, e)))?;

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    // The log bridge goes first: if another `log` logger owns the slot,
    // no tracing subscriber is left installed behind it.
    tracing_log::LogTracer::init().map_err(|e| JobdeskError::Logging(e.to_string()))?;

    let subscriber = Registry::default().with(fmt_layer).with(filter);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| JobdeskError::Logging(e.to_string()))?;

    log::debug!(
        "Logging initialized (level={}, json={})",
        config.level,
        config.json
    );
    Ok(())
}
