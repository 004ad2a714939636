use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingSettings;

/// Installs the global tracing subscriber. `RUST_LOG` takes precedence over
/// `level`.
pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

pub fn init_logging_from(settings: &LoggingSettings) -> Result<()> {
    init_logging(&settings.level, settings.debug)
}
