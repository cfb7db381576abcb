//! Tracing setup for staffdesk.
//!
//! Logs go to stderr so that stdout carries nothing but the answer (or
//! the `--json` payload), which keeps the CLI pipeable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Install the global tracing subscriber.
///
/// Filter precedence: `config.log_level` (CLI flag or config file), then
/// `RUST_LOG`, then `info`. `config.no_color` and the `NO_COLOR`
/// environment variable both disable ANSI escapes.
pub fn init_logging(config: &AppConfig) -> AppResult<()> {
    let filter = match &config.log_level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| AppError::Config(format!("Invalid log filter {:?}: {}", level, e)))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let ansi = !config.no_color && std::env::var_os("NO_COLOR").is_none();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(ansi),
        )
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;

    tracing::debug!("Logging initialized");
    Ok(())
}
