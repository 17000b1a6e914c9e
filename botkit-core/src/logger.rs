//! Tracing initialization for bot binaries.

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber.
/// `level` overrides the filter (e.g. "debug" or "media_bot=debug,botkit_core=info");
/// when absent, RUST_LOG is honored, falling back to "info".
pub fn init_tracing(level: Option<&str>) -> anyhow::Result<()> {
    let env_filter = match level {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
