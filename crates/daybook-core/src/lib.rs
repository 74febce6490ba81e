pub mod config;
pub mod error;

pub use config::{CalendarConfig, Config, ServerConfig, ValidationResult};
pub use error::ConfigError;

use anyhow::Result;

/// Initialize logging for the daybook processes
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("Daybook core initialized");
    Ok(())
}
