use std::time::Duration;

use anyhow::{Context, Result};
use daybook_calendar::{CalendarCacheService, FileCacheStore, GoogleCalendarSource};
use daybook_core::{Config, ConfigError};
use daybook_journal::JournalStore;
use daybook_server::{router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging before config so validation warnings are visible
    daybook_core::init()?;

    let (config, _validation) = Config::load_validated().inspect_err(|e| {
        if let Some(config_error) = e.downcast_ref::<ConfigError>() {
            tracing::error!("{}", config_error.user_message());
        }
    })?;

    let journal = JournalStore::new(&config.data_dir)
        .with_context(|| format!("Failed to open journal at {}", config.data_dir.display()))?;

    let timeout = match config.calendar.fetch_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let source = GoogleCalendarSource::new(
        config.calendar.access_token.clone(),
        config.calendar.calendar_id.clone(),
        config.calendar.api_base_url.clone(),
        timeout,
    )?;
    let cache = FileCacheStore::new(&config.cache_file);
    let calendar = CalendarCacheService::new(
        Box::new(source) as Box<dyn daybook_calendar::EventSource>,
        Box::new(cache) as Box<dyn daybook_calendar::CacheStore>,
    )
    .with_max_results(config.calendar.max_results);

    let app = router(AppState::new(calendar, journal), &config.static_dir);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Daybook listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Daybook stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
