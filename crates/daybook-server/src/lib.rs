//! HTTP surface for the Daybook journal and calendar feed.

pub mod error;
pub mod handlers;

use std::path::Path;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use daybook_calendar::{CacheStore, CalendarCacheService, EventSource};
use daybook_journal::JournalStore;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Calendar service with its collaborators chosen at startup.
pub type CalendarService = CalendarCacheService<Box<dyn EventSource>, Box<dyn CacheStore>>;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub calendar: Arc<CalendarService>,
    pub journal: Arc<JournalStore>,
}

impl AppState {
    pub fn new(calendar: CalendarService, journal: JournalStore) -> Self {
        Self {
            calendar: Arc::new(calendar),
            journal: Arc::new(journal),
        }
    }
}

/// Build the application router. `static_dir` holds `journal.html` and the
/// assets served under `/static`.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("journal.html")))
        .route("/health", get(handlers::health_handler))
        .route("/api/calendar-events", get(handlers::calendar_events_handler))
        .route(
            "/api/calendar-events/{date}",
            get(handlers::calendar_events_for_date_handler),
        )
        .route("/api/journal-entries", get(handlers::journal_entries_handler))
        .route(
            "/api/journal-entry/{filename}",
            get(handlers::journal_entry_handler),
        )
        .route("/api/new-entry", post(handlers::new_entry_handler))
        .route(
            "/api/update-entry/{filename}",
            post(handlers::update_entry_handler),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
