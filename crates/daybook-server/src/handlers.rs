use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use daybook_calendar::{EventWindow, StructuredEvent};
use daybook_journal::{EntrySummary, JournalError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

/// Query flags arrive as free text; only a case-insensitive `true` enables them.
fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    refresh: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForceRefreshQuery {
    force_refresh: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: &'static str,
}

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn calendar_events_handler(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<EventWindow>, ApiError> {
    let force_refresh = flag(query.refresh.as_deref());
    info!("GET /api/calendar-events (refresh={})", force_refresh);

    let window = state.calendar.get_current_window(force_refresh).await?;
    Ok(Json(window))
}

pub async fn calendar_events_for_date_handler(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(query): Query<ForceRefreshQuery>,
) -> Result<Json<Vec<StructuredEvent>>, ApiError> {
    let force_refresh = flag(query.force_refresh.as_deref());
    info!("GET /api/calendar-events/{} (force_refresh={})", date, force_refresh);

    let events = state
        .calendar
        .get_window_for_date(&date, force_refresh)
        .await?;
    info!("Found {} events for date {}", events.len(), date);
    Ok(Json(events))
}

pub async fn journal_entries_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntrySummary>>, ApiError> {
    Ok(Json(state.journal.list_entries()?))
}

/// Rendered entry HTML; a missing entry is a plain-text 404.
pub async fn journal_entry_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    match state.journal.render_entry(&filename) {
        Ok(html) => Html(html).into_response(),
        Err(JournalError::NotFound(_)) => (StatusCode::NOT_FOUND, "Entry not found").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn new_entry_handler(
    State(state): State<AppState>,
) -> Result<Json<EntrySummary>, ApiError> {
    let summary = state.journal.create_entry()?;
    Ok(Json(summary))
}

pub async fn update_entry_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    let content = request.content.unwrap_or_default();
    state.journal.update_entry(&filename, &content)?;

    Ok(Json(MessageResponse {
        message: "Entry updated successfully",
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_flag_parsing() {
        assert!(flag(Some("true")));
        assert!(flag(Some("TRUE")));
        assert!(flag(Some("True")));
        assert!(!flag(Some("1")));
        assert!(!flag(Some("yes")));
        assert!(!flag(Some("")));
        assert!(!flag(None));
    }
}
