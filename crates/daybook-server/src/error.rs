//! HTTP error mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use daybook_calendar::CalendarError;
use daybook_journal::JournalError;
use thiserror::Error;

/// Failure of a request handler, rendered as `{"error": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Request body missing, not JSON, or of the wrong shape.
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Calendar(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Journal(JournalError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Journal(JournalError::InvalidFilename(_) | JournalError::EmptyContent) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Journal(JournalError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidBody(rejection) => rejection.status(),
        }
    }

    /// Message shown to the client.
    pub fn message(&self) -> String {
        match self {
            ApiError::Calendar(e) => e.user_message(),
            ApiError::Journal(JournalError::NotFound(_)) => "Entry not found".to_string(),
            ApiError::Journal(JournalError::Io(_)) => "Journal storage error".to_string(),
            ApiError::Journal(e) => e.to_string(),
            ApiError::InvalidBody(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = Json(serde_json::json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(CalendarError::NoDataAvailable).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(JournalError::not_found("x.md")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(JournalError::EmptyContent).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::from(CalendarError::NoDataAvailable).message(),
            "Unable to fetch events and no cache available"
        );
        assert_eq!(
            ApiError::from(JournalError::not_found("x.md")).message(),
            "Entry not found"
        );
        assert_eq!(
            ApiError::from(JournalError::EmptyContent).message(),
            "No content provided"
        );
        assert!(ApiError::from(CalendarError::AuthRequired)
            .message()
            .contains("access token"));
    }
}
