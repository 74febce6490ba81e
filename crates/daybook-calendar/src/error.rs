//! Calendar-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Token expired")]
    TokenExpired,

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Cache write failed: {0}")]
    CacheWrite(String),

    #[error("Unable to fetch events and no cache available")]
    NoDataAvailable,
}

impl CalendarError {
    /// Message returned to API clients.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => {
                "No usable calendar access token. Set calendar.access_token or GOOGLE_CALENDAR_TOKEN."
                    .to_string()
            }
            Self::TokenExpired => "Calendar access token expired. Update the configured token.".to_string(),
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::ApiError(msg) => format!("Calendar error: {}", msg),
            Self::NetworkError(_) => "Network error. Check your connection.".to_string(),
            Self::CacheWrite(_) => "Local cache error".to_string(),
            Self::NoDataAvailable => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        let err = CalendarError::AuthRequired;
        assert!(err.user_message().contains("GOOGLE_CALENDAR_TOKEN"));

        let err = CalendarError::TokenExpired;
        assert!(err.user_message().contains("token"));

        let err = CalendarError::RateLimited(30);
        assert!(err.user_message().contains("30"));

        let err = CalendarError::NoDataAvailable;
        assert_eq!(err.user_message(), "Unable to fetch events and no cache available");
    }

    #[test]
    fn test_no_data_display_matches_api_payload() {
        assert_eq!(
            CalendarError::NoDataAvailable.to_string(),
            "Unable to fetch events and no cache available"
        );
    }
}
