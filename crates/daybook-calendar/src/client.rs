//! Google Calendar API event source.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, TimeZone};
use tracing::instrument;

use crate::error::CalendarError;
use crate::filter::{END_KEY, START_KEY, SUMMARY_KEY};
use crate::source::EventSource;
use crate::types::{ApiEvent, ApiEventTime, EventListResponse};

/// Reads events from one calendar and flattens them into `Key: Value` lines.
pub struct GoogleCalendarSource {
    client: reqwest::Client,
    access_token: Option<String>,
    calendar_id: String,
    base_url: String,
}

impl GoogleCalendarSource {
    /// `timeout` bounds each upstream request; `None` waits indefinitely.
    pub fn new(
        access_token: Option<String>,
        calendar_id: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, CalendarError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            access_token,
            calendar_id: calendar_id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn auth_header(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Local midnight of `date` as RFC 3339.
    fn time_min(date: NaiveDate) -> String {
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        match Local.from_local_datetime(&midnight).earliest() {
            Some(local) => local.to_rfc3339(),
            None => midnight.and_utc().to_rfc3339(),
        }
    }

    async fn list_events(
        &self,
        token: &str,
        limit: u32,
        start_date: NaiveDate,
    ) -> Result<EventListResponse, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events?timeMin={}&maxResults={}&singleEvents=true&orderBy=startTime",
            self.base_url,
            urlencoding::encode(&self.calendar_id),
            urlencoding::encode(&Self::time_min(start_date)),
            limit,
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", Self::auth_header(token))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 {
            Err(CalendarError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(CalendarError::AuthRequired)
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(CalendarError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::ApiError(format!("{}: {}", status, text)))
        }
    }
}

#[async_trait]
impl EventSource for GoogleCalendarSource {
    #[instrument(skip(self), level = "info")]
    async fn fetch(&self, limit: u32, start_date: NaiveDate) -> Result<Vec<String>, CalendarError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(CalendarError::AuthRequired)?;

        let response = self.list_events(token, limit, start_date).await?;
        let lines = response
            .items
            .iter()
            .filter(|event| event.status.as_deref() != Some("cancelled"))
            .map(render_event)
            .collect::<Vec<_>>();

        tracing::info!("Fetched {} events from {}", lines.len(), self.calendar_id);
        Ok(lines)
    }
}

/// `", "` is the pair separator, so it cannot survive inside a value.
fn sanitize(value: &str) -> String {
    value.replace(['\n', '\r'], " ").replace(", ", " ")
}

/// Flatten an API event into `Summary: .., Start time: .., End time: ..`.
///
/// A missing start or end leaves its key out, which the filter reports as malformed.
fn render_event(event: &ApiEvent) -> String {
    let mut parts = vec![format!(
        "{}: {}",
        SUMMARY_KEY,
        sanitize(event.summary.as_deref().unwrap_or_default())
    )];

    let times = [(START_KEY, &event.start), (END_KEY, &event.end)];
    for (key, time) in times {
        if let Some(text) = time.as_ref().and_then(ApiEventTime::as_text) {
            parts.push(format!("{}: {}", key, text));
        }
    }

    parts.join(", ")
}
