//! Calendar data structures: raw event windows, cache entries and the
//! structured form returned to date-scoped queries.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// How long a cache entry stays fresh after it was written, in seconds.
pub const CACHE_TTL_SECS: i64 = 3600;

pub fn cache_ttl() -> Duration {
    Duration::seconds(CACHE_TTL_SECS)
}

/// Result of one upstream fetch.
///
/// Both sequences hold raw event lines; an event starting today appears in both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    pub all_events: Vec<String>,
    pub todays_events: Vec<String>,
}

/// Persisted cache record.
///
/// `timestamp` is the write time. Entries are replaced wholesale, never edited.
/// It is written as RFC 3339; a timestamp without an offset is read as local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub events: EventWindow,
}

impl CacheEntry {
    /// Stamp `events` with the current instant.
    pub fn new(events: EventWindow) -> Self {
        Self::written_at(events, Utc::now())
    }

    pub fn written_at(events: EventWindow, timestamp: DateTime<Utc>) -> Self {
        Self { timestamp, events }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.timestamp + cache_ttl()
    }

    /// Fresh iff `now < timestamp + TTL`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid cache timestamp `{}`", text)))
}

/// RFC 3339, or an ISO 8601 local date-time with no offset.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    let utc = match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Skipped by a DST jump.
        None => naive.and_utc(),
    };
    Some(utc)
}

/// Event as returned by the date-scoped query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredEvent {
    pub summary: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

/// `{"dateTime": "..."}` envelope expected by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
}

impl EventDateTime {
    pub fn new(date_time: impl Into<String>) -> Self {
        Self {
            date_time: date_time.into(),
        }
    }
}

// API Response Types

/// Google Calendar API event response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub summary: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

impl ApiEventTime {
    /// Timed events carry `dateTime`; all-day events only `date`.
    pub fn as_text(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// API response for event list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn entry_aged(age: Duration, now: DateTime<Utc>) -> CacheEntry {
        CacheEntry::written_at(EventWindow::default(), now - age)
    }

    #[test]
    fn test_fresh_just_inside_ttl() {
        let now = Utc::now();
        let entry = entry_aged(Duration::minutes(59) + Duration::seconds(59), now);
        assert!(entry.is_fresh_at(now));
    }

    #[test]
    fn test_stale_just_past_ttl() {
        let now = Utc::now();
        let entry = entry_aged(Duration::hours(1) + Duration::seconds(1), now);
        assert!(!entry.is_fresh_at(now));
    }

    #[test]
    fn test_stale_exactly_at_expiry() {
        let now = Utc::now();
        let entry = entry_aged(cache_ttl(), now);
        assert_eq!(entry.expires_at(), now);
        assert!(!entry.is_fresh_at(now));
    }

    #[test]
    fn test_new_entry_is_fresh() {
        assert!(CacheEntry::new(EventWindow::default()).is_fresh());
    }

    #[test]
    fn test_cache_entry_layout() {
        let json = r#"{
            "timestamp": "2024-05-01T08:00:00Z",
            "events": {
                "all_events": ["Summary: Standup, Start time: 2024-05-01T09:00:00, End time: 2024-05-01T09:15:00"],
                "todays_events": []
            }
        }"#;

        let entry: CacheEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.events.all_events.len(), 1);
        assert!(entry.events.todays_events.is_empty());
        assert_eq!(entry.timestamp.to_rfc3339(), "2024-05-01T08:00:00+00:00");
    }

    #[test]
    fn test_timestamp_without_offset_is_local_time() {
        let json = r#"{
            "timestamp": "2024-05-01T08:00:00.123456",
            "events": {"all_events": [], "todays_events": []}
        }"#;

        let entry: CacheEntry = serde_json::from_str(json).unwrap();
        let naive = NaiveDateTime::parse_from_str("2024-05-01T08:00:00.123456", "%Y-%m-%dT%H:%M:%S%.f")
            .unwrap();
        let expected = Local.from_local_datetime(&naive).earliest().unwrap();
        assert_eq!(entry.timestamp, expected.with_timezone(&Utc));
    }

    #[test]
    fn test_timestamp_is_written_as_rfc3339() {
        let entry = CacheEntry::written_at(
            EventWindow::default(),
            parse_timestamp("2024-05-01T08:00:00+02:00").unwrap(),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["timestamp"], "2024-05-01T06:00:00Z");
    }

    #[test]
    fn test_unparseable_timestamp_is_rejected() {
        assert!(parse_timestamp("yesterday").is_none());
        let json = r#"{"timestamp": "yesterday", "events": {"all_events": [], "todays_events": []}}"#;
        assert!(serde_json::from_str::<CacheEntry>(json).is_err());
    }

    #[test]
    fn test_structured_event_envelope() {
        let event = StructuredEvent {
            summary: "Standup".to_string(),
            start: EventDateTime::new("2024-05-01T09:00:00"),
            end: EventDateTime::new("2024-05-01T09:15:00"),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["summary"], "Standup");
        assert_eq!(value["start"]["dateTime"], "2024-05-01T09:00:00");
        assert_eq!(value["end"]["dateTime"], "2024-05-01T09:15:00");
    }

    #[test]
    fn test_api_event_time_prefers_date_time() {
        let json = r#"{
            "id": "event123",
            "summary": "Team Meeting",
            "start": {"dateTime": "2024-02-01T10:00:00Z", "date": "2024-02-01"},
            "end": {"date": "2024-02-02"}
        }"#;

        let api_event: ApiEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            api_event.start.as_ref().and_then(ApiEventTime::as_text),
            Some("2024-02-01T10:00:00Z")
        );
        assert_eq!(
            api_event.end.as_ref().and_then(ApiEventTime::as_text),
            Some("2024-02-02")
        );
    }
}
