//! Upstream event provider seam.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::CalendarError;

/// Provider of flattened event lines.
///
/// Each line is comma-space-joined `Key: Value` pairs carrying at least
/// `Summary`, `Start time` and `End time`.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch up to `limit` events starting on or after `start_date`.
    async fn fetch(&self, limit: u32, start_date: NaiveDate) -> Result<Vec<String>, CalendarError>;
}

#[async_trait]
impl<T: EventSource + ?Sized> EventSource for Box<T> {
    async fn fetch(&self, limit: u32, start_date: NaiveDate) -> Result<Vec<String>, CalendarError> {
        (**self).fetch(limit, start_date).await
    }
}
