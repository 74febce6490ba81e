//! Cache-or-fetch orchestration for calendar queries.
//!
//! Each call makes at most one upstream fetch:
//! fresh cache → return it; otherwise fetch, partition, save, return; on fetch
//! failure return whatever is cached, however old, or fail with
//! [`CalendarError::NoDataAvailable`].

use chrono::{Datelike, Duration, Local, NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::cache::CacheStore;
use crate::error::CalendarError;
use crate::filter;
use crate::source::EventSource;
use crate::types::{EventWindow, StructuredEvent};

/// Default cap on events requested per fetch.
pub const DEFAULT_MAX_RESULTS: u32 = 100;

/// Monday on or before `today`.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
}

/// Answers calendar queries from a [`CacheStore`] in front of an [`EventSource`].
///
/// Holds no state between calls beyond what the store persists.
pub struct CalendarCacheService<S, C> {
    source: S,
    cache: C,
    max_results: u32,
}

impl<S: EventSource, C: CacheStore> CalendarCacheService<S, C> {
    pub fn new(source: S, cache: C) -> Self {
        Self {
            source,
            cache,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Events of the current week, split into all and today's.
    ///
    /// # Errors
    /// `NoDataAvailable` when the fetch fails and nothing is cached.
    pub async fn get_current_window(&self, force_refresh: bool) -> Result<EventWindow, CalendarError> {
        if !force_refresh {
            match self.cache.load() {
                Some(entry) if entry.is_fresh() => {
                    debug!("Serving calendar events cached at {}", entry.timestamp);
                    return Ok(entry.events);
                }
                Some(entry) => debug!("Calendar cache from {} is stale", entry.timestamp),
                None => debug!("Calendar cache empty"),
            }
        }

        let start = week_start(Local::now().date_naive());
        match self.source.fetch(self.max_results, start).await {
            Ok(raw_events) => {
                let window = filter::partition_today(&raw_events);
                if let Err(e) = self.cache.save(&window) {
                    warn!("Serving fetched events without caching them: {}", e);
                }
                info!(
                    "Fetched {} calendar events ({} today)",
                    window.all_events.len(),
                    window.todays_events.len()
                );
                Ok(window)
            }
            Err(e) => {
                error!("Error fetching calendar events: {}", e);
                match self.cache.load() {
                    Some(entry) => {
                        let age = Utc::now() - entry.timestamp;
                        warn!(
                            "Serving cached calendar events from {} ({} minutes old) after fetch failure",
                            entry.timestamp,
                            age.num_minutes()
                        );
                        Ok(entry.events)
                    }
                    None => Err(CalendarError::NoDataAvailable),
                }
            }
        }
    }

    /// Structured events starting on `target_date` (`YYYY-MM-DD`, compared as text).
    ///
    /// Rides on the same fetch-or-cache path as [`Self::get_current_window`].
    /// Malformed lines are logged and dropped.
    ///
    /// # Errors
    /// `NoDataAvailable` when the fetch fails and nothing is cached.
    pub async fn get_window_for_date(
        &self,
        target_date: &str,
        force_refresh: bool,
    ) -> Result<Vec<StructuredEvent>, CalendarError> {
        let window = self.get_current_window(force_refresh).await?;
        Ok(filter::filter_by_date(&window.all_events, target_date).into_events())
    }
}
