//! Decoding of flattened event lines and date-based filtering.
//!
//! A raw line looks like
//! `Summary: Standup, Start time: 2024-05-01T09:00:00, End time: 2024-05-01T09:15:00`.
//! Pairs are split on `", "`, then each pair on its first `": "`, so values may
//! contain `": "` but not `", "`.
//!
//! Dates are compared as the `YYYY-MM-DD` text before the `T` separator. No
//! timezone normalization happens: `2024-05-01T23:30:00-07:00` belongs to
//! `2024-05-01` whatever the local offset.

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::types::{EventDateTime, EventWindow, StructuredEvent};

pub const SUMMARY_KEY: &str = "Summary";
pub const START_KEY: &str = "Start time";
pub const END_KEY: &str = "End time";

const PAIR_SEPARATOR: &str = ", ";
const KEY_VALUE_SEPARATOR: &str = ": ";

/// Why a single line could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordParseError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
}

/// A line dropped during filtering, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub line: String,
    pub reason: RecordParseError,
}

/// Outcome of a date-scoped filter: matching events plus every malformed line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub events: Vec<StructuredEvent>,
    pub skipped: Vec<SkippedRecord>,
}

impl FilterReport {
    pub fn into_events(self) -> Vec<StructuredEvent> {
        self.events
    }
}

/// Split a line into its key/value pairs. A pair without `": "` maps to an empty value;
/// a repeated key keeps its last value.
fn split_fields(line: &str) -> HashMap<&str, &str> {
    line.split(PAIR_SEPARATOR)
        .map(|part| part.split_once(KEY_VALUE_SEPARATOR).unwrap_or((part, "")))
        .collect()
}

fn field<'a>(
    fields: &HashMap<&str, &'a str>,
    key: &'static str,
) -> Result<&'a str, RecordParseError> {
    fields
        .get(key)
        .copied()
        .ok_or(RecordParseError::MissingField(key))
}

/// Text before the first `T`, or the whole value when there is none.
fn date_component(value: &str) -> &str {
    value.split_once('T').map_or(value, |(date, _)| date)
}

/// Date component of the line's `Start time`.
pub fn start_date(line: &str) -> Result<&str, RecordParseError> {
    let fields = split_fields(line);
    field(&fields, START_KEY).map(date_component)
}

/// Decode one raw line into its structured form.
pub fn decode_record(line: &str) -> Result<StructuredEvent, RecordParseError> {
    let fields = split_fields(line);
    let summary = field(&fields, SUMMARY_KEY)?;
    let start = field(&fields, START_KEY)?;
    let end = field(&fields, END_KEY)?;

    Ok(StructuredEvent {
        summary: summary.to_string(),
        start: EventDateTime::new(start),
        end: EventDateTime::new(end),
    })
}

/// Partition `raw_events` against the local current date.
pub fn partition_today(raw_events: &[String]) -> EventWindow {
    partition_today_at(raw_events, Local::now().date_naive())
}

/// Partition `raw_events` against `today`.
///
/// Every line is kept in `all_events`; lines whose start date is unreadable are
/// logged and left out of `todays_events`.
pub fn partition_today_at(raw_events: &[String], today: NaiveDate) -> EventWindow {
    let today = today.format("%Y-%m-%d").to_string();

    let todays_events = raw_events
        .iter()
        .filter(|line| match start_date(line) {
            Ok(date) => date == today,
            Err(e) => {
                error!("Error processing event {:?}: {}", line, e);
                false
            }
        })
        .cloned()
        .collect::<Vec<_>>();

    debug!(
        "Partitioned {} events, {} today ({})",
        raw_events.len(),
        todays_events.len(),
        today
    );

    EventWindow {
        all_events: raw_events.to_vec(),
        todays_events,
    }
}

/// Decode every line and keep the events starting on `target_date` (`YYYY-MM-DD`).
pub fn filter_by_date(raw_events: &[String], target_date: &str) -> FilterReport {
    let mut report = FilterReport::default();

    for line in raw_events {
        match decode_record(line) {
            Ok(event) if date_component(&event.start.date_time) == target_date => {
                report.events.push(event);
            }
            Ok(_) => {}
            Err(reason) => {
                error!("Error processing event {:?}: {}", line, reason);
                report.skipped.push(SkippedRecord {
                    line: line.clone(),
                    reason,
                });
            }
        }
    }

    info!(
        "Found {} events for date {} ({} malformed)",
        report.events.len(),
        target_date,
        report.skipped.len()
    );

    report
}
