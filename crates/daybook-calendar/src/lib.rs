//! Calendar event feed for Daybook.
//!
//! Wraps a slow upstream calendar behind a one-hour file cache, falls back to
//! stale data when the upstream fails, and answers date-scoped queries by
//! re-parsing the flattened event lines.

pub mod cache;
pub mod client;
pub mod error;
pub mod filter;
pub mod service;
pub mod source;
pub mod types;

pub use cache::{CacheStore, FileCacheStore, MemoryCacheStore};
pub use client::GoogleCalendarSource;
pub use error::CalendarError;
pub use filter::{FilterReport, RecordParseError, SkippedRecord};
pub use service::CalendarCacheService;
pub use source::EventSource;
pub use types::{CacheEntry, EventDateTime, EventWindow, StructuredEvent, CACHE_TTL_SECS};
