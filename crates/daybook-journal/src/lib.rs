//! Journal entries stored as markdown files in a single directory.

pub mod entry;
pub mod error;
pub mod store;

pub use entry::EntrySummary;
pub use error::{JournalError, JournalResult};
pub use store::JournalStore;
