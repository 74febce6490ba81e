//! Single-record cache for the last fetched event window.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::CalendarError;
use crate::types::{CacheEntry, EventWindow};

/// Storage for the one cached [`CacheEntry`].
///
/// `load` never fails: an absent, unreadable or malformed record is a miss.
/// Freshness is left to the caller.
pub trait CacheStore: Send + Sync {
    fn load(&self) -> Option<CacheEntry>;

    /// Replace the stored record with `window` stamped at the current instant.
    fn save(&self, window: &EventWindow) -> Result<CacheEntry, CalendarError>;
}

impl<T: CacheStore + ?Sized> CacheStore for Box<T> {
    fn load(&self) -> Option<CacheEntry> {
        (**self).load()
    }

    fn save(&self, window: &EventWindow) -> Result<CacheEntry, CalendarError> {
        (**self).save(window)
    }
}

/// JSON file cache.
///
/// Writes go to a temp file in the same directory and are renamed over the
/// target, so readers see either the old or the new record. Saves are
/// serialized; loads take no lock.
pub struct FileCacheStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCacheStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn write_entry(&self, entry: &CacheEntry) -> io::Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, entry)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> Option<CacheEntry> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No calendar cache at {}", self.path.display());
                return None;
            }
            Err(e) => {
                debug!("Calendar cache unreadable at {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Ignoring malformed calendar cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, window: &EventWindow) -> Result<CacheEntry, CalendarError> {
        let _guard = self.write_lock.lock();
        let entry = CacheEntry::new(window.clone());

        self.write_entry(&entry)
            .map_err(|e| CalendarError::CacheWrite(format!("{}: {}", self.path.display(), e)))?;

        debug!(
            "Cached {} events at {}",
            entry.events.all_events.len(),
            self.path.display()
        );
        Ok(entry)
    }
}

/// In-process cache, for tests and embedding.
#[derive(Default)]
pub struct MemoryCacheStore {
    entry: RwLock<Option<CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `entry` already cached.
    pub fn with_entry(entry: CacheEntry) -> Self {
        Self {
            entry: RwLock::new(Some(entry)),
        }
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self) -> Option<CacheEntry> {
        self.entry.read().clone()
    }

    fn save(&self, window: &EventWindow) -> Result<CacheEntry, CalendarError> {
        let entry = CacheEntry::new(window.clone());
        *self.entry.write() = Some(entry.clone());
        Ok(entry)
    }
}
