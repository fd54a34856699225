use std::path::PathBuf;
use std::sync::Arc;

use log::warn;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// The locally persisted watch state, one record per viewer profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRecord {
    /// Seconds spent actively watching so far
    pub time: u64,
    /// The day stamp those seconds were accumulated on
    pub date: String,
}

/// Represents a place the watch record is kept between sessions
pub trait WatchStore: Send + Sync {
    fn load(&self) -> Option<WatchRecord>;
    fn save(&self, record: &WatchRecord);
}

impl<T> WatchStore for Arc<T>
where
    T: WatchStore + ?Sized,
{
    fn load(&self) -> Option<WatchRecord> {
        (**self).load()
    }

    fn save(&self, record: &WatchRecord) {
        (**self).save(record)
    }
}

/// Keeps the watch record in memory only
#[derive(Debug, Default)]
pub struct MemoryWatchStore {
    record: Mutex<Option<WatchRecord>>,
}

impl MemoryWatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: WatchRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl WatchStore for MemoryWatchStore {
    fn load(&self) -> Option<WatchRecord> {
        self.record.lock().clone()
    }

    fn save(&self, record: &WatchRecord) {
        *self.record.lock() = Some(record.clone())
    }
}

/// Keeps the watch record in a JSON file. Failures are not fatal, the
/// worst case is a free viewer starting over with a fresh budget.
#[derive(Debug)]
pub struct FileWatchStore {
    path: PathBuf,
}

impl FileWatchStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WatchStore for FileWatchStore {
    fn load(&self) -> Option<WatchRecord> {
        let contents = std::fs::read_to_string(&self.path).ok()?;

        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("Discarding unreadable watch record: {}", err);
                None
            }
        }
    }

    fn save(&self, record: &WatchRecord) {
        let contents = serde_json::to_string(record).expect("watch record serializes");

        if let Err(err) = std::fs::write(&self.path, contents) {
            warn!("Failed to save watch record: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let store = MemoryWatchStore::new();
        assert_eq!(store.load(), None);

        let record = WatchRecord {
            time: 120,
            date: "2023-01-01".to_string(),
        };

        store.save(&record);
        assert_eq!(store.load(), Some(record));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join("gridcast-watch-record-test.json");
        let store = FileWatchStore::new(&path);

        let record = WatchRecord {
            time: 45,
            date: "2023-06-15".to_string(),
        };

        store.save(&record);
        assert_eq!(store.load(), Some(record));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_missing_is_none() {
        let store = FileWatchStore::new("/nonexistent/gridcast-watch-record.json");
        assert_eq!(store.load(), None);
    }
}
