//! JSON-file key-value store.
//!
//! ## File Layout
//! ```text
//! <data_dir>/storage.json
//! {
//!   "admin_unlocked": "true",
//!   "orders": "[{\"id\":\"3F9A1C0B2\", ...}]"
//! }
//! ```
//!
//! Values are stored as strings exactly like browser local storage, so the
//! `orders` entry is the same text that export produces.
//!
//! ## Write Path
//! Every write re-reads the file, applies the change, writes
//! `storage.json.tmp` and renames it over `storage.json`. A crash mid-write
//! leaves the previous file intact. Re-reading first means another process
//! writing a *different* key is not clobbered; two processes writing the same
//! key still resolve last-writer-wins.
//!
//! ## Changes From Other Processes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process A                         process B                            │
//! │  ─────────                         ─────────                            │
//! │  set("orders") ──► storage.json                                         │
//! │                         │                                               │
//! │                         └──── try_next(): re-read, diff with `seen` ──► │
//! │                               StorageEvent { "orders", new value }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Each open file keeps `seen`, the contents as this process last read or
//! wrote them. A subscription with an empty queue re-reads the file and
//! broadcasts every difference. A write also reports differences on the
//! keys it does not touch; the key being written is simply overwritten.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{
    next_origin, publish, ExternalWatch, KeyValueStore, StorageEvent, StorageEvents,
    EVENT_CAPACITY, EXTERNAL_ORIGIN,
};
use crate::error::{StoreError, StoreResult};

/// Default file name inside the data directory.
pub const STORAGE_FILE_NAME: &str = "storage.json";

type Entries = BTreeMap<String, String>;

#[derive(Debug)]
struct Shared {
    path: PathBuf,
    /// File contents as last read or written by this process. The lock also
    /// serializes read-modify-write cycles within the process.
    seen: Mutex<Entries>,
    events: broadcast::Sender<StorageEvent>,
}

impl Shared {
    fn lock_seen(&self) -> MutexGuard<'_, Entries> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_entries(&self) -> StoreResult<Entries> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(err) => return Err(err.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&contents).map_err(|e| StoreError::StorageFormat {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn write_entries(&self, entries: &Entries) -> StoreResult<()> {
        let contents = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Broadcasts every key where `current` differs from `seen`, except
    /// `skip`, then remembers `current`.
    fn absorb(&self, seen: &mut Entries, current: Entries, skip: Option<&str>) -> usize {
        let mut changed = 0;

        for (key, value) in &current {
            if seen.get(key) != Some(value) && Some(key.as_str()) != skip {
                publish(&self.events, EXTERNAL_ORIGIN, key, Some(value));
                changed += 1;
            }
        }
        for key in seen.keys() {
            if !current.contains_key(key) && Some(key.as_str()) != skip {
                publish(&self.events, EXTERNAL_ORIGIN, key, None);
                changed += 1;
            }
        }

        if changed > 0 {
            debug!(path = ?self.path, changed, "Storage file changed by another process");
        }
        *seen = current;
        changed
    }
}

impl ExternalWatch for Shared {
    fn poll(&self) {
        let mut seen = self.lock_seen();
        match self.read_entries() {
            Ok(current) => {
                self.absorb(&mut seen, current, None);
            }
            Err(err) => warn!(path = ?self.path, error = %err, "Could not re-read storage file"),
        }
    }
}

/// A key-value store persisted as one JSON object file.
#[derive(Debug)]
pub struct FileStore {
    shared: Arc<Shared>,
    origin: u64,
}

impl FileStore {
    /// Opens (or prepares) `storage.json` inside `data_dir`.
    ///
    /// The directory is created if needed; the file itself is created on the
    /// first write. An existing file must be a JSON object of strings.
    pub fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let shared = Shared {
            path: data_dir.join(STORAGE_FILE_NAME),
            seen: Mutex::new(Entries::new()),
            events,
        };

        // Fail early on a damaged file rather than on the first command
        let entries = shared.read_entries()?;
        info!(path = ?shared.path, keys = entries.len(), "Storage file opened");
        *shared.lock_seen() = entries;

        Ok(FileStore {
            shared: Arc::new(shared),
            origin: next_origin(),
        })
    }

    /// Another handle on the same file, with a distinct origin.
    pub fn shared_handle(&self) -> Self {
        FileStore {
            shared: Arc::clone(&self.shared),
            origin: next_origin(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    fn modify<F>(&self, key: &str, f: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut Entries) -> bool,
    {
        let mut seen = self.shared.lock_seen();

        let mut entries = self.shared.read_entries()?;
        self.shared.absorb(&mut seen, entries.clone(), Some(key));

        let changed = f(&mut entries);
        if changed {
            self.shared.write_entries(&entries)?;
            *seen = entries;
        }
        Ok(changed)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.shared.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.modify(key, |entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })?;

        debug!(key, bytes = value.len(), "Storage file write");
        publish(&self.shared.events, self.origin, key, Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let existed = self.modify(key, |entries| entries.remove(key).is_some())?;

        if existed {
            debug!(key, "Storage file remove");
            publish(&self.shared.events, self.origin, key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> StorageEvents {
        let watch: Arc<dyn ExternalWatch> = self.shared.clone();
        StorageEvents::watching(self.shared.events.subscribe(), self.origin, watch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("orders").unwrap(), None);
        assert!(!store.path().exists()); // Created lazily
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("orders", "[]").unwrap();
            store.set("admin_unlocked", "true").unwrap();
            store.remove("admin_unlocked").unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("orders").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get("admin_unlocked").unwrap(), None);
        assert!(!dir.path().join("storage.json.tmp").exists());
    }

    #[test]
    fn test_creates_nested_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let store = FileStore::open(&nested).unwrap();
        store.set("k", "v").unwrap();
        assert!(nested.join(STORAGE_FILE_NAME).exists());
    }

    #[test]
    fn test_damaged_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORAGE_FILE_NAME), "{not json").unwrap();

        let err = FileStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::StorageFormat { .. }));
    }

    #[test]
    fn test_two_processes_keep_each_others_keys() {
        let dir = tempfile::tempdir().unwrap();
        // Two independent opens model two processes on one file
        let first = FileStore::open(dir.path()).unwrap();
        let second = FileStore::open(dir.path()).unwrap();

        first.set("orders", "[]").unwrap();
        second.set("admin_unlocked", "true").unwrap();

        assert_eq!(first.get("admin_unlocked").unwrap().as_deref(), Some("true"));
        assert_eq!(second.get("orders").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_events_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        let tab_a = FileStore::open(dir.path()).unwrap();
        let tab_b = tab_a.shared_handle();
        let mut b_events = tab_b.subscribe();
        let mut a_events = tab_a.subscribe();

        tab_a.set("orders", "[]").unwrap();

        assert!(a_events.try_next().is_none());
        let event = b_events.try_next().unwrap();
        assert_eq!(event.key, "orders");
        assert_eq!(event.new_value.as_deref(), Some("[]"));
    }

    #[test]
    fn test_events_from_another_process() {
        let dir = tempfile::tempdir().unwrap();
        let process_a = FileStore::open(dir.path()).unwrap();
        let process_b = FileStore::open(dir.path()).unwrap();
        let mut a_events = process_a.subscribe();
        let mut b_events = process_b.subscribe();

        process_a.set("orders", "[]").unwrap();
        process_a.set("admin_unlocked", "true").unwrap();

        let mut seen_by_b = b_events.drain();
        seen_by_b.sort_by(|x, y| x.key.cmp(&y.key));
        let keys: Vec<&str> = seen_by_b.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["admin_unlocked", "orders"]);
        assert_eq!(seen_by_b[1].new_value.as_deref(), Some("[]"));

        // Nothing new until the file changes again
        assert!(b_events.try_next().is_none());
        // A never hears its own writes back from the file
        assert!(a_events.try_next().is_none());

        process_a.remove("admin_unlocked").unwrap();
        let event = b_events.try_next().unwrap();
        assert_eq!(event.key, "admin_unlocked");
        assert_eq!(event.new_value, None);
    }

    #[test]
    fn test_write_reports_other_keys_changed_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let process_a = FileStore::open(dir.path()).unwrap();
        let process_b = FileStore::open(dir.path()).unwrap();
        let mut b_events = process_b.subscribe();

        process_a.set("admin_unlocked", "true").unwrap();
        process_a.set("orders", "[]").unwrap();
        // B overwrites `orders` before looking for events
        process_b.set("orders", "[1]").unwrap();

        let events = b_events.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, "admin_unlocked");
        assert_eq!(process_a.get("orders").unwrap().as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn test_async_next_sees_other_process() {
        let dir = tempfile::tempdir().unwrap();
        let process_a = FileStore::open(dir.path()).unwrap();
        let process_b = FileStore::open(dir.path()).unwrap();
        let mut b_events = process_b.subscribe();

        process_a.set("orders", "[]").unwrap();

        let event = b_events.next().await.unwrap();
        assert_eq!(event.key, "orders");
    }
}
