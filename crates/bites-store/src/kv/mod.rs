//! # Key-Value Storage
//!
//! The only shared resource in the system: a string-to-string store with
//! "changed elsewhere" notifications.
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     KeyValueStore implementations                       │
//! │                                                                         │
//! │  ┌────────────────────────────┐   ┌────────────────────────────────┐   │
//! │  │  MemoryStore (memory.rs)   │   │  FileStore (file.rs)           │   │
//! │  │                            │   │                                │   │
//! │  │  HashMap behind a Mutex    │   │  storage.json in the data dir  │   │
//! │  │  optional byte quota       │   │  temp file + rename on write   │   │
//! │  │  tests, --memory sessions  │   │  survives restarts             │   │
//! │  └────────────────────────────┘   └────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Events
//! Every handle has an *origin*. A write through one handle is broadcast to
//! all subscribers, and each subscription filters out its own origin. Two
//! handles on one backing store therefore behave like two browser tabs: a tab
//! hears about the other tab's writes, never its own.
//!
//! ```text
//!   handle A ──set("orders")──► backing map
//!                    │
//!                    └──► broadcast StorageEvent { key, new_value, origin: A }
//!                                   │                         │
//!                       A's subscription (dropped)   B's subscription ──► B refreshes
//! ```
//!
//! A `FileStore` is also shared between *processes*: two `bites` sessions on
//! one data directory. Those writes never pass through this process's
//! channel, so a file subscription re-reads `storage.json` when its queue is
//! empty and reports every key that differs from what this process last saw.
//!
//! Last writer wins; there are no transactions across handles.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::warn;

use crate::error::StoreResult;

/// Capacity of the storage event channel.
///
/// Slow subscribers that fall further behind lose the oldest events (and are
/// told so); for this workload that means a refresh is applied late, not lost,
/// since every event carries the full new value.
pub(crate) const EVENT_CAPACITY: usize = 64;

/// How often a waiting file subscription re-reads the file.
pub const WATCH_INTERVAL: Duration = Duration::from_millis(500);

/// Origin of changes found on disk, written by another process.
pub(crate) const EXTERNAL_ORIGIN: u64 = 0;

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-unique handle origin.
pub(crate) fn next_origin() -> u64 {
    NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed)
}

/// A string key-value store.
///
/// Methods take `&self`; implementations synchronize internally so one store
/// can be shared between the Order Store and the admin flag.
pub trait KeyValueStore: Send + Sync {
    /// Reads a key. `Ok(None)` when absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes a key. Absent keys are not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Subscribes to writes made through *other* handles.
    fn subscribe(&self) -> StorageEvents;
}

/// A backing store that other processes can change behind our back.
///
/// `poll` compares what is there now with what this process last saw and
/// broadcasts a [`StorageEvent`] with [`EXTERNAL_ORIGIN`] for each difference.
pub(crate) trait ExternalWatch: Send + Sync + std::fmt::Debug {
    fn poll(&self);
}

/// Shared handle to a key-value store.
pub type SharedKv = Arc<dyn KeyValueStore>;

/// A key changed. `new_value` is `None` when the key was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
    pub(crate) origin: u64,
}

/// Subscription to storage events from other handles.
///
/// Subscriptions on a [`FileStore`] also watch the file itself, so writes
/// made by another process on the same data directory show up here too.
#[derive(Debug)]
pub struct StorageEvents {
    rx: broadcast::Receiver<StorageEvent>,
    origin: u64,
    watch: Option<Arc<dyn ExternalWatch>>,
}

impl StorageEvents {
    pub(crate) fn new(rx: broadcast::Receiver<StorageEvent>, origin: u64) -> Self {
        StorageEvents {
            rx,
            origin,
            watch: None,
        }
    }

    pub(crate) fn watching(
        rx: broadcast::Receiver<StorageEvent>,
        origin: u64,
        watch: Arc<dyn ExternalWatch>,
    ) -> Self {
        StorageEvents {
            rx,
            origin,
            watch: Some(watch),
        }
    }

    /// Returns the next pending foreign event without waiting.
    ///
    /// When nothing is queued, the backing file (if any) is checked once for
    /// changes made outside this process.
    pub fn try_next(&mut self) -> Option<StorageEvent> {
        if let Some(event) = self.recv_queued() {
            return Some(event);
        }

        self.watch.as_ref()?.poll();
        self.recv_queued()
    }

    /// Waits for the next foreign event.
    ///
    /// Without a file watch this returns `None` once every handle is gone; a
    /// watching subscription polls every [`WATCH_INTERVAL`] and never ends.
    pub async fn next(&mut self) -> Option<StorageEvent> {
        if self.watch.is_some() {
            loop {
                if let Some(event) = self.try_next() {
                    return Some(event);
                }
                tokio::time::sleep(WATCH_INTERVAL).await;
            }
        }

        loop {
            match self.rx.recv().await {
                Ok(event) if event.origin == self.origin => continue,
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Storage event subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn recv_queued(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if event.origin == self.origin => continue,
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Storage event subscriber lagged");
                    continue;
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drains every pending foreign event.
    pub fn drain(&mut self) -> Vec<StorageEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

/// Broadcasts a change. Having no subscribers is normal.
pub(crate) fn publish(
    tx: &broadcast::Sender<StorageEvent>,
    origin: u64,
    key: &str,
    new_value: Option<&str>,
) {
    let _ = tx.send(StorageEvent {
        key: key.to_string(),
        new_value: new_value.map(str::to_string),
        origin,
    });
}
