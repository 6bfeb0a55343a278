//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::debug;

use super::{next_origin, publish, KeyValueStore, StorageEvent, StorageEvents, EVENT_CAPACITY};
use crate::error::{StoreError, StoreResult};

#[derive(Debug)]
struct Shared {
    entries: Mutex<HashMap<String, String>>,
    /// Maximum Σ (key + value) bytes, like a browser's storage quota.
    quota: Option<usize>,
    events: broadcast::Sender<StorageEvent>,
}

/// A map in memory.
///
/// `shared_handle()` returns another handle on the same map with its own
/// origin, which is how tests (and the session) model a second tab.
#[derive(Debug)]
pub struct MemoryStore {
    shared: Arc<Shared>,
    origin: u64,
}

impl MemoryStore {
    /// Creates an empty store without a quota.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates an empty store that rejects writes growing it past `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self::build(Some(bytes))
    }

    fn build(quota: Option<usize>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        MemoryStore {
            shared: Arc::new(Shared {
                entries: Mutex::new(HashMap::new()),
                quota,
                events,
            }),
            origin: next_origin(),
        }
    }

    /// Another handle on the same entries, with a distinct origin.
    pub fn shared_handle(&self) -> Self {
        MemoryStore {
            shared: Arc::clone(&self.shared),
            origin: next_origin(),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.shared
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        {
            let mut entries = self.entries();

            if let Some(quota) = self.shared.quota {
                let others: usize = entries
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                let needed = others + key.len() + value.len();
                if needed > quota {
                    return Err(StoreError::QuotaExceeded {
                        key: key.to_string(),
                        needed,
                        quota,
                    });
                }
            }

            entries.insert(key.to_string(), value.to_string());
        }

        debug!(key, bytes = value.len(), "Memory store write");
        publish(&self.shared.events, self.origin, key, Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let existed = self.entries().remove(key).is_some();

        if existed {
            debug!(key, "Memory store remove");
            publish(&self.shared.events, self.origin, key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> StorageEvents {
        StorageEvents::new(self.shared.events.subscribe(), self.origin)
    }
}
