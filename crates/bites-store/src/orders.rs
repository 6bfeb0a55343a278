//! # Order Store
//!
//! The durable order log: persisted under the `orders` key, merged from
//! other devices by manual export/import.
//!
//! ## Order Log Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Log Lifecycle                               │
//! │                                                                         │
//! │  1. OPEN                                                               │
//! │     └── open() → parse `orders` (absent → empty, garbage → error)      │
//! │                                                                         │
//! │  2. RECORD (each checkout)                                             │
//! │     └── record(order) → insert by time → write → swap in memory        │
//! │                                                                         │
//! │  3. EXPORT / IMPORT (device A → clipboard → device B)                  │
//! │     └── export() → JSON array text                                     │
//! │     └── import(text) → validate → merge by id → sort → write           │
//! │                                                                         │
//! │  4. EXTERNAL CHANGE (another tab wrote `orders`)                       │
//! │     └── on_external_change() → replace in-memory log                   │
//! │                                                                         │
//! │  5. RESET (admin, confirmed)                                           │
//! │     └── reset(true) → empty log, key removed                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! The log is newest-first by timestamp. A freshly recorded order is
//! normally the newest and goes to the front; imports from a device with a
//! clock running ahead can be newer, so `record` inserts by timestamp.
//! Imports re-sort the whole log.
//!
//! ## Write-Then-Swap
//! Mutations build the next log aside, persist it, and only then replace the
//! in-memory copy. A failed write leaves the caller looking at the previous
//! state, in memory and on disk.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use bites_core::validation::validate_order;
use bites_core::{Order, OrderStats};

use crate::error::{StoreError, StoreResult};
use crate::kv::{SharedKv, StorageEvents};
use crate::{CORRUPT_BACKUP_KEY, ORDERS_KEY};

/// The order log and its persistence.
pub struct OrderStore {
    kv: SharedKv,
    orders: Vec<Order>,
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore")
            .field("orders", &self.orders.len())
            .finish_non_exhaustive()
    }
}

impl OrderStore {
    /// Opens the store, restoring the persisted log.
    ///
    /// ## Errors
    /// - [`StoreError::PersistedDataCorrupt`] if `orders` holds something
    ///   that is not an order array. Nothing is modified.
    pub fn open(kv: SharedKv) -> StoreResult<Self> {
        let mut store = OrderStore {
            kv,
            orders: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Opens the store, starting fresh if the persisted log is unreadable.
    ///
    /// The unreadable text is copied to `orders.corrupt` before anything can
    /// overwrite it, and the corruption error is handed back so the caller can
    /// tell the operator that history is unavailable.
    ///
    /// ## Errors
    /// Backend failures (including failing to write the backup) are returned
    /// as `Err`; only data corruption is recovered from.
    pub fn open_or_fresh(kv: SharedKv) -> StoreResult<(Self, Option<StoreError>)> {
        match Self::open(kv.clone()) {
            Ok(store) => Ok((store, None)),
            Err(err @ StoreError::PersistedDataCorrupt { .. }) => {
                if let Some(raw) = kv.get(ORDERS_KEY)? {
                    kv.set(CORRUPT_BACKUP_KEY, &raw)?;
                }
                warn!(
                    error = %err,
                    backup_key = CORRUPT_BACKUP_KEY,
                    "Order history unavailable, starting fresh"
                );
                let store = OrderStore {
                    kv,
                    orders: Vec::new(),
                };
                Ok((store, Some(err)))
            }
            Err(err) => Err(err),
        }
    }

    /// Replaces the in-memory log with the persisted one.
    ///
    /// On error the in-memory log is unchanged.
    pub fn load(&mut self) -> StoreResult<()> {
        let raw = self.kv.get(ORDERS_KEY)?;
        self.orders = parse_persisted(raw.as_deref())?;
        info!(orders = self.orders.len(), "Order log loaded");
        Ok(())
    }

    /// Adds a freshly checked-out order and persists the log.
    ///
    /// The order lands ahead of every order stamped at or before it, which
    /// is the front of the log unless a clock-skewed import is newer.
    ///
    /// ## Errors
    /// - [`StoreError::DuplicateOrder`] if the id is already recorded
    /// - Any storage error from the write (state unchanged)
    pub fn record(&mut self, order: Order) -> StoreResult<()> {
        if self.get(order.id()).is_some() {
            return Err(StoreError::DuplicateOrder(order.id().to_string()));
        }

        let order_id = order.id().to_string();
        let total = order.total_points();

        // Position 0 unless an imported order is stamped later than this one
        let at = self
            .orders
            .partition_point(|o| o.timestamp() > order.timestamp());
        let mut next = self.orders.clone();
        next.insert(at, order);

        self.persist(&next)?;
        self.orders = next;

        info!(order_id = %order_id, total_points = total.value(), "Order recorded");
        Ok(())
    }

    /// Serializes the full log; the same JSON array persisted under `orders`.
    pub fn export(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(&self.orders)?)
    }

    /// Merges a JSON array of orders produced by [`OrderStore::export`].
    ///
    /// ## Merge Rules
    /// - An incoming order is added only if its id is not already present
    /// - Same id, different content: the existing order wins, silently
    /// - Repeated ids inside the batch: the first occurrence wins
    /// - The merged log is re-sorted newest-first and persisted
    ///
    /// ## Returns
    /// How many orders were added. `0` leaves storage untouched.
    ///
    /// ## Errors
    /// [`StoreError::MalformedImport`] if the text is not an array of valid
    /// orders; nothing is merged in that case.
    pub fn import(&mut self, serialized: &str) -> StoreResult<usize> {
        let incoming: Vec<Order> = serde_json::from_str(serialized.trim())
            .map_err(|e| StoreError::malformed(e.to_string()))?;

        for order in &incoming {
            validate_order(order).map_err(|e| StoreError::malformed(e.to_string()))?;
        }

        let received = incoming.len();
        let mut known: HashSet<String> = self.orders.iter().map(|o| o.id().to_string()).collect();
        let mut next = self.orders.clone();

        for order in incoming {
            if known.insert(order.id().to_string()) {
                next.push(order);
            } else {
                debug!(order_id = %order.id(), "Skipping already known order");
            }
        }

        let merged = next.len() - self.orders.len();
        if merged == 0 {
            info!(received, "Import contained no new orders");
            return Ok(0);
        }

        sort_newest_first(&mut next);
        self.persist(&next)?;
        self.orders = next;

        info!(received, merged, total = self.orders.len(), "Orders imported");
        Ok(merged)
    }

    /// Deletes the whole log and the persisted key.
    ///
    /// Destructive and irreversible, so the caller must pass
    /// `confirmed = true`.
    pub fn reset(&mut self, confirmed: bool) -> StoreResult<()> {
        if !confirmed {
            return Err(StoreError::ResetNotConfirmed);
        }

        self.kv.remove(ORDERS_KEY)?;
        let removed = std::mem::take(&mut self.orders).len();

        warn!(removed, "Order log reset");
        Ok(())
    }

    /// Aggregate figures over the log.
    pub fn stats(&self) -> OrderStats {
        OrderStats::from_orders(&self.orders)
    }

    /// Applies a change made to storage by another handle.
    ///
    /// ## Returns
    /// `true` if the in-memory log was replaced, `false` for unrelated keys.
    ///
    /// ## Errors
    /// [`StoreError::PersistedDataCorrupt`] if the new value is not an order
    /// array; the in-memory log is kept as it was.
    pub fn on_external_change(&mut self, key: &str, new_value: Option<&str>) -> StoreResult<bool> {
        if key != ORDERS_KEY {
            return Ok(false);
        }

        self.orders = parse_persisted(new_value)?;
        info!(orders = self.orders.len(), "Order log refreshed from external change");
        Ok(true)
    }

    /// Applies every pending event from `events`.
    ///
    /// Stops at the first unreadable value and returns its error; later events
    /// stay queued for the next call.
    pub fn sync_external(&mut self, events: &mut StorageEvents) -> StoreResult<usize> {
        let mut applied = 0;
        while let Some(event) = events.try_next() {
            if self.on_external_change(&event.key, event.new_value.as_deref())? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Newest-first view of the log.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id() == order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn persist(&self, orders: &[Order]) -> StoreResult<()> {
        let json = serde_json::to_string(orders)?;
        self.kv.set(ORDERS_KEY, &json)
    }
}

fn parse_persisted(raw: Option<&str>) -> StoreResult<Vec<Order>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let mut orders: Vec<Order> =
        serde_json::from_str(raw).map_err(|e| StoreError::corrupt(ORDERS_KEY, e.to_string()))?;
    sort_newest_first(&mut orders);
    Ok(orders)
}

/// Stable sort, so equal timestamps keep their relative order.
fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}

// =============================================================================
// Unit Tests
// =============================================================================
