//! # Session
//!
//! Everything one storefront session holds, opened against a key-value
//! store.
//!
//! ## Startup
//! 1. Subscribe to storage events (before reading, so no change is missed)
//! 2. Open the order log, starting fresh if it is unreadable
//! 3. Read the admin flag
//! 4. Start with an empty cart and an idle admin gate

use std::time::Duration;

use tracing::{debug, info, warn};

use bites_core::{AdminGate, CartLedger};
use bites_store::{AdminFlag, OrderStore, SharedKv, StorageEvents, StoreError, StoreResult};

use super::Catalog;
use crate::config::StorefrontConfig;
use crate::error::ApiError;

/// State of one storefront session.
#[derive(Debug)]
pub struct Session {
    pub store_name: String,
    pub catalog: Catalog,
    pub cart: CartLedger,
    pub orders: OrderStore,
    pub admin: AdminFlag,
    pub gate: AdminGate,
    pub recommend_timeout: Duration,
    events: StorageEvents,
}

impl Session {
    /// Opens a session on `kv`.
    ///
    /// ## Returns
    /// The session plus, if the persisted order log was unreadable, the error
    /// that made it start fresh (the raw value is kept under
    /// `orders.corrupt`).
    pub fn open(kv: SharedKv, config: &StorefrontConfig) -> StoreResult<(Self, Option<StoreError>)> {
        let events = kv.subscribe();
        let (orders, warning) = OrderStore::open_or_fresh(kv.clone())?;
        let admin = AdminFlag::load(kv)?;

        info!(
            orders = orders.len(),
            admin = admin.is_unlocked(),
            "Session opened"
        );

        let session = Session {
            store_name: config.store.name.clone(),
            catalog: Catalog::new(config.catalog.clone()),
            cart: CartLedger::new(),
            orders,
            admin,
            gate: config.admin_gate(),
            recommend_timeout: config.recommend_timeout(),
            events,
        };
        Ok((session, warning))
    }

    /// Applies storage changes made by other sessions since the last call.
    ///
    /// Unreadable order data from elsewhere is logged and skipped; this
    /// session keeps showing what it had.
    pub fn sync_external(&mut self) -> usize {
        let mut applied = 0;

        for event in self.events.drain() {
            let new_value = event.new_value.as_deref();

            match self.orders.on_external_change(&event.key, new_value) {
                Ok(true) => applied += 1,
                Ok(false) => {}
                Err(err) => warn!(error = %err, "Ignoring unreadable external order log"),
            }

            if self.admin.on_external_change(&event.key, new_value) {
                applied += 1;
            }
        }

        if applied > 0 {
            debug!(applied, "External storage changes applied");
        }
        applied
    }

    /// Fails unless admin mode is on.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.admin.is_unlocked() {
            Ok(())
        } else {
            Err(ApiError::admin_required())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use bites_store::{FileStore, KeyValueStore, MemoryStore, ADMIN_KEY, ORDERS_KEY};
    use std::sync::Arc;

    #[test]
    fn test_open_fresh() {
        let kv = Arc::new(MemoryStore::new());
        let (session, warning) = Session::open(kv, &StorefrontConfig::default()).unwrap();

        assert!(warning.is_none());
        assert!(session.cart.is_empty());
        assert!(session.orders.is_empty());
        assert!(!session.admin.is_unlocked());
        assert_eq!(session.catalog.products().len(), 2);
        assert_eq!(session.gate.threshold(), 5);
    }

    #[test]
    fn test_open_with_corrupt_orders() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(ORDERS_KEY, "not json").unwrap();

        let (session, warning) = Session::open(kv, &StorefrontConfig::default()).unwrap();
        assert!(matches!(warning, Some(StoreError::PersistedDataCorrupt { .. })));
        assert!(session.orders.is_empty());
    }

    #[test]
    fn test_require_admin() {
        let kv = Arc::new(MemoryStore::new());
        let (mut session, _) = Session::open(kv, &StorefrontConfig::default()).unwrap();

        let err = session.require_admin().unwrap_err();
        assert_eq!(err.code, ErrorCode::AdminRequired);

        session.admin.set_unlocked(true).unwrap();
        assert!(session.require_admin().is_ok());
    }

    #[test]
    fn test_sync_from_other_session() {
        let config = StorefrontConfig::default();
        let tab_a = Arc::new(MemoryStore::new());
        let tab_b = Arc::new(tab_a.shared_handle());
        let (mut a, _) = Session::open(tab_a, &config).unwrap();
        let (mut b, _) = Session::open(tab_b, &config).unwrap();

        let chaat = a.catalog.get("berry-merry-chaat").unwrap().clone();
        a.cart.add(&chaat);
        a.orders.record(a.cart.checkout().unwrap()).unwrap();
        a.admin.set_unlocked(true).unwrap();

        assert_eq!(b.sync_external(), 2);
        assert_eq!(b.orders.len(), 1);
        assert!(b.admin.is_unlocked());

        // Own writes are not echoed back
        assert_eq!(a.sync_external(), 0);
    }

    #[test]
    fn test_sync_between_processes_sharing_a_data_dir() {
        let config = StorefrontConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let open = || {
            let kv = Arc::new(FileStore::open(dir.path()).unwrap());
            Session::open(kv, &config).unwrap().0
        };
        let mut a = open();
        let mut b = open();
        let chaat = a.catalog.get("berry-merry-chaat").unwrap().clone();

        a.cart.add(&chaat);
        a.orders.record(a.cart.checkout().unwrap()).unwrap();

        assert_eq!(b.sync_external(), 1);
        b.cart.add(&chaat);
        b.orders.record(b.cart.checkout().unwrap()).unwrap();
        assert_eq!(b.orders.len(), 2);

        // Neither order is lost for the next session on the directory
        let reopened = open();
        assert_eq!(reopened.orders.len(), 2);
        assert_eq!(a.sync_external(), 1);
        assert_eq!(a.orders.orders(), reopened.orders.orders());
    }

    #[test]
    fn test_sync_skips_unreadable_external_orders() {
        let config = StorefrontConfig::default();
        let tab_a = Arc::new(MemoryStore::new());
        let tab_b = Arc::new(tab_a.shared_handle());
        let (mut b, _) = Session::open(tab_b, &config).unwrap();

        tab_a.set(ORDERS_KEY, "{broken").unwrap();
        tab_a.set(ADMIN_KEY, "true").unwrap();

        assert_eq!(b.sync_external(), 1);
        assert!(b.orders.is_empty());
        assert!(b.admin.is_unlocked());
    }
}
