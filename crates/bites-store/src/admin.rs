//! Persisted admin-mode flag.
//!
//! Stored under `admin_unlocked` as the literal `"true"`. Locking removes the
//! key rather than writing `"false"`, so any other value (or none) reads as
//! locked.

use tracing::info;

use crate::error::StoreResult;
use crate::kv::SharedKv;
use crate::ADMIN_KEY;

const UNLOCKED: &str = "true";

/// Whether admin mode is on, mirrored to storage.
pub struct AdminFlag {
    kv: SharedKv,
    unlocked: bool,
}

impl std::fmt::Debug for AdminFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminFlag")
            .field("unlocked", &self.unlocked)
            .finish_non_exhaustive()
    }
}

impl AdminFlag {
    /// Reads the persisted flag.
    pub fn load(kv: SharedKv) -> StoreResult<Self> {
        let unlocked = kv.get(ADMIN_KEY)?.as_deref() == Some(UNLOCKED);
        Ok(AdminFlag { kv, unlocked })
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Sets and persists the flag. On a failed write the flag keeps its old
    /// value.
    pub fn set_unlocked(&mut self, unlocked: bool) -> StoreResult<()> {
        if unlocked {
            self.kv.set(ADMIN_KEY, UNLOCKED)?;
        } else {
            self.kv.remove(ADMIN_KEY)?;
        }

        self.unlocked = unlocked;
        info!(unlocked, "Admin mode changed");
        Ok(())
    }

    /// Flips the flag, returning the new value.
    pub fn toggle(&mut self) -> StoreResult<bool> {
        let next = !self.unlocked;
        self.set_unlocked(next)?;
        Ok(next)
    }

    /// Applies a change made by another handle. Returns `true` when the key
    /// was the admin flag.
    pub fn on_external_change(&mut self, key: &str, new_value: Option<&str>) -> bool {
        if key != ADMIN_KEY {
            return false;
        }

        self.unlocked = new_value == Some(UNLOCKED);
        true
    }
}
