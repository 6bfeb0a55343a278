//! # Admin Commands
//!
//! The store logo doubles as a hidden switch: five quick taps flip admin
//! mode, which unlocks order history, stats, export, import and reset.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use bites_core::TapOutcome;

use crate::error::ApiError;
use crate::state::Session;

/// What a logo tap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TapResponse {
    /// Taps counted toward the next toggle (0 right after a toggle).
    pub pending: u32,
    /// Whether this tap flipped admin mode.
    pub toggled: bool,
    /// Admin mode after the tap.
    pub unlocked: bool,
}

/// Registers one tap on the logo at `now`.
///
/// ## Errors
/// A failed write of the admin flag; the gate still counts the tap sequence
/// as used and the flag keeps its previous value.
pub fn tap_logo(session: &mut Session, now: Instant) -> Result<TapResponse, ApiError> {
    let outcome = session.gate.tap(now);
    debug!(?outcome, "tap_logo command");

    let toggled = match outcome {
        TapOutcome::Toggled => {
            session.admin.toggle()?;
            true
        }
        TapOutcome::Counting(_) => false,
    };

    Ok(TapResponse {
        pending: session.gate.pending(),
        toggled,
        unlocked: session.admin.is_unlocked(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use bites_store::{KeyValueStore, MemoryStore, ADMIN_KEY};
    use std::sync::Arc;
    use std::time::Duration;

    fn session_on(kv: Arc<MemoryStore>) -> Session {
        Session::open(kv, &StorefrontConfig::default()).unwrap().0
    }

    fn tap_n(session: &mut Session, start: Instant, n: u32) -> TapResponse {
        let mut last = None;
        for i in 0..n {
            let at = start + Duration::from_millis(300 * u64::from(i));
            last = Some(tap_logo(session, at).unwrap());
        }
        last.unwrap()
    }

    #[test]
    fn test_fifth_tap_unlocks_and_persists() {
        let kv = Arc::new(MemoryStore::new());
        let mut session = session_on(kv.clone());
        let start = Instant::now();

        let response = tap_n(&mut session, start, 4);
        assert_eq!(
            response,
            TapResponse {
                pending: 4,
                toggled: false,
                unlocked: false
            }
        );

        let response = tap_logo(&mut session, start + Duration::from_millis(1_500)).unwrap();
        assert!(response.toggled);
        assert!(response.unlocked);
        assert_eq!(response.pending, 0);
        assert_eq!(kv.get(ADMIN_KEY).unwrap().as_deref(), Some("true"));

        // Survives a restart
        assert!(session_on(kv).admin.is_unlocked());
    }

    #[test]
    fn test_five_more_taps_lock_again() {
        let kv = Arc::new(MemoryStore::new());
        let mut session = session_on(kv.clone());
        let start = Instant::now();

        tap_n(&mut session, start, 5);
        let response = tap_n(&mut session, start + Duration::from_secs(10), 5);

        assert!(response.toggled);
        assert!(!response.unlocked);
        assert_eq!(kv.get(ADMIN_KEY).unwrap(), None);
    }

    #[test]
    fn test_slow_taps_never_unlock() {
        let kv = Arc::new(MemoryStore::new());
        let mut session = session_on(kv);
        let start = Instant::now();

        for i in 0..10u64 {
            let response = tap_logo(&mut session, start + Duration::from_millis(2_500 * i)).unwrap();
            assert_eq!(response.pending, 1);
            assert!(!response.unlocked);
        }
    }
}
