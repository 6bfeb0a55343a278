//! # Admin Gate
//!
//! The hidden gesture that toggles admin mode: tap the store logo five times
//! in quick succession.
//!
//! ## Debounced Counter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  window = 2s, threshold = 5                                             │
//! │                                                                         │
//! │  t=0.0  tap ──► Counting(1)                                             │
//! │  t=0.4  tap ──► Counting(2)                                             │
//! │  t=0.7  tap ──► Counting(3)                                             │
//! │  t=3.0  tap ──► (gap > window: counter zeroed first) ──► Counting(1)   │
//! │  t=3.2  tap ──► Counting(2)                                             │
//! │  ...                                                                    │
//! │  t=3.9  tap ──► Toggled  (counter back to 0)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate only counts. Whether admin mode is on, and persisting that, is
//! the caller's business (see `bites_store::AdminFlag`). Time is passed in so
//! the gate stays pure.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::{DEFAULT_ADMIN_TAPS, DEFAULT_ADMIN_WINDOW_MS};

/// What a tap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Still counting; holds the taps seen in the current window.
    Counting(u32),
    /// Threshold reached; admin mode should flip.
    Toggled,
}

/// Session-scoped tap counter with reset-on-timeout.
#[derive(Debug, Clone)]
pub struct AdminGate {
    threshold: u32,
    window: Duration,
    count: u32,
    last_tap: Option<Instant>,
}

impl AdminGate {
    /// Creates a gate. A threshold of 0 is treated as 1.
    pub fn new(threshold: u32, window: Duration) -> Self {
        AdminGate {
            threshold: threshold.max(1),
            window,
            count: 0,
            last_tap: None,
        }
    }

    /// Registers a tap at `now`.
    pub fn tap(&mut self, now: Instant) -> TapOutcome {
        self.expire(now);

        self.count += 1;
        self.last_tap = Some(now);

        if self.count >= self.threshold {
            debug!(taps = self.count, "Admin gate threshold reached");
            self.reset();
            return TapOutcome::Toggled;
        }

        debug!(taps = self.count, "Admin gate tap");
        TapOutcome::Counting(self.count)
    }

    /// Zeroes the counter if the window has passed since the last tap.
    ///
    /// Returns `true` when a partial sequence was discarded.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.last_tap {
            Some(last) if now.saturating_duration_since(last) > self.window => {
                let discarded = self.count > 0;
                self.reset();
                discarded
            }
            _ => false,
        }
    }

    /// Taps counted in the current window.
    pub fn pending(&self) -> u32 {
        self.count
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn reset(&mut self) {
        self.count = 0;
        self.last_tap = None;
    }
}

impl Default for AdminGate {
    fn default() -> Self {
        AdminGate::new(
            DEFAULT_ADMIN_TAPS,
            Duration::from_millis(DEFAULT_ADMIN_WINDOW_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(2);

    #[test]
    fn test_five_quick_taps_toggle() {
        let mut gate = AdminGate::new(5, WINDOW);
        let start = Instant::now();

        for i in 1..5 {
            let at = start + Duration::from_millis(200 * u64::from(i));
            assert_eq!(gate.tap(at), TapOutcome::Counting(i));
        }
        assert_eq!(
            gate.tap(start + Duration::from_millis(1000)),
            TapOutcome::Toggled
        );
        assert_eq!(gate.pending(), 0);
    }

    #[test]
    fn test_slow_taps_reset_counter() {
        let mut gate = AdminGate::new(5, WINDOW);
        let start = Instant::now();

        gate.tap(start);
        gate.tap(start + Duration::from_millis(500));
        gate.tap(start + Duration::from_millis(900));
        assert_eq!(gate.pending(), 3);

        // Gap longer than the window starts a new sequence
        let late = start + Duration::from_millis(900) + WINDOW + Duration::from_millis(1);
        assert_eq!(gate.tap(late), TapOutcome::Counting(1));
    }

    #[test]
    fn test_window_is_measured_from_last_tap() {
        let mut gate = AdminGate::new(3, WINDOW);
        let start = Instant::now();

        // Each tap lands inside the window of the previous one
        assert_eq!(gate.tap(start), TapOutcome::Counting(1));
        assert_eq!(gate.tap(start + Duration::from_millis(1900)), TapOutcome::Counting(2));
        assert_eq!(gate.tap(start + Duration::from_millis(3800)), TapOutcome::Toggled);
    }

    #[test]
    fn test_expire() {
        let mut gate = AdminGate::new(5, WINDOW);
        let start = Instant::now();

        assert!(!gate.expire(start)); // Nothing to expire

        gate.tap(start);
        gate.tap(start + Duration::from_millis(100));
        assert!(!gate.expire(start + Duration::from_millis(500)));
        assert_eq!(gate.pending(), 2);

        assert!(gate.expire(start + Duration::from_secs(5)));
        assert_eq!(gate.pending(), 0);
    }

    #[test]
    fn test_toggle_twice() {
        let mut gate = AdminGate::new(2, WINDOW);
        let start = Instant::now();

        gate.tap(start);
        assert_eq!(gate.tap(start), TapOutcome::Toggled);
        gate.tap(start);
        assert_eq!(gate.tap(start), TapOutcome::Toggled);
    }

    #[test]
    fn test_zero_threshold_means_one() {
        let mut gate = AdminGate::new(0, WINDOW);
        assert_eq!(gate.threshold(), 1);
        assert_eq!(gate.tap(Instant::now()), TapOutcome::Toggled);
    }

    #[test]
    fn test_default() {
        let gate = AdminGate::default();
        assert_eq!(gate.threshold(), DEFAULT_ADMIN_TAPS);
        assert_eq!(gate.window(), Duration::from_millis(DEFAULT_ADMIN_WINDOW_MS));
    }
}
