//! Transmit watchdog
//!
//! Bounds how long the link may wait for a transmit-complete notification.

use crate::config::TX_TIMEOUT_MS;

/// Countdown started on every transmission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxWatchdog {
    /// Time spent waiting in the current transmission
    elapsed_ms: u32,
    /// Expiry limit (0 = disabled)
    limit_ms: u32,
    /// Waiting for TX done
    armed: bool,
    /// Number of expiries
    trip_count: u32,
}

impl TxWatchdog {
    /// Create a watchdog with the given limit (0 = disabled)
    #[must_use]
    pub const fn new(limit_ms: u32) -> Self {
        Self {
            elapsed_ms: 0,
            limit_ms,
            armed: false,
            trip_count: 0,
        }
    }

    /// Start counting
    pub fn arm(&mut self) {
        self.elapsed_ms = 0;
        self.armed = true;
    }

    /// Stop counting
    pub fn disarm(&mut self) {
        self.armed = false;
        self.elapsed_ms = 0;
    }

    /// Check if counting
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Number of expiries so far
    #[must_use]
    pub const fn trip_count(&self) -> u32 {
        self.trip_count
    }

    /// Advance by `elapsed_ms`, returns true once on expiry
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.armed || self.limit_ms == 0 {
            return false;
        }

        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        if self.elapsed_ms >= self.limit_ms {
            self.disarm();
            self.trip_count = self.trip_count.saturating_add(1);
            true
        } else {
            false
        }
    }
}

impl Default for TxWatchdog {
    fn default() -> Self {
        Self::new(TX_TIMEOUT_MS)
    }
}
