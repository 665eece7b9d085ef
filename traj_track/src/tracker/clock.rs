//! Time sources for the tracker
//!
//! Clocks return absolute time in seconds. Only differences between values
//! returned by the same clock are meaningful.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of the current time.
pub trait Clock {
    fn now_s(&self) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Wall clock time, measured from the clock's epoch.
#[derive(Debug, Copy, Clone)]
pub struct SystemClock {
    epoch: DateTime<Utc>,
}

/// A clock whose time is set by the caller.
///
/// Clones share the same time, so one copy can be given to a tracker while
/// another is used to drive it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time_bits: Arc<AtomicU64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SystemClock {
    /// Create a clock whose epoch is now.
    pub fn new() -> Self {
        Self { epoch: Utc::now() }
    }

    /// Create a clock measuring from the process epoch, so that its times
    /// match the timestamps in the log.
    pub fn from_process_epoch() -> Self {
        Self {
            epoch: util::time::get_epoch(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_s(&self) -> f64 {
        util::time::seconds_since(&self.epoch)
    }
}

impl ManualClock {
    /// Create a new clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, time_s: f64) {
        self.time_bits.store(time_s.to_bits(), Ordering::SeqCst);
    }

    /// Move the clock forward by `delta_s`.
    ///
    /// Advances from several clones at once are all applied.
    pub fn advance(&self, delta_s: f64) {
        // The update closure always returns Some, so this cannot fail
        let _ = self.time_bits.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
            Some((f64::from_bits(bits) + delta_s).to_bits())
        });
    }
}

impl Clock for ManualClock {
    fn now_s(&self) -> f64 {
        f64::from_bits(self.time_bits.load(Ordering::SeqCst))
    }
}

impl<F> Clock for F
where
    F: Fn() -> f64,
{
    fn now_s(&self) -> f64 {
        self()
    }
}
