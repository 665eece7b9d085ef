//! General time utility functions
//!
//! The process epoch is the instant against which log timestamps and the
//! system clock are measured. It is set by the first call to `init_epoch` (or
//! lazily by the first query).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use conquer_once::OnceCell;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Set the process epoch to now.
///
/// Returns `false` if the epoch had already been set, in which case the
/// existing epoch is kept.
pub fn init_epoch() -> bool {
    EPOCH.try_init_once(Utc::now).is_ok()
}

/// Return the process epoch, initialising it if required.
pub fn get_epoch() -> DateTime<Utc> {
    init_epoch();

    match EPOCH.get() {
        Some(e) => *e,
        None => Utc::now()
    }
}

/// Get the number of seconds elapsed since the process epoch.
pub fn get_elapsed_seconds() -> f64 {
    seconds_since(&get_epoch())
}

/// Get the number of seconds elapsed since the given instant.
///
/// Returns `NAN` if the duration overflows.
pub fn seconds_since(instant: &DateTime<Utc>) -> f64 {
    duration_to_seconds(Utc::now() - *instant).unwrap_or(std::f64::NAN)
}
