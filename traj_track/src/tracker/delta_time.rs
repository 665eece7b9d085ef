//! Elapsed time between successive tracker updates

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;

use super::params::TimeStepPolicy;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Converts a stream of absolute timestamps into elapsed time deltas.
///
/// The first update after construction or `reset` returns a zero delta.
/// Returned deltas are never negative, what happens when time goes backwards
/// is decided by the `TimeStepPolicy`.
#[derive(Debug, Clone)]
pub struct DeltaTime {
    policy: TimeStepPolicy,

    /// Timestamp of the previous update
    prev_time_s: Option<f64>,

    /// True if the last update had its delta clamped to zero
    clamped: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeltaTimeError {
    #[error("Time went backwards from {prev_s} s to {current_s} s")]
    NonMonotonic { prev_s: f64, current_s: f64 },

    #[error("Time must be finite, found {0}")]
    NonFinite(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DeltaTime {
    pub fn new(policy: TimeStepPolicy) -> Self {
        Self {
            policy,
            prev_time_s: None,
            clamped: false,
        }
    }

    /// Forget the previous timestamp.
    pub fn reset(&mut self) {
        self.prev_time_s = None;
        self.clamped = false;
    }

    /// Get the time elapsed since the previous update and store the current
    /// time.
    ///
    /// With `TimeStepPolicy::Clamp` a timestamp earlier than the previous one
    /// gives a zero delta and the stored time is left where it was. With
    /// `TimeStepPolicy::Reject` an error is returned and the stored time is
    /// unchanged.
    pub fn update_time(&mut self, current_s: f64) -> Result<f64, DeltaTimeError> {
        self.clamped = false;

        if !current_s.is_finite() {
            return Err(DeltaTimeError::NonFinite(current_s));
        }

        let prev_s = match self.prev_time_s {
            Some(t) => t,
            None => {
                self.prev_time_s = Some(current_s);
                return Ok(0.0);
            }
        };

        if current_s < prev_s {
            return match self.policy {
                TimeStepPolicy::Clamp => {
                    warn!(
                        "Time went backwards from {:.6} s to {:.6} s, using a zero time step",
                        prev_s, current_s
                    );
                    self.clamped = true;
                    Ok(0.0)
                }
                TimeStepPolicy::Reject => Err(DeltaTimeError::NonMonotonic { prev_s, current_s }),
            };
        }

        self.prev_time_s = Some(current_s);

        Ok(current_s - prev_s)
    }

    /// Returns true if the last call to `update_time` clamped a negative delta.
    pub fn was_clamped(&self) -> bool {
        self.clamped
    }

    pub fn prev_time_s(&self) -> Option<f64> {
        self.prev_time_s
    }
}

impl Default for DeltaTime {
    fn default() -> Self {
        Self::new(TimeStepPolicy::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_update_is_zero() {
        let mut dt = DeltaTime::default();

        assert_eq!(dt.update_time(12.0), Ok(0.0));
        assert_eq!(dt.update_time(12.5), Ok(0.5));
        assert_eq!(dt.update_time(13.5), Ok(1.0));
    }

    #[test]
    fn test_reset() {
        let mut dt = DeltaTime::default();
        dt.update_time(1.0).unwrap();
        dt.reset();

        assert_eq!(dt.prev_time_s(), None);
        assert_eq!(dt.update_time(100.0), Ok(0.0));
    }

    #[test]
    fn test_clamp_policy() {
        let mut dt = DeltaTime::new(TimeStepPolicy::Clamp);
        dt.update_time(2.0).unwrap();

        assert_eq!(dt.update_time(1.0), Ok(0.0));
        assert!(dt.was_clamped());

        // The stored time does not go backwards
        assert_eq!(dt.prev_time_s(), Some(2.0));
        assert_eq!(dt.update_time(2.5), Ok(0.5));
        assert!(!dt.was_clamped());
    }

    #[test]
    fn test_reject_policy() {
        let mut dt = DeltaTime::new(TimeStepPolicy::Reject);
        dt.update_time(2.0).unwrap();

        assert_eq!(
            dt.update_time(1.0),
            Err(DeltaTimeError::NonMonotonic { prev_s: 2.0, current_s: 1.0 })
        );
        assert_eq!(dt.prev_time_s(), Some(2.0));
        assert_eq!(dt.update_time(3.0), Ok(1.0));
    }

    #[test]
    fn test_non_finite() {
        let mut dt = DeltaTime::default();

        assert!(matches!(
            dt.update_time(std::f64::INFINITY),
            Err(DeltaTimeError::NonFinite(_))
        ));
        assert_eq!(dt.prev_time_s(), None);
    }
}
