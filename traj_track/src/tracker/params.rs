//! Trajectory tracker parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the trajectory tracker
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Params {

    /// What to do when the update time is earlier than the previous update
    #[serde(default)]
    pub time_step_policy: TimeStepPolicy,

    /// Linear acceleration demand magnitude above which the status report
    /// flags the limit as exceeded. No limit if not set.
    #[serde(default)]
    pub max_lin_acc_mss: Option<f64>,

    /// Angular acceleration demand magnitude above which the status report
    /// flags the limit as exceeded. No limit if not set.
    #[serde(default)]
    pub max_ang_acc_radss: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Policy for handling timestamps which go backwards.
#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimeStepPolicy {
    /// Treat the step as zero length and warn
    Clamp,

    /// Return an error from the update
    Reject,
}

impl Default for TimeStepPolicy {
    fn default() -> Self {
        TimeStepPolicy::Clamp
    }
}
