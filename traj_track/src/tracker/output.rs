//! Velocity and acceleration demands produced by the tracker

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity demands calculated by a `VelocityStrategy`.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct VelocityOutput {
    pub lin_vel_ms: f64,
    pub ang_vel_rads: f64,
}

/// The full command produced by the tracker each cycle.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct TrackerOutput {
    pub lin_vel_ms: f64,
    pub lin_acc_mss: f64,
    pub ang_vel_rads: f64,
    pub ang_acc_radss: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelocityOutput {
    pub fn new(lin_vel_ms: f64, ang_vel_rads: f64) -> Self {
        Self {
            lin_vel_ms,
            ang_vel_rads,
        }
    }
}

impl TrackerOutput {
    /// Build the output from the velocities of this and the previous cycle.
    ///
    /// A zero-length step gives zero acceleration.
    pub fn from_velocities(
        current: &VelocityOutput,
        previous: &VelocityOutput,
        delta_time_s: f64,
    ) -> Self {
        let (lin_acc_mss, ang_acc_radss) = if delta_time_s > 0.0 {
            (
                (current.lin_vel_ms - previous.lin_vel_ms) / delta_time_s,
                (current.ang_vel_rads - previous.ang_vel_rads) / delta_time_s,
            )
        }
        else {
            (0.0, 0.0)
        };

        Self {
            lin_vel_ms: current.lin_vel_ms,
            lin_acc_mss,
            ang_vel_rads: current.ang_vel_rads,
            ang_acc_radss,
        }
    }

    /// The velocity part of the output.
    pub fn velocity(&self) -> VelocityOutput {
        VelocityOutput::new(self.lin_vel_ms, self.ang_vel_rads)
    }
}
