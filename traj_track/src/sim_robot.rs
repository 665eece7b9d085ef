//! Simulated robot used by the tracking executable.
//!
//! The robot is a perfect unicycle: it moves at exactly the commanded linear
//! and angular velocities.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use traj_track::{Pose2, TrackerOutput};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct SimRobot {
    pose: Pose2,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimRobot {
    pub fn new(pose: Pose2) -> Self {
        Self { pose }
    }

    pub fn pose(&self) -> &Pose2 {
        &self.pose
    }

    /// Move the robot according to the command for the given time step.
    pub fn step(&mut self, cmd: &TrackerOutput, dt_s: f64) {
        self.pose.position_m += self.pose.forward() * cmd.lin_vel_ms * dt_s;
        self.pose.heading_rad += cmd.ang_vel_rads * dt_s;
    }
}
