//! # Trajectory tracking library.
//!
//! Closed loop tracking of precomputed, time parameterised trajectories for a
//! wheeled mobile robot. Given the robot's measured pose and the current time
//! the tracker produces the linear and angular velocity and acceleration
//! demands which keep the robot on the trajectory.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Pose module - positions and headings in the field frame
pub mod pose;

/// Trajectory module - timed trajectories and iteration over them
pub mod trajectory;

/// Tracker module - converts the measured pose and time into velocity demands
pub mod tracker;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use pose::{Pose2, PoseError, PoseWithCurvature};
pub use trajectory::{TimedIterator, TimedSample, TimedTrajectory, TrajectoryError, TrajectoryIterator};
pub use tracker::{
    Clock, FeedForward, ManualClock, SystemClock, TrackerError, TrackerOutput, TrajTracker,
    VelocityOutput, VelocityStrategy,
};
