//! # Trajectory tracker module
//!
//! The trajectory tracker converts "where am I now and what time is it" into
//! the velocity and acceleration the robot should be commanded with in order
//! to follow a timed trajectory.
//!
//! Each cycle the tracker measures the time elapsed since the previous cycle,
//! advances its iterator over the trajectory by that time and hands the
//! iterator and the measured pose to a `VelocityStrategy`. The strategy is the
//! control law, it returns the linear and angular velocity demands. The
//! tracker then differentiates these demands against those of the previous
//! cycle to produce acceleration demands, which are useful for drive dynamics.
//!
//! The tracker must be given a trajectory with `reset` before it can be
//! processed. Calling `reset` again starts a new episode and discards all state
//! from the previous one.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod clock;
pub mod delta_time;
pub mod output;
pub mod params;
pub mod state;
pub mod strategy;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use clock::*;
pub use delta_time::*;
pub use output::*;
pub use params::{Params, TimeStepPolicy};
pub use state::*;
pub use strategy::*;
