//! # Trajectory module
//!
//! A timed trajectory is an immutable, time-ordered sequence of samples, each
//! of which carries a pose on the path, the path's curvature at that pose and
//! the velocity and acceleration the robot should have there. Trajectories are
//! produced by an external generator and are only ever read by the tracker,
//! through a `TrajectoryIterator`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod iterator;
pub mod timed;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use iterator::*;
pub use timed::*;
