//! Velocity strategies
//!
//! A strategy is the control law plugged into the tracker. Each cycle it is
//! given the tracker's iterator, already advanced to the current time, and the
//! measured pose of the robot, and returns the velocities to command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::{pose::Pose2, trajectory::TrajectoryIterator};

use super::VelocityOutput;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Calculates velocity demands from the reference trajectory and the robot's
/// pose.
pub trait VelocityStrategy {
    fn calculate_state(
        &mut self,
        iterator: &dyn TrajectoryIterator,
        robot_pose: &Pose2,
    ) -> VelocityOutput;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Open loop strategy which commands exactly what the trajectory says.
///
/// The angular velocity is the product of the reference velocity and the
/// path curvature. The robot's pose is ignored.
#[derive(Debug, Copy, Clone, Default)]
pub struct FeedForward;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelocityStrategy for FeedForward {
    fn calculate_state(
        &mut self,
        iterator: &dyn TrajectoryIterator,
        _robot_pose: &Pose2,
    ) -> VelocityOutput {
        let reference = iterator.current_state();

        VelocityOutput::new(
            reference.vel_ms,
            reference.vel_ms * reference.state.curv_m,
        )
    }
}

impl<F> VelocityStrategy for F
where
    F: FnMut(&dyn TrajectoryIterator, &Pose2) -> VelocityOutput,
{
    fn calculate_state(
        &mut self,
        iterator: &dyn TrajectoryIterator,
        robot_pose: &Pose2,
    ) -> VelocityOutput {
        self(iterator, robot_pose)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trajectory::{TimedIterator, TimedSample, TimedTrajectory};

    #[test]
    fn test_feed_forward() {
        let traj = TimedTrajectory::new(vec![
            TimedSample::new(0.0, Pose2::new(0.0, 0.0, 0.0), 0.5, 2.0),
            TimedSample::new(1.0, Pose2::new(2.0, 0.0, 0.0), 0.5, 2.0),
        ])
        .unwrap();
        let iter = TimedIterator::new(traj);

        let out = FeedForward.calculate_state(&iter, &Pose2::new(5.0, 5.0, 1.0));
        assert_eq!(out, VelocityOutput::new(2.0, 1.0));
    }
}
