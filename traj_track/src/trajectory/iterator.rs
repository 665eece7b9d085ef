//! Iteration over a timed trajectory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use super::{TimedSample, TimedTrajectory};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A forward-only cursor over a trajectory.
///
/// Implementors must be monotonic: `advance` never moves the cursor backwards
/// and once `is_done` returns true it keeps returning true.
pub trait TrajectoryIterator {
    /// The state at the cursor's current position.
    fn current_state(&self) -> &TimedSample;

    /// True once the cursor has reached the end of the trajectory.
    fn is_done(&self) -> bool;

    /// Move the cursor forward by the given time, clamped at the end of the
    /// trajectory, returning the new current state.
    fn advance(&mut self, delta_s: f64) -> &TimedSample;

    /// Get the state the cursor would be at after advancing by `delta_s`,
    /// without moving it.
    fn preview(&self, delta_s: f64) -> TimedSample;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Time-based iterator over a shared `TimedTrajectory`.
#[derive(Debug, Clone)]
pub struct TimedIterator {
    trajectory: Arc<TimedTrajectory>,

    /// Absolute trajectory time of the cursor
    progress_s: f64,

    current: TimedSample,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TimedIterator {
    /// Create a new iterator positioned at the start of the trajectory.
    pub fn new<T: Into<Arc<TimedTrajectory>>>(trajectory: T) -> Self {
        let trajectory = trajectory.into();
        let current = *trajectory.first();

        Self {
            progress_s: trajectory.start_time_s(),
            trajectory,
            current,
        }
    }

    pub fn trajectory(&self) -> &Arc<TimedTrajectory> {
        &self.trajectory
    }

    /// Absolute trajectory time of the cursor.
    pub fn progress_s(&self) -> f64 {
        self.progress_s
    }

    /// Time left until the end of the trajectory.
    pub fn remaining_s(&self) -> f64 {
        self.trajectory.end_time_s() - self.progress_s
    }

    /// Progress after a step of `delta_s`. Negative or NaN steps do not move
    /// the cursor.
    fn stepped_progress(&self, delta_s: f64) -> f64 {
        if delta_s > 0.0 {
            (self.progress_s + delta_s).min(self.trajectory.end_time_s())
        }
        else {
            self.progress_s
        }
    }
}

impl TrajectoryIterator for TimedIterator {
    fn current_state(&self) -> &TimedSample {
        &self.current
    }

    fn is_done(&self) -> bool {
        self.progress_s >= self.trajectory.end_time_s()
    }

    fn advance(&mut self, delta_s: f64) -> &TimedSample {
        let progress_s = self.stepped_progress(delta_s);

        if progress_s != self.progress_s {
            self.progress_s = progress_s;
            self.current = self.trajectory.sample(progress_s);
        }

        &self.current
    }

    fn preview(&self, delta_s: f64) -> TimedSample {
        self.trajectory.sample(self.stepped_progress(delta_s))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pose::Pose2;

    fn three_samples() -> TimedTrajectory {
        TimedTrajectory::new(vec![
            TimedSample::new(0.0, Pose2::new(0.0, 0.0, 0.0), 0.0, 1.0),
            TimedSample::new(1.0, Pose2::new(1.0, 0.0, 0.0), 0.0, 1.0),
            TimedSample::new(2.0, Pose2::new(2.0, 0.0, 0.0), 0.0, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_starts_at_first_sample() {
        let traj = three_samples();
        let iter = TimedIterator::new(traj.clone());

        assert_eq!(iter.current_state(), traj.first());
        assert_eq!(iter.progress_s(), 0.0);
        assert_eq!(iter.remaining_s(), 2.0);
        assert!(!iter.is_done());
    }

    #[test]
    fn test_advance_clamps_at_end() {
        let traj = three_samples();
        let mut iter = TimedIterator::new(traj.clone());

        iter.advance(0.5);
        assert_eq!(iter.current_state().state.pose.position_m[0], 0.5);
        assert!(!iter.is_done());

        iter.advance(5.0);
        assert_eq!(iter.current_state(), traj.last());
        assert_eq!(iter.progress_s(), 2.0);
        assert!(iter.is_done());

        // Stays done
        iter.advance(1.0);
        assert!(iter.is_done());
        assert_eq!(iter.current_state(), traj.last());
    }

    #[test]
    fn test_never_moves_backwards() {
        let mut iter = TimedIterator::new(three_samples());

        iter.advance(1.5);
        iter.advance(-1.0);
        iter.advance(std::f64::NAN);
        assert_eq!(iter.progress_s(), 1.5);
    }

    #[test]
    fn test_preview_does_not_move() {
        let mut iter = TimedIterator::new(three_samples());
        iter.advance(0.5);

        let ahead = iter.preview(1.0);
        assert_eq!(ahead.t_s, 1.5);
        assert_eq!(iter.progress_s(), 0.5);

        assert_eq!(iter.preview(10.0).t_s, 2.0);
    }

    #[test]
    fn test_zero_duration_is_done() {
        let traj = TimedTrajectory::new(vec![
            TimedSample::new(0.0, Pose2::default(), 0.0, 0.0),
        ])
        .unwrap();

        assert!(TimedIterator::new(traj).is_done());
    }
}
