//! Trajectory tracker state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;
use std::sync::Arc;

// Internal
use super::*;
use crate::{
    pose::Pose2,
    trajectory::{TimedIterator, TimedSample, TimedTrajectory, TrajectoryIterator},
};
use util::{module::State, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follows a timed trajectory using a pluggable `VelocityStrategy`.
pub struct TrajTracker<S, C = SystemClock> {
    params: Params,

    /// The control law
    strategy: S,

    /// Time source used by `next_state_now`
    clock: C,

    state: TrackerState,

    report: StatusReport,
}

/// Input data for cyclic processing through the `State` interface.
#[derive(Debug, Copy, Clone)]
pub struct TrackerInput {
    /// Measured pose of the robot
    pub pose: Pose2,

    /// Time of the measurement. If `None` the tracker's clock is read.
    pub time_s: Option<f64>,
}

/// The status report containing monitoring quantities from the last cycle.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Time step used in the last cycle
    pub delta_time_s: f64,

    /// If true the update time went backwards and the step was clamped to zero
    pub time_clamped: bool,

    /// Absolute trajectory time of the reference point
    pub progress_s: f64,

    /// If true the end of the trajectory has been reached
    pub finished: bool,

    /// Error of the measured pose along the reference heading
    pub along_track_error_m: f64,

    /// Error of the measured pose to the left of the reference heading
    pub cross_track_error_m: f64,

    /// Heading error of the measured pose to the reference
    pub head_error_rad: f64,

    /// If true the linear acceleration demand exceeded `max_lin_acc_mss`
    pub lin_acc_limit_exceeded: bool,

    /// If true the angular acceleration demand exceeded `max_ang_acc_radss`
    pub ang_acc_limit_exceeded: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(params::LoadError),

    /// The tracker was asked for a state before any trajectory was loaded.
    /// This is a usage error, `reset` must be called first.
    #[error("Cannot get the next state without a trajectory, call `reset` first")]
    NoTrajectory,

    #[error("Invalid update time: {0}")]
    TimeError(#[from] DeltaTimeError),
}

/// The observable mode of the tracker.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrackerMode {
    Uninitialised,
    Tracking,
}

/// Internal state, only populated once a trajectory has been loaded.
enum TrackerState {
    Uninitialised,
    Tracking {
        iterator: TimedIterator,
        delta_time: DeltaTime,

        /// Velocity of the previous cycle, `None` before the first cycle
        prev_velocity: Option<VelocityOutput>,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S: VelocityStrategy> TrajTracker<S, SystemClock> {
    /// Create a tracker with default parameters which reads the wall clock.
    pub fn with_system_clock(strategy: S) -> Self {
        Self::new(strategy, SystemClock::from_process_epoch(), Params::default())
    }
}

impl<S, C> TrajTracker<S, C>
where
    S: VelocityStrategy,
    C: Clock,
{
    /// Create a new tracker. The tracker has no trajectory until `reset` is
    /// called.
    pub fn new(strategy: S, clock: C, params: Params) -> Self {
        Self {
            params,
            strategy,
            clock,
            state: TrackerState::Uninitialised,
            report: StatusReport::default(),
        }
    }

    /// Begin tracking a new trajectory.
    ///
    /// Any previous trajectory, timing and velocity history is discarded. The
    /// next call to `next_state` is treated as the first cycle.
    pub fn reset<T: Into<Arc<TimedTrajectory>>>(&mut self, trajectory: T) {
        let iterator = TimedIterator::new(trajectory);

        info!(
            "New trajectory loaded ({} samples, {:.3} s)",
            iterator.trajectory().len(),
            iterator.trajectory().duration_s()
        );

        self.report = StatusReport {
            progress_s: iterator.progress_s(),
            finished: iterator.is_done(),
            ..StatusReport::default()
        };
        self.state = TrackerState::Tracking {
            iterator,
            delta_time: DeltaTime::new(self.params.time_step_policy),
            prev_velocity: None,
        };
    }

    /// The reference point the robot should currently be at, or `None` if no
    /// trajectory has been loaded.
    pub fn reference_point(&self) -> Option<TimedSample> {
        match self.state {
            TrackerState::Tracking { ref iterator, .. } => Some(*iterator.current_state()),
            TrackerState::Uninitialised => None,
        }
    }

    /// Returns true if the end of the trajectory has been reached, or if no
    /// trajectory has been loaded.
    pub fn is_finished(&self) -> bool {
        match self.state {
            TrackerState::Tracking { ref iterator, .. } => iterator.is_done(),
            TrackerState::Uninitialised => true,
        }
    }

    pub fn mode(&self) -> TrackerMode {
        match self.state {
            TrackerState::Tracking { .. } => TrackerMode::Tracking,
            TrackerState::Uninitialised => TrackerMode::Uninitialised,
        }
    }

    /// The trajectory currently being tracked.
    pub fn trajectory(&self) -> Option<&Arc<TimedTrajectory>> {
        match self.state {
            TrackerState::Tracking { ref iterator, .. } => Some(iterator.trajectory()),
            TrackerState::Uninitialised => None,
        }
    }

    /// Report from the last call to `next_state`.
    pub fn status_report(&self) -> &StatusReport {
        &self.report
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Calculate the command for the robot at the given pose and time.
    ///
    /// Processing involves:
    ///  1. Finding the time elapsed since the last update (zero on the first
    ///     update after a reset).
    ///  1. Advancing along the trajectory by that time.
    ///  1. Getting velocity demands from the strategy.
    ///  1. Differentiating the demands against those of the last cycle.
    ///
    /// Past the end of the trajectory the final sample remains the reference.
    pub fn next_state(
        &mut self,
        robot_pose: &Pose2,
        time_s: f64,
    ) -> Result<TrackerOutput, TrackerError> {
        let (iterator, delta_time, prev_velocity) = match self.state {
            TrackerState::Tracking {
                ref mut iterator,
                ref mut delta_time,
                ref mut prev_velocity,
            } => (iterator, delta_time, prev_velocity),
            TrackerState::Uninitialised => return Err(TrackerError::NoTrajectory),
        };

        let delta_time_s = delta_time.update_time(time_s)?;

        let was_done = iterator.is_done();
        iterator.advance(delta_time_s);

        let velocity = self.strategy.calculate_state(&*iterator, robot_pose);
        let prev = prev_velocity.unwrap_or(velocity);
        *prev_velocity = Some(velocity);

        let output = TrackerOutput::from_velocities(&velocity, &prev, delta_time_s);

        // ---- REPORTING ----

        let reference = iterator.current_state();
        let pose_err = robot_pose.error_to(&reference.state.pose);

        let mut report = StatusReport {
            delta_time_s,
            time_clamped: delta_time.was_clamped(),
            progress_s: iterator.progress_s(),
            finished: iterator.is_done(),
            along_track_error_m: pose_err.along_track_m,
            cross_track_error_m: pose_err.cross_track_m,
            head_error_rad: pose_err.head_rad,
            ..StatusReport::default()
        };

        if let Some(max) = self.params.max_lin_acc_mss {
            if output.lin_acc_mss.abs() > max {
                warn!(
                    "Linear acceleration demand {:.3} m/s^2 exceeds the {:.3} m/s^2 limit",
                    output.lin_acc_mss, max
                );
                report.lin_acc_limit_exceeded = true;
            }
        }
        if let Some(max) = self.params.max_ang_acc_radss {
            if output.ang_acc_radss.abs() > max {
                warn!(
                    "Angular acceleration demand {:.3} rad/s^2 exceeds the {:.3} rad/s^2 limit",
                    output.ang_acc_radss, max
                );
                report.ang_acc_limit_exceeded = true;
            }
        }

        if report.finished && !was_done {
            info!("Trajectory finished at t = {:.3} s", time_s);
        }

        trace!(
            "dt = {:.4} s, ref t = {:.3} s, out = {:?}",
            delta_time_s,
            report.progress_s,
            output
        );

        self.report = report;

        Ok(output)
    }

    /// As `next_state` but using the current time from the tracker's clock.
    pub fn next_state_now(&mut self, robot_pose: &Pose2) -> Result<TrackerOutput, TrackerError> {
        let time_s = self.clock.now_s();
        self.next_state(robot_pose, time_s)
    }
}

impl<S, C> State for TrajTracker<S, C>
where
    S: VelocityStrategy,
    C: Clock,
{
    /// Parameter file path, relative to the params directory
    type InitData = &'static str;
    type InitError = TrackerError;

    type InputData = TrackerInput;
    type OutputData = TrackerOutput;
    type StatusReport = StatusReport;
    type ProcError = TrackerError;

    /// Load the parameters from the given file. Any loaded trajectory is kept
    /// but the new time step policy only applies from the next `reset`.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.params = params::load(init_data).map_err(TrackerError::ParamLoadError)?;

        info!("TrajTracker initialised with {:?}", self.params);

        Ok(())
    }

    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let output = match input_data.time_s {
            Some(t) => self.next_state(&input_data.pose, t),
            None => self.next_state_now(&input_data.pose),
        }?;

        Ok((output, self.report))
    }
}
