//! Trajectory tracking executable entry point.
//!
//! # Architecture
//!
//! Runs a fixed rate control loop which tracks a trajectory loaded from a JSON
//! file with a simulated robot:
//!
//!     - Initialise logging, parameters and the tracker
//!     - Main loop:
//!         - Read the simulated robot's pose
//!         - Trajectory tracker processing
//!         - Archive the cycle
//!         - Drive the simulated robot with the tracker's command
//!
//! By default time is simulated, so the run completes as fast as possible. With
//! `--realtime` the loop is paced against the wall clock.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod sim_robot;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use color_eyre::{Report, eyre::{bail, WrapErr}};
use log::{debug, info, warn};
use nalgebra::Vector2;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use sim_robot::SimRobot;
use traj_track::{
    tracker::{Params, StatusReport, TrackerInput},
    Clock, FeedForward, ManualClock, Pose2, SystemClock, TimedTrajectory, TrackerOutput,
    TrajTracker,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    host,
    logger::{logger_init, LevelFilter},
    module::State,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Time allowed past the end of the trajectory before the run is abandoned.
const MAX_OVERRUN_S: f64 = 5.0;

/// A chrono format string used to name the session directory.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "track_exec", about = "Track a timed trajectory with a simulated robot")]
struct Opts {
    /// Path to the trajectory JSON file
    #[structopt(parse(from_os_str))]
    trajectory: PathBuf,

    /// Initial offset of the robot to the left of the trajectory's start
    #[structopt(long, default_value = "0.0")]
    offset_m: f64,

    /// Pace the loop against the wall clock instead of simulating time
    #[structopt(long)]
    realtime: bool,

    /// Enable trace level logging
    #[structopt(short, long)]
    verbose: bool,
}

/// A single tracking run and the archive of its cycles.
struct TrackingRun<C> {
    tracker: TrajTracker<FeedForward, C>,
    robot: SimRobot,

    output: TrackerOutput,
    report: StatusReport,

    archiver: Archiver,
}

/// One row of the tracking archive.
#[derive(Serialize)]
struct ArchiveRecord {
    time_s: f64,
    x_m: f64,
    y_m: f64,
    head_rad: f64,
    ref_x_m: f64,
    ref_y_m: f64,
    ref_head_rad: f64,
    lin_vel_ms: f64,
    lin_acc_mss: f64,
    ang_vel_rads: f64,
    ang_acc_radss: f64,
    cross_track_error_m: f64,
    head_error_rad: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let mut session_root = host::get_sw_root()
        .wrap_err("The software root environment variable (TRAJ_TRACK_SW_ROOT) is not set")?;
    session_root.push("sessions");
    session_root.push(format!("track_exec_{}", Utc::now().format(TIMESTAMP_FORMAT)));

    std::fs::create_dir_all(&session_root)
        .wrap_err("Failed to create the session directory")?;

    let level = if opts.verbose { LevelFilter::Trace } else { LevelFilter::Info };
    logger_init(level, Some(session_root.join("track_exec.log")))
        .wrap_err("Failed to initialise logging")?;

    info!("Trajectory Tracking Executable\n");
    info!("Session directory: {:?}\n", session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS AND TRAJECTORY ----

    let params: Params = util::params::load("traj_track.toml")
        .wrap_err("Could not load tracker params")?;

    let trajectory = Arc::new(
        TimedTrajectory::load_json(&opts.trajectory)
            .wrap_err_with(|| format!("Could not load trajectory {:?}", opts.trajectory))?,
    );

    info!(
        "Loaded trajectory lasts {:.02} s and contains {} samples\n",
        trajectory.duration_s(),
        trajectory.len()
    );

    // Start the robot at the first sample, shifted to the left if requested
    let mut start_pose = trajectory.first().state.pose;
    let left = Vector2::new(-start_pose.heading_rad.sin(), start_pose.heading_rad.cos());
    start_pose.position_m += left * opts.offset_m;

    let archiver = Archiver::from_path(session_root.join("arch").join("tracking.csv"))
        .wrap_err("Failed to create the tracking archive")?;

    // ---- RUN ----

    let report = if opts.realtime {
        info!("Running against the wall clock");

        let tracker = TrajTracker::new(FeedForward, SystemClock::from_process_epoch(), params);
        let mut run = TrackingRun::new(tracker, start_pose, archiver);

        run.execute(trajectory, |cycle_start: Instant| {
            let cycle_dur = Instant::now() - cycle_start;

            match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                ),
            }
        })?
    }
    else {
        info!("Running in simulated time");

        let clock = ManualClock::new();
        let tracker = TrajTracker::new(FeedForward, clock.clone(), params);
        let mut run = TrackingRun::new(tracker, start_pose, archiver);

        run.execute(trajectory, |_| clock.advance(CYCLE_PERIOD_S))?
    };

    info!("Final cross track error: {:.4} m", report.cross_track_error_m);
    info!("Final heading error: {:.4} rad", report.head_error_rad);

    Ok(())
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C: Clock> TrackingRun<C> {
    fn new(tracker: TrajTracker<FeedForward, C>, start_pose: Pose2, archiver: Archiver) -> Self {
        Self {
            tracker,
            robot: SimRobot::new(start_pose),
            output: TrackerOutput::default(),
            report: StatusReport::default(),
            archiver,
        }
    }

    /// Track the trajectory until it's finished, calling `end_cycle` with the
    /// start instant of each cycle once the robot has been moved.
    fn execute<F>(
        &mut self,
        trajectory: Arc<TimedTrajectory>,
        mut end_cycle: F,
    ) -> Result<StatusReport, Report>
    where
        F: FnMut(Instant),
    {
        let max_cycles = ((trajectory.duration_s() + MAX_OVERRUN_S) / CYCLE_PERIOD_S).ceil() as u64;

        self.tracker.reset(trajectory);

        info!("Begining main loop\n");

        for cycle in 0..max_cycles {
            let cycle_start = Instant::now();

            // ---- TRACKER PROCESSING ----

            let input = TrackerInput {
                pose: *self.robot.pose(),
                time_s: None,
            };

            let (output, report) = self.tracker.proc(&input)
                .wrap_err("Trajectory tracker processing failed")?;
            self.output = output;
            self.report = report;

            // ---- ARCHIVING ----

            if let Err(e) = self.write() {
                warn!("Could not archive cycle {}: {}", cycle, e);
            }

            if report.finished {
                info!("Trajectory complete after {} cycles", cycle + 1);
                return Ok(report);
            }

            // ---- SIMULATION ----

            self.robot.step(&output, CYCLE_PERIOD_S);

            end_cycle(cycle_start);
        }

        bail!("Trajectory was not complete after {} cycles", max_cycles)
    }
}

impl<C: Clock> Archived for TrackingRun<C> {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let pose = self.robot.pose();
        let reference = self.tracker.reference_point().unwrap_or_default();

        self.archiver.serialise(ArchiveRecord {
            time_s: self.tracker.clock().now_s(),
            x_m: pose.position_m[0],
            y_m: pose.position_m[1],
            head_rad: pose.heading_rad,
            ref_x_m: reference.state.pose.position_m[0],
            ref_y_m: reference.state.pose.position_m[1],
            ref_head_rad: reference.state.pose.heading_rad,
            lin_vel_ms: self.output.lin_vel_ms,
            lin_acc_mss: self.output.lin_acc_mss,
            ang_vel_rads: self.output.ang_vel_rads,
            ang_acc_radss: self.output.ang_acc_radss,
            cross_track_error_m: self.report.cross_track_error_m,
            head_error_rad: self.report.head_error_rad,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use traj_track::TimedSample;

    fn straight() -> Arc<TimedTrajectory> {
        Arc::new(
            TimedTrajectory::new(vec![
                TimedSample::new(0.0, Pose2::new(0.0, 0.0, 0.0), 0.0, 1.0),
                TimedSample::new(1.0, Pose2::new(1.0, 0.0, 0.0), 0.0, 1.0),
            ])
            .unwrap(),
        )
    }

    fn run(clock: &ManualClock, dir: &tempfile::TempDir) -> TrackingRun<ManualClock> {
        let tracker = TrajTracker::new(FeedForward, clock.clone(), Params::default());
        let archiver = Archiver::from_path(dir.path().join("tracking.csv")).unwrap();

        TrackingRun::new(tracker, Pose2::new(0.0, 0.0, 0.0), archiver)
    }

    #[test]
    fn test_execute_completes() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::new();
        let mut run = run(&clock, &dir);

        let report = run.execute(straight(), |_| clock.advance(CYCLE_PERIOD_S)).unwrap();

        assert!(report.finished);
        assert!(report.cross_track_error_m.abs() < 1e-9);
    }

    #[test]
    fn test_execute_stalled_clock_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::new();
        let mut run = run(&clock, &dir);

        // Time never moves so the trajectory can't finish
        let err = run.execute(straight(), |_| ()).unwrap_err();

        assert!(err.to_string().contains("not complete"));
    }
}
