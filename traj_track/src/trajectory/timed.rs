//! Timed trajectory and its samples

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::path::Path;

// Internal
use crate::pose::{Pose2, PoseWithCurvature};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Samples closer together than this are treated as co-located when
/// interpolating.
const MIN_SEGMENT_LENGTH_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single state of a timed trajectory.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimedSample {
    /// Time at which the robot should be at this state
    pub t_s: f64,

    /// Pose and curvature of the path
    pub state: PoseWithCurvature,

    /// Commanded linear velocity
    pub vel_ms: f64,

    /// Commanded linear acceleration.
    ///
    /// When `None` the acceleration over the following segment is derived
    /// from the velocities at either end of it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acc_mss: Option<f64>,
}

/// An ordered, immutable sequence of timed samples.
///
/// A valid trajectory contains at least one sample and its timestamps never
/// decrease.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedTrajectory {
    samples: Vec<TimedSample>,
}

/// On-disk representation of a trajectory, validated on load.
#[derive(Deserialize)]
struct TrajectoryFile {
    samples: Vec<TimedSample>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    #[error("Attempted to create a trajectory from an empty sequence")]
    EmptyTrajectory,

    /// The timestamp of the sample at the given index is earlier than that of
    /// the previous sample.
    #[error("Sample {0} has a timestamp earlier than the previous sample")]
    NonMonotonicTimestamps(usize),

    /// The sample at the given index contains a NaN or infinite value.
    #[error("Sample {0} contains non-finite values")]
    NonFiniteSample(usize),

    #[error("Cannot load the trajectory file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the trajectory: {0}")]
    DeserialiseError(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TimedSample {
    pub fn new(t_s: f64, pose: Pose2, curv_m: f64, vel_ms: f64) -> Self {
        Self {
            t_s,
            state: PoseWithCurvature::new(pose, curv_m, 0.0),
            vel_ms,
            acc_mss: None,
        }
    }

    /// Set the commanded acceleration of the sample.
    pub fn with_acc(mut self, acc_mss: f64) -> Self {
        self.acc_mss = Some(acc_mss);
        self
    }

    /// Returns true if every value in the sample is finite.
    pub fn is_finite(&self) -> bool {
        self.t_s.is_finite()
            && self.state.pose.is_finite()
            && self.state.curv_m.is_finite()
            && self.state.dkds.is_finite()
            && self.vel_ms.is_finite()
            && self.acc_mss.map_or(true, f64::is_finite)
    }

    /// Acceleration over the segment from `self` to `next`.
    ///
    /// Uses the commanded acceleration if there is one, otherwise the change
    /// in velocity over the segment's duration. A zero length segment without
    /// a commanded acceleration gives zero.
    pub fn segment_acc(&self, next: &TimedSample) -> f64 {
        match self.acc_mss {
            Some(acc_mss) => acc_mss,
            None => {
                let seg_dur_s = next.t_s - self.t_s;

                if seg_dur_s > 0.0 {
                    (next.vel_ms - self.vel_ms) / seg_dur_s
                }
                else {
                    0.0
                }
            }
        }
    }

    /// Get the state between `self` and `next` at time `t_s`.
    ///
    /// The velocity is projected forward from `self` using the segment's
    /// acceleration, and the pose is placed at the fraction of the segment
    /// covered by that motion. If the two samples are co-located the time
    /// fraction is used instead.
    pub fn interpolate(&self, next: &TimedSample, t_s: f64) -> TimedSample {
        let dt_s = t_s - self.t_s;
        let seg_dur_s = next.t_s - self.t_s;
        let acc_mss = self.segment_acc(next);

        let vel_ms = self.vel_ms + acc_mss * dt_s;
        let dist_m = (self.vel_ms * dt_s + 0.5 * acc_mss * dt_s * dt_s).abs();
        let seg_len_m = self.state.pose.distance_to(&next.state.pose);

        let fraction = if seg_len_m > MIN_SEGMENT_LENGTH_M {
            dist_m / seg_len_m
        }
        else if seg_dur_s > 0.0 {
            dt_s / seg_dur_s
        }
        else {
            0.0
        };

        TimedSample {
            t_s,
            state: self.state.interpolate(&next.state, fraction.clamp(0.0, 1.0)),
            vel_ms,
            acc_mss: Some(acc_mss),
        }
    }
}

impl TimedTrajectory {
    /// Create a new trajectory from the given samples.
    pub fn new(samples: Vec<TimedSample>) -> Result<Self, TrajectoryError> {
        if samples.is_empty() {
            return Err(TrajectoryError::EmptyTrajectory);
        }

        for (i, sample) in samples.iter().enumerate() {
            if !sample.is_finite() {
                return Err(TrajectoryError::NonFiniteSample(i));
            }

            if i > 0 && sample.t_s < samples[i - 1].t_s {
                return Err(TrajectoryError::NonMonotonicTimestamps(i));
            }
        }

        Ok(Self { samples })
    }

    /// Parse a trajectory from a JSON string of the form
    /// `{"samples": [...]}`.
    pub fn from_json_str(json: &str) -> Result<Self, TrajectoryError> {
        let file: TrajectoryFile =
            serde_json::from_str(json).map_err(TrajectoryError::DeserialiseError)?;

        Self::new(file.samples)
    }

    /// Load a trajectory from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, TrajectoryError> {
        let json = std::fs::read_to_string(path).map_err(TrajectoryError::FileLoadError)?;

        Self::from_json_str(&json)
    }

    pub fn samples(&self) -> &[TimedSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false, a trajectory cannot be constructed without samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> &TimedSample {
        &self.samples[0]
    }

    pub fn last(&self) -> &TimedSample {
        &self.samples[self.samples.len() - 1]
    }

    pub fn start_time_s(&self) -> f64 {
        self.first().t_s
    }

    pub fn end_time_s(&self) -> f64 {
        self.last().t_s
    }

    /// Total time taken to traverse the trajectory.
    pub fn duration_s(&self) -> f64 {
        self.end_time_s() - self.start_time_s()
    }

    /// Get the state of the trajectory at the given time.
    ///
    /// Times outside the trajectory are clamped to the first or last sample.
    pub fn sample(&self, t_s: f64) -> TimedSample {
        if t_s <= self.start_time_s() {
            return *self.first();
        }
        if t_s >= self.end_time_s() {
            return *self.last();
        }

        // Index of the first sample strictly after t_s. This is always in
        // 1..len since t_s lies strictly inside the trajectory.
        let next = self.samples.partition_point(|s| s.t_s <= t_s);

        self.samples[next - 1].interpolate(&self.samples[next], t_s)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn straight_line() -> TimedTrajectory {
        // Accelerates from rest at 1 m/s^2 along +x for 2 s
        TimedTrajectory::new(vec![
            TimedSample::new(0.0, Pose2::new(0.0, 0.0, 0.0), 0.0, 0.0).with_acc(1.0),
            TimedSample::new(1.0, Pose2::new(0.5, 0.0, 0.0), 0.0, 1.0).with_acc(1.0),
            TimedSample::new(2.0, Pose2::new(2.0, 0.0, 0.0), 0.0, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            TimedTrajectory::new(vec![]),
            Err(TrajectoryError::EmptyTrajectory)
        ));

        assert!(matches!(
            TimedTrajectory::new(vec![
                TimedSample::new(1.0, Pose2::default(), 0.0, 0.0),
                TimedSample::new(0.5, Pose2::default(), 0.0, 0.0),
            ]),
            Err(TrajectoryError::NonMonotonicTimestamps(1))
        ));

        assert!(matches!(
            TimedTrajectory::new(vec![
                TimedSample::new(0.0, Pose2::default(), std::f64::NAN, 0.0),
            ]),
            Err(TrajectoryError::NonFiniteSample(0))
        ));
    }

    #[test]
    fn test_duration() {
        let traj = straight_line();
        assert_eq!(traj.len(), 3);
        assert_eq!(traj.duration_s(), 2.0);

        let single = TimedTrajectory::new(vec![
            TimedSample::new(3.0, Pose2::default(), 0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(single.duration_s(), 0.0);
    }

    #[test]
    fn test_sample_clamps() {
        let traj = straight_line();

        assert_eq!(traj.sample(-1.0), *traj.first());
        assert_eq!(traj.sample(0.0), *traj.first());
        assert_eq!(traj.sample(2.0), *traj.last());
        assert_eq!(traj.sample(10.0), *traj.last());
    }

    #[test]
    fn test_sample_interpolates_kinematically() {
        let traj = straight_line();

        // Half a second in: v = 0.5, s = 0.5 * 1 * 0.25 = 0.125 of a 0.5 m
        // segment.
        let s = traj.sample(0.5);
        assert_abs_diff_eq!(s.t_s, 0.5);
        assert_abs_diff_eq!(s.vel_ms, 0.5, epsilon = 1e-12);
        assert_eq!(s.acc_mss, Some(1.0));
        assert_abs_diff_eq!(s.state.pose.position_m[0], 0.125, epsilon = 1e-12);

        // On an exact sample the sample itself is returned
        let s = traj.sample(1.0);
        assert_eq!(s, traj.samples()[1]);
    }

    #[test]
    fn test_sample_co_located_uses_time() {
        // Turning on the spot
        let traj = TimedTrajectory::new(vec![
            TimedSample::new(0.0, Pose2::new(1.0, 1.0, 0.0), 0.0, 0.0),
            TimedSample::new(2.0, Pose2::new(1.0, 1.0, 1.0), 0.0, 0.0),
        ])
        .unwrap();

        let s = traj.sample(0.5);
        assert_abs_diff_eq!(s.state.pose.heading_rad, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_derives_missing_acc() {
        // Starts from rest with no commanded accelerations
        let traj = TimedTrajectory::new(vec![
            TimedSample::new(0.0, Pose2::new(0.0, 0.0, 0.0), 0.0, 0.0),
            TimedSample::new(1.0, Pose2::new(0.5, 0.0, 0.0), 0.0, 1.0),
            TimedSample::new(2.0, Pose2::new(2.0, 0.0, 0.0), 0.0, 2.0),
            TimedSample::new(3.0, Pose2::new(2.0, 0.0, 0.0), 0.0, 2.0),
        ])
        .unwrap();

        assert_eq!(traj.samples()[0].segment_acc(&traj.samples()[1]), 1.0);

        // v = 0.9, s = 0.5 * 0.81 = 0.405 m along the segment
        let s = traj.sample(0.9);
        assert_abs_diff_eq!(s.vel_ms, 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(s.state.pose.position_m[0], 0.405, epsilon = 1e-12);
        assert_eq!(s.acc_mss, Some(1.0));

        // Arriving at the next sample without a jump
        let s = traj.sample(1.0 - 1e-9);
        assert_abs_diff_eq!(s.vel_ms, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(s.state.pose.position_m[0], 0.5, epsilon = 1e-6);

        // Second segment: v = 1.5, s = 1.0 * 0.5 + 0.5 * 0.25 = 0.625 m
        let s = traj.sample(1.5);
        assert_abs_diff_eq!(s.vel_ms, 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(s.state.pose.position_m[0], 1.125, epsilon = 1e-12);

        // Co-located samples at constant velocity keep the velocity
        let s = traj.sample(2.5);
        assert_abs_diff_eq!(s.vel_ms, 2.0, epsilon = 1e-12);
        assert_eq!(s.acc_mss, Some(0.0));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "samples": [
                {
                    "t_s": 0.0,
                    "state": {
                        "pose": { "position_m": [0.0, 0.0], "heading_rad": 0.0 },
                        "curv_m": 0.0
                    },
                    "vel_ms": 1.0
                },
                {
                    "t_s": 1.0,
                    "state": {
                        "pose": { "position_m": [1.0, 0.0], "heading_rad": 0.0 },
                        "curv_m": 0.5,
                        "dkds": 0.1
                    },
                    "vel_ms": 1.0,
                    "acc_mss": 0.0
                }
            ]
        }"#;

        let traj = TimedTrajectory::from_json_str(json).unwrap();
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.last().state.curv_m, 0.5);
        assert_eq!(traj.last().state.dkds, 0.1);
        assert_eq!(traj.first().acc_mss, None);
        assert_eq!(traj.last().acc_mss, Some(0.0));

        assert!(matches!(
            TimedTrajectory::from_json_str(r#"{ "samples": [] }"#),
            Err(TrajectoryError::EmptyTrajectory)
        ));
        assert!(matches!(
            TimedTrajectory::from_json_str("not json"),
            Err(TrajectoryError::DeserialiseError(_))
        ));
    }
}
