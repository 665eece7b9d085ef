//! # Pose module
//!
//! Defines the 2D pose of the robot and the curvature-annotated poses which
//! make up a trajectory. All poses are expressed in a single field-relative
//! frame.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use util::maths::{get_ang_dist_2pi, lerp, lerp_angle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position and heading in the field frame.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose2 {
    /// The position in the field frame
    pub position_m: Vector2<f64>,

    /// The heading (angle to the +ve x axis, anticlockwise positive). Any
    /// range is accepted, angles are wrapped when compared.
    pub heading_rad: f64,
}

/// A pose on a path along with the curvature of the path at that point.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseWithCurvature {
    pub pose: Pose2,

    /// Curvature of the path (1/radius, +ve turning left)
    pub curv_m: f64,

    /// Rate of change of curvature with distance along the path
    #[serde(default)]
    pub dkds: f64,
}

/// The error of a measured pose relative to a reference pose, expressed in
/// the reference pose's frame.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct PoseError {
    /// Distance the robot is ahead (+ve) or behind (-ve) of the reference
    pub along_track_m: f64,

    /// Distance the robot is to the left (+ve) or right (-ve) of the
    /// reference
    pub cross_track_m: f64,

    /// Angle the robot is rotated anticlockwise (+ve) from the reference
    /// heading, in the range [-pi, pi]
    pub head_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2 {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }

    /// Unit vector pointing in the direction of the heading.
    pub fn forward(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }

    /// Euclidean distance between the positions of two poses.
    pub fn distance_to(&self, other: &Pose2) -> f64 {
        (other.position_m - self.position_m).norm()
    }

    /// Interpolate towards `other`. The heading is interpolated along the
    /// shortest arc.
    pub fn interpolate(&self, other: &Pose2, fraction: f64) -> Pose2 {
        Pose2 {
            position_m: self.position_m + (other.position_m - self.position_m) * fraction,
            heading_rad: lerp_angle(self.heading_rad, other.heading_rad, fraction),
        }
    }

    /// Get the error of `self` when compared against `reference`.
    pub fn error_to(&self, reference: &Pose2) -> PoseError {
        let diff = self.position_m - reference.position_m;
        let fwd = reference.forward();

        PoseError {
            along_track_m: diff.dot(&fwd),
            // z component of the extended cross product fwd x diff
            cross_track_m: fwd[0] * diff[1] - fwd[1] * diff[0],
            head_rad: get_ang_dist_2pi(reference.heading_rad, self.heading_rad),
        }
    }

    /// Returns true if all elements of the pose are finite.
    pub fn is_finite(&self) -> bool {
        self.position_m.iter().all(|v| v.is_finite()) && self.heading_rad.is_finite()
    }
}

impl PoseWithCurvature {
    pub fn new(pose: Pose2, curv_m: f64, dkds: f64) -> Self {
        Self { pose, curv_m, dkds }
    }

    pub fn interpolate(&self, other: &PoseWithCurvature, fraction: f64) -> Self {
        Self {
            pose: self.pose.interpolate(&other.pose, fraction),
            curv_m: lerp(self.curv_m, other.curv_m, fraction),
            dkds: lerp(self.dkds, other.dkds, fraction),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_error_to() {
        // Reference pointing along +y, robot ahead and to the right of it
        let reference = Pose2::new(1.0, 1.0, FRAC_PI_2);
        let robot = Pose2::new(1.5, 3.0, FRAC_PI_2 + 0.1);

        let err = robot.error_to(&reference);
        assert_abs_diff_eq!(err.along_track_m, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(err.cross_track_m, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(err.head_rad, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_heading_error_wraps() {
        let reference = Pose2::new(0.0, 0.0, PI - 0.05);
        let robot = Pose2::new(0.0, 0.0, -PI + 0.05);

        assert_abs_diff_eq!(robot.error_to(&reference).head_rad, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate() {
        let a = PoseWithCurvature::new(Pose2::new(0.0, 0.0, 0.0), 0.0, 0.0);
        let b = PoseWithCurvature::new(Pose2::new(2.0, 4.0, 1.0), 1.0, 0.5);

        let mid = a.interpolate(&b, 0.5);
        assert_abs_diff_eq!(mid.pose.position_m[0], 1.0);
        assert_abs_diff_eq!(mid.pose.position_m[1], 2.0);
        assert_abs_diff_eq!(mid.pose.heading_rad, 0.5);
        assert_abs_diff_eq!(mid.curv_m, 0.5);
        assert_abs_diff_eq!(mid.dkds, 0.25);
    }
}
