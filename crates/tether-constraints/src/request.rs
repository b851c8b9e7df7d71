//! Declarative constraint request types.
//!
//! A [`ConstraintRequest`] is the wire-level description a planning client
//! sends: zero or more position sub-constraints, zero or more orientation
//! sub-constraints, and a free-form name that selects the constraint
//! variant. Vectors are plain arrays and orientations are `[x, y, z, w]`
//! quaternions so requests can be written in TOML.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use tether_core::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_orientation() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

// ---------------------------------------------------------------------------
// PoseSpec
// ---------------------------------------------------------------------------

/// A pose in the planning frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSpec {
    /// Position [x, y, z] in meters.
    #[serde(default)]
    pub position: [f64; 3],

    /// Orientation quaternion [x, y, z, w] (default: identity).
    #[serde(default = "default_orientation")]
    pub orientation: [f64; 4],
}

impl Default for PoseSpec {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            orientation: default_orientation(),
        }
    }
}

impl PoseSpec {
    /// Position as a nalgebra vector.
    pub fn position_vector(&self) -> Vector3<f64> {
        Vector3::new(self.position[0], self.position[1], self.position[2])
    }

    /// Orientation as a unit quaternion (normalized on conversion).
    pub fn orientation_quaternion(&self) -> UnitQuaternion<f64> {
        let [x, y, z, w] = self.orientation;
        UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z))
    }
}

// ---------------------------------------------------------------------------
// PositionConstraintRequest
// ---------------------------------------------------------------------------

/// Bounds on the position of a link, expressed as a box region around a
/// target pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionConstraintRequest {
    /// Robot link the constraint applies to.
    pub link_name: String,

    /// Full box extents [x, y, z] along the target-frame axes. A negative
    /// extent marks that axis unconstrained.
    pub dimensions: [f64; 3],

    /// Region poses. Pose 0 is the target pose (box center / line start);
    /// pose 1 is the line end point for the line variant.
    #[serde(default)]
    pub poses: Vec<PoseSpec>,
}

// ---------------------------------------------------------------------------
// OrientationConstraintRequest
// ---------------------------------------------------------------------------

/// Bounds on the orientation deviation of a link from a target orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationConstraintRequest {
    /// Robot link the constraint applies to.
    pub link_name: String,

    /// Target orientation quaternion [x, y, z, w] (default: identity).
    #[serde(default = "default_orientation")]
    pub orientation: [f64; 4],

    /// Per-axis rotation-vector tolerances [x, y, z] in radians, centered
    /// at zero deviation. A negative tolerance marks that axis
    /// unconstrained.
    pub absolute_tolerances: [f64; 3],
}

impl OrientationConstraintRequest {
    /// Target orientation as a unit quaternion.
    pub fn orientation_quaternion(&self) -> UnitQuaternion<f64> {
        let [x, y, z, w] = self.orientation;
        UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z))
    }
}

// ---------------------------------------------------------------------------
// ConstraintRequest
// ---------------------------------------------------------------------------

/// A full declarative constraint description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRequest {
    /// Free-form name; `"use_equality_constraints"` and
    /// `"linear_system_constraints"` select dedicated variants.
    #[serde(default)]
    pub name: String,

    /// Position sub-constraints; only the first is used.
    #[serde(default)]
    pub position: Vec<PositionConstraintRequest>,

    /// Orientation sub-constraints; only the first is used.
    #[serde(default)]
    pub orientation: Vec<OrientationConstraintRequest>,
}

impl ConstraintRequest {
    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pose_spec_defaults_to_identity() {
        let pose = PoseSpec::default();
        assert_eq!(pose.position, [0.0; 3]);
        let q = pose.orientation_quaternion();
        assert_relative_eq!(q.angle(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn pose_spec_conversion() {
        let pose = PoseSpec {
            position: [0.1, 0.2, 0.3],
            // 90 degrees about z
            orientation: [0.0, 0.0, std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2],
        };
        let p = pose.position_vector();
        assert_relative_eq!(p.y, 0.2, epsilon = 1e-12);
        let q = pose.orientation_quaternion();
        assert_relative_eq!(q.angle(), std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn orientation_quaternion_is_normalized() {
        let pose = PoseSpec {
            position: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 2.0],
        };
        let q = pose.orientation_quaternion();
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn request_toml_deserialization() {
        let toml_str = r#"
            name = "use_equality_constraints"

            [[position]]
            link_name = "tool0"
            dimensions = [0.0005, 1.0, 0.0005]

            [[position.poses]]
            position = [0.3, 0.0, 0.5]
        "#;
        let request: ConstraintRequest = toml::from_str(toml_str).unwrap();
        assert_eq!(request.name, "use_equality_constraints");
        assert_eq!(request.position.len(), 1);
        assert!(request.orientation.is_empty());
        assert_eq!(request.position[0].link_name, "tool0");
        assert_relative_eq!(request.position[0].dimensions[1], 1.0);
        assert_eq!(request.position[0].poses.len(), 1);
        assert_relative_eq!(request.position[0].poses[0].position[2], 0.5);
        // Defaulted orientation
        assert_eq!(request.position[0].poses[0].orientation, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn request_toml_orientation_constraint() {
        let toml_str = r#"
            [[orientation]]
            link_name = "tool0"
            orientation = [0.0, 0.0, 0.0, 1.0]
            absolute_tolerances = [0.1, 0.1, -1.0]
        "#;
        let request: ConstraintRequest = toml::from_str(toml_str).unwrap();
        assert!(request.name.is_empty());
        assert_eq!(request.orientation.len(), 1);
        assert_relative_eq!(request.orientation[0].absolute_tolerances[2], -1.0);
    }

    #[test]
    fn request_from_file() {
        let dir = std::env::temp_dir().join("tether_test_constraint_request");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("request.toml");
        std::fs::write(
            &path,
            r#"
            name = "path_constraints"

            [[position]]
            link_name = "gripper"
            dimensions = [0.2, 0.2, -1.0]

            [[position.poses]]
            position = [0.4, 0.1, 0.3]
        "#,
        )
        .unwrap();

        let request = ConstraintRequest::from_file(&path).unwrap();
        assert_eq!(request.name, "path_constraints");
        assert_eq!(request.position[0].link_name, "gripper");

        // Cleanup
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn request_default_is_empty() {
        let request = ConstraintRequest::default();
        assert!(request.name.is_empty());
        assert!(request.position.is_empty());
        assert!(request.orientation.is_empty());
    }
}
