//! Kinematic chain built from an ordered list of joints.
//!
//! A [`KinematicChain`] stores the static transforms (origins) and joint
//! axes needed for forward kinematics and geometric Jacobian computation of
//! the chain tip. Joints are supplied programmatically; fixed transforms
//! after the last joint are folded into the tip offset.

use nalgebra::{DMatrix, Isometry3, UnitVector3, Vector3};

use tether_core::KinematicsProvider;

/// A single joint in the kinematic chain.
#[derive(Debug, Clone)]
pub struct Joint {
    /// Name of this joint.
    pub name: String,
    /// Static transform from the parent link frame to this joint frame.
    pub origin: Isometry3<f64>,
    /// Joint axis in the joint's local frame.
    pub axis: UnitVector3<f64>,
    /// Whether this is a prismatic joint (false = revolute).
    pub is_prismatic: bool,
}

impl Joint {
    /// Create a revolute joint.
    pub fn revolute(name: impl Into<String>, origin: Isometry3<f64>, axis: Vector3<f64>) -> Self {
        Self {
            name: name.into(),
            origin,
            axis: UnitVector3::new_normalize(axis),
            is_prismatic: false,
        }
    }

    /// Create a prismatic joint.
    pub fn prismatic(name: impl Into<String>, origin: Isometry3<f64>, axis: Vector3<f64>) -> Self {
        Self {
            name: name.into(),
            origin,
            axis: UnitVector3::new_normalize(axis),
            is_prismatic: true,
        }
    }
}

/// An ordered kinematic chain from base to a constrained link.
///
/// Only actuated joints appear in the list; any trailing fixed transform
/// (e.g. a flange or tool offset) goes into `tip_offset`.
#[derive(Debug, Clone)]
pub struct KinematicChain {
    /// Ordered joints from base to tip.
    joints: Vec<Joint>,
    /// Transform from the last joint's child frame to the constrained link.
    tip_offset: Isometry3<f64>,
}

impl KinematicChain {
    /// Build a chain from ordered joints with an identity tip offset.
    pub fn new(joints: Vec<Joint>) -> Self {
        Self {
            joints,
            tip_offset: Isometry3::identity(),
        }
    }

    /// Set the transform from the last joint's child frame to the link.
    #[must_use]
    pub fn with_tip_offset(mut self, tip_offset: Isometry3<f64>) -> Self {
        self.tip_offset = tip_offset;
        self
    }

    /// Joint names in chain order.
    pub fn joint_names(&self) -> Vec<&str> {
        self.joints.iter().map(|j| j.name.as_str()).collect()
    }

    /// Access the joint definitions.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Compute forward kinematics: joint positions -> link pose in the base
    /// frame.
    ///
    /// # Panics
    ///
    /// Panics if `q.len() != self.dof()`.
    pub fn pose(&self, q: &[f64]) -> Isometry3<f64> {
        assert_eq!(q.len(), self.joints.len(), "q.len() must equal chain DOF");

        let mut transform = Isometry3::identity();
        for (joint, &position) in self.joints.iter().zip(q.iter()) {
            transform *= joint.origin;
            transform *= joint_transform(&joint.axis, joint.is_prismatic, position);
        }
        transform * self.tip_offset
    }

    /// Per-joint frames for Jacobian computation.
    ///
    /// Returns (joint_origins_in_base, joint_axes_in_base, tip_position).
    fn joint_frames(&self, q: &[f64]) -> (Vec<Vector3<f64>>, Vec<Vector3<f64>>, Vector3<f64>) {
        let mut transform = Isometry3::identity();
        let mut origins = Vec::with_capacity(self.joints.len());
        let mut axes = Vec::with_capacity(self.joints.len());

        for (joint, &position) in self.joints.iter().zip(q.iter()) {
            transform *= joint.origin;

            // Joint origin and axis in the base frame BEFORE joint motion
            origins.push(transform.translation.vector);
            axes.push(transform.rotation * joint.axis.into_inner());

            transform *= joint_transform(&joint.axis, joint.is_prismatic, position);
        }

        let tip = (transform * self.tip_offset).translation.vector;
        (origins, axes, tip)
    }
}

impl KinematicsProvider for KinematicChain {
    fn dof(&self) -> usize {
        self.joints.len()
    }

    fn link_pose(&mut self, q: &[f64]) -> Isometry3<f64> {
        self.pose(q)
    }

    /// Standard geometric Jacobian columns: `z × (p − o)` / `z` for revolute
    /// joints, `z` / `0` for prismatic joints.
    fn geometric_jacobian(&mut self, q: &[f64]) -> DMatrix<f64> {
        assert_eq!(q.len(), self.joints.len(), "q.len() must equal chain DOF");

        let n = self.joints.len();
        let (origins, axes, tip) = self.joint_frames(q);
        let mut jacobian = DMatrix::zeros(6, n);

        for i in 0..n {
            let z_i = &axes[i];
            if self.joints[i].is_prismatic {
                jacobian[(0, i)] = z_i.x;
                jacobian[(1, i)] = z_i.y;
                jacobian[(2, i)] = z_i.z;
                // Angular rows stay zero
            } else {
                let r = tip - origins[i];
                let cross = z_i.cross(&r);
                jacobian[(0, i)] = cross.x;
                jacobian[(1, i)] = cross.y;
                jacobian[(2, i)] = cross.z;
                jacobian[(3, i)] = z_i.x;
                jacobian[(4, i)] = z_i.y;
                jacobian[(5, i)] = z_i.z;
            }
        }

        jacobian
    }
}

/// Compute the transform for a single joint at a given position.
fn joint_transform(axis: &UnitVector3<f64>, is_prismatic: bool, position: f64) -> Isometry3<f64> {
    use nalgebra::{Translation3, UnitQuaternion};

    if is_prismatic {
        Isometry3::from_parts(
            Translation3::from(axis.into_inner() * position),
            UnitQuaternion::identity(),
        )
    } else {
        Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(axis, position),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
