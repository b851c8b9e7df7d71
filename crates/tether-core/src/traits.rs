//! Capability trait for the kinematics side of constraint evaluation.

use nalgebra::{DMatrix, Isometry3};

/// Supplies the pose and geometric Jacobian of one robot link for a fixed
/// joint group.
///
/// Implementations typically write the joint values into internal scratch
/// state before reading out the pose, which is why both methods take
/// `&mut self`. A provider instance must not be shared across threads; the
/// constraint evaluator itself is immutable and takes the provider as an
/// explicit parameter on every call, so each planning thread owns its own
/// provider.
pub trait KinematicsProvider {
    /// Number of joints in the group (length expected for `q`).
    fn dof(&self) -> usize;

    /// Pose of the constrained link in the planning frame at configuration `q`.
    fn link_pose(&mut self, q: &[f64]) -> Isometry3<f64>;

    /// 6×dof geometric Jacobian of the link at configuration `q`.
    ///
    /// Top three rows are translational, bottom three rotational.
    fn geometric_jacobian(&mut self, q: &[f64]) -> DMatrix<f64>;
}
