//! Serial-chain forward kinematics and geometric Jacobians for tether.
//!
//! Provides [`KinematicChain`], a programmatically constructed chain of
//! revolute and prismatic joints that implements
//! [`KinematicsProvider`](tether_core::KinematicsProvider). The constraint
//! layer only sees the trait, so a chain can be swapped for any other
//! kinematics backend.
//!
//! ```text
//! Vec<Joint> ──► KinematicChain ──► pose(q), geometric_jacobian(q)
//! ```

pub mod chain;

pub use chain::{Joint, KinematicChain};
