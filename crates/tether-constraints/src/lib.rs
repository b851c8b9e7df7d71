//! Pose constraints as differentiable equality systems for sampling-based
//! planners.
//!
//! A declarative [`ConstraintRequest`] (box-region position limits, exact
//! position equalities, on-a-line constraints, orientation-deviation limits)
//! is turned into a [`ConstraintEvaluator`] exposing the planner-facing
//! contract `F(q) = 0` with Jacobian `dF/dq`.
//!
//! # Architecture
//!
//! ```text
//! ConstraintRequest ──► build_constraint ──► ConstraintEvaluator
//!                                                │ function(q), jacobian(q)
//!                                                ▼
//!                                        KinematicsProvider
//! ```
//!
//! Inequality bounds become equalities through the piecewise-linear
//! [`Bounds`] penalty; equality and line variants emit raw residuals
//! instead. The evaluator is immutable after construction and safe to share
//! across planning threads; the kinematics context is passed explicitly
//! (`&mut`) on every call.

pub mod bounds;
pub mod error;
pub mod evaluator;
pub mod factory;
pub mod models;
pub mod request;

pub use bounds::Bounds;
pub use error::BuildError;
pub use evaluator::ConstraintEvaluator;
pub use factory::{build_constraint, EQUALITY_CONSTRAINTS_NAME, LINEAR_SYSTEM_CONSTRAINTS_NAME};
pub use models::ConstraintModel;
pub use request::{
    ConstraintRequest, OrientationConstraintRequest, PoseSpec, PositionConstraintRequest,
};
