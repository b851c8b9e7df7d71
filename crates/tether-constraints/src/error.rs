//! Errors raised while building a constraint evaluator from a request.

use thiserror::Error;

/// Errors that can occur during constraint construction.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The request carries neither position nor orientation sub-constraints.
    #[error("no position or orientation constraint in request")]
    Empty,

    /// Position and orientation sub-constraints cannot be combined.
    #[error("combining position and orientation constraints is not supported")]
    PositionAndOrientation,

    /// A required pose entry is absent from the position sub-constraint.
    #[error("position constraint on {link}: missing pose {index}")]
    MissingPose { link: String, index: usize },

    /// Interval with lower bound above upper bound.
    #[error("invalid bounds: lower {lower} > upper {upper}")]
    InvalidBounds { lower: f64, upper: f64 },

    /// An equality axis narrower than the projection tolerance makes every
    /// sampled state invalid downstream.
    #[error("equality half-width {half_width} on axis {axis} is below the projection tolerance {tolerance}; planning would reject every state")]
    EqualityBelowTolerance {
        axis: usize,
        half_width: f64,
        tolerance: f64,
    },

    /// Start and end of a line constraint coincide; both residuals would be
    /// identically zero.
    #[error("line constraint on {link}: start and end positions coincide")]
    DegenerateLine { link: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
