//! Builds a [`ConstraintEvaluator`] from a declarative request.
//!
//! Exactly one variant is selected per request: the free-form constraint
//! name routes position sub-constraints to the box, equality, or line
//! model, and requests with only orientation sub-constraints build the
//! (experimental) orientation model. Combining position and orientation
//! sub-constraints is not supported.

use tracing::{info, warn};

use tether_core::ToleranceConfig;

use crate::bounds::Bounds;
use crate::error::BuildError;
use crate::evaluator::ConstraintEvaluator;
use crate::models::{
    BoxPosition, ConstraintModel, EqualityPosition, LinePosition, OrientationDeviation,
};
use crate::request::{ConstraintRequest, OrientationConstraintRequest, PositionConstraintRequest};

/// Request name selecting the equality position variant.
pub const EQUALITY_CONSTRAINTS_NAME: &str = "use_equality_constraints";

/// Request name selecting the on-a-line position variant.
pub const LINEAR_SYSTEM_CONSTRAINTS_NAME: &str = "linear_system_constraints";

/// Direction vectors shorter than this make a line constraint degenerate.
const MIN_LINE_DIRECTION_NORM: f64 = 1e-12;

/// Build a constraint evaluator from a declarative request.
///
/// `num_dofs` is the joint count of the planning group; `config` supplies
/// the projection tolerance and the equality half-width threshold.
pub fn build_constraint(
    request: &ConstraintRequest,
    num_dofs: usize,
    config: &ToleranceConfig,
) -> Result<ConstraintEvaluator, BuildError> {
    let num_position = request.position.len();
    let num_orientation = request.orientation.len();

    if num_position > 1 {
        warn!("only a single position constraint is supported, using the first");
    }
    if num_orientation > 1 {
        warn!("only a single orientation constraint is supported, using the first");
    }

    if num_position > 0 && num_orientation > 0 {
        return Err(BuildError::PositionAndOrientation);
    }

    if num_position > 0 {
        let position = &request.position[0];
        let model = match request.name.as_str() {
            EQUALITY_CONSTRAINTS_NAME => {
                info!(link = %position.link_name, "using equality position constraints");
                build_equality(position, config)?
            }
            LINEAR_SYSTEM_CONSTRAINTS_NAME => {
                info!(link = %position.link_name, "using on-a-line position constraints");
                build_line(position)?
            }
            _ => {
                info!(link = %position.link_name, "using bounded position constraints");
                build_box(position)?
            }
        };
        let tolerance = config.projection_tolerance;
        return Ok(ConstraintEvaluator::new(
            position.link_name.clone(),
            num_dofs,
            tolerance,
            model,
        ));
    }

    if num_orientation > 0 {
        let orientation = &request.orientation[0];
        warn!(
            link = %orientation.link_name,
            "orientation constraints are experimental"
        );
        let model = build_orientation(orientation)?;
        return Ok(ConstraintEvaluator::new(
            orientation.link_name.clone(),
            num_dofs,
            config.projection_tolerance,
            model,
        ));
    }

    Err(BuildError::Empty)
}

// ---------------------------------------------------------------------------
// Variant builders
// ---------------------------------------------------------------------------

fn build_box(position: &PositionConstraintRequest) -> Result<ConstraintModel, BuildError> {
    let target = required_pose(position, 0)?;
    let bounds = position_bounds(&position.dimensions)?;
    for (axis, bound) in bounds.iter().enumerate() {
        info!(axis, %bound, "parsed position constraint");
    }

    Ok(ConstraintModel::Box(BoxPosition {
        target_position: target.position_vector(),
        target_orientation: target.orientation_quaternion(),
        bounds,
    }))
}

fn build_equality(
    position: &PositionConstraintRequest,
    config: &ToleranceConfig,
) -> Result<ConstraintModel, BuildError> {
    let target = required_pose(position, 0)?;
    let constrained = constrained_axes(&position.dimensions, config)?;
    if !constrained.iter().any(|&c| c) {
        warn!(
            link = %position.link_name,
            "equality constraint flags no axis, every state satisfies it"
        );
    }
    for (axis, &flag) in constrained.iter().enumerate() {
        info!(axis, constrained = flag, "parsed equality constraint");
    }

    Ok(ConstraintModel::Equality(EqualityPosition {
        target_position: target.position_vector(),
        target_orientation: target.orientation_quaternion(),
        constrained,
    }))
}

fn build_line(position: &PositionConstraintRequest) -> Result<ConstraintModel, BuildError> {
    let start = required_pose(position, 0)?;
    let end = required_pose(position, 1)?;

    let start_position = start.position_vector();
    let end_position = end.position_vector();
    if (end_position - start_position).norm() < MIN_LINE_DIRECTION_NORM {
        return Err(BuildError::DegenerateLine {
            link: position.link_name.clone(),
        });
    }

    Ok(ConstraintModel::Line(LinePosition {
        target_orientation: start.orientation_quaternion(),
        start: start_position,
        end: end_position,
    }))
}

fn build_orientation(
    orientation: &OrientationConstraintRequest,
) -> Result<ConstraintModel, BuildError> {
    let bounds = orientation_bounds(&orientation.absolute_tolerances)?;
    for (axis, bound) in bounds.iter().enumerate() {
        info!(axis, %bound, "parsed orientation constraint");
    }

    Ok(ConstraintModel::Orientation(OrientationDeviation {
        target_orientation: orientation.orientation_quaternion(),
        bounds,
    }))
}

// ---------------------------------------------------------------------------
// Bound extraction
// ---------------------------------------------------------------------------

/// Box extents to symmetric per-axis bounds; a negative extent marks the
/// axis unconstrained.
fn position_bounds(dimensions: &[f64; 3]) -> Result<[Bounds; 3], BuildError> {
    let mut bounds = [Bounds::unbounded(); 3];
    for (axis, &extent) in dimensions.iter().enumerate() {
        if extent >= 0.0 {
            bounds[axis] = Bounds::symmetric(extent / 2.0)?;
        }
    }
    Ok(bounds)
}

/// Rotation-vector tolerances to bounds centered on zero deviation; a
/// negative tolerance marks the axis unconstrained.
fn orientation_bounds(tolerances: &[f64; 3]) -> Result<[Bounds; 3], BuildError> {
    let mut bounds = [Bounds::unbounded(); 3];
    for (axis, &tolerance) in tolerances.iter().enumerate() {
        if tolerance >= 0.0 {
            bounds[axis] = Bounds::symmetric(tolerance)?;
        }
    }
    Ok(bounds)
}

/// Per-axis equality flags from the box extents.
///
/// An axis is constrained when its half-width falls below the equality
/// threshold; a constrained half-width below the projection tolerance
/// would reject every sampled state and fails the build.
fn constrained_axes(
    dimensions: &[f64; 3],
    config: &ToleranceConfig,
) -> Result<[bool; 3], BuildError> {
    let mut constrained = [false; 3];
    for (axis, &extent) in dimensions.iter().enumerate() {
        if extent < 0.0 {
            continue;
        }
        let half_width = extent / 2.0;
        if half_width < config.equality_threshold {
            if half_width < config.projection_tolerance {
                return Err(BuildError::EqualityBelowTolerance {
                    axis,
                    half_width,
                    tolerance: config.projection_tolerance,
                });
            }
            constrained[axis] = true;
        }
    }
    Ok(constrained)
}

fn required_pose<'a>(
    position: &'a PositionConstraintRequest,
    index: usize,
) -> Result<&'a crate::request::PoseSpec, BuildError> {
    position.poses.get(index).ok_or_else(|| BuildError::MissingPose {
        link: position.link_name.clone(),
        index,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
