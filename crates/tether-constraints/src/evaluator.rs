//! Planner-facing constraint evaluation.
//!
//! A [`ConstraintEvaluator`] composes a pose-error model with per-dimension
//! bounds into the `F(q) = 0` / `dF/dq` contract a constrained state space
//! expects. The evaluator is immutable after construction and holds no
//! kinematics state; the provider is passed explicitly on every call so
//! each planning thread owns its own scratch.

use nalgebra::{DMatrix, DVector, UnitQuaternion, Vector3};

use tether_core::{EvalError, KinematicsProvider};

use crate::models::ConstraintModel;

/// Evaluates one pose constraint as an equality system.
#[derive(Debug, Clone)]
pub struct ConstraintEvaluator {
    link_name: String,
    num_dofs: usize,
    tolerance: f64,
    model: ConstraintModel,
}

impl ConstraintEvaluator {
    pub(crate) fn new(
        link_name: String,
        num_dofs: usize,
        tolerance: f64,
        model: ConstraintModel,
    ) -> Self {
        Self {
            link_name,
            num_dofs,
            tolerance,
            model,
        }
    }

    /// Number of scalar constraint equations.
    pub fn co_dimension(&self) -> usize {
        self.model.co_dimension()
    }

    /// Expected joint vector length.
    pub fn dof(&self) -> usize {
        self.num_dofs
    }

    /// Acceptance tolerance on `‖function(q)‖`.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Robot link the constraint applies to.
    pub fn link_name(&self) -> &str {
        &self.link_name
    }

    /// Nominal position target, if the variant has one.
    ///
    /// The line variant reports its start point; the orientation variant
    /// constrains no position and returns `None`.
    pub fn target_position(&self) -> Option<Vector3<f64>> {
        match &self.model {
            ConstraintModel::Box(m) => Some(m.target_position),
            ConstraintModel::Equality(m) => Some(m.target_position),
            ConstraintModel::Line(m) => Some(m.start),
            ConstraintModel::Orientation(_) => None,
        }
    }

    /// Target orientation (frame of the bounds, or the orientation target).
    pub fn target_orientation(&self) -> UnitQuaternion<f64> {
        match &self.model {
            ConstraintModel::Box(m) => m.target_orientation,
            ConstraintModel::Equality(m) => m.target_orientation,
            ConstraintModel::Line(m) => m.target_orientation,
            ConstraintModel::Orientation(m) => m.target_orientation,
        }
    }

    /// The underlying pose-error model.
    pub fn model(&self) -> &ConstraintModel {
        &self.model
    }

    /// Constraint function `F(q)`, one entry per constraint equation.
    pub fn function<K>(&self, kinematics: &mut K, q: &[f64]) -> Result<DVector<f64>, EvalError>
    where
        K: KinematicsProvider + ?Sized,
    {
        self.check_dof(q)?;
        let pose = kinematics.link_pose(q);

        Ok(match &self.model {
            ConstraintModel::Box(m) => {
                let error = m.error(&pose);
                DVector::from_fn(3, |i, _| m.bounds[i].penalty(error[i]))
            }
            ConstraintModel::Equality(m) => {
                let residual = m.residual(&pose);
                DVector::from_column_slice(residual.as_slice())
            }
            ConstraintModel::Line(m) => {
                let residual = m.residual(&pose);
                DVector::from_column_slice(residual.as_slice())
            }
            ConstraintModel::Orientation(m) => {
                let error = m.error(&pose);
                DVector::from_fn(3, |i, _| m.bounds[i].penalty(error[i]))
            }
        })
    }

    /// Constraint Jacobian `dF/dq`, of shape co_dimension × dof.
    ///
    /// For penalty-shaped variants each error-Jacobian row is scaled by the
    /// penalty sub-gradient; the chain rule is applied to the outer penalty
    /// only.
    pub fn jacobian<K>(&self, kinematics: &mut K, q: &[f64]) -> Result<DMatrix<f64>, EvalError>
    where
        K: KinematicsProvider + ?Sized,
    {
        self.check_dof(q)?;
        let pose = kinematics.link_pose(q);
        let geometric = kinematics.geometric_jacobian(q);

        Ok(match &self.model {
            ConstraintModel::Box(m) => {
                let error = m.error(&pose);
                let mut jac = m.error_jacobian(&geometric);
                for dim in 0..3 {
                    let scale = m.bounds[dim].derivative(error[dim]);
                    jac.row_mut(dim).scale_mut(scale);
                }
                jac
            }
            ConstraintModel::Equality(m) => m.residual_jacobian(&geometric),
            ConstraintModel::Line(m) => m.residual_jacobian(&geometric),
            ConstraintModel::Orientation(m) => {
                let error = m.error(&pose);
                let mut jac = m.error_jacobian(&pose, &geometric);
                for dim in 0..3 {
                    let scale = m.bounds[dim].derivative(error[dim]);
                    jac.row_mut(dim).scale_mut(scale);
                }
                jac
            }
        })
    }

    fn check_dof(&self, q: &[f64]) -> Result<(), EvalError> {
        if q.len() != self.num_dofs {
            return Err(EvalError::DofMismatch {
                expected: self.num_dofs,
                got: q.len(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
