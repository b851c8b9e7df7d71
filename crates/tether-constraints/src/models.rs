//! Pose-error models for the four constraint variants.
//!
//! Each model computes a raw error vector and its Jacobian from a link pose
//! and the link's geometric Jacobian. [`ConstraintModel`] is a closed
//! dispatch enum over all four; every variant implements exactly the
//! evaluation path it supports, so there is no fallback method to call by
//! mistake.
//!
//! - [`BoxPosition`] and [`OrientationDeviation`] produce errors that the
//!   evaluator shapes through [`Bounds`] penalties.
//! - [`EqualityPosition`] and [`LinePosition`] produce hard residuals
//!   directly.

use nalgebra::{DMatrix, Isometry3, Matrix2x3, Matrix3, Rotation3, UnitQuaternion, Vector2, Vector3};

use crate::bounds::Bounds;

/// Rotation angles below this use the Taylor limit of the rate map.
const SMALL_ANGLE: f64 = 1e-3;

// ---------------------------------------------------------------------------
// BoxPosition
// ---------------------------------------------------------------------------

/// Box-region position constraint around a target pose.
///
/// The Cartesian offset of the link from the target position is projected
/// into the target frame; each axis is then bounded by half the box extent.
#[derive(Debug, Clone)]
pub struct BoxPosition {
    /// Box center in the planning frame.
    pub target_position: Vector3<f64>,
    /// Orientation of the box (bounds apply along its axes).
    pub target_orientation: UnitQuaternion<f64>,
    /// Per-axis bounds, half the box extent on each side.
    pub bounds: [Bounds; 3],
}

impl BoxPosition {
    /// Position error in the target frame: `Rt^T (p - pt)`.
    pub fn error(&self, pose: &Isometry3<f64>) -> Vector3<f64> {
        frame_rotation(&self.target_orientation) * (pose.translation.vector - self.target_position)
    }

    /// Error Jacobian: `Rt^T · J_lin`.
    pub fn error_jacobian(&self, geometric_jacobian: &DMatrix<f64>) -> DMatrix<f64> {
        rotated_rows(
            &frame_rotation(&self.target_orientation),
            geometric_jacobian,
            0,
        )
    }
}

// ---------------------------------------------------------------------------
// EqualityPosition
// ---------------------------------------------------------------------------

/// Exact position equality on a subset of target-frame axes.
///
/// Free axes contribute hard zeros to both the residual and the Jacobian;
/// their extents were discarded at construction.
#[derive(Debug, Clone)]
pub struct EqualityPosition {
    /// Target position in the planning frame.
    pub target_position: Vector3<f64>,
    /// Frame in which axes are constrained.
    pub target_orientation: UnitQuaternion<f64>,
    /// Which target-frame axes are equality-constrained.
    pub constrained: [bool; 3],
}

impl EqualityPosition {
    /// Raw signed error on constrained axes, zero on free axes.
    pub fn residual(&self, pose: &Isometry3<f64>) -> Vector3<f64> {
        let error = frame_rotation(&self.target_orientation)
            * (pose.translation.vector - self.target_position);
        Vector3::from_fn(|i, _| if self.constrained[i] { error[i] } else { 0.0 })
    }

    /// Rows of `Rt^T · J_lin` for constrained axes, zero rows otherwise.
    pub fn residual_jacobian(&self, geometric_jacobian: &DMatrix<f64>) -> DMatrix<f64> {
        let mut jac = rotated_rows(
            &frame_rotation(&self.target_orientation),
            geometric_jacobian,
            0,
        );
        for (dim, constrained) in self.constrained.iter().enumerate() {
            if !constrained {
                jac.row_mut(dim).fill(0.0);
            }
        }
        jac
    }
}

// ---------------------------------------------------------------------------
// LinePosition
// ---------------------------------------------------------------------------

/// Pins the link position onto the 3-D line through `start` and `end`,
/// leaving motion along the line free.
///
/// Two planar cross-product residuals vanish exactly on the line, so this
/// variant has co-dimension 2.
#[derive(Debug, Clone)]
pub struct LinePosition {
    /// Frame in which the line is expressed.
    pub target_orientation: UnitQuaternion<f64>,
    /// Line start point.
    pub start: Vector3<f64>,
    /// Line end point.
    pub end: Vector3<f64>,
}

impl LinePosition {
    /// Both residuals, evaluated at the link position in the target frame.
    pub fn residual(&self, pose: &Isometry3<f64>) -> Vector2<f64> {
        let p = frame_rotation(&self.target_orientation) * pose.translation.vector;
        let d = self.end - self.start;
        Vector2::new(
            d.x * (p.y - self.start.y) - d.y * (p.x - self.start.x),
            d.y * (p.z - self.start.z) - d.z * (p.y - self.start.y),
        )
    }

    /// 2×3 map from Cartesian position rates to residual rates.
    fn residual_map(&self) -> Matrix2x3<f64> {
        let d = self.end - self.start;
        Matrix2x3::new(
            -d.y, d.x, 0.0, //
            0.0, -d.z, d.y,
        )
    }

    /// Residual Jacobian: the residual map composed with `Rt^T · J_lin`.
    pub fn residual_jacobian(&self, geometric_jacobian: &DMatrix<f64>) -> DMatrix<f64> {
        let lin = rotated_rows(
            &frame_rotation(&self.target_orientation),
            geometric_jacobian,
            0,
        );
        let map = self.residual_map();
        let n = lin.ncols();
        let mut jac = DMatrix::zeros(2, n);
        for col in 0..n {
            let rates = map * Vector3::new(lin[(0, col)], lin[(1, col)], lin[(2, col)]);
            jac[(0, col)] = rates.x;
            jac[(1, col)] = rates.y;
        }
        jac
    }
}

// ---------------------------------------------------------------------------
// OrientationDeviation
// ---------------------------------------------------------------------------

/// Orientation constraint parameterized with exponential coordinates.
///
/// The deviation from the target orientation is the rotation vector of
/// `Rerr = R(q)^T · Rt`; each component is bounded by the per-axis
/// tolerance.
#[derive(Debug, Clone)]
pub struct OrientationDeviation {
    /// Target orientation in the planning frame.
    pub target_orientation: UnitQuaternion<f64>,
    /// Per-axis bounds on the rotation-vector components.
    pub bounds: [Bounds; 3],
}

impl OrientationDeviation {
    /// Rotation-vector error `θ·a` of the relative rotation.
    pub fn error(&self, pose: &Isometry3<f64>) -> Vector3<f64> {
        let (angle, axis) = relative_angle_axis(&pose.rotation, &self.target_orientation);
        axis * angle
    }

    /// Error Jacobian: `−E(θ, a) · J_ang`, with `E` mapping angular velocity
    /// to rotation-vector rates.
    pub fn error_jacobian(
        &self,
        pose: &Isometry3<f64>,
        geometric_jacobian: &DMatrix<f64>,
    ) -> DMatrix<f64> {
        let (angle, axis) = relative_angle_axis(&pose.rotation, &self.target_orientation);
        let map = rotation_vector_rate_map(angle, &axis);
        let n = geometric_jacobian.ncols();
        let mut jac = DMatrix::zeros(3, n);
        for col in 0..n {
            let omega = Vector3::new(
                geometric_jacobian[(3, col)],
                geometric_jacobian[(4, col)],
                geometric_jacobian[(5, col)],
            );
            let rates = -(map * omega);
            jac[(0, col)] = rates.x;
            jac[(1, col)] = rates.y;
            jac[(2, col)] = rates.z;
        }
        jac
    }
}

// ---------------------------------------------------------------------------
// ConstraintModel
// ---------------------------------------------------------------------------

/// Closed set of pose-error models, one per constraint variant.
#[derive(Debug, Clone)]
pub enum ConstraintModel {
    /// Penalty-shaped box-region position constraint.
    Box(BoxPosition),
    /// Hard position equality on flagged axes.
    Equality(EqualityPosition),
    /// Hard on-a-line residuals, co-dimension 2.
    Line(LinePosition),
    /// Penalty-shaped orientation deviation.
    Orientation(OrientationDeviation),
}

impl ConstraintModel {
    /// Number of scalar constraint equations this model produces.
    pub fn co_dimension(&self) -> usize {
        match self {
            Self::Line(_) => 2,
            Self::Box(_) | Self::Equality(_) | Self::Orientation(_) => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared math
// ---------------------------------------------------------------------------

/// Rotation that takes planning-frame vectors into the target frame.
fn frame_rotation(target_orientation: &UnitQuaternion<f64>) -> Rotation3<f64> {
    target_orientation.to_rotation_matrix().transpose()
}

/// Angle and unit axis of `R^T · Rt`. Zero axis at identity.
fn relative_angle_axis(
    rotation: &UnitQuaternion<f64>,
    target_orientation: &UnitQuaternion<f64>,
) -> (f64, Vector3<f64>) {
    let relative = rotation.inverse() * target_orientation;
    match relative.axis() {
        Some(axis) => (relative.angle(), axis.into_inner()),
        None => (0.0, Vector3::zeros()),
    }
}

/// Rotate three consecutive Jacobian rows (starting at `first_row`) into
/// another frame, column by column.
fn rotated_rows(
    rotation: &Rotation3<f64>,
    jacobian: &DMatrix<f64>,
    first_row: usize,
) -> DMatrix<f64> {
    let n = jacobian.ncols();
    let mut out = DMatrix::zeros(3, n);
    for col in 0..n {
        let rotated = rotation
            * Vector3::new(
                jacobian[(first_row, col)],
                jacobian[(first_row + 1, col)],
                jacobian[(first_row + 2, col)],
            );
        out[(0, col)] = rotated.x;
        out[(1, col)] = rotated.y;
        out[(2, col)] = rotated.z;
    }
    out
}

fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y, //
        v.z, 0.0, -v.x, //
        -v.y, v.x, 0.0,
    )
}

/// Closed-form map from angular velocity to rotation-vector rates.
///
/// `E(θ, a) = I − ½[θa]× + [θa]×²/θ² · (1 − ½θ·sinθ/(1−cosθ))`
///
/// The formula divides by `θ²` and `1−cosθ`, so below [`SMALL_ANGLE`] the
/// second-order Taylor limit `I − ½[θa]× + [θa]×²/12` is returned instead.
/// Every entry of the result is finite for any input.
pub(crate) fn rotation_vector_rate_map(angle: f64, axis: &Vector3<f64>) -> Matrix3<f64> {
    let t = angle.abs();
    let r_skew = skew(&(axis * angle));

    if t < SMALL_ANGLE {
        return Matrix3::identity() - 0.5 * r_skew + r_skew * r_skew / 12.0;
    }

    let c = 1.0 - 0.5 * t * t.sin() / (1.0 - t.cos());
    Matrix3::identity() - 0.5 * r_skew + r_skew * r_skew / (t * t) * c
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn identity_bounds() -> [Bounds; 3] {
        [
            Bounds::symmetric(0.1).unwrap(),
            Bounds::symmetric(0.1).unwrap(),
            Bounds::symmetric(0.1).unwrap(),
        ]
    }

    // -- BoxPosition --

    #[test]
    fn box_error_zero_at_target() {
        let model = BoxPosition {
            target_position: Vector3::new(0.3, -0.1, 0.5),
            target_orientation: UnitQuaternion::identity(),
            bounds: identity_bounds(),
        };
        let pose = Isometry3::translation(0.3, -0.1, 0.5);
        let error = model.error(&pose);
        assert_relative_eq!(error.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn box_error_projected_into_target_frame() {
        // Target frame rotated 90° about z: its x-axis is world y
        let model = BoxPosition {
            target_position: Vector3::zeros(),
            target_orientation: UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
            bounds: identity_bounds(),
        };
        let pose = Isometry3::translation(0.0, 0.2, 0.0);
        let error = model.error(&pose);
        assert_relative_eq!(error.x, 0.2, epsilon = 1e-12);
        assert_relative_eq!(error.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(error.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn box_error_jacobian_rotates_linear_rows() {
        let model = BoxPosition {
            target_position: Vector3::zeros(),
            target_orientation: UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
            bounds: identity_bounds(),
        };
        let mut geo = DMatrix::zeros(6, 1);
        geo[(1, 0)] = 1.0; // pure world-y translation rate
        let jac = model.error_jacobian(&geo);
        assert_eq!(jac.shape(), (3, 1));
        assert_relative_eq!(jac[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(jac[(1, 0)], 0.0, epsilon = 1e-12);
    }

    // -- EqualityPosition --

    #[test]
    fn equality_free_axes_are_zero() {
        let model = EqualityPosition {
            target_position: Vector3::zeros(),
            target_orientation: UnitQuaternion::identity(),
            constrained: [true, false, true],
        };
        let pose = Isometry3::translation(0.1, 5.0, -0.2);
        let residual = model.residual(&pose);
        assert_relative_eq!(residual.x, 0.1, epsilon = 1e-12);
        assert_relative_eq!(residual.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(residual.z, -0.2, epsilon = 1e-12);
    }

    #[test]
    fn equality_jacobian_zeroes_free_rows() {
        let model = EqualityPosition {
            target_position: Vector3::zeros(),
            target_orientation: UnitQuaternion::identity(),
            constrained: [true, false, true],
        };
        let mut geo = DMatrix::zeros(6, 2);
        geo[(0, 0)] = 1.0;
        geo[(1, 0)] = 2.0;
        geo[(2, 1)] = 3.0;
        let jac = model.residual_jacobian(&geo);
        assert_relative_eq!(jac[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(jac[(1, 0)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(jac[(2, 1)], 3.0, epsilon = 1e-12);
    }

    // -- LinePosition --

    #[test]
    fn line_residual_zero_on_the_line() {
        let model = LinePosition {
            target_orientation: UnitQuaternion::identity(),
            start: Vector3::new(0.1, 0.2, 0.3),
            end: Vector3::new(0.7, -0.4, 0.9),
        };
        let d = model.end - model.start;
        for s in [0.0, 0.37, 1.0] {
            let p = model.start + d * s;
            let pose = Isometry3::translation(p.x, p.y, p.z);
            let residual = model.residual(&pose);
            assert_relative_eq!(residual.norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn line_residual_sign_tracks_side() {
        // Line along x through the origin: r0 = d.x * p.y
        let model = LinePosition {
            target_orientation: UnitQuaternion::identity(),
            start: Vector3::zeros(),
            end: Vector3::new(1.0, 0.0, 0.0),
        };
        let above = model.residual(&Isometry3::translation(0.5, 0.2, 0.0));
        let below = model.residual(&Isometry3::translation(0.5, -0.2, 0.0));
        assert!(above.x > 0.0);
        assert!(below.x < 0.0);
        assert_relative_eq!(above.x, -below.x, epsilon = 1e-12);
    }

    #[test]
    fn line_jacobian_matches_residual_map() {
        let model = LinePosition {
            target_orientation: UnitQuaternion::identity(),
            start: Vector3::new(0.0, 0.0, 0.0),
            end: Vector3::new(0.2, 0.5, -0.3),
        };
        // Identity-ish geometric Jacobian: one column per Cartesian direction
        let mut geo = DMatrix::zeros(6, 3);
        geo[(0, 0)] = 1.0;
        geo[(1, 1)] = 1.0;
        geo[(2, 2)] = 1.0;
        let jac = model.residual_jacobian(&geo);
        let d = model.end - model.start;
        assert_relative_eq!(jac[(0, 0)], -d.y, epsilon = 1e-12);
        assert_relative_eq!(jac[(0, 1)], d.x, epsilon = 1e-12);
        assert_relative_eq!(jac[(0, 2)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(jac[(1, 0)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(jac[(1, 1)], -d.z, epsilon = 1e-12);
        assert_relative_eq!(jac[(1, 2)], d.y, epsilon = 1e-12);
    }

    // -- OrientationDeviation --

    #[test]
    fn orientation_error_zero_at_target() {
        let target = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.8);
        let model = OrientationDeviation {
            target_orientation: target,
            bounds: identity_bounds(),
        };
        let pose = Isometry3::from_parts(nalgebra::Translation3::identity(), target);
        let error = model.error(&pose);
        assert_relative_eq!(error.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn orientation_error_ninety_degrees_about_known_axis() {
        let model = OrientationDeviation {
            target_orientation: UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2),
            bounds: identity_bounds(),
        };
        let pose = Isometry3::identity();
        let error = model.error(&pose);
        assert_relative_eq!(error.norm(), FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(error.x, FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(error.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(error.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn orientation_jacobian_finite_near_identity() {
        let model = OrientationDeviation {
            // 1e-9 rad from identity, deep inside the small-angle branch
            target_orientation: UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 1e-9),
            bounds: identity_bounds(),
        };
        let pose = Isometry3::identity();
        let mut geo = DMatrix::zeros(6, 2);
        geo[(3, 0)] = 1.0;
        geo[(5, 1)] = 1.0;
        let jac = model.error_jacobian(&pose, &geo);
        assert!(jac.iter().all(|v| v.is_finite()));
        // At identity the map is I, so the Jacobian is just −J_ang
        assert_relative_eq!(jac[(0, 0)], -1.0, epsilon = 1e-6);
        assert_relative_eq!(jac[(2, 1)], -1.0, epsilon = 1e-6);
    }

    // -- rotation_vector_rate_map --

    #[test]
    fn rate_map_identity_at_zero_angle() {
        let map = rotation_vector_rate_map(0.0, &Vector3::zeros());
        assert_relative_eq!(map, Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn rate_map_branches_agree_at_threshold() {
        let axis = Vector3::new(1.0, 2.0, -0.5).normalize();
        let below = rotation_vector_rate_map(SMALL_ANGLE * 0.999, &axis);
        let above = rotation_vector_rate_map(SMALL_ANGLE * 1.001, &axis);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(below[(i, j)], above[(i, j)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn rate_map_finite_for_large_angles() {
        let axis = Vector3::z();
        for angle in [0.5, 1.0, 2.0, PI - 1e-3] {
            let map = rotation_vector_rate_map(angle, &axis);
            assert!(map.iter().all(|v| v.is_finite()));
        }
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn models_are_send_sync() {
        assert_send_sync::<ConstraintModel>();
    }
}
