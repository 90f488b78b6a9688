//! External curve-evaluation seam.
//!
//! Spline tessellation needs a NURBS evaluator, which is deliberately not
//! part of this crate.  The converter samples the parameter range itself
//! and asks the collaborator for one point per parameter value.

use crate::types::Vector3;

/// Evaluates a parametric spline at a single parameter value.
///
/// `knots` spans the full knot vector; `t` lies in
/// `[knots[0], knots[knots.len() - 1]]`.  `weights` always has one entry
/// per control point (1.0 for non-rational curves).
pub trait CurveEvaluator {
    fn eval(
        &self,
        degree: usize,
        knots: &[f64],
        control_points: &[Vector3],
        weights: &[f64],
        t: f64,
    ) -> Vector3;
}
