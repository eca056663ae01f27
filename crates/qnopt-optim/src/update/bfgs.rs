//! BFGS rank-two update of the direct Hessian approximation.
//!
//! ```text
//! B_{k+1} = B_k - (B_k s)(s^T B_k) / (s^T B_k s) + y y^T / (y^T s)
//! ```
//!
//! For symmetric `B_k` the result is symmetric and satisfies the secant
//! equation `B_{k+1} s = y`. Rounding makes the two off-diagonal halves drift
//! apart slowly, so the result is symmetrized as `(B + B^T) / 2`.
//!
//! # References
//!
//! - Nocedal & Wright, "Numerical Optimization" (2006), eq. (6.19)

use super::{check_shapes, degenerate, DegeneratePolicy, HessianUpdate, SecantPair};
use qnopt_core::{
    error::Result,
    types::{matrix_all_finite, DMatrix, Scalar},
};
use num_traits::Float;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// BFGS update strategy.
///
/// Both denominators are checked relative to the scale of the pair:
/// `|y^T s| <= tol * ‖y‖ ‖s‖` and `|s^T B s| <= tol * ‖B‖_F ‖s‖²` count as
/// degenerate, as does a zero step.
///
/// # Examples
///
/// ```
/// use qnopt_optim::update::{Bfgs, DegeneratePolicy};
///
/// let strict = Bfgs::<f64>::new().with_policy(DegeneratePolicy::Error);
/// assert_eq!(strict.policy, DegeneratePolicy::Error);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bfgs<T>
where
    T: Scalar,
{
    /// Policy for degenerate denominators
    pub policy: DegeneratePolicy,
    /// Relative degeneracy threshold
    pub tolerance: T,
}

impl<T> Default for Bfgs<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            policy: DegeneratePolicy::Skip,
            tolerance: T::DEGENERACY_TOLERANCE,
        }
    }
}

impl<T> Bfgs<T>
where
    T: Scalar,
{
    /// Creates a BFGS strategy with the skip policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the degenerate-denominator policy.
    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the relative degeneracy threshold.
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl<T> HessianUpdate<T> for Bfgs<T>
where
    T: Scalar,
{
    fn name(&self) -> &str {
        "BFGS"
    }

    fn update_secant(&self, hessian: &DMatrix<T>, pair: &SecantPair<T>) -> Result<DMatrix<T>> {
        check_shapes(hessian, pair)?;
        let s = &pair.s;
        let y = &pair.y;

        let s_norm = s.norm();
        let sy = pair.curvature();
        // `!(a > b)` also catches NaN.
        if !(<T as Float>::abs(sy) > self.tolerance * y.norm() * s_norm) || s_norm == T::zero() {
            return degenerate(self.policy, self.name(), "y^T s", sy, hessian);
        }

        let bs = hessian * s;
        let s_b = s.transpose() * hessian;
        let sbs = s.dot(&bs);
        if !(<T as Float>::abs(sbs) > self.tolerance * hessian.norm() * s_norm * s_norm) {
            return degenerate(self.policy, self.name(), "s^T B s", sbs, hessian);
        }

        let mut updated = hessian - (&bs * &s_b) / sbs + (y * y.transpose()) / sy;
        let half = <T as Scalar>::from_f64(0.5);
        updated = (&updated + updated.transpose()) * half;

        if !matrix_all_finite(&updated) {
            return degenerate(self.policy, self.name(), "updated Hessian", <T as Float>::nan(), hessian);
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qnopt_core::{error::OptimizerError, types::DVector};

    fn pair(s: &[f64], y: &[f64]) -> SecantPair<f64> {
        SecantPair::new(DVector::from_row_slice(s), DVector::from_row_slice(y)).unwrap()
    }

    #[test]
    fn test_bfgs_satisfies_secant_equation() {
        let b = DMatrix::from_row_slice(3, 3, &[2.0, 0.5, 0.0, 0.5, 1.0, 0.2, 0.0, 0.2, 3.0]);
        let p = pair(&[0.3, -0.1, 0.4], &[0.9, 0.2, 1.1]);
        assert!(p.curvature() > 0.0);

        let updated = Bfgs::new().update_secant(&b, &p).unwrap();

        assert_relative_eq!(&updated * &p.s, p.y, epsilon = 1e-12);
    }

    #[test]
    fn test_bfgs_preserves_symmetry() {
        let b = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let p = pair(&[1.0, 2.0], &[3.0, 0.5]);

        let updated = Bfgs::new().update_secant(&b, &p).unwrap();

        assert_eq!(updated, updated.transpose());
    }

    #[test]
    fn test_bfgs_does_not_modify_input() {
        let b = DMatrix::<f64>::identity(2, 2);
        let original = b.clone();
        let p = pair(&[1.0, 0.0], &[2.0, 0.0]);

        let updated = Bfgs::new().update_secant(&b, &p).unwrap();

        assert_eq!(b, original);
        assert_relative_eq!(updated[(0, 0)], 2.0, epsilon = 1e-12);
        assert_relative_eq!(updated[(1, 1)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bfgs_zero_step_skips() {
        let b = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 5.0]);
        let p = pair(&[0.0, 0.0], &[0.0, 0.0]);

        let updated = Bfgs::new().update_secant(&b, &p).unwrap();

        assert_eq!(updated, b);
        assert!(updated.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_bfgs_zero_step_errors_under_error_policy() {
        let b = DMatrix::<f64>::identity(2, 2);
        let p = pair(&[0.0, 0.0], &[0.0, 0.0]);

        let err = Bfgs::new()
            .with_policy(DegeneratePolicy::Error)
            .update_secant(&b, &p)
            .unwrap_err();

        assert!(matches!(
            err,
            OptimizerError::DegenerateUpdate { ref quantity, .. } if quantity == "y^T s"
        ));
    }

    #[test]
    fn test_bfgs_zero_gradient_change_is_degenerate() {
        // A linear objective has y = 0 for every step.
        let b = DMatrix::<f64>::identity(2, 2);
        let p = pair(&[1.0, -1.0], &[0.0, 0.0]);

        assert_eq!(Bfgs::new().update_secant(&b, &p).unwrap(), b);
        assert!(Bfgs::new()
            .with_policy(DegeneratePolicy::Error)
            .update_secant(&b, &p)
            .is_err());
    }

    #[test]
    fn test_bfgs_singular_curvature_term() {
        // s lies in the null space of B, so s^T B s = 0.
        let b = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]);
        let p = pair(&[0.0, 1.0], &[0.0, 1.0]);

        let err = Bfgs::new()
            .with_policy(DegeneratePolicy::Error)
            .update_secant(&b, &p)
            .unwrap_err();
        assert!(matches!(
            err,
            OptimizerError::DegenerateUpdate { ref quantity, .. } if quantity == "s^T B s"
        ));
    }

    #[test]
    fn test_bfgs_shape_mismatch() {
        let b = DMatrix::<f64>::identity(3, 3);
        let p = pair(&[1.0, 0.0], &[1.0, 0.0]);
        let err = Bfgs::new().update_secant(&b, &p).unwrap_err();
        assert!(matches!(err, OptimizerError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_bfgs_f32() {
        let b = DMatrix::<f32>::identity(2, 2);
        let p = SecantPair::new(
            DVector::from_vec(vec![0.5_f32, 0.25]),
            DVector::from_vec(vec![1.0_f32, 1.0]),
        )
        .unwrap();

        let updated = Bfgs::new().update_secant(&b, &p).unwrap();
        assert_relative_eq!(&updated * &p.s, p.y, epsilon = 1e-5);
    }
}
