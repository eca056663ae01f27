//! Hessian update strategies.
//!
//! A strategy maps the current Hessian approximation `B_k` and one secant
//! pair to a refreshed approximation `B_{k+1}` that satisfies (or
//! approximately satisfies) the secant equation
//!
//! ```text
//! B_{k+1} s_k = y_k,   s_k = x_{k+1} - x_k,   y_k = ∇f(x_{k+1}) - ∇f(x_k)
//! ```
//!
//! Strategies are stateless: the input matrix is borrowed and a fresh matrix
//! is returned, so a caller's matrix is never modified.
//!
//! # Degenerate denominators
//!
//! Every rule divides by a curvature or step quantity that can vanish (a zero
//! step, a linear objective). Each strategy instance carries one
//! [`DegeneratePolicy`]: either the update is skipped and the matrix returned
//! unchanged, or [`OptimizerError::DegenerateUpdate`] is raised. A strategy
//! never returns a matrix containing NaN or infinity.

mod bfgs;
mod broyden;

pub use bfgs::Bfgs;
pub use broyden::GoodBroyden;

use qnopt_core::{
    cost_function::CostFunction,
    error::{OptimizerError, Result},
    types::{all_finite, DMatrix, DVector, Scalar},
};
use std::fmt::Debug;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a strategy does when a denominator is numerically unsafe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DegeneratePolicy {
    /// Return the Hessian approximation unchanged
    #[default]
    Skip,
    /// Fail with `OptimizerError::DegenerateUpdate`
    Error,
}

/// One secant pair `(s, y)` between two consecutive iterates.
#[derive(Debug, Clone, PartialEq)]
pub struct SecantPair<T>
where
    T: Scalar,
{
    /// Step in the point, `x_{k+1} - x_k`
    pub s: DVector<T>,
    /// Step in the gradient, `∇f(x_{k+1}) - ∇f(x_k)`
    pub y: DVector<T>,
}

impl<T> SecantPair<T>
where
    T: Scalar,
{
    /// Creates a pair from explicit steps.
    pub fn new(s: DVector<T>, y: DVector<T>) -> Result<Self> {
        if s.len() != y.len() {
            return Err(OptimizerError::dimension_mismatch("y", s.len(), y.len()));
        }
        Ok(Self { s, y })
    }

    /// Builds the pair between two distinct iterates, evaluating the gradient
    /// at each of them.
    pub fn between<C>(cost_fn: &C, point: &DVector<T>, next_point: &DVector<T>) -> Result<Self>
    where
        C: CostFunction<T> + ?Sized,
    {
        if point.len() != next_point.len() {
            return Err(OptimizerError::dimension_mismatch(
                "next_point",
                point.len(),
                next_point.len(),
            ));
        }
        let gradient = cost_fn.gradient(point)?;
        let next_gradient = cost_fn.gradient(next_point)?;
        for g in [&gradient, &next_gradient] {
            if g.len() != point.len() {
                return Err(OptimizerError::dimension_mismatch(
                    "gradient",
                    point.len(),
                    g.len(),
                ));
            }
        }
        Self::new(next_point - point, next_gradient - gradient)
    }

    /// Dimension of the pair.
    pub fn len(&self) -> usize {
        self.s.len()
    }

    /// True for an empty pair.
    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Curvature along the step, `y^T s`.
    pub fn curvature(&self) -> T {
        self.y.dot(&self.s)
    }

    /// True if both steps contain only finite values.
    pub fn is_finite(&self) -> bool {
        all_finite(&self.s) && all_finite(&self.y)
    }
}

/// A rule refreshing the Hessian approximation once per iteration.
pub trait HessianUpdate<T>: Debug
where
    T: Scalar,
{
    /// Human-readable name of the rule.
    fn name(&self) -> &str;

    /// Applies the rule to one secant pair.
    ///
    /// `hessian` must be N×N with N the length of the pair.
    fn update_secant(&self, hessian: &DMatrix<T>, pair: &SecantPair<T>) -> Result<DMatrix<T>>;

    /// Refreshes `hessian` for the move from `point` to `next_point`.
    ///
    /// The gradient is evaluated at both points, so `y` is the difference
    /// between two distinct gradient evaluations.
    fn update(
        &self,
        hessian: &DMatrix<T>,
        cost_fn: &dyn CostFunction<T>,
        point: &DVector<T>,
        next_point: &DVector<T>,
    ) -> Result<DMatrix<T>> {
        let pair = SecantPair::between(cost_fn, point, next_point)?;
        self.update_secant(hessian, &pair)
    }
}

/// Checks that `hessian` is square and matches the pair's dimension.
pub(crate) fn check_shapes<T: Scalar>(hessian: &DMatrix<T>, pair: &SecantPair<T>) -> Result<()> {
    let n = pair.len();
    if hessian.shape() != (n, n) {
        return Err(OptimizerError::dimension_mismatch(
            "hessian",
            format!("{}x{}", n, n),
            format!("{}x{}", hessian.nrows(), hessian.ncols()),
        ));
    }
    Ok(())
}

/// Applies `policy` to a denominator that failed its check.
pub(crate) fn degenerate<T: Scalar>(
    policy: DegeneratePolicy,
    method: &str,
    quantity: &str,
    value: T,
    hessian: &DMatrix<T>,
) -> Result<DMatrix<T>> {
    let value = Scalar::to_f64(value);
    match policy {
        DegeneratePolicy::Skip => {
            debug!(method, quantity, value, "skipping degenerate Hessian update");
            Ok(hessian.clone())
        }
        DegeneratePolicy::Error => Err(OptimizerError::degenerate_update(method, quantity, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qnopt_core::cost_function::QuadraticCost;

    #[test]
    fn test_secant_pair_between_distinct_points() {
        let a = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 1.0, 2.0]);
        let cost = QuadraticCost::new(a.clone(), DVector::zeros(2), 0.0);
        let x0 = DVector::from_vec(vec![1.0, 1.0]);
        let x1 = DVector::from_vec(vec![0.5, -1.0]);

        let pair = SecantPair::between(&cost, &x0, &x1).unwrap();

        // For a quadratic, y = A s exactly.
        assert_relative_eq!(pair.s, &x1 - &x0);
        assert_relative_eq!(pair.y, &a * &pair.s, epsilon = 1e-12);
        assert!(pair.curvature() > 0.0);
        assert!(pair.is_finite());
        assert_eq!(pair.len(), 2);
    }

    #[test]
    fn test_secant_pair_dimension_mismatch() {
        let err = SecantPair::new(DVector::<f64>::zeros(2), DVector::zeros(3)).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_degenerate_policy() {
        let h = DMatrix::<f64>::identity(2, 2);
        let kept = degenerate(DegeneratePolicy::Skip, "BFGS", "y^T s", 0.0, &h).unwrap();
        assert_eq!(kept, h);

        let err = degenerate(DegeneratePolicy::Error, "BFGS", "y^T s", 0.0, &h).unwrap_err();
        assert!(matches!(err, OptimizerError::DegenerateUpdate { .. }));
        assert_eq!(DegeneratePolicy::default(), DegeneratePolicy::Skip);
    }

    #[test]
    fn test_check_shapes() {
        let pair = SecantPair::new(DVector::<f64>::zeros(2), DVector::zeros(2)).unwrap();
        assert!(check_shapes(&DMatrix::identity(2, 2), &pair).is_ok());
        assert!(check_shapes(&DMatrix::identity(3, 3), &pair).is_err());
    }
}
