//! Good Broyden rank-one update.
//!
//! ```text
//! B_{k+1} = B_k + (y - B_k s) s^T / (s^T s)
//! ```
//!
//! The result satisfies `B_{k+1} s = y` for any `B_k`, and is the closest
//! matrix to `B_k` in Frobenius norm that does. It is not symmetric in
//! general and is returned as computed.

use super::{check_shapes, degenerate, DegeneratePolicy, HessianUpdate, SecantPair};
use qnopt_core::{
    error::Result,
    types::{matrix_all_finite, DMatrix, Scalar},
};
use num_traits::Float;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Good Broyden update strategy.
///
/// The step is degenerate when it is zero or when the correction dwarfs the
/// current matrix, `tol * ‖y - B s‖ >= ‖B‖_F ‖s‖`. Both sides scale the same
/// way with the step and with the objective, so small-scale problems are
/// updated like any other.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GoodBroyden<T>
where
    T: Scalar,
{
    /// Policy for degenerate denominators
    pub policy: DegeneratePolicy,
    /// Relative degeneracy threshold
    pub tolerance: T,
}

impl<T> Default for GoodBroyden<T>
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

impl<T> GoodBroyden<T>
where
    T: Scalar,
{
    /// Creates a good Broyden strategy with the skip policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the degenerate-denominator policy.
    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the degeneracy threshold.
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl<T> HessianUpdate<T> for GoodBroyden<T>
where
    T: Scalar,
{
    fn name(&self) -> &str {
        "Good Broyden"
    }

    fn update_secant(&self, hessian: &DMatrix<T>, pair: &SecantPair<T>) -> Result<DMatrix<T>> {
        check_shapes(hessian, pair)?;
        let s = &pair.s;

        let s_norm = s.norm();
        let ss = s_norm * s_norm;
        if !(ss > T::zero()) {
            return degenerate(self.policy, self.name(), "s^T s", ss, hessian);
        }

        let residual = &pair.y - hessian * s;
        if !(self.tolerance * residual.norm() < hessian.norm() * s_norm) {
            return degenerate(self.policy, self.name(), "y - B s", residual.norm(), hessian);
        }

        let updated = hessian + (residual * s.transpose()) / ss;

        if !matrix_all_finite(&updated) {
            return degenerate(self.policy, self.name(), "updated Hessian", <T as Float>::nan(), hessian);
        }
        Ok(updated)
    }
}
