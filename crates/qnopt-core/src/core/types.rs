//! Type definitions and aliases for quasi-Newton minimization.
//!
//! This module provides the scalar trait shared by every algorithm in the
//! workspace, the dense vector/matrix aliases used for points, gradients and
//! Hessian approximations, and the numerical constants the solver falls back
//! on when a caller does not override them.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in optimization (f32 or f64).
///
/// This trait combines all the necessary numeric traits required
/// by the solver and the Hessian update strategies.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default absolute tolerance on every gradient component.
    const DEFAULT_GRADIENT_TOLERANCE: Self;

    /// Relative threshold under which an update denominator is treated as zero.
    const DEGENERACY_TOLERANCE: Self;

    /// Default fixed step length applied to the descent direction.
    const DEFAULT_STEP_LENGTH: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_from_f64` for a non-panicking version.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Try to convert from f64.
    ///
    /// Returns None if the conversion fails.
    fn try_from_f64(v: f64) -> Option<Self> {
        <Self as FromPrimitive>::from_f64(v)
    }

    /// Convert to f64 (for logging and error context).
    ///
    /// Non-representable values map to NaN instead of panicking.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).unwrap_or(f64::NAN)
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-5;
    const DEGENERACY_TOLERANCE: Self = 3.5e-4;
    const DEFAULT_STEP_LENGTH: Self = 1.0;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-5;
    const DEGENERACY_TOLERANCE: Self = 1.5e-8;
    const DEFAULT_STEP_LENGTH: Self = 1.0;
}

/// Type alias for a dynamically-sized matrix (Hessian approximations).
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;

/// A point of the search space.
pub type Point<T> = DVector<T>;

/// A gradient evaluated at a point.
pub type Gradient<T> = DVector<T>;

/// Largest absolute component of a vector.
///
/// This is the norm the convergence test is expressed in: a gradient is
/// small enough when every component is within tolerance of zero.
pub fn max_abs<T: Scalar>(v: &DVector<T>) -> T {
    v.iter()
        .map(|x| <T as Float>::abs(*x))
        .fold(T::zero(), |a, b| <T as Float>::max(a, b))
}

/// Returns true if every entry of the vector is finite.
pub fn all_finite<T: Scalar>(v: &DVector<T>) -> bool {
    v.iter().all(|x| <T as Float>::is_finite(*x))
}

/// Returns true if every entry of the matrix is finite.
pub fn matrix_all_finite<T: Scalar>(m: &DMatrix<T>) -> bool {
    m.iter().all(|x| <T as Float>::is_finite(*x))
}

/// Numerical constants for different precision levels.
pub mod constants {
    use super::Scalar;

    /// Get machine epsilon for the given scalar type.
    pub fn epsilon<T: Scalar>() -> T {
        T::EPSILON
    }

    /// Get default gradient convergence tolerance.
    pub fn gradient_tolerance<T: Scalar>() -> T {
        T::DEFAULT_GRADIENT_TOLERANCE
    }

    /// Get the default degeneracy threshold for update denominators.
    pub fn degeneracy_tolerance<T: Scalar>() -> T {
        T::DEGENERACY_TOLERANCE
    }

    /// Get the default fixed step length.
    pub fn step_length<T: Scalar>() -> T {
        T::DEFAULT_STEP_LENGTH
    }
}
