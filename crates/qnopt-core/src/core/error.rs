//! Error types for quasi-Newton minimization.
//!
//! Every failure the solver or an update strategy can produce is a variant of
//! [`OptimizerError`]. Argument errors are raised at call entry, before the
//! first iteration; numerical errors carry the iteration at which they
//! occurred. Nothing is retried internally.

use thiserror::Error;

/// Errors that can occur during minimization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    /// An argument failed validation.
    ///
    /// Raised synchronously at entry: negative or NaN tolerance, zero
    /// iteration budget, empty or non-finite initial point, non-positive
    /// step length.
    #[error("Invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument
        argument: String,
        /// Description of the violation
        reason: String,
    },

    /// A supplied vector or matrix had the wrong shape.
    ///
    /// Raised when the gradient callable returns a vector whose length differs
    /// from the point dimension, or the Hessian provider returns a matrix that
    /// is not N×N.
    #[error("Dimension mismatch in `{argument}`: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Name of the offending argument or callable
        argument: String,
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// The Hessian approximation could not be inverted.
    #[error("Singular Hessian approximation at iteration {iteration}")]
    SingularMatrix {
        /// Iteration at which the direction computation failed
        iteration: usize,
    },

    /// An update strategy met a numerically unsafe denominator.
    ///
    /// Only produced by strategies configured with
    /// `DegeneratePolicy::Error`; the `Skip` policy leaves the matrix unchanged
    /// instead.
    #[error("Degenerate {method} update: {quantity} = {value:e} is too close to zero")]
    DegenerateUpdate {
        /// Name of the update rule
        method: String,
        /// The denominator that failed the check (e.g. "y^T s")
        quantity: String,
        /// Its value
        value: f64,
    },

    /// A callable or an update produced NaN or infinity.
    #[error("Non-finite {quantity} at iteration {iteration}")]
    NonFiniteValue {
        /// What became non-finite
        quantity: String,
        /// Iteration at which it was observed (0 for the entry check)
        iteration: usize,
    },

    /// Maximum number of iterations reached without convergence.
    ///
    /// The solver itself reports exhaustion as a tagged result; this variant
    /// is produced when a caller asks for a converged result explicitly.
    #[error("Maximum iterations ({max_iterations}) reached without convergence")]
    MaxIterationsReached {
        /// Maximum number of iterations allowed
        max_iterations: usize,
        /// Final function value
        final_value: f64,
        /// Largest absolute gradient component at the final point
        final_gradient_norm: f64,
        /// Convergence tolerance that was not met
        tolerance: f64,
    },

    /// A user-supplied callable reported a failure of its own.
    #[error("Evaluation failed: {reason}")]
    Evaluation {
        /// Description supplied by the callable
        reason: String,
    },
}

impl OptimizerError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument<S1, S2>(argument: S1, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S, E, A>(argument: S, expected: E, actual: A) -> Self
    where
        S: Into<String>,
        E: std::fmt::Display,
        A: std::fmt::Display,
    {
        Self::DimensionMismatch {
            argument: argument.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a SingularMatrix error.
    pub fn singular_matrix(iteration: usize) -> Self {
        Self::SingularMatrix { iteration }
    }

    /// Create a DegenerateUpdate error.
    pub fn degenerate_update<S1, S2>(method: S1, quantity: S2, value: f64) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::DegenerateUpdate {
            method: method.into(),
            quantity: quantity.into(),
            value,
        }
    }

    /// Create a NonFiniteValue error.
    pub fn non_finite<S: Into<String>>(quantity: S, iteration: usize) -> Self {
        Self::NonFiniteValue {
            quantity: quantity.into(),
            iteration,
        }
    }

    /// Create a MaxIterationsReached error with convergence information.
    pub fn max_iterations_reached(
        max_iterations: usize,
        final_value: f64,
        final_gradient_norm: f64,
        tolerance: f64,
    ) -> Self {
        Self::MaxIterationsReached {
            max_iterations,
            final_value,
            final_gradient_norm,
            tolerance,
        }
    }

    /// Create an Evaluation error.
    pub fn evaluation<S: Into<String>>(reason: S) -> Self {
        Self::Evaluation {
            reason: reason.into(),
        }
    }

    /// True for errors raised by argument validation at call entry.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::DimensionMismatch { .. }
        )
    }
}

/// Result type alias for optimizer operations.
pub type Result<T> = std::result::Result<T, OptimizerError>;
