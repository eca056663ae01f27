//! Core optimizer traits and types.
//!
//! This module defines what every minimization run consumes and produces:
//!
//! - [`StoppingCriterion`]: the absolute gradient tolerance and the iteration
//!   budget, both overridable per call
//! - [`OptimizationResult`]: final value, point, gradient and iteration count,
//!   tagged with a [`TerminationReason`]
//! - [`Optimizer`]: the interface implemented by the solvers
//!
//! A run terminates in exactly one of two ways. Either every component of the
//! gradient is within tolerance of zero ([`TerminationReason::Converged`]) or
//! the budget is spent ([`TerminationReason::MaxIterations`]). Exhaustion is
//! an ordinary tagged outcome, not a missing value; callers who want it as an
//! error use [`OptimizationResult::into_converged`].
//!
//! # Example
//!
//! ```
//! use qnopt_core::optimizer::StoppingCriterion;
//!
//! let criterion = StoppingCriterion::<f64>::new()
//!     .with_gradient_tolerance(1e-8)
//!     .with_max_iterations(50);
//! assert!(criterion.validate().is_ok());
//! ```

use crate::core::{
    cost_function::CostFunction,
    error::{OptimizerError, Result},
    types::{DMatrix, DVector, Scalar},
};
use num_traits::Float;
use std::fmt::{self, Debug};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a minimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult<T>
where
    T: Scalar,
{
    /// The final iterate
    pub point: DVector<T>,

    /// Objective value at the final iterate
    pub value: T,

    /// Gradient at the final iterate
    pub gradient: DVector<T>,

    /// Largest absolute gradient component at the final iterate
    pub gradient_norm: T,

    /// Hessian approximation held when the run stopped
    pub hessian: DMatrix<T>,

    /// Number of iterations performed
    pub iterations: usize,

    /// Total number of objective evaluations
    pub function_evaluations: usize,

    /// Total number of gradient evaluations
    pub gradient_evaluations: usize,

    /// Total number of Hessian provider evaluations
    pub hessian_evaluations: usize,

    /// Wall-clock time elapsed during the run
    pub duration: Duration,

    /// Why the run stopped
    pub termination_reason: TerminationReason,

    /// True if the gradient tolerance was met
    pub converged: bool,
}

impl<T> OptimizationResult<T>
where
    T: Scalar,
{
    /// Creates a new optimization result.
    pub fn new(
        point: DVector<T>,
        value: T,
        gradient: DVector<T>,
        hessian: DMatrix<T>,
        iterations: usize,
        duration: Duration,
        termination_reason: TerminationReason,
    ) -> Self {
        let gradient_norm = crate::core::types::max_abs(&gradient);
        Self {
            point,
            value,
            gradient,
            gradient_norm,
            hessian,
            iterations,
            function_evaluations: 0,
            gradient_evaluations: 0,
            hessian_evaluations: 0,
            duration,
            termination_reason,
            converged: termination_reason == TerminationReason::Converged,
        }
    }

    /// Sets the (function, gradient, Hessian) evaluation counts.
    pub fn with_evaluations(mut self, counts: (usize, usize, usize)) -> Self {
        self.function_evaluations = counts.0;
        self.gradient_evaluations = counts.1;
        self.hessian_evaluations = counts.2;
        self
    }

    /// Returns the `(value, point, gradient, iterations)` tuple of a run.
    pub fn summary(&self) -> (T, &DVector<T>, &DVector<T>, usize) {
        (self.value, &self.point, &self.gradient, self.iterations)
    }

    /// Converts an exhausted run into [`OptimizerError::MaxIterationsReached`].
    ///
    /// `tolerance` is the gradient tolerance the run was held to; it is only
    /// used to populate the error.
    pub fn into_converged(self, tolerance: T) -> Result<Self> {
        match self.termination_reason {
            TerminationReason::Converged => Ok(self),
            TerminationReason::MaxIterations => Err(OptimizerError::max_iterations_reached(
                self.iterations,
                Scalar::to_f64(self.value),
                Scalar::to_f64(self.gradient_norm),
                Scalar::to_f64(tolerance),
            )),
        }
    }
}

/// Reasons for a minimization run to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerminationReason {
    /// Every gradient component is within tolerance of zero
    Converged,
    /// Iteration budget exhausted without meeting the tolerance
    MaxIterations,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Converged => write!(f, "gradient within tolerance"),
            TerminationReason::MaxIterations => write!(f, "maximum iterations reached"),
        }
    }
}

/// Stopping criteria for a minimization run.
///
/// - **gradient_tolerance**: absolute tolerance on every gradient component,
///   `max_i |g_i| <= tol`. Zero is allowed and demands an exact stationary
///   point.
/// - **max_iterations**: upper bound on iterations, at least one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoppingCriterion<T>
where
    T: Scalar,
{
    /// Absolute tolerance on every gradient component
    pub gradient_tolerance: T,

    /// Maximum number of iterations
    pub max_iterations: usize,
}

impl<T> Default for StoppingCriterion<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            gradient_tolerance: T::DEFAULT_GRADIENT_TOLERANCE,
            max_iterations: 100,
        }
    }
}

impl<T> StoppingCriterion<T>
where
    T: Scalar,
{
    /// Creates a new stopping criterion with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Sets the gradient tolerance.
    pub fn with_gradient_tolerance(mut self, tol: T) -> Self {
        self.gradient_tolerance = tol;
        self
    }

    /// Checks the criterion before a run.
    pub fn validate(&self) -> Result<()> {
        let tol = self.gradient_tolerance;
        if <T as Float>::is_nan(tol) {
            return Err(OptimizerError::invalid_argument(
                "convergence",
                "must be a real number, got NaN",
            ));
        }
        if tol < T::zero() {
            return Err(OptimizerError::invalid_argument(
                "convergence",
                format!("must be >= 0, got {}", tol),
            ));
        }
        if self.max_iterations == 0 {
            return Err(OptimizerError::invalid_argument(
                "max_iterations",
                "must be >= 1, got 0",
            ));
        }
        Ok(())
    }

    /// True if every gradient component is within tolerance of zero.
    pub fn is_satisfied_by(&self, gradient: &DVector<T>) -> bool {
        gradient
            .iter()
            .all(|g| <T as Float>::abs(*g) <= self.gradient_tolerance)
    }
}

/// Interface for local minimization algorithms.
pub trait Optimizer<T>: Debug
where
    T: Scalar,
{
    /// Returns a human-readable name identifying the algorithm.
    fn name(&self) -> &str;

    /// Minimizes the objective starting from `initial_point`.
    ///
    /// # Errors
    ///
    /// Returns an argument error before any iteration if the inputs or the
    /// criterion are invalid, and a numerical error if the run cannot
    /// continue. Budget exhaustion is reported through the result's
    /// [`TerminationReason`], not as an error.
    fn optimize<C>(
        &mut self,
        cost_fn: &C,
        initial_point: &DVector<T>,
        stopping_criterion: &StoppingCriterion<T>,
    ) -> Result<OptimizationResult<T>>
    where
        C: CostFunction<T> + ?Sized;
}
