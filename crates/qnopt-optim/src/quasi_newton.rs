//! Quasi-Newton minimization with a fixed step length.
//!
//! Each iteration solves `B d = -g` for a descent direction, moves to
//! `x + α d` and refreshes `B`. With a [`HessianUpdate`] strategy the matrix
//! is refined from gradient differences alone; without one the caller's
//! Hessian provider is re-evaluated at every iterate, which makes the method
//! Newton's method with a fixed step.
//!
//! # Example
//!
//! ```
//! use qnopt_core::prelude::*;
//! use qnopt_optim::{minimize, update::Bfgs};
//!
//! let cost = QuadraticCost::<f64>::simple(3);
//! let x0 = DVector::from_vec(vec![1.0, -2.0, 0.5]);
//! let bfgs = Bfgs::<f64>::new();
//!
//! let result = minimize(&cost, &x0, Some(&bfgs), &StoppingCriterion::new()).unwrap();
//! assert!(result.converged);
//! assert!(result.point.norm() < 1e-8);
//! ```

use crate::{direction::descent_direction, update::HessianUpdate};
use num_traits::Float;
use qnopt_core::{
    cost_function::{CostFunction, CountingCostFunction},
    error::{OptimizerError, Result},
    optimizer::{OptimizationResult, Optimizer, StoppingCriterion, TerminationReason},
    types::{all_finite, matrix_all_finite, max_abs, DMatrix, DVector, Scalar},
};
use std::time::Instant;
use tracing::{debug, debug_span, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the quasi-Newton solver.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuasiNewtonConfig<T>
where
    T: Scalar,
{
    /// Fixed multiplier applied to every descent direction
    pub step_length: T,
}

impl<T> Default for QuasiNewtonConfig<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            step_length: T::DEFAULT_STEP_LENGTH,
        }
    }
}

impl<T> QuasiNewtonConfig<T>
where
    T: Scalar,
{
    /// Creates a configuration with unit step length.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the step length.
    pub fn with_step_length(mut self, step_length: T) -> Self {
        self.step_length = step_length;
        self
    }

    /// Checks that the step length is finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !<T as Float>::is_finite(self.step_length) || self.step_length <= T::zero() {
            return Err(OptimizerError::invalid_argument(
                "step_length",
                format!("must be finite and > 0, got {}", self.step_length),
            ));
        }
        Ok(())
    }
}

/// Quasi-Newton optimizer.
///
/// Holds its configuration and, optionally, the Hessian update strategy used
/// between iterations.
#[derive(Debug)]
pub struct QuasiNewton<T>
where
    T: Scalar,
{
    config: QuasiNewtonConfig<T>,
    update: Option<Box<dyn HessianUpdate<T>>>,
}

impl<T> QuasiNewton<T>
where
    T: Scalar,
{
    /// Creates a solver that re-evaluates the true Hessian every iteration.
    pub fn new(config: QuasiNewtonConfig<T>) -> Self {
        Self {
            config,
            update: None,
        }
    }

    /// Uses `update` to refresh the Hessian approximation.
    pub fn with_update<U>(mut self, update: U) -> Self
    where
        U: HessianUpdate<T> + 'static,
    {
        self.update = Some(Box::new(update));
        self
    }

    /// Returns the solver configuration.
    pub fn config(&self) -> &QuasiNewtonConfig<T> {
        &self.config
    }

    /// Returns the update strategy, if any.
    pub fn update_strategy(&self) -> Option<&dyn HessianUpdate<T>> {
        self.update.as_deref()
    }
}

impl<T> Default for QuasiNewton<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self::new(QuasiNewtonConfig::default())
    }
}

impl<T> Optimizer<T> for QuasiNewton<T>
where
    T: Scalar,
{
    fn name(&self) -> &str {
        match &self.update {
            Some(update) => update.name(),
            None => "Newton",
        }
    }

    fn optimize<C>(
        &mut self,
        cost_fn: &C,
        initial_point: &DVector<T>,
        stopping_criterion: &StoppingCriterion<T>,
    ) -> Result<OptimizationResult<T>>
    where
        C: CostFunction<T> + ?Sized,
    {
        run(
            cost_fn,
            initial_point,
            self.update.as_deref(),
            stopping_criterion,
            &self.config,
        )
    }
}

/// Minimizes `cost_fn` from `initial_point` with unit step length.
///
/// `update_strategy` selects how the Hessian approximation is refreshed;
/// `None` re-evaluates the Hessian provider at every iterate.
///
/// # Errors
///
/// - `InvalidArgument` / `DimensionMismatch` for invalid inputs, raised
///   before the first iteration
/// - `SingularMatrix` when the Newton system cannot be solved
/// - `DegenerateUpdate` from a strategy using [`DegeneratePolicy::Error`]
/// - `NonFiniteValue` when a callable or update produces NaN or infinity
///
/// Running out of iterations is not an error: the result is tagged
/// [`TerminationReason::MaxIterations`].
///
/// The gradient is tested at `initial_point` before any step is taken. A
/// starting point that already satisfies `criterion` is returned unchanged
/// with `iterations == 0`, and its Hessian is the provider's value there.
///
/// [`DegeneratePolicy::Error`]: crate::update::DegeneratePolicy::Error
pub fn minimize<T, C>(
    cost_fn: &C,
    initial_point: &DVector<T>,
    update_strategy: Option<&dyn HessianUpdate<T>>,
    criterion: &StoppingCriterion<T>,
) -> Result<OptimizationResult<T>>
where
    T: Scalar,
    C: CostFunction<T> + ?Sized,
{
    run(
        cost_fn,
        initial_point,
        update_strategy,
        criterion,
        &QuasiNewtonConfig::default(),
    )
}

fn run<T, C>(
    cost_fn: &C,
    initial_point: &DVector<T>,
    update: Option<&dyn HessianUpdate<T>>,
    criterion: &StoppingCriterion<T>,
    config: &QuasiNewtonConfig<T>,
) -> Result<OptimizationResult<T>>
where
    T: Scalar,
    C: CostFunction<T> + ?Sized,
{
    let start_time = Instant::now();
    let method = update.map_or("Newton", |u| u.name());
    let _span = debug_span!("quasi_newton", method).entered();

    criterion.validate()?;
    config.validate()?;
    validate_point(initial_point)?;

    let counted = CountingCostFunction::new(cost_fn);
    let n = initial_point.len();
    let mut point = initial_point.clone();

    let mut gradient = counted.gradient(&point)?;
    check_gradient(&gradient, n, 0)?;
    let mut hessian = counted.hessian(&point)?;
    check_hessian(&hessian, n, 0)?;

    if criterion.is_satisfied_by(&gradient) {
        let value = counted.cost(&point)?;
        info!(iterations = 0, value = Scalar::to_f64(value), "initial point already converged");
        return Ok(OptimizationResult::new(
            point,
            value,
            gradient,
            hessian,
            0,
            start_time.elapsed(),
            TerminationReason::Converged,
        )
        .with_evaluations(counted.counts()));
    }

    for iteration in 1..=criterion.max_iterations {
        if update.is_none() && iteration > 1 {
            hessian = counted.hessian(&point)?;
            check_hessian(&hessian, n, iteration)?;
        }

        let direction = descent_direction(&hessian, &gradient, iteration)?;
        let next_point = &point + direction * config.step_length;
        if !all_finite(&next_point) {
            return Err(OptimizerError::non_finite("point", iteration));
        }

        if let Some(update) = update {
            hessian = update.update(&hessian, &counted as &dyn CostFunction<T>, &point, &next_point)?;
            if !matrix_all_finite(&hessian) {
                return Err(OptimizerError::non_finite("hessian", iteration));
            }
        }

        point = next_point;
        gradient = counted.gradient(&point)?;
        check_gradient(&gradient, n, iteration)?;

        let gradient_norm = max_abs(&gradient);
        debug!(
            iteration,
            gradient_norm = Scalar::to_f64(gradient_norm),
            "quasi-Newton iteration"
        );

        if criterion.is_satisfied_by(&gradient) {
            let value = counted.cost(&point)?;
            info!(
                iteration,
                value = Scalar::to_f64(value),
                gradient_norm = Scalar::to_f64(gradient_norm),
                "converged"
            );
            return Ok(OptimizationResult::new(
                point,
                value,
                gradient,
                hessian,
                iteration,
                start_time.elapsed(),
                TerminationReason::Converged,
            )
            .with_evaluations(counted.counts()));
        }
    }

    let value = counted.cost(&point)?;
    warn!(
        max_iterations = criterion.max_iterations,
        value = Scalar::to_f64(value),
        gradient_norm = Scalar::to_f64(max_abs(&gradient)),
        tolerance = Scalar::to_f64(criterion.gradient_tolerance),
        "iteration budget exhausted before convergence"
    );
    Ok(OptimizationResult::new(
        point,
        value,
        gradient,
        hessian,
        criterion.max_iterations,
        start_time.elapsed(),
        TerminationReason::MaxIterations,
    )
    .with_evaluations(counted.counts()))
}

fn validate_point<T: Scalar>(point: &DVector<T>) -> Result<()> {
    if point.is_empty() {
        return Err(OptimizerError::invalid_argument(
            "initial_point",
            "must have at least one component",
        ));
    }
    if !all_finite(point) {
        return Err(OptimizerError::invalid_argument(
            "initial_point",
            "must contain only finite values",
        ));
    }
    Ok(())
}

fn check_gradient<T: Scalar>(gradient: &DVector<T>, n: usize, iteration: usize) -> Result<()> {
    if gradient.len() != n {
        return Err(OptimizerError::dimension_mismatch("gradient", n, gradient.len()));
    }
    if !all_finite(gradient) {
        return Err(OptimizerError::non_finite("gradient", iteration));
    }
    Ok(())
}

fn check_hessian<T: Scalar>(hessian: &DMatrix<T>, n: usize, iteration: usize) -> Result<()> {
    if hessian.shape() != (n, n) {
        return Err(OptimizerError::dimension_mismatch(
            "hessian_provider",
            format!("{}x{}", n, n),
            format!("{}x{}", hessian.nrows(), hessian.ncols()),
        ));
    }
    if !matrix_all_finite(hessian) {
        return Err(OptimizerError::non_finite("hessian", iteration));
    }
    Ok(())
}
