//! Cost function interface for quasi-Newton minimization.
//!
//! The solver consumes three capabilities supplied by the caller: the
//! objective (point → scalar), its gradient (point → vector) and a Hessian
//! provider (point → matrix). They are bundled in the [`CostFunction`] trait;
//! plain closures are adapted through [`FnCostFunction`], and one-dimensional
//! problems with a scalar second derivative through [`UnivariateCost`].
//!
//! # Design Philosophy
//!
//! - Derivatives are the caller's responsibility; [`DerivativeChecker`] lets
//!   them verify an analytical gradient or Hessian against finite differences
//! - Gradients are treated as pure functions of the point and recomputed
//!   whenever the solver needs them
//! - [`CountingCostFunction`] records how many evaluations a run consumed

use crate::core::{
    error::{OptimizerError, Result},
    types::{DMatrix, DVector, Scalar},
};
use num_traits::Float;
use std::cell::Cell;
use std::fmt::{self, Debug};

/// Trait for objectives minimized by the quasi-Newton solver.
///
/// This is the capability set algorithms use to evaluate the objective,
/// its gradient and its Hessian (or an initial approximation of it).
pub trait CostFunction<T>: Debug
where
    T: Scalar,
{
    /// Evaluates the objective at a point.
    fn cost(&self, point: &DVector<T>) -> Result<T>;

    /// Evaluates the gradient at a point.
    ///
    /// The returned vector must have the same length as `point`.
    fn gradient(&self, point: &DVector<T>) -> Result<DVector<T>>;

    /// Evaluates the Hessian, or an approximation of it, at a point.
    ///
    /// The returned matrix must be N×N where N is the length of `point`.
    /// When an update strategy is used, the solver calls this once at the
    /// initial point to seed the approximation.
    fn hessian(&self, point: &DVector<T>) -> Result<DMatrix<T>>;

    /// Computes the gradient using central finite differences.
    ///
    /// Used by [`DerivativeChecker`] to validate an analytical gradient.
    fn gradient_fd(&self, point: &DVector<T>) -> Result<DVector<T>> {
        let n = point.len();
        let mut gradient = DVector::zeros(n);
        let h = <T as Float>::cbrt(T::EPSILON);

        for i in 0..n {
            let mut point_plus = point.clone();
            let mut point_minus = point.clone();
            point_plus[i] += h;
            point_minus[i] -= h;

            let f_plus = self.cost(&point_plus)?;
            let f_minus = self.cost(&point_minus)?;
            gradient[i] = (f_plus - f_minus) / (h + h);
        }

        Ok(gradient)
    }
}

impl<T, C> CostFunction<T> for &C
where
    T: Scalar,
    C: CostFunction<T> + ?Sized,
{
    fn cost(&self, point: &DVector<T>) -> Result<T> {
        (**self).cost(point)
    }

    fn gradient(&self, point: &DVector<T>) -> Result<DVector<T>> {
        (**self).gradient(point)
    }

    fn hessian(&self, point: &DVector<T>) -> Result<DMatrix<T>> {
        (**self).hessian(point)
    }
}

/// Adapter turning three closures into a [`CostFunction`].
///
/// # Example
///
/// ```
/// use qnopt_core::cost_function::{CostFunction, FnCostFunction};
/// use qnopt_core::types::{DMatrix, DVector};
///
/// // f(x) = x^T x
/// let cost = FnCostFunction::new(
///     |x: &DVector<f64>| x.dot(x),
///     |x: &DVector<f64>| x * 2.0,
///     |x: &DVector<f64>| DMatrix::identity(x.len(), x.len()) * 2.0,
/// );
/// let x = DVector::from_vec(vec![1.0, 2.0]);
/// assert_eq!(cost.cost(&x).unwrap(), 5.0);
/// ```
pub struct FnCostFunction<F, G, H> {
    function: F,
    gradient: G,
    hessian: H,
}

impl<F, G, H> FnCostFunction<F, G, H> {
    /// Bundles an objective, its gradient and a Hessian provider.
    pub fn new(function: F, gradient: G, hessian: H) -> Self {
        Self {
            function,
            gradient,
            hessian,
        }
    }
}

impl<F, G, H> Debug for FnCostFunction<F, G, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCostFunction").finish_non_exhaustive()
    }
}

impl<T, F, G, H> CostFunction<T> for FnCostFunction<F, G, H>
where
    T: Scalar,
    F: Fn(&DVector<T>) -> T,
    G: Fn(&DVector<T>) -> DVector<T>,
    H: Fn(&DVector<T>) -> DMatrix<T>,
{
    fn cost(&self, point: &DVector<T>) -> Result<T> {
        Ok((self.function)(point))
    }

    fn gradient(&self, point: &DVector<T>) -> Result<DVector<T>> {
        Ok((self.gradient)(point))
    }

    fn hessian(&self, point: &DVector<T>) -> Result<DMatrix<T>> {
        Ok((self.hessian)(point))
    }
}

/// Adapter for one-dimensional objectives with a scalar second derivative.
///
/// Points are still `DVector`s of length one; the scalar Hessian is exposed
/// as a 1×1 matrix, which the solver divides by directly.
pub struct UnivariateCost<F, G, H> {
    function: F,
    derivative: G,
    second_derivative: H,
}

impl<F, G, H> UnivariateCost<F, G, H> {
    /// Bundles f, f' and f''.
    pub fn new(function: F, derivative: G, second_derivative: H) -> Self {
        Self {
            function,
            derivative,
            second_derivative,
        }
    }
}

impl<F, G, H> Debug for UnivariateCost<F, G, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnivariateCost").finish_non_exhaustive()
    }
}

impl<F, G, H> UnivariateCost<F, G, H> {
    fn scalar_of<T: Scalar>(point: &DVector<T>) -> Result<T> {
        if point.len() != 1 {
            return Err(OptimizerError::dimension_mismatch(
                "initial_point",
                1,
                point.len(),
            ));
        }
        Ok(point[0])
    }
}

impl<T, F, G, H> CostFunction<T> for UnivariateCost<F, G, H>
where
    T: Scalar,
    F: Fn(T) -> T,
    G: Fn(T) -> T,
    H: Fn(T) -> T,
{
    fn cost(&self, point: &DVector<T>) -> Result<T> {
        Ok((self.function)(Self::scalar_of(point)?))
    }

    fn gradient(&self, point: &DVector<T>) -> Result<DVector<T>> {
        let x = Self::scalar_of(point)?;
        Ok(DVector::from_element(1, (self.derivative)(x)))
    }

    fn hessian(&self, point: &DVector<T>) -> Result<DMatrix<T>> {
        let x = Self::scalar_of(point)?;
        Ok(DMatrix::from_element(1, 1, (self.second_derivative)(x)))
    }
}

/// A quadratic objective for testing and demos.
///
/// Computes f(x) = 0.5 * x^T * A * x + b^T * x + c, whose Hessian is A
/// (for symmetric A) and whose minimizer solves A x = -b.
#[derive(Debug, Clone)]
pub struct QuadraticCost<T>
where
    T: Scalar,
{
    /// The quadratic form matrix (should be symmetric)
    pub a: DMatrix<T>,
    /// The linear term
    pub b: DVector<T>,
    /// The constant term
    pub c: T,
}

impl<T> QuadraticCost<T>
where
    T: Scalar,
{
    /// Creates a new quadratic cost function.
    pub fn new(a: DMatrix<T>, b: DVector<T>, c: T) -> Self {
        Self { a, b, c }
    }

    /// Creates a simple quadratic with identity matrix: f(x) = 0.5 * ||x||^2
    pub fn simple(dim: usize) -> Self {
        Self {
            a: DMatrix::identity(dim, dim),
            b: DVector::zeros(dim),
            c: T::zero(),
        }
    }

    /// Creates the pure quadratic form f(x) = x^T * A * x (Hessian 2A).
    pub fn from_form(a: DMatrix<T>) -> Self {
        let n = a.nrows();
        let two = <T as Scalar>::from_f64(2.0);
        Self {
            a: a * two,
            b: DVector::zeros(n),
            c: T::zero(),
        }
    }
}

impl<T> CostFunction<T> for QuadraticCost<T>
where
    T: Scalar,
{
    fn cost(&self, point: &DVector<T>) -> Result<T> {
        let ax = &self.a * point;
        let quad_term = point.dot(&ax) * <T as Scalar>::from_f64(0.5);
        let linear_term = self.b.dot(point);
        Ok(quad_term + linear_term + self.c)
    }

    fn gradient(&self, point: &DVector<T>) -> Result<DVector<T>> {
        Ok(&self.a * point + &self.b)
    }

    fn hessian(&self, _point: &DVector<T>) -> Result<DMatrix<T>> {
        Ok(self.a.clone())
    }
}

/// Wrapper to count function evaluations.
///
/// The solver wraps every cost function in one of these to report
/// evaluation counts in its result.
#[derive(Debug)]
pub struct CountingCostFunction<C> {
    /// The underlying cost function
    pub inner: C,
    cost_count: Cell<usize>,
    gradient_count: Cell<usize>,
    hessian_count: Cell<usize>,
}

impl<C> CountingCostFunction<C> {
    /// Creates a new counting wrapper around a cost function.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cost_count: Cell::new(0),
            gradient_count: Cell::new(0),
            hessian_count: Cell::new(0),
        }
    }

    /// Returns the current (cost, gradient, Hessian) evaluation counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.cost_count.get(),
            self.gradient_count.get(),
            self.hessian_count.get(),
        )
    }

    fn bump(counter: &Cell<usize>) {
        counter.set(counter.get() + 1);
    }
}

impl<T, C> CostFunction<T> for CountingCostFunction<C>
where
    T: Scalar,
    C: CostFunction<T>,
{
    fn cost(&self, point: &DVector<T>) -> Result<T> {
        Self::bump(&self.cost_count);
        self.inner.cost(point)
    }

    fn gradient(&self, point: &DVector<T>) -> Result<DVector<T>> {
        Self::bump(&self.gradient_count);
        self.inner.gradient(point)
    }

    fn hessian(&self, point: &DVector<T>) -> Result<DMatrix<T>> {
        Self::bump(&self.hessian_count);
        self.inner.hessian(point)
    }
}

/// Utilities for checking gradient and Hessian implementations.
pub struct DerivativeChecker;

impl DerivativeChecker {
    /// Checks if the gradient implementation matches finite differences.
    ///
    /// Returns `(passes, max_error)` where `max_error` is the largest
    /// component-wise difference.
    pub fn check_gradient<T, C>(cost_fn: &C, point: &DVector<T>, tol: T) -> Result<(bool, T)>
    where
        T: Scalar,
        C: CostFunction<T> + ?Sized,
    {
        let analytical_grad = cost_fn.gradient(point)?;
        if analytical_grad.len() != point.len() {
            return Err(OptimizerError::dimension_mismatch(
                "gradient",
                point.len(),
                analytical_grad.len(),
            ));
        }
        let fd_grad = cost_fn.gradient_fd(point)?;

        let diff = &analytical_grad - &fd_grad;
        let max_error = crate::core::types::max_abs(&diff);

        Ok((max_error < tol, max_error))
    }

    /// Checks if the Hessian implementation matches finite differences of
    /// the gradient.
    ///
    /// Returns `(passes, max_error)`.
    pub fn check_hessian<T, C>(cost_fn: &C, point: &DVector<T>, tol: T) -> Result<(bool, T)>
    where
        T: Scalar,
        C: CostFunction<T> + ?Sized,
    {
        let hessian = cost_fn.hessian(point)?;
        let n = point.len();
        if hessian.shape() != (n, n) {
            return Err(OptimizerError::dimension_mismatch(
                "hessian",
                format!("{}x{}", n, n),
                format!("{}x{}", hessian.nrows(), hessian.ncols()),
            ));
        }
        let h = <T as Float>::cbrt(T::EPSILON);

        let mut max_error = T::zero();
        for i in 0..n {
            let mut point_plus = point.clone();
            let mut point_minus = point.clone();
            point_plus[i] += h;
            point_minus[i] -= h;

            let grad_plus = cost_fn.gradient(&point_plus)?;
            let grad_minus = cost_fn.gradient(&point_minus)?;
            let column_fd = (grad_plus - grad_minus) / (h + h);

            for j in 0..n {
                let error = <T as Float>::abs(hessian[(j, i)] - column_fd[j]);
                max_error = <T as Float>::max(max_error, error);
            }
        }

        Ok((max_error < tol, max_error))
    }
}
