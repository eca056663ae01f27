//! Integration tests for cost functions, the stopping criterion and result
//! tagging.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use qnopt_core::prelude::*;
use std::time::Duration;

/// Rosenbrock function, used here only to exercise derivative checks.
#[derive(Debug)]
struct Rosenbrock;

impl CostFunction<f64> for Rosenbrock {
    fn cost(&self, x: &DVector<f64>) -> Result<f64> {
        Ok((1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2))
    }

    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        let t = x[1] - x[0] * x[0];
        Ok(DVector::from_vec(vec![
            -2.0 * (1.0 - x[0]) - 400.0 * x[0] * t,
            200.0 * t,
        ]))
    }

    fn hessian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>> {
        Ok(DMatrix::from_row_slice(
            2,
            2,
            &[
                2.0 - 400.0 * x[1] + 1200.0 * x[0] * x[0],
                -400.0 * x[0],
                -400.0 * x[0],
                200.0,
            ],
        ))
    }
}

/// Cost function whose gradient evaluation always fails.
#[derive(Debug)]
struct FailingGradient;

impl CostFunction<f64> for FailingGradient {
    fn cost(&self, x: &DVector<f64>) -> Result<f64> {
        Ok(x.norm_squared())
    }

    fn gradient(&self, _x: &DVector<f64>) -> Result<DVector<f64>> {
        Err(OptimizerError::evaluation("gradient unavailable"))
    }

    fn hessian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>> {
        Ok(DMatrix::identity(x.len(), x.len()) * 2.0)
    }
}

#[test]
fn test_rosenbrock_derivatives_pass_checks() {
    let x = DVector::from_vec(vec![-1.2, 1.0]);

    let (grad_ok, grad_err) = DerivativeChecker::check_gradient(&Rosenbrock, &x, 1e-4).unwrap();
    let (hess_ok, hess_err) = DerivativeChecker::check_hessian(&Rosenbrock, &x, 1e-3).unwrap();

    assert!(grad_ok, "gradient error {}", grad_err);
    assert!(hess_ok, "Hessian error {}", hess_err);
}

#[test]
fn test_wrong_hessian_fails_check() {
    let cost = FnCostFunction::new(
        |x: &DVector<f64>| x[0].powi(4) + x[1] * x[1],
        |x: &DVector<f64>| DVector::from_vec(vec![4.0 * x[0].powi(3), 2.0 * x[1]]),
        |_x: &DVector<f64>| DMatrix::identity(2, 2),
    );
    let x = DVector::from_vec(vec![1.0, 1.0]);

    let (passes, max_error) = DerivativeChecker::check_hessian(&cost, &x, 1e-3).unwrap();

    assert!(!passes);
    assert_relative_eq!(max_error, 11.0, epsilon = 1e-3);
}

#[test]
fn test_evaluation_errors_propagate() {
    let x = DVector::from_vec(vec![1.0, 2.0]);

    let err = FailingGradient.gradient(&x).unwrap_err();

    assert_eq!(err, OptimizerError::evaluation("gradient unavailable"));
    assert!(!err.is_invalid_argument());
    assert!(DerivativeChecker::check_gradient(&FailingGradient, &x, 1e-6).is_err());
}

#[test]
fn test_counting_through_trait_object() {
    let cost = QuadraticCost::<f64>::simple(2);
    let counting = CountingCostFunction::new(&cost);
    let x = DVector::from_vec(vec![1.0, 1.0]);

    {
        let dynamic: &dyn CostFunction<f64> = &counting;
        dynamic.cost(&x).unwrap();
        dynamic.gradient(&x).unwrap();
        dynamic.gradient(&x).unwrap();
        dynamic.hessian(&x).unwrap();
    }

    assert_eq!(counting.counts(), (1, 2, 1));
}

#[test]
fn test_univariate_rejects_wrong_dimension() {
    let cost = UnivariateCost::new(|x: f64| x * x, |x: f64| 2.0 * x, |_x: f64| 2.0);

    let err = cost.gradient(&DVector::from_vec(vec![1.0, 2.0])).unwrap_err();

    assert!(err.is_invalid_argument());
}

#[test]
fn test_exhausted_result_converts_to_error() {
    let result = OptimizationResult::new(
        DVector::from_vec(vec![-10.0, 20.0]),
        -50.0,
        DVector::from_vec(vec![1.0, -2.0]),
        DMatrix::identity(2, 2),
        10,
        Duration::from_millis(3),
        TerminationReason::MaxIterations,
    );
    assert!(!result.converged);
    assert_relative_eq!(result.gradient_norm, 2.0);

    let err = result.into_converged(1e-5).unwrap_err();

    assert_eq!(
        err,
        OptimizerError::max_iterations_reached(10, -50.0, 2.0, 1e-5)
    );
}

#[test]
fn test_zero_tolerance_requires_exact_stationarity() {
    let criterion = StoppingCriterion::new().with_gradient_tolerance(0.0);

    assert!(criterion.validate().is_ok());
    assert!(criterion.is_satisfied_by(&DVector::from_vec(vec![0.0, -0.0])));
    assert!(!criterion.is_satisfied_by(&DVector::from_vec(vec![0.0, 1e-300])));
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_round_trip() {
    let criterion = StoppingCriterion::<f64>::new()
        .with_gradient_tolerance(1e-7)
        .with_max_iterations(25);

    let json = serde_json::to_string(&criterion).unwrap();
    let back: StoppingCriterion<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, criterion);

    let reason: TerminationReason = serde_json::from_str("\"MaxIterations\"").unwrap();
    assert_eq!(reason, TerminationReason::MaxIterations);
}

proptest! {
    #[test]
    fn prop_quadratic_gradient_matches_finite_differences(
        diag in prop::collection::vec(0.5f64..10.0, 3),
        b in prop::collection::vec(-5.0f64..5.0, 3),
        x in prop::collection::vec(-3.0f64..3.0, 3),
    ) {
        let cost = QuadraticCost::new(
            DMatrix::from_diagonal(&DVector::from_vec(diag)),
            DVector::from_vec(b),
            1.0,
        );
        let x = DVector::from_vec(x);

        let (passes, max_error) = DerivativeChecker::check_gradient(&cost, &x, 1e-5).unwrap();
        prop_assert!(passes, "max error {}", max_error);
    }
}
