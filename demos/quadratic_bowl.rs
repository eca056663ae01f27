//! Example: minimizing an ill-conditioned quadratic bowl.
//!
//! The Hessian provider only knows the diagonal of the true Hessian, so the
//! plain Newton iteration converges slowly while BFGS recovers the coupling
//! from gradient differences.
//!
//! Run with `RUST_LOG=debug` to see per-iteration logs.

use qnopt::prelude::*;
use tracing_subscriber::EnvFilter;

/// f(x) = ½ xᵀ A x + bᵀ x with a provider returning diag(A).
#[derive(Debug)]
struct Bowl {
    quadratic: QuadraticCost<f64>,
}

impl CostFunction<f64> for Bowl {
    fn cost(&self, x: &DVector<f64>) -> Result<f64> {
        self.quadratic.cost(x)
    }

    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        self.quadratic.gradient(x)
    }

    fn hessian(&self, _x: &DVector<f64>) -> Result<DMatrix<f64>> {
        Ok(DMatrix::from_diagonal(&self.quadratic.a.diagonal()))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Quasi-Newton on an ill-conditioned bowl ===\n");

    let a = DMatrix::from_row_slice(3, 3, &[100.0, 1.0, 0.0, 1.0, 10.0, 0.5, 0.0, 0.5, 1.0]);
    let b = DVector::from_vec(vec![1.0, -2.0, 3.0]);
    let bowl = Bowl {
        quadratic: QuadraticCost::new(a, b, 0.0),
    };
    let x0 = DVector::from_vec(vec![1.0, 1.0, 1.0]);

    let (ok, max_error) = DerivativeChecker::check_gradient(&bowl, &x0, 1e-5)?;
    println!("Gradient check: passes={} (max error {:.2e})\n", ok, max_error);

    let criterion = StoppingCriterion::new()
        .with_gradient_tolerance(1e-8)
        .with_max_iterations(100);

    let mut solvers = vec![
        QuasiNewton::<f64>::default(),
        QuasiNewton::default().with_update(Bfgs::new()),
        QuasiNewton::default().with_update(GoodBroyden::new()),
    ];

    for solver in &mut solvers {
        let result = solver.optimize(&bowl, &x0, &criterion)?;
        println!("{}:", solver.name());
        println!("  Status: {}", result.termination_reason);
        println!("  Iterations: {}", result.iterations);
        println!("  Final value: {:.10}", result.value);
        println!(
            "  Final point: [{:.6}, {:.6}, {:.6}]",
            result.point[0], result.point[1], result.point[2]
        );
        println!(
            "  Evaluations: f={} grad={} hess={}",
            result.function_evaluations, result.gradient_evaluations, result.hessian_evaluations
        );
        println!("  Time: {:?}\n", result.duration);
    }

    Ok(())
}
