//! Quasi-Newton local minimization.
//!
//! `qnopt` bundles the two workspace crates behind one dependency:
//!
//! - [`qnopt_core`]: cost functions, stopping criterion, results and errors
//! - [`qnopt_optim`]: the solver and the BFGS / good Broyden update strategies
//!
//! # Quick Start
//!
//! ```rust
//! use qnopt::prelude::*;
//!
//! // f(x) = (x_0 - 1)^2 + 10 (x_1 + 2)^2
//! let cost = FnCostFunction::new(
//!     |x: &DVector<f64>| (x[0] - 1.0).powi(2) + 10.0 * (x[1] + 2.0).powi(2),
//!     |x: &DVector<f64>| DVector::from_vec(vec![2.0 * (x[0] - 1.0), 20.0 * (x[1] + 2.0)]),
//!     |_x: &DVector<f64>| DMatrix::from_diagonal(&DVector::from_vec(vec![2.0, 20.0])),
//! );
//!
//! let bfgs = Bfgs::<f64>::new();
//! let result = minimize(&cost, &DVector::zeros(2), Some(&bfgs), &StoppingCriterion::new())?;
//!
//! assert!(result.converged);
//! assert!((result.point[0] - 1.0).abs() < 1e-6);
//! assert!((result.point[1] + 2.0).abs() < 1e-6);
//! # Ok::<(), qnopt::qnopt_core::OptimizerError>(())
//! ```

pub use nalgebra;
pub use qnopt_core;
pub use qnopt_optim;

/// Everything needed for a typical minimization run.
pub mod prelude {
    pub use qnopt_core::prelude::*;
    pub use qnopt_optim::{
        minimize, Bfgs, DegeneratePolicy, GoodBroyden, HessianUpdate, QuasiNewton,
        QuasiNewtonConfig, SecantPair,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_solves_univariate_problem() {
        let cost = UnivariateCost::new(
            |x: f64| (x - 3.0).powi(2),
            |x: f64| 2.0 * (x - 3.0),
            |_x: f64| 2.0,
        );

        let result = minimize(&cost, &DVector::from_element(1, 0.0), None, &StoppingCriterion::new())
            .unwrap();

        assert_eq!(result.iterations, 1);
        assert!((result.point[0] - 3.0).abs() < 1e-12);
    }
}
