//! Quasi-Newton solver and Hessian update strategies.
//!
//! This crate provides the iteration loop built on the traits of
//! `qnopt-core`, together with the rules that refresh the Hessian
//! approximation from first-derivative information.
//!
//! # Available Methods
//!
//! - **Newton**: no update strategy; the Hessian provider is evaluated at
//!   every iterate
//! - **BFGS**: symmetric rank-two update of the direct Hessian
//! - **Good Broyden**: rank-one update, not symmetric in general
//!
//! # Examples
//!
//! ```rust
//! use qnopt_core::prelude::*;
//! use qnopt_optim::{QuasiNewton, QuasiNewtonConfig, update::GoodBroyden};
//!
//! let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
//! let cost = QuadraticCost::new(a, DVector::from_vec(vec![1.0, 2.0]), 0.0);
//!
//! let mut optimizer = QuasiNewton::new(QuasiNewtonConfig::new().with_step_length(1.0))
//!     .with_update(GoodBroyden::new());
//! let criterion = StoppingCriterion::new()
//!     .with_gradient_tolerance(1e-8)
//!     .with_max_iterations(50);
//!
//! let result = optimizer
//!     .optimize(&cost, &DVector::from_vec(vec![1.0, 1.0]), &criterion)
//!     .unwrap();
//! assert!(result.converged);
//! ```

pub mod direction;
pub mod quasi_newton;
pub mod update;

pub use direction::descent_direction;
pub use quasi_newton::{minimize, QuasiNewton, QuasiNewtonConfig};
pub use update::{Bfgs, DegeneratePolicy, GoodBroyden, HessianUpdate, SecantPair};
