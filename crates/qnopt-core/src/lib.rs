//! Core traits and types for quasi-Newton minimization.
//!
//! This crate provides the foundational pieces shared by the solver and the
//! Hessian update strategies in `qnopt-optim`: the capability set a caller
//! supplies (objective, gradient, Hessian provider), the stopping criterion,
//! the tagged optimization result and the error taxonomy.
//!
//! # Modules
//!
//! - [`core`]: Scalars, errors and the cost function interface
//! - [`optimization`]: Stopping criterion, results and the optimizer trait
//!
//! The most used submodules are also reachable from the crate root:
//!
//! - [`cost_function`]: Cost function interface and closure adapters
//! - [`error`]: Error types for argument validation and numerical failures
//! - [`optimizer`]: Stopping criterion, results and the optimizer trait
//! - [`types`]: Scalar trait, type aliases and numerical constants

pub mod core;
pub mod optimization;

// Flat paths to the most used modules
pub use crate::core::{cost_function, error, types};
pub use crate::optimization::optimizer;

// Re-export commonly used items at the crate root
pub use error::{OptimizerError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use qnopt_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cost_function::{
        CostFunction, CountingCostFunction, DerivativeChecker, FnCostFunction, QuadraticCost,
        UnivariateCost,
    };
    pub use crate::error::{OptimizerError, Result};
    pub use crate::optimizer::{
        OptimizationResult, Optimizer, StoppingCriterion, TerminationReason,
    };
    pub use crate::types::{constants, DMatrix, DVector, Gradient, Point, Scalar};
}
