//! Stopping criterion, tagged results and the optimizer trait.

pub mod optimizer;

pub use optimizer::*;
