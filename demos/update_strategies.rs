//! Example: how the update strategies behave on a single secant pair and on
//! degenerate input.

use qnopt::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .init();

    println!("=== Hessian update strategies ===\n");

    let b0 = DMatrix::<f64>::identity(2, 2);
    let pair = SecantPair::new(
        DVector::from_vec(vec![0.5, -0.25]),
        DVector::from_vec(vec![2.0, 0.5]),
    )?;
    println!("Curvature y^T s = {:.4}\n", pair.curvature());

    let bfgs = Bfgs::<f64>::new();
    let broyden = GoodBroyden::<f64>::new();
    let strategies: [&dyn HessianUpdate<f64>; 2] = [&bfgs, &broyden];

    for strategy in strategies {
        let updated = strategy.update_secant(&b0, &pair)?;
        let residual = (&updated * &pair.s - &pair.y).amax();
        println!("{} update:{}", strategy.name(), updated);
        println!("  secant residual: {:.2e}", residual);
        println!("  symmetric: {}\n", updated == updated.transpose());
    }

    println!("--- Zero step ---");
    let zero = SecantPair::new(DVector::zeros(2), DVector::zeros(2))?;

    let skipped = bfgs.update_secant(&b0, &zero)?;
    println!("Skip policy keeps the matrix: {}", skipped == b0);

    let strict = Bfgs::<f64>::new().with_policy(DegeneratePolicy::Error);
    match strict.update_secant(&b0, &zero) {
        Ok(_) => println!("Error policy unexpectedly accepted a zero step"),
        Err(e) => println!("Error policy: {}", e),
    }

    Ok(())
}
