//! Quasi-Newton descent direction.
//!
//! The direction solves `B d = -g`. For one-dimensional problems `B` is a
//! scalar and the direction is a plain division; otherwise the system is
//! solved through an LU decomposition with partial pivoting, so the inverse
//! of `B` is never formed.

use nalgebra::DVector as NVector;
use num_traits::Float;
use qnopt_core::{
    error::{OptimizerError, Result},
    types::{all_finite, DMatrix, DVector, Scalar},
};

/// Computes `d = -B⁻¹ g`.
///
/// # Errors
///
/// - `DimensionMismatch` if `hessian` is not N×N for a gradient of length N
/// - `SingularMatrix` if `B` has a zero pivot (zero scalar for N = 1) or the
///   solution is not finite
pub fn descent_direction<T>(
    hessian: &DMatrix<T>,
    gradient: &DVector<T>,
    iteration: usize,
) -> Result<DVector<T>>
where
    T: Scalar,
{
    let n = gradient.len();
    if hessian.shape() != (n, n) {
        return Err(OptimizerError::dimension_mismatch(
            "hessian",
            format!("{}x{}", n, n),
            format!("{}x{}", hessian.nrows(), hessian.ncols()),
        ));
    }

    let direction = if n == 1 {
        let b = hessian[(0, 0)];
        if b == T::zero() || !<T as Float>::is_finite(b) {
            return Err(OptimizerError::singular_matrix(iteration));
        }
        NVector::from_element(1, -gradient[0] / b)
    } else {
        hessian
            .clone()
            .lu()
            .solve(&(-gradient))
            .ok_or_else(|| OptimizerError::singular_matrix(iteration))?
    };

    if !all_finite(&direction) {
        return Err(OptimizerError::singular_matrix(iteration));
    }
    Ok(direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scalar_direction() {
        let h = DMatrix::from_element(1, 1, 2.0);
        let g = DVector::from_element(1, -6.0);

        let d = descent_direction(&h, &g, 1).unwrap();

        assert_relative_eq!(d[0], 3.0);
    }

    #[test]
    fn test_matrix_direction_is_newton_step() {
        let h = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let g = DVector::from_vec(vec![1.0, 2.0]);

        let d = descent_direction(&h, &g, 1).unwrap();

        assert_relative_eq!(&h * &d, -g, epsilon = 1e-12);
    }

    #[test]
    fn test_nonsymmetric_direction() {
        let h = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 0.0, 1.0]);
        let g = DVector::from_vec(vec![3.0, 1.0]);

        let d = descent_direction(&h, &g, 1).unwrap();

        assert_relative_eq!(d, DVector::from_vec(vec![-1.0, -1.0]), epsilon = 1e-12);
    }

    #[test]
    fn test_singular_matrix() {
        let h = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let g = DVector::from_vec(vec![1.0, 1.0]);

        let err = descent_direction(&h, &g, 5).unwrap_err();

        assert_eq!(err, OptimizerError::singular_matrix(5));
    }

    #[test]
    fn test_zero_scalar_is_singular() {
        let h = DMatrix::from_element(1, 1, 0.0);
        let g = DVector::from_element(1, 1.0);

        assert!(matches!(
            descent_direction(&h, &g, 2),
            Err(OptimizerError::SingularMatrix { iteration: 2 })
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let h = DMatrix::<f64>::identity(3, 3);
        let g = DVector::from_vec(vec![1.0, 1.0]);

        assert!(descent_direction(&h, &g, 1).unwrap_err().is_invalid_argument());
    }
}
