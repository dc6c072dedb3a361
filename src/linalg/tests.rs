use super::algebra::*;
use crate::error::CouplingError;
use nalgebra::{DMatrix, DVector};

#[test]
fn test_invert_diagonal() {
    // A = diag(2, 4) -> A^-1 = diag(0.5, 0.25)
    let a = DMatrix::from_diagonal(&DVector::from_vec(vec![2.0, 4.0]));
    let inv = LuSolver::default().invert(&a).unwrap();

    assert!((inv[(0, 0)] - 0.5).abs() < 1e-12);
    assert!((inv[(1, 1)] - 0.25).abs() < 1e-12);
    assert!(inv[(0, 1)].abs() < 1e-12);
}

#[test]
fn test_invert_dense() {
    // [[4, 7], [2, 6]]^-1 = 1/10 * [[6, -7], [-2, 4]]
    let a = DMatrix::from_row_slice(2, 2, &[4.0, 7.0, 2.0, 6.0]);
    let inv = LuSolver::default().invert(&a).unwrap();

    let expected = DMatrix::from_row_slice(2, 2, &[0.6, -0.7, -0.2, 0.4]);
    assert!((inv - expected).abs().max() < 1e-12);
}

#[test]
fn test_solve_matches_inverse() {
    let a = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.5, 1.0, 3.0, 0.2, 0.5, 0.2, 2.0]);
    let b = DVector::from_vec(vec![1.0, -2.0, 0.5]);
    let solver = LuSolver::default();

    let x = solver.solve(&a, &b).unwrap();
    let residual = &a * &x - &b;
    assert!(residual.norm() < 1e-12);

    let via_inverse = solver.invert(&a).unwrap() * &b;
    assert!((x - via_inverse).norm() < 1e-12);
}

#[test]
fn test_exactly_singular() {
    let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
    let solver = LuSolver::default();

    assert!(matches!(
        solver.invert(&a),
        Err(CouplingError::SingularMatrix(_))
    ));
    let b = DVector::from_vec(vec![1.0, 1.0]);
    assert!(matches!(
        solver.solve(&a, &b),
        Err(CouplingError::SingularMatrix(_))
    ));
}

#[test]
fn test_near_singular() {
    // Rows differ only in the 15th digit.
    let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0 + 1e-15]);
    assert!(matches!(
        LuSolver::default().invert(&a),
        Err(CouplingError::SingularMatrix(_))
    ));

    // A stricter tolerance rejects what the default accepts.
    let b = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0 + 1e-6]);
    assert!(LuSolver::default().invert(&b).is_ok());
    assert!(LuSolver::new(1e-3).invert(&b).is_err());
}

#[test]
fn test_zero_matrix_is_singular() {
    let a = DMatrix::<f64>::zeros(3, 3);
    assert!(matches!(
        LuSolver::default().invert(&a),
        Err(CouplingError::SingularMatrix(_))
    ));
}

#[test]
fn test_non_finite_is_singular() {
    let a = DMatrix::from_row_slice(2, 2, &[1.0, f64::NAN, 0.0, 1.0]);
    assert!(matches!(
        LuSolver::default().invert(&a),
        Err(CouplingError::SingularMatrix(_))
    ));
}

#[test]
fn test_shape_errors() {
    let solver = LuSolver::default();
    let rect = DMatrix::<f64>::zeros(2, 3);
    assert!(matches!(
        solver.invert(&rect),
        Err(CouplingError::InvalidInput(_))
    ));

    let a = DMatrix::<f64>::identity(2, 2);
    let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
    assert!(matches!(
        solver.solve(&a, &b),
        Err(CouplingError::InvalidInput(_))
    ));
}
