use crate::constants::DEFAULT_SINGULAR_TOLERANCE;
use crate::error::{CouplingError, Result};
use nalgebra::{DMatrix, DVector, Dyn, LU};

/// Linear algebra backend used by the estimator and the propagator.
///
/// Every inversion and solve in the engine goes through this trait so the
/// numerical backend can be swapped and tested in isolation.
pub trait LinearSolver: Send + Sync {
    /// Solve `A x = b` for `x`.
    fn solve(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>>;

    /// Compute `A^-1`.
    fn invert(&self, a: &DMatrix<f64>) -> Result<DMatrix<f64>>;
}

/// LU decomposition with partial pivoting.
///
/// A matrix is rejected as numerically singular when the ratio between its
/// smallest and largest absolute pivot drops to `singular_tolerance` or below.
#[derive(Debug, Clone, Copy)]
pub struct LuSolver {
    pub singular_tolerance: f64,
}

impl Default for LuSolver {
    fn default() -> Self {
        Self {
            singular_tolerance: DEFAULT_SINGULAR_TOLERANCE,
        }
    }
}

impl LuSolver {
    pub fn new(singular_tolerance: f64) -> Self {
        Self { singular_tolerance }
    }

    fn factorize(&self, a: &DMatrix<f64>) -> Result<LU<f64, Dyn, Dyn>> {
        if !a.is_square() || a.nrows() == 0 {
            return Err(CouplingError::invalid(format!(
                "expected a non-empty square matrix, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        if a.iter().any(|x| !x.is_finite()) {
            return Err(CouplingError::singular("matrix contains non-finite entries"));
        }

        let lu = a.clone().lu();
        let (smallest, largest) = lu
            .u()
            .diagonal()
            .iter()
            .fold((f64::INFINITY, 0.0f64), |(lo, hi), pivot| {
                (lo.min(pivot.abs()), hi.max(pivot.abs()))
            });

        if largest == 0.0 || smallest / largest <= self.singular_tolerance {
            return Err(CouplingError::singular(format!(
                "{}x{} matrix has pivot ratio {:.3e}",
                a.nrows(),
                a.ncols(),
                if largest == 0.0 { 0.0 } else { smallest / largest }
            )));
        }

        Ok(lu)
    }
}

impl LinearSolver for LuSolver {
    fn solve(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
        if a.nrows() != b.len() {
            return Err(CouplingError::invalid(format!(
                "right-hand side has length {} but matrix has {} rows",
                b.len(),
                a.nrows()
            )));
        }

        let lu = self.factorize(a)?;
        let x = lu
            .solve(b)
            .ok_or_else(|| CouplingError::singular("LU solve failed"))?;

        if x.iter().any(|v| !v.is_finite()) {
            return Err(CouplingError::singular("solution is not finite"));
        }
        Ok(x)
    }

    fn invert(&self, a: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let lu = self.factorize(a)?;
        let inv = lu
            .try_inverse()
            .ok_or_else(|| CouplingError::singular("LU inversion failed"))?;

        if inv.iter().any(|v| !v.is_finite()) {
            return Err(CouplingError::singular("inverse is not finite"));
        }
        Ok(inv)
    }
}
