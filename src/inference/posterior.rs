use crate::error::{CouplingError, Result};
use nalgebra::{DMatrix, DMatrixView, DMatrixViewMut, DVector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Oscillator {
    First,
    Second,
}

impl Oscillator {
    pub const BOTH: [Oscillator; 2] = [Oscillator::First, Oscillator::Second];

    pub fn index(self) -> usize {
        match self {
            Oscillator::First => 0,
            Oscillator::Second => 1,
        }
    }

    pub fn other(self) -> Oscillator {
        match self {
            Oscillator::First => Oscillator::Second,
            Oscillator::Second => Oscillator::First,
        }
    }
}

/// Fourier coefficients of both oscillators' phase equations.
///
/// The stacked form (`first` then `second`) is what the linear solver sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingCoefficients {
    pub first: DVector<f64>,
    pub second: DVector<f64>,
}

impl CouplingCoefficients {
    pub fn zeros(basis_len: usize) -> Self {
        Self {
            first: DVector::zeros(basis_len),
            second: DVector::zeros(basis_len),
        }
    }

    pub fn new(first: DVector<f64>, second: DVector<f64>) -> Result<Self> {
        if first.len() != second.len() {
            return Err(CouplingError::invalid(format!(
                "coefficient halves differ in length ({} vs {})",
                first.len(),
                second.len()
            )));
        }
        Ok(Self { first, second })
    }

    pub fn from_stacked(stacked: &DVector<f64>, basis_len: usize) -> Result<Self> {
        if stacked.len() != 2 * basis_len {
            return Err(CouplingError::invalid(format!(
                "expected {} stacked coefficients, got {}",
                2 * basis_len,
                stacked.len()
            )));
        }
        Ok(Self {
            first: stacked.rows(0, basis_len).into_owned(),
            second: stacked.rows(basis_len, basis_len).into_owned(),
        })
    }

    pub fn basis_len(&self) -> usize {
        self.first.len()
    }

    pub fn get(&self, osc: Oscillator) -> &DVector<f64> {
        match osc {
            Oscillator::First => &self.first,
            Oscillator::Second => &self.second,
        }
    }

    pub fn stacked(&self) -> DVector<f64> {
        let k = self.basis_len();
        let mut out = DVector::zeros(2 * k);
        out.rows_mut(0, k).copy_from(&self.first);
        out.rows_mut(k, k).copy_from(&self.second);
        out
    }

    /// `2 x K` matrix, one row per oscillator, so `rows * p` predicts both velocities.
    pub fn as_rows(&self) -> DMatrix<f64> {
        let k = self.basis_len();
        let mut rows = DMatrix::zeros(2, k);
        rows.row_mut(0).copy_from(&self.first.transpose());
        rows.row_mut(1).copy_from(&self.second.transpose());
        rows
    }
}

/// `2K x 2K` precision matrix addressed by oscillator blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionMatrix {
    dense: DMatrix<f64>,
    basis_len: usize,
}

impl PrecisionMatrix {
    pub fn zeros(basis_len: usize) -> Self {
        Self {
            dense: DMatrix::zeros(2 * basis_len, 2 * basis_len),
            basis_len,
        }
    }

    pub fn from_dense(dense: DMatrix<f64>, basis_len: usize) -> Result<Self> {
        if dense.nrows() != 2 * basis_len || dense.ncols() != 2 * basis_len {
            return Err(CouplingError::invalid(format!(
                "precision must be {0}x{0}, got {1}x{2}",
                2 * basis_len,
                dense.nrows(),
                dense.ncols()
            )));
        }
        Ok(Self { dense, basis_len })
    }

    pub fn basis_len(&self) -> usize {
        self.basis_len
    }

    pub fn dense(&self) -> &DMatrix<f64> {
        &self.dense
    }

    pub fn block(&self, row: Oscillator, col: Oscillator) -> DMatrixView<'_, f64> {
        let k = self.basis_len;
        self.dense.view((row.index() * k, col.index() * k), (k, k))
    }

    pub fn block_mut(&mut self, row: Oscillator, col: Oscillator) -> DMatrixViewMut<'_, f64> {
        let k = self.basis_len;
        self.dense.view_mut((row.index() * k, col.index() * k), (k, k))
    }

    /// Blockwise `XI * C`.
    pub fn apply(&self, coefficients: &CouplingCoefficients) -> CouplingCoefficients {
        let row = |osc: Oscillator| {
            self.block(osc, Oscillator::First) * &coefficients.first
                + self.block(osc, Oscillator::Second) * &coefficients.second
        };
        CouplingCoefficients {
            first: row(Oscillator::First),
            second: row(Oscillator::Second),
        }
    }
}

/// Belief about the coupling coefficients: mean and precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorState {
    pub coefficients: CouplingCoefficients,
    pub precision: PrecisionMatrix,
}

impl PosteriorState {
    /// Zero mean, zero precision: the prior of the first window.
    pub fn uninformative(basis_len: usize) -> Self {
        Self {
            coefficients: CouplingCoefficients::zeros(basis_len),
            precision: PrecisionMatrix::zeros(basis_len),
        }
    }

    pub fn basis_len(&self) -> usize {
        self.coefficients.basis_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_round_trip_keeps_order() {
        let stacked = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let c = CouplingCoefficients::from_stacked(&stacked, 3).unwrap();
        assert_eq!(c.first.as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(c.second.as_slice(), &[4.0, 5.0, 6.0]);
        assert_eq!(c.stacked(), stacked);

        let rows = c.as_rows();
        assert_eq!(rows[(1, 0)], 4.0);
        assert_eq!(rows[(0, 2)], 3.0);
    }

    #[test]
    fn test_stack_length_mismatch() {
        let stacked = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(CouplingCoefficients::from_stacked(&stacked, 2).is_err());
        assert!(CouplingCoefficients::new(DVector::zeros(2), DVector::zeros(3)).is_err());
    }

    #[test]
    fn test_precision_blocks() {
        let dense = DMatrix::from_fn(4, 4, |r, c| (r * 4 + c) as f64);
        let mut xi = PrecisionMatrix::from_dense(dense, 2).unwrap();

        let off = xi.block(Oscillator::First, Oscillator::Second);
        assert_eq!(off[(0, 0)], 2.0);
        assert_eq!(off[(1, 1)], 7.0);
        let lower = xi.block(Oscillator::Second, Oscillator::First);
        assert_eq!(lower[(0, 0)], 8.0);

        xi.block_mut(Oscillator::Second, Oscillator::Second).fill(0.0);
        assert_eq!(xi.dense()[(3, 3)], 0.0);
        assert_eq!(xi.dense()[(1, 1)], 5.0);
    }

    #[test]
    fn test_apply_matches_dense_product() {
        let dense = DMatrix::from_fn(4, 4, |r, c| 1.0 + r as f64 - 0.5 * c as f64);
        let xi = PrecisionMatrix::from_dense(dense.clone(), 2).unwrap();
        let c = CouplingCoefficients::new(
            DVector::from_vec(vec![1.0, -1.0]),
            DVector::from_vec(vec![0.5, 2.0]),
        )
        .unwrap();

        let blockwise = xi.apply(&c).stacked();
        let direct = dense * c.stacked();
        assert!((blockwise - direct).norm() < 1e-12);
    }

    #[test]
    fn test_precision_shape_check() {
        assert!(PrecisionMatrix::from_dense(DMatrix::zeros(3, 3), 2).is_err());
        assert_eq!(PosteriorState::uninformative(9).precision.dense().nrows(), 18);
    }

    #[test]
    fn test_oscillator_helpers() {
        assert_eq!(Oscillator::First.other(), Oscillator::Second);
        assert_eq!(Oscillator::Second.index(), 1);
    }
}
