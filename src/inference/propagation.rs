use super::posterior::{PosteriorState, PrecisionMatrix};
use crate::error::{CouplingError, Result};
use crate::linalg::LinearSolver;

/// Turns one window's posterior into the next window's prior.
///
/// The mean carries over unchanged. The covariance `Σ = XIpt⁻¹` gets its
/// diagonal inflated by `rate² · Σ_ii`, modelling a random walk of the true
/// coefficients between windows.
pub struct PriorPropagator<'s, S: LinearSolver + ?Sized> {
    solver: &'s S,
}

impl<'s, S: LinearSolver + ?Sized> PriorPropagator<'s, S> {
    pub fn new(solver: &'s S) -> Self {
        Self { solver }
    }

    pub fn propagate(&self, posterior: PosteriorState, rate: f64) -> Result<PosteriorState> {
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(CouplingError::invalid(format!(
                "propagation rate must be finite and non-negative, got {}",
                rate
            )));
        }

        let basis_len = posterior.precision.basis_len();
        let covariance = self.solver.invert(posterior.precision.dense())?;

        let mut inflated = covariance.clone();
        let spread = rate * rate;
        for i in 0..covariance.nrows() {
            inflated[(i, i)] += spread * covariance[(i, i)];
        }

        let precision = self.solver.invert(&inflated)?;
        Ok(PosteriorState {
            coefficients: posterior.coefficients,
            precision: PrecisionMatrix::from_dense(precision, basis_len)?,
        })
    }
}
