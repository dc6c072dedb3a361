//! Per-window posterior update.
//!
//! Given the prior `(Cpr, XIpr)` the estimator alternates between the residual
//! noise covariance `E` and the coefficient posterior until the coefficients
//! stop moving:
//!
//! ```text
//! E       = h/N * (φT - C·p)(φT - C·p)ᵀ
//! XIpt_ab = XIpr_ab + h * E⁻¹_ab * p pᵀ
//! r_a     = Σ_b XIpr_ab Cpr_b + h * (p (E⁻¹ φT)_aᵀ - ½ Σ v_a)
//! Cpt     = XIpt \ r
//! ```

use super::basis::FourierBasis;
use super::posterior::{CouplingCoefficients, Oscillator, PosteriorState};
use crate::constants::OSCILLATOR_COUNT;
use crate::error::{CouplingError, Result};
use crate::linalg::LinearSolver;
use nalgebra::{DMatrix, DVector};
use tracing::warn;

/// Outcome of one window's fixed-point loop.
#[derive(Debug, Clone)]
pub struct WindowFit {
    pub posterior: PosteriorState,
    /// 2x2 residual noise covariance.
    pub noise: DMatrix<f64>,
    pub iterations: usize,
    pub converged: bool,
}

pub struct WindowEstimator<'s, S: LinearSolver + ?Sized> {
    solver: &'s S,
    max_iterations: usize,
    convergence_tolerance: f64,
}

impl<'s, S: LinearSolver + ?Sized> WindowEstimator<'s, S> {
    pub fn new(solver: &'s S, max_iterations: usize, convergence_tolerance: f64) -> Self {
        Self {
            solver,
            max_iterations,
            convergence_tolerance,
        }
    }

    /// Runs the update loop for one window.
    ///
    /// `velocities` is the `2 x N` matrix of phase derivatives matching the
    /// basis columns. Hitting `max_iterations` is not an error; the last
    /// iterate is returned with `converged == false`.
    pub fn estimate(
        &self,
        basis: &FourierBasis,
        velocities: &DMatrix<f64>,
        prior: &PosteriorState,
        sampling_interval: f64,
    ) -> Result<WindowFit> {
        self.check_shapes(basis, velocities, prior)?;

        let h = sampling_interval;
        let gram = &basis.values * basis.values.transpose();
        let ito = [
            basis.derivative(Oscillator::First).column_sum() * 0.5,
            basis.derivative(Oscillator::Second).column_sum() * 0.5,
        ];
        let prior_drift = prior.precision.apply(&prior.coefficients);

        let mut coefficients = prior.coefficients.clone();
        let mut previous = coefficients.stacked();
        let mut iteration = 0;

        loop {
            iteration += 1;

            let noise = noise_covariance(&coefficients, basis, velocities, h);
            let inv_noise = self.solver.invert(&noise)?;

            let mut precision = prior.precision.clone();
            for a in Oscillator::BOTH {
                for b in Oscillator::BOTH {
                    let weight = h * inv_noise[(a.index(), b.index())];
                    let mut block = precision.block_mut(a, b);
                    block += &gram * weight;
                }
            }

            let weighted = &inv_noise * velocities;
            let rhs_for = |osc: Oscillator| -> DVector<f64> {
                let data = &basis.values * weighted.row(osc.index()).transpose();
                prior_drift.get(osc) + (data - &ito[osc.index()]) * h
            };
            let rhs = CouplingCoefficients {
                first: rhs_for(Oscillator::First),
                second: rhs_for(Oscillator::Second),
            };

            let stacked = self.solver.solve(precision.dense(), &rhs.stacked())?;
            let converged = relative_change(&previous, &stacked) < self.convergence_tolerance;
            let posterior = PosteriorState {
                coefficients: CouplingCoefficients::from_stacked(&stacked, basis.len())?,
                precision,
            };

            if converged || iteration >= self.max_iterations {
                if !converged {
                    warn!(
                        iterations = iteration,
                        "window estimate did not converge, returning last iterate"
                    );
                }
                return Ok(WindowFit {
                    posterior,
                    noise,
                    iterations: iteration,
                    converged,
                });
            }

            coefficients = posterior.coefficients;
            previous = stacked;
        }
    }

    fn check_shapes(
        &self,
        basis: &FourierBasis,
        velocities: &DMatrix<f64>,
        prior: &PosteriorState,
    ) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(CouplingError::invalid("max_iterations must be at least 1"));
        }
        if velocities.nrows() != OSCILLATOR_COUNT || velocities.ncols() != basis.sample_count() {
            return Err(CouplingError::invalid(format!(
                "velocities must be {}x{}, got {}x{}",
                OSCILLATOR_COUNT,
                basis.sample_count(),
                velocities.nrows(),
                velocities.ncols()
            )));
        }
        if prior.basis_len() != basis.len() || prior.precision.basis_len() != basis.len() {
            return Err(CouplingError::invalid(format!(
                "prior sized for {} basis functions, basis has {}",
                prior.basis_len(),
                basis.len()
            )));
        }
        if basis.sample_count() == 0 {
            return Err(CouplingError::invalid("window has no samples"));
        }
        Ok(())
    }
}

/// Residual covariance of the phase-velocity model under the given coefficients.
pub fn noise_covariance(
    coefficients: &CouplingCoefficients,
    basis: &FourierBasis,
    velocities: &DMatrix<f64>,
    sampling_interval: f64,
) -> DMatrix<f64> {
    let residual = velocities - coefficients.as_rows() * &basis.values;
    let n = basis.sample_count() as f64;
    (&residual * residual.transpose()) * (sampling_interval / n)
}

/// `Σ (old - new)² / new²`. NaN (a coefficient stuck at exactly zero) never converges.
fn relative_change(old: &DVector<f64>, new: &DVector<f64>) -> f64 {
    old.iter()
        .zip(new.iter())
        .map(|(o, n)| (o - n).powi(2) / (n * n))
        .sum()
}
