use crate::constants::{SURFACE_GRID_STEP, TWO_PI};
use crate::error::{CouplingError, Result};
use crate::inference::basis::{basis_terms, BasisTerm};
use crate::inference::posterior::{CouplingCoefficients, Oscillator};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Coupling functions of both oscillators sampled on a square phase grid.
///
/// `q1[(r, c)]` is oscillator 1's coupling at `φ1 = phase_axis[r]`,
/// `φ2 = phase_axis[c]`; `q2` uses the same layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingSurface {
    pub phase_axis: Vec<f64>,
    pub q1: DMatrix<f64>,
    pub q2: DMatrix<f64>,
}

impl CouplingSurface {
    pub fn get(&self, osc: Oscillator) -> &DMatrix<f64> {
        match osc {
            Oscillator::First => &self.q1,
            Oscillator::Second => &self.q2,
        }
    }
}

/// Evaluates the non-constant part of the fitted phase equations on a grid.
#[derive(Debug, Clone)]
pub struct CouplingSurfaceReconstructor {
    terms: Vec<BasisTerm>,
    step: f64,
}

impl CouplingSurfaceReconstructor {
    pub fn new(order: usize) -> Result<Self> {
        Self::with_step(order, SURFACE_GRID_STEP)
    }

    pub fn with_step(order: usize, step: f64) -> Result<Self> {
        if order < 1 {
            return Err(CouplingError::invalid("harmonic order must be at least 1"));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(CouplingError::invalid(format!(
                "grid step must be positive and finite, got {}",
                step
            )));
        }
        Ok(Self {
            terms: basis_terms(order),
            step,
        })
    }

    /// Grid points `0, step, 2·step, ...` strictly below 2π.
    pub fn phase_axis(&self) -> Vec<f64> {
        (0..)
            .map(|k| k as f64 * self.step)
            .take_while(|&phi| phi < TWO_PI)
            .collect()
    }

    pub fn reconstruct(&self, coefficients: &CouplingCoefficients) -> Result<CouplingSurface> {
        if coefficients.basis_len() != self.terms.len() {
            return Err(CouplingError::invalid(format!(
                "expected {} coefficients per oscillator, got {}",
                self.terms.len(),
                coefficients.basis_len()
            )));
        }

        let axis = self.phase_axis();
        let grid = |osc: Oscillator| {
            let c = coefficients.get(osc);
            DMatrix::from_fn(axis.len(), axis.len(), |r, col| {
                self.terms
                    .iter()
                    .zip(c.iter())
                    .filter(|(term, _)| **term != BasisTerm::Constant)
                    .map(|(term, weight)| weight * term.evaluate(axis[r], axis[col]))
                    .sum::<f64>()
            })
        };

        Ok(CouplingSurface {
            q1: grid(Oscillator::First),
            q2: grid(Oscillator::Second),
            phase_axis: axis,
        })
    }
}
