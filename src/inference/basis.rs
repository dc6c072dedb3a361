//! Fourier basis over a pair of phases.
//!
//! The ordering produced by [`basis_terms`] is the schema shared by the
//! design matrix, both derivative matrices, the coefficient vectors, the
//! coupling summary and the reconstructed surface:
//!
//! 1. the constant term,
//! 2. `sin(iφ1)`, `cos(iφ1)` for `i = 1..=order`,
//! 3. `sin(iφ2)`, `cos(iφ2)` for `i = 1..=order`,
//! 4. for every `(i, j)` in row-major order: `sin(iφ1 + jφ2)`, `cos(iφ1 + jφ2)`,
//!    `sin(iφ1 - jφ2)`, `cos(iφ1 - jφ2)`.

use super::posterior::Oscillator;
use crate::error::{CouplingError, Result};
use crate::phase::PhaseIncrements;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trig {
    Sin,
    Cos,
}

impl Trig {
    pub const BOTH: [Trig; 2] = [Trig::Sin, Trig::Cos];
}

/// One row of the basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BasisTerm {
    Constant,
    Phase1 { harmonic: usize, trig: Trig },
    Phase2 { harmonic: usize, trig: Trig },
    Sum { i: usize, j: usize, trig: Trig },
    Difference { i: usize, j: usize, trig: Trig },
}

impl BasisTerm {
    /// Integer multipliers of (φ1, φ2) inside the trigonometric argument.
    fn multipliers(&self) -> (f64, f64) {
        match *self {
            BasisTerm::Constant => (0.0, 0.0),
            BasisTerm::Phase1 { harmonic, .. } => (harmonic as f64, 0.0),
            BasisTerm::Phase2 { harmonic, .. } => (0.0, harmonic as f64),
            BasisTerm::Sum { i, j, .. } => (i as f64, j as f64),
            BasisTerm::Difference { i, j, .. } => (i as f64, -(j as f64)),
        }
    }

    fn trig(&self) -> Option<Trig> {
        match *self {
            BasisTerm::Constant => None,
            BasisTerm::Phase1 { trig, .. }
            | BasisTerm::Phase2 { trig, .. }
            | BasisTerm::Sum { trig, .. }
            | BasisTerm::Difference { trig, .. } => Some(trig),
        }
    }

    pub fn evaluate(&self, phi1: f64, phi2: f64) -> f64 {
        let (a, b) = self.multipliers();
        let arg = a * phi1 + b * phi2;
        match self.trig() {
            None => 1.0,
            Some(Trig::Sin) => arg.sin(),
            Some(Trig::Cos) => arg.cos(),
        }
    }

    /// Analytic partial derivative with respect to one oscillator's phase.
    pub fn derivative(&self, wrt: Oscillator, phi1: f64, phi2: f64) -> f64 {
        let (a, b) = self.multipliers();
        let k = match wrt {
            Oscillator::First => a,
            Oscillator::Second => b,
        };
        if k == 0.0 {
            return 0.0;
        }
        let arg = a * phi1 + b * phi2;
        match self.trig() {
            None => 0.0,
            Some(Trig::Sin) => k * arg.cos(),
            Some(Trig::Cos) => -k * arg.sin(),
        }
    }

    /// Whether the term varies with the given oscillator's phase.
    pub fn depends_on(&self, osc: Oscillator) -> bool {
        let (a, b) = self.multipliers();
        match osc {
            Oscillator::First => a != 0.0,
            Oscillator::Second => b != 0.0,
        }
    }
}

/// Number of basis functions for a harmonic order: `1 + 4n + 4n²`.
pub fn basis_len(order: usize) -> usize {
    1 + 4 * order + 4 * order * order
}

pub fn basis_terms(order: usize) -> Vec<BasisTerm> {
    let mut terms = Vec::with_capacity(basis_len(order));
    terms.push(BasisTerm::Constant);

    for harmonic in 1..=order {
        for trig in Trig::BOTH {
            terms.push(BasisTerm::Phase1 { harmonic, trig });
        }
    }
    for harmonic in 1..=order {
        for trig in Trig::BOTH {
            terms.push(BasisTerm::Phase2 { harmonic, trig });
        }
    }
    for i in 1..=order {
        for j in 1..=order {
            for trig in Trig::BOTH {
                terms.push(BasisTerm::Sum { i, j, trig });
            }
            for trig in Trig::BOTH {
                terms.push(BasisTerm::Difference { i, j, trig });
            }
        }
    }

    terms
}

/// Design matrix `p` and its partial derivatives, all `K x N`.
#[derive(Debug, Clone)]
pub struct FourierBasis {
    pub order: usize,
    pub terms: Vec<BasisTerm>,
    pub values: DMatrix<f64>,
    pub d_phase1: DMatrix<f64>,
    pub d_phase2: DMatrix<f64>,
}

impl FourierBasis {
    /// Evaluates the basis at the midpoint phases of a segment.
    pub fn build(increments: &PhaseIncrements, order: usize) -> Result<Self> {
        if order < 1 {
            return Err(CouplingError::invalid("harmonic order must be at least 1"));
        }
        if increments.midpoint1.len() != increments.midpoint2.len() {
            return Err(CouplingError::invalid(format!(
                "midpoint sequences differ in length ({} vs {})",
                increments.midpoint1.len(),
                increments.midpoint2.len()
            )));
        }

        let terms = basis_terms(order);
        let (m1, m2) = (&increments.midpoint1, &increments.midpoint2);
        let (k, n) = (terms.len(), m1.len());

        let values = DMatrix::from_fn(k, n, |r, c| terms[r].evaluate(m1[c], m2[c]));
        let d_phase1 =
            DMatrix::from_fn(k, n, |r, c| terms[r].derivative(Oscillator::First, m1[c], m2[c]));
        let d_phase2 =
            DMatrix::from_fn(k, n, |r, c| terms[r].derivative(Oscillator::Second, m1[c], m2[c]));

        Ok(Self {
            order,
            terms,
            values,
            d_phase1,
            d_phase2,
        })
    }

    /// Builds increments and basis straight from a raw phase segment.
    pub fn from_phases(
        phase1: &[f64],
        phase2: &[f64],
        sampling_interval: f64,
        order: usize,
    ) -> Result<(Self, PhaseIncrements)> {
        let increments = PhaseIncrements::from_segment(phase1, phase2, sampling_interval)?;
        let basis = Self::build(&increments, order)?;
        Ok((basis, increments))
    }

    pub fn derivative(&self, wrt: Oscillator) -> &DMatrix<f64> {
        match wrt {
            Oscillator::First => &self.d_phase1,
            Oscillator::Second => &self.d_phase2,
        }
    }

    /// Number of basis functions `K`.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of midpoint samples `N`.
    pub fn sample_count(&self) -> usize {
        self.values.ncols()
    }
}
