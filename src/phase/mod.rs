//! Phase input handling: validation, unwrapping and finite differences.

pub mod unwrap;

pub use unwrap::unwrap_phase;

use crate::constants::{OSCILLATOR_COUNT, WRAPPED_PHASE_LIMIT};
use crate::error::{CouplingError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Instantaneous phases of two oscillators sampled on a shared, constant grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhasePair {
    pub phase1: Vec<f64>,
    pub phase2: Vec<f64>,
    /// Sampling interval `h` in seconds.
    pub sampling_interval: f64,
}

impl PhasePair {
    pub fn new(phase1: Vec<f64>, phase2: Vec<f64>, sampling_interval: f64) -> Result<Self> {
        let pair = Self {
            phase1,
            phase2,
            sampling_interval,
        };
        pair.validate()?;
        Ok(pair)
    }

    /// Checks shapes and values. Deserialized pairs skip `new`, so the
    /// pipeline calls this again before estimating.
    pub fn validate(&self) -> Result<()> {
        if self.phase1.len() != self.phase2.len() {
            return Err(CouplingError::invalid(format!(
                "phase sequences differ in length ({} vs {})",
                self.phase1.len(),
                self.phase2.len()
            )));
        }
        if !(self.sampling_interval.is_finite() && self.sampling_interval > 0.0) {
            return Err(CouplingError::invalid(format!(
                "sampling interval must be positive and finite, got {}",
                self.sampling_interval
            )));
        }
        if self
            .phase1
            .iter()
            .chain(self.phase2.iter())
            .any(|x| !x.is_finite())
        {
            return Err(CouplingError::invalid("phase sequences contain non-finite values"));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.phase1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phase1.is_empty()
    }

    /// Total duration covered by the samples, in seconds.
    pub fn duration(&self) -> f64 {
        self.len() as f64 * self.sampling_interval
    }

    /// Wrapped phases live in [0, 2π); continuous trajectories grow past it.
    /// Only the first oscillator is inspected.
    pub fn is_wrapped(&self) -> bool {
        let max = self
            .phase1
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        max < WRAPPED_PHASE_LIMIT
    }

    /// Unwraps both sequences when they look wrapped, otherwise returns the pair unchanged.
    pub fn into_continuous(self) -> Self {
        if !self.is_wrapped() {
            return self;
        }
        Self {
            phase1: unwrap_phase(&self.phase1),
            phase2: unwrap_phase(&self.phase2),
            sampling_interval: self.sampling_interval,
        }
    }

    /// Borrow `len` samples of both phases starting at `start`.
    pub fn segment(&self, start: usize, len: usize) -> Option<(&[f64], &[f64])> {
        let end = start.checked_add(len)?;
        if end > self.len() {
            return None;
        }
        Some((&self.phase1[start..end], &self.phase2[start..end]))
    }
}

/// Midpoint phases and finite-difference velocities of one phase segment.
///
/// For `n` input samples there are `n - 1` increments; the velocities are the
/// regression targets, the midpoints are where the basis is evaluated.
#[derive(Debug, Clone)]
pub struct PhaseIncrements {
    pub midpoint1: Vec<f64>,
    pub midpoint2: Vec<f64>,
    /// `2 x (n - 1)`, one row per oscillator.
    pub velocities: DMatrix<f64>,
}

impl PhaseIncrements {
    pub fn from_segment(phase1: &[f64], phase2: &[f64], sampling_interval: f64) -> Result<Self> {
        if phase1.len() != phase2.len() {
            return Err(CouplingError::invalid(format!(
                "phase segments differ in length ({} vs {})",
                phase1.len(),
                phase2.len()
            )));
        }
        if phase1.len() < 2 {
            return Err(CouplingError::invalid("a phase segment needs at least two samples"));
        }
        if !(sampling_interval.is_finite() && sampling_interval > 0.0) {
            return Err(CouplingError::invalid(format!(
                "sampling interval must be positive and finite, got {}",
                sampling_interval
            )));
        }

        let n = phase1.len() - 1;
        let midpoint1 = phase1.windows(2).map(|w| (w[1] + w[0]) / 2.0).collect();
        let midpoint2 = phase2.windows(2).map(|w| (w[1] + w[0]) / 2.0).collect();

        let mut velocities = DMatrix::zeros(OSCILLATOR_COUNT, n);
        for (row, phase) in [phase1, phase2].into_iter().enumerate() {
            for (k, w) in phase.windows(2).enumerate() {
                velocities[(row, k)] = (w[1] - w[0]) / sampling_interval;
            }
        }

        Ok(Self {
            midpoint1,
            midpoint2,
            velocities,
        })
    }

    pub fn len(&self) -> usize {
        self.midpoint1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.midpoint1.is_empty()
    }
}
