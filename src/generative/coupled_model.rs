//! Two phase oscillators coupled through the sine of their phase difference.

use crate::error::{CouplingError, Result};
use crate::generative::PhaseOscillatorParams;
use crate::phase::PhasePair;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stochastic coupled pair integrated with Euler–Maruyama.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoupledPhaseModel {
    pub first: PhaseOscillatorParams,
    pub second: PhaseOscillatorParams,
    /// Phases at the first sample
    pub initial_phases: (f64, f64),
}

impl CoupledPhaseModel {
    pub fn new(first: PhaseOscillatorParams, second: PhaseOscillatorParams) -> Self {
        Self {
            first,
            second,
            initial_phases: (0.0, 0.0),
        }
    }

    pub fn with_initial_phases(mut self, phase1: f64, phase2: f64) -> Self {
        self.initial_phases = (phase1, phase2);
        self
    }

    /// Integrates `samples` points spaced `sampling_interval` apart.
    ///
    /// The returned phases are continuous (not wrapped). The same seed always
    /// yields the same trajectory.
    pub fn simulate(&self, samples: usize, sampling_interval: f64, seed: u64) -> Result<PhasePair> {
        if samples == 0 {
            return Err(CouplingError::invalid("cannot simulate zero samples"));
        }
        if !(sampling_interval.is_finite() && sampling_interval > 0.0) {
            return Err(CouplingError::invalid(format!(
                "sampling interval must be positive and finite, got {}",
                sampling_interval
            )));
        }
        if !(self.first.is_valid() && self.second.is_valid()) {
            return Err(CouplingError::invalid("oscillator parameters must be finite"));
        }
        let (start1, start2) = self.initial_phases;
        if !(start1.is_finite() && start2.is_finite()) {
            return Err(CouplingError::invalid("initial phases must be finite"));
        }

        let h = sampling_interval;
        let sigma1 = self.first.diffusion(h);
        let sigma2 = self.second.diffusion(h);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut phase1 = Vec::with_capacity(samples);
        let mut phase2 = Vec::with_capacity(samples);
        let (mut p1, mut p2) = (start1, start2);
        phase1.push(p1);
        phase2.push(p2);

        for _ in 1..samples {
            let n1: f64 = rng.sample(StandardNormal);
            let n2: f64 = rng.sample(StandardNormal);
            let next1 = p1 + h * self.first.drift(p1, p2) + sigma1 * n1;
            let next2 = p2 + h * self.second.drift(p2, p1) + sigma2 * n2;
            p1 = next1;
            p2 = next2;
            phase1.push(p1);
            phase2.push(p2);
        }

        debug!(samples, sampling_interval, seed, "simulated coupled phase pair");
        PhasePair::new(phase1, phase2, h)
    }
}
