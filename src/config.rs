use crate::constants::*;
use crate::error::{CouplingError, Result};
use crate::inference::basis::basis_len;
use crate::linalg::LuSolver;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration, loadable from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub window: WindowSpec,
    pub solver: SolverConfig,
}

/// Windowing and iteration knobs for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSpec {
    pub window_length: usize,          // samples per window
    pub overlap_ratio: f64,            // step = overlap_ratio * window_length, in (0, 1]
    pub propagation_rate: f64,         // diffusion per second of window, >= 0
    pub harmonic_order: usize,         // Fourier harmonics per phase, >= 1
    pub max_iterations: usize,         // per-window fixed-point loop bound
    pub convergence_tolerance: f64,    // summed squared relative change
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub singular_tolerance: f64,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            window_length: DEFAULT_WINDOW_LENGTH,
            overlap_ratio: DEFAULT_OVERLAP_RATIO,
            propagation_rate: DEFAULT_PROPAGATION_RATE,
            harmonic_order: DEFAULT_HARMONIC_ORDER,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_tolerance: DEFAULT_CONVERGENCE_TOLERANCE,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            singular_tolerance: DEFAULT_SINGULAR_TOLERANCE,
        }
    }
}

impl WindowSpec {
    /// Default spec with the window given as a duration instead of a sample count.
    pub fn with_window_seconds(seconds: f64, sampling_interval: f64) -> Result<Self> {
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(CouplingError::invalid(format!(
                "window duration must be positive, got {}",
                seconds
            )));
        }
        if !(sampling_interval.is_finite() && sampling_interval > 0.0) {
            return Err(CouplingError::invalid(format!(
                "sampling interval must be positive, got {}",
                sampling_interval
            )));
        }
        Ok(Self {
            window_length: (seconds / sampling_interval).round() as usize,
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_length < 2 {
            return Err(CouplingError::invalid(format!(
                "window_length must be at least 2 samples, got {}",
                self.window_length
            )));
        }
        if !(self.overlap_ratio > 0.0 && self.overlap_ratio <= 1.0) {
            return Err(CouplingError::invalid(format!(
                "overlap_ratio must lie in (0, 1], got {}",
                self.overlap_ratio
            )));
        }
        if self.step() == 0 {
            return Err(CouplingError::invalid(format!(
                "overlap_ratio {} gives a zero step for a {}-sample window",
                self.overlap_ratio, self.window_length
            )));
        }
        if !(self.propagation_rate.is_finite() && self.propagation_rate >= 0.0) {
            return Err(CouplingError::invalid(format!(
                "propagation_rate must be finite and non-negative, got {}",
                self.propagation_rate
            )));
        }
        if self.harmonic_order < 1 {
            return Err(CouplingError::invalid("harmonic_order must be at least 1"));
        }
        if self.max_iterations < 1 {
            return Err(CouplingError::invalid("max_iterations must be at least 1"));
        }
        if !(self.convergence_tolerance.is_finite() && self.convergence_tolerance > 0.0) {
            return Err(CouplingError::invalid(format!(
                "convergence_tolerance must be positive, got {}",
                self.convergence_tolerance
            )));
        }
        Ok(())
    }

    /// Samples between consecutive window starts.
    pub fn step(&self) -> usize {
        (self.overlap_ratio * self.window_length as f64).floor() as usize
    }

    pub fn window_duration(&self, sampling_interval: f64) -> f64 {
        self.window_length as f64 * sampling_interval
    }

    /// Number of basis functions per oscillator.
    pub fn basis_len(&self) -> usize {
        basis_len(self.harmonic_order)
    }

    /// Number of full windows that fit in `samples`.
    pub fn window_count(&self, samples: usize) -> usize {
        let step = self.step();
        if samples < self.window_length || step == 0 {
            return 0;
        }
        (samples - self.window_length) / step + 1
    }
}

impl SolverConfig {
    pub fn build(&self) -> LuSolver {
        LuSolver::new(self.singular_tolerance)
    }
}

impl InferenceConfig {
    /// Reads a TOML config, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        if !(self.solver.singular_tolerance.is_finite() && self.solver.singular_tolerance >= 0.0) {
            return Err(CouplingError::invalid(format!(
                "singular_tolerance must be finite and non-negative, got {}",
                self.solver.singular_tolerance
            )));
        }
        Ok(())
    }
}
