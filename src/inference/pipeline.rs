use super::basis::FourierBasis;
use super::estimator::WindowEstimator;
use super::posterior::{CouplingCoefficients, PosteriorState};
use super::propagation::PriorPropagator;
use crate::config::WindowSpec;
use crate::error::{CouplingError, Result};
use crate::linalg::{LinearSolver, LuSolver};
use crate::phase::{PhaseIncrements, PhasePair};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::ControlFlow;
use tracing::{debug, info};

/// Estimate for one analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEstimate {
    /// Window centre in seconds.
    pub center_time: f64,
    pub coefficients: CouplingCoefficients,
    /// 2x2 residual noise covariance.
    pub noise: DMatrix<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Chronological sequence of window estimates from one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTimeSeries {
    pub spec: WindowSpec,
    pub sampling_interval: f64,
    pub windows: Vec<WindowEstimate>,
}

impl CoefficientTimeSeries {
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn harmonic_order(&self) -> usize {
        self.spec.harmonic_order
    }

    pub fn center_times(&self) -> Vec<f64> {
        self.windows.iter().map(|w| w.center_time).collect()
    }

    pub fn get(&self, index: usize) -> Option<&WindowEstimate> {
        self.windows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowEstimate> {
        self.windows.iter()
    }
}

/// Reported to the observer after every finished window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowProgress {
    pub index: usize,
    pub total: usize,
    pub center_time: f64,
}

/// Slides a window over the phase pair and chains the per-window posteriors.
pub struct CouplingEstimationPipeline<S: LinearSolver = LuSolver> {
    spec: WindowSpec,
    solver: S,
}

impl CouplingEstimationPipeline<LuSolver> {
    pub fn new(spec: WindowSpec) -> Result<Self> {
        Self::with_solver(spec, LuSolver::default())
    }
}

impl<S: LinearSolver> CouplingEstimationPipeline<S> {
    pub fn with_solver(spec: WindowSpec, solver: S) -> Result<Self> {
        spec.validate()?;
        Ok(Self { spec, solver })
    }

    pub fn spec(&self) -> &WindowSpec {
        &self.spec
    }

    pub fn run(&self, pair: &PhasePair) -> Result<CoefficientTimeSeries> {
        self.run_with_observer(pair, |_| ControlFlow::Continue(()))
    }

    /// Like [`run`](Self::run), calling `observer` after each window.
    ///
    /// Returning `ControlFlow::Break` stops the run before the next window
    /// with [`CouplingError::Cancelled`]; a window in progress always finishes.
    pub fn run_with_observer<F>(
        &self,
        pair: &PhasePair,
        mut observer: F,
    ) -> Result<CoefficientTimeSeries>
    where
        F: FnMut(&WindowProgress) -> ControlFlow<()>,
    {
        pair.validate()?;
        let pair = if pair.is_wrapped() {
            Cow::Owned(pair.clone().into_continuous())
        } else {
            Cow::Borrowed(pair)
        };

        let spec = &self.spec;
        let window_length = spec.window_length;
        if pair.len() < window_length {
            return Err(CouplingError::InsufficientData {
                available: pair.len(),
                required: window_length,
            });
        }
        let basis_len = spec.basis_len();
        if window_length - 1 < basis_len {
            return Err(CouplingError::InsufficientData {
                available: window_length - 1,
                required: basis_len,
            });
        }

        let h = pair.sampling_interval;
        let step = spec.step();
        let total = spec.window_count(pair.len());
        let rate = spec.propagation_rate * spec.window_duration(h);

        info!(
            samples = pair.len(),
            windows = total,
            window_length,
            step,
            harmonic_order = spec.harmonic_order,
            "starting coupling estimation"
        );

        let estimator = WindowEstimator::new(
            &self.solver,
            spec.max_iterations,
            spec.convergence_tolerance,
        );
        let propagator = PriorPropagator::new(&self.solver);

        let mut prior = PosteriorState::uninformative(basis_len);
        let mut windows = Vec::with_capacity(total);

        for index in 0..total {
            let start = index * step;
            let (phi1, phi2) = pair.segment(start, window_length).ok_or_else(|| {
                CouplingError::invalid(format!("window {} runs past the end of the data", index))
            })?;

            let increments = PhaseIncrements::from_segment(phi1, phi2, h)?;
            let basis = FourierBasis::build(&increments, spec.harmonic_order)?;
            let fit = estimator.estimate(&basis, &increments.velocities, &prior, h)?;

            let center_time = (window_length as f64 / 2.0 + start as f64) * h;
            debug!(
                window = index,
                center_time,
                iterations = fit.iterations,
                converged = fit.converged,
                "window estimated"
            );

            windows.push(WindowEstimate {
                center_time,
                coefficients: fit.posterior.coefficients.clone(),
                noise: fit.noise,
                iterations: fit.iterations,
                converged: fit.converged,
            });
            prior = propagator.propagate(fit.posterior, rate)?;

            let progress = WindowProgress {
                index,
                total,
                center_time,
            };
            if observer(&progress).is_break() && index + 1 < total {
                info!(completed = index + 1, total, "coupling estimation cancelled");
                return Err(CouplingError::Cancelled {
                    completed: index + 1,
                });
            }
        }

        info!(windows = windows.len(), "coupling estimation finished");
        Ok(CoefficientTimeSeries {
            spec: spec.clone(),
            sampling_interval: h,
            windows,
        })
    }
}
