//! Dynamical Bayesian inference of the coupling between two phase oscillators.
//!
//! A [`PhasePair`] is cut into windows; each window's Fourier coupling
//! coefficients are estimated with an iterative Bayesian update whose
//! posterior, diffused, becomes the next window's prior. The resulting
//! [`CoefficientTimeSeries`] can be reduced to coupling strengths and
//! directionality or to a coupling surface.

pub mod analysis;
pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod generative;
pub mod inference;
pub mod linalg;
pub mod phase;

pub use analysis::{
    CouplingSummarizer, CouplingSummary, CouplingSurface, CouplingSurfaceReconstructor,
};
pub use batch::estimate_batch;
pub use config::{InferenceConfig, SolverConfig, WindowSpec};
pub use error::{CouplingError, Result};
pub use generative::{CoupledPhaseModel, PhaseOscillatorParams};
pub use inference::{
    CoefficientTimeSeries, CouplingCoefficients, CouplingEstimationPipeline, Oscillator,
    WindowEstimate, WindowProgress,
};
pub use linalg::{LinearSolver, LuSolver};
pub use phase::PhasePair;
