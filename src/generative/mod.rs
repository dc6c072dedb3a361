//! Synthetic coupled phase oscillators.
//!
//! Produces phase pairs with a known coupling so the estimator can be checked
//! against ground truth, and backs the CLI `simulate` command.

pub mod coupled_model;
pub mod phase_oscillator;

pub use coupled_model::CoupledPhaseModel;
pub use phase_oscillator::PhaseOscillatorParams;

/// Core constants for the generator
pub mod constants {
    /// Default integration step (10ms)
    pub const DEFAULT_SAMPLING_INTERVAL: f64 = 0.01;

    /// Largest coupling amplitude accepted, in rad/s
    pub const MAX_COUPLING: f64 = 100.0;

    /// Minimum noise intensity (deterministic dynamics)
    pub const MIN_NOISE_INTENSITY: f64 = 0.0;

    /// Maximum noise intensity
    pub const MAX_NOISE_INTENSITY: f64 = 10.0;
}
