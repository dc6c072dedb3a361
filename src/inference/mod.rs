//! Windowed dynamical Bayesian inference of phase coupling.
//!
//! Data flows one way: phases → [`basis`] → [`estimator`] per window →
//! [`propagation`] into the next window's prior, driven by [`pipeline`].

pub mod basis;
pub mod estimator;
pub mod pipeline;
pub mod posterior;
pub mod propagation;

pub use basis::{basis_len, basis_terms, BasisTerm, FourierBasis, Trig};
pub use estimator::{WindowEstimator, WindowFit};
pub use pipeline::{
    CoefficientTimeSeries, CouplingEstimationPipeline, WindowEstimate, WindowProgress,
};
pub use posterior::{CouplingCoefficients, Oscillator, PosteriorState, PrecisionMatrix};
pub use propagation::PriorPropagator;
