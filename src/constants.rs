use std::f64::consts::PI;

pub const TWO_PI: f64 = 2.0 * PI;

/// Number of coupled oscillators in a pair.
pub const OSCILLATOR_COUNT: usize = 2;

/// Phases whose maximum stays below this are treated as wrapped to [0, 2π).
pub const WRAPPED_PHASE_LIMIT: f64 = TWO_PI + 0.1;

/// Grid spacing (radians) used when drawing coupling surfaces.
pub const SURFACE_GRID_STEP: f64 = 0.13;

pub const DEFAULT_WINDOW_LENGTH: usize = 1000;
pub const DEFAULT_OVERLAP_RATIO: f64 = 1.0;
pub const DEFAULT_PROPAGATION_RATE: f64 = 0.2;
pub const DEFAULT_HARMONIC_ORDER: usize = 2;
pub const DEFAULT_MAX_ITERATIONS: usize = 500;
pub const DEFAULT_CONVERGENCE_TOLERANCE: f64 = 1e-5;

/// Smallest |pivot| / largest |pivot| ratio still treated as invertible.
pub const DEFAULT_SINGULAR_TOLERANCE: f64 = 1e-12;
