//! A single noisy phase oscillator driven by its partner.

use crate::generative::constants::*;
use serde::{Deserialize, Serialize};

/// Parameters of one oscillator in a coupled pair.
///
/// The phase obeys `dφ/dt = ω + a·sin(φ_other − φ) + ξ(t)` with
/// `⟨ξ(t) ξ(t')⟩ = 2D·δ(t − t')`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseOscillatorParams {
    /// Natural frequency ω in rad/s
    pub natural_frequency: f64,

    /// Coupling amplitude `a` from the other oscillator
    pub coupling: f64,

    /// Noise intensity D
    pub noise_intensity: f64,
}

impl Default for PhaseOscillatorParams {
    fn default() -> Self {
        Self {
            natural_frequency: std::f64::consts::TAU, // 1 Hz
            coupling: 0.0,
            noise_intensity: 0.0,
        }
    }
}

impl PhaseOscillatorParams {
    /// Create parameters, clamping coupling and noise into supported ranges
    pub fn new(natural_frequency: f64, coupling: f64, noise_intensity: f64) -> Self {
        Self {
            natural_frequency,
            coupling: coupling.clamp(-MAX_COUPLING, MAX_COUPLING),
            noise_intensity: noise_intensity.clamp(MIN_NOISE_INTENSITY, MAX_NOISE_INTENSITY),
        }
    }

    /// Natural frequency given in Hz
    pub fn from_hz(frequency: f64, coupling: f64, noise_intensity: f64) -> Self {
        Self::new(std::f64::consts::TAU * frequency, coupling, noise_intensity)
    }

    pub fn is_valid(&self) -> bool {
        self.natural_frequency.is_finite()
            && self.coupling.is_finite()
            && self.noise_intensity.is_finite()
            && self.noise_intensity >= 0.0
    }

    /// Deterministic part of the phase velocity
    pub fn drift(&self, own: f64, other: f64) -> f64 {
        self.natural_frequency + self.coupling * (other - own).sin()
    }

    /// Standard deviation of the noise increment over one step of length `h`
    pub fn diffusion(&self, h: f64) -> f64 {
        (2.0 * self.noise_intensity * h).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default() {
        let params = PhaseOscillatorParams::default();
        assert!(params.is_valid());
        assert_eq!(params.coupling, 0.0);
        assert!((params.natural_frequency - std::f64::consts::TAU).abs() < 1e-12);
    }

    #[test]
    fn test_params_constraints() {
        let params = PhaseOscillatorParams::new(5.0, 1000.0, -1.0);
        assert_eq!(params.coupling, MAX_COUPLING);
        assert_eq!(params.noise_intensity, MIN_NOISE_INTENSITY);

        let params = PhaseOscillatorParams::new(5.0, -1000.0, 50.0);
        assert_eq!(params.coupling, -MAX_COUPLING);
        assert_eq!(params.noise_intensity, MAX_NOISE_INTENSITY);

        assert!(!PhaseOscillatorParams::new(f64::NAN, 0.0, 0.0).is_valid());
    }

    #[test]
    fn test_drift() {
        let params = PhaseOscillatorParams::new(2.0, 0.5, 0.0);
        // in phase: no pull
        assert!((params.drift(1.0, 1.0) - 2.0).abs() < 1e-12);
        // partner a quarter cycle ahead: full pull forward
        let ahead = params.drift(0.0, std::f64::consts::FRAC_PI_2);
        assert!((ahead - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_from_hz_and_diffusion() {
        let params = PhaseOscillatorParams::from_hz(2.0, 0.0, 0.5);
        assert!((params.natural_frequency - 4.0 * std::f64::consts::PI).abs() < 1e-12);
        assert!((params.diffusion(0.01) - 0.1).abs() < 1e-12);
    }
}
