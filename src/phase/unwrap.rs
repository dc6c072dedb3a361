use crate::constants::TWO_PI;
use std::f64::consts::PI;

/// Unwrap a phase sequence into a continuous trajectory.
///
/// Consecutive jumps of at least π are replaced by their 2π-equivalent in
/// [-π, π]; a jump of exactly +π is kept positive.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let Some(&first) = phase.first() else {
        return out;
    };
    out.push(first);

    let mut correction = 0.0;
    for w in phase.windows(2) {
        let delta = w[1] - w[0];
        if delta.abs() >= PI {
            let mut wrapped = (delta + PI).rem_euclid(TWO_PI) - PI;
            if wrapped == -PI && delta > 0.0 {
                wrapped = PI;
            }
            correction += wrapped - delta;
        }
        out.push(w[1] + correction);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_empty_and_single() {
        assert!(unwrap_phase(&[]).is_empty());
        assert_eq!(unwrap_phase(&[1.5]), vec![1.5]);
    }

    #[test]
    fn test_unwrap_no_discontinuity() {
        let input = [0.0, 0.5, 1.0, 1.5];
        assert_eq!(unwrap_phase(&input), input.to_vec());
    }

    #[test]
    fn test_unwrap_recovers_ramp() {
        let ramp: Vec<f64> = (0..200).map(|k| 0.1 * k as f64).collect();
        let wrapped: Vec<f64> = ramp.iter().map(|x| x.rem_euclid(TWO_PI)).collect();

        let unwrapped = unwrap_phase(&wrapped);
        for (a, b) in unwrapped.iter().zip(ramp.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unwrap_negative_direction() {
        let ramp: Vec<f64> = (0..100).map(|k| -0.2 * k as f64).collect();
        let wrapped: Vec<f64> = ramp.iter().map(|x| x.rem_euclid(TWO_PI)).collect();

        let unwrapped = unwrap_phase(&wrapped);
        // Offset by a whole turn at most, but the trajectory itself is continuous.
        let offset = unwrapped[0] - ramp[0];
        for (a, b) in unwrapped.iter().zip(ramp.iter()) {
            assert!((a - b - offset).abs() < 1e-9);
        }
    }
}
