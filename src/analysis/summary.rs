use crate::error::{CouplingError, Result};
use crate::inference::basis::{basis_terms, BasisTerm};
use crate::inference::pipeline::CoefficientTimeSeries;
use crate::inference::posterior::{CouplingCoefficients, Oscillator};
use serde::{Deserialize, Serialize};

/// Coupling strengths and directionality of one coefficient set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CouplingSummary {
    /// Influence of oscillator 2 on oscillator 1.
    pub strength1: f64,
    /// Influence of oscillator 1 on oscillator 2.
    pub strength2: f64,
    /// `(strength2 - strength1) / (strength1 + strength2)`; positive when 1 drives 2.
    pub directionality: f64,
}

/// Reduces a coefficient vector to how strongly each oscillator is driven by the other.
///
/// For oscillator 1 only terms that vary with φ2 count (pure φ2 harmonics and
/// the mixed terms), and symmetrically for oscillator 2. The constant and the
/// oscillator's own harmonics describe its autonomous dynamics, not coupling.
#[derive(Debug, Clone)]
pub struct CouplingSummarizer {
    terms: Vec<BasisTerm>,
}

impl CouplingSummarizer {
    pub fn new(order: usize) -> Result<Self> {
        if order < 1 {
            return Err(CouplingError::invalid("harmonic order must be at least 1"));
        }
        Ok(Self {
            terms: basis_terms(order),
        })
    }

    pub fn summarize(&self, coefficients: &CouplingCoefficients) -> Result<CouplingSummary> {
        if coefficients.basis_len() != self.terms.len() {
            return Err(CouplingError::invalid(format!(
                "expected {} coefficients per oscillator, got {}",
                self.terms.len(),
                coefficients.basis_len()
            )));
        }

        let strength1 = self.driven_norm(coefficients, Oscillator::First);
        let strength2 = self.driven_norm(coefficients, Oscillator::Second);
        let total = strength1 + strength2;
        if total == 0.0 {
            return Err(CouplingError::invalid(
                "both coupling strengths are zero, directionality is undefined",
            ));
        }

        Ok(CouplingSummary {
            strength1,
            strength2,
            directionality: (strength2 - strength1) / total,
        })
    }

    /// One summary per window, in chronological order.
    ///
    /// Fails as a whole if any window cannot be summarized.
    pub fn summarize_series(
        &self,
        series: &CoefficientTimeSeries,
    ) -> Result<Vec<CouplingSummary>> {
        series
            .iter()
            .map(|window| self.summarize(&window.coefficients))
            .collect()
    }

    fn driven_norm(&self, coefficients: &CouplingCoefficients, osc: Oscillator) -> f64 {
        let driver = osc.other();
        self.terms
            .iter()
            .zip(coefficients.get(osc).iter())
            .filter(|(term, _)| term.depends_on(driver))
            .map(|(_, c)| c * c)
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowSpec;
    use crate::inference::pipeline::WindowEstimate;
    use nalgebra::{DMatrix, DVector};

    fn coefficients(first: Vec<f64>, second: Vec<f64>) -> CouplingCoefficients {
        CouplingCoefficients::new(DVector::from_vec(first), DVector::from_vec(second)).unwrap()
    }

    /// Series whose window `i` has oscillator 2 driven by `sin(φ1)` with weight `drive[i]`.
    fn series(drive: &[f64]) -> CoefficientTimeSeries {
        let windows = drive
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let mut second = vec![0.0; 9];
                second[1] = d;
                let mut first = vec![0.0; 9];
                first[3] = 1.0;
                WindowEstimate {
                    center_time: 5.0 + i as f64 * 10.0,
                    coefficients: coefficients(first, second),
                    noise: DMatrix::identity(2, 2),
                    iterations: 1,
                    converged: true,
                }
            })
            .collect();
        CoefficientTimeSeries {
            spec: WindowSpec {
                harmonic_order: 1,
                ..WindowSpec::default()
            },
            sampling_interval: 0.01,
            windows,
        }
    }

    #[test]
    fn test_only_driven_terms_count() {
        // constant and own-phase rows are ignored
        let c = coefficients(
            vec![7.0, 5.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![11.0, 0.0, 0.0, 4.0, 4.0, 0.0, 0.0, 0.0, 0.0],
        );
        let result = CouplingSummarizer::new(1).unwrap().summarize(&c);
        assert!(matches!(result, Err(CouplingError::InvalidInput(_))));
    }

    #[test]
    fn test_strengths_and_direction() {
        // oscillator 1: sin(φ2) = 3, cross sin(φ1 - φ2) = 4 -> 5
        // oscillator 2: own harmonics ignored, cross cos(φ1 - φ2) = 5
        let c = coefficients(
            vec![1.0, 9.0, 9.0, 3.0, 0.0, 0.0, 0.0, 4.0, 0.0],
            vec![1.0, 0.0, 0.0, 9.0, 9.0, 0.0, 0.0, 0.0, 5.0],
        );
        let summary = CouplingSummarizer::new(1).unwrap().summarize(&c).unwrap();
        assert!((summary.strength1 - 5.0).abs() < 1e-12);
        assert!((summary.strength2 - 5.0).abs() < 1e-12);
        assert_eq!(summary.directionality, 0.0);
    }

    #[test]
    fn test_one_way_coupling() {
        let c = coefficients(
            vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        );
        let summary = CouplingSummarizer::new(1).unwrap().summarize(&c).unwrap();
        assert_eq!(summary.strength1, 0.0);
        assert_eq!(summary.strength2, 2.0);
        assert_eq!(summary.directionality, 1.0);
    }

    #[test]
    fn test_directionality_bounds() {
        let summarizer = CouplingSummarizer::new(2).unwrap();
        for seed in 0..50u32 {
            let gen = |k: usize| ((seed as f64 + 1.0) * 0.37 * (k as f64 + 0.5)).sin();
            let c = coefficients((0..25).map(gen).collect(), (25..50).map(gen).collect());
            let summary = summarizer.summarize(&c).unwrap();
            assert!((-1.0..=1.0).contains(&summary.directionality));
            assert!(summary.strength1 >= 0.0 && summary.strength2 >= 0.0);
        }
    }

    #[test]
    fn test_wrong_length() {
        let c = coefficients(vec![1.0; 9], vec![1.0; 9]);
        assert!(matches!(
            CouplingSummarizer::new(2).unwrap().summarize(&c),
            Err(CouplingError::InvalidInput(_))
        ));
        assert!(CouplingSummarizer::new(0).is_err());
    }

    #[test]
    fn test_series_summaries_follow_window_order() {
        let series = series(&[1.0, 3.0, 0.0]);
        let summarizer = CouplingSummarizer::new(series.harmonic_order()).unwrap();
        let summaries = summarizer.summarize_series(&series).unwrap();

        assert_eq!(summaries.len(), series.len());
        let strengths: Vec<f64> = summaries.iter().map(|s| s.strength2).collect();
        assert_eq!(strengths, vec![1.0, 3.0, 0.0]);
        assert_eq!(summaries[0].directionality, 0.0);
        assert!((summaries[1].directionality - 0.5).abs() < 1e-12);
        assert_eq!(summaries[2].directionality, -1.0);
    }

    #[test]
    fn test_series_fails_on_uncoupled_window() {
        let mut series = series(&[1.0, 2.0, 3.0]);
        series.windows[1].coefficients = CouplingCoefficients::zeros(9);

        let summarizer = CouplingSummarizer::new(1).unwrap();
        assert!(matches!(
            summarizer.summarize_series(&series),
            Err(CouplingError::InvalidInput(_))
        ));
    }
}
