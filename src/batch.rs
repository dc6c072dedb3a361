//! Parallel analysis of independent phase pairs.

use crate::error::Result;
use crate::inference::{CoefficientTimeSeries, CouplingEstimationPipeline};
use crate::linalg::LinearSolver;
use crate::phase::PhasePair;
use rayon::prelude::*;
use tracing::info;

/// Runs `pipeline` over every pair on the rayon pool.
///
/// Each pair gets its own prior chain; one failure does not affect the
/// others. Results come back in input order.
pub fn estimate_batch<S: LinearSolver>(
    pipeline: &CouplingEstimationPipeline<S>,
    pairs: &[PhasePair],
) -> Vec<Result<CoefficientTimeSeries>> {
    info!(pairs = pairs.len(), "estimating coupling for batch");
    pairs.par_iter().map(|pair| pipeline.run(pair)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowSpec;
    use crate::error::CouplingError;
    use crate::generative::{CoupledPhaseModel, PhaseOscillatorParams};

    fn spec() -> WindowSpec {
        WindowSpec {
            window_length: 300,
            overlap_ratio: 1.0,
            harmonic_order: 1,
            ..WindowSpec::default()
        }
    }

    fn pair(seed: u64) -> PhasePair {
        CoupledPhaseModel::new(
            PhaseOscillatorParams::new(7.0, 0.5, 0.01),
            PhaseOscillatorParams::new(11.0, 0.0, 0.01),
        )
        .simulate(900, 0.01, seed)
        .unwrap()
    }

    #[test]
    fn test_batch_matches_sequential_runs() {
        let pipeline = CouplingEstimationPipeline::new(spec()).unwrap();
        let pairs: Vec<PhasePair> = (0..4).map(pair).collect();

        let batch = estimate_batch(&pipeline, &pairs);
        assert_eq!(batch.len(), pairs.len());
        for (result, pair) in batch.into_iter().zip(pairs.iter()) {
            assert_eq!(result.unwrap(), pipeline.run(pair).unwrap());
        }
    }

    #[test]
    fn test_failures_stay_isolated() {
        let pipeline = CouplingEstimationPipeline::new(spec()).unwrap();
        let short = PhasePair::new(vec![0.0, 1.0], vec![0.0, 1.0], 0.01).unwrap();
        let pairs = vec![pair(1), short, pair(2)];

        let batch = estimate_batch(&pipeline, &pairs);
        assert!(batch[0].is_ok());
        assert!(matches!(
            batch[1],
            Err(CouplingError::InsufficientData {
                available: 2,
                required: 300
            })
        ));
        assert!(batch[2].is_ok());
    }

    #[test]
    fn test_empty_batch() {
        let pipeline = CouplingEstimationPipeline::new(spec()).unwrap();
        assert!(estimate_batch(&pipeline, &[]).is_empty());
    }
}
