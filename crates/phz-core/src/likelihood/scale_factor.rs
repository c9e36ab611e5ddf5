use super::LikelihoodError;
use crate::data_model::FluxErrorPair;

pub trait ScaleFactorCalculator: Send + Sync {
    fn scale_factor(
        &self,
        source: &[FluxErrorPair],
        model: &[FluxErrorPair],
    ) -> Result<f64, LikelihoodError>;
}

/// Weighted least-squares scale factor
/// `α = Σ(m·s/e²) / Σ(m²/e²)`, over filters whose observed error is positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleFactorFunctor;

impl ScaleFactorFunctor {
    pub fn compute(
        &self,
        source: &[FluxErrorPair],
        model: &[FluxErrorPair],
    ) -> Result<f64, LikelihoodError> {
        if source.len() != model.len() {
            return Err(LikelihoodError::LengthMismatch {
                observed: source.len(),
                model: model.len(),
            });
        }

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (observed, modeled) in source.iter().zip(model) {
            if observed.error <= 0.0 {
                continue;
            }
            let inverse_variance = 1.0 / (observed.error * observed.error);
            numerator += modeled.flux * observed.flux * inverse_variance;
            denominator += modeled.flux * modeled.flux * inverse_variance;
        }

        if denominator == 0.0 {
            return Err(LikelihoodError::DegenerateLeastSquares {
                filters: source.len(),
            });
        }
        Ok(numerator / denominator)
    }
}

impl ScaleFactorCalculator for ScaleFactorFunctor {
    fn scale_factor(
        &self,
        source: &[FluxErrorPair],
        model: &[FluxErrorPair],
    ) -> Result<f64, LikelihoodError> {
        self.compute(source, model)
    }
}
