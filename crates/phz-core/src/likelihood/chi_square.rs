use super::LikelihoodError;
use crate::data_model::FluxErrorPair;

pub trait LikelihoodCalculator: Send + Sync {
    fn likelihood(
        &self,
        source: &[FluxErrorPair],
        model: &[FluxErrorPair],
        scale: f64,
    ) -> Result<f64, LikelihoodError>;
}

/// Gaussian likelihood `exp(-χ²/2)` with `χ² = Σ((α·m − s)/e)²`.
///
/// A zero error with a non-zero residual makes χ² infinite and the
/// likelihood zero. A zero error with an exact match, or a negative error,
/// contributes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChiSquareFunctor;

impl ChiSquareFunctor {
    pub fn compute(
        &self,
        source: &[FluxErrorPair],
        model: &[FluxErrorPair],
        scale: f64,
    ) -> Result<f64, LikelihoodError> {
        if source.len() != model.len() {
            return Err(LikelihoodError::LengthMismatch {
                observed: source.len(),
                model: model.len(),
            });
        }

        let mut chi_square = 0.0;
        for (observed, modeled) in source.iter().zip(model) {
            let residual = scale * modeled.flux - observed.flux;
            if observed.error > 0.0 {
                let normalized = residual / observed.error;
                chi_square += normalized * normalized;
            } else if observed.error == 0.0 && residual != 0.0 {
                return Ok(0.0);
            }
        }
        Ok((-0.5 * chi_square).exp())
    }
}

impl LikelihoodCalculator for ChiSquareFunctor {
    fn likelihood(
        &self,
        source: &[FluxErrorPair],
        model: &[FluxErrorPair],
        scale: f64,
    ) -> Result<f64, LikelihoodError> {
        self.compute(source, model, scale)
    }
}

/// Recovers χ² from a likelihood produced by [`ChiSquareFunctor`].
pub fn chi_square_from_likelihood(likelihood: f64) -> f64 {
    -2.0 * likelihood.ln()
}
