use super::{
    ChiSquareFunctor, LikelihoodCalculator, LikelihoodError, ScaleFactorCalculator,
    ScaleFactorFunctor,
};
use crate::data_model::{FluxErrorPair, LikelihoodGrid, Photometry, PhotometryGrid};
use crate::grid::GridContainer;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scores one observed photometry against every cell of a photometry grid.
///
/// Each model is first scaled to the observation, then its likelihood is
/// evaluated at that scale. Models for which no scale factor exists get a
/// likelihood of zero.
#[derive(Clone)]
pub struct LikelihoodAlgorithm {
    scale_factor: Arc<dyn ScaleFactorCalculator>,
    likelihood: Arc<dyn LikelihoodCalculator>,
}

impl LikelihoodAlgorithm {
    pub fn new(
        scale_factor: Arc<dyn ScaleFactorCalculator>,
        likelihood: Arc<dyn LikelihoodCalculator>,
    ) -> Self {
        Self {
            scale_factor,
            likelihood,
        }
    }

    pub fn scale_factor(
        &self,
        source: &[FluxErrorPair],
        model: &[FluxErrorPair],
    ) -> Result<f64, LikelihoodError> {
        self.scale_factor.scale_factor(source, model)
    }

    /// Likelihood grid over the same axes as `grid`. Every model cell must
    /// carry the source's filters in the source's order.
    pub fn compute(
        &self,
        source: &Photometry,
        grid: &PhotometryGrid,
    ) -> Result<LikelihoodGrid, LikelihoodError> {
        if grid.is_empty() {
            return Err(LikelihoodError::EmptyPhotometryGrid);
        }
        if let Some(cell_index) = grid
            .cells()
            .iter()
            .position(|model| !model.has_same_filters(source))
        {
            return Err(LikelihoodError::FilterMismatch { cell_index });
        }

        let mut likelihood_grid = GridContainer::<Vec<f64>>::new(grid.axes().to_vec())?;
        let degenerate = AtomicUsize::new(0);
        likelihood_grid
            .cells_mut()
            .par_iter_mut()
            .zip(grid.cells().par_iter())
            .try_for_each(|(likelihood, model)| {
                *likelihood = match self.scale_factor.scale_factor(source.values(), model.values())
                {
                    Ok(scale) => {
                        self.likelihood
                            .likelihood(source.values(), model.values(), scale)?
                    }
                    Err(LikelihoodError::DegenerateLeastSquares { .. }) => {
                        degenerate.fetch_add(1, Ordering::Relaxed);
                        0.0
                    }
                    Err(error) => return Err(error),
                };
                Ok(())
            })?;

        let degenerate = degenerate.into_inner();
        if degenerate > 0 {
            tracing::debug!(
                degenerate,
                models = grid.size(),
                "models without a defined scale factor were given zero likelihood"
            );
        }
        Ok(likelihood_grid)
    }
}

impl Default for LikelihoodAlgorithm {
    fn default() -> Self {
        Self::new(Arc::new(ScaleFactorFunctor), Arc::new(ChiSquareFunctor))
    }
}

impl std::fmt::Debug for LikelihoodAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LikelihoodAlgorithm").finish_non_exhaustive()
    }
}
