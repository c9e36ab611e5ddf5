use super::{LikelihoodAlgorithm, LikelihoodError, Marginalization, normalize_pdf};
use crate::data_model::{
    FluxErrorPair, PdfGrid, PhotometricCorrectionMap, Photometry, PhotometryGrid,
};
use crate::dataset::QualifiedName;
use crate::grid::GridCoordinates;
use std::sync::Arc;

/// Outcome of fitting one source against the photometry grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePhzResult {
    /// Coordinates of the first cell holding the largest likelihood.
    pub best_model: GridCoordinates,
    pub best_likelihood: f64,
    /// `None` when the best model admits no least-squares scale factor.
    pub best_scale_factor: Option<f64>,
    /// Marginalized PDF, normalized to unit integral when possible.
    pub pdf: PdfGrid,
}

/// Photometric-redshift estimation for a single source.
///
/// The observed fluxes are reordered to the grid's filter order and
/// multiplied by their per-filter correction before the likelihood grid is
/// computed. Filters the source carries but the grid does not are ignored.
#[derive(Clone)]
pub struct SourcePhzFunctor<'g> {
    grid: &'g PhotometryGrid,
    filter_names: Arc<Vec<String>>,
    corrections: Vec<f64>,
    marginalization: Arc<dyn Marginalization>,
    likelihood: LikelihoodAlgorithm,
}

impl<'g> SourcePhzFunctor<'g> {
    pub fn new(
        correction_map: &PhotometricCorrectionMap,
        grid: &'g PhotometryGrid,
        marginalization: Arc<dyn Marginalization>,
    ) -> Result<Self, LikelihoodError> {
        let Some(first) = grid.cells().first() else {
            return Err(LikelihoodError::EmptyPhotometryGrid);
        };
        let filter_names = Arc::clone(first.filter_names());
        let corrections = filter_names
            .iter()
            .map(|filter| {
                correction_map
                    .get(&QualifiedName::parse(filter))
                    .copied()
                    .ok_or_else(|| LikelihoodError::MissingCorrection {
                        filter: filter.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            grid,
            filter_names,
            corrections,
            marginalization,
            likelihood: LikelihoodAlgorithm::default(),
        })
    }

    pub fn with_likelihood_algorithm(mut self, likelihood: LikelihoodAlgorithm) -> Self {
        self.likelihood = likelihood;
        self
    }

    pub fn grid(&self) -> &'g PhotometryGrid {
        self.grid
    }

    pub fn filter_names(&self) -> &Arc<Vec<String>> {
        &self.filter_names
    }

    /// Source photometry in grid filter order with corrections applied.
    pub fn corrected_photometry(&self, source: &Photometry) -> Result<Photometry, LikelihoodError> {
        let values = self
            .filter_names
            .iter()
            .zip(&self.corrections)
            .map(|(filter, correction)| {
                source
                    .find(filter)
                    .map(|pair| FluxErrorPair::new(pair.flux * correction, pair.error))
                    .ok_or_else(|| LikelihoodError::MissingSourceFilter {
                        filter: filter.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Photometry::new(Arc::clone(&self.filter_names), values)?)
    }

    pub fn compute(&self, source: &Photometry) -> Result<SourcePhzResult, LikelihoodError> {
        let corrected = self.corrected_photometry(source)?;
        let likelihood = self.likelihood.compute(&corrected, self.grid)?;

        let (best_index, best_likelihood) = likelihood.cells().iter().enumerate().fold(
            (0, f64::NEG_INFINITY),
            |(best_index, best), (index, value)| {
                if *value > best {
                    (index, *value)
                } else {
                    (best_index, best)
                }
            },
        );
        let best_model = likelihood
            .coordinates_of(best_index)
            .ok_or(LikelihoodError::EmptyPhotometryGrid)?;
        let best_scale_factor = self
            .likelihood
            .scale_factor(corrected.values(), self.grid.cells()[best_index].values())
            .ok();

        let mut pdf = self.marginalization.marginalize(&likelihood)?;
        normalize_pdf(&mut pdf);

        Ok(SourcePhzResult {
            best_model,
            best_likelihood,
            best_scale_factor,
            pdf,
        })
    }
}

impl std::fmt::Debug for SourcePhzFunctor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourcePhzFunctor")
            .field("filter_names", &self.filter_names)
            .field("corrections", &self.corrections)
            .finish_non_exhaustive()
    }
}
