use super::{CorrectionReducer, CorrectionSample, PhotometricCorrectionError, StopCriteria};
use crate::data_model::{FluxErrorPair, PhotometricCorrectionMap, PhotometryGrid};
use crate::dataset::QualifiedName;
use crate::likelihood::{
    CatalogHandler, CatalogSource, LikelihoodAlgorithm, LikelihoodError,
    MaxMarginalizationFunctor, SourcePhzFunctor,
};
use std::sync::Arc;

/// Receives the iteration number and the corrections it produced.
pub trait CorrectionProgressListener {
    fn notify(&self, iteration: usize, corrections: &PhotometricCorrectionMap);
}

impl<F> CorrectionProgressListener for F
where
    F: Fn(usize, &PhotometricCorrectionMap),
{
    fn notify(&self, iteration: usize, corrections: &PhotometricCorrectionMap) {
        self(iteration, corrections)
    }
}

/// Derives per-filter photometric corrections from a calibration catalog.
///
/// Starting from unit corrections, every iteration fits each source against
/// the grid with the current corrections, scales the best-fit model to the
/// uncorrected observation and takes `scale · model / observed` per filter.
/// The reducer combines those per-source values into the next corrections.
#[derive(Clone)]
pub struct PhotometricCorrectionCalculator<'g> {
    grid: &'g PhotometryGrid,
    filter_names: Arc<Vec<String>>,
    reducer: Arc<dyn CorrectionReducer>,
    likelihood: LikelihoodAlgorithm,
}

impl<'g> PhotometricCorrectionCalculator<'g> {
    pub fn new(
        grid: &'g PhotometryGrid,
        reducer: Arc<dyn CorrectionReducer>,
    ) -> Result<Self, PhotometricCorrectionError> {
        let Some(first) = grid.cells().first() else {
            return Err(LikelihoodError::EmptyPhotometryGrid.into());
        };
        Ok(Self {
            grid,
            filter_names: Arc::clone(first.filter_names()),
            reducer,
            likelihood: LikelihoodAlgorithm::default(),
        })
    }

    pub fn with_likelihood_algorithm(mut self, likelihood: LikelihoodAlgorithm) -> Self {
        self.likelihood = likelihood;
        self
    }

    /// Unit correction for every grid filter.
    pub fn initial_corrections(&self) -> PhotometricCorrectionMap {
        self.filter_names
            .iter()
            .map(|filter| (QualifiedName::parse(filter), 1.0))
            .collect()
    }

    /// Flat grid index of every source's best-fit model under `corrections`.
    pub fn find_best_fit_models(
        &self,
        sources: &[CatalogSource],
        corrections: &PhotometricCorrectionMap,
    ) -> Result<Vec<usize>, PhotometricCorrectionError> {
        let source_phz = SourcePhzFunctor::new(
            corrections,
            self.grid,
            Arc::new(MaxMarginalizationFunctor::new(0)),
        )?
        .with_likelihood_algorithm(self.likelihood.clone());
        CatalogHandler::new(source_phz)
            .process(sources, None)?
            .iter()
            .map(|fit| {
                self.grid
                    .flat_index(&fit.result.best_model)
                    .map_err(PhotometricCorrectionError::from)
            })
            .collect()
    }

    /// Least-squares scale of each best-fit model to its uncorrected source.
    pub fn scale_factors(
        &self,
        sources: &[CatalogSource],
        best_models: &[usize],
    ) -> Result<Vec<f64>, PhotometricCorrectionError> {
        self.check_fits(sources, best_models, best_models.len())?;
        sources
            .iter()
            .zip(best_models)
            .map(|(source, model)| -> Result<f64, PhotometricCorrectionError> {
                let observed = self.aligned(source)?;
                self.likelihood
                    .scale_factor(&observed, self.grid.cells()[*model].values())
                    .map_err(|error| tagged(source, error))
            })
            .collect()
    }

    /// Reduces the per-source corrections of every grid filter.
    pub fn corrections_from_fits(
        &self,
        sources: &[CatalogSource],
        best_models: &[usize],
        scale_factors: &[f64],
    ) -> Result<PhotometricCorrectionMap, PhotometricCorrectionError> {
        self.check_fits(sources, best_models, scale_factors.len())?;
        let mut samples = vec![Vec::with_capacity(sources.len()); self.filter_names.len()];
        for ((source, model), scale) in sources.iter().zip(best_models).zip(scale_factors) {
            let observed = self.aligned(source)?;
            let model = self.grid.cells()[*model].values();
            for ((filter_samples, observed), modeled) in
                samples.iter_mut().zip(&observed).zip(model)
            {
                filter_samples.push(CorrectionSample::new(
                    scale * modeled.flux / observed.flux,
                    observed.flux / observed.error,
                ));
            }
        }

        self.filter_names
            .iter()
            .zip(&samples)
            .map(|(filter, filter_samples)| {
                self.reducer
                    .reduce(filter_samples)
                    .map(|correction| (QualifiedName::parse(filter), correction))
                    .ok_or_else(|| PhotometricCorrectionError::NoUsableSamples {
                        filter: filter.clone(),
                    })
            })
            .collect()
    }

    /// Iterates from unit corrections until `stop` is satisfied.
    pub fn compute(
        &self,
        sources: &[CatalogSource],
        stop: &mut dyn StopCriteria,
        progress: Option<&dyn CorrectionProgressListener>,
    ) -> Result<PhotometricCorrectionMap, PhotometricCorrectionError> {
        if sources.is_empty() {
            return Err(PhotometricCorrectionError::EmptyCatalog);
        }
        tracing::info!(
            sources = sources.len(),
            filters = self.filter_names.len(),
            "computing photometric corrections"
        );

        let mut corrections = self.initial_corrections();
        let mut iteration = 0;
        while !stop.should_stop(&corrections) {
            let best_models = self.find_best_fit_models(sources, &corrections)?;
            let scale_factors = self.scale_factors(sources, &best_models)?;
            corrections = self.corrections_from_fits(sources, &best_models, &scale_factors)?;
            iteration += 1;
            tracing::debug!(iteration, "photometric corrections updated");
            if let Some(listener) = progress {
                listener.notify(iteration, &corrections);
            }
        }
        tracing::info!(iterations = iteration, "photometric corrections computed");
        Ok(corrections)
    }

    fn aligned(
        &self,
        source: &CatalogSource,
    ) -> Result<Vec<FluxErrorPair>, PhotometricCorrectionError> {
        self.filter_names
            .iter()
            .map(|filter| {
                source.photometry.find(filter).copied().ok_or_else(|| {
                    tagged(
                        source,
                        LikelihoodError::MissingSourceFilter {
                            filter: filter.clone(),
                        },
                    )
                })
            })
            .collect()
    }

    fn check_fits(
        &self,
        sources: &[CatalogSource],
        best_models: &[usize],
        scale_factors: usize,
    ) -> Result<(), PhotometricCorrectionError> {
        if best_models.len() != sources.len() || scale_factors != sources.len() {
            return Err(PhotometricCorrectionError::FitCountMismatch {
                sources: sources.len(),
                models: best_models.len(),
                scale_factors,
            });
        }
        if let Some(index) = best_models
            .iter()
            .copied()
            .find(|index| *index >= self.grid.size())
        {
            return Err(PhotometricCorrectionError::ModelOutOfGrid {
                index,
                cells: self.grid.size(),
            });
        }
        Ok(())
    }
}

fn tagged(source: &CatalogSource, error: LikelihoodError) -> PhotometricCorrectionError {
    LikelihoodError::Source {
        id: source.id.clone(),
        error: Box::new(error),
    }
    .into()
}

impl std::fmt::Debug for PhotometricCorrectionCalculator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotometricCorrectionCalculator")
            .field("filter_names", &self.filter_names)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::PhotometricCorrectionCalculator;
    use crate::data_model::{FluxErrorPair, PhotometricCorrectionMap, Photometry, PhotometryGrid};
    use crate::dataset::QualifiedName;
    use crate::grid::{GridAxis, GridContainer};
    use crate::likelihood::{CatalogSource, LikelihoodError};
    use crate::photometric_correction::{
        DefaultStopCriteria, MeanCorrectionFunctor, MedianCorrectionFunctor,
        PhotometricCorrectionError, WeightedMedianCorrectionFunctor,
    };
    use std::cell::RefCell;
    use std::sync::Arc;

    const MODELS: [[f64; 3]; 3] = [[1.0, 2.0, 3.0], [3.0, 1.0, 2.0], [2.0, 3.0, 1.0]];
    const OFFSETS: [f64; 3] = [1.0, 1.1, 0.9];

    fn names() -> Arc<Vec<String>> {
        Arc::new(vec!["u".to_string(), "g".to_string(), "r".to_string()])
    }

    fn grid(names: &Arc<Vec<String>>) -> PhotometryGrid {
        let axes = vec![GridAxis::numeric("Z", vec![0.0, 1.0, 2.0]).expect("axis")];
        let mut grid = GridContainer::<Vec<Photometry>>::new(axes).expect("grid");
        for (cell, fluxes) in grid.cells_mut().iter_mut().zip(MODELS) {
            *cell = Photometry::new(
                Arc::clone(names),
                fluxes
                    .iter()
                    .map(|flux| FluxErrorPair::new(*flux, 0.0))
                    .collect(),
            )
            .expect("model photometry");
        }
        grid
    }

    // Sources shaped like the second model, observed through filters whose
    // zero points are off by `OFFSETS`, with 5% errors.
    fn calibration_catalog(names: &Arc<Vec<String>>) -> Vec<CatalogSource> {
        [0.5, 2.0, 3.5, 8.0, 13.0]
            .into_iter()
            .enumerate()
            .map(|(index, scale)| {
                let values = MODELS[1]
                    .iter()
                    .zip(OFFSETS)
                    .map(|(model, offset)| {
                        let flux = scale * model / offset;
                        FluxErrorPair::new(flux, 0.05 * flux)
                    })
                    .collect();
                let photometry = Photometry::new(Arc::clone(names), values).expect("photometry");
                CatalogSource::new(format!("calib-{index}"), photometry)
            })
            .collect()
    }

    fn assert_corrections_close(actual: &PhotometricCorrectionMap, expected: &[(&str, f64)]) {
        assert_eq!(actual.len(), expected.len());
        for (filter, value) in expected {
            let correction = actual
                .get(&QualifiedName::parse(filter))
                .copied()
                .expect("filter should have a correction");
            assert!(
                (correction - value).abs() <= 1.0e-12,
                "{filter}: expected={value} actual={correction}"
            );
        }
    }

    // Least squares on the offset photometry recovers each offset up to the
    // common factor Σc / Σc².
    fn expected_corrections() -> Vec<(&'static str, f64)> {
        let sum: f64 = OFFSETS.iter().sum();
        let sum_of_squares: f64 = OFFSETS.iter().map(|offset| offset * offset).sum();
        ["u", "g", "r"]
            .into_iter()
            .zip(OFFSETS)
            .map(|(filter, offset)| (filter, offset * sum / sum_of_squares))
            .collect()
    }

    #[test]
    fn iteration_recovers_filter_offsets_and_converges() {
        let names = names();
        let grid = grid(&names);
        let catalog = calibration_catalog(&names);
        let calculator =
            PhotometricCorrectionCalculator::new(&grid, Arc::new(MedianCorrectionFunctor))
                .expect("calculator");

        let reported = RefCell::new(Vec::new());
        let listener = |iteration: usize, corrections: &PhotometricCorrectionMap| {
            reported.borrow_mut().push((iteration, corrections.clone()));
        };
        let mut stop = DefaultStopCriteria::new(10, 1.0e-9).expect("stop criteria");
        let corrections = calculator
            .compute(&catalog, &mut stop, Some(&listener))
            .expect("corrections");

        assert_corrections_close(&corrections, &expected_corrections());
        let reported = reported.into_inner();
        assert_eq!(
            reported.iter().map(|(iteration, _)| *iteration).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(reported[1].1, corrections);
    }

    #[test]
    fn individual_steps_can_be_run_separately() {
        let names = names();
        let grid = grid(&names);
        let catalog = calibration_catalog(&names);
        let calculator =
            PhotometricCorrectionCalculator::new(&grid, Arc::new(WeightedMedianCorrectionFunctor))
                .expect("calculator");

        let initial = calculator.initial_corrections();
        assert_corrections_close(&initial, &[("u", 1.0), ("g", 1.0), ("r", 1.0)]);

        let best_models = calculator
            .find_best_fit_models(&catalog, &initial)
            .expect("best fits");
        assert_eq!(best_models, vec![1; catalog.len()]);

        let scale_factors = calculator
            .scale_factors(&catalog, &best_models)
            .expect("scale factors");
        let ratio = {
            let sum: f64 = OFFSETS.iter().sum();
            sum / OFFSETS.iter().map(|offset| offset * offset).sum::<f64>()
        };
        for (scale, expected) in scale_factors.iter().zip([0.5, 2.0, 3.5, 8.0, 13.0]) {
            assert!((scale - expected * ratio).abs() <= 1.0e-12 * expected);
        }

        let corrections = calculator
            .corrections_from_fits(&catalog, &best_models, &scale_factors)
            .expect("corrections");
        assert_corrections_close(&corrections, &expected_corrections());
    }

    #[test]
    fn a_stop_before_the_first_iteration_returns_unit_corrections() {
        let names = names();
        let grid = grid(&names);
        let catalog = calibration_catalog(&names);
        let calculator =
            PhotometricCorrectionCalculator::new(&grid, Arc::new(MeanCorrectionFunctor))
                .expect("calculator");

        let mut stop = DefaultStopCriteria::new(0, 0.0).expect("stop criteria");
        let corrections = calculator
            .compute(&catalog, &mut stop, None)
            .expect("corrections");
        assert_eq!(corrections, calculator.initial_corrections());

        let mut stop = DefaultStopCriteria::new(1, 0.0).expect("stop criteria");
        let corrections = calculator
            .compute(&catalog, &mut stop, None)
            .expect("corrections");
        assert_corrections_close(&corrections, &expected_corrections());
    }

    #[test]
    fn invalid_inputs_are_reported() {
        let names = names();
        let grid = grid(&names);
        let catalog = calibration_catalog(&names);
        let calculator =
            PhotometricCorrectionCalculator::new(&grid, Arc::new(MeanCorrectionFunctor))
                .expect("calculator");

        let mut stop = DefaultStopCriteria::new(3, 0.0).expect("stop criteria");
        assert_eq!(
            calculator.compute(&[], &mut stop, None),
            Err(PhotometricCorrectionError::EmptyCatalog)
        );
        assert!(matches!(
            calculator.corrections_from_fits(&catalog, &[1], &[1.0]),
            Err(PhotometricCorrectionError::FitCountMismatch { sources: 5, .. })
        ));
        assert!(matches!(
            calculator.scale_factors(&catalog, &[1, 1, 1, 1, 3]),
            Err(PhotometricCorrectionError::ModelOutOfGrid { index: 3, cells: 3 })
        ));

        let partial = Arc::new(vec!["u".to_string(), "g".to_string()]);
        let incomplete = vec![CatalogSource::new(
            "no-r",
            Photometry::new(
                partial,
                vec![FluxErrorPair::new(1.0, 0.1), FluxErrorPair::new(1.0, 0.1)],
            )
            .expect("photometry"),
        )];
        assert!(matches!(
            calculator.scale_factors(&incomplete, &[0]),
            Err(PhotometricCorrectionError::Likelihood(LikelihoodError::Source { ref id, .. }))
                if id == "no-r"
        ));

        let dark = vec![CatalogSource::new(
            "dark",
            Photometry::new(names, vec![FluxErrorPair::new(0.0, 0.1); 3]).expect("photometry"),
        )];
        assert_eq!(
            calculator.corrections_from_fits(&dark, &[0], &[1.0]),
            Err(PhotometricCorrectionError::NoUsableSamples {
                filter: "u".to_string()
            })
        );

        let empty = GridContainer::<Vec<Photometry>>::new(Vec::new()).expect("grid");
        assert!(matches!(
            PhotometricCorrectionCalculator::new(&empty, Arc::new(MeanCorrectionFunctor)),
            Err(PhotometricCorrectionError::Likelihood(
                LikelihoodError::EmptyPhotometryGrid
            ))
        ));
    }
}
