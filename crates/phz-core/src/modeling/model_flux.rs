use super::{ApplyFilter, ApplyFilterFunctor, CalculateFluxFunctor, FluxCalculator};
use crate::data_model::{FilterInfo, FluxErrorPair};
use crate::dataset::XYDataset;
use crate::numerics::{InterpolationError, InterpolationType};
use std::sync::Arc;

/// Flux of one model spectrum through a list of filters.
///
/// Errors are left at zero; noise is the concern of whoever consumes the
/// photometry.
#[derive(Clone)]
pub struct ModelFluxAlgorithm {
    apply_filter: Arc<dyn ApplyFilter>,
    flux_calculator: Arc<dyn FluxCalculator>,
}

impl ModelFluxAlgorithm {
    pub fn new(
        apply_filter: Arc<dyn ApplyFilter>,
        flux_calculator: Arc<dyn FluxCalculator>,
    ) -> Self {
        Self {
            apply_filter,
            flux_calculator,
        }
    }

    pub fn with_interpolation(kind: InterpolationType) -> Self {
        Self::new(
            Arc::new(ApplyFilterFunctor::default()),
            Arc::new(CalculateFluxFunctor::new(kind)),
        )
    }

    pub fn compute(
        &self,
        model: &XYDataset,
        filter_infos: &[FilterInfo],
    ) -> Result<Vec<FluxErrorPair>, InterpolationError> {
        filter_infos
            .iter()
            .map(|filter_info| {
                let filtered = self.apply_filter.apply_filter(model, filter_info);
                let flux = self
                    .flux_calculator
                    .calculate_flux(&filtered, filter_info.normalization())?;
                Ok(FluxErrorPair::new(flux, 0.0))
            })
            .collect()
    }
}

impl Default for ModelFluxAlgorithm {
    fn default() -> Self {
        Self::with_interpolation(InterpolationType::Linear)
    }
}

impl std::fmt::Debug for ModelFluxAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelFluxAlgorithm").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::ModelFluxAlgorithm;
    use crate::data_model::{FilterInfo, FluxErrorPair};
    use crate::dataset::XYDataset;
    use crate::modeling::{ApplyFilter, FluxCalculator};
    use crate::numerics::{InterpolationError, InterpolationType, interpolate};
    use std::sync::Arc;

    struct PassThrough;

    impl ApplyFilter for PassThrough {
        fn apply_filter(&self, model: &XYDataset, _filter_info: &FilterInfo) -> XYDataset {
            model.clone()
        }
    }

    struct FirstValueOverNormalization;

    impl FluxCalculator for FirstValueOverNormalization {
        fn calculate_flux(
            &self,
            filtered_model: &XYDataset,
            normalization: f64,
        ) -> Result<f64, InterpolationError> {
            Ok(filtered_model.first().map_or(0.0, |(_, value)| value) / normalization)
        }
    }

    fn filter_info(normalization: f64) -> FilterInfo {
        let function =
            interpolate(&[(1.0, 1.0), (2.0, 1.0)], InterpolationType::Linear).expect("function");
        FilterInfo::new((1.0, 2.0), function, normalization)
    }

    #[test]
    fn injected_strategies_are_used_per_filter_in_order() {
        let algorithm =
            ModelFluxAlgorithm::new(Arc::new(PassThrough), Arc::new(FirstValueOverNormalization));
        let model = XYDataset::new(vec![(1.0, 8.0), (2.0, 1.0)]);

        let fluxes = algorithm
            .compute(&model, &[filter_info(2.0), filter_info(4.0)])
            .expect("fluxes");
        assert_eq!(
            fluxes,
            vec![FluxErrorPair::new(4.0, 0.0), FluxErrorPair::new(2.0, 0.0)]
        );
    }

    #[test]
    fn default_algorithm_integrates_the_photon_weighted_spectrum() {
        let algorithm = ModelFluxAlgorithm::default();
        let model = XYDataset::new(vec![(1.0, 2.0), (1.5, 2.0), (2.0, 2.0)]);

        // ∫_1^2 2·1·λ dλ = 3
        let fluxes = algorithm.compute(&model, &[filter_info(1.0)]).expect("fluxes");
        assert!((fluxes[0].flux - 3.0).abs() < 1.0e-12);
        assert_eq!(fluxes[0].error, 0.0);
    }
}
