use super::{
    ModelDatasetGenerator, ModelFluxAlgorithm, ModelingError, PhotometryAlgorithm,
    ProgressListener,
};
use crate::data_model::{ModelParameter, Photometry, PhotometryGrid, validate_model_axes};
use crate::dataset::{DatasetProvider, QualifiedName, XYDataset};
use crate::grid::{GridAxis, GridContainer};
use std::collections::BTreeMap;

/// Builds a full photometry grid from dataset providers.
///
/// Every SED, reddening curve and filter named by the parameter space is
/// resolved at construction, so missing inputs surface before any model is
/// computed.
#[derive(Debug, Clone)]
pub struct PhotometryGridCreator {
    axes: Vec<GridAxis>,
    filter_list: Vec<QualifiedName>,
    sed_map: BTreeMap<QualifiedName, XYDataset>,
    reddening_curve_map: BTreeMap<QualifiedName, XYDataset>,
    filter_map: BTreeMap<QualifiedName, XYDataset>,
    model_flux: ModelFluxAlgorithm,
}

impl PhotometryGridCreator {
    pub fn new(
        axes: Vec<GridAxis>,
        filter_list: Vec<QualifiedName>,
        sed_provider: &dyn DatasetProvider,
        reddening_curve_provider: &dyn DatasetProvider,
        filter_provider: &dyn DatasetProvider,
    ) -> Result<Self, ModelingError> {
        validate_model_axes(&axes)?;

        let mut filter_map = BTreeMap::new();
        for filter in &filter_list {
            let dataset = filter_provider
                .dataset(filter)
                .ok_or_else(|| ModelingError::MissingFilter {
                    filter: filter.to_string(),
                })?;
            filter_map.insert(filter.clone(), dataset);
        }

        let mut sed_map = BTreeMap::new();
        for sed in axes[ModelParameter::Sed.axis()]
            .categorical_values()
            .unwrap_or_default()
        {
            let dataset = sed_provider
                .dataset(sed)
                .ok_or_else(|| ModelingError::MissingSed {
                    sed: sed.to_string(),
                })?;
            sed_map.insert(sed.clone(), dataset);
        }

        let mut reddening_curve_map = BTreeMap::new();
        for curve in axes[ModelParameter::ReddeningCurve.axis()]
            .categorical_values()
            .unwrap_or_default()
        {
            let dataset = reddening_curve_provider.dataset(curve).ok_or_else(|| {
                ModelingError::MissingReddeningCurve {
                    curve: curve.to_string(),
                }
            })?;
            reddening_curve_map.insert(curve.clone(), dataset);
        }

        Ok(Self {
            axes,
            filter_list,
            sed_map,
            reddening_curve_map,
            filter_map,
            model_flux: ModelFluxAlgorithm::default(),
        })
    }

    /// Replaces the default photon-counting, linear-integration flux model.
    pub fn with_model_flux(mut self, model_flux: ModelFluxAlgorithm) -> Self {
        self.model_flux = model_flux;
        self
    }

    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    pub fn filter_list(&self) -> &[QualifiedName] {
        &self.filter_list
    }

    pub fn create(
        &self,
        progress: Option<&dyn ProgressListener>,
    ) -> Result<PhotometryGrid, ModelingError> {
        let generator =
            ModelDatasetGenerator::new(&self.axes, &self.sed_map, &self.reddening_curve_map)?;
        let algorithm =
            PhotometryAlgorithm::new(self.model_flux.clone(), &self.filter_map, &self.filter_list)?;
        let mut grid = GridContainer::<Vec<Photometry>>::new(self.axes.clone())?;

        tracing::info!(
            models = grid.size(),
            filters = self.filter_list.len(),
            "computing photometry grid"
        );
        algorithm.compute_into(grid.cells_mut(), |flat| generator.model_at(flat), progress)?;
        tracing::debug!(models = grid.size(), "photometry grid complete");
        Ok(grid)
    }
}
