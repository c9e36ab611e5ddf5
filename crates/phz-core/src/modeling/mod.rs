//! Synthetic photometry: from SED templates, reddening curves and filter
//! transmissions to a populated photometry grid.

pub mod apply_filter;
pub mod calculate_flux;
pub mod extinction;
pub mod filter_info_builder;
pub mod integrate_dataset;
pub mod model_dataset;
pub mod model_flux;
pub mod photometry_algorithm;
pub mod photometry_grid_creator;
pub mod redshift;

pub use apply_filter::{ApplyFilter, ApplyFilterFunctor, FilterWeighting};
pub use calculate_flux::{CalculateFluxFunctor, FluxCalculator};
pub use extinction::ExtinctionFunctor;
pub use filter_info_builder::{BuildFilterInfoFunctor, FilterInfoError};
pub use integrate_dataset::IntegrateDatasetFunctor;
pub use model_dataset::ModelDatasetGenerator;
pub use model_flux::ModelFluxAlgorithm;
pub use photometry_algorithm::{PhotometryAlgorithm, ProgressListener};
pub use photometry_grid_creator::PhotometryGridCreator;
pub use redshift::RedshiftFunctor;

use crate::data_model::PhotometryError;
use crate::grid::GridError;
use crate::numerics::InterpolationError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelingError {
    #[error("filter '{filter}' is not available from the filter provider")]
    MissingFilter { filter: String },
    #[error("SED '{sed}' is not available from the SED provider")]
    MissingSed { sed: String },
    #[error("reddening curve '{curve}' is not available from the reddening curve provider")]
    MissingReddeningCurve { curve: String },
    #[error("model index {index} is out of range for {size} models")]
    ModelIndexOutOfRange { index: usize, size: usize },
    #[error("filter '{filter}' cannot be used: {source}")]
    FilterInfo {
        filter: String,
        source: FilterInfoError,
    },
    #[error("{context}: {source}")]
    Interpolation {
        context: String,
        source: InterpolationError,
    },
    #[error(transparent)]
    Photometry(#[from] PhotometryError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl ModelingError {
    pub(crate) fn interpolation(context: impl Into<String>, source: InterpolationError) -> Self {
        Self::Interpolation {
            context: context.into(),
            source,
        }
    }
}
