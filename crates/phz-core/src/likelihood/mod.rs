//! Scoring observed photometry against a photometry grid and reducing the
//! resulting likelihood grids to PDFs.

pub mod catalog;
pub mod chi_square;
pub mod likelihood_algorithm;
pub mod marginalization;
pub mod scale_factor;
pub mod source_phz;

pub use catalog::{CatalogHandler, CatalogResult, CatalogSource};
pub use chi_square::{ChiSquareFunctor, LikelihoodCalculator, chi_square_from_likelihood};
pub use likelihood_algorithm::LikelihoodAlgorithm;
pub use marginalization::{
    Marginalization, MaxMarginalizationFunctor, SumMarginalizationFunctor, normalize_pdf,
};
pub use scale_factor::{ScaleFactorCalculator, ScaleFactorFunctor};
pub use source_phz::{SourcePhzFunctor, SourcePhzResult};

use crate::data_model::PhotometryError;
use crate::grid::GridError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LikelihoodError {
    #[error("no least-squares scale factor over {filters} filters")]
    DegenerateLeastSquares { filters: usize },
    #[error("observed photometry has {observed} filters but the model has {model}")]
    LengthMismatch { observed: usize, model: usize },
    #[error("photometry grid cell {cell_index} does not use the source filter set")]
    FilterMismatch { cell_index: usize },
    #[error("no photometric correction for filter '{filter}'")]
    MissingCorrection { filter: String },
    #[error("source has no photometry for filter '{filter}'")]
    MissingSourceFilter { filter: String },
    #[error("photometry grid has no cells")]
    EmptyPhotometryGrid,
    #[error("marginalization must keep at least one axis")]
    NoKeptAxes,
    #[error("source '{id}': {error}")]
    Source {
        id: String,
        #[source]
        error: Box<LikelihoodError>,
    },
    #[error(transparent)]
    Photometry(#[from] PhotometryError),
    #[error(transparent)]
    Grid(#[from] GridError),
}
