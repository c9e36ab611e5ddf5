//! Iterative estimation of per-filter photometric corrections from a
//! calibration catalog.

pub mod calculator;
pub mod reducers;
pub mod stop_criteria;

pub use calculator::{CorrectionProgressListener, PhotometricCorrectionCalculator};
pub use reducers::{
    CorrectionMethod, CorrectionReducer, CorrectionSample, MeanCorrectionFunctor,
    MedianCorrectionFunctor, WeightedMeanCorrectionFunctor, WeightedMedianCorrectionFunctor,
};
pub use stop_criteria::{DefaultStopCriteria, StopCriteria};

use crate::grid::GridError;
use crate::likelihood::LikelihoodError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhotometricCorrectionError {
    #[error("photometric correction tolerance must be non-negative, got {tolerance}")]
    NegativeTolerance { tolerance: f64 },
    #[error("calibration catalog has no sources")]
    EmptyCatalog,
    #[error(
        "calibration catalog has {sources} sources but {models} best-fit models and {scale_factors} scale factors"
    )]
    FitCountMismatch {
        sources: usize,
        models: usize,
        scale_factors: usize,
    },
    #[error("best-fit model {index} is outside a grid of {cells} cells")]
    ModelOutOfGrid { index: usize, cells: usize },
    #[error("no usable calibration sample for filter '{filter}'")]
    NoUsableSamples { filter: String },
    #[error(transparent)]
    Likelihood(#[from] LikelihoodError),
    #[error(transparent)]
    Grid(#[from] GridError),
}
