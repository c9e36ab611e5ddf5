//! Crate-wide error classification for front ends.
//!
//! Every module error converts into a [`PhzError`] carrying a category with a
//! stable exit code and a dotted placeholder identifying the failure kind.

use crate::common::ConfigError;
use crate::data_model::{CorrectionMapError, PhotometryError, SerializationError};
use crate::grid::GridError;
use crate::likelihood::LikelihoodError;
use crate::modeling::{FilterInfoError, ModelingError};
use crate::numerics::InterpolationError;
use crate::output::OutputError;
use crate::photometric_correction::PhotometricCorrectionError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PhzResult<T> = Result<T, PhzError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhzErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl PhzErrorCategory {
    pub const fn exit_placeholder(self) -> ExitPlaceholder {
        match self {
            Self::InputValidationError => ExitPlaceholder {
                exit_code: 2,
                category_name: "InputValidationError",
            },
            Self::IoSystemError => ExitPlaceholder {
                exit_code: 3,
                category_name: "IoSystemError",
            },
            Self::ComputationError => ExitPlaceholder {
                exit_code: 4,
                category_name: "ComputationError",
            },
            Self::InternalError => ExitPlaceholder {
                exit_code: 5,
                category_name: "InternalError",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_placeholder().exit_code
    }

    pub const fn category_name(self) -> &'static str {
        self.exit_placeholder().category_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPlaceholder {
    pub exit_code: i32,
    pub category_name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhzError {
    category: PhzErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl PhzError {
    pub fn new(
        category: PhzErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(PhzErrorCategory::InputValidationError, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(PhzErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(PhzErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(PhzErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> PhzErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }
}

impl Display for PhzError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.category_name(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for PhzError {}

impl From<GridError> for PhzError {
    fn from(error: GridError) -> Self {
        let placeholder = match error {
            GridError::EmptyAxis { .. } => "GRID.EMPTY_AXIS",
            GridError::DuplicateCoordinate { .. } => "GRID.DUPLICATE_COORDINATE",
            GridError::NonFiniteCoordinate { .. } => "GRID.NON_FINITE_COORDINATE",
            GridError::InvalidAxis { .. } => "GRID.INVALID_AXIS",
            GridError::DimensionMismatch { .. } => "GRID.DIMENSION_MISMATCH",
            GridError::TooManyCells { .. } => "GRID.TOO_MANY_CELLS",
        };
        Self::input_validation(placeholder, error.to_string())
    }
}

impl From<InterpolationError> for PhzError {
    fn from(error: InterpolationError) -> Self {
        Self::input_validation("NUMERICS.INTERPOLATION", error.to_string())
    }
}

impl From<PhotometryError> for PhzError {
    fn from(error: PhotometryError) -> Self {
        Self::input_validation("PHOTOMETRY.LENGTH_MISMATCH", error.to_string())
    }
}

impl From<FilterInfoError> for PhzError {
    fn from(error: FilterInfoError) -> Self {
        Self::input_validation("MODELING.FILTER_INFO", error.to_string())
    }
}

impl From<ModelingError> for PhzError {
    fn from(error: ModelingError) -> Self {
        let message = error.to_string();
        match error {
            ModelingError::MissingFilter { .. } => {
                Self::input_validation("MODELING.MISSING_FILTER", message)
            }
            ModelingError::MissingSed { .. } => {
                Self::input_validation("MODELING.MISSING_SED", message)
            }
            ModelingError::MissingReddeningCurve { .. } => {
                Self::input_validation("MODELING.MISSING_REDDENING_CURVE", message)
            }
            ModelingError::FilterInfo { .. } => {
                Self::input_validation("MODELING.FILTER_INFO", message)
            }
            ModelingError::Interpolation { .. } => {
                Self::computation("MODELING.INTERPOLATION", message)
            }
            ModelingError::ModelIndexOutOfRange { .. } => {
                Self::internal("MODELING.INDEX_OUT_OF_RANGE", message)
            }
            ModelingError::Photometry(error) => error.into(),
            ModelingError::Grid(error) => error.into(),
        }
    }
}

impl From<LikelihoodError> for PhzError {
    fn from(error: LikelihoodError) -> Self {
        let message = error.to_string();
        match error {
            LikelihoodError::DegenerateLeastSquares { .. } => {
                Self::computation("LIKELIHOOD.DEGENERATE_LEAST_SQUARES", message)
            }
            LikelihoodError::LengthMismatch { .. } | LikelihoodError::FilterMismatch { .. } => {
                Self::input_validation("LIKELIHOOD.FILTER_MISMATCH", message)
            }
            LikelihoodError::MissingCorrection { .. } => {
                Self::input_validation("LIKELIHOOD.MISSING_CORRECTION", message)
            }
            LikelihoodError::MissingSourceFilter { .. } => {
                Self::input_validation("LIKELIHOOD.MISSING_SOURCE_FILTER", message)
            }
            LikelihoodError::EmptyPhotometryGrid => {
                Self::input_validation("LIKELIHOOD.EMPTY_GRID", message)
            }
            LikelihoodError::NoKeptAxes => {
                Self::input_validation("LIKELIHOOD.NO_KEPT_AXES", message)
            }
            LikelihoodError::Source { error: inner, .. } => {
                let classified = Self::from(*inner);
                Self::new(classified.category, classified.placeholder, message)
            }
            LikelihoodError::Photometry(error) => error.into(),
            LikelihoodError::Grid(error) => error.into(),
        }
    }
}

impl From<SerializationError> for PhzError {
    fn from(error: SerializationError) -> Self {
        let message = error.to_string();
        match error {
            SerializationError::EmptyGrid => {
                Self::input_validation("PERSISTENCE.EMPTY_GRID", message)
            }
            SerializationError::NoFilters => {
                Self::input_validation("PERSISTENCE.NO_FILTERS", message)
            }
            SerializationError::FilterMismatch { .. } => {
                Self::input_validation("PERSISTENCE.FILTER_MISMATCH", message)
            }
            SerializationError::Corrupted { .. } => {
                Self::input_validation("PERSISTENCE.CORRUPTED", message)
            }
            SerializationError::TooLarge { .. } => {
                Self::input_validation("PERSISTENCE.TOO_LARGE", message)
            }
            SerializationError::Io { .. } => Self::io_system("IO.PHOTOMETRY_GRID", message),
            SerializationError::Grid(error) => error.into(),
        }
    }
}

impl From<CorrectionMapError> for PhzError {
    fn from(error: CorrectionMapError) -> Self {
        let message = error.to_string();
        match error {
            CorrectionMapError::Read { .. } | CorrectionMapError::Write { .. } => {
                Self::io_system("IO.CORRECTION_MAP", message)
            }
            CorrectionMapError::Malformed { .. } => {
                Self::input_validation("CORRECTION_MAP.MALFORMED", message)
            }
            CorrectionMapError::DuplicateFilter { .. } => {
                Self::input_validation("CORRECTION_MAP.DUPLICATE_FILTER", message)
            }
        }
    }
}

impl From<ConfigError> for PhzError {
    fn from(error: ConfigError) -> Self {
        let message = error.to_string();
        match error {
            ConfigError::Read { .. } => Self::io_system("IO.CONFIG", message),
            ConfigError::Parse { .. } => Self::input_validation("CONFIG.PARSE", message),
            ConfigError::Invalid { .. } => Self::input_validation("CONFIG.INVALID", message),
            ConfigError::Grid(error) => error.into(),
            ConfigError::CorrectionMap(error) => error.into(),
        }
    }
}

impl From<PhotometricCorrectionError> for PhzError {
    fn from(error: PhotometricCorrectionError) -> Self {
        let message = error.to_string();
        match error {
            PhotometricCorrectionError::NegativeTolerance { .. } => {
                Self::input_validation("CORRECTION.NEGATIVE_TOLERANCE", message)
            }
            PhotometricCorrectionError::EmptyCatalog => {
                Self::input_validation("CORRECTION.EMPTY_CATALOG", message)
            }
            PhotometricCorrectionError::FitCountMismatch { .. }
            | PhotometricCorrectionError::ModelOutOfGrid { .. } => {
                Self::internal("CORRECTION.FIT_MISMATCH", message)
            }
            PhotometricCorrectionError::NoUsableSamples { .. } => {
                Self::computation("CORRECTION.NO_USABLE_SAMPLES", message)
            }
            PhotometricCorrectionError::Likelihood(error) => error.into(),
            PhotometricCorrectionError::Grid(error) => error.into(),
        }
    }
}

impl From<OutputError> for PhzError {
    fn from(error: OutputError) -> Self {
        let message = error.to_string();
        match error {
            OutputError::Write { .. } => Self::io_system("IO.OUTPUT", message),
            OutputError::UnsupportedPdfShape { .. } => {
                Self::input_validation("OUTPUT.PDF_SHAPE", message)
            }
            OutputError::InvalidSourceId { .. } => {
                Self::input_validation("OUTPUT.INVALID_SOURCE_ID", message)
            }
            OutputError::BestModelOutOfGrid { .. } => {
                Self::internal("OUTPUT.BEST_MODEL_OUT_OF_GRID", message)
            }
        }
    }
}
