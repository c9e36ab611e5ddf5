//! JSON run description: the model parameter space, the filter list and the
//! algorithm choices for one photometric-redshift run.

use crate::data_model::{
    CorrectionMapError, ModelParameter, PhotometricCorrectionMap, create_model_axes,
    read_photometric_correction_map,
};
use crate::dataset::QualifiedName;
use crate::grid::{GridAxis, GridError};
use crate::likelihood::{Marginalization, MaxMarginalizationFunctor, SumMarginalizationFunctor};
use crate::modeling::{
    ApplyFilterFunctor, CalculateFluxFunctor, FilterWeighting, ModelFluxAlgorithm,
};
use crate::numerics::InterpolationType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Upper bound on the number of coordinates a range may expand to.
const MAX_RANGE_SAMPLES: usize = 1_000_000;

/// Coordinates of a numeric axis: either listed or an inclusive range.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AxisSampling {
    Values(Vec<f64>),
    Range { min: f64, max: f64, step: f64 },
}

impl AxisSampling {
    /// Listed values are returned as given. A range yields `min, min+step, …`
    /// up to and including `max`, tolerating rounding on the last step.
    pub fn values(&self) -> Result<Vec<f64>, String> {
        match self {
            Self::Values(values) => Ok(values.clone()),
            Self::Range { min, max, step } => {
                if !(min.is_finite() && max.is_finite() && step.is_finite()) {
                    return Err("range bounds and step must be finite".to_string());
                }
                if *step <= 0.0 {
                    return Err(format!("range step must be positive, got {step}"));
                }
                if max < min {
                    return Err(format!("range max {max} is below min {min}"));
                }
                let intervals = ((max - min) / step + 1.0e-9).floor();
                if intervals >= MAX_RANGE_SAMPLES as f64 {
                    return Err(format!(
                        "range expands to more than {MAX_RANGE_SAMPLES} coordinates"
                    ));
                }
                let count = intervals as usize + 1;
                Ok((0..count).map(|index| min + index as f64 * step).collect())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginalizationKind {
    #[default]
    Sum,
    Max,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PhzRunConfig {
    #[serde(rename = "redshift")]
    pub z: AxisSampling,
    #[serde(rename = "ebv")]
    pub ebv: AxisSampling,
    #[serde(rename = "reddeningCurves")]
    pub reddening_curves: Vec<String>,
    pub seds: Vec<String>,
    pub filters: Vec<String>,
    #[serde(default)]
    pub interpolation: InterpolationType,
    #[serde(rename = "filterWeighting", default)]
    pub filter_weighting: FilterWeighting,
    #[serde(rename = "marginalization", default)]
    pub marginalization: MarginalizationKind,
    #[serde(rename = "photometricCorrectionFile", default)]
    pub photometric_correction_file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read run config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse run config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid run config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    CorrectionMap(#[from] CorrectionMapError),
}

impl PhzRunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filters.is_empty() {
            return Err(ConfigError::Invalid {
                field: "filters",
                reason: "at least one filter is required".to_string(),
            });
        }
        let mut seen = std::collections::BTreeSet::new();
        if let Some(duplicate) = self.filters.iter().find(|filter| !seen.insert(filter.as_str())) {
            return Err(ConfigError::Invalid {
                field: "filters",
                reason: format!("filter '{duplicate}' is listed twice"),
            });
        }
        self.model_axes().map(|_| ())
    }

    /// Validated Z, E(B-V), reddening-curve and SED axes, in that order.
    pub fn model_axes(&self) -> Result<Vec<GridAxis>, ConfigError> {
        let zs = self.z.values().map_err(|reason| ConfigError::Invalid {
            field: "redshift",
            reason,
        })?;
        let ebvs = self.ebv.values().map_err(|reason| ConfigError::Invalid {
            field: "ebv",
            reason,
        })?;
        Ok(create_model_axes(
            zs,
            ebvs,
            qualified_names(&self.reddening_curves),
            qualified_names(&self.seds),
        )?)
    }

    pub fn filter_names(&self) -> Vec<QualifiedName> {
        qualified_names(&self.filters)
    }

    pub fn model_flux_algorithm(&self) -> ModelFluxAlgorithm {
        ModelFluxAlgorithm::new(
            Arc::new(ApplyFilterFunctor::new(self.filter_weighting)),
            Arc::new(CalculateFluxFunctor::new(self.interpolation)),
        )
    }

    /// Redshift marginalization of the configured kind.
    pub fn marginalization(&self) -> Arc<dyn Marginalization> {
        match self.marginalization {
            MarginalizationKind::Sum => {
                Arc::new(SumMarginalizationFunctor::for_parameter(ModelParameter::Z))
            }
            MarginalizationKind::Max => {
                Arc::new(MaxMarginalizationFunctor::for_parameter(ModelParameter::Z))
            }
        }
    }

    /// Reads the configured correction file, resolved against `base_dir`
    /// when relative. Without one, every filter gets a unit correction.
    pub fn photometric_correction_map(
        &self,
        base_dir: impl AsRef<Path>,
    ) -> Result<PhotometricCorrectionMap, ConfigError> {
        match &self.photometric_correction_file {
            Some(path) => Ok(read_photometric_correction_map(base_dir.as_ref().join(path))?),
            None => Ok(self
                .filter_names()
                .into_iter()
                .map(|filter| (filter, 1.0))
                .collect()),
        }
    }
}

fn qualified_names(names: &[String]) -> Vec<QualifiedName> {
    names.iter().map(|name| QualifiedName::parse(name)).collect()
}

pub fn load_run_config(path: impl AsRef<Path>) -> Result<PhzRunConfig, ConfigError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: PhzRunConfig =
        serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    tracing::debug!(
        path = %path.display(),
        filters = config.filters.len(),
        seds = config.seds.len(),
        "loaded run config"
    );
    Ok(config)
}
