use crate::common::constants::C_LIGHT_ANGSTROM_PER_SECOND;
use crate::data_model::FilterInfo;
use crate::dataset::XYDataset;
use crate::numerics::{InterpolationError, InterpolationType, interpolate};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterInfoError {
    #[error("filter transmission needs at least 2 samples, got {actual}")]
    TooFewSamples { actual: usize },
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

/// Derives [`FilterInfo`] from a sampled (wavelength in Angstrom,
/// transmission) curve.
///
/// The range spans the first to the last sample, zero transmission included.
/// The normalization is `c * ∫ T(λ)/λ² dλ` over that range, with `T/λ²`
/// linearly interpolated between samples and `c` in Angstrom per second.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildFilterInfoFunctor;

impl BuildFilterInfoFunctor {
    pub fn build(&self, transmission: &XYDataset) -> Result<FilterInfo, FilterInfoError> {
        let (Some((first, _)), Some((last, _))) = (transmission.first(), transmission.last())
        else {
            return Err(FilterInfoError::TooFewSamples { actual: 0 });
        };
        if transmission.len() < 2 {
            return Err(FilterInfoError::TooFewSamples {
                actual: transmission.len(),
            });
        }
        let range = (first, last);

        let filter = interpolate(transmission.points(), InterpolationType::Linear)?;
        let normalization = self.normalization(transmission, range)?;
        Ok(FilterInfo::new(range, filter, normalization))
    }

    fn normalization(
        &self,
        transmission: &XYDataset,
        range: (f64, f64),
    ) -> Result<f64, InterpolationError> {
        let over_lambda_squared: Vec<(f64, f64)> = transmission
            .iter()
            .map(|(lambda, value)| (lambda, value / (lambda * lambda)))
            .collect();
        let function = interpolate(&over_lambda_squared, InterpolationType::Linear)?;
        Ok(function.integrate(range.0, range.1) * C_LIGHT_ANGSTROM_PER_SECOND)
    }
}
