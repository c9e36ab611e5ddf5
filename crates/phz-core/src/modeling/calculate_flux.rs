use super::IntegrateDatasetFunctor;
use crate::dataset::XYDataset;
use crate::numerics::{InterpolationError, InterpolationType};

/// Strategy that turns a filtered model spectrum into a calibrated flux.
pub trait FluxCalculator: Send + Sync {
    fn calculate_flux(
        &self,
        filtered_model: &XYDataset,
        normalization: f64,
    ) -> Result<f64, InterpolationError>;
}

/// Integrates the filtered model over its own sampled range and divides by
/// the filter normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalculateFluxFunctor {
    integrator: IntegrateDatasetFunctor,
}

impl CalculateFluxFunctor {
    pub const fn new(kind: InterpolationType) -> Self {
        Self {
            integrator: IntegrateDatasetFunctor::new(kind),
        }
    }
}

impl FluxCalculator for CalculateFluxFunctor {
    fn calculate_flux(
        &self,
        filtered_model: &XYDataset,
        normalization: f64,
    ) -> Result<f64, InterpolationError> {
        let (Some((min, _)), Some((max, _))) = (filtered_model.first(), filtered_model.last())
        else {
            return Ok(0.0);
        };
        Ok(self.integrator.integrate(filtered_model, (min, max))? / normalization)
    }
}
