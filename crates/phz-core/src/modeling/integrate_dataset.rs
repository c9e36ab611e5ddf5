use crate::dataset::XYDataset;
use crate::numerics::{InterpolationError, InterpolationType, interpolate};

/// Integrates a sampled dataset over an arbitrary wavelength range. The
/// dataset is zero outside its own sampled domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntegrateDatasetFunctor {
    kind: InterpolationType,
}

impl IntegrateDatasetFunctor {
    pub const fn new(kind: InterpolationType) -> Self {
        Self { kind }
    }

    pub const fn kind(&self) -> InterpolationType {
        self.kind
    }

    /// Datasets with fewer than two samples integrate to zero.
    pub fn integrate(
        &self,
        dataset: &XYDataset,
        range: (f64, f64),
    ) -> Result<f64, InterpolationError> {
        if dataset.len() < 2 {
            return Ok(0.0);
        }
        let function = interpolate(dataset.points(), self.kind)?;
        Ok(function.integrate(range.0, range.1))
    }
}
