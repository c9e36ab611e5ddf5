use crate::dataset::XYDataset;

/// Moves a rest-frame SED to redshift `z`: `λ → λ(1+z)`, `F → F/(1+z)²`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedshiftFunctor;

impl RedshiftFunctor {
    pub fn apply(&self, sed: &XYDataset, z: f64) -> XYDataset {
        let factor = 1.0 + z;
        sed.iter()
            .map(|(lambda, value)| (lambda * factor, value / (factor * factor)))
            .collect()
    }
}
