use crate::dataset::XYDataset;
use crate::numerics::PiecewisePolynomial;

/// Applies dust extinction: `F(λ) · 10^(-0.4 · k(λ) · E(B-V))`, with `k` the
/// reddening curve (zero outside its sampled domain).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtinctionFunctor;

impl ExtinctionFunctor {
    pub fn apply(&self, sed: &XYDataset, reddening_curve: &PiecewisePolynomial, ebv: f64) -> XYDataset {
        sed.iter()
            .map(|(lambda, value)| {
                let exponent = -0.4 * reddening_curve.value(lambda) * ebv;
                (lambda, value * 10_f64.powf(exponent))
            })
            .collect()
    }
}
