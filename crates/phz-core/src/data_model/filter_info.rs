use crate::numerics::PiecewisePolynomial;

/// Filter metadata derived once from a sampled transmission curve.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterInfo {
    range: (f64, f64),
    filter: PiecewisePolynomial,
    normalization: f64,
}

impl FilterInfo {
    pub fn new(range: (f64, f64), filter: PiecewisePolynomial, normalization: f64) -> Self {
        Self {
            range,
            filter,
            normalization,
        }
    }

    /// Wavelengths of the first and last transmission sample.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn filter(&self) -> &PiecewisePolynomial {
        &self.filter
    }

    pub fn transmission(&self, wavelength: f64) -> f64 {
        self.filter.value(wavelength)
    }

    pub fn normalization(&self) -> f64 {
        self.normalization
    }
}
