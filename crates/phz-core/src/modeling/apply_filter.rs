use crate::data_model::FilterInfo;
use crate::dataset::XYDataset;
use serde::{Deserialize, Serialize};

/// Strategy that weights a model spectrum by a filter transmission.
pub trait ApplyFilter: Send + Sync {
    fn apply_filter(&self, model: &XYDataset, filter_info: &FilterInfo) -> XYDataset;
}

/// Detector convention used when weighting the spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterWeighting {
    /// `F(λ)·T(λ)·λ`
    #[default]
    PhotonCounting,
    /// `F(λ)·T(λ)`
    EnergyCounting,
}

/// Keeps every model sample; samples outside the filter range become zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyFilterFunctor {
    weighting: FilterWeighting,
}

impl ApplyFilterFunctor {
    pub const fn new(weighting: FilterWeighting) -> Self {
        Self { weighting }
    }

    pub const fn photon_counting() -> Self {
        Self::new(FilterWeighting::PhotonCounting)
    }

    pub const fn energy_counting() -> Self {
        Self::new(FilterWeighting::EnergyCounting)
    }

    pub const fn weighting(&self) -> FilterWeighting {
        self.weighting
    }
}

impl ApplyFilter for ApplyFilterFunctor {
    fn apply_filter(&self, model: &XYDataset, filter_info: &FilterInfo) -> XYDataset {
        let (min, max) = filter_info.range();
        model
            .iter()
            .map(|(lambda, value)| {
                if lambda < min || lambda > max {
                    return (lambda, 0.0);
                }
                let filtered = value * filter_info.transmission(lambda);
                match self.weighting {
                    FilterWeighting::PhotonCounting => (lambda, filtered * lambda),
                    FilterWeighting::EnergyCounting => (lambda, filtered),
                }
            })
            .collect()
    }
}
