use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One source's correction for one filter, with the observed signal-to-noise
/// ratio of that filter as its weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionSample {
    pub correction: f64,
    pub weight: f64,
}

impl CorrectionSample {
    pub const fn new(correction: f64, weight: f64) -> Self {
        Self { correction, weight }
    }
}

/// Combines the per-source corrections of one filter into a single value.
/// Returns `None` when no usable sample remains.
pub trait CorrectionReducer: Send + Sync {
    fn reduce(&self, samples: &[CorrectionSample]) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MeanCorrectionFunctor;

impl CorrectionReducer for MeanCorrectionFunctor {
    fn reduce(&self, samples: &[CorrectionSample]) -> Option<f64> {
        let values = finite_corrections(samples);
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Middle correction; the mean of the two middle ones for an even count.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianCorrectionFunctor;

impl CorrectionReducer for MedianCorrectionFunctor {
    fn reduce(&self, samples: &[CorrectionSample]) -> Option<f64> {
        let mut values = finite_corrections(samples);
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let middle = values.len() / 2;
        Some(if values.len() % 2 == 0 {
            (values[middle - 1] + values[middle]) / 2.0
        } else {
            values[middle]
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedMeanCorrectionFunctor;

impl CorrectionReducer for WeightedMeanCorrectionFunctor {
    fn reduce(&self, samples: &[CorrectionSample]) -> Option<f64> {
        let weighted = weighted_samples(samples);
        let total: f64 = weighted.iter().map(|sample| sample.weight).sum();
        (total > 0.0).then(|| {
            weighted
                .iter()
                .map(|sample| sample.correction * sample.weight)
                .sum::<f64>()
                / total
        })
    }
}

/// Smallest correction whose cumulative weight reaches half the total.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedMedianCorrectionFunctor;

impl CorrectionReducer for WeightedMedianCorrectionFunctor {
    fn reduce(&self, samples: &[CorrectionSample]) -> Option<f64> {
        let mut weighted = weighted_samples(samples);
        weighted.sort_by(|left, right| left.correction.total_cmp(&right.correction));
        let half = weighted.iter().map(|sample| sample.weight).sum::<f64>() / 2.0;
        if half <= 0.0 {
            return None;
        }
        let mut cumulative = 0.0;
        weighted.into_iter().find_map(|sample| {
            cumulative += sample.weight;
            (cumulative >= half).then_some(sample.correction)
        })
    }
}

/// Reducer selection as it appears in run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorrectionMethod {
    Mean,
    #[default]
    Median,
    WeightedMean,
    WeightedMedian,
}

impl CorrectionMethod {
    pub fn reducer(self) -> Arc<dyn CorrectionReducer> {
        match self {
            Self::Mean => Arc::new(MeanCorrectionFunctor),
            Self::Median => Arc::new(MedianCorrectionFunctor),
            Self::WeightedMean => Arc::new(WeightedMeanCorrectionFunctor),
            Self::WeightedMedian => Arc::new(WeightedMedianCorrectionFunctor),
        }
    }
}

fn finite_corrections(samples: &[CorrectionSample]) -> Vec<f64> {
    samples
        .iter()
        .map(|sample| sample.correction)
        .filter(|correction| correction.is_finite())
        .collect()
}

fn weighted_samples(samples: &[CorrectionSample]) -> Vec<CorrectionSample> {
    samples
        .iter()
        .copied()
        .filter(|sample| {
            sample.correction.is_finite() && sample.weight.is_finite() && sample.weight > 0.0
        })
        .collect()
}
