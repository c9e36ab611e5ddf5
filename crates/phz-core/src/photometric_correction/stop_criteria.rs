use super::PhotometricCorrectionError;
use crate::data_model::PhotometricCorrectionMap;

/// Decides when the iterative correction search is done.
///
/// Called once with the initial corrections and then once after every
/// iteration, always with the most recent map.
pub trait StopCriteria {
    fn should_stop(&mut self, corrections: &PhotometricCorrectionMap) -> bool;
}

impl<F> StopCriteria for F
where
    F: FnMut(&PhotometricCorrectionMap) -> bool,
{
    fn should_stop(&mut self, corrections: &PhotometricCorrectionMap) -> bool {
        self(corrections)
    }
}

/// Stops after `max_iterations` iterations, or earlier once no correction
/// moved by more than `tolerance` since the previous call.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultStopCriteria {
    max_iterations: usize,
    tolerance: f64,
    calls: usize,
    previous: Option<PhotometricCorrectionMap>,
}

impl DefaultStopCriteria {
    pub fn new(max_iterations: usize, tolerance: f64) -> Result<Self, PhotometricCorrectionError> {
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(PhotometricCorrectionError::NegativeTolerance { tolerance });
        }
        Ok(Self {
            max_iterations,
            tolerance,
            calls: 0,
            previous: None,
        })
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn converged(&self, corrections: &PhotometricCorrectionMap) -> bool {
        let Some(previous) = &self.previous else {
            return false;
        };
        corrections.len() == previous.len()
            && corrections.iter().all(|(filter, value)| {
                previous
                    .get(filter)
                    .is_some_and(|before| (value - before).abs() <= self.tolerance)
            })
    }
}

impl StopCriteria for DefaultStopCriteria {
    fn should_stop(&mut self, corrections: &PhotometricCorrectionMap) -> bool {
        let iterations = self.calls;
        self.calls += 1;
        let stop = iterations >= self.max_iterations || self.converged(corrections);
        self.previous = Some(corrections.clone());
        stop
    }
}
