use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FluxErrorPair {
    pub flux: f64,
    pub error: f64,
}

impl FluxErrorPair {
    pub const fn new(flux: f64, error: f64) -> Self {
        Self { flux, error }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhotometryError {
    #[error("photometry has {filters} filter names but {values} flux/error pairs")]
    LengthMismatch { filters: usize, values: usize },
}

/// Flux/error pairs aligned with a shared filter-name ordering.
///
/// Every photometry produced in one run holds the same `Arc`, so the name
/// list exists once no matter how many grid cells refer to it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Photometry {
    filter_names: Arc<Vec<String>>,
    values: Vec<FluxErrorPair>,
}

impl Photometry {
    pub fn new(
        filter_names: Arc<Vec<String>>,
        values: Vec<FluxErrorPair>,
    ) -> Result<Self, PhotometryError> {
        if filter_names.len() != values.len() {
            return Err(PhotometryError::LengthMismatch {
                filters: filter_names.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            filter_names,
            values,
        })
    }

    pub fn filter_names(&self) -> &Arc<Vec<String>> {
        &self.filter_names
    }

    pub fn values(&self) -> &[FluxErrorPair] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn find(&self, filter_name: &str) -> Option<&FluxErrorPair> {
        self.filter_names
            .iter()
            .position(|name| name == filter_name)
            .map(|index| &self.values[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FluxErrorPair)> + '_ {
        self.filter_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Same name list allocation.
    pub fn shares_filter_names(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.filter_names, &other.filter_names)
    }

    /// Same filter names in the same order, compared by content.
    pub fn has_same_filters(&self, other: &Self) -> bool {
        self.shares_filter_names(other) || self.filter_names == other.filter_names
    }
}
