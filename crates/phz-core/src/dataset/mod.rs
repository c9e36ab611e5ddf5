//! Sampled (wavelength, value) datasets and the qualified names that identify
//! them (SED templates, reddening curves, filter transmissions).

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Hierarchical dataset identifier: a group path plus the dataset name.
///
/// `QualifiedName::parse("Euclid/VIS")` has group `["Euclid"]` and dataset
/// name `"VIS"`; its rendered form is the `/`-joined path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedName {
    groups: Vec<String>,
    dataset_name: String,
}

impl QualifiedName {
    pub fn new(groups: Vec<String>, dataset_name: impl Into<String>) -> Self {
        Self {
            groups,
            dataset_name: dataset_name.into(),
        }
    }

    pub fn parse(qualified_name: &str) -> Self {
        let mut parts: Vec<String> = qualified_name
            .split('/')
            .filter(|part| !part.is_empty())
            .map(str::to_owned)
            .collect();
        let dataset_name = parts.pop().unwrap_or_default();
        Self {
            groups: parts,
            dataset_name,
        }
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn qualified_name(&self) -> String {
        self.to_string()
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for group in &self.groups {
            write!(f, "{group}/")?;
        }
        f.write_str(&self.dataset_name)
    }
}

impl From<&str> for QualifiedName {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Ascending-wavelength samples of a spectral quantity.
///
/// The container does not validate ordering; consumers that build
/// interpolants reject non-increasing wavelengths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XYDataset {
    points: Vec<(f64, f64)>,
}

impl XYDataset {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        self.points.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().copied()
    }
}

impl FromIterator<(f64, f64)> for XYDataset {
    fn from_iter<T: IntoIterator<Item = (f64, f64)>>(iter: T) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Source of named datasets (SED library, reddening curves, filters).
pub trait DatasetProvider {
    fn dataset(&self, name: &QualifiedName) -> Option<XYDataset>;
}

impl DatasetProvider for BTreeMap<QualifiedName, XYDataset> {
    fn dataset(&self, name: &QualifiedName) -> Option<XYDataset> {
        self.get(name).cloned()
    }
}
