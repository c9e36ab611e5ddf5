use super::GridError;
use crate::dataset::QualifiedName;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    Numeric,
    Categorical,
}

/// Ordered coordinates of one axis, tagged by their semantic kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisValues {
    Numeric(Vec<f64>),
    Categorical(Vec<QualifiedName>),
}

impl AxisValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn kind(&self) -> AxisKind {
        match self {
            Self::Numeric(_) => AxisKind::Numeric,
            Self::Categorical(_) => AxisKind::Categorical,
        }
    }
}

/// A single coordinate, used for fix-by-value lookups and for reporting.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisValue {
    Numeric(f64),
    Categorical(QualifiedName),
}

impl Display for AxisValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(value) => write!(f, "{value}"),
            Self::Categorical(name) => write!(f, "{name}"),
        }
    }
}

impl From<f64> for AxisValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<QualifiedName> for AxisValue {
    fn from(value: QualifiedName) -> Self {
        Self::Categorical(value)
    }
}

/// Named, ordered dimension of a grid. Coordinates are unique and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxis {
    name: String,
    values: AxisValues,
}

impl GridAxis {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Result<Self, GridError> {
        let name = name.into();
        if values.is_empty() {
            return Err(GridError::EmptyAxis { axis: name });
        }
        for (index, value) in values.iter().copied().enumerate() {
            if !value.is_finite() {
                return Err(GridError::NonFiniteCoordinate {
                    axis: name,
                    index,
                    value,
                });
            }
        }
        let mut sorted = values.clone();
        sorted.sort_by(f64::total_cmp);
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(GridError::DuplicateCoordinate {
                axis: name,
                value: pair[0].to_string(),
            });
        }
        Ok(Self {
            name,
            values: AxisValues::Numeric(values),
        })
    }

    pub fn categorical(
        name: impl Into<String>,
        values: Vec<QualifiedName>,
    ) -> Result<Self, GridError> {
        let name = name.into();
        if values.is_empty() {
            return Err(GridError::EmptyAxis { axis: name });
        }
        let mut sorted: Vec<&QualifiedName> = values.iter().collect();
        sorted.sort();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(GridError::DuplicateCoordinate {
                axis: name,
                value: pair[0].to_string(),
            });
        }
        Ok(Self {
            name,
            values: AxisValues::Categorical(values),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &AxisValues {
        &self.values
    }

    pub const fn kind(&self) -> AxisKind {
        self.values.kind()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn numeric_values(&self) -> Option<&[f64]> {
        match &self.values {
            AxisValues::Numeric(values) => Some(values),
            AxisValues::Categorical(_) => None,
        }
    }

    pub fn categorical_values(&self) -> Option<&[QualifiedName]> {
        match &self.values {
            AxisValues::Numeric(_) => None,
            AxisValues::Categorical(values) => Some(values),
        }
    }

    pub fn value(&self, index: usize) -> Option<AxisValue> {
        match &self.values {
            AxisValues::Numeric(values) => values.get(index).copied().map(AxisValue::Numeric),
            AxisValues::Categorical(values) => {
                values.get(index).cloned().map(AxisValue::Categorical)
            }
        }
    }

    /// Position of `value` on this axis. Numeric coordinates match exactly; a
    /// value of the other kind never matches.
    pub fn index_of(&self, value: &AxisValue) -> Option<usize> {
        match (&self.values, value) {
            (AxisValues::Numeric(values), AxisValue::Numeric(target)) => {
                values.iter().position(|candidate| candidate == target)
            }
            (AxisValues::Categorical(values), AxisValue::Categorical(target)) => {
                values.iter().position(|candidate| candidate == target)
            }
            _ => None,
        }
    }

    /// Quadrature weights used when this axis is integrated out.
    ///
    /// Numeric axes get composite-trapezoid weights: half the adjacent gap at
    /// the endpoints, half the sum of both gaps inside. Gaps are taken as
    /// absolute differences so descending axes still integrate to the covered
    /// range. A single-coordinate numeric axis has weight 1. Categorical axes
    /// have unit weights.
    pub fn integration_weights(&self) -> Vec<f64> {
        match &self.values {
            AxisValues::Categorical(values) => vec![1.0; values.len()],
            AxisValues::Numeric(values) if values.len() == 1 => vec![1.0],
            AxisValues::Numeric(values) => {
                let gaps: Vec<f64> = values
                    .windows(2)
                    .map(|pair| (pair[1] - pair[0]).abs())
                    .collect();
                (0..values.len())
                    .map(|index| {
                        let before = if index > 0 { gaps[index - 1] } else { 0.0 };
                        let after = gaps.get(index).copied().unwrap_or(0.0);
                        0.5 * (before + after)
                    })
                    .collect()
            }
        }
    }
}
