//! Generic N-dimensional parameter grid.
//!
//! A grid is an ordered list of named axes plus one cell per coordinate
//! tuple, stored contiguously in row-major order (the last axis varies
//! fastest). Cell storage is delegated to a [`CellManager`].

mod axis;
mod container;
mod index;
mod iter;
mod storage;

pub use axis::{AxisKind, AxisValue, AxisValues, GridAxis};
pub use container::GridContainer;
pub use index::GridIndexHelper;
pub use iter::{GridIter, GridIterMut};
pub use storage::CellManager;

/// One index per axis, in axis declaration order.
pub type GridCoordinates = Vec<usize>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("axis '{axis}' must have at least one coordinate")]
    EmptyAxis { axis: String },
    #[error("axis '{axis}' has duplicate coordinate {value}")]
    DuplicateCoordinate { axis: String, value: String },
    #[error("axis '{axis}' coordinate {index} must be finite, got {value}")]
    NonFiniteCoordinate {
        axis: String,
        index: usize,
        value: f64,
    },
    #[error("invalid axis '{axis}': {reason}")]
    InvalidAxis { axis: String, reason: String },
    #[error("grid dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("grid of shape {shape:?} has more cells than can be addressed")]
    TooManyCells { shape: Vec<usize> },
}

impl GridError {
    pub(crate) fn invalid_axis(axis: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAxis {
            axis: axis.into(),
            reason: reason.into(),
        }
    }
}
