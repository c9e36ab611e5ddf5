pub mod interpolation;

pub use interpolation::{
    InterpolationError, InterpolationType, PiecewisePolynomial, interpolate, interpolate_columns,
};
