use super::LikelihoodError;
use crate::data_model::{LikelihoodGrid, ModelParameter, PdfGrid};
use crate::grid::{GridAxis, GridCoordinates, GridIter};

/// Reduces a likelihood grid onto a subset of its axes.
pub trait Marginalization: Send + Sync {
    fn marginalize(&self, grid: &LikelihoodGrid) -> Result<PdfGrid, LikelihoodError>;
}

/// Integrates the grid over every axis that is not kept.
///
/// Numeric axes use composite-trapezoid weights, categorical axes are summed;
/// weights of several integrated axes multiply. The result is not
/// normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumMarginalizationFunctor {
    kept_axes: Vec<usize>,
}

impl SumMarginalizationFunctor {
    pub fn new(axis: usize) -> Self {
        Self {
            kept_axes: vec![axis],
        }
    }

    pub fn keeping(axes: &[usize]) -> Self {
        Self {
            kept_axes: axes.to_vec(),
        }
    }

    pub fn for_parameter(parameter: ModelParameter) -> Self {
        Self::new(parameter.axis())
    }

    pub fn kept_axes(&self) -> &[usize] {
        &self.kept_axes
    }
}

impl Marginalization for SumMarginalizationFunctor {
    fn marginalize(&self, grid: &LikelihoodGrid) -> Result<PdfGrid, LikelihoodError> {
        let weights: Vec<Vec<f64>> = grid
            .axes()
            .iter()
            .map(GridAxis::integration_weights)
            .collect();
        reduce(grid, &self.kept_axes, 0.0, |total, coordinates, value| {
            let weight: f64 = coordinates
                .iter()
                .enumerate()
                .filter(|(axis, _)| !self.kept_axes.contains(axis))
                .map(|(axis, index)| weights[axis][*index])
                .product();
            total + value * weight
        })
    }
}

/// Keeps, for every coordinate of the kept axes, the maximum over all other
/// axes. The result is not normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxMarginalizationFunctor {
    kept_axes: Vec<usize>,
}

impl MaxMarginalizationFunctor {
    pub fn new(axis: usize) -> Self {
        Self {
            kept_axes: vec![axis],
        }
    }

    pub fn keeping(axes: &[usize]) -> Self {
        Self {
            kept_axes: axes.to_vec(),
        }
    }

    pub fn for_parameter(parameter: ModelParameter) -> Self {
        Self::new(parameter.axis())
    }
}

impl Marginalization for MaxMarginalizationFunctor {
    fn marginalize(&self, grid: &LikelihoodGrid) -> Result<PdfGrid, LikelihoodError> {
        reduce(grid, &self.kept_axes, f64::NEG_INFINITY, |best, _, value| {
            best.max(value)
        })
    }
}

/// For every cell of the reduced grid, folds the source cells that share its
/// kept coordinates.
fn reduce<F>(
    grid: &LikelihoodGrid,
    kept_axes: &[usize],
    initial: f64,
    fold: F,
) -> Result<PdfGrid, LikelihoodError>
where
    F: Fn(f64, &[usize], f64) -> f64,
{
    if kept_axes.is_empty() {
        return Err(LikelihoodError::NoKeptAxes);
    }
    let mut pdf = grid.rebuild::<Vec<f64>>(kept_axes)?;
    let targets: Vec<GridCoordinates> = (0..pdf.size())
        .filter_map(|flat| pdf.coordinates_of(flat))
        .collect();

    for (target, cell) in targets.iter().zip(pdf.cells_mut()) {
        let mut cells: GridIter<'_, f64> = grid.iter();
        for (axis, index) in kept_axes.iter().zip(target) {
            cells = cells.fix_axis_by_index(*axis, *index)?;
        }
        *cell = cells.fold(initial, |accumulated, (coordinates, value)| {
            fold(accumulated, &coordinates, *value)
        });
    }
    Ok(pdf)
}

/// Scales `pdf` to unit integral over its own axes, using the same quadrature
/// weights as the sum marginalization. Returns the integral before scaling;
/// a grid integrating to zero (or to a non-finite value) is left unchanged.
pub fn normalize_pdf(pdf: &mut PdfGrid) -> f64 {
    let weights: Vec<Vec<f64>> = pdf
        .axes()
        .iter()
        .map(GridAxis::integration_weights)
        .collect();
    let integral: f64 = pdf
        .iter()
        .map(|(coordinates, value)| {
            let weight: f64 = coordinates
                .iter()
                .enumerate()
                .map(|(axis, index)| weights[axis][*index])
                .product();
            value * weight
        })
        .sum();
    if integral > 0.0 && integral.is_finite() {
        for value in pdf.cells_mut() {
            *value /= integral;
        }
    }
    integral
}
