use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationType {
    #[default]
    Linear,
    CubicSpline,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterpolationError {
    #[error("interpolation requires at least 2 points, got {actual}")]
    TooFewPoints { actual: usize },
    #[error("interpolation input length mismatch: x={x}, y={y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("interpolation sample must be finite at index {index}, got ({x}, {y})")]
    NonFinite { index: usize, x: f64, y: f64 },
    #[error(
        "interpolation abscissae must be strictly increasing, index {index} has {current} after {previous}"
    )]
    NonIncreasing {
        index: usize,
        previous: f64,
        current: f64,
    },
}

/// Piecewise cubic polynomial over ascending knots.
///
/// Segment `i` covers `[knots[i], knots[i + 1]]` and evaluates
/// `c0 + c1*t + c2*t^2 + c3*t^3` with `t = x - knots[i]`. The function is zero
/// outside `[knots[0], knots[last]]`, which makes every sampled dataset
/// implicitly zero-padded for evaluation and integration.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewisePolynomial {
    knots: Vec<f64>,
    coefficients: Vec<[f64; 4]>,
}

impl PiecewisePolynomial {
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    pub fn value(&self, x: f64) -> f64 {
        let (min, max) = self.domain();
        if !(min..=max).contains(&x) {
            return 0.0;
        }
        let segment = self.segment_index(x);
        let t = x - self.knots[segment];
        let [c0, c1, c2, c3] = self.coefficients[segment];
        c0 + t * (c1 + t * (c2 + t * c3))
    }

    /// Definite integral over `[from, to]`; reversed bounds flip the sign.
    pub fn integrate(&self, from: f64, to: f64) -> f64 {
        if from > to {
            return -self.integrate(to, from);
        }
        let (min, max) = self.domain();
        let lower = from.max(min);
        let upper = to.min(max);
        if lower >= upper {
            return 0.0;
        }

        let first = self.segment_index(lower);
        let mut integral = 0.0;
        for segment in first..self.coefficients.len() {
            let start = self.knots[segment];
            let end = self.knots[segment + 1];
            if start >= upper {
                break;
            }
            let t0 = lower.max(start) - start;
            let t1 = upper.min(end) - start;
            integral += antiderivative(&self.coefficients[segment], t1)
                - antiderivative(&self.coefficients[segment], t0);
        }
        integral
    }

    fn segment_index(&self, x: f64) -> usize {
        let upper = self.knots.partition_point(|knot| *knot <= x);
        upper.saturating_sub(1).min(self.coefficients.len() - 1)
    }
}

fn antiderivative(coefficients: &[f64; 4], t: f64) -> f64 {
    let [c0, c1, c2, c3] = *coefficients;
    t * (c0 + t * (c1 / 2.0 + t * (c2 / 3.0 + t * c3 / 4.0)))
}

pub fn interpolate(
    points: &[(f64, f64)],
    kind: InterpolationType,
) -> Result<PiecewisePolynomial, InterpolationError> {
    validate_points(points)?;
    let knots: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
    let coefficients = match kind {
        InterpolationType::Linear => linear_coefficients(points),
        InterpolationType::CubicSpline => natural_spline_coefficients(points),
    };
    Ok(PiecewisePolynomial {
        knots,
        coefficients,
    })
}

pub fn interpolate_columns(
    xs: &[f64],
    ys: &[f64],
    kind: InterpolationType,
) -> Result<PiecewisePolynomial, InterpolationError> {
    if xs.len() != ys.len() {
        return Err(InterpolationError::LengthMismatch {
            x: xs.len(),
            y: ys.len(),
        });
    }
    let points: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
    interpolate(&points, kind)
}

fn validate_points(points: &[(f64, f64)]) -> Result<(), InterpolationError> {
    if points.len() < 2 {
        return Err(InterpolationError::TooFewPoints {
            actual: points.len(),
        });
    }
    for (index, (x, y)) in points.iter().copied().enumerate() {
        if !x.is_finite() || !y.is_finite() {
            return Err(InterpolationError::NonFinite { index, x, y });
        }
        if index > 0 {
            let previous = points[index - 1].0;
            if x <= previous {
                return Err(InterpolationError::NonIncreasing {
                    index,
                    previous,
                    current: x,
                });
            }
        }
    }
    Ok(())
}

fn linear_coefficients(points: &[(f64, f64)]) -> Vec<[f64; 4]> {
    points
        .windows(2)
        .map(|pair| {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            [y0, (y1 - y0) / (x1 - x0), 0.0, 0.0]
        })
        .collect()
}

/// Natural cubic spline (zero second derivative at both ends), second
/// derivatives solved with the tridiagonal sweep.
fn natural_spline_coefficients(points: &[(f64, f64)]) -> Vec<[f64; 4]> {
    let count = points.len();
    let steps: Vec<f64> = points.windows(2).map(|pair| pair[1].0 - pair[0].0).collect();
    let slopes: Vec<f64> = points
        .windows(2)
        .zip(&steps)
        .map(|(pair, step)| (pair[1].1 - pair[0].1) / step)
        .collect();

    let mut second = vec![0.0; count];
    if count > 2 {
        let interior = count - 2;
        let mut diagonal = vec![0.0; interior];
        let mut upper = vec![0.0; interior];
        let mut rhs = vec![0.0; interior];
        for row in 0..interior {
            let knot = row + 1;
            diagonal[row] = 2.0 * (steps[knot - 1] + steps[knot]);
            upper[row] = steps[knot];
            rhs[row] = 6.0 * (slopes[knot] - slopes[knot - 1]);
        }

        for row in 1..interior {
            let lower = steps[row];
            let factor = lower / diagonal[row - 1];
            diagonal[row] -= factor * upper[row - 1];
            rhs[row] -= factor * rhs[row - 1];
        }

        let mut solution = vec![0.0; interior];
        for row in (0..interior).rev() {
            let carried = if row + 1 < interior {
                upper[row] * solution[row + 1]
            } else {
                0.0
            };
            solution[row] = (rhs[row] - carried) / diagonal[row];
        }
        second[1..count - 1].copy_from_slice(&solution);
    }

    (0..count - 1)
        .map(|segment| {
            let step = steps[segment];
            let m0 = second[segment];
            let m1 = second[segment + 1];
            [
                points[segment].1,
                slopes[segment] - step * (2.0 * m0 + m1) / 6.0,
                m0 / 2.0,
                (m1 - m0) / (6.0 * step),
            ]
        })
        .collect()
}
