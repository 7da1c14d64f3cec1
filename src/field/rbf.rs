//! Radial-basis interpolation with a linear kernel.
//!
//! Fits an unnormalized interpolant `f(p) = Σ wᵢ · φ(|p − pᵢ|)` with
//! `φ(r) = r` over scattered control points by solving the dense symmetric
//! system `A w = z`, `Aᵢⱼ = |pᵢ − pⱼ|`. The surface passes through every
//! control point but is not range-bounded; callers clamp the evaluated
//! values afterwards.

use crate::error::{Error, Result};
use crate::field::Sample;

/// A fitted radial-basis interpolant over a fixed set of control points.
#[derive(Debug, Clone)]
pub struct RbfInterpolant {
    centers: Vec<(f64, f64)>,
    weights: Vec<f64>,
}

impl RbfInterpolant {
    /// Fit the interpolant through the given control points.
    ///
    /// Fails when the point set is empty or the system is numerically
    /// singular (duplicate control points collapse rows of the matrix).
    pub fn fit(samples: &[Sample]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::Interpolation(
                "cannot fit an interpolant with no control points".to_string(),
            ));
        }

        let n = samples.len();
        let centers: Vec<(f64, f64)> = samples.iter().map(|s| (s.x, s.y)).collect();

        let mut matrix = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                matrix[i * n + j] = distance(centers[i], centers[j]);
            }
        }
        let rhs: Vec<f64> = samples.iter().map(|s| s.z).collect();

        let weights = solve_dense(matrix, rhs, n)?;
        Ok(Self { centers, weights })
    }

    /// Evaluate the interpolant at one position.
    #[must_use]
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.centers
            .iter()
            .zip(&self.weights)
            .map(|(&c, &w)| w * distance((x, y), c))
            .sum()
    }

    /// Number of control points the fit went through.
    #[must_use]
    pub fn control_points(&self) -> usize {
        self.centers.len()
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx.hypot(dy)
}

/// Solve `A x = b` by Gaussian elimination with partial pivoting.
///
/// `matrix` is row-major `n × n` and consumed as scratch space.
fn solve_dense(mut matrix: Vec<f64>, mut rhs: Vec<f64>, n: usize) -> Result<Vec<f64>> {
    const PIVOT_EPS: f64 = 1e-12;

    for col in 0..n {
        // Pick the largest remaining pivot in this column.
        let mut pivot_row = col;
        let mut pivot_mag = matrix[col * n + col].abs();
        for row in col + 1..n {
            let mag = matrix[row * n + col].abs();
            if mag > pivot_mag {
                pivot_row = row;
                pivot_mag = mag;
            }
        }
        if pivot_mag < PIVOT_EPS {
            return Err(Error::Interpolation(
                "singular interpolation system; are any control points duplicated?".to_string(),
            ));
        }
        if pivot_row != col {
            for k in 0..n {
                matrix.swap(col * n + k, pivot_row * n + k);
            }
            rhs.swap(col, pivot_row);
        }

        for row in col + 1..n {
            let factor = matrix[row * n + col] / matrix[col * n + col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row * n + k] -= factor * matrix[col * n + k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    // Back substitution.
    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = rhs[row];
        for k in row + 1..n {
            sum -= matrix[row * n + k] * solution[k];
        }
        solution[row] = sum / matrix[row * n + row];
    }
    Ok(solution)
}
