//! Dense linear algebra: LU factorization with partial pivoting.
//!
//! The Newton systems solved here are small (4·nCells square, a few hundred
//! rows), so a dense in-place factorization over `ndarray` keeps the
//! workspace free of LAPACK link requirements.

use ndarray::{Array1, Array2};

use crate::{Result, TensorError};

/// Relative pivot threshold below which the matrix is declared singular.
const PIVOT_RTOL: f64 = 1e-14;

/// Solves the dense system `a · x = b` by LU factorization with partial
/// pivoting.
///
/// `a` is copied and factorized in place; `b` is permuted and
/// back-substituted. Fails with [`TensorError::SingularMatrix`] when a
/// pivot falls below `PIVOT_RTOL` relative to the matrix magnitude, and
/// with [`TensorError::NonFinite`] when the inputs contain NaN/Inf.
pub fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return Err(TensorError::ShapeMismatch {
            expected: n,
            got: a.nrows().max(a.ncols()),
        });
    }
    if a.iter().any(|value| !value.is_finite()) {
        return Err(TensorError::NonFinite { context: "matrix" });
    }
    if b.iter().any(|value| !value.is_finite()) {
        return Err(TensorError::NonFinite {
            context: "right-hand side",
        });
    }

    let mut lu = a.clone();
    let mut x = b.clone();
    let scale = lu.iter().fold(0.0_f64, |acc, value| acc.max(value.abs()));
    let threshold = PIVOT_RTOL * scale.max(f64::MIN_POSITIVE);

    for column in 0..n {
        // Partial pivoting: bring the largest remaining entry up.
        let mut pivot_row = column;
        let mut pivot = lu[[column, column]].abs();
        for row in column + 1..n {
            let candidate = lu[[row, column]].abs();
            if candidate > pivot {
                pivot = candidate;
                pivot_row = row;
            }
        }
        if pivot <= threshold {
            return Err(TensorError::SingularMatrix { pivot, column });
        }
        if pivot_row != column {
            for k in 0..n {
                lu.swap([column, k], [pivot_row, k]);
            }
            x.swap(column, pivot_row);
        }

        let diagonal = lu[[column, column]];
        for row in column + 1..n {
            let factor = lu[[row, column]] / diagonal;
            lu[[row, column]] = factor;
            for k in column + 1..n {
                lu[[row, k]] -= factor * lu[[column, k]];
            }
            x[row] -= factor * x[column];
        }
    }

    // Back substitution.
    for row in (0..n).rev() {
        let mut sum = x[row];
        for k in row + 1..n {
            sum -= lu[[row, k]] * x[k];
        }
        x[row] = sum / lu[[row, row]];
    }

    Ok(x)
}
