//! Dense matrix kernel for the normal equations.
//!
//! Only the operations the regression engine needs: transpose, matrix
//! product, matrix-vector product and a Gaussian-elimination solver with
//! partial pivoting. Matrices are row-major `Vec<Vec<f64>>`.

use crate::error::{ForecastError, Result};
use log::trace;

/// Row-major dense matrix.
pub type Matrix = Vec<Vec<f64>>;

/// Pivots smaller than `PIVOT_TOLERANCE * max|A| * n` are treated as zero.
///
/// Rank-deficient Vandermonde systems (e.g. repeated x values) leave
/// round-off residue of this order instead of exact zeros.
pub const PIVOT_TOLERANCE: f64 = f64::EPSILON;

fn n_cols(a: &[Vec<f64>]) -> usize {
    a.first().map_or(0, Vec::len)
}

fn check_rectangular(a: &[Vec<f64>], what: &'static str) -> Result<usize> {
    let cols = n_cols(a);
    for row in a {
        if row.len() != cols {
            return Err(ForecastError::ShapeMismatch {
                what,
                expected: cols,
                got: row.len(),
            });
        }
    }
    Ok(cols)
}

/// Transpose an m×n matrix into n×m.
///
/// # Errors
/// `ShapeMismatch` if the rows differ in length.
pub fn transpose(a: &[Vec<f64>]) -> Result<Matrix> {
    let cols = check_rectangular(a, "transposed matrix rows")?;
    Ok((0..cols)
        .map(|j| a.iter().map(|row| row[j]).collect())
        .collect())
}

/// Matrix product `A · B`.
///
/// # Errors
/// `ShapeMismatch` if `cols(A) != rows(B)` or either matrix is ragged.
pub fn mat_mul(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<Matrix> {
    let inner = check_rectangular(a, "left matrix rows")?;
    let cols = check_rectangular(b, "right matrix rows")?;
    if inner != b.len() {
        return Err(ForecastError::ShapeMismatch {
            what: "matrix product inner dimension",
            expected: inner,
            got: b.len(),
        });
    }

    Ok(a.iter()
        .map(|row| {
            (0..cols)
                .map(|j| row.iter().zip(b).map(|(aik, b_row)| aik * b_row[j]).sum::<f64>())
                .collect()
        })
        .collect())
}

/// Matrix-vector product `A · v` (row-wise dot products).
///
/// # Errors
/// `ShapeMismatch` if any row of `A` differs in length from `v`.
pub fn mat_vec_mul(a: &[Vec<f64>], v: &[f64]) -> Result<Vec<f64>> {
    a.iter()
        .map(|row| {
            if row.len() != v.len() {
                return Err(ForecastError::ShapeMismatch {
                    what: "matrix-vector product",
                    expected: row.len(),
                    got: v.len(),
                });
            }
            Ok(row.iter().zip(v).map(|(x, y)| x * y).sum::<f64>())
        })
        .collect()
}

/// Solve `A x = b` for square `A` by Gaussian elimination with partial pivoting.
///
/// For each column the remaining row with the largest absolute entry is
/// swapped into pivot position, entries below are eliminated, and the
/// upper-triangular system is back-substituted.
///
/// # Errors
/// * `ShapeMismatch` if `A` is not square or `b` has the wrong length
/// * `SingularMatrix` if a pivot falls below the relative tolerance
pub fn solve_linear_system(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = a.len();
    for row in a {
        if row.len() != n {
            return Err(ForecastError::ShapeMismatch {
                what: "square system matrix",
                expected: n,
                got: row.len(),
            });
        }
    }
    if b.len() != n {
        return Err(ForecastError::ShapeMismatch {
            what: "right-hand side",
            expected: n,
            got: b.len(),
        });
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    let scale = a
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(f64::MIN_POSITIVE);
    let tolerance = PIVOT_TOLERANCE * scale * n as f64;

    // Augmented matrix [A | b]
    let mut aug: Matrix = a
        .iter()
        .zip(b)
        .map(|(row, &bi)| {
            let mut r = row.clone();
            r.push(bi);
            r
        })
        .collect();

    for col in 0..n {
        let max_row = (col..n)
            .max_by(|&i, &j| aug[i][col].abs().total_cmp(&aug[j][col].abs()))
            .unwrap_or(col);
        aug.swap(col, max_row);

        let pivot = aug[col][col];
        trace!("column {col}: pivot row {max_row}, pivot {pivot:e}");
        if !pivot.is_finite() || pivot.abs() <= tolerance {
            return Err(ForecastError::SingularMatrix { column: col });
        }

        for row in (col + 1)..n {
            let factor = aug[row][col] / pivot;
            for j in col..=n {
                aug[row][j] -= factor * aug[col][j];
            }
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| aug[i][j] * x[j]).sum();
        x[i] = (aug[i][n] - tail) / aug[i][i];
    }

    if let Some(col) = x.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::SingularMatrix { column: col });
    }

    Ok(x)
}
