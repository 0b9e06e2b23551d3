//! Small dense linear algebra for regression fitting
//!
//! Design matrices here have a handful of columns (intercept + exposure +
//! covariates), so plain Gaussian elimination with partial pivoting is
//! sufficient and keeps the crate free of LAPACK bindings. Singularity is
//! reported to the caller, never panicked on.

use ndarray::{Array1, Array2};

/// Pivots smaller than this are treated as singular
const PIVOT_EPS: f64 = 1e-12;

/// Solve `a x = b` for a square system, returning `None` if singular
#[must_use]
pub fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());
    debug_assert_eq!(n, b.len());

    let mut m = a.clone();
    let mut rhs = b.clone();

    for col in 0..n {
        // Partial pivot
        let pivot_row = (col..n)
            .max_by(|&i, &j| m[(i, col)].abs().total_cmp(&m[(j, col)].abs()))?;
        if m[(pivot_row, col)].abs() < PIVOT_EPS {
            return None;
        }
        if pivot_row != col {
            for k in 0..n {
                m.swap((col, k), (pivot_row, k));
            }
            rhs.swap(col, pivot_row);
        }

        for row in (col + 1)..n {
            let factor = m[(row, col)] / m[(col, col)];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[(row, k)] -= factor * m[(col, k)];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    // Back substitution
    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let mut sum = rhs[row];
        for k in (row + 1)..n {
            sum -= m[(row, k)] * x[k];
        }
        x[row] = sum / m[(row, row)];
    }
    Some(x)
}

/// Invert a square matrix via Gauss-Jordan, returning `None` if singular
#[must_use]
pub fn invert(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());

    let mut m = a.clone();
    let mut inv = Array2::eye(n);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| m[(i, col)].abs().total_cmp(&m[(j, col)].abs()))?;
        if m[(pivot_row, col)].abs() < PIVOT_EPS {
            return None;
        }
        if pivot_row != col {
            for k in 0..n {
                m.swap((col, k), (pivot_row, k));
                inv.swap((col, k), (pivot_row, k));
            }
        }

        let pivot = m[(col, col)];
        for k in 0..n {
            m[(col, k)] /= pivot;
            inv[(col, k)] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[(row, col)];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                m[(row, k)] -= factor * m[(col, k)];
                inv[(row, k)] -= factor * inv[(col, k)];
            }
        }
    }
    Some(inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn solves_simple_system() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![5.0, 10.0];
        let x = solve(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn singular_system_returns_none() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        assert!(solve(&a, &b).is_none());
        assert!(invert(&a).is_none());
    }

    #[test]
    fn inverse_times_original_is_identity() {
        let a = array![[4.0, 7.0], [2.0, 6.0]];
        let inv = invert(&a).unwrap();
        let prod = a.dot(&inv);
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((prod[(i, j)] - expected).abs() < 1e-12);
            }
        }
    }
}
