//! The least-squares primitive used by the polynomial detrender.
//!
//! Fits `y = Σ a_k x^k` over a window's local coordinates via Householder
//! QR. Coordinates are mapped to [-1, 1] before the design matrix is built:
//! raw indices raised to high polynomial powers destroy the conditioning of
//! the system, so the rescaling is a correctness requirement rather than an
//! optimization. A condition estimate on the R diagonal rejects fits that
//! cannot be trusted.

use crate::errors::{FluctResult, FluctuationError};
use crate::math_utils::constants;

/// Maps local window index `i` of `0..n` onto [-1, 1].
#[inline]
pub fn local_coordinate(i: usize, n: usize) -> f64 {
    let center = (n - 1) as f64 / 2.0;
    let scale = if n > 1 { (n - 1) as f64 / 2.0 } else { 1.0 };
    (i as f64 - center) / scale
}

/// Fits a degree-`order` polynomial to `y` over local coordinates and
/// returns the residual vector `y - ŷ`.
///
/// # Errors
/// * `InsufficientData` when the window has fewer than `order + 1` samples
/// * `NumericalInstability` when the design matrix is ill-conditioned
pub fn fit_polynomial_residuals(y: &[f64], order: usize) -> FluctResult<Vec<f64>> {
    let n = y.len();
    if n < order + 1 {
        return Err(FluctuationError::InsufficientData {
            required: order + 1,
            actual: n,
        });
    }

    let cols = order + 1;
    // Row-major n x (order + 1) Vandermonde matrix on rescaled coordinates.
    let mut design = vec![0.0; n * cols];
    for i in 0..n {
        let x = local_coordinate(i, n);
        let mut power = 1.0;
        for j in 0..cols {
            design[i * cols + j] = power;
            power *= x;
        }
    }

    let coeffs = economy_qr_solve(&design, n, cols, y)?;

    let residuals = y
        .iter()
        .enumerate()
        .map(|(i, &yi)| {
            let x = local_coordinate(i, n);
            let mut fitted = 0.0;
            let mut power = 1.0;
            for &c in &coeffs {
                fitted += c * power;
                power *= x;
            }
            yi - fitted
        })
        .collect();

    Ok(residuals)
}

/// Solves the overdetermined system `A x = b` in the least-squares sense via
/// economy Householder QR.
///
/// `a` is row-major with `rows x cols`, `rows >= cols`. The ratio of the
/// largest to smallest diagonal entry of R serves as a cheap condition
/// estimate; systems beyond [`constants::CONDITION_LIMIT`] are rejected
/// with `NumericalInstability` instead of returning garbage coefficients.
pub fn economy_qr_solve(a: &[f64], rows: usize, cols: usize, b: &[f64]) -> FluctResult<Vec<f64>> {
    debug_assert_eq!(a.len(), rows * cols);

    if rows != b.len() {
        return Err(FluctuationError::NumericalInstability {
            message: format!(
                "matrix-vector dimension mismatch: {} rows vs {} entries",
                rows,
                b.len()
            ),
        });
    }
    if cols > rows {
        return Err(FluctuationError::InsufficientData {
            required: cols,
            actual: rows,
        });
    }

    let mut r = a.to_vec();
    let mut y = b.to_vec();

    // Frobenius norm for the rank tolerance.
    let matrix_norm = r.iter().map(|v| v * v).sum::<f64>().sqrt();
    let rank_tol = 100.0 * f64::EPSILON * (rows.max(cols) as f64) * matrix_norm.max(1.0);

    let steps = cols.min(rows.saturating_sub(1));
    for k in 0..steps {
        // Householder reflector for column k.
        let mut v: Vec<f64> = (k..rows).map(|i| r[i * cols + k]).collect();
        let norm_v = v.iter().map(|vi| vi * vi).sum::<f64>().sqrt();

        if norm_v < rank_tol {
            return Err(FluctuationError::NumericalInstability {
                message: format!("rank-deficient design matrix at column {}", k),
            });
        }

        let sign = if v[0] >= 0.0 { 1.0 } else { -1.0 };
        v[0] += sign * norm_v;

        let norm_v2 = v.iter().map(|vi| vi * vi).sum::<f64>().sqrt();
        if norm_v2 < rank_tol {
            continue;
        }
        for vi in &mut v {
            *vi /= norm_v2;
        }

        // Apply the reflector to the trailing columns of R.
        for j in k..cols {
            let mut dot = 0.0;
            for i in k..rows {
                dot += v[i - k] * r[i * cols + j];
            }
            for i in k..rows {
                r[i * cols + j] -= 2.0 * v[i - k] * dot;
            }
        }

        // Apply the same reflector to the right-hand side (Q^T b).
        let mut dot_y = 0.0;
        for i in k..rows {
            dot_y += v[i - k] * y[i];
        }
        for i in k..rows {
            y[i] -= 2.0 * v[i - k] * dot_y;
        }
    }

    // Condition estimate from the R diagonal before back-substitution.
    let mut diag_max = 0.0f64;
    let mut diag_min = f64::INFINITY;
    for i in 0..cols {
        let d = r[i * cols + i].abs();
        diag_max = diag_max.max(d);
        diag_min = diag_min.min(d);
    }
    if diag_min < rank_tol || diag_max / diag_min > constants::CONDITION_LIMIT {
        return Err(FluctuationError::NumericalInstability {
            message: format!(
                "ill-conditioned least-squares system: diagonal ratio {:.2e}",
                if diag_min > 0.0 {
                    diag_max / diag_min
                } else {
                    f64::INFINITY
                }
            ),
        });
    }

    // Back-substitution on R x = Q^T b.
    let mut x = vec![0.0; cols];
    for i in (0..cols).rev() {
        let mut sum = y[i];
        for j in i + 1..cols {
            sum -= r[i * cols + j] * x[j];
        }
        x[i] = sum / r[i * cols + i];
    }

    Ok(x)
}
