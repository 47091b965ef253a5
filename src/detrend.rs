//! Per-window polynomial detrending.
//!
//! Each window is fitted in its own local coordinate system mapped to
//! [-1, 1]. On a symmetric grid the odd power sums vanish, which keeps the
//! normal equations well conditioned; fitting against raw global indices
//! would lose precision once high powers of large indices enter the design
//! matrix. The detrender returns the residual variance `F²_ν(s) = RSS / s`
//! for single-series analysis, or the signed residual covariance for the
//! cross-correlation modes.

use nalgebra::{Matrix3, Vector3};

use crate::errors::{FluctResult, FluctuationError};
use crate::linear_algebra::{fit_polynomial_residuals, local_coordinate};

/// Residual variance of a window after removing a degree-`order` polynomial
/// trend.
///
/// Uses the biased n-divisor, the DFA convention. Dispatches on the order:
/// closed-form for the linear fit, 3x3 normal equations for the quadratic
/// fit, economy QR for anything higher.
pub fn window_variance(window: &[f64], order: usize) -> FluctResult<f64> {
    let residuals = detrend_residuals(window, order)?;
    let n = residuals.len() as f64;
    Ok(residuals.iter().map(|r| r * r).sum::<f64>() / n)
}

/// Signed residual covariance of two synchronized windows, each detrended
/// independently with the same order.
///
/// `cov = (1/s) Σ resid_a(i) · resid_b(i)`. Unlike the variance this may be
/// negative; the sign carries the direction of the cross-correlation and is
/// preserved through aggregation.
pub fn window_covariance(a: &[f64], b: &[f64], order: usize) -> FluctResult<f64> {
    debug_assert_eq!(a.len(), b.len());
    let resid_a = detrend_residuals(a, order)?;
    let resid_b = detrend_residuals(b, order)?;
    let n = resid_a.len() as f64;
    Ok(resid_a
        .iter()
        .zip(&resid_b)
        .map(|(ra, rb)| ra * rb)
        .sum::<f64>()
        / n)
}

/// Residual vector of a window after polynomial detrending in local
/// coordinates.
pub fn detrend_residuals(window: &[f64], order: usize) -> FluctResult<Vec<f64>> {
    let n = window.len();
    if order == 0 || n < order + 2 {
        return Err(FluctuationError::InvalidInput {
            reason: format!(
                "window of {} samples cannot be detrended at order {}",
                n, order
            ),
        });
    }

    match order {
        1 => Ok(linear_residuals(window)),
        2 => quadratic_residuals(window),
        _ => fit_polynomial_residuals(window, order),
    }
}

/// Closed-form linear detrending on the symmetric local grid.
///
/// With centered coordinates Σx = 0, so the slope reduces to Σxy / Σx² and
/// the intercept to the window mean.
fn linear_residuals(window: &[f64]) -> Vec<f64> {
    let n = window.len();
    let mean_y = window.iter().sum::<f64>() / n as f64;

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, &y) in window.iter().enumerate() {
        let x = local_coordinate(i, n);
        sum_xy += x * (y - mean_y);
        sum_xx += x * x;
    }

    let slope = sum_xy / sum_xx;
    window
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (mean_y + slope * local_coordinate(i, n)))
        .collect()
}

/// Quadratic detrending via 3x3 normal equations.
///
/// On the symmetric grid the odd power sums Σx and Σx³ are exactly zero,
/// so only Σx² and Σx⁴ are accumulated.
fn quadratic_residuals(window: &[f64]) -> FluctResult<Vec<f64>> {
    let n = window.len();
    let n_f64 = n as f64;

    let mut sum_x2 = 0.0;
    let mut sum_x4 = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2y = 0.0;
    for (i, &y) in window.iter().enumerate() {
        let x = local_coordinate(i, n);
        let x2 = x * x;
        sum_x2 += x2;
        sum_x4 += x2 * x2;
        sum_y += y;
        sum_xy += x * y;
        sum_x2y += x2 * y;
    }

    let a_matrix = Matrix3::new(
        n_f64, 0.0, sum_x2, //
        0.0, sum_x2, 0.0, //
        sum_x2, 0.0, sum_x4,
    );
    let b_vector = Vector3::new(sum_y, sum_xy, sum_x2y);

    let determinant = a_matrix.determinant().abs();
    if determinant < 1e-12 {
        return Err(FluctuationError::NumericalInstability {
            message: format!(
                "near-singular quadratic normal equations (det {:.2e}) for window of {} samples",
                determinant, n
            ),
        });
    }

    let coeffs = a_matrix
        .lu()
        .solve(&b_vector)
        .ok_or_else(|| FluctuationError::NumericalInstability {
            message: "quadratic normal equations could not be solved".to_string(),
        })?;

    let (c0, c1, c2) = (coeffs[0], coeffs[1], coeffs[2]);
    Ok(window
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let x = local_coordinate(i, n);
            y - (c0 + c1 * x + c2 * x * x)
        })
        .collect())
}
