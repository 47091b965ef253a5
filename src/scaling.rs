//! Scaling exponent extraction: the log-log regression over the
//! (s, F(s)) table.

use log::warn;

use crate::errors::{FluctResult, FluctuationError};
use crate::math_utils::{float_ops, ols_regression};

/// A fitted scaling law `F(s) ~ s^H`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalingFit {
    /// Slope of ln F(s) on ln s: the (generalized) Hurst exponent.
    pub exponent: f64,
    /// Intercept of the log-log regression.
    pub intercept: f64,
    /// Standard error of the exponent.
    pub std_error: f64,
    /// Coefficient of determination of the log-log fit.
    pub r_squared: f64,
}

/// Fits the scaling exponent from an ordered (s, F(s)) table.
///
/// Scales must be strictly increasing. Entries whose fluctuation is
/// non-finite or non-positive are dropped with a logged warning before the
/// regression (the drop-and-warn policy for degenerate scales); at least 3
/// entries must survive.
///
/// Callers in the cross-correlation modes pass |F(s)|, since the signed
/// DCCA fluctuation has no logarithm.
pub fn fit_scaling_law(points: &[(usize, f64)]) -> FluctResult<ScalingFit> {
    for pair in points.windows(2) {
        if pair[1].0 <= pair[0].0 {
            return Err(FluctuationError::InvalidInput {
                reason: format!(
                    "scales must be strictly increasing, found {} after {}",
                    pair[1].0, pair[0].0
                ),
            });
        }
    }

    let mut log_s = Vec::with_capacity(points.len());
    let mut log_f = Vec::with_capacity(points.len());
    for &(scale, fluctuation) in points {
        match float_ops::safe_ln(fluctuation) {
            Some(log_val) => {
                log_s.push((scale as f64).ln());
                log_f.push(log_val);
            }
            None => {
                warn!(
                    "dropping degenerate fluctuation {} at scale {} from scaling fit",
                    fluctuation, scale
                );
            }
        }
    }

    if log_f.len() < 3 {
        return Err(FluctuationError::InsufficientData {
            required: 3,
            actual: log_f.len(),
        });
    }

    let fit = ols_regression(&log_s, &log_f)?;
    Ok(ScalingFit {
        exponent: fit.slope,
        intercept: fit.intercept,
        std_error: fit.std_error,
        r_squared: fit.r_squared,
    })
}
