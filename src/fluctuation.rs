//! Aggregation of per-window detrending results into fluctuation functions.
//!
//! The q-th order fluctuation function generalizes the plain RMS average of
//! window variances. The moment order is a tagged variant rather than a bare
//! float because q = 0 is not a limit the power-mean formula can reach by
//! division; it has its own log-mean-exp form and its own degeneracy rules.

use crate::errors::{FluctResult, FluctuationError};
use crate::math_utils::float_ops;

/// Moment order for fluctuation aggregation.
///
/// `Standard(2.0)` reproduces plain DFA; negative orders emphasize small
/// fluctuations and positive orders large ones.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Moment {
    /// The singular q = 0 case, aggregated as a geometric mean.
    Zero,
    /// Any non-zero order q.
    Standard(f64),
}

impl Moment {
    /// Classifies a raw q value, mapping anything within epsilon of zero to
    /// the singular variant.
    pub fn from_q(q: f64) -> Self {
        if float_ops::approx_zero(q) {
            Moment::Zero
        } else {
            Moment::Standard(q)
        }
    }

    /// The numeric order this moment represents.
    pub fn q(&self) -> f64 {
        match self {
            Moment::Zero => 0.0,
            Moment::Standard(q) => *q,
        }
    }
}

/// Aggregates per-window squared fluctuations `F²_ν(s)` into `F_q(s)`.
///
/// * q ≠ 0: `F_q(s) = ((1/N) Σ (F²_ν)^(q/2))^(1/q)`
/// * q = 0: `F_0(s) = exp((1/(2N)) Σ ln F²_ν)`
///
/// The q = 0 form is the geometric mean of the per-window fluctuations; when
/// every window carries the same fluctuation f, `F_0(s) = f` exactly.
///
/// # Errors
/// * `DegenerateWindow` when a window's `F²_ν` is zero under q < 0 or q = 0
/// * `NumericalInstability` when the moment sum overflows
pub fn aggregate_variances(scale: usize, variances: &[f64], moment: Moment) -> FluctResult<f64> {
    if variances.is_empty() {
        return Err(FluctuationError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    match moment {
        Moment::Zero => {
            let mut log_sum = 0.0;
            for &v in variances {
                match float_ops::safe_ln(v) {
                    Some(log_v) => log_sum += log_v,
                    None => {
                        return Err(FluctuationError::DegenerateWindow {
                            scale,
                            reason: "zero fluctuation has no logarithm at q = 0".to_string(),
                        })
                    }
                }
            }
            Ok((log_sum / (2.0 * variances.len() as f64)).exp())
        }
        Moment::Standard(q) => {
            if q < 0.0 && variances.iter().any(|&v| v <= 0.0) {
                return Err(FluctuationError::DegenerateWindow {
                    scale,
                    reason: format!("zero fluctuation cannot be raised to q = {}", q),
                });
            }

            let moment_sum: f64 = variances.iter().map(|&v| v.powf(q / 2.0)).sum();
            if !moment_sum.is_finite() {
                return Err(FluctuationError::NumericalInstability {
                    message: format!("moment sum overflow at scale {} for q = {}", scale, q),
                });
            }

            let avg = moment_sum / variances.len() as f64;
            if avg <= 0.0 {
                return Err(FluctuationError::DegenerateWindow {
                    scale,
                    reason: format!("non-positive moment average for q = {}", q),
                });
            }

            let fq = avg.powf(1.0 / q);
            if fq.is_finite() {
                Ok(fq)
            } else {
                Err(FluctuationError::NumericalInstability {
                    message: format!("fluctuation overflow at scale {} for q = {}", scale, q),
                })
            }
        }
    }
}

/// Aggregates signed per-window covariances into the DCCA fluctuation at
/// q = 2, preserving the sign of the mean covariance:
/// `F(s) = sign(mean) · √|mean|`.
pub fn aggregate_covariances_signed(scale: usize, covariances: &[f64]) -> FluctResult<f64> {
    if covariances.is_empty() {
        return Err(FluctuationError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    let mean = covariances.iter().sum::<f64>() / covariances.len() as f64;
    if !mean.is_finite() {
        return Err(FluctuationError::NumericalInstability {
            message: format!("covariance mean overflow at scale {}", scale),
        });
    }

    Ok(mean.signum() * mean.abs().sqrt())
}

/// Aggregates per-window covariances into the q-th order MFDCCA
/// fluctuation using the absolute covariance as the moment base.
///
/// Fractional powers of a signed quantity are undefined, so the
/// multifractal cross-correlation moments follow the |cov| convention; the
/// signed behavior is retained only in the plain DCCA aggregation above.
pub fn aggregate_covariance_moments(
    scale: usize,
    covariances: &[f64],
    moment: Moment,
) -> FluctResult<f64> {
    let absolute: Vec<f64> = covariances.iter().map(|c| c.abs()).collect();
    aggregate_variances(scale, &absolute, moment)
}
