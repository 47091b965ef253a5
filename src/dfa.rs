//! Detrended Fluctuation Analysis over a single series.
//!
//! The driver ties the pipeline together: profile construction, pooled
//! forward/backward window partitioning, per-window polynomial detrending,
//! RMS aggregation into the fluctuation function, and the log-log scaling
//! fit. Per-scale work is independent and fans out through the parallel
//! driver; degenerate scales are dropped with a logged warning rather than
//! failing the whole analysis.

use log::warn;

use crate::detrend::window_variance;
use crate::errors::{validate_series, validate_window_sizes, FluctResult, FluctuationError};
use crate::fluctuation::{aggregate_variances, Moment};
use crate::math_utils::generate_window_sizes;
use crate::parallel::ordered_map;
use crate::profile::build_profile;
use crate::scaling::{fit_scaling_law, ScalingFit};
use crate::windows::{partition_both, validate_window_size};

/// Minimum series length for a meaningful scaling analysis.
pub const MIN_SERIES_LEN: usize = 100;

/// Window-size grid and detrending order shared by all analysis modes.
///
/// Window sizes may be listed explicitly or generated geometrically from
/// `min_scale` up to `n / max_scale_factor`. Either way every size is
/// validated against the series length and polynomial order before any
/// computation starts.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleConfig {
    /// Explicit window sizes; when `None` a geometric grid is generated.
    pub window_sizes: Option<Vec<usize>>,
    /// Smallest generated window size.
    pub min_scale: usize,
    /// Largest generated window size is `n / max_scale_factor`.
    pub max_scale_factor: f64,
    /// Degree of the detrending polynomial.
    pub polynomial_order: usize,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            window_sizes: None,
            min_scale: 10,
            max_scale_factor: 4.0,
            polynomial_order: 1,
        }
    }
}

impl ScaleConfig {
    /// Resolves and validates the window-size grid for a series of length
    /// `n`.
    pub fn resolve_window_sizes(&self, n: usize) -> FluctResult<Vec<usize>> {
        if self.polynomial_order == 0 {
            return Err(FluctuationError::InvalidInput {
                reason: "polynomial order must be at least 1".to_string(),
            });
        }
        if !(self.max_scale_factor.is_finite() && self.max_scale_factor >= 4.0) {
            return Err(FluctuationError::InvalidInput {
                reason: format!(
                    "max_scale_factor {} must be finite and at least 4",
                    self.max_scale_factor
                ),
            });
        }

        let sizes = match &self.window_sizes {
            Some(list) => {
                validate_window_sizes(list)?;
                list.clone()
            }
            None => generate_window_sizes(n, self.min_scale, self.max_scale_factor),
        };

        for &s in &sizes {
            validate_window_size(n, s, self.polynomial_order)?;
        }

        Ok(sizes)
    }
}

/// Result of a single-series DFA run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DfaAnalysis {
    /// The estimated Hurst exponent (slope of the log-log fit).
    pub hurst_exponent: f64,
    /// Full log-log regression diagnostics.
    pub fit: ScalingFit,
    /// The (s, F(s)) table the exponent was fitted from.
    pub fluctuations: Vec<(usize, f64)>,
}

/// Runs DFA on a series and estimates its Hurst exponent.
///
/// # Errors
/// * `InvalidInput` for short/non-finite series or an unusable window grid
/// * `InsufficientData` when fewer than 3 scales survive aggregation
///
/// # Example
/// ```rust
/// use fractal_scaling::{analyze_dfa, ScaleConfig};
///
/// // Deterministic pseudo-noise: uncorrelated increments give H near 0.5.
/// let mut state = 42u64;
/// let series: Vec<f64> = (0..2000)
///     .map(|_| {
///         state = state
///             .wrapping_mul(6364136223846793005)
///             .wrapping_add(1442695040888963407);
///         (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
///     })
///     .collect();
///
/// let analysis = analyze_dfa(&series, &ScaleConfig::default()).unwrap();
/// assert!(analysis.hurst_exponent > 0.3 && analysis.hurst_exponent < 0.7);
/// ```
pub fn analyze_dfa(series: &[f64], config: &ScaleConfig) -> FluctResult<DfaAnalysis> {
    validate_series(series, MIN_SERIES_LEN)?;
    let sizes = config.resolve_window_sizes(series.len())?;
    let profile = build_profile(series)?;

    let per_scale = ordered_map(&sizes, |&scale| {
        scale_fluctuation(&profile, scale, config.polynomial_order, Moment::Standard(2.0))
            .map(|f| (scale, f))
    });

    let fluctuations: Vec<(usize, f64)> = per_scale
        .into_iter()
        .filter_map(|result| match result {
            Ok(pair) => Some(pair),
            Err(err) => {
                warn!("dropping scale from DFA: {}", err);
                None
            }
        })
        .collect();

    let fit = fit_scaling_law(&fluctuations)?;

    Ok(DfaAnalysis {
        hurst_exponent: fit.exponent,
        fit,
        fluctuations,
    })
}

/// Collects per-window residual variances at one scale, pooling the
/// forward and backward partitions.
///
/// Windows whose fit fails are excluded with a logged warning; the scale
/// only errors when nothing survives.
pub(crate) fn collect_window_variances(
    profile: &[f64],
    scale: usize,
    order: usize,
) -> FluctResult<Vec<f64>> {
    let windows = partition_both(profile.len(), scale);
    let mut variances = Vec::with_capacity(windows.len());
    for window in windows {
        match window_variance(&profile[window], order) {
            Ok(v) => variances.push(v),
            Err(err) => warn!("skipping window at scale {}: {}", scale, err),
        }
    }

    if variances.is_empty() {
        return Err(FluctuationError::DegenerateWindow {
            scale,
            reason: "every window failed detrending".to_string(),
        });
    }

    Ok(variances)
}

/// Fluctuation function at one scale for the given moment order.
pub(crate) fn scale_fluctuation(
    profile: &[f64],
    scale: usize,
    order: usize,
    moment: Moment,
) -> FluctResult<f64> {
    let variances = collect_window_variances(profile, scale, order)?;
    aggregate_variances(scale, &variances, moment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo_noise(len: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
            })
            .collect()
    }

    #[test]
    fn test_dfa_rejects_short_series() {
        let series = pseudo_noise(50, 1);
        assert!(matches!(
            analyze_dfa(&series, &ScaleConfig::default()),
            Err(FluctuationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_dfa_rejects_oversized_explicit_scale() {
        let series = pseudo_noise(400, 2);
        let config = ScaleConfig {
            window_sizes: Some(vec![10, 50, 200]),
            ..ScaleConfig::default()
        };
        assert!(matches!(
            analyze_dfa(&series, &config),
            Err(FluctuationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_dfa_rejects_order_zero() {
        let series = pseudo_noise(400, 3);
        let config = ScaleConfig {
            polynomial_order: 0,
            ..ScaleConfig::default()
        };
        assert!(analyze_dfa(&series, &config).is_err());
    }

    #[test]
    fn test_dfa_table_is_ordered_and_positive() {
        let series = pseudo_noise(2048, 4);
        let analysis = analyze_dfa(&series, &ScaleConfig::default()).unwrap();
        assert!(analysis.fluctuations.len() >= 3);
        assert!(analysis
            .fluctuations
            .windows(2)
            .all(|w| w[0].0 < w[1].0));
        assert!(analysis.fluctuations.iter().all(|&(_, f)| f > 0.0));
    }

    #[test]
    fn test_dfa_explicit_scales_are_respected() {
        let series = pseudo_noise(1024, 5);
        let config = ScaleConfig {
            window_sizes: Some(vec![16, 32, 64, 128, 256]),
            ..ScaleConfig::default()
        };
        let analysis = analyze_dfa(&series, &config).unwrap();
        let scales: Vec<usize> = analysis.fluctuations.iter().map(|&(s, _)| s).collect();
        assert_eq!(scales, vec![16, 32, 64, 128, 256]);
    }

    #[test]
    fn test_constant_series_fails_regression() {
        // Zero variance everywhere: every F(s) is zero, nothing survives
        // the log filter.
        let series = vec![1.0; 500];
        assert!(analyze_dfa(&series, &ScaleConfig::default()).is_err());
    }

    #[test]
    fn test_quadratic_order_runs() {
        let series = pseudo_noise(1024, 6);
        let config = ScaleConfig {
            polynomial_order: 2,
            ..ScaleConfig::default()
        };
        let analysis = analyze_dfa(&series, &config).unwrap();
        assert!(analysis.hurst_exponent.is_finite());
    }
}
