//! Time-varying Hurst exponent over a sliding sub-series.
//!
//! Each sub-window is treated as an independent short series and run
//! through the full DFA pipeline, producing a Hurst trajectory aligned to
//! the sub-window centers. The output is usually shorter than the input:
//! positions whose sub-window would cross the series boundary are never
//! produced, and sub-windows that degenerate are skipped with a logged
//! warning. Callers must consult the returned center indices instead of
//! assuming alignment with the raw series.

use log::warn;

use crate::dfa::{analyze_dfa, ScaleConfig, MIN_SERIES_LEN};
use crate::errors::{validate_series, FluctResult, FluctuationError};
use crate::parallel::ordered_map;

/// Configuration for the sliding-window Hurst estimator.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalHurstConfig {
    /// Length of each sub-series.
    pub window_length: usize,
    /// Stride between consecutive sub-window starts.
    pub step: usize,
    /// Scale grid applied inside each sub-series.
    pub scale: ScaleConfig,
}

impl Default for LocalHurstConfig {
    fn default() -> Self {
        Self {
            window_length: 256,
            step: 16,
            scale: ScaleConfig {
                min_scale: 8,
                ..ScaleConfig::default()
            },
        }
    }
}

/// A local Hurst trajectory.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalHurstAnalysis {
    /// Center index of each evaluated sub-window, in the coordinates of
    /// the input series.
    pub centers: Vec<usize>,
    /// Local Hurst exponent at each center, same length as `centers`.
    pub exponents: Vec<f64>,
}

/// Estimates a Hurst-exponent trajectory over overlapping sub-series.
///
/// # Errors
/// * `InvalidInput` when the series is shorter than one sub-window, the
///   step is zero, or the scale grid cannot fit the sub-window length
/// * `InsufficientData` when every sub-window degenerates
pub fn analyze_local_hurst(
    series: &[f64],
    config: &LocalHurstConfig,
) -> FluctResult<LocalHurstAnalysis> {
    validate_series(series, config.window_length.max(MIN_SERIES_LEN))?;
    if config.step == 0 {
        return Err(FluctuationError::InvalidInput {
            reason: "step must be at least 1".to_string(),
        });
    }
    if config.window_length < MIN_SERIES_LEN {
        return Err(FluctuationError::InvalidInput {
            reason: format!(
                "sub-window length {} is below the minimum of {}",
                config.window_length, MIN_SERIES_LEN
            ),
        });
    }
    // Fail fast if the scale grid cannot fit a sub-window, rather than
    // skipping every position.
    config.scale.resolve_window_sizes(config.window_length)?;

    let starts: Vec<usize> = (0..=series.len() - config.window_length)
        .step_by(config.step)
        .collect();

    let estimates = ordered_map(&starts, |&start| {
        let sub_series = &series[start..start + config.window_length];
        analyze_dfa(sub_series, &config.scale).map(|analysis| analysis.hurst_exponent)
    });

    let mut centers = Vec::with_capacity(starts.len());
    let mut exponents = Vec::with_capacity(starts.len());
    for (&start, result) in starts.iter().zip(estimates) {
        match result {
            Ok(h) => {
                centers.push(start + config.window_length / 2);
                exponents.push(h);
            }
            Err(err) => {
                warn!("skipping sub-window starting at {}: {}", start, err);
            }
        }
    }

    if centers.is_empty() {
        return Err(FluctuationError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    Ok(LocalHurstAnalysis { centers, exponents })
}
