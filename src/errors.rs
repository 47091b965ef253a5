//! Error types and input validation for scaling analysis.
//!
//! Every fallible operation in the engine returns one of the error kinds
//! defined here. Invalid inputs are rejected eagerly, before any computation
//! begins; per-window and per-moment degeneracies detected during aggregation
//! are recovered locally (drop-and-warn) and only surface as errors when too
//! little data survives for the final regression.

use thiserror::Error;

/// Error kinds for detrended fluctuation analysis operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FluctuationError {
    /// Input rejected before any computation: series too short, non-finite
    /// samples, mismatched lengths, or an unusable window/order combination.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What made the input unusable
        reason: String,
    },

    /// Fewer usable (s, F(s)) points survived filtering than the regression
    /// step requires.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points available
        actual: usize,
    },

    /// A window's fluctuation is zero or undefined for a moment order that
    /// requires a non-zero base (negative q, or the logarithm at q = 0).
    #[error("Degenerate window at scale {scale}: {reason}")]
    DegenerateWindow {
        /// Window size at which the degeneracy occurred
        scale: usize,
        /// What made the window degenerate
        reason: String,
    },

    /// The least-squares fit is ill-conditioned beyond the configured
    /// threshold; the result should not be trusted.
    #[error("Numerical instability: {message}")]
    NumericalInstability {
        /// Description of the instability
        message: String,
    },
}

/// Result type for scaling analysis operations.
pub type FluctResult<T> = Result<T, FluctuationError>;

/// Validates a time series before analysis.
///
/// Rejects series shorter than `min_len` and series containing NaN or
/// infinite samples. Called at the start of every analysis entry point so
/// that no partial results are ever produced from bad input.
///
/// # Example
/// ```rust
/// use fractal_scaling::errors::validate_series;
///
/// assert!(validate_series(&[1.0, 2.0, 3.0], 2).is_ok());
/// assert!(validate_series(&[1.0], 2).is_err());
/// assert!(validate_series(&[1.0, f64::NAN, 3.0], 2).is_err());
/// ```
pub fn validate_series(data: &[f64], min_len: usize) -> FluctResult<()> {
    if data.len() < min_len {
        return Err(FluctuationError::InvalidInput {
            reason: format!(
                "series has {} samples, need at least {}",
                data.len(),
                min_len
            ),
        });
    }

    if let Some((i, &value)) = data.iter().enumerate().find(|(_, &v)| !v.is_finite()) {
        let desc = if value.is_nan() {
            "NaN".to_string()
        } else {
            format!("{}", value)
        };
        return Err(FluctuationError::InvalidInput {
            reason: format!("non-finite sample at index {}: {}", i, desc),
        });
    }

    Ok(())
}

/// Validates that two series have equal length for cross-correlation modes.
///
/// # Example
/// ```rust
/// use fractal_scaling::errors::validate_equal_lengths;
///
/// assert!(validate_equal_lengths(&[1.0, 2.0], &[3.0, 4.0]).is_ok());
/// assert!(validate_equal_lengths(&[1.0, 2.0], &[3.0]).is_err());
/// ```
pub fn validate_equal_lengths(a: &[f64], b: &[f64]) -> FluctResult<()> {
    if a.len() != b.len() {
        return Err(FluctuationError::InvalidInput {
            reason: format!("series lengths differ: {} vs {}", a.len(), b.len()),
        });
    }
    Ok(())
}

/// Validates a window-size list: non-empty, every size at least 2, strictly
/// increasing.
///
/// The scaling regression assumes the (s, F(s)) table is ordered by scale;
/// duplicated or decreasing sizes would silently bias the log-log fit, so
/// they are rejected up front.
pub fn validate_window_sizes(sizes: &[usize]) -> FluctResult<()> {
    if sizes.is_empty() {
        return Err(FluctuationError::InvalidInput {
            reason: "window-size list is empty".to_string(),
        });
    }

    if sizes[0] < 2 {
        return Err(FluctuationError::InvalidInput {
            reason: format!("window size {} is below the minimum of 2", sizes[0]),
        });
    }

    for pair in sizes.windows(2) {
        if pair[1] <= pair[0] {
            return Err(FluctuationError::InvalidInput {
                reason: format!(
                    "window sizes must be strictly increasing, found {} after {}",
                    pair[1], pair[0]
                ),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_series_accepts_finite_data() {
        let data = vec![1.0, -2.5, 0.0, 1e10, 1e-10];
        assert!(validate_series(&data, 2).is_ok());
    }

    #[test]
    fn test_validate_series_rejects_short_data() {
        let result = validate_series(&[1.0], 2);
        match result {
            Err(FluctuationError::InvalidInput { reason }) => {
                assert!(reason.contains("1 samples"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_validate_series_rejects_nan() {
        let data = vec![1.0, f64::NAN, 3.0];
        let result = validate_series(&data, 2);
        match result {
            Err(FluctuationError::InvalidInput { reason }) => {
                assert!(reason.contains("index 1"));
                assert!(reason.contains("NaN"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_validate_series_rejects_infinity() {
        let data = vec![1.0, 2.0, f64::NEG_INFINITY];
        let result = validate_series(&data, 2);
        assert!(matches!(result, Err(FluctuationError::InvalidInput { .. })));
    }

    #[test]
    fn test_validate_equal_lengths_mismatch() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![1.0, 2.0];
        let result = validate_equal_lengths(&a, &b);
        match result {
            Err(FluctuationError::InvalidInput { reason }) => {
                assert!(reason.contains("3 vs 2"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_validate_window_sizes_ordering() {
        assert!(validate_window_sizes(&[4, 8, 16]).is_ok());
        assert!(validate_window_sizes(&[]).is_err());
        assert!(validate_window_sizes(&[1, 2]).is_err());
        assert!(validate_window_sizes(&[8, 8]).is_err());
        assert!(validate_window_sizes(&[16, 8]).is_err());
    }

    #[test]
    fn test_error_display_formatting() {
        let err = FluctuationError::InsufficientData {
            required: 3,
            actual: 1,
        };
        let text = format!("{}", err);
        assert!(text.contains("Insufficient data"));
        assert!(text.contains("3"));
        assert!(text.contains("1"));

        let err = FluctuationError::DegenerateWindow {
            scale: 16,
            reason: "zero fluctuation under negative q".to_string(),
        };
        let text = format!("{}", err);
        assert!(text.contains("scale 16"));
        assert!(text.contains("negative q"));
    }
}
