//! Profile construction: the cumulative sum of mean-centered samples that
//! the whole DFA family operates on.

use crate::errors::{validate_series, FluctResult};

/// Builds the integrated profile of a series.
///
/// `profile[i] = Σ_{k≤i} (x[k] - mean(x))`. The profile is computed once per
/// analysis call and shared read-only by every window worker.
///
/// # Errors
/// `InvalidInput` when the series has fewer than 2 samples or contains
/// non-finite values.
///
/// # Example
/// ```rust
/// use fractal_scaling::profile::build_profile;
///
/// let profile = build_profile(&[1.0, 2.0, 3.0]).unwrap();
/// // mean is 2, so deviations are -1, 0, 1
/// assert_eq!(profile, vec![-1.0, -1.0, 0.0]);
/// ```
pub fn build_profile(series: &[f64]) -> FluctResult<Vec<f64>> {
    validate_series(series, 2)?;

    let mean = series.iter().sum::<f64>() / series.len() as f64;
    let mut profile = Vec::with_capacity(series.len());
    let mut cumsum = 0.0;
    for &value in series {
        cumsum += value - mean;
        profile.push(cumsum);
    }

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FluctuationError;

    #[test]
    fn test_profile_first_difference_reconstructs_series() {
        let series = vec![0.3, -1.2, 2.5, 0.0, 4.4, -0.7];
        let mean = series.iter().sum::<f64>() / series.len() as f64;
        let profile = build_profile(&series).unwrap();

        // profile[0] = x[0] - mean, profile[i] - profile[i-1] = x[i] - mean
        assert!((profile[0] + mean - series[0]).abs() < 1e-12);
        for i in 1..series.len() {
            let reconstructed = profile[i] - profile[i - 1] + mean;
            assert!((reconstructed - series[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_profile_ends_near_zero() {
        // By construction the deviations sum to zero.
        let series: Vec<f64> = (0..100).map(|i| (i as f64 * 0.7).sin()).collect();
        let profile = build_profile(&series).unwrap();
        assert!(profile.last().unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_profile_rejects_short_or_nonfinite() {
        assert!(matches!(
            build_profile(&[1.0]),
            Err(FluctuationError::InvalidInput { .. })
        ));
        assert!(matches!(
            build_profile(&[1.0, f64::INFINITY]),
            Err(FluctuationError::InvalidInput { .. })
        ));
    }
}
