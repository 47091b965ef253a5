//! Shared mathematical utilities: safe floating-point operations, ordinary
//! least squares, and window-size grid generation.

use crate::errors::{FluctResult, FluctuationError};

/// Numerical constants shared across the engine.
pub mod constants {
    /// Variance below this is treated as zero.
    pub const MIN_VARIANCE: f64 = 1e-12;

    /// Epsilon for approximate floating-point comparisons.
    pub const DEFAULT_EPSILON: f64 = 1e-10;

    /// Condition-number estimate above this fails the polynomial fit.
    pub const CONDITION_LIMIT: f64 = 1e12;

    /// ρ_DCCA may drift outside [-1, 1] by at most this before a warning
    /// is logged.
    pub const RHO_DRIFT_TOLERANCE: f64 = 1e-9;
}

/// Safe arithmetic operations that surface domain violations as `None`
/// instead of NaN or infinities.
pub mod float_ops {
    use super::constants;

    /// Division returning `None` for a zero denominator or non-finite result.
    pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
        if denominator.abs() < constants::MIN_VARIANCE {
            return None;
        }
        let result = numerator / denominator;
        result.is_finite().then_some(result)
    }

    /// Natural logarithm returning `None` for non-positive arguments.
    pub fn safe_ln(x: f64) -> Option<f64> {
        if x > 0.0 && x.is_finite() {
            Some(x.ln())
        } else {
            None
        }
    }

    /// Square root returning `None` for negative arguments.
    pub fn safe_sqrt(x: f64) -> Option<f64> {
        if x >= 0.0 && x.is_finite() {
            Some(x.sqrt())
        } else {
            None
        }
    }

    /// True when `x` is within the default epsilon of zero.
    pub fn approx_zero(x: f64) -> bool {
        x.abs() < constants::DEFAULT_EPSILON
    }

    /// True when `a` and `b` differ by less than `eps`.
    pub fn approx_eq_eps(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }
}

/// Ordinary least-squares fit of `y` on `x`.
#[derive(Debug, Clone)]
pub struct RegressionFit {
    /// Estimated slope
    pub slope: f64,
    /// Estimated intercept
    pub intercept: f64,
    /// Standard error of the slope
    pub std_error: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Residuals y - ŷ
    pub residuals: Vec<f64>,
}

/// Simple linear regression with centering for numerical stability.
///
/// Centering both variables before forming the cross products prevents
/// catastrophic cancellation when x values are large with small variance,
/// which is exactly the situation for log-scale regressors.
///
/// # Errors
/// * `InsufficientData` for fewer than 3 points
/// * `NumericalInstability` for a (near-)constant predictor
///
/// # Example
/// ```rust
/// use fractal_scaling::math_utils::ols_regression;
///
/// let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
/// let fit = ols_regression(&x, &y).unwrap();
/// assert!((fit.slope - 2.0).abs() < 1e-12);
/// assert!(fit.intercept.abs() < 1e-12);
/// ```
pub fn ols_regression(x: &[f64], y: &[f64]) -> FluctResult<RegressionFit> {
    if x.len() != y.len() || x.len() < 3 {
        return Err(FluctuationError::InsufficientData {
            required: 3,
            actual: x.len().min(y.len()),
        });
    }

    if !x.iter().all(|v| v.is_finite()) || !y.iter().all(|v| v.is_finite()) {
        return Err(FluctuationError::NumericalInstability {
            message: "non-finite values in regression data".to_string(),
        });
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let sxx: f64 = x
        .iter()
        .map(|xi| {
            let c = xi - mean_x;
            c * c
        })
        .sum();

    if sxx < constants::MIN_VARIANCE {
        return Err(FluctuationError::NumericalInstability {
            message: format!(
                "predictor variance too small for regression: {:.2e}",
                sxx / n
            ),
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    if !slope.is_finite() || !intercept.is_finite() {
        return Err(FluctuationError::NumericalInstability {
            message: "non-finite regression coefficients".to_string(),
        });
    }

    let residuals: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| yi - (slope * xi + intercept))
        .collect();

    let rss: f64 = residuals.iter().map(|r| r * r).sum();
    let tss: f64 = y.iter().map(|yi| (yi - mean_y) * (yi - mean_y)).sum();

    let mse = rss / (n - 2.0);
    let std_error = (mse / sxx).sqrt();
    let r_squared = if tss > constants::MIN_VARIANCE {
        (1.0 - rss / tss).clamp(0.0, 1.0)
    } else {
        1.0
    };

    Ok(RegressionFit {
        slope,
        intercept,
        std_error,
        r_squared,
        residuals,
    })
}

/// Generates a geometric grid of window sizes from `min_size` up to
/// `n / max_size_factor`.
///
/// Uses a growth factor of 1.1 and deduplicates after rounding, so adjacent
/// sizes never collide. Matches the conventional DFA scale grid where
/// sizes span roughly an order of magnitude below n/4.
///
/// # Example
/// ```rust
/// use fractal_scaling::math_utils::generate_window_sizes;
///
/// let sizes = generate_window_sizes(1000, 10, 4.0);
/// assert_eq!(sizes.first(), Some(&10));
/// assert!(*sizes.last().unwrap() <= 250);
/// assert!(sizes.windows(2).all(|w| w[0] < w[1]));
/// ```
pub fn generate_window_sizes(n: usize, min_size: usize, max_size_factor: f64) -> Vec<usize> {
    const GROWTH_FACTOR: f64 = 1.1;
    const MAX_ITERATIONS: usize = 1000;

    let max_size = (n as f64) / max_size_factor;
    let mut sizes = Vec::new();
    let mut current = min_size as f64;
    let mut iterations = 0;

    while current <= max_size && iterations < MAX_ITERATIONS {
        let size = current.round() as usize;
        if sizes.last().map_or(true, |&last| size > last) {
            sizes.push(size);
        }
        current *= GROWTH_FACTOR;
        iterations += 1;
    }

    if sizes.is_empty() {
        sizes.push(min_size);
    }

    sizes
}

/// Population variance (n divisor, the DFA convention).
pub fn calculate_variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div_rejects_zero_denominator() {
        assert_eq!(float_ops::safe_div(1.0, 0.0), None);
        assert_eq!(float_ops::safe_div(6.0, 2.0), Some(3.0));
    }

    #[test]
    fn test_safe_ln_domain() {
        assert!(float_ops::safe_ln(1.0).unwrap().abs() < 1e-15);
        assert_eq!(float_ops::safe_ln(0.0), None);
        assert_eq!(float_ops::safe_ln(-1.0), None);
    }

    #[test]
    fn test_ols_recovers_exact_line() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|xi| 3.0 * xi - 1.5).collect();
        let fit = ols_regression(&x, &y).unwrap();
        assert!((fit.slope - 3.0).abs() < 1e-12);
        assert!((fit.intercept + 1.5).abs() < 1e-12);
        assert!(fit.r_squared > 0.999999);
        assert!(fit.residuals.iter().all(|r| r.abs() < 1e-10));
    }

    #[test]
    fn test_ols_rejects_constant_predictor() {
        let x = vec![2.0; 5];
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(matches!(
            ols_regression(&x, &y),
            Err(FluctuationError::NumericalInstability { .. })
        ));
    }

    #[test]
    fn test_ols_large_offset_stability() {
        // Large x offset with small spread would lose precision without
        // centering.
        let x: Vec<f64> = (0..20).map(|i| 1e9 + i as f64).collect();
        let y: Vec<f64> = x.iter().map(|xi| 0.5 * xi + 7.0).collect();
        let fit = ols_regression(&x, &y).unwrap();
        assert!((fit.slope - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_generate_window_sizes_bounds() {
        let sizes = generate_window_sizes(4000, 10, 4.0);
        assert_eq!(sizes[0], 10);
        assert!(*sizes.last().unwrap() <= 1000);
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_generate_window_sizes_degenerate_range() {
        // min_size above n / factor still yields one size
        let sizes = generate_window_sizes(20, 10, 4.0);
        assert_eq!(sizes, vec![10]);
    }

    #[test]
    fn test_variance_of_constant_is_zero() {
        assert!(calculate_variance(&[3.0; 8]) < 1e-15);
        let v = calculate_variance(&[1.0, -1.0, 1.0, -1.0]);
        assert!((v - 1.0).abs() < 1e-12);
    }
}
