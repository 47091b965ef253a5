//! Detrended cross-correlation analysis between two synchronized series.
//!
//! Each series gets its own profile and its own per-window detrending; the
//! residuals are then combined through their covariance instead of a
//! variance. The covariance keeps its sign, so the DCCA fluctuation can be
//! negative, and the detrended cross-correlation coefficient ρ_DCCA(s)
//! relates it to the two single-series fluctuations at the same scale.

use log::warn;

use crate::detrend::{detrend_residuals, window_covariance};
use crate::errors::{validate_equal_lengths, validate_series, FluctResult, FluctuationError};
use crate::fluctuation::{aggregate_covariance_moments, Moment};
use crate::math_utils::constants;
use crate::multifractal::{legendre_spectrum, spread, MomentAnalysis, MultifractalConfig};
use crate::parallel::ordered_map;
use crate::profile::build_profile;
use crate::scaling::{fit_scaling_law, ScalingFit};
use crate::windows::partition_both;
use crate::dfa::{ScaleConfig, MIN_SERIES_LEN};

/// Result of a DCCA run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DccaAnalysis {
    /// Cross-correlation scaling exponent (slope of ln |F| on ln s).
    pub exponent: f64,
    /// Full log-log regression diagnostics.
    pub fit: ScalingFit,
    /// Signed fluctuation table (s, F_DCCA(s)); negative entries mean
    /// anti-correlated detrended residuals at that scale.
    pub fluctuations: Vec<(usize, f64)>,
    /// Detrended cross-correlation coefficient per scale, in [-1, 1].
    pub rho: Vec<(usize, f64)>,
}

/// Result of a multifractal DCCA run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MfdccaAnalysis {
    /// Per-q scaling results over the absolute detrended covariance.
    pub moments: Vec<MomentAnalysis>,
    /// Mass exponents τ(q) = q·H(q) − 1.
    pub mass_exponents: Vec<(f64, f64)>,
    /// Singularity spectrum (α, f(α)).
    pub singularity_spectrum: Vec<(f64, f64)>,
    /// Spread of the generalized exponents.
    pub multifractality_degree: f64,
    /// Spread of the Hölder exponents.
    pub spectrum_width: f64,
}

/// Per-scale detrending products for one window partition.
struct ScaleProducts {
    covariances: Vec<f64>,
    variances_a: Vec<f64>,
    variances_b: Vec<f64>,
}

/// Runs DCCA between two equal-length series.
///
/// Besides the cross scaling exponent, the result carries the per-scale
/// coefficient `ρ_DCCA(s) = F²_DCCA(s) / (F_A(s)·F_B(s))`. The coefficient
/// is bounded in [-1, 1] by construction; when floating-point drift pushes
/// it outside by more than 1e-9 a warning is logged, and the stored value
/// is clamped either way.
pub fn analyze_dcca(
    series_a: &[f64],
    series_b: &[f64],
    config: &ScaleConfig,
) -> FluctResult<DccaAnalysis> {
    validate_series(series_a, MIN_SERIES_LEN)?;
    validate_series(series_b, MIN_SERIES_LEN)?;
    validate_equal_lengths(series_a, series_b)?;
    let sizes = config.resolve_window_sizes(series_a.len())?;

    let profile_a = build_profile(series_a)?;
    let profile_b = build_profile(series_b)?;
    let order = config.polynomial_order;

    let per_scale = ordered_map(&sizes, |&scale| {
        scale_cross_products(&profile_a, &profile_b, scale, order)
            .map(|products| (scale, products))
    });

    let mut fluctuations = Vec::with_capacity(sizes.len());
    let mut rho = Vec::with_capacity(sizes.len());
    for result in per_scale {
        let (scale, products) = match result {
            Ok(pair) => pair,
            Err(err) => {
                warn!("dropping scale from DCCA: {}", err);
                continue;
            }
        };

        let count = products.covariances.len() as f64;
        let mean_cov = products.covariances.iter().sum::<f64>() / count;
        let mean_var_a = products.variances_a.iter().sum::<f64>() / count;
        let mean_var_b = products.variances_b.iter().sum::<f64>() / count;

        // F(s) = sign(mean cov) · sqrt(|mean cov|), the q = 2 sign rule.
        fluctuations.push((scale, mean_cov.signum() * mean_cov.abs().sqrt()));

        let denominator = (mean_var_a * mean_var_b).sqrt();
        if denominator < constants::MIN_VARIANCE {
            warn!(
                "skipping rho at scale {}: single-series fluctuation vanished",
                scale
            );
            continue;
        }
        let coefficient = mean_cov / denominator;
        if coefficient.abs() > 1.0 + constants::RHO_DRIFT_TOLERANCE {
            warn!(
                "rho_DCCA at scale {} drifted outside [-1, 1]: {}",
                scale, coefficient
            );
        }
        rho.push((scale, coefficient.clamp(-1.0, 1.0)));
    }

    // The signed fluctuation has no logarithm; the exponent is fitted on
    // magnitudes, zeros dropped by the estimator.
    let magnitude_table: Vec<(usize, f64)> = fluctuations
        .iter()
        .map(|&(s, f)| (s, f.abs()))
        .collect();
    let fit = fit_scaling_law(&magnitude_table)?;

    Ok(DccaAnalysis {
        exponent: fit.exponent,
        fit,
        fluctuations,
        rho,
    })
}

/// Runs multifractal DCCA over the configured moment orders.
///
/// Moments are taken over the absolute detrended covariance; the sign
/// convention of plain DCCA applies only at q = 2.
pub fn analyze_mfdcca(
    series_a: &[f64],
    series_b: &[f64],
    config: &MultifractalConfig,
) -> FluctResult<MfdccaAnalysis> {
    validate_series(series_a, MIN_SERIES_LEN)?;
    validate_series(series_b, MIN_SERIES_LEN)?;
    validate_equal_lengths(series_a, series_b)?;
    config.validate()?;
    let sizes = config.scale.resolve_window_sizes(series_a.len())?;

    let profile_a = build_profile(series_a)?;
    let profile_b = build_profile(series_b)?;
    let order = config.scale.polynomial_order;

    let per_scale: Vec<(usize, Vec<f64>)> = ordered_map(&sizes, |&scale| {
        (
            scale,
            collect_window_covariances(&profile_a, &profile_b, scale, order),
        )
    })
    .into_iter()
    .filter_map(|(scale, result)| match result {
        Ok(covariances) => Some((scale, covariances)),
        Err(err) => {
            warn!("dropping scale from MFDCCA: {}", err);
            None
        }
    })
    .collect();

    let moments: Vec<MomentAnalysis> = ordered_map(&config.q_values, |&q| {
        cross_moment_analysis(&per_scale, q)
    })
    .into_iter()
    .filter_map(|result| match result {
        Ok(m) => Some(m),
        Err(err) => {
            warn!("dropping moment order from MFDCCA: {}", err);
            None
        }
    })
    .collect();

    if moments.len() < 3 {
        return Err(FluctuationError::InsufficientData {
            required: 3,
            actual: moments.len(),
        });
    }

    let mass_exponents: Vec<(f64, f64)> = moments
        .iter()
        .map(|m| (m.q, m.q * m.fit.exponent - 1.0))
        .collect();
    let singularity_spectrum = legendre_spectrum(&mass_exponents);

    let exponents: Vec<f64> = moments.iter().map(|m| m.fit.exponent).collect();
    let alphas: Vec<f64> = singularity_spectrum.iter().map(|&(a, _)| a).collect();

    Ok(MfdccaAnalysis {
        moments,
        mass_exponents,
        singularity_spectrum,
        multifractality_degree: spread(&exponents),
        spectrum_width: spread(&alphas),
    })
}

/// Detrends both profiles over the pooled windows of one scale and collects
/// covariance plus both variances per window.
fn scale_cross_products(
    profile_a: &[f64],
    profile_b: &[f64],
    scale: usize,
    order: usize,
) -> FluctResult<ScaleProducts> {
    let windows = partition_both(profile_a.len(), scale);
    let mut products = ScaleProducts {
        covariances: Vec::with_capacity(windows.len()),
        variances_a: Vec::with_capacity(windows.len()),
        variances_b: Vec::with_capacity(windows.len()),
    };

    for window in windows {
        let a = &profile_a[window.clone()];
        let b = &profile_b[window];
        match window_products(a, b, order) {
            Ok((cov, var_a, var_b)) => {
                products.covariances.push(cov);
                products.variances_a.push(var_a);
                products.variances_b.push(var_b);
            }
            Err(err) => warn!("skipping window at scale {}: {}", scale, err),
        }
    }

    if products.covariances.is_empty() {
        return Err(FluctuationError::DegenerateWindow {
            scale,
            reason: "every window failed detrending".to_string(),
        });
    }

    Ok(products)
}

/// Detrends both windows once and derives covariance and both variances
/// from the residual vectors.
fn window_products(a: &[f64], b: &[f64], order: usize) -> FluctResult<(f64, f64, f64)> {
    let resid_a = detrend_residuals(a, order)?;
    let resid_b = detrend_residuals(b, order)?;
    let n = resid_a.len() as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (ra, rb) in resid_a.iter().zip(&resid_b) {
        cov += ra * rb;
        var_a += ra * ra;
        var_b += rb * rb;
    }

    Ok((cov / n, var_a / n, var_b / n))
}

/// Signed per-window covariances at one scale, for the moment stage.
fn collect_window_covariances(
    profile_a: &[f64],
    profile_b: &[f64],
    scale: usize,
    order: usize,
) -> FluctResult<Vec<f64>> {
    let windows = partition_both(profile_a.len(), scale);
    let mut covariances = Vec::with_capacity(windows.len());
    for window in windows {
        match window_covariance(&profile_a[window.clone()], &profile_b[window], order) {
            Ok(cov) => covariances.push(cov),
            Err(err) => warn!("skipping window at scale {}: {}", scale, err),
        }
    }

    if covariances.is_empty() {
        return Err(FluctuationError::DegenerateWindow {
            scale,
            reason: "every window failed detrending".to_string(),
        });
    }

    Ok(covariances)
}

/// Builds the cross fluctuation table and fit for one moment order.
fn cross_moment_analysis(
    per_scale: &[(usize, Vec<f64>)],
    q: f64,
) -> FluctResult<MomentAnalysis> {
    let moment = Moment::from_q(q);
    let mut fluctuations = Vec::with_capacity(per_scale.len());
    for (scale, covariances) in per_scale {
        match aggregate_covariance_moments(*scale, covariances, moment) {
            Ok(f) => fluctuations.push((*scale, f)),
            Err(err) => warn!("dropping scale for q = {}: {}", q, err),
        }
    }

    let fit = fit_scaling_law(&fluctuations)?;
    Ok(MomentAnalysis {
        q,
        fit,
        fluctuations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::analyze_dfa;

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
    fn test_dcca_rejects_mismatched_lengths() {
        let a = pseudo_noise(512, 1);
        let b = pseudo_noise(500, 2);
        assert!(matches!(
            analyze_dcca(&a, &b, &ScaleConfig::default()),
            Err(FluctuationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_dcca_of_series_with_itself_matches_dfa() {
        let series = pseudo_noise(1500, 3);
        let config = ScaleConfig::default();
        let dfa = analyze_dfa(&series, &config).unwrap();
        let dcca = analyze_dcca(&series, &series, &config).unwrap();

        assert_eq!(dfa.fluctuations.len(), dcca.fluctuations.len());
        for (&(s_dfa, f_dfa), &(s_dcca, f_dcca)) in
            dfa.fluctuations.iter().zip(&dcca.fluctuations)
        {
            assert_eq!(s_dfa, s_dcca);
            assert!(
                (f_dfa - f_dcca).abs() < 1e-10 * f_dfa.max(1.0),
                "self-DCCA diverged from DFA at scale {}: {} vs {}",
                s_dfa,
                f_dfa,
                f_dcca
            );
        }
        assert!((dfa.hurst_exponent - dcca.exponent).abs() < 1e-10);
    }

    #[test]
    fn test_rho_of_series_with_itself_is_one() {
        let series = pseudo_noise(1200, 4);
        let dcca = analyze_dcca(&series, &series, &ScaleConfig::default()).unwrap();
        assert!(!dcca.rho.is_empty());
        for &(scale, coefficient) in &dcca.rho {
            assert!(
                (coefficient - 1.0).abs() < 1e-9,
                "rho at scale {} should be 1, got {}",
                scale,
                coefficient
            );
        }
    }

    #[test]
    fn test_rho_of_negated_series_is_minus_one() {
        let series = pseudo_noise(1200, 5);
        let negated: Vec<f64> = series.iter().map(|&x| -x).collect();
        let dcca = analyze_dcca(&series, &negated, &ScaleConfig::default()).unwrap();
        for &(scale, coefficient) in &dcca.rho {
            assert!(
                (coefficient + 1.0).abs() < 1e-9,
                "rho at scale {} should be -1, got {}",
                scale,
                coefficient
            );
        }
        // Fully anti-correlated residuals give negative signed fluctuations.
        assert!(dcca.fluctuations.iter().all(|&(_, f)| f < 0.0));
    }

    #[test]
    fn test_mfdcca_of_series_with_itself_matches_mfdfa_at_q2() {
        let series = pseudo_noise(1500, 6);
        let config = MultifractalConfig {
            q_values: vec![-2.0, 0.0, 2.0],
            scale: ScaleConfig::default(),
        };
        let mfdcca = analyze_mfdcca(&series, &series, &config).unwrap();
        let dfa = analyze_dfa(&series, &config.scale).unwrap();

        let at_q2 = mfdcca
            .moments
            .iter()
            .find(|m| (m.q - 2.0).abs() < 1e-12)
            .unwrap();
        assert!((at_q2.fit.exponent - dfa.hurst_exponent).abs() < 1e-10);
    }
}
