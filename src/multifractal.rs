//! Multifractal DFA: q-th order fluctuation functions, generalized Hurst
//! exponents, and the singularity spectrum.
//!
//! The per-window variances are computed once per scale and then reused by
//! every moment order, so the expensive detrending stage fans out over
//! (scale x window) while the cheap aggregation stage fans out over q. Both
//! stages reduce in input order, keeping parallel runs identical to serial
//! ones.

use log::warn;

use crate::dfa::{collect_window_variances, ScaleConfig};
use crate::errors::{validate_series, FluctResult, FluctuationError};
use crate::fluctuation::{aggregate_variances, Moment};
use crate::parallel::ordered_map;
use crate::profile::build_profile;
use crate::scaling::{fit_scaling_law, ScalingFit};

/// Evenly spaced moment orders across `q_range`.
///
/// # Example
/// ```rust
/// use fractal_scaling::multifractal::generate_q_values;
///
/// let q = generate_q_values((-2.0, 2.0), 5);
/// assert_eq!(q, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
/// ```
pub fn generate_q_values(q_range: (f64, f64), num_values: usize) -> Vec<f64> {
    let (q_min, q_max) = q_range;
    if num_values < 2 {
        return vec![q_min];
    }
    (0..num_values)
        .map(|i| q_min + (q_max - q_min) * i as f64 / (num_values - 1) as f64)
        .collect()
}

/// Configuration shared by the multifractal modes (MFDFA and MFDCCA).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultifractalConfig {
    /// Moment orders, strictly increasing; may include negative values and
    /// zero.
    pub q_values: Vec<f64>,
    /// Window grid and detrending order.
    pub scale: ScaleConfig,
}

impl Default for MultifractalConfig {
    fn default() -> Self {
        Self {
            q_values: generate_q_values((-5.0, 5.0), 21),
            scale: ScaleConfig::default(),
        }
    }
}

impl MultifractalConfig {
    pub(crate) fn validate(&self) -> FluctResult<()> {
        if self.q_values.is_empty() {
            return Err(FluctuationError::InvalidInput {
                reason: "moment-order list is empty".to_string(),
            });
        }
        if !self.q_values.iter().all(|q| q.is_finite()) {
            return Err(FluctuationError::InvalidInput {
                reason: "moment orders must be finite".to_string(),
            });
        }
        for pair in self.q_values.windows(2) {
            if pair[1] <= pair[0] {
                return Err(FluctuationError::InvalidInput {
                    reason: format!(
                        "moment orders must be strictly increasing, found {} after {}",
                        pair[1], pair[0]
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Scaling behavior of one moment order.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MomentAnalysis {
    /// The moment order q.
    pub q: f64,
    /// Generalized Hurst exponent H(q) with regression diagnostics.
    pub fit: ScalingFit,
    /// The (s, F_q(s)) table behind the fit.
    pub fluctuations: Vec<(usize, f64)>,
}

/// Result of a multifractal DFA run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MfdfaAnalysis {
    /// Per-q scaling results, in the order the q values were requested
    /// (minus any dropped as degenerate).
    pub moments: Vec<MomentAnalysis>,
    /// Mass exponents τ(q) = q·H(q) − 1.
    pub mass_exponents: Vec<(f64, f64)>,
    /// Singularity spectrum (α, f(α)) from the Legendre transform of τ(q).
    pub singularity_spectrum: Vec<(f64, f64)>,
    /// Spread of the generalized Hurst exponents, max H(q) − min H(q).
    pub multifractality_degree: f64,
    /// Spread of the Hölder exponents, max α − min α.
    pub spectrum_width: f64,
}

/// Runs multifractal DFA over the configured moment orders.
///
/// Moment orders whose aggregation degenerates at too many scales are
/// dropped with a logged warning; the analysis fails with
/// `InsufficientData` when fewer than 3 orders survive, since the
/// singularity spectrum needs a usable τ(q) curve.
pub fn analyze_mfdfa(series: &[f64], config: &MultifractalConfig) -> FluctResult<MfdfaAnalysis> {
    validate_series(series, crate::dfa::MIN_SERIES_LEN)?;
    config.validate()?;
    let sizes = config.scale.resolve_window_sizes(series.len())?;
    let profile = build_profile(series)?;
    let order = config.scale.polynomial_order;

    // Detrending stage: per-window variances once per scale, shared by all
    // moment orders.
    let per_scale: Vec<(usize, Vec<f64>)> = ordered_map(&sizes, |&scale| {
        (scale, collect_window_variances(&profile, scale, order))
    })
    .into_iter()
    .filter_map(|(scale, result)| match result {
        Ok(variances) => Some((scale, variances)),
        Err(err) => {
            warn!("dropping scale from MFDFA: {}", err);
            None
        }
    })
    .collect();

    // Aggregation stage: fan out over moment orders.
    let moments: Vec<MomentAnalysis> = ordered_map(&config.q_values, |&q| {
        moment_analysis(&per_scale, q)
    })
    .into_iter()
    .filter_map(|result| match result {
        Ok(m) => Some(m),
        Err(err) => {
            warn!("dropping moment order from MFDFA: {}", err);
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
    let multifractality_degree = spread(&exponents);
    let alphas: Vec<f64> = singularity_spectrum.iter().map(|&(a, _)| a).collect();
    let spectrum_width = spread(&alphas);

    Ok(MfdfaAnalysis {
        moments,
        mass_exponents,
        singularity_spectrum,
        multifractality_degree,
        spectrum_width,
    })
}

/// Builds the F_q(s) table and scaling fit for one moment order.
fn moment_analysis(per_scale: &[(usize, Vec<f64>)], q: f64) -> FluctResult<MomentAnalysis> {
    let moment = Moment::from_q(q);
    let mut fluctuations = Vec::with_capacity(per_scale.len());
    for (scale, variances) in per_scale {
        match aggregate_variances(*scale, variances, moment) {
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

/// Legendre transform of the mass-exponent curve.
///
/// `α(q) = dτ/dq` by central differences over the interior points, and
/// `f(α) = q·α − τ(q)`. Output is sorted by α. The endpoints have no
/// two-sided derivative and are omitted, matching the usual treatment.
pub(crate) fn legendre_spectrum(mass_exponents: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if mass_exponents.len() < 3 {
        return Vec::new();
    }

    let mut spectrum: Vec<(f64, f64)> = Vec::with_capacity(mass_exponents.len() - 2);
    for i in 1..mass_exponents.len() - 1 {
        let (q_prev, tau_prev) = mass_exponents[i - 1];
        let (q_curr, tau_curr) = mass_exponents[i];
        let (q_next, tau_next) = mass_exponents[i + 1];

        let dq = q_next - q_prev;
        if dq.abs() < f64::EPSILON {
            continue;
        }
        let alpha = (tau_next - tau_prev) / dq;
        let f_alpha = q_curr * alpha - tau_curr;
        if alpha.is_finite() && f_alpha.is_finite() {
            spectrum.push((alpha, f_alpha));
        }
    }

    spectrum.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    spectrum
}

/// Max minus min, 0 for fewer than 2 values.
pub(crate) fn spread(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    max - min
}
