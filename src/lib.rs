//! # Fractal Scaling Analysis
//!
//! Long-range correlation and multifractal scaling estimation for time
//! series via the detrended fluctuation analysis family of methods.
//!
//! This crate implements the numerical core shared by those methods:
//! profile construction, pooled forward/backward window partitioning,
//! per-window polynomial detrending on rescaled local coordinates,
//! q-th-order fluctuation aggregation including the singular q = 0 case,
//! and log-log scaling-exponent regression.
//!
//! ## Analysis modes
//!
//! - **DFA** ([`analyze_dfa`]): the classical Hurst exponent of one series.
//! - **MFDFA** ([`analyze_mfdfa`]): generalized Hurst exponents H(q), mass
//!   exponents τ(q), and the singularity spectrum (α, f(α)).
//! - **DCCA** ([`analyze_dcca`]): cross-correlation scaling between two
//!   synchronized series, with the ρ_DCCA(s) coefficient per scale.
//! - **MFDCCA** ([`analyze_mfdcca`]): the multifractal generalization of
//!   DCCA.
//! - **Local Hurst** ([`analyze_local_hurst`]): a sliding-window Hurst
//!   trajectory for time-varying persistence.
//!
//! ## Quick start
//!
//! ```rust
//! use fractal_scaling::{analyze_dfa, ScaleConfig};
//!
//! // A deterministic pseudo-random walkthrough: uncorrelated increments.
//! let mut state = 1u64;
//! let series: Vec<f64> = (0..4096)
//!     .map(|_| {
//!         state = state
//!             .wrapping_mul(6364136223846793005)
//!             .wrapping_add(1442695040888963407);
//!         (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
//!     })
//!     .collect();
//!
//! let analysis = analyze_dfa(&series, &ScaleConfig::default())?;
//! // White noise scales with a Hurst exponent near 0.5.
//! assert!((analysis.hurst_exponent - 0.5).abs() < 0.1);
//! # Ok::<(), fractal_scaling::FluctuationError>(())
//! ```
//!
//! ## Design
//!
//! Input series are borrowed read-only and never mutated; profiles and all
//! per-window intermediates are scoped to a single analysis call. Per-scale
//! and per-moment computations are independent and fan out across threads
//! when the `parallel` feature (default) is enabled; results are collected
//! in input order, so parallel runs match serial runs. Degenerate windows,
//! scales, and moment orders are dropped with a logged warning instead of
//! failing the whole call; a call only errors when its input is invalid or
//! too little data survives for the final regression.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cross_correlation;
pub mod detrend;
pub mod dfa;
pub mod errors;
pub mod fluctuation;
pub mod linear_algebra;
pub mod local_hurst;
pub mod math_utils;
pub mod multifractal;
pub mod parallel;
pub mod profile;
pub mod scaling;
pub mod windows;

pub use cross_correlation::{analyze_dcca, analyze_mfdcca, DccaAnalysis, MfdccaAnalysis};
pub use dfa::{analyze_dfa, DfaAnalysis, ScaleConfig, MIN_SERIES_LEN};
pub use errors::{FluctResult, FluctuationError};
pub use fluctuation::Moment;
pub use local_hurst::{analyze_local_hurst, LocalHurstAnalysis, LocalHurstConfig};
pub use multifractal::{
    analyze_mfdfa, generate_q_values, MfdfaAnalysis, MomentAnalysis, MultifractalConfig,
};
pub use profile::build_profile;
pub use scaling::ScalingFit;
pub use windows::Direction;
