//! Deterministic data-parallel fan-out.
//!
//! Every analysis mode fans out over independent units of work: window
//! sizes for DFA and DCCA, moment orders for the multifractal variants,
//! sub-window positions for the local Hurst trajectory. Each unit writes
//! exactly one slot of the output, collected in input order, so a parallel
//! run reduces in the same order as the serial fallback and produces the
//! same floating-point result. No locks are taken during the fan-out; the
//! shared profile is read-only.
//!
//! Parallel execution is gated behind the `parallel` cargo feature
//! (enabled by default) and falls back to a plain serial map without it.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Maps `op` over `items`, preserving input order in the output.
#[cfg(feature = "parallel")]
pub fn ordered_map<T, R, F>(items: &[T], op: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    items.par_iter().map(op).collect()
}

/// Maps `op` over `items`, preserving input order in the output.
#[cfg(not(feature = "parallel"))]
pub fn ordered_map<T, R, F>(items: &[T], op: F) -> Vec<R>
where
    F: Fn(&T) -> R,
{
    items.iter().map(op).collect()
}
