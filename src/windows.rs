//! Window partitioning for the detrending step.
//!
//! A profile of length `n` is cut into `⌊n/s⌋` non-overlapping windows of
//! exactly `s` samples. When `n` is not a multiple of `s` a single forward
//! scan discards the trailing remainder, so the partition is computed twice,
//! once anchored at the start and once at the end, and the two window sets
//! are pooled. This is the standard DFA convention for using all available
//! data; it doubles the effective window count.

use std::ops::Range;

use crate::errors::{FluctResult, FluctuationError};

/// Scan direction for a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Windows anchored at index 0.
    Forward,
    /// Windows aligned to the end of the profile.
    Backward,
}

/// Validates a window size against the profile length and detrending order.
///
/// * `s > n / 4` leaves fewer than 4 windows per direction, too few for the
///   fluctuation average to be statistically meaningful.
/// * `s < order + 2` cannot support a degree-`order` fit plus a residual
///   variance.
pub fn validate_window_size(n: usize, s: usize, order: usize) -> FluctResult<()> {
    if s < order + 2 {
        return Err(FluctuationError::InvalidInput {
            reason: format!(
                "window size {} cannot fit a degree-{} polynomial plus variance (need {})",
                s,
                order,
                order + 2
            ),
        });
    }
    if s > n / 4 {
        return Err(FluctuationError::InvalidInput {
            reason: format!(
                "window size {} exceeds n/4 = {} (too few windows for length {})",
                s,
                n / 4,
                n
            ),
        });
    }
    Ok(())
}

/// Partitions a profile of length `n` into `⌊n/s⌋` windows of exact size `s`
/// in the given direction.
///
/// Forward windows start at 0; backward windows are aligned so the last one
/// ends at `n`. Windows within one direction never overlap and never exceed
/// the profile bounds.
pub fn partition(n: usize, s: usize, direction: Direction) -> Vec<Range<usize>> {
    let count = n / s;
    let offset = match direction {
        Direction::Forward => 0,
        Direction::Backward => n - count * s,
    };
    (0..count)
        .map(|i| {
            let start = offset + i * s;
            start..start + s
        })
        .collect()
}

/// Pools the forward and backward partitions, yielding `2·⌊n/s⌋` windows.
///
/// When `s` divides `n` the two partitions coincide; they are still both
/// returned so the window count (and therefore the aggregation weight) does
/// not depend on divisibility.
pub fn partition_both(n: usize, s: usize) -> Vec<Range<usize>> {
    let mut windows = partition(n, s, Direction::Forward);
    windows.extend(partition(n, s, Direction::Backward));
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_partition_counts_and_bounds() {
        let windows = partition(103, 10, Direction::Forward);
        assert_eq!(windows.len(), 10);
        assert_eq!(windows[0], 0..10);
        assert_eq!(windows[9], 90..100);
        assert!(windows.iter().all(|w| w.end <= 103));
    }

    #[test]
    fn test_backward_partition_aligned_to_end() {
        let windows = partition(103, 10, Direction::Backward);
        assert_eq!(windows.len(), 10);
        assert_eq!(windows[0], 3..13);
        assert_eq!(windows[9], 93..103);
    }

    #[test]
    fn test_partitions_never_overlap_within_direction() {
        for &(n, s) in &[(100, 7), (257, 16), (1000, 33)] {
            for direction in [Direction::Forward, Direction::Backward] {
                let windows = partition(n, s, direction);
                assert_eq!(windows.len(), n / s);
                for pair in windows.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                    assert_eq!(pair[0].len(), s);
                }
            }
        }
    }

    #[test]
    fn test_pooled_partition_doubles_count() {
        let windows = partition_both(103, 10);
        assert_eq!(windows.len(), 20);
    }

    #[test]
    fn test_exact_division_keeps_both_scans() {
        let windows = partition_both(100, 10);
        assert_eq!(windows.len(), 20);
        assert_eq!(windows[0], windows[10]);
    }

    #[test]
    fn test_validate_window_size_limits() {
        assert!(validate_window_size(100, 10, 1).is_ok());
        assert!(validate_window_size(100, 25, 1).is_ok());
        // Above n/4
        assert!(validate_window_size(100, 26, 1).is_err());
        // Below order + 2
        assert!(validate_window_size(100, 3, 2).is_err());
        assert!(validate_window_size(100, 4, 2).is_ok());
    }
}
