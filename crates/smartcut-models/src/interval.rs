//! Time intervals and interval algebra.
//!
//! All intervals are expressed in seconds on the *original* source timeline,
//! never on an already-cut timeline. Intervals are immutable once built;
//! the operations here produce new intervals instead of mutating in place.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A half-open time range `[start, end)` in seconds with `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimeInterval {
    /// Start time in seconds (>= 0).
    pub start: f64,
    /// End time in seconds (> start).
    pub end: f64,
}

impl TimeInterval {
    /// Build an interval, rejecting malformed pairs.
    ///
    /// Returns `None` when `start` is negative, either bound is non-finite,
    /// or the interval has non-positive length.
    pub fn new(start: f64, end: f64) -> Option<Self> {
        if !start.is_finite() || !end.is_finite() {
            return None;
        }
        if start < 0.0 || end <= start {
            return None;
        }
        Some(Self { start, end })
    }

    /// Length of the interval in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Intersect with `[lo, hi]`, returning `None` when the intersection is
    /// empty or has non-positive length.
    pub fn clamp(&self, lo: f64, hi: f64) -> Option<Self> {
        let start = self.start.max(lo);
        let end = self.end.min(hi);
        TimeInterval::new(start, end)
    }
}

/// Merge intervals into a disjoint, ascending set.
///
/// Sorts by start (ties broken by ascending end, which stabilizes output but
/// is irrelevant to correctness), then sweeps, coalescing any interval that
/// touches or overlaps the previous one.
pub fn merge(mut intervals: Vec<TimeInterval>) -> Vec<TimeInterval> {
    if intervals.is_empty() {
        return intervals;
    }

    intervals.sort_by(|a, b| {
        a.start
            .total_cmp(&b.start)
            .then_with(|| a.end.total_cmp(&b.end))
    });

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        match merged.last_mut() {
            Some(prev) if iv.start <= prev.end => {
                if iv.end > prev.end {
                    prev.end = iv.end;
                }
            }
            _ => merged.push(iv),
        }
    }

    merged
}

/// Complement a merged, ascending set of intervals against `[0, total]`.
///
/// Emits the gaps before, between, and after the input intervals. An empty
/// input yields `[0, total]` unchanged. Zero-length gaps are dropped rather
/// than retained as degenerate entries.
pub fn complement(merged: &[TimeInterval], total: f64) -> Vec<TimeInterval> {
    let mut gaps = Vec::with_capacity(merged.len() + 1);
    let mut cursor = 0.0;

    for iv in merged {
        if let Some(gap) = TimeInterval::new(cursor, iv.start) {
            gaps.push(gap);
        }
        cursor = cursor.max(iv.end);
    }

    if let Some(tail) = TimeInterval::new(cursor, total) {
        gaps.push(tail);
    }

    gaps
}

/// Sum of interval lengths in seconds.
pub fn total_duration(intervals: &[TimeInterval]) -> f64 {
    intervals.iter().map(TimeInterval::duration).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: f64, end: f64) -> TimeInterval {
        TimeInterval::new(start, end).unwrap()
    }

    #[test]
    fn test_new_rejects_malformed() {
        assert!(TimeInterval::new(-1.0, 2.0).is_none());
        assert!(TimeInterval::new(2.0, 2.0).is_none());
        assert!(TimeInterval::new(3.0, 2.0).is_none());
        assert!(TimeInterval::new(f64::NAN, 2.0).is_none());
        assert!(TimeInterval::new(0.0, f64::INFINITY).is_none());
        assert!(TimeInterval::new(0.0, 0.001).is_some());
    }

    #[test]
    fn test_merge_overlapping() {
        let merged = merge(vec![iv(0.0, 5.0), iv(3.0, 8.0), iv(10.0, 12.0)]);
        assert_eq!(merged, vec![iv(0.0, 8.0), iv(10.0, 12.0)]);
    }

    #[test]
    fn test_merge_touching() {
        let merged = merge(vec![iv(0.0, 5.0), iv(5.0, 8.0)]);
        assert_eq!(merged, vec![iv(0.0, 8.0)]);
    }

    #[test]
    fn test_merge_unordered_input() {
        let merged = merge(vec![iv(10.0, 12.0), iv(3.0, 8.0), iv(0.0, 5.0)]);
        assert_eq!(merged, vec![iv(0.0, 8.0), iv(10.0, 12.0)]);
    }

    #[test]
    fn test_merge_contained() {
        let merged = merge(vec![iv(0.0, 10.0), iv(2.0, 3.0)]);
        assert_eq!(merged, vec![iv(0.0, 10.0)]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge(vec![]).is_empty());
    }

    #[test]
    fn test_clamp() {
        assert_eq!(iv(8.0, 15.0).clamp(0.0, 10.0), Some(iv(8.0, 10.0)));
        assert_eq!(iv(0.0, 5.0).clamp(1.0, 10.0), Some(iv(1.0, 5.0)));
        assert_eq!(iv(12.0, 15.0).clamp(0.0, 10.0), None);
        // Intersection collapses to a point
        assert_eq!(iv(10.0, 15.0).clamp(0.0, 10.0), None);
    }

    #[test]
    fn test_complement_empty_input() {
        assert_eq!(complement(&[], 10.0), vec![iv(0.0, 10.0)]);
    }

    #[test]
    fn test_complement_interior() {
        let gaps = complement(&[iv(2.0, 4.0), iv(6.0, 8.0)], 10.0);
        assert_eq!(gaps, vec![iv(0.0, 2.0), iv(4.0, 6.0), iv(8.0, 10.0)]);
    }

    #[test]
    fn test_complement_edges() {
        // Removes touching both edges leave no leading/trailing gap
        let gaps = complement(&[iv(0.0, 2.0), iv(8.0, 10.0)], 10.0);
        assert_eq!(gaps, vec![iv(2.0, 8.0)]);
    }

    #[test]
    fn test_complement_full_cover() {
        assert!(complement(&[iv(0.0, 10.0)], 10.0).is_empty());
    }

    #[test]
    fn test_total_duration() {
        let total = total_duration(&[iv(0.0, 2.0), iv(4.0, 20.0), iv(23.0, 30.0)]);
        assert!((total - 25.0).abs() < 1e-9);
    }
}
