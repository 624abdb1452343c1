//! Cut planning: turning user removal intervals into a keep plan.
//!
//! Planning is a pure function of its inputs. The same `CutRequest` always
//! yields the same `KeepPlan`, which is what makes retries idempotent.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interval::{self, TimeInterval};

/// A request to cut intervals out of a source.
///
/// `remove_intervals` comes from client-side selections and may be empty,
/// overlapping, unordered, or out of bounds; validation is lenient and
/// silently discards malformed entries rather than rejecting the request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CutRequest {
    /// Duration of the source media in seconds.
    pub source_duration: f64,
    /// Intervals to remove, on the original source timeline.
    pub remove_intervals: Vec<TimeInterval>,
}

/// The disjoint, ascending set of intervals to keep.
///
/// Invariants: entries are clamped to `[0, source_duration]`, never overlap
/// or touch, and contain no zero-length entries. The sum of entry lengths
/// plus the merged remove total equals the source duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeepPlan {
    segments: Vec<TimeInterval>,
    source_duration: f64,
}

impl KeepPlan {
    /// The kept intervals in ascending order.
    pub fn segments(&self) -> &[TimeInterval] {
        &self.segments
    }

    /// Number of kept intervals.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total kept duration in seconds.
    pub fn total_duration(&self) -> f64 {
        interval::total_duration(&self.segments)
    }

    /// Duration of the source the plan was computed against.
    pub fn source_duration(&self) -> f64 {
        self.source_duration
    }

    /// True when the plan keeps the entire source in one piece, i.e. the
    /// cut is a no-op.
    pub fn is_full_source(&self) -> bool {
        self.segments.len() == 1
            && self.segments[0].start == 0.0
            && (self.segments[0].end - self.source_duration).abs() < 1e-9
    }
}

/// Planning failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanError {
    /// The source duration is non-positive or non-finite.
    #[error("Invalid source duration: {0}")]
    InvalidDuration(f64),

    /// The merged remove set covers the entire source; producing an empty
    /// output would be misleading, so this is reported distinctly.
    #[error("Cut removes all content ({removed:.3}s of {source_duration:.3}s)")]
    EmptyResult {
        source_duration: f64,
        removed: f64,
    },
}

/// Compute the keep plan for a cut request.
///
/// Steps: drop malformed entries, clamp the rest to `[0, source_duration]`,
/// merge, complement. An empty remove list yields a single full-source
/// interval (a no-op cut).
pub fn plan(request: &CutRequest) -> Result<KeepPlan, PlanError> {
    let total = request.source_duration;
    if !total.is_finite() || total <= 0.0 {
        return Err(PlanError::InvalidDuration(total));
    }

    // Lenient validation: entries referencing stale client selections are
    // dropped, not rejected.
    let validated: Vec<TimeInterval> = request
        .remove_intervals
        .iter()
        .filter_map(|iv| TimeInterval::new(iv.start, iv.end))
        .filter_map(|iv| iv.clamp(0.0, total))
        .collect();

    let merged = interval::merge(validated);
    let segments = interval::complement(&merged, total);

    if segments.is_empty() {
        return Err(PlanError::EmptyResult {
            source_duration: total,
            removed: interval::total_duration(&merged),
        });
    }

    Ok(KeepPlan {
        segments,
        source_duration: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: f64, end: f64) -> TimeInterval {
        TimeInterval::new(start, end).unwrap()
    }

    // Raw intervals that bypass the validating constructor, as a deserialized
    // client payload would.
    fn raw(start: f64, end: f64) -> TimeInterval {
        TimeInterval { start, end }
    }

    #[test]
    fn test_noop_cut() {
        let request = CutRequest {
            source_duration: 10.0,
            remove_intervals: vec![],
        };
        let plan = plan(&request).unwrap();
        assert_eq!(plan.segments(), &[iv(0.0, 10.0)]);
        assert!(plan.is_full_source());
    }

    #[test]
    fn test_full_removal_is_error() {
        let request = CutRequest {
            source_duration: 10.0,
            remove_intervals: vec![raw(0.0, 10.0)],
        };
        assert!(matches!(
            plan(&request),
            Err(PlanError::EmptyResult { .. })
        ));
    }

    #[test]
    fn test_out_of_range_clamped() {
        let request = CutRequest {
            source_duration: 10.0,
            remove_intervals: vec![raw(8.0, 15.0)],
        };
        let plan = plan(&request).unwrap();
        assert_eq!(plan.segments(), &[iv(0.0, 8.0)]);
    }

    #[test]
    fn test_malformed_entries_dropped() {
        let request = CutRequest {
            source_duration: 10.0,
            remove_intervals: vec![raw(5.0, 3.0), raw(4.0, 4.0), raw(2.0, 3.0)],
        };
        let plan = plan(&request).unwrap();
        assert_eq!(plan.segments(), &[iv(0.0, 2.0), iv(3.0, 10.0)]);
    }

    #[test]
    fn test_idempotent() {
        let request = CutRequest {
            source_duration: 30.0,
            remove_intervals: vec![raw(20.0, 23.0), raw(2.0, 4.0), raw(3.0, 4.0)],
        };
        let first = plan(&request).unwrap();
        let second = plan(&request).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_coverage_invariant() {
        let request = CutRequest {
            source_duration: 30.0,
            remove_intervals: vec![raw(2.0, 4.0), raw(20.0, 23.0), raw(28.0, 45.0)],
        };
        let plan = plan(&request).unwrap();

        let merged = crate::interval::merge(
            request
                .remove_intervals
                .iter()
                .filter_map(|r| TimeInterval::new(r.start, r.end))
                .filter_map(|r| r.clamp(0.0, 30.0))
                .collect(),
        );
        let removed = crate::interval::total_duration(&merged);
        assert!((plan.total_duration() + removed - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_ascending() {
        let request = CutRequest {
            source_duration: 30.0,
            remove_intervals: vec![raw(10.0, 12.0), raw(2.0, 4.0), raw(11.0, 15.0)],
        };
        let plan = plan(&request).unwrap();
        for pair in plan.segments().windows(2) {
            // Strict gap between consecutive keeps (touching removes were merged)
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn test_invalid_duration() {
        let request = CutRequest {
            source_duration: 0.0,
            remove_intervals: vec![],
        };
        assert!(matches!(plan(&request), Err(PlanError::InvalidDuration(_))));
    }

    #[test]
    fn test_user_selection_scenario() {
        // Source 30s; detected silences [2,4], [10,10.5], [20,23];
        // user selects the first and third.
        let request = CutRequest {
            source_duration: 30.0,
            remove_intervals: vec![raw(2.0, 4.0), raw(20.0, 23.0)],
        };
        let plan = plan(&request).unwrap();
        assert_eq!(
            plan.segments(),
            &[iv(0.0, 2.0), iv(4.0, 20.0), iv(23.0, 30.0)]
        );
        assert!((plan.total_duration() - 25.0).abs() < 1e-9);
    }
}
