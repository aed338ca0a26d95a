//! Delta calculation between two trees.
//!
//! Handles the math for computing differences, including edge cases like
//! division by zero.

use std::collections::HashMap;

use super::schema::{HotPathComparison, HotPathsDelta, MetricDelta};
use crate::aggregator::HotPath;
use crate::tree::Frame;

/// `target - baseline` as a signed value, clamped to the `i64` range
pub fn signed_change(baseline: u64, target: u64) -> i64 {
    if target >= baseline {
        i64::try_from(target - baseline).unwrap_or(i64::MAX)
    } else {
        i64::try_from(baseline - target).map_or(i64::MIN, |d| -d)
    }
}

/// Calculate the delta of one scalar metric
pub fn calculate_delta(baseline: u64, target: u64) -> MetricDelta {
    let absolute_change = signed_change(baseline, target);
    let percent_change = safe_percentage(absolute_change, baseline);

    MetricDelta {
        baseline,
        target,
        absolute_change,
        percent_change,
    }
}

/// Compare hot paths between two trees by their frame sequence
///
/// Stack strings are display labels only; two distinct paths may share one.
pub fn compare_hot_paths(baseline_paths: &[HotPath], target_paths: &[HotPath]) -> HotPathsDelta {
    let baseline_map: HashMap<&[Frame], &HotPath> = baseline_paths
        .iter()
        .map(|hp| (hp.frames.as_slice(), hp))
        .collect();

    let target_map: HashMap<&[Frame], &HotPath> = target_paths
        .iter()
        .map(|hp| (hp.frames.as_slice(), hp))
        .collect();

    // Common paths, in target order
    let common_paths: Vec<HotPathComparison> = target_paths
        .iter()
        .filter_map(|target_path| {
            baseline_map.get(target_path.frames.as_slice()).map(|baseline_path| {
                let time_change = signed_change(baseline_path.self_time, target_path.self_time);
                HotPathComparison {
                    stack: target_path.stack.clone(),
                    baseline_time: baseline_path.self_time,
                    target_time: target_path.self_time,
                    time_change,
                    percent_change: safe_percentage(time_change, baseline_path.self_time),
                }
            })
        })
        .collect();

    let baseline_only: Vec<HotPath> = baseline_paths
        .iter()
        .filter(|hp| !target_map.contains_key(hp.frames.as_slice()))
        .cloned()
        .collect();

    let target_only: Vec<HotPath> = target_paths
        .iter()
        .filter(|hp| !baseline_map.contains_key(hp.frames.as_slice()))
        .cloned()
        .collect();

    HotPathsDelta {
        common_paths,
        baseline_only,
        target_only,
    }
}

/// Calculate percentage change safely
///
/// Returns 0.0 if baseline is zero.
pub fn safe_percentage(change: i64, baseline: u64) -> f64 {
    if baseline == 0 {
        0.0
    } else {
        (change as f64 / baseline as f64) * 100.0
    }
}
