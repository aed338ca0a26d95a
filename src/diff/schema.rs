//! Schema definitions for diff reports.
//!
//! Defines the structures that represent differences between a baseline
//! tree and a target tree.

use serde::{Deserialize, Serialize};

use crate::aggregator::HotPath;

/// Complete diff report comparing baseline and target trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    /// Schema version for the diff format
    pub diff_version: String,

    /// Timestamp when diff was generated
    pub generated_at: String,

    pub baseline: TreeMetadata,

    pub target: TreeMetadata,

    /// Calculated deltas between trees
    pub deltas: Deltas,

    /// List of threshold violations (if any)
    pub threshold_violations: Vec<ThresholdViolation>,

    /// Summary of diff results
    pub summary: DiffSummary,
}

/// Totals extracted from a tree for comparison
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TreeMetadata {
    pub samples_folded: u64,

    /// Nodes including the root
    pub node_count: u64,

    /// Inclusive call count of the root
    pub total_calls: u64,

    /// Inclusive net time (timer 0) of the root
    pub total_time: u64,
}

/// All calculated deltas
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Deltas {
    pub calls: MetricDelta,

    pub net_time: MetricDelta,

    pub nodes: MetricDelta,

    /// Nodes of the merged diff tree whose call count changed
    pub changed_nodes: usize,

    pub hot_paths: HotPathsDelta,
}

/// Change in one scalar metric
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MetricDelta {
    pub baseline: u64,

    pub target: u64,

    /// Absolute change (can be negative)
    pub absolute_change: i64,

    /// Percentage change (can be negative)
    pub percent_change: f64,
}

/// Hot paths comparison
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HotPathsDelta {
    /// Paths present in both trees
    pub common_paths: Vec<HotPathComparison>,

    /// Paths only in baseline (disappeared)
    pub baseline_only: Vec<HotPath>,

    /// Paths only in target (new)
    pub target_only: Vec<HotPath>,
}

/// Comparison of a single hot path present in both trees
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HotPathComparison {
    pub stack: String,

    pub baseline_time: u64,

    pub target_time: u64,

    pub time_change: i64,

    pub percent_change: f64,
}

/// A single threshold violation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThresholdViolation {
    /// Name of the metric that violated threshold
    pub metric: String,

    pub threshold: f64,

    pub actual: f64,

    /// Severity: "error" or "warning"
    pub severity: String,
}

/// Summary of diff results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffSummary {
    pub has_regressions: bool,

    pub violation_count: usize,

    /// Overall status: "PASSED", "FAILED", "WARNING"
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Default for DiffSummary {
    fn default() -> Self {
        Self {
            has_regressions: false,
            violation_count: 0,
            status: "PASSED".to_string(),
            warning: None,
        }
    }
}
