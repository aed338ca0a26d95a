//! Aggregation of call-path samples into a calling-context tree.
//!
//! This module provides:
//! - Path folding (producers merging samples into the shared tree)
//! - Hot path analysis (top self-time consumers)
//! - Inclusive totals and tree shape, derived at read time

pub mod fold;
pub mod labels;
pub mod metrics;

// Re-export main types and functions
pub use fold::{CallTree, Sample, TimingDelta};
pub use labels::{FrameLabeler, MethodNames, RawLabels};
pub use metrics::{
    calculate_hot_paths, calculate_time_distribution, inclusive_totals, summarize_paths,
    tree_shape, HotPath, InclusiveTotals, PathSummary, TimeDistribution, TreeShape,
};
