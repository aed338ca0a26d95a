//! Tree snapshot, diff generation and threshold checking.
//!
//! This module compares two calling-context trees (baseline vs target) and
//! produces a merged diff tree, a delta report, and threshold violations.
//!
//! # Example
//! ```ignore
//! use cct_studio::diff::{check_thresholds, generate_diff, load_thresholds};
//!
//! let mut diff = generate_diff(&baseline_tree, &target_tree, &names, 20);
//! let thresholds = load_thresholds("thresholds.toml")?;
//! let violations = check_thresholds(&mut diff, &thresholds);
//! ```

mod engine;
mod normalizer;
mod output;
mod schema;
mod snapshot;
mod threshold;

// Public API exports
pub use engine::{count_changed_nodes, diff_trees, generate_diff};
pub use normalizer::{calculate_delta, compare_hot_paths, safe_percentage, signed_change};
pub use output::render_terminal_diff;
pub use schema::{
    Deltas, DiffReport, DiffSummary, HotPathComparison, HotPathsDelta, MetricDelta,
    ThresholdViolation, TreeMetadata,
};
pub use snapshot::snapshot_subtree;
pub use threshold::{
    check_thresholds, load_thresholds, parse_thresholds, HotPathThresholds, MetricThresholds,
    ThresholdConfig,
};

// Error type
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Invalid threshold configuration: {0}")]
    InvalidThresholds(String),

    #[error("Threshold TOML parse error: {0}")]
    ThresholdParseFailed(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests;
