//! Serializable summary of a folded tree.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::aggregator::{
    inclusive_totals, summarize_paths, tree_shape, CallTree, FrameLabeler, HotPath,
    InclusiveTotals, TimeDistribution, TreeShape,
};
use crate::utils::config::REPORT_VERSION;

/// Report written by the fold command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldReport {
    pub version: String,

    pub generated_at: String,

    pub samples_folded: u64,

    pub totals: InclusiveTotals,

    pub shape: TreeShape,

    pub distribution: TimeDistribution,

    /// Top call paths by self time
    pub hot_paths: Vec<HotPath>,
}

/// Build a report from the current state of `tree`
///
/// Producers may still be folding; the report then reflects each node as
/// it was when read.
pub fn build_report(tree: &CallTree, labeler: &dyn FrameLabeler, top_n: usize) -> FoldReport {
    let summary = summarize_paths(tree, labeler, top_n);

    FoldReport {
        version: REPORT_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        samples_folded: tree.samples_folded(),
        totals: inclusive_totals(tree.root()),
        shape: tree_shape(tree.root()),
        distribution: summary.distribution,
        hot_paths: summary.hot_paths,
    }
}
