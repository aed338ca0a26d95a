//! Core diff engine implementation.
//!
//! Two views of a comparison:
//! - `diff_trees` merges both trees node by node, carrying the change in
//!   call count in each node's diff counter
//! - `generate_diff` produces a serializable report of totals and hot paths

use chrono::Utc;
use log::debug;
use std::sync::Arc;

use super::normalizer::{calculate_delta, compare_hot_paths, signed_change};
use super::schema::{Deltas, DiffReport, DiffSummary, TreeMetadata};
use crate::aggregator::{calculate_hot_paths, inclusive_totals, CallTree, FrameLabeler};
use crate::tree::CctNode;
use crate::utils::config::REPORT_VERSION;

/// Merge `baseline` and `target` into a detached diff tree
///
/// Nodes on a path present in the target carry the target's statistics.
/// Nodes only in the baseline carry zeroed statistics. In both cases
/// `n_calls_diff` is target calls minus baseline calls. Children come in
/// target order, followed by baseline-only children in baseline order.
pub fn diff_trees(baseline: &Arc<CctNode>, target: &Arc<CctNode>) -> Arc<CctNode> {
    let merged = Arc::new(merge_node(Some(baseline.as_ref()), Some(target.as_ref())));
    let mut pending = vec![(
        Some(Arc::clone(baseline)),
        Some(Arc::clone(target)),
        Arc::clone(&merged),
    )];

    while let Some((base, tgt, out)) = pending.pop() {
        let mut pairs: Vec<(Option<Arc<CctNode>>, Option<Arc<CctNode>>)> = Vec::new();

        if let Some(tgt) = &tgt {
            for child in tgt.children() {
                let matching = match (&base, child.frame()) {
                    (Some(base), Some(frame)) => base.locate(frame),
                    _ => None,
                };
                pairs.push((matching, Some(child)));
            }
        }
        if let Some(base) = &base {
            for child in base.children() {
                let in_target = match (&tgt, child.frame()) {
                    (Some(tgt), Some(frame)) => tgt.locate(frame).is_some(),
                    _ => false,
                };
                if !in_target {
                    pairs.push((Some(child), None));
                }
            }
        }

        for (b, t) in pairs {
            let child = Arc::new(merge_node(b.as_deref(), t.as_deref()));
            out.attach_child(Arc::clone(&child));
            pending.push((b, t, child));
        }
    }

    merged
}

fn merge_node(baseline: Option<&CctNode>, target: Option<&CctNode>) -> CctNode {
    let baseline_calls = baseline.map_or(0, |n| n.stats().n_calls());

    let (node, target_calls) = match (target, baseline) {
        (Some(target), _) => (target.detached_clone(), target.stats().n_calls()),
        (None, Some(baseline)) => (baseline.new_instance(), 0),
        (None, None) => (CctNode::root(), 0),
    };

    node.stats()
        .add_n_calls_diff(signed_change(baseline_calls, target_calls));
    node
}

/// Number of nodes in a diff tree whose call count changed
pub fn count_changed_nodes(diff_root: &Arc<CctNode>) -> usize {
    let mut changed = 0;
    let mut pending = vec![Arc::clone(diff_root)];
    while let Some(node) = pending.pop() {
        if node.stats().n_calls_diff() != 0 {
            changed += 1;
        }
        pending.extend(node.children());
    }
    changed
}

/// Generate a complete diff report comparing two trees
///
/// # Arguments
/// * `baseline` - The baseline tree to compare against
/// * `target` - The target tree to compare
/// * `labeler` - Resolves frames to names in hot path stacks
/// * `top_n` - Hot paths compared per tree
pub fn generate_diff(
    baseline: &CallTree,
    target: &CallTree,
    labeler: &dyn FrameLabeler,
    top_n: usize,
) -> DiffReport {
    let baseline_meta = tree_metadata(baseline);
    let target_meta = tree_metadata(target);

    let diff_root = diff_trees(baseline.root(), target.root());
    let changed_nodes = count_changed_nodes(&diff_root);
    debug!("Diff tree has {} changed nodes", changed_nodes);

    let baseline_paths = calculate_hot_paths(baseline, labeler, top_n);
    let target_paths = calculate_hot_paths(target, labeler, top_n);

    let deltas = Deltas {
        calls: calculate_delta(baseline_meta.total_calls, target_meta.total_calls),
        net_time: calculate_delta(baseline_meta.total_time, target_meta.total_time),
        nodes: calculate_delta(baseline_meta.node_count, target_meta.node_count),
        changed_nodes,
        hot_paths: compare_hot_paths(&baseline_paths, &target_paths),
    };

    let mut summary = DiffSummary::default();
    if changed_nodes == 0 && baseline_meta == target_meta {
        summary.warning = Some("Baseline and target trees are identical".to_string());
    }

    DiffReport {
        diff_version: REPORT_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        baseline: baseline_meta,
        target: target_meta,
        deltas,
        threshold_violations: Vec::new(), // Populated by check_thresholds
        summary,
    }
}

fn tree_metadata(tree: &CallTree) -> TreeMetadata {
    let totals = inclusive_totals(tree.root());
    TreeMetadata {
        samples_folded: tree.samples_folded(),
        node_count: tree.node_count(),
        total_calls: totals.calls,
        total_time: totals.time0,
    }
}
