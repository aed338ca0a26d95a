//! Read-side metrics derived from a calling-context tree.
//!
//! Nothing here is stored in the tree. Inclusive time in particular is the
//! sum of self time over a subtree and is recomputed on every read. Trees
//! are walked with an explicit stack because recursive call chains can be
//! arbitrarily deep.

use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use super::fold::CallTree;
use super::labels::FrameLabeler;
use crate::tree::{CctNode, Frame};
use crate::utils::config::PATH_SEPARATOR;

/// Subtree totals of a node (its own statistics plus all descendants)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusiveTotals {
    pub calls: u64,
    pub time0: u64,
    pub time1: u64,
}

/// Inclusive totals for `node`
///
/// Sums saturate at `u64::MAX`.
pub fn inclusive_totals(node: &CctNode) -> InclusiveTotals {
    let mut totals = InclusiveTotals::default();
    let mut add = |n: &CctNode| {
        let stats = n.stats();
        totals.calls = totals.calls.saturating_add(stats.n_calls());
        totals.time0 = totals.time0.saturating_add(stats.net_time0());
        totals.time1 = totals.time1.saturating_add(stats.net_time1());
    };

    add(node);
    let mut pending = node.children();
    while let Some(next) = pending.pop() {
        add(next.as_ref());
        pending.extend(next.children());
    }

    totals
}

/// A call path ranked by the self time of its deepest node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotPath {
    /// Semicolon-separated labels, outermost first
    pub stack: String,

    /// Frames of the path, outermost first; the identity used when
    /// comparing paths across trees
    #[serde(skip)]
    pub frames: Vec<Frame>,

    /// Self time of the deepest node (net timer 0)
    pub self_time: u64,

    pub calls: u64,

    /// Share of the tree's total self time
    pub percentage: f64,
}

/// Top hot paths plus the self-time distribution over every path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSummary {
    pub hot_paths: Vec<HotPath>,

    pub distribution: TimeDistribution,
}

/// Calculate hot paths from a folded tree
///
/// # Arguments
/// * `tree` - Folded calling-context tree
/// * `labeler` - Resolves frames to display names
/// * `top_n` - Number of top paths to return (e.g., 10)
///
/// # Returns
/// Vector of hot paths, sorted by self time (descending)
pub fn calculate_hot_paths(
    tree: &CallTree,
    labeler: &dyn FrameLabeler,
    top_n: usize,
) -> Vec<HotPath> {
    summarize_paths(tree, labeler, top_n).hot_paths
}

/// Walk every non-root node that saw calls or self time once
///
/// Only the best `top_n` paths are labeled and kept; the distribution is
/// computed from the self times of all of them.
pub fn summarize_paths(tree: &CallTree, labeler: &dyn FrameLabeler, top_n: usize) -> PathSummary {
    let mut best: BinaryHeap<Ranked> =
        BinaryHeap::with_capacity(top_n.min(1024).saturating_add(1));
    let mut self_times: Vec<u64> = Vec::new();

    let mut pending: Vec<(Arc<CctNode>, Vec<Frame>)> = tree
        .root()
        .children()
        .into_iter()
        .map(|child| (child, Vec::new()))
        .collect();

    while let Some((node, mut frames)) = pending.pop() {
        if let Some(frame) = node.frame() {
            frames.push(frame.clone());
        }

        let stats = node.stats();
        let (self_time, calls) = (stats.net_time0(), stats.n_calls());
        if calls > 0 || self_time > 0 {
            self_times.push(self_time);
            if top_n > 0 && admits(&best, top_n, self_time, calls) {
                best.push(Ranked(HotPath {
                    stack: render_stack(&frames, labeler),
                    frames: frames.clone(),
                    self_time,
                    calls,
                    percentage: 0.0,
                }));
                if best.len() > top_n {
                    best.pop();
                }
            }
        }

        for child in node.children() {
            pending.push((child, frames.clone()));
        }
    }

    debug!(
        "Selected top {} hot paths from {} call paths",
        top_n,
        self_times.len()
    );

    let distribution = calculate_time_distribution(self_times);
    let mut hot_paths: Vec<HotPath> =
        best.into_sorted_vec().into_iter().map(|r| r.0).collect();
    for path in &mut hot_paths {
        path.percentage = percentage(path.self_time, distribution.total_time);
    }

    PathSummary {
        hot_paths,
        distribution,
    }
}

/// Heap entry ordered so that the worst kept path is the maximum
#[derive(Debug)]
struct Ranked(HotPath);

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .self_time
            .cmp(&self.0.self_time)
            .then_with(|| other.0.calls.cmp(&self.0.calls))
            .then_with(|| self.0.stack.cmp(&other.0.stack))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Whether a path with these numbers could enter a full heap
///
/// Ties on both numbers are admitted and settled by the stack label.
fn admits(best: &BinaryHeap<Ranked>, top_n: usize, self_time: u64, calls: u64) -> bool {
    match best.peek() {
        Some(worst) if best.len() >= top_n => {
            (self_time, calls) >= (worst.0.self_time, worst.0.calls)
        }
        _ => true,
    }
}

fn render_stack(frames: &[Frame], labeler: &dyn FrameLabeler) -> String {
    let mut stack = String::new();
    for (i, frame) in frames.iter().enumerate() {
        if i > 0 {
            stack.push(PATH_SEPARATOR);
        }
        stack.push_str(&labeler.label(frame));
    }
    stack
}

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

fn saturating_sum(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0u64, u64::saturating_add)
}

/// Calculate self-time distribution statistics from per-path self times
pub fn calculate_time_distribution(mut self_times: Vec<u64>) -> TimeDistribution {
    if self_times.is_empty() {
        return TimeDistribution::default();
    }

    self_times.sort_unstable();
    let count = self_times.len();
    let total = saturating_sum(self_times.iter().copied());
    let mean = total / count as u64;
    let median = self_times[count / 2];

    // Top 10% of paths
    let top_count = (count as f64 * 0.1).ceil() as usize;
    let top_time = saturating_sum(self_times.iter().rev().take(top_count).copied());

    TimeDistribution {
        total_time: total,
        path_count: count,
        mean_time_per_path: mean,
        median_time_per_path: median,
        top_10_percent_percentage: percentage(top_time, total),
    }
}

/// Self-time distribution statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeDistribution {
    pub total_time: u64,

    /// Number of paths considered
    pub path_count: usize,

    pub mean_time_per_path: u64,

    pub median_time_per_path: u64,

    /// Percentage of total time in the top 10% of paths
    pub top_10_percent_percentage: f64,
}

impl TimeDistribution {
    /// Top 10% of paths hold more than 80% of the time
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Total: {} | Paths: {} | Mean: {} | Median: {} | Top 10%: {:.1}%",
            self.total_time,
            self.path_count,
            self.mean_time_per_path,
            self.median_time_per_path,
            self.top_10_percent_percentage
        )
    }
}

/// Structural statistics of a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeShape {
    /// Nodes including the root
    pub nodes: usize,

    pub leaves: usize,

    /// Longest root-to-leaf path, in edges
    pub max_depth: usize,

    pub max_fan_out: usize,
}

pub fn tree_shape(root: &Arc<CctNode>) -> TreeShape {
    let mut shape = TreeShape::default();
    let mut pending = vec![(Arc::clone(root), 0usize)];

    while let Some((node, depth)) = pending.pop() {
        let children = node.children();
        shape.nodes += 1;
        shape.max_depth = shape.max_depth.max(depth);
        shape.max_fan_out = shape.max_fan_out.max(children.len());
        if children.is_empty() {
            shape.leaves += 1;
        }
        pending.extend(children.into_iter().map(|c| (c, depth + 1)));
    }

    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::fold::TimingDelta;
    use crate::aggregator::labels::RawLabels;

    fn sample_tree() -> CallTree {
        let tree = CallTree::new();
        let a = Frame::method(1);
        tree.fold_path(&[a.clone()], &TimingDelta::calls(1).with_net_time(10, 0));
        tree.fold_path(
            &[a.clone(), Frame::method(2)],
            &TimingDelta::calls(2).with_net_time(60, 0),
        );
        tree.fold_path(
            &[a, Frame::method(3)],
            &TimingDelta::calls(1).with_net_time(30, 0),
        );
        tree
    }

    #[test]
    fn test_inclusive_totals_sum_subtree() {
        let tree = sample_tree();
        let a = tree.find(&[Frame::method(1)]).unwrap();

        let totals = inclusive_totals(&a);
        assert_eq!(totals.calls, 4);
        assert_eq!(totals.time0, 100);
        assert_eq!(a.stats().net_time0(), 10);
    }

    #[test]
    fn test_calculate_hot_paths() {
        let tree = sample_tree();
        let hot_paths = calculate_hot_paths(&tree, &RawLabels, 2);

        assert_eq!(hot_paths.len(), 2);
        assert_eq!(hot_paths[0].stack, "#1;#2");
        assert_eq!(hot_paths[0].self_time, 60);
        assert_eq!(hot_paths[0].percentage, 60.0);
        assert_eq!(hot_paths[1].stack, "#1;#3");
    }

    #[test]
    fn test_calculate_time_distribution() {
        let tree = sample_tree();
        let dist = summarize_paths(&tree, &RawLabels, 1).distribution;

        assert_eq!(dist.total_time, 100);
        assert_eq!(dist.path_count, 3);
        assert_eq!(dist.mean_time_per_path, 33);
        assert_eq!(dist.median_time_per_path, 30);
        assert!(!dist.is_highly_concentrated());
    }

    #[test]
    fn test_time_distribution_empty() {
        let dist = calculate_time_distribution(Vec::new());
        assert_eq!(dist.total_time, 0);
        assert_eq!(dist.path_count, 0);
    }

    #[test]
    fn test_hot_paths_keep_frames_and_order() {
        let tree = sample_tree();
        let all = calculate_hot_paths(&tree, &RawLabels, 10);

        let stacks: Vec<&str> = all.iter().map(|p| p.stack.as_str()).collect();
        assert_eq!(stacks, vec!["#1;#2", "#1;#3", "#1"]);
        assert_eq!(all[0].frames, vec![Frame::method(1), Frame::method(2)]);
        assert!(calculate_hot_paths(&tree, &RawLabels, 0).is_empty());
    }

    #[test]
    fn test_hot_path_ties_break_on_stack() {
        let tree = CallTree::new();
        for id in [9, 4, 7] {
            tree.fold_path(&[Frame::method(id)], &TimingDelta::calls(1).with_net_time(5, 0));
        }

        let top = calculate_hot_paths(&tree, &RawLabels, 2);
        let stacks: Vec<&str> = top.iter().map(|p| p.stack.as_str()).collect();
        assert_eq!(stacks, vec!["#4", "#7"]);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let tree = CallTree::new();
        let huge = 10_000_000_000_000_000_000u64;
        tree.fold_path(&[Frame::method(1)], &TimingDelta::calls(1).with_net_time(huge, 0));
        tree.fold_path(&[Frame::method(2)], &TimingDelta::calls(1).with_net_time(huge, 0));

        assert_eq!(inclusive_totals(tree.root()).time0, u64::MAX);

        let summary = summarize_paths(&tree, &RawLabels, 5);
        assert_eq!(summary.distribution.total_time, u64::MAX);
        assert_eq!(summary.hot_paths.len(), 2);
        assert!(summary.hot_paths[0].percentage > 54.0);
    }

    #[test]
    fn test_tree_shape() {
        let tree = sample_tree();
        let shape = tree_shape(tree.root());

        assert_eq!(shape.nodes, 4);
        assert_eq!(shape.leaves, 2);
        assert_eq!(shape.max_depth, 2);
        assert_eq!(shape.max_fan_out, 2);
    }
}
