//! Text rendering of folded trees and fold reports.

use colored::*;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use super::report::FoldReport;
use crate::aggregator::FrameLabeler;
use crate::tree::{CctNode, FilterStatus};
use crate::utils::config::DEFAULT_RENDER_DEPTH;

/// Options for [`render_tree`]
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Deepest displayed level (root children are level 1)
    pub max_depth: usize,

    /// Skip `AlwaysHide` nodes, lifting their children into their place
    pub hide_filtered: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_RENDER_DEPTH,
            hide_filtered: true,
        }
    }
}

/// Render the tree as indented text, one node per line
///
/// Each line shows calls, self time and inclusive time (timer 0).
pub fn render_tree(root: &Arc<CctNode>, labeler: &dyn FrameLabeler, options: RenderOptions) -> String {
    let inclusive = inclusive_time_index(root);
    let mut out = String::new();

    let root_total = inclusive.get(&Arc::as_ptr(root)).copied().unwrap_or(0);
    let _ = writeln!(out, "{} total={}", "<root>".bold(), root_total);

    let mut pending: Vec<(Arc<CctNode>, usize)> =
        root.children().into_iter().rev().map(|c| (c, 1)).collect();

    while let Some((node, depth)) = pending.pop() {
        let hidden = options.hide_filtered && node.filter_status() == FilterStatus::AlwaysHide;
        let child_depth = if hidden { depth } else { depth + 1 };

        if !hidden {
            let label = node.frame().map(|f| labeler.label(f)).unwrap_or_default();
            let stats = node.stats();
            let total = inclusive.get(&Arc::as_ptr(&node)).copied().unwrap_or(0);
            let _ = writeln!(
                out,
                "{}{}  calls={} self={} total={}",
                "  ".repeat(depth),
                label,
                stats.n_calls(),
                stats.net_time0(),
                total
            );
        }

        if child_depth <= options.max_depth {
            for child in node.children().into_iter().rev() {
                pending.push((child, child_depth));
            }
        }
    }

    out
}

/// Inclusive net time (timer 0) of every node, computed bottom-up in one pass
fn inclusive_time_index(root: &Arc<CctNode>) -> HashMap<*const CctNode, u64> {
    let mut totals: HashMap<*const CctNode, u64> = HashMap::new();
    let mut pending: Vec<(Arc<CctNode>, bool)> = vec![(Arc::clone(root), false)];

    while let Some((node, expanded)) = pending.pop() {
        let children = node.children();
        if expanded {
            let total = children
                .iter()
                .map(|c| totals.get(&Arc::as_ptr(c)).copied().unwrap_or(0))
                .fold(node.stats().net_time0(), u64::saturating_add);
            totals.insert(Arc::as_ptr(&node), total);
        } else {
            pending.push((Arc::clone(&node), true));
            pending.extend(children.into_iter().map(|c| (c, false)));
        }
    }

    totals
}

/// Render a fold report summary for the terminal
pub fn render_summary(report: &FoldReport) -> String {
    let mut out = String::new();

    out.push_str("\n🌳 ");
    out.push_str(&"Call Tree Summary".bold().to_string());
    out.push_str("\n---------------------------------------------------\n");
    let _ = writeln!(out, "Samples folded: {}", report.samples_folded);
    let _ = writeln!(
        out,
        "Nodes: {} | Leaves: {} | Max depth: {} | Max fan-out: {}",
        report.shape.nodes, report.shape.leaves, report.shape.max_depth, report.shape.max_fan_out
    );
    let _ = writeln!(
        out,
        "Calls: {} | Net time: {} / {}",
        report.totals.calls, report.totals.time0, report.totals.time1
    );
    let _ = writeln!(out, "Self time: {}", report.distribution.summary());
    out.push_str("---------------------------------------------------\n");

    if !report.hot_paths.is_empty() {
        out.push_str(&format!("\n{}\n", "Top Hot Paths:".bold()));
        for (rank, hp) in report.hot_paths.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}. {:>6.2}%  self={} calls={}  {}",
                rank + 1,
                hp.percentage,
                hp.self_time,
                hp.calls,
                hp.stack
            );
        }
    }

    out
}
