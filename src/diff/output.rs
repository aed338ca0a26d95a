//! Terminal output rendering for diff reports.
//!
//! Provides human-readable summaries of tree comparisons
//! with visual cues (emojis) for regressions and improvements.

use super::schema::{DiffReport, MetricDelta};
use crate::utils::config::PATH_SEPARATOR;
use colored::*;

/// Render a human-readable summary of a diff report for the terminal
pub fn render_terminal_diff(report: &DiffReport) -> String {
    let mut out = String::new();

    out.push_str(&render_header(report));
    out.push_str(&render_metric("Total Calls", &report.deltas.calls));
    out.push_str(&render_metric("Total Net Time", &report.deltas.net_time));
    out.push_str(&render_metric("Tree Nodes", &report.deltas.nodes));
    out.push_str(&format!(
        "   Changed Nodes: {}\n",
        report.deltas.changed_nodes
    ));
    out.push_str(&render_hot_paths(report));
    out.push_str(&render_status(report));

    out
}

fn render_header(report: &DiffReport) -> String {
    let mut out = String::new();
    out.push_str("\n📊 ");
    out.push_str(&"Call Tree Comparison Summary".bold().to_string());
    out.push_str("\n---------------------------------------------------\n");
    out.push_str(&format!(
        "Baseline: {} samples, {} nodes\n",
        report.baseline.samples_folded, report.baseline.node_count
    ));
    out.push_str(&format!(
        "Target:   {} samples, {} nodes\n",
        report.target.samples_folded, report.target.node_count
    ));
    out.push_str("---------------------------------------------------\n\n");
    out
}

fn render_metric(name: &str, delta: &MetricDelta) -> String {
    format!(
        "{} {}: {} -> {} ({:+.2}%)\n",
        get_delta_symbol(delta.absolute_change),
        name,
        delta.baseline,
        delta.target,
        delta.percent_change
    )
}

fn render_hot_paths(report: &DiffReport) -> String {
    let mut out = String::new();
    let hot_paths = &report.deltas.hot_paths;

    if !hot_paths.common_paths.is_empty() {
        out.push_str("\nTop Hot Path Regressions/Improvements:\n");
        let mut hp_changes = hot_paths.common_paths.clone();
        hp_changes.sort_by(|a, b| b.time_change.abs().cmp(&a.time_change.abs()));

        for hp in hp_changes.iter().take(5) {
            out.push_str(&format!(
                "  {} {}: {} -> {} ({:+.2}%)\n",
                get_delta_symbol(hp.time_change),
                shorten_stack(&hp.stack),
                hp.baseline_time,
                hp.target_time,
                hp.percent_change
            ));
        }
    }

    if !hot_paths.target_only.is_empty() {
        out.push_str(&format!(
            "\nNew Hot Paths: {}\n",
            hot_paths.target_only.len()
        ));
        for hp in hot_paths.target_only.iter().take(3) {
            out.push_str(&format!("  ➕ {}: {}\n", shorten_stack(&hp.stack), hp.self_time));
        }
    }
    out
}

fn render_status(report: &DiffReport) -> String {
    let mut out = String::new();
    out.push_str("\n---------------------------------------------------\n");
    let status_msg = match report.summary.status.as_str() {
        "FAILED" => format!(
            "❌ STATUS: REGRESSION DETECTED ({} violations)",
            report.summary.violation_count
        )
        .red()
        .bold(),
        "WARNING" => format!(
            "⚠️  STATUS: WARNING ({} violations)",
            report.summary.violation_count
        )
        .yellow()
        .bold(),
        _ => "✅ STATUS: PASSED".green().bold(),
    };
    out.push_str(&status_msg.to_string());
    out.push('\n');
    if let Some(warning) = &report.summary.warning {
        out.push_str(&format!("{}\n", warning.yellow()));
    }
    out
}

fn get_delta_symbol(change: i64) -> &'static str {
    if change > 0 {
        "📈"
    } else if change < 0 {
        "📉"
    } else {
        "➡️"
    }
}

fn shorten_stack(stack: &str) -> String {
    let parts: Vec<&str> = stack.split(PATH_SEPARATOR).collect();
    if parts.len() <= 2 {
        stack.to_string()
    } else {
        format!(
            "...{sep}{}{sep}{}",
            parts[parts.len() - 2],
            parts[parts.len() - 1],
            sep = PATH_SEPARATOR
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_stack() {
        assert_eq!(shorten_stack("a;b"), "a;b");
        assert_eq!(shorten_stack("a;b;c;d"), "...;c;d");
    }

    #[test]
    fn test_delta_symbol() {
        assert_eq!(get_delta_symbol(3), "📈");
        assert_eq!(get_delta_symbol(-3), "📉");
        assert_eq!(get_delta_symbol(0), "➡️");
    }
}
