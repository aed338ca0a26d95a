//! Integration tests for the diff module.
//!
//! Tests the complete diff generation and threshold checking workflow.

use super::*;
use crate::aggregator::{CallTree, MethodNames, RawLabels, TimingDelta};
use crate::tree::MethodId;
use crate::tree::{Frame, RequestType};
use pretty_assertions::assert_eq;

fn checkout() -> Vec<Frame> {
    vec![Frame::method(1), Frame::method(2)]
}

fn render() -> Vec<Frame> {
    vec![Frame::method(1), Frame::method(3)]
}

/// Baseline: checkout 10 calls / 1000, render 5 calls / 500
fn create_baseline_tree() -> CallTree {
    let tree = CallTree::new();
    tree.fold_path(&checkout(), &TimingDelta::calls(10).with_net_time(1000, 0));
    tree.fold_path(&render(), &TimingDelta::calls(5).with_net_time(500, 0));
    tree
}

/// Regression: checkout doubles, render disappears, a new audit path shows up
fn create_regression_tree() -> CallTree {
    let tree = CallTree::new();
    tree.fold_path(&checkout(), &TimingDelta::calls(20).with_net_time(2000, 0));
    tree.fold_path(
        &[Frame::method(1), Frame::method(4)],
        &TimingDelta::calls(1).with_net_time(300, 0),
    );
    tree
}

#[test]
fn test_diff_tree_carries_call_deltas() {
    let baseline = create_baseline_tree();
    let target = create_regression_tree();

    let diff = diff_trees(baseline.root(), target.root());
    let a = diff.locate(&Frame::method(1)).unwrap();

    let order: Vec<_> = a.children().iter().map(|c| c.frame().cloned()).collect();
    assert_eq!(
        order,
        vec![
            Some(Frame::method(2)),
            Some(Frame::method(4)),
            Some(Frame::method(3))
        ]
    );

    let checkout = a.locate(&Frame::method(2)).unwrap();
    assert_eq!(checkout.stats().n_calls(), 20);
    assert_eq!(checkout.stats().n_calls_diff(), 10);

    let audit = a.locate(&Frame::method(4)).unwrap();
    assert_eq!(audit.stats().n_calls_diff(), 1);

    let gone = a.locate(&Frame::method(3)).unwrap();
    assert_eq!(gone.stats().n_calls(), 0);
    assert_eq!(gone.stats().n_calls_diff(), -5);

    assert_eq!(count_changed_nodes(&diff), 3);
}

#[test]
fn test_diff_tree_is_detached() {
    let baseline = create_baseline_tree();
    let target = create_regression_tree();
    let diff = diff_trees(baseline.root(), target.root());

    target.fold_path(&checkout(), &TimingDelta::calls(100));

    let checkout_node = diff
        .locate(&Frame::method(1))
        .and_then(|a| a.locate(&Frame::method(2)))
        .unwrap();
    assert_eq!(checkout_node.stats().n_calls(), 20);
}

#[test]
fn test_generate_diff_totals() {
    let baseline = create_baseline_tree();
    let target = create_regression_tree();

    let report = generate_diff(&baseline, &target, &RawLabels, 10);

    assert_eq!(report.baseline.total_calls, 15);
    assert_eq!(report.target.total_calls, 21);
    assert_eq!(report.deltas.calls.absolute_change, 6);
    assert_eq!(report.deltas.calls.percent_change, 40.0);
    assert_eq!(report.deltas.net_time.baseline, 1500);
    assert_eq!(report.deltas.net_time.target, 2300);
    assert_eq!(report.deltas.changed_nodes, 3);

    let hot = &report.deltas.hot_paths;
    assert_eq!(hot.common_paths.len(), 1);
    assert_eq!(hot.common_paths[0].stack, "#1;#2");
    assert_eq!(hot.common_paths[0].percent_change, 100.0);
    assert_eq!(hot.baseline_only[0].stack, "#1;#3");
    assert_eq!(hot.target_only[0].stack, "#1;#4");
    assert!(report.summary.warning.is_none());
}

#[test]
fn test_generate_diff_identical() {
    let baseline = create_baseline_tree();
    let target = create_baseline_tree();

    let report = generate_diff(&baseline, &target, &RawLabels, 10);

    assert_eq!(report.deltas.changed_nodes, 0);
    assert!(report.summary.warning.is_some());
    assert_eq!(report.summary.status, "PASSED");
}

#[test]
fn test_thresholds_fail_regression() {
    let baseline = create_baseline_tree();
    let target = create_regression_tree();
    let mut report = generate_diff(&baseline, &target, &RawLabels, 10);

    let config = parse_thresholds(
        r#"
        [calls]
        max_increase_percent = 10.0

        [hot_paths]
        warn_individual_increase_percent = 50.0
        "#,
    )
    .unwrap();

    let violations = check_thresholds(&mut report, &config);

    let metrics: Vec<&str> = violations.iter().map(|v| v.metric.as_str()).collect();
    assert_eq!(metrics, vec!["calls.max_increase_percent", "hot_paths.#1;#2"]);
    assert_eq!(report.summary.status, "FAILED");
    assert!(report.summary.has_regressions);
    assert_eq!(report.threshold_violations.len(), 2);
}

#[test]
fn test_thresholds_pass_improvement() {
    let baseline = create_regression_tree();
    let target = create_baseline_tree();
    let mut report = generate_diff(&baseline, &target, &RawLabels, 10);

    let config = ThresholdConfig {
        net_time: MetricThresholds {
            max_increase_percent: Some(0.0),
            max_increase_absolute: Some(0),
        },
        ..ThresholdConfig::default()
    };

    let violations = check_thresholds(&mut report, &config);
    assert!(violations.is_empty());
    assert_eq!(report.summary.status, "PASSED");
}

#[test]
fn test_request_boundaries_diff_separately() {
    let baseline = CallTree::new();
    let target = CallTree::new();
    baseline.fold_path(
        &[Frame::request(RequestType::Get, "/x")],
        &TimingDelta::calls(2),
    );
    target.fold_path(
        &[Frame::request(RequestType::Post, "/x")],
        &TimingDelta::calls(2),
    );

    let diff = diff_trees(baseline.root(), target.root());

    assert_eq!(diff.child_count(), 2);
    let post = diff.locate(&Frame::request(RequestType::Post, "/x")).unwrap();
    let get = diff.locate(&Frame::request(RequestType::Get, "/x")).unwrap();
    assert_eq!(post.stats().n_calls_diff(), 2);
    assert_eq!(get.stats().n_calls_diff(), -2);
}

#[test]
fn test_report_serializes() {
    let report = generate_diff(&create_baseline_tree(), &create_regression_tree(), &RawLabels, 5);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["diff_version"], "1.0.0");
    assert_eq!(json["deltas"]["calls"]["target"], 21);
    assert!(json["summary"].get("warning").is_none());
}

#[test]
fn test_render_terminal_diff_mentions_status() {
    let mut report = generate_diff(&create_baseline_tree(), &create_regression_tree(), &RawLabels, 5);
    let config = ThresholdConfig {
        calls: MetricThresholds {
            max_increase_percent: Some(1.0),
            max_increase_absolute: None,
        },
        ..ThresholdConfig::default()
    };
    check_thresholds(&mut report, &config);

    let text = render_terminal_diff(&report);
    assert!(text.contains("Total Calls: 15 -> 21"));
    assert!(text.contains("REGRESSION DETECTED"));
}

#[test]
fn test_identical_runs_with_shared_method_names_pass() {
    let build = || {
        let tree = CallTree::new();
        tree.fold_path(&[Frame::method(1)], &TimingDelta::calls(1).with_net_time(100, 0));
        tree.fold_path(&[Frame::method(2)], &TimingDelta::calls(1).with_net_time(1, 0));
        tree
    };
    let names: MethodNames = [
        (MethodId(1), "Db.query".to_string()),
        (MethodId(2), "Db.query".to_string()),
    ]
    .into_iter()
    .collect();

    let mut report = generate_diff(&build(), &build(), &names, 10);
    let hot = &report.deltas.hot_paths;
    assert_eq!(hot.common_paths.len(), 2);
    assert!(hot.common_paths.iter().all(|c| c.time_change == 0));
    assert!(hot.baseline_only.is_empty() && hot.target_only.is_empty());

    let config = parse_thresholds("[hot_paths]\nwarn_individual_increase_percent = 1.0\n").unwrap();
    assert!(check_thresholds(&mut report, &config).is_empty());
    assert_eq!(report.summary.status, "PASSED");
}

#[test]
fn test_unmarked_and_default_marker_do_not_collide() {
    let build = |first: u64| {
        let tree = CallTree::new();
        tree.fold_path(&[Frame::Marker(None)], &TimingDelta::calls(1).with_net_time(first, 0));
        tree.fold_path(&[Frame::marker("default")], &TimingDelta::calls(1).with_net_time(7, 0));
        tree
    };

    let report = generate_diff(&build(50), &build(50), &RawLabels, 10);
    let stacks: Vec<&str> = report
        .deltas
        .hot_paths
        .common_paths
        .iter()
        .map(|c| c.stack.as_str())
        .collect();
    assert_eq!(stacks, vec!["<unmarked>", "[default]"]);
}
