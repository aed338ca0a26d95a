//! Fold command implementation.
//!
//! The fold command:
//! 1. Reads the producer sample file
//! 2. Folds samples into one shared tree from several producer threads
//! 3. Calculates totals, shape and hot paths
//! 4. Optionally diffs against a baseline sample file
//! 5. Writes output files

use super::models::FoldArgs;
use crate::aggregator::{CallTree, Sample};
use crate::diff::{
    check_thresholds, generate_diff, load_thresholds, render_terminal_diff, DiffReport,
    MetricThresholds, ThresholdConfig,
};
use crate::output::{
    build_report, read_samples, render_summary, render_tree, write_report, FoldReport,
};
use anyhow::{Context, Result};
use colored::*;
use log::{debug, info, warn};
use std::time::Instant;

/// Largest accepted producer thread count
const MAX_FOLD_THREADS: usize = 256;

/// Everything the fold command produced
#[derive(Debug, Clone)]
pub struct FoldOutcome {
    pub report: FoldReport,

    /// Present when a baseline was given
    pub diff: Option<DiffReport>,
}

/// Execute the fold command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Sample file read or parse failures
/// * Threshold file errors
/// * File write errors
/// * A diff whose thresholds report `FAILED`
pub fn execute_fold(args: FoldArgs) -> Result<FoldOutcome> {
    let start_time = Instant::now();

    info!("Starting fold of: {}", args.input.display());

    // Step 1: Read samples
    info!("Step 1/5: Reading samples...");
    let parsed = read_samples(&args.input).context("Failed to read sample file")?;

    debug!(
        "Loaded {} samples recorded by {} threads",
        parsed.samples.len(),
        parsed.thread_count
    );

    // Step 2: Fold
    info!(
        "Step 2/5: Folding {} samples on {} threads...",
        parsed.samples.len(),
        args.threads
    );
    let tree = build_tree(&parsed.samples, args.threads);

    debug!(
        "Tree holds {} nodes after {} samples",
        tree.node_count(),
        tree.samples_folded()
    );

    // Step 3: Metrics
    info!("Step 3/5: Calculating top {} hot paths...", args.top_paths);
    let report = build_report(&tree, &parsed.method_names, args.top_paths);
    info!("Self time distribution: {}", report.distribution.summary());

    for (i, path) in report.hot_paths.iter().take(3).enumerate() {
        debug!(
            "  {}. {} self ({:.1}%): {}",
            i + 1,
            path.self_time,
            path.percentage,
            path.stack
        );
    }

    // Step 4: Baseline diff (if requested)
    let diff = match &args.baseline {
        Some(baseline_path) => {
            info!("Step 4/5: Diffing against {}...", baseline_path.display());
            let baseline =
                read_samples(baseline_path).context("Failed to read baseline sample file")?;
            let baseline_tree = build_tree(&baseline.samples, args.threads);

            let mut diff = generate_diff(
                &baseline_tree,
                &tree,
                &parsed.method_names,
                args.top_paths,
            );

            if let Some(thresholds) = resolve_thresholds(&args)? {
                let violations = check_thresholds(&mut diff, &thresholds);
                debug!("{} threshold violations", violations.len());
            }
            Some(diff)
        }
        None => {
            info!("Step 4/5: Skipping diff (no baseline)");
            None
        }
    };

    // Step 5: Write outputs
    info!("Step 5/5: Writing output files...");
    if let Some(path) = &args.output_json {
        write_report(&report, path).context("Failed to write fold report JSON")?;
        info!("✓ Fold report written to: {}", path.display());
    }

    if let (Some(diff), Some(path)) = (&diff, &args.diff_output) {
        write_report(diff, path).context("Failed to write diff report JSON")?;
        println!(
            "📊 Diff report written to {}",
            path.display().to_string().cyan()
        );
    }

    if args.print_summary {
        println!("{}", render_summary(&report));
    }

    if let Some(options) = args.print_tree {
        println!("{}", render_tree(tree.root(), &parsed.method_names, options));
    }

    if let Some(diff) = &diff {
        if args.print_summary {
            println!("{}", render_terminal_diff(diff));
        }
        if diff.summary.status == "FAILED" {
            warn!(
                "{} threshold violations against baseline",
                diff.summary.violation_count
            );
            anyhow::bail!("Regression detected against thresholds");
        }
    }

    let elapsed = start_time.elapsed();
    info!("Fold completed in {:.2}s", elapsed.as_secs_f64());

    Ok(FoldOutcome { report, diff })
}

/// Build a tree by folding `samples` from `threads` producers
pub fn build_tree(samples: &[Sample], threads: usize) -> CallTree {
    let tree = CallTree::new();
    fold_samples(&tree, samples, threads);
    tree
}

/// Fold `samples` into `tree`, splitting them across `threads` scoped producers
///
/// Each producer folds a contiguous chunk. With one thread (or one chunk)
/// folding happens on the calling thread.
pub fn fold_samples(tree: &CallTree, samples: &[Sample], threads: usize) {
    let threads = threads.max(1);
    let chunk_size = samples.len().div_ceil(threads).max(1);

    if threads == 1 || samples.len() <= chunk_size {
        for sample in samples {
            tree.fold(sample);
        }
        return;
    }

    std::thread::scope(|scope| {
        for chunk in samples.chunks(chunk_size) {
            scope.spawn(move || {
                for sample in chunk {
                    tree.fold(sample);
                }
            });
        }
    });
}

/// Threshold policy from the file and/or the simple percent flag
///
/// Returns `None` when no limit is configured at all.
fn resolve_thresholds(args: &FoldArgs) -> Result<Option<ThresholdConfig>> {
    let mut thresholds = match &args.threshold_file {
        Some(path) => load_thresholds(path).context("Failed to load threshold file")?,
        None => ThresholdConfig::default(),
    };

    // Override with simple percent if provided
    if let Some(percent) = args.threshold_percent {
        thresholds.calls = MetricThresholds {
            max_increase_percent: Some(percent),
            max_increase_absolute: None,
        };
    }

    if thresholds.is_empty() {
        debug!("No threshold limits configured; skipping checks");
        return Ok(None);
    }
    Ok(Some(thresholds))
}

/// Validate fold arguments
///
/// **Public** - can be called before execute_fold for early validation
pub fn validate_args(args: &FoldArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input sample file cannot be empty");
    }

    if args.threads == 0 {
        anyhow::bail!("threads must be greater than 0");
    }

    if args.threads > MAX_FOLD_THREADS {
        anyhow::bail!("threads is too large (max {})", MAX_FOLD_THREADS);
    }

    if args.top_paths == 0 {
        anyhow::bail!("top_paths must be greater than 0");
    }

    if args.top_paths > 1000 {
        anyhow::bail!("top_paths is too large (max 1000)");
    }

    if let Some(percent) = args.threshold_percent {
        if !percent.is_finite() || percent < 0.0 {
            anyhow::bail!("threshold percent must be a non-negative number");
        }
    }

    if args.baseline.is_none()
        && (args.threshold_file.is_some()
            || args.threshold_percent.is_some()
            || args.diff_output.is_some())
    {
        anyhow::bail!("thresholds and diff output require a baseline");
    }

    Ok(())
}
