use std::path::PathBuf;

use crate::output::RenderOptions;
use crate::utils::config::{DEFAULT_FOLD_THREADS, DEFAULT_TOP_PATHS};

/// Arguments for the fold command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct FoldArgs {
    /// Producer sample file (JSON)
    pub input: PathBuf,

    /// Producer threads folding into the shared tree
    pub threads: usize,

    /// Number of top hot paths to include in the report
    pub top_paths: usize,

    /// Output path for the JSON fold report (optional)
    pub output_json: Option<PathBuf>,

    /// Print the tree as indented text
    pub print_tree: Option<RenderOptions>,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Sample file folded into a baseline tree for diffing
    pub baseline: Option<PathBuf>,

    /// Threshold configuration file (TOML) applied to the diff
    pub threshold_file: Option<PathBuf>,

    /// Simple call count increase threshold percentage
    pub threshold_percent: Option<f64>,

    /// Path to write the diff report JSON
    pub diff_output: Option<PathBuf>,
}

impl Default for FoldArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("samples.json"),
            threads: DEFAULT_FOLD_THREADS,
            top_paths: DEFAULT_TOP_PATHS,
            output_json: None,
            print_tree: None,
            print_summary: true,
            baseline: None,
            threshold_file: None,
            threshold_percent: None,
            diff_output: None,
        }
    }
}
