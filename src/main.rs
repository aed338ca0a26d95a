//! CCT Studio CLI
//!
//! Folds profiler samples into a calling-context tree and reports
//! hot paths, tree shape and regressions against a baseline.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use cct_studio::commands::{
    display_version, execute_fold, validate_args, validate_samples_file, FoldArgs,
};
use cct_studio::output::RenderOptions;
use cct_studio::utils::config::{DEFAULT_FOLD_THREADS, DEFAULT_RENDER_DEPTH, DEFAULT_TOP_PATHS};

/// CCT Studio - calling-context tree aggregation
#[derive(Parser, Debug)]
#[command(name = "cct")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fold a sample file into a calling-context tree
    Fold {
        /// Producer sample file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Producer threads folding into the shared tree
        #[arg(short = 'j', long, default_value_t = DEFAULT_FOLD_THREADS, env = "CCT_THREADS")]
        threads: usize,

        /// Output path for the JSON fold report (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of top hot paths to include
        #[arg(long, default_value_t = DEFAULT_TOP_PATHS)]
        top_paths: usize,

        /// Print the folded tree
        #[arg(long)]
        tree: bool,

        /// Deepest tree level to print
        #[arg(long, default_value_t = DEFAULT_RENDER_DEPTH)]
        max_depth: usize,

        /// Also print marker and request boundary nodes
        #[arg(long)]
        show_boundaries: bool,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Baseline sample file to diff against
        #[arg(short, long)]
        baseline: Option<PathBuf>,

        /// Threshold configuration file (TOML)
        #[arg(long)]
        threshold_file: Option<PathBuf>,

        /// Simple call count increase threshold percentage
        #[arg(long)]
        threshold_percent: Option<f64>,

        /// Output path for the diff report JSON
        #[arg(long)]
        diff_output: Option<PathBuf>,
    },

    /// Validate a sample JSON file
    Validate {
        /// Path to sample JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Fold {
            input,
            threads,
            output,
            top_paths,
            tree,
            max_depth,
            show_boundaries,
            summary,
            baseline,
            threshold_file,
            threshold_percent,
            diff_output,
        } => {
            let print_tree = tree.then_some(RenderOptions {
                max_depth,
                hide_filtered: !show_boundaries,
            });

            let args = FoldArgs {
                input,
                threads,
                top_paths,
                output_json: output,
                print_tree,
                print_summary: summary,
                baseline,
                threshold_file,
                threshold_percent,
                diff_output,
            };

            // Validate args first
            validate_args(&args)?;

            execute_fold(args)?;
        }

        Commands::Validate { file } => {
            validate_samples_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
