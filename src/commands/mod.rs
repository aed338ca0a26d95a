//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod fold;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use fold::{build_tree, execute_fold, fold_samples, validate_args, FoldOutcome};
pub use models::FoldArgs;
pub use utils::{display_version, validate_samples_file};
