//! Output writers and renderers for folded trees.
//!
//! This module handles:
//! - JSON fold reports (pretty printed)
//! - Loading producer sample files
//! - Text rendering of the tree and summaries

pub mod json;
pub mod report;
pub mod text;

// Re-export main functions
pub use json::{read_samples, write_report};
pub use report::{build_report, FoldReport};
pub use text::{render_summary, render_tree, RenderOptions};

use crate::utils::error::OutputError;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
