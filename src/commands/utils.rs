use crate::output::read_samples;
use crate::utils::config::{REPORT_VERSION, SAMPLE_SCHEMA_VERSION};
use anyhow::Result;
use std::path::PathBuf;

/// Validate a producer sample file
pub fn validate_samples_file(file_path: PathBuf) -> Result<()> {
    println!("Validating samples: {}", file_path.display());

    let parsed = read_samples(&file_path)?;
    let deepest = parsed.samples.iter().map(|s| s.depth()).max().unwrap_or(0);

    println!("✓ Valid sample JSON");
    println!("  Samples: {}", parsed.samples.len());
    println!("  Producer threads: {}", parsed.thread_count);
    println!("  Method names: {}", parsed.method_names.len());
    println!("  Deepest path: {}", deepest);

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("CCT Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Sample Schema: v{}", SAMPLE_SCHEMA_VERSION);
    println!("Report Schema: v{}", REPORT_VERSION);
    println!();
    println!("Concurrent calling-context tree aggregation for profiler samples.");
}
