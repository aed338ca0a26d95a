//! JSON report writer and sample file reader.

use crate::parser::{parse_samples, ParsedSamples};
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write any report to a pretty-printed JSON file
///
/// # Errors
/// * `OutputError::Io` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report<T: Serialize>(
    report: &T,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());

    super::validate_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;

    info!(
        "Report written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read and parse a producer sample file
///
/// # Errors
/// * `OutputError::Io` - File read error
/// * `OutputError::Parse` - Invalid JSON or sample format
pub fn read_samples(input_path: impl AsRef<Path>) -> Result<ParsedSamples, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading samples from: {}", input_path.display());

    let raw = std::fs::read_to_string(input_path)?;
    let parsed = parse_samples(&raw)?;

    debug!(
        "Samples loaded: {} samples, {} method names",
        parsed.samples.len(),
        parsed.method_names.len()
    );

    Ok(parsed)
}
