//! Sample file parser.
//!
//! Turns producer JSON into [`Sample`] values ready for folding.

use super::schema::{SampleFile, SampleRecord};
use crate::aggregator::{MethodNames, Sample, TimingDelta};
use crate::tree::{Frame, MethodId};
use crate::utils::config::SAMPLE_SCHEMA_VERSION;
use crate::utils::error::ParseError;
use log::{debug, warn};

/// Parsed sample file (internal representation)
#[derive(Debug, Clone, Default)]
pub struct ParsedSamples {
    pub samples: Vec<Sample>,

    pub method_names: MethodNames,

    /// Number of distinct producer threads seen in the file
    pub thread_count: usize,
}

/// Parse raw sample JSON
///
/// # Errors
/// * `ParseError::JsonError` - malformed JSON or unknown frame kind
/// * `ParseError::UnsupportedVersion` - schema version mismatch
/// * `ParseError::InvalidFormat` - a sample without any frame
pub fn parse_samples(raw: &str) -> Result<ParsedSamples, ParseError> {
    let file: SampleFile = serde_json::from_str(raw)?;
    from_sample_file(file)
}

/// Convert an already deserialized sample file
pub fn from_sample_file(file: SampleFile) -> Result<ParsedSamples, ParseError> {
    validate_sample_format(&file)?;

    let mut threads: Vec<u32> = file.samples.iter().map(|s| s.thread).collect();
    threads.sort_unstable();
    threads.dedup();

    let samples: Vec<Sample> = file.samples.iter().map(to_sample).collect();
    let zero_delta = samples.iter().filter(|s| s.delta.calls == 0).count();
    if zero_delta > 0 {
        warn!("{} samples carry a zero call count", zero_delta);
    }

    let method_names = file
        .methods
        .into_iter()
        .map(|(id, name)| (MethodId(id), name))
        .collect();

    debug!(
        "Parsed {} samples from {} threads",
        samples.len(),
        threads.len()
    );

    Ok(ParsedSamples {
        samples,
        method_names,
        thread_count: threads.len(),
    })
}

/// Check version and that every sample addresses at least one frame
pub fn validate_sample_format(file: &SampleFile) -> Result<(), ParseError> {
    if file.version != SAMPLE_SCHEMA_VERSION {
        return Err(ParseError::UnsupportedVersion(file.version.clone()));
    }

    if let Some(index) = file
        .samples
        .iter()
        .position(|s| s.frames.is_empty() && s.boundary.is_empty())
    {
        return Err(ParseError::InvalidFormat(format!(
            "sample {} has no frames",
            index
        )));
    }

    Ok(())
}

fn to_sample(record: &SampleRecord) -> Sample {
    let frames: Vec<Frame> = record.frames.iter().map(|f| f.to_frame()).collect();
    let mut delta = TimingDelta::calls(record.calls)
        .with_net_time(record.net_time[0], record.net_time[1])
        .with_sleep_time(record.sleep_time)
        .with_wait_time(record.wait_time);
    if let Some(stamp) = record.stamp {
        delta = delta.with_stamp(stamp);
    }

    record
        .boundary
        .iter()
        .fold(Sample::new(frames, delta), |sample, b| {
            sample.within(b.to_frame())
        })
}
