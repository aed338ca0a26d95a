//! Sample parsing and input schema definitions.
//!
//! This module handles:
//! - Parsing producer sample JSON
//! - Validating the sample format
//! - Converting serialized frames to tree frames

pub mod samples;
pub mod schema;

// Re-export main types
pub use samples::{from_sample_file, parse_samples, validate_sample_format, ParsedSamples};
pub use schema::{FrameRecord, RequestRecord, SampleFile, SampleRecord};
