//! Input JSON schema for producer sample files.
//!
//! Frames are externally tagged:
//! `{"method": 12}`, `{"marker": "db"}`, `{"marker": null}`,
//! `{"request": {"type": "GET", "path": "/orders"}}`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tree::{Frame, Mark, RequestType};

/// Top-level sample file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleFile {
    /// Schema version for compatibility checking
    pub version: String,

    /// Method id to display name, as resolved by the instrumentation layer
    #[serde(default)]
    pub methods: HashMap<u32, String>,

    pub samples: Vec<SampleRecord>,
}

/// One sample as produced by an observed thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Observed thread that produced the sample
    #[serde(default)]
    pub thread: u32,

    /// Enclosing boundary frames, outermost first
    #[serde(default)]
    pub boundary: Vec<FrameRecord>,

    /// Call frames, outermost caller first
    pub frames: Vec<FrameRecord>,

    #[serde(default = "default_calls")]
    pub calls: u64,

    /// Self-time deltas for the two net timers
    #[serde(default)]
    pub net_time: [u64; 2],

    #[serde(default)]
    pub sleep_time: u64,

    #[serde(default)]
    pub wait_time: u64,

    /// Last wait-or-sleep timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp: Option<u64>,
}

fn default_calls() -> u64 {
    1
}

/// Serialized frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameRecord {
    Method(u32),
    Marker(Option<String>),
    Request(RequestRecord),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub path: String,
}

impl FrameRecord {
    pub fn to_frame(&self) -> Frame {
        match self {
            FrameRecord::Method(id) => Frame::method(*id),
            FrameRecord::Marker(mark) => Frame::Marker(mark.as_deref().map(Mark::new)),
            FrameRecord::Request(request) => {
                Frame::request(request.request_type, request.path.as_str())
            }
        }
    }
}
