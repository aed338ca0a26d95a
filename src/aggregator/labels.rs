//! Display names for frames.
//!
//! Resolving method ids to names belongs to the instrumentation layer; the
//! tree only stores ids. Reports take a labeler so they can show names when
//! the producer supplied them.

use std::collections::HashMap;

use crate::tree::{Frame, MethodId};

/// Resolve a frame to a human-readable label
pub trait FrameLabeler {
    fn label(&self, frame: &Frame) -> String;
}

/// Falls back to the frame's own `Display`
#[derive(Debug, Clone, Copy, Default)]
pub struct RawLabels;

impl FrameLabeler for RawLabels {
    fn label(&self, frame: &Frame) -> String {
        frame.to_string()
    }
}

/// Map-backed method names; unknown ids and boundary frames use `Display`
#[derive(Debug, Clone, Default)]
pub struct MethodNames {
    names: HashMap<MethodId, String>,
}

impl MethodNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: MethodId, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(MethodId, String)> for MethodNames {
    fn from_iter<T: IntoIterator<Item = (MethodId, String)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl FrameLabeler for MethodNames {
    fn label(&self, frame: &Frame) -> String {
        match frame {
            Frame::Method(id) => self
                .names
                .get(id)
                .cloned()
                .unwrap_or_else(|| frame.to_string()),
            _ => frame.to_string(),
        }
    }
}
