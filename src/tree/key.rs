//! Identifying keys for the non-root node kinds.
//!
//! Every frame of a call path is one of three kinds:
//! - a method invocation, keyed by an integer method id
//! - a marker, keyed by an opaque (possibly absent) mark value
//! - a request boundary, keyed by (request type, path)
//!
//! Sibling lookup (`Frame::locate`) and structural equality are the same
//! comparison.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::node::CctNode;

/// Method identifier, stable for the life of one profiling run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId(pub u32);

/// Opaque marker value used to bucket samples by an external classification
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mark(Arc<str>);

impl Mark {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Kind of request that opened a request boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestType {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Trace,
    Unknown,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Get => "GET",
            RequestType::Post => "POST",
            RequestType::Put => "PUT",
            RequestType::Delete => "DELETE",
            RequestType::Head => "HEAD",
            RequestType::Options => "OPTIONS",
            RequestType::Trace => "TRACE",
            RequestType::Unknown => "UNKNOWN",
        }
    }
}

/// Key of a request-boundary node
///
/// Immutable after construction, so the hash is computed once and cached.
#[derive(Debug, Clone)]
pub struct RequestKey {
    request_type: RequestType,
    path: Arc<str>,
    hash: u64,
}

impl RequestKey {
    pub fn new(request_type: RequestType, path: impl Into<Arc<str>>) -> Self {
        let path = path.into();
        let mut hasher = DefaultHasher::new();
        request_type.hash(&mut hasher);
        path.hash(&mut hasher);

        Self {
            request_type,
            path,
            hash: hasher.finish(),
        }
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl PartialEq for RequestKey {
    fn eq(&self, other: &Self) -> bool {
        // Cached hash first: unequal hashes can never be equal keys
        self.hash == other.hash
            && self.request_type == other.request_type
            && self.path == other.path
    }
}

impl Eq for RequestKey {}

impl Hash for RequestKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Node kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Anchor of the tree, never addressed by a key
    Root,
    Method,
    Marker,
    Request,
}

/// One level of a call path: node kind plus its identifying key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Frame {
    Method(MethodId),
    /// `None` is the absent mark; it compares and hashes like any other value
    Marker(Option<Mark>),
    Request(RequestKey),
}

impl Frame {
    pub fn method(id: u32) -> Self {
        Frame::Method(MethodId(id))
    }

    pub fn marker(mark: impl Into<Arc<str>>) -> Self {
        Frame::Marker(Some(Mark::new(mark)))
    }

    pub fn request(request_type: RequestType, path: impl Into<Arc<str>>) -> Self {
        Frame::Request(RequestKey::new(request_type, path))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Frame::Method(_) => NodeKind::Method,
            Frame::Marker(_) => NodeKind::Marker,
            Frame::Request(_) => NodeKind::Request,
        }
    }

    /// Boundary frames wrap a unit of work rather than a method invocation
    pub fn is_boundary(&self) -> bool {
        !matches!(self, Frame::Method(_))
    }

    /// Find the first sibling of the same kind whose key equals this one
    pub fn locate<'a>(&self, siblings: &'a [Arc<CctNode>]) -> Option<&'a Arc<CctNode>> {
        siblings
            .iter()
            .find(|node| node.frame().is_some_and(|frame| frame == self))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Method(id) => write!(f, "#{}", id.0),
            Frame::Marker(Some(mark)) => write!(f, "[{}]", mark.as_str()),
            Frame::Marker(None) => write!(f, "<unmarked>"),
            Frame::Request(key) => write!(f, "{} {}", key.request_type.as_str(), key.path),
        }
    }
}
