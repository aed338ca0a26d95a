//! Calling-context tree storage.
//!
//! This module holds the building blocks of the tree:
//! - Node identity (frames and their keys)
//! - Memory-optimized child collections
//! - Atomic per-node timing statistics

pub mod key;
pub mod node;
pub mod stats;
pub mod storage;

// Re-export main types
pub use key::{Frame, Mark, MethodId, NodeKind, RequestKey, RequestType};
pub use node::CctNode;
pub use stats::{FilterStatus, StatsSnapshot, TimedStats};
pub use storage::ChildStore;
