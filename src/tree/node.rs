//! Calling-context tree node.

use std::fmt;
use std::sync::Arc;

use super::key::{Frame, NodeKind};
use super::stats::{FilterStatus, TimedStats};
use super::storage::ChildStore;

/// A node of the calling-context tree
///
/// A parent owns its children. Handles returned by [`CctNode::children`]
/// are for reading; the tree itself has no back-references.
pub struct CctNode {
    /// `None` for the root
    frame: Option<Frame>,
    stats: TimedStats,
    children: ChildStore<CctNode>,
}

impl CctNode {
    /// The tree's anchor node
    pub fn root() -> Self {
        Self::with_frame(None)
    }

    /// A fresh node for `frame` with zeroed statistics
    pub fn new(frame: Frame) -> Self {
        Self::with_frame(Some(frame))
    }

    fn with_frame(frame: Option<Frame>) -> Self {
        let kind = frame.as_ref().map_or(NodeKind::Root, Frame::kind);
        Self {
            frame,
            stats: TimedStats::new(FilterStatus::default_for(kind)),
            children: ChildStore::new(),
        }
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn kind(&self) -> NodeKind {
        self.frame.as_ref().map_or(NodeKind::Root, Frame::kind)
    }

    pub fn is_root(&self) -> bool {
        self.frame.is_none()
    }

    pub fn stats(&self) -> &TimedStats {
        &self.stats
    }

    pub fn filter_status(&self) -> FilterStatus {
        self.stats.filter_status()
    }

    pub fn set_filter_status(&self, status: FilterStatus) {
        self.stats.set_filter_status(status);
    }

    /// Children in attachment order
    pub fn children(&self) -> Vec<Arc<CctNode>> {
        self.children.children()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Append `child` without checking for an existing sibling of the same
    /// identity. Folding goes through [`CctNode::find_or_create_child`].
    pub fn attach_child(&self, child: Arc<CctNode>) {
        self.children.attach(child);
    }

    /// Existing child for `frame`, if any
    pub fn locate(&self, frame: &Frame) -> Option<Arc<CctNode>> {
        self.children
            .with_children(|siblings| frame.locate(siblings).cloned())
    }

    /// Existing child for `frame`, or a new zeroed one attached under this
    /// node. The boolean is `true` when the child was created by this call.
    pub fn find_or_create_child(&self, frame: &Frame) -> (Arc<CctNode>, bool) {
        self.children.get_or_attach_with(
            |siblings| frame.locate(siblings),
            || CctNode::new(frame.clone()),
        )
    }

    /// New node of the same kind and key with zeroed statistics, default
    /// filter flag and no children
    pub fn new_instance(&self) -> CctNode {
        Self::with_frame(self.frame.clone())
    }

    /// Detached point-in-time copy of this single node
    ///
    /// Calls, timers, stamp and filter flag are copied, the diff counter
    /// starts at zero and the copy has no children.
    pub fn detached_clone(&self) -> CctNode {
        let copy = self.new_instance();
        copy.stats.copy_timers_from(&self.stats);
        copy
    }
}

impl fmt::Debug for CctNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CctNode")
            .field("frame", &self.frame)
            .field("stats", &self.stats.snapshot())
            .field("children", &self.child_count())
            .finish()
    }
}
