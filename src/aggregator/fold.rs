//! Fold call-path samples into a shared calling-context tree.
//!
//! A sample is an ordered list of frames from the outermost caller to the
//! leaf plus a timing delta. Folding walks the tree one frame at a time,
//! reusing the child that matches each frame and creating it on first
//! sight, then applies the delta at the leaf only.
//!
//! Example: folding `[A, B]` then `[A, C]` gives
//! `root -> A -> {B, C}`; fan-out happens only where paths diverge.

use log::trace;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::tree::{CctNode, Frame, TimedStats};

/// Statistics to apply at the leaf of a folded path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingDelta {
    /// Call count increment
    pub calls: u64,

    /// Self-time increments for the two net timers
    pub net_time: [u64; 2],

    pub sleep_time: u64,

    pub wait_time: u64,

    /// Timestamp of the most recent wait or sleep, if the sample carries one
    pub last_wait_or_sleep_stamp: Option<u64>,
}

impl TimingDelta {
    pub fn calls(calls: u64) -> Self {
        Self {
            calls,
            ..Self::default()
        }
    }

    pub fn with_net_time(mut self, time0: u64, time1: u64) -> Self {
        self.net_time = [time0, time1];
        self
    }

    pub fn with_sleep_time(mut self, sleep_time: u64) -> Self {
        self.sleep_time = sleep_time;
        self
    }

    pub fn with_wait_time(mut self, wait_time: u64) -> Self {
        self.wait_time = wait_time;
        self
    }

    pub fn with_stamp(mut self, stamp: u64) -> Self {
        self.last_wait_or_sleep_stamp = Some(stamp);
        self
    }

    /// Apply this delta to one node's statistics
    pub fn apply_to(&self, stats: &TimedStats) {
        if self.calls > 0 {
            stats.add_n_calls(self.calls);
        }
        if self.net_time[0] > 0 {
            stats.add_net_time0(self.net_time[0]);
        }
        if self.net_time[1] > 0 {
            stats.add_net_time1(self.net_time[1]);
        }
        if self.sleep_time > 0 {
            stats.add_sleep_time0(self.sleep_time);
        }
        if self.wait_time > 0 {
            stats.add_wait_time0(self.wait_time);
        }
        if let Some(stamp) = self.last_wait_or_sleep_stamp {
            stats.set_last_wait_or_sleep_stamp(stamp);
        }
    }
}

/// One producer sample
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    /// Enclosing boundary frames (request boundaries, markers), outermost first
    pub boundary: Vec<Frame>,

    /// Call frames, outermost caller first
    pub frames: Vec<Frame>,

    pub delta: TimingDelta,
}

impl Sample {
    pub fn new(frames: Vec<Frame>, delta: TimingDelta) -> Self {
        Self {
            boundary: Vec::new(),
            frames,
            delta,
        }
    }

    /// Wrap the call frames in an enclosing boundary frame
    ///
    /// Boundaries added later sit inside the ones added earlier.
    pub fn within(mut self, boundary: Frame) -> Self {
        self.boundary.push(boundary);
        self
    }

    /// Full path as folded: boundary frames, then call frames
    pub fn path(&self) -> impl Iterator<Item = &Frame> {
        self.boundary.iter().chain(self.frames.iter())
    }

    pub fn depth(&self) -> usize {
        self.boundary.len() + self.frames.len()
    }
}

/// Shared calling-context tree fed by any number of producer threads
#[derive(Debug)]
pub struct CallTree {
    root: Arc<CctNode>,
    node_count: AtomicU64,
    samples_folded: AtomicU64,
}

impl Default for CallTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CallTree {
    pub fn new() -> Self {
        Self {
            root: Arc::new(CctNode::root()),
            node_count: AtomicU64::new(1),
            samples_folded: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Arc<CctNode> {
        &self.root
    }

    /// Number of nodes including the root
    pub fn node_count(&self) -> u64 {
        self.node_count.load(Ordering::Relaxed)
    }

    pub fn samples_folded(&self) -> u64 {
        self.samples_folded.load(Ordering::Relaxed)
    }

    /// Fold a sample, boundary frames first
    pub fn fold(&self, sample: &Sample) -> Arc<CctNode> {
        self.fold_frames(sample.path(), &sample.delta)
    }

    /// Fold `path` (outermost first) and apply `delta` at its leaf
    ///
    /// An empty path applies the delta to the root.
    pub fn fold_path(&self, path: &[Frame], delta: &TimingDelta) -> Arc<CctNode> {
        self.fold_frames(path.iter(), delta)
    }

    fn fold_frames<'a>(
        &self,
        path: impl Iterator<Item = &'a Frame>,
        delta: &TimingDelta,
    ) -> Arc<CctNode> {
        let mut current = Arc::clone(&self.root);

        for frame in path {
            // Only the parent's child list is locked, and only for this step
            let (child, created) = current.find_or_create_child(frame);
            if created {
                self.node_count.fetch_add(1, Ordering::Relaxed);
                trace!("Created node {} under {:?}", frame, current.frame());
            }
            current = child;
        }

        delta.apply_to(current.stats());
        self.samples_folded.fetch_add(1, Ordering::Relaxed);

        current
    }

    /// Node addressed by `path`, without creating anything
    pub fn find(&self, path: &[Frame]) -> Option<Arc<CctNode>> {
        let mut current = Arc::clone(&self.root);
        for frame in path {
            current = current.locate(frame)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::RequestType;

    #[test]
    fn test_fold_accumulates() {
        let tree = CallTree::new();
        let path = [Frame::method(1)];

        tree.fold_path(&path, &TimingDelta::calls(1).with_net_time(100, 0));
        tree.fold_path(&path, &TimingDelta::calls(1).with_net_time(50, 0));

        let a = tree.find(&path).unwrap();
        assert_eq!(a.stats().n_calls(), 2);
        assert_eq!(a.stats().net_time0(), 150);
        assert_eq!(tree.root().child_count(), 1);
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.samples_folded(), 2);
    }

    #[test]
    fn test_fan_out_only_at_divergence() {
        let tree = CallTree::new();
        tree.fold_path(&[Frame::method(1), Frame::method(2)], &TimingDelta::calls(1));
        tree.fold_path(&[Frame::method(1), Frame::method(3)], &TimingDelta::calls(1));

        let root_children = tree.root().children();
        assert_eq!(root_children.len(), 1);

        let a = &root_children[0];
        assert_eq!(a.frame(), Some(&Frame::method(1)));
        let a_children: Vec<_> = a.children().iter().map(|c| c.frame().cloned()).collect();
        assert_eq!(a_children, vec![Some(Frame::method(2)), Some(Frame::method(3))]);
    }

    #[test]
    fn test_caller_gets_no_leaf_time() {
        let tree = CallTree::new();
        tree.fold_path(
            &[Frame::method(1), Frame::method(2)],
            &TimingDelta::calls(1).with_net_time(100, 80),
        );

        let a = tree.find(&[Frame::method(1)]).unwrap();
        assert_eq!(a.stats().n_calls(), 0);
        assert_eq!(a.stats().net_time0(), 0);

        let b = tree.find(&[Frame::method(1), Frame::method(2)]).unwrap();
        assert_eq!(b.stats().net_time1(), 80);
    }

    #[test]
    fn test_recursion_deepens_instead_of_widening() {
        let tree = CallTree::new();
        let recursive = vec![Frame::method(7); 4];
        tree.fold_path(&recursive, &TimingDelta::calls(1));

        let mut node = Arc::clone(tree.root());
        for _ in 0..4 {
            assert_eq!(node.child_count(), 1);
            node = node.children()[0].clone();
        }
        assert!(!node.has_children());
        assert_eq!(node.stats().n_calls(), 1);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_boundary_frames_fold_first() {
        let tree = CallTree::new();
        let sample = Sample::new(vec![Frame::method(1)], TimingDelta::calls(1))
            .within(Frame::request(RequestType::Get, "/x"))
            .within(Frame::marker("db"));

        assert_eq!(sample.depth(), 3);
        let leaf = tree.fold(&sample);
        assert_eq!(leaf.frame(), Some(&Frame::method(1)));

        let request = tree.find(&[Frame::request(RequestType::Get, "/x")]).unwrap();
        assert_eq!(request.child_count(), 1);
        assert_eq!(
            request.children()[0].frame(),
            Some(&Frame::marker("db"))
        );
    }

    #[test]
    fn test_empty_path_hits_root() {
        let tree = CallTree::new();
        let leaf = tree.fold_path(&[], &TimingDelta::calls(3));
        assert!(leaf.is_root());
        assert_eq!(tree.root().stats().n_calls(), 3);
    }

    #[test]
    fn test_delta_sleep_wait_and_stamp() {
        let tree = CallTree::new();
        let delta = TimingDelta::calls(1)
            .with_sleep_time(5)
            .with_wait_time(6)
            .with_stamp(1_000);
        let leaf = tree.fold_path(&[Frame::method(1)], &delta);

        assert_eq!(leaf.stats().sleep_time0(), 5);
        assert_eq!(leaf.stats().wait_time0(), 6);
        assert_eq!(leaf.stats().last_wait_or_sleep_stamp(), 1_000);
    }

    #[test]
    fn test_find_does_not_create() {
        let tree = CallTree::new();
        assert!(tree.find(&[Frame::method(1)]).is_none());
        assert_eq!(tree.node_count(), 1);
        assert!(tree.find(&[]).unwrap().is_root());
    }
}
