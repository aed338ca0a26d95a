//! Whole-subtree snapshots.
//!
//! A node clone is single-node only. A consumer that wants a frozen copy of
//! a subtree builds it here from per-node detached clones. Producers may keep
//! folding while the copy is taken; each node's values are read once, so
//! sibling nodes can reflect slightly different moments.

use std::sync::Arc;

use crate::tree::CctNode;

/// Detached copy of `node` and all its descendants
pub fn snapshot_subtree(node: &CctNode) -> Arc<CctNode> {
    let copy = Arc::new(node.detached_clone());
    let mut pending: Vec<(Arc<CctNode>, Arc<CctNode>)> = node
        .children()
        .into_iter()
        .rev()
        .map(|child| (child, Arc::clone(&copy)))
        .collect();

    // Reversed pushes make siblings pop, and attach, in their original order
    while let Some((live, parent_copy)) = pending.pop() {
        let child_copy = Arc::new(live.detached_clone());
        parent_copy.attach_child(Arc::clone(&child_copy));
        for grandchild in live.children().into_iter().rev() {
            pending.push((grandchild, Arc::clone(&child_copy)));
        }
    }

    copy
}
