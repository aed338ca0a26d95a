//! Memory-optimized child collection for tree nodes.
//!
//! Most nodes of a calling-context tree have zero or one child, so the
//! collection has three representations:
//! - `Empty`: no allocation at all
//! - `One`: the single child handle stored inline
//! - `Many`: an exact-length boxed slice, rebuilt on every append
//!
//! `Many` never carries spare capacity, so appends into it are O(n).

use parking_lot::RwLock;
use std::sync::Arc;

/// Internal representation of a child collection
#[derive(Debug)]
pub(crate) enum Children<N> {
    Empty,
    One(Arc<N>),
    Many(Box<[Arc<N>]>),
}

impl<N> Children<N> {
    pub(crate) fn as_slice(&self) -> &[Arc<N>] {
        match self {
            Children::Empty => &[],
            Children::One(child) => std::slice::from_ref(child),
            Children::Many(children) => &children[..],
        }
    }

    /// Append preserving first-attachment order
    pub(crate) fn push(&mut self, node: Arc<N>) {
        *self = match std::mem::replace(self, Children::Empty) {
            Children::Empty => Children::One(node),
            Children::One(first) => Children::Many(vec![first, node].into_boxed_slice()),
            Children::Many(existing) => {
                let mut grown = Vec::with_capacity(existing.len() + 1);
                grown.extend(existing.into_vec());
                grown.push(node);
                Children::Many(grown.into_boxed_slice())
            }
        };
    }
}

/// Append-only, concurrently readable child collection of one parent
///
/// Readers take the read lock and so never observe a half-built `Many`
/// slice. Appends are serialized per parent by the write lock.
#[derive(Debug)]
pub struct ChildStore<N> {
    inner: RwLock<Children<N>>,
}

impl<N> Default for ChildStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> ChildStore<N> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Children::Empty),
        }
    }

    /// Snapshot of the child handles in attachment order (possibly empty)
    pub fn children(&self) -> Vec<Arc<N>> {
        self.inner.read().as_slice().to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.read().as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(*self.inner.read(), Children::Empty)
    }

    /// Borrow the children under the read lock
    ///
    /// `f` must not attach to this same store.
    pub fn with_children<R>(&self, f: impl FnOnce(&[Arc<N>]) -> R) -> R {
        f(self.inner.read().as_slice())
    }

    /// Raw append; does not check for an existing child with the same identity
    pub fn attach(&self, node: Arc<N>) {
        self.inner.write().push(node);
    }

    /// Atomic find-or-create
    ///
    /// Probes under the read lock first. On a miss the write lock is taken
    /// and the probe repeated, so two callers racing on the same new identity
    /// end up sharing one child. Returns the child and whether it was created.
    pub fn get_or_attach_with<F, C>(&self, find: F, create: C) -> (Arc<N>, bool)
    where
        F: Fn(&[Arc<N>]) -> Option<&Arc<N>>,
        C: FnOnce() -> N,
    {
        if let Some(existing) = find(self.inner.read().as_slice()) {
            return (Arc::clone(existing), false);
        }

        let mut guard = self.inner.write();
        if let Some(existing) = find(guard.as_slice()) {
            return (Arc::clone(existing), false);
        }

        let node = Arc::new(create());
        guard.push(Arc::clone(&node));
        (node, true)
    }

    #[cfg(test)]
    pub(crate) fn representation(&self) -> &'static str {
        match *self.inner.read() {
            Children::Empty => "empty",
            Children::One(_) => "one",
            Children::Many(_) => "many",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn find_seven(children: &[Arc<u32>]) -> Option<&Arc<u32>> {
        children.iter().find(|c| ***c == 7)
    }

    fn values(store: &ChildStore<u32>) -> Vec<u32> {
        store.children().iter().map(|c| **c).collect()
    }

    #[test]
    fn test_empty_store() {
        let store: ChildStore<u32> = ChildStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.children().is_empty());
        assert_eq!(store.representation(), "empty");
    }

    #[test]
    fn test_representation_transitions() {
        let store = ChildStore::new();

        store.attach(Arc::new(1u32));
        assert_eq!(store.representation(), "one");
        assert_eq!(values(&store), vec![1]);

        store.attach(Arc::new(2u32));
        assert_eq!(store.representation(), "many");
        assert_eq!(values(&store), vec![1, 2]);

        store.attach(Arc::new(3u32));
        assert_eq!(values(&store), vec![1, 2, 3]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_many_has_exact_length() {
        let mut children = Children::Empty;
        for i in 0..5u32 {
            children.push(Arc::new(i));
        }
        match children {
            Children::Many(slice) => assert_eq!(slice.len(), 5),
            other => panic!("expected Many, got {:?}", other),
        }
    }

    #[test]
    fn test_get_or_attach_reuses_existing() {
        let store = ChildStore::new();
        let (first, created) = store.get_or_attach_with(find_seven, || 7u32);
        assert!(created);

        let (second, created) = store.get_or_attach_with(find_seven, || 7u32);
        assert!(!created);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_with_children_borrows() {
        let store = ChildStore::new();
        store.attach(Arc::new(4u32));
        store.attach(Arc::new(5u32));

        let sum: u32 = store.with_children(|c| c.iter().map(|v| **v).sum());
        assert_eq!(sum, 9);
    }

    proptest! {
        #[test]
        fn children_preserve_attachment_order(input in proptest::collection::vec(any::<u32>(), 0..40)) {
            let store = ChildStore::new();
            for value in &input {
                store.attach(Arc::new(*value));
            }
            prop_assert_eq!(values(&store), input.clone());
            prop_assert_eq!(store.len(), input.len());
        }
    }
}
