use core::mem::size_of;

use super::{RBTree, next_tree_id};
use crate::raw::{Arena, Handle, Node};

impl<K, V> RBTree<K, V> {
    /// Creates an empty tree with room for at least `capacity` entries
    /// before it needs to reallocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let tree: RBTree<i32, i32> = RBTree::with_capacity(32);
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            root: None,
            len: 0,
            id: next_tree_id(),
        }
    }

    /// Returns how many entries the tree can hold without reallocating.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity().min(self.values.capacity())
    }

    /// Returns the largest number of entries the tree could ever hold.
    ///
    /// This is the smaller of the handle space and the number of nodes whose
    /// storage fits in `isize::MAX` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let tree: RBTree<u64, u64> = RBTree::new();
    /// assert!(tree.max_size() > 0);
    /// ```
    #[must_use]
    pub fn max_size(&self) -> usize {
        #[allow(clippy::cast_sign_loss)]
        let bytes = isize::MAX as usize;
        // Each arena also keeps a generation per slot.
        let per_entry = size_of::<Option<Node<K>>>() + size_of::<Option<V>>() + 2 * size_of::<u32>();
        Handle::COUNT.min(bytes / per_entry)
    }
}
