use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::Error;
use crate::raw::{Arena, Color, Handle, Node, Side};
use crate::tracing_helpers::debug_log;

mod balance;
mod capacity;
mod iter;

pub use iter::{IntoIter, Iter, IterMut, Keys, Range, Values, ValuesMut};

static NEXT_TREE_ID: AtomicUsize = AtomicUsize::new(0);

fn next_tree_id() -> usize {
    NEXT_TREE_ID.fetch_add(1, AtomicOrdering::Relaxed)
}

/// An opaque reference to a node of a particular [`RBTree`].
///
/// Node references are cheap to copy and stay valid until the entry they name
/// is removed or the tree is cleared. A reference remembers which tree issued
/// it and which occupant of its slot it was issued for: [`RBTree::swap`]
/// carries references along with the nodes, and methods that take a `NodeRef`
/// detect references from other trees and references to removed entries, even
/// after their slot has been reused.
///
/// Removing a node with two children moves its in-order successor's entry into
/// its slot. References to that successor are retired as well, so look the
/// entry up again to keep working with it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NodeRef {
    handle: Handle,
    generation: u32,
    tree: usize,
}

/// An ordered associative engine based on a [red-black tree].
///
/// Every key appears at most once. Insertion, removal and lookup take
/// O(log n) time because the tree maintains, after every mutating call:
///
/// 1. binary-search-tree ordering of keys,
/// 2. a black root,
/// 3. no red node with a red child, and
/// 4. the same number of black nodes on every path down to an empty child.
///
/// Together these bound the height at `2 * log2(n + 1)`.
///
/// Nodes live in an arena and are linked by handles. Parent links are plain
/// handles too, so the tree owns every node exactly once and never needs
/// reference counting. Callers can walk the structure through [`NodeRef`]s
/// ([`root`], [`left`], [`right`], [`parent`], [`successor`],
/// [`predecessor`]); this is what the [`RBTreeMap`], [`RBTreeSet`] and
/// [`RBMultiSet`] adapters are built from.
///
/// # Examples
///
/// ```
/// use rbtree_collections::{Color, RBTree};
///
/// let mut tree = RBTree::new();
/// assert!(tree.insert(1, "a"));
/// assert!(tree.insert(2, "b"));
/// assert!(tree.insert(3, "c"));
/// assert!(!tree.insert(2, "z"));
///
/// let root = tree.root().unwrap();
/// assert_eq!(*tree.key(root), 2);
/// assert_eq!(tree.color(root), Color::Black);
///
/// let keys: Vec<_> = tree.keys().copied().collect();
/// assert_eq!(keys, [1, 2, 3]);
/// ```
///
/// [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
/// [`root`]: RBTree::root
/// [`left`]: RBTree::left
/// [`right`]: RBTree::right
/// [`parent`]: RBTree::parent
/// [`successor`]: RBTree::successor
/// [`predecessor`]: RBTree::predecessor
/// [`RBTreeMap`]: crate::RBTreeMap
/// [`RBTreeSet`]: crate::RBTreeSet
/// [`RBMultiSet`]: crate::RBMultiSet
pub struct RBTree<K, V> {
    /// Arena storing the tree nodes (keys, colors and links).
    nodes: Arena<Node<K>>,
    /// Arena storing the values, so link walks never borrow them.
    values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Number of live nodes.
    len: usize,
    /// Identity stamped into every `NodeRef` this tree hands out.
    id: usize,
}

/// Outcome of a key descent.
enum SearchResult {
    Found(Handle),
    /// Where a new node would hang: parent and side, or `None` for the root.
    Vacant(Option<(Handle, Side)>),
}

/// The attach point of a key that a descent did not find.
///
/// Only valid until the tree it came from is next mutated.
#[derive(Clone, Copy)]
pub(crate) struct Vacancy(Option<(Handle, Side)>);

impl<K, V> RBTree<K, V> {
    /// Makes a new, empty `RBTree`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let mut tree = RBTree::new();
    /// tree.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            len: 0,
            id: next_tree_id(),
        }
    }

    /// Returns the number of entries in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every entry.
    ///
    /// All outstanding [`NodeRef`]s become invalid.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        debug_log!(len = self.len, "clearing tree");
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.len = 0;
        // Slot generations restart, so earlier references must not match.
        self.id = next_tree_id();
    }

    /// Exchanges the contents of two trees in O(1).
    ///
    /// Node references follow their nodes into the other tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let mut a = RBTree::new();
    /// let mut b = RBTree::new();
    /// a.insert(1, ());
    /// let one = a.find(&1).unwrap();
    ///
    /// a.swap(&mut b);
    /// assert!(a.is_empty());
    /// assert_eq!(*b.key(one), 1);
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Returns a reference to the root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef> {
        self.root.map(|h| self.node_ref(h))
    }

    /// Returns the parent of `node`, or `None` for the root.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    #[must_use]
    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(self.handle_of(node)).parent().map(|h| self.node_ref(h))
    }

    /// Returns the left child of `node`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    #[must_use]
    pub fn left(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(self.handle_of(node)).left().map(|h| self.node_ref(h))
    }

    /// Returns the right child of `node`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    #[must_use]
    pub fn right(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(self.handle_of(node)).right().map(|h| self.node_ref(h))
    }

    /// Returns the color of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    #[must_use]
    pub fn color(&self, node: NodeRef) -> Color {
        self.node(self.handle_of(node)).color()
    }

    /// Returns the key stored in `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    #[must_use]
    pub fn key(&self, node: NodeRef) -> &K {
        self.node(self.handle_of(node)).key()
    }

    /// Returns the value stored in `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    #[must_use]
    pub fn value(&self, node: NodeRef) -> &V {
        self.values.get(self.node(self.handle_of(node)).value())
    }

    /// Returns the value stored in `node` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    pub fn value_mut(&mut self, node: NodeRef) -> &mut V {
        let value = self.node(self.handle_of(node)).value();
        self.values.get_mut(value)
    }

    /// Returns the entry stored in `node`, or [`Error::InvalidNode`] if the
    /// reference does not name a live node of this tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::{Error, RBTree};
    ///
    /// let mut a = RBTree::new();
    /// a.insert(1, "a");
    /// let node = a.find(&1).unwrap();
    /// assert_eq!(a.get_node(node), Ok((&1, &"a")));
    ///
    /// let b: RBTree<i32, &str> = RBTree::new();
    /// assert_eq!(b.get_node(node), Err(Error::InvalidNode));
    /// ```
    pub fn get_node(&self, node: NodeRef) -> Result<(&K, &V), Error> {
        let handle = self.try_handle_of(node)?;
        Ok(self.entry(handle))
    }

    /// Returns `true` if `node` names a live node of this tree.
    #[must_use]
    pub fn contains_node(&self, node: NodeRef) -> bool {
        self.try_handle_of(node).is_ok()
    }

    /// Returns the node with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<NodeRef> {
        self.first_handle().map(|h| self.node_ref(h))
    }

    /// Returns the node with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<NodeRef> {
        self.last_handle().map(|h| self.node_ref(h))
    }

    /// Returns the first entry in key order.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.first_handle().map(|h| self.entry(h))
    }

    /// Returns the last entry in key order.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.last_handle().map(|h| self.entry(h))
    }

    /// Returns the node that follows `node` in key order, or `None` when
    /// `node` holds the largest key.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, O(1) amortized over a full traversal.
    #[must_use]
    pub fn successor(&self, node: NodeRef) -> Option<NodeRef> {
        Self::successor_in(&self.nodes, self.handle_of(node)).map(|h| self.node_ref(h))
    }

    /// Returns the node that precedes `node` in key order, or `None` when
    /// `node` holds the smallest key.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    #[must_use]
    pub fn predecessor(&self, node: NodeRef) -> Option<NodeRef> {
        Self::predecessor_in(&self.nodes, self.handle_of(node)).map(|h| self.node_ref(h))
    }

    /// Removes the entry held by `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNode`] if `node` was issued by another tree or
    /// its node has already been removed. The tree is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::{Error, RBTree};
    ///
    /// let mut tree = RBTree::new();
    /// tree.insert(1, "a");
    /// let node = tree.find(&1).unwrap();
    ///
    /// assert_eq!(tree.remove_node(node), Ok((1, "a")));
    /// assert_eq!(tree.remove_node(node), Err(Error::InvalidNode));
    /// ```
    pub fn remove_node(&mut self, node: NodeRef) -> Result<(K, V), Error> {
        let handle = self.try_handle_of(node)?;
        Ok(self.unlink(handle))
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let handle = self.first_handle()?;
        Some(self.unlink(handle))
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let handle = self.last_handle()?;
        Some(self.unlink(handle))
    }

    /// Retains only the entries specified by the predicate, visiting them in
    /// ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let mut tree: RBTree<i32, i32> = (0..8).map(|k| (k, k * 10)).collect();
    /// tree.retain(|&k, _| k % 2 == 0);
    /// assert!(tree.keys().eq([0, 2, 4, 6].iter()));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n log n) worst case.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut current = self.first_handle();
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let next = Self::successor_in(&self.nodes, handle);
            if f(node.key(), self.values.get_mut(node.value())) {
                current = next;
                continue;
            }

            // With two children the successor's entry moves into this slot.
            let two_children = node.left().is_some() && node.right().is_some();
            self.unlink(handle);
            current = if two_children { Some(handle) } else { next };
        }
    }

    #[inline]
    fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<K> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    fn node_ref(&self, handle: Handle) -> NodeRef {
        NodeRef {
            handle,
            generation: self.nodes.generation(handle),
            tree: self.id,
        }
    }

    fn try_handle_of(&self, node: NodeRef) -> Result<Handle, Error> {
        if node.tree == self.id
            && self.nodes.contains(node.handle)
            && self.nodes.generation(node.handle) == node.generation
        {
            Ok(node.handle)
        } else {
            Err(Error::InvalidNode)
        }
    }

    fn handle_of(&self, node: NodeRef) -> Handle {
        assert!(
            self.try_handle_of(node).is_ok(),
            "`RBTree::handle_of()` - node reference does not name a live node of this tree!"
        );
        node.handle
    }

    #[inline]
    fn entry(&self, handle: Handle) -> (&K, &V) {
        let node = self.node(handle);
        (node.key(), self.values.get(node.value()))
    }

    /// Absent children count as black.
    #[inline]
    fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|h| self.node(h).is_red())
    }

    fn first_handle(&self) -> Option<Handle> {
        self.root.map(|root| Self::min_in(&self.nodes, root))
    }

    fn last_handle(&self) -> Option<Handle> {
        self.root.map(|root| Self::max_in(&self.nodes, root))
    }

    /// Leftmost node of the subtree rooted at `handle`.
    fn min_in(nodes: &Arena<Node<K>>, mut handle: Handle) -> Handle {
        while let Some(left) = nodes.get(handle).left() {
            handle = left;
        }
        handle
    }

    /// Rightmost node of the subtree rooted at `handle`.
    fn max_in(nodes: &Arena<Node<K>>, mut handle: Handle) -> Handle {
        while let Some(right) = nodes.get(handle).right() {
            handle = right;
        }
        handle
    }

    fn successor_in(nodes: &Arena<Node<K>>, handle: Handle) -> Option<Handle> {
        if let Some(right) = nodes.get(handle).right() {
            return Some(Self::min_in(nodes, right));
        }

        // Climb until we arrive from a left edge.
        let mut child = handle;
        let mut parent = nodes.get(handle).parent();
        while let Some(p) = parent {
            if nodes.get(p).left() == Some(child) {
                return Some(p);
            }
            child = p;
            parent = nodes.get(p).parent();
        }
        None
    }

    fn predecessor_in(nodes: &Arena<Node<K>>, handle: Handle) -> Option<Handle> {
        if let Some(left) = nodes.get(handle).left() {
            return Some(Self::max_in(nodes, left));
        }

        let mut child = handle;
        let mut parent = nodes.get(handle).parent();
        while let Some(p) = parent {
            if nodes.get(p).right() == Some(child) {
                return Some(p);
            }
            child = p;
            parent = nodes.get(p).parent();
        }
        None
    }

    /// Allocates a red leaf at `slot` and restores the coloring invariants.
    fn attach(&mut self, slot: Option<(Handle, Side)>, key: K, value: V) -> Handle {
        let value = self.values.alloc(value);
        let handle = self.nodes.alloc(Node::new(key, value));

        match slot {
            None => self.root = Some(handle),
            Some((parent, side)) => {
                self.node_mut(handle).set_parent(Some(parent));
                self.node_mut(parent).set_child(side, Some(handle));
            }
        }
        self.len += 1;

        self.insert_fixup(handle);
        handle
    }

    /// Physically removes the entry at `handle` and rebalances.
    fn unlink(&mut self, handle: Handle) -> (K, V) {
        let node = self.node(handle);

        // A node with two children trades entries with its in-order successor,
        // which has no left child, and that slot is spliced out instead.
        let target = match (node.left(), node.right()) {
            (Some(_), Some(right)) => {
                let successor = Self::min_in(&self.nodes, right);
                let (doomed, heir) = self.nodes.get_pair_mut(handle, successor);
                doomed.swap_payload(heir);
                // The slot now holds another entry; retire references to the old one.
                self.nodes.bump_generation(handle);
                successor
            }
            _ => handle,
        };

        let node = self.node(target);
        let child = node.left().or(node.right());
        let parent = node.parent();
        let side = parent.map(|p| self.node(p).side_of(target));
        let removed_black = !node.is_red();

        self.replace_child(parent, target, child);
        if let Some(child) = child {
            self.node_mut(child).set_parent(parent);
        }

        let (key, value) = self.nodes.take(target).into_payload();
        let value = self.values.take(value);
        self.len -= 1;

        if removed_black {
            if let Some(child) = child.filter(|&c| self.node(c).is_red()) {
                self.node_mut(child).set_color(Color::Black);
            } else if let (Some(parent), Some(side)) = (parent, side) {
                self.fix_double_black(parent, side);
            }
        }

        (key, value)
    }

    /// Takes every entry out in key order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut handles = Vec::with_capacity(self.len);
        let mut current = self.first_handle();
        while let Some(handle) = current {
            handles.push(handle);
            current = Self::successor_in(&self.nodes, handle);
        }

        let entries = handles
            .into_iter()
            .map(|handle| {
                let (key, value) = self.nodes.take(handle).into_payload();
                (key, self.values.take(value))
            })
            .collect();

        self.clear();
        entries
    }
}

impl<K: Ord, V> RBTree<K, V> {
    fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut slot = None;

        while let Some(handle) = current {
            let node = self.node(handle);
            let side = match key.cmp(node.key().borrow()) {
                Ordering::Equal => return SearchResult::Found(handle),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            slot = Some((handle, side));
            current = node.child(side);
        }

        SearchResult::Vacant(slot)
    }

    /// Returns the node holding `key`, if any.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn find<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            SearchResult::Found(handle) => Some(self.node_ref(handle)),
            SearchResult::Vacant(_) => None,
        }
    }

    /// Returns `true` if the tree holds `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        matches!(self.search(key), SearchResult::Found(_))
    }

    /// Returns a reference to the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            SearchResult::Found(handle) => {
                let value = self.node(handle).value();
                Some(self.values.get_mut(value))
            }
            SearchResult::Vacant(_) => None,
        }
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            SearchResult::Found(handle) => Some(self.entry(handle)),
            SearchResult::Vacant(_) => None,
        }
    }

    /// Inserts `key` with `value` unless the key is already present.
    ///
    /// Returns `true` if a new entry was created. When the key already exists
    /// the tree is left exactly as it was (same shape, same colors, same value)
    /// and the arguments are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let mut tree = RBTree::new();
    /// assert!(tree.insert(37, "a"));
    /// assert!(!tree.insert(37, "b"));
    /// assert_eq!(tree.get(&37), Some(&"a"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.insert_node(key, value).1
    }

    /// Like [`insert`](RBTree::insert), but also returns the node that holds
    /// `key` afterwards, whether it was just created or already present.
    pub fn insert_node(&mut self, key: K, value: V) -> (NodeRef, bool) {
        match self.search(&key) {
            SearchResult::Found(handle) => (self.node_ref(handle), false),
            SearchResult::Vacant(slot) => {
                let handle = self.attach(slot, key, value);
                (self.node_ref(handle), true)
            }
        }
    }

    /// Descends once for `key`, returning its node or where it would go.
    pub(crate) fn locate(&self, key: &K) -> Result<NodeRef, Vacancy> {
        match self.search(key) {
            SearchResult::Found(handle) => Ok(self.node_ref(handle)),
            SearchResult::Vacant(slot) => Err(Vacancy(slot)),
        }
    }

    /// Inserts `key` at a vacancy from [`locate`](RBTree::locate) without
    /// descending again.
    pub(crate) fn insert_vacant(&mut self, vacancy: Vacancy, key: K, value: V) -> NodeRef {
        let handle = self.attach(vacancy.0, key, value);
        self.node_ref(handle)
    }

    /// Fallible [`insert`](RBTree::insert).
    ///
    /// Storage for the new node is reserved before any link is touched, so an
    /// allocation failure leaves the tree unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the node could not be allocated,
    /// either because the allocator refused or because the tree already holds
    /// [`max_size`](RBTree::max_size) entries.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<bool, Error> {
        let slot = match self.search(&key) {
            SearchResult::Found(_) => return Ok(false),
            SearchResult::Vacant(slot) => slot,
        };

        if self.len >= Handle::COUNT {
            return Err(Error::AllocationFailed);
        }
        self.nodes.try_reserve_one().map_err(|_| Error::AllocationFailed)?;
        self.values.try_reserve_one().map_err(|_| Error::AllocationFailed)?;

        self.attach(slot, key, value);
        Ok(true)
    }

    /// Removes `key` from the tree, returning the stored entry if it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let mut tree = RBTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.remove(&1), Some((1, "a")));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            SearchResult::Found(handle) => Some(self.unlink(handle)),
            SearchResult::Vacant(_) => None,
        }
    }

    /// Returns the first node whose key is not less than `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let tree: RBTree<_, _> = [(10, ()), (20, ()), (30, ())].into_iter().collect();
    /// let node = tree.lower_bound(&15).unwrap();
    /// assert_eq!(*tree.key(node), 20);
    /// assert_eq!(tree.lower_bound(&20), tree.find(&20));
    /// assert_eq!(tree.lower_bound(&31), None);
    /// ```
    pub fn lower_bound<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut best = None;
        while let Some(handle) = current {
            let node = self.node(handle);
            if node.key().borrow() < key {
                current = node.right();
            } else {
                best = Some(handle);
                current = node.left();
            }
        }
        best.map(|h| self.node_ref(h))
    }

    /// Returns the first node whose key is greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut best = None;
        while let Some(handle) = current {
            let node = self.node(handle);
            if node.key().borrow() > key {
                best = Some(handle);
                current = node.left();
            } else {
                current = node.right();
            }
        }
        best.map(|h| self.node_ref(h))
    }

    /// Returns an iterator over the entries equal to `key`: the half-open span
    /// from [`lower_bound`](RBTree::lower_bound) to
    /// [`upper_bound`](RBTree::upper_bound), which holds at most one entry.
    pub fn equal_range<Q>(&self, key: &Q) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            SearchResult::Found(handle) => Range::new(self, Some(handle), Some(handle)),
            SearchResult::Vacant(_) => Range::new(self, None, None),
        }
    }

    /// Moves every entry of `other` whose key is not yet present into `self`.
    ///
    /// Entries are visited in ascending key order. On a key collision the
    /// entry of `self` is kept and the colliding entry stays in `other`, so
    /// `other` ends up empty exactly when the two key sets were disjoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let mut a: RBTree<_, _> = [(3, "c")].into_iter().collect();
    /// let mut b: RBTree<_, _> = [(1, "a"), (2, "b"), (3, "z")].into_iter().collect();
    ///
    /// a.append(&mut b);
    /// assert_eq!(a.len(), 3);
    /// assert_eq!(a.get(&3), Some(&"c"));
    /// assert_eq!(b.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(m log(n + m)), where m is the size of `other` and n is the size of `self`.
    pub fn append(&mut self, other: &mut Self) {
        if other.is_empty() {
            return;
        }

        // Fast path: nothing can collide with an empty tree.
        if self.is_empty() {
            self.swap(other);
            return;
        }

        debug_log!(len = self.len, incoming = other.len, "appending tree");
        for (key, value) in other.drain_to_vec() {
            match self.search(&key) {
                SearchResult::Found(_) => {
                    other.insert(key, value);
                }
                SearchResult::Vacant(slot) => {
                    self.attach(slot, key, value);
                }
            }
        }
    }
}

impl<K: Clone, V: Clone> Clone for RBTree<K, V> {
    /// Deep-copies the tree, preserving its shape and colors.
    fn clone(&self) -> Self {
        // Pending copies: source node, copied parent and the side to hang from.
        // The depth of a red-black tree is logarithmic, so the stack stays small.
        let mut stack: SmallVec<[(Handle, Option<(Handle, Side)>); 64]> = SmallVec::new();
        let mut nodes = Arena::with_capacity(self.len);
        let mut values = Arena::with_capacity(self.len);
        let mut root = None;

        debug_log!(len = self.len, "cloning tree");
        if let Some(handle) = self.root {
            stack.push((handle, None));
        }

        // Pre-order: each node is copied before its children.
        while let Some((source, slot)) = stack.pop() {
            let node = self.node(source);
            let value = values.alloc(self.values.get(node.value()).clone());
            let copy = nodes.alloc(Node::with_color(node.key().clone(), value, node.color()));

            match slot {
                None => root = Some(copy),
                Some((parent, side)) => {
                    nodes.get_mut(copy).set_parent(Some(parent));
                    nodes.get_mut(parent).set_child(side, Some(copy));
                }
            }

            if let Some(right) = node.right() {
                stack.push((right, Some((copy, Side::Right))));
            }
            if let Some(left) = node.left() {
                stack.push((left, Some((copy, Side::Left))));
            }
        }

        Self {
            nodes,
            values,
            root,
            len: self.len,
            id: next_tree_id(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RBTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for RBTree<K, V> {
    fn default() -> Self {
        RBTree::new()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for RBTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq> Eq for RBTree<K, V> {}

impl<K: Ord, V> FromIterator<(K, V)> for RBTree<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = RBTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for RBTree<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}
