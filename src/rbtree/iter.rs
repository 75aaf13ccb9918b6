use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use super::{NodeRef, RBTree};
use crate::raw::{Arena, Handle, Node};

/// An iterator over the entries of an `RBTree`, sorted by key.
///
/// This `struct` is created by the [`iter`] method on [`RBTree`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use rbtree_collections::RBTree;
///
/// let tree: RBTree<_, _> = [(2, "b"), (1, "a")].into_iter().collect();
/// let mut iter = tree.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: RBTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    range: Range<'a, K, V>,
    remaining: usize,
}

/// A mutable iterator over the entries of an `RBTree`.
///
/// This `struct` is created by the [`iter_mut`] method on [`RBTree`]. See its
/// documentation for more.
///
/// [`iter_mut`]: RBTree::iter_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K: 'a, V: 'a> {
    tree: *mut RBTree<K, V>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
    _marker: PhantomData<&'a mut (K, V)>,
}

// SAFETY: IterMut behaves as &mut RBTree<K, V>, so it is Send when K and V are Send.
// It is NOT Sync because mutable iterators should not be shared across threads.
unsafe impl<K: Send, V: Send> Send for IterMut<'_, K, V> {}

/// An owning iterator over the entries of an `RBTree`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`RBTree`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of an `RBTree`.
///
/// This `struct` is created by the [`keys`] method on [`RBTree`].
///
/// [`keys`]: RBTree::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of an `RBTree`.
///
/// This `struct` is created by the [`values`] method on [`RBTree`].
///
/// [`values`]: RBTree::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// A mutable iterator over the values of an `RBTree`.
///
/// This `struct` is created by the [`values_mut`] method on [`RBTree`].
///
/// [`values_mut`]: RBTree::values_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

/// An iterator over a contiguous span of entries of an `RBTree`.
///
/// This `struct` is created by the [`iter_from`], [`range_between`] and
/// [`equal_range`] methods on [`RBTree`]. Both ends are inclusive handles,
/// and the span is exhausted once they meet.
///
/// [`iter_from`]: RBTree::iter_from
/// [`range_between`]: RBTree::range_between
/// [`equal_range`]: RBTree::equal_range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V> {
    tree: Option<&'a RBTree<K, V>>,
    front: Option<Handle>,
    back: Option<Handle>,
}

impl<K, V> RBTree<K, V> {
    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let tree: RBTree<_, _> = [(3, "c"), (2, "b"), (1, "a")].into_iter().collect();
    /// let (first_key, first_value) = tree.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            range: Range::new(self, self.first_handle(), self.last_handle()),
            remaining: self.len,
        }
    }

    /// Gets a mutable iterator over the entries of the tree, sorted by key.
    /// Keys stay immutable.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let mut tree: RBTree<_, _> = [("a", 1), ("b", 2)].into_iter().collect();
    /// for (_, value) in tree.iter_mut() {
    ///     *value *= 10;
    /// }
    /// assert_eq!(tree.get("b"), Some(&20));
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            front: self.first_handle(),
            back: self.last_handle(),
            remaining: self.len,
            tree: self,
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the tree, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Gets a mutable iterator over the values of the tree, in order by key.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut { inner: self.iter_mut() }
    }

    /// Iterates from `node` (inclusive) to the last entry.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let tree: RBTree<_, _> = (1..=5).map(|k| (k, ())).collect();
    /// let from = tree.lower_bound(&3).unwrap();
    /// let keys: Vec<_> = tree.iter_from(from).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [3, 4, 5]);
    /// ```
    pub fn iter_from(&self, node: NodeRef) -> Range<'_, K, V> {
        Range::new(self, Some(self.handle_of(node)), self.last_handle())
    }

    /// Iterates over the half-open span `[start, end)`.
    ///
    /// `None` for `start` means an empty span, mirroring a bound search that
    /// found nothing; `None` for `end` runs through the last entry. `end` must
    /// not come before `start` in key order, otherwise the entries yielded are
    /// unspecified.
    ///
    /// # Panics
    ///
    /// Panics if either reference is not a live node of this tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTree;
    ///
    /// let tree: RBTree<_, _> = (1..=9).map(|k| (k, ())).collect();
    /// let span = tree.range_between(tree.lower_bound(&3), tree.upper_bound(&6));
    /// let keys: Vec<_> = span.map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [3, 4, 5, 6]);
    /// ```
    pub fn range_between(&self, start: Option<NodeRef>, end: Option<NodeRef>) -> Range<'_, K, V> {
        let Some(start) = start.map(|node| self.handle_of(node)) else {
            return Range::new(self, None, None);
        };

        let back = match end.map(|node| self.handle_of(node)) {
            None => self.last_handle(),
            Some(end) if end == start => return Range::new(self, None, None),
            Some(end) => Self::predecessor_in(&self.nodes, end),
        };
        Range::new(self, Some(start), back)
    }

    /// # Safety
    /// - `ptr` must point to a valid, allocated `RBTree<K, V>`.
    /// - The node arena must not be mutated for `'a`.
    unsafe fn nodes_ptr<'a>(ptr: *const Self) -> &'a Arena<Node<K>> {
        // SAFETY: We only touch the `nodes` field, never the `values` field.
        unsafe { &*core::ptr::addr_of!((*ptr).nodes) }
    }

    /// # Safety
    /// - `ptr` must point to a valid, allocated `RBTree<K, V>`.
    /// - The caller must have logical exclusive access to the value at `handle`.
    unsafe fn value_mut_ptr<'a>(ptr: *mut Self, handle: Handle) -> &'a mut V {
        // SAFETY: We only touch the `values` field, avoiding aliasing with the `nodes` field.
        unsafe { Arena::get_mut_ptr(core::ptr::addr_of_mut!((*ptr).values), handle) }
    }
}

impl<'a, K, V> Range<'a, K, V> {
    /// `front` and `back` must both be `None` or both name live nodes with
    /// `front` not after `back`.
    pub(super) fn new(tree: &'a RBTree<K, V>, front: Option<Handle>, back: Option<Handle>) -> Self {
        let (front, back) = match (front, back) {
            (Some(front), Some(back)) => (Some(front), Some(back)),
            _ => (None, None),
        };
        Range {
            tree: Some(tree),
            front,
            back,
        }
    }

    /// Retires `handle` from the front or back; collapses the span once both ends meet.
    fn advance(&mut self, tree: &RBTree<K, V>, handle: Handle, forward: bool) {
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else if forward {
            self.front = RBTree::<K, V>::successor_in(&tree.nodes, handle);
        } else {
            self.back = RBTree::<K, V>::predecessor_in(&tree.nodes, handle);
        }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree?;
        let handle = self.front?;
        self.advance(tree, handle, true);
        Some(tree.entry(handle))
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for Range<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let tree = self.tree?;
        let handle = self.back?;
        self.advance(tree, handle, false);
        Some(tree.entry(handle))
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Range<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Default for Range<'_, K, V> {
    /// Creates an empty `rbtree::Range`.
    ///
    /// ```
    /// # use rbtree_collections::rbtree;
    /// let mut iter: rbtree::Range<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.next(), None);
    /// ```
    fn default() -> Self {
        Range {
            tree: None,
            front: None,
            back: None,
        }
    }
}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Range {
            tree: self.tree,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.range.next()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let entry = self.range.next_back()?;
        self.remaining -= 1;
        Some(entry)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

impl<K, V> Default for Iter<'_, K, V> {
    /// Creates an empty `rbtree::Iter`.
    ///
    /// ```
    /// # use rbtree_collections::rbtree;
    /// let iter: rbtree::Iter<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Iter {
            range: Range::default(),
            remaining: 0,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            range: self.range.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.front?;

        // SAFETY: We have exclusive access to the tree through the raw pointer, and the
        // tree's shape cannot change while the iterator borrows it. Keys live in the
        // nodes arena and values in the values arena, which are accessed separately.
        // Each handle is yielded once, so no value is borrowed twice.
        unsafe {
            let nodes = RBTree::nodes_ptr(self.tree);
            let node = nodes.get(handle);
            let value = RBTree::value_mut_ptr(self.tree, node.value());

            self.remaining -= 1;
            self.front = RBTree::<K, V>::successor_in(nodes, handle);

            Some((node.key(), value))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.back?;

        // SAFETY: Same as in next() - exclusive access, and the front and back cursors
        // never yield the same handle because `remaining` reaches zero first.
        unsafe {
            let nodes = RBTree::nodes_ptr(self.tree);
            let node = nodes.get(handle);
            let value = RBTree::value_mut_ptr(self.tree, node.value());

            self.remaining -= 1;
            self.back = RBTree::<K, V>::predecessor_in(nodes, handle);

            Some((node.key(), value))
        }
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IterMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.remaining).finish()
    }
}

impl<K, V> Default for IterMut<'_, K, V> {
    /// Creates an empty `rbtree::IterMut`.
    ///
    /// ```
    /// # use rbtree_collections::rbtree;
    /// let iter: rbtree::IterMut<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IterMut {
            tree: core::ptr::null_mut(),
            front: None,
            back: None,
            remaining: 0,
            _marker: PhantomData,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("len", &self.inner.len()).finish()
    }
}

impl<K, V> Default for IntoIter<K, V> {
    fn default() -> Self {
        IntoIter {
            inner: alloc::vec::Vec::new().into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Default for Keys<'_, K, V> {
    fn default() -> Self {
        Keys { inner: Iter::default() }
    }
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Default for Values<'_, K, V> {
    fn default() -> Self {
        Values { inner: Iter::default() }
    }
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

impl<K, V: fmt::Debug> fmt::Debug for ValuesMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuesMut").field("remaining", &self.inner.len()).finish()
    }
}

impl<K, V> Default for ValuesMut<'_, K, V> {
    fn default() -> Self {
        ValuesMut {
            inner: IterMut::default(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a RBTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut RBTree<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for RBTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the tree, sorted by key.
    fn into_iter(mut self) -> Self::IntoIter {
        IntoIter {
            inner: self.drain_to_vec().into_iter(),
        }
    }
}
