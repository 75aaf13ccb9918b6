use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::num::NonZero;

use alloc::vec::Vec;

use crate::Error;
use crate::rbtree::{NodeRef, RBTree, Range};
use crate::tracing_helpers::debug_log;

/// An ordered multiset based on a red-black tree.
///
/// Equal items are not stored separately: the tree holds each distinct item
/// once, together with the number of times it was inserted. The item kept is
/// the first one inserted; later equal items only bump the count and are
/// dropped.
///
/// # Examples
///
/// ```
/// use rbtree_collections::RBMultiSet;
///
/// let mut bag = RBMultiSet::new();
/// assert_eq!(bag.insert("apple"), 1);
/// assert_eq!(bag.insert("apple"), 2);
/// assert_eq!(bag.insert("pear"), 1);
///
/// assert_eq!(bag.len(), 3);
/// assert_eq!(bag.distinct_len(), 2);
/// assert_eq!(bag.count("apple"), 2);
///
/// assert!(bag.remove_one("apple"));
/// assert_eq!(bag.count("apple"), 1);
/// assert_eq!(bag.remove_all("apple"), 1);
/// assert!(!bag.contains("apple"));
/// ```
pub struct RBMultiSet<T> {
    tree: RBTree<T, NonZero<usize>>,
    /// Total occurrences across all items.
    len: usize,
}

/// An iterator over the items of a `RBMultiSet`, each repeated as many times
/// as it occurs.
///
/// This `struct` is created by the [`iter`] and [`equal_range`] methods on
/// [`RBMultiSet`].
///
/// [`iter`]: RBMultiSet::iter
/// [`equal_range`]: RBMultiSet::equal_range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    inner: Range<'a, T, NonZero<usize>>,
    /// Item being repeated from the front, and how many repeats are left.
    front: Option<(&'a T, usize)>,
    back: Option<(&'a T, usize)>,
    remaining: usize,
}

impl<T> RBMultiSet<T> {
    /// Makes a new, empty `RBMultiSet`.
    #[must_use]
    pub fn new() -> Self {
        RBMultiSet {
            tree: RBTree::new(),
            len: 0,
        }
    }

    /// Creates an empty multiset with room for at least `capacity` distinct
    /// items.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RBMultiSet {
            tree: RBTree::with_capacity(capacity),
            len: 0,
        }
    }

    /// Returns the largest number of distinct items the multiset could ever
    /// hold.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    /// Returns the total number of occurrences.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of distinct items.
    #[must_use]
    pub const fn distinct_len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the multiset holds nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.len = 0;
    }

    /// Exchanges the contents of two multisets in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Returns the underlying tree, whose values are the occurrence counts.
    #[must_use]
    pub const fn as_tree(&self) -> &RBTree<T, NonZero<usize>> {
        &self.tree
    }

    /// Returns the item held by `node` together with its count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNode`] if `node` was issued by another multiset
    /// or its item has since been removed.
    pub fn get_node(&self, node: NodeRef) -> Result<(&T, usize), Error> {
        self.tree.get_node(node).map(|(item, count)| (item, count.get()))
    }

    /// Removes one occurrence of the item held by `node`, returning how many
    /// remain. At zero the item itself is dropped and `node` goes stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNode`] if `node` was issued by another multiset
    /// or its item has since been removed. The multiset is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::{Error, RBMultiSet};
    ///
    /// let mut bag = RBMultiSet::from([7, 7]);
    /// let node = bag.find(&7).unwrap();
    /// assert_eq!(bag.remove_node(node), Ok(1));
    /// assert_eq!(bag.remove_node(node), Ok(0));
    /// assert_eq!(bag.remove_node(node), Err(Error::InvalidNode));
    /// assert!(bag.is_empty());
    /// ```
    pub fn remove_node(&mut self, node: NodeRef) -> Result<usize, Error> {
        let count = self.tree.get_node(node)?.1.get();
        match NonZero::new(count - 1) {
            Some(fewer) => *self.tree.value_mut(node) = fewer,
            None => {
                self.tree.remove_node(node)?;
            }
        }
        self.len -= 1;
        Ok(count - 1)
    }

    /// Returns the smallest item.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.first_key_value().map(|(k, _)| k)
    }

    /// Returns the largest item.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last_key_value().map(|(k, _)| k)
    }

    /// Gets an iterator over all occurrences in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBMultiSet;
    ///
    /// let bag = RBMultiSet::from([3, 1, 3, 2, 3]);
    /// let items: Vec<_> = bag.iter().copied().collect();
    /// assert_eq!(items, [1, 2, 3, 3, 3]);
    /// assert_eq!(bag.iter().rev().next(), Some(&3));
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.tree.range_between(self.tree.first(), None), self.len)
    }

    /// Gets an iterator over the distinct items with their counts.
    pub fn counts(&self) -> impl DoubleEndedIterator<Item = (&T, usize)> + ExactSizeIterator {
        self.tree.iter().map(|(item, count)| (item, count.get()))
    }
}

impl<T: Ord> RBMultiSet<T> {
    /// Adds one occurrence of `value`, returning its new count.
    ///
    /// # Panics
    ///
    /// Panics if the count of `value`, or the total number of occurrences,
    /// would overflow `usize`.
    ///
    /// # Complexity
    ///
    /// O(log n), where n is the number of distinct items.
    pub fn insert(&mut self, value: T) -> usize {
        let (node, inserted) = self.tree.insert_node(value, NonZero::<usize>::MIN);
        let count = self.tree.value_mut(node);
        if !inserted {
            *count = count.checked_add(1).expect("`RBMultiSet::insert()` - occurrence count overflow!");
        }
        let count = count.get();
        self.len = self.len.checked_add(1).expect("`RBMultiSet::insert()` - total length overflow!");
        count
    }

    /// Adds one occurrence of each value of `iter`, returning the new count of
    /// each.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBMultiSet;
    ///
    /// let mut bag = RBMultiSet::new();
    /// assert_eq!(bag.insert_many(['x', 'y', 'x']), [1, 1, 2]);
    /// ```
    pub fn insert_many<I>(&mut self, iter: I) -> Vec<usize>
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter().map(|value| self.insert(value)).collect()
    }

    /// Returns how many times `value` occurs.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.get(value).map_or(0, |count| count.get())
    }

    /// Returns the node holding `value`, for use with
    /// [`get_node`](RBMultiSet::get_node) and
    /// [`remove_node`](RBMultiSet::remove_node).
    pub fn find<Q>(&self, value: &Q) -> Option<NodeRef>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.find(value)
    }

    /// Returns `true` if `value` occurs at least once.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.contains(value)
    }

    /// Removes one occurrence of `value`, dropping the item when its count
    /// reaches zero. Returns whether an occurrence was removed.
    pub fn remove_one<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(count) = self.tree.get_mut(value) else {
            return false;
        };

        match NonZero::new(count.get() - 1) {
            Some(fewer) => *count = fewer,
            None => {
                self.tree.remove(value);
            }
        }
        self.len -= 1;
        true
    }

    /// Removes every occurrence of `value`, returning how many there were.
    pub fn remove_all<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let removed = self.tree.remove(value).map_or(0, |(_, count)| count.get());
        self.len -= removed;
        removed
    }

    /// Returns the smallest item not less than `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.lower_bound(value).map(|node| self.tree.key(node))
    }

    /// Returns the smallest item greater than `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.upper_bound(value).map(|node| self.tree.key(node))
    }

    /// Iterates over every occurrence equal to `value`: the span from
    /// [`lower_bound`](RBMultiSet::lower_bound) to
    /// [`upper_bound`](RBMultiSet::upper_bound).
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBMultiSet;
    ///
    /// let bag = RBMultiSet::from([1, 2, 2, 3]);
    /// assert_eq!(bag.equal_range(&2).count(), 2);
    /// assert_eq!(bag.equal_range(&4).count(), 0);
    /// ```
    pub fn equal_range<Q>(&self, value: &Q) -> Iter<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Iter::new(self.tree.equal_range(value), self.count(value))
    }

    /// Moves every occurrence out of `other` into `self`; counts of equal
    /// items add up. `other` is left empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBMultiSet;
    ///
    /// let mut a = RBMultiSet::from([1, 2]);
    /// let mut b = RBMultiSet::from([2, 3]);
    /// a.append(&mut b);
    /// assert_eq!(a.len(), 4);
    /// assert_eq!(a.count(&2), 2);
    /// assert!(b.is_empty());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if a combined count, or the combined total, would overflow
    /// `usize`.
    pub fn append(&mut self, other: &mut Self) {
        if self.is_empty() {
            self.swap(other);
            return;
        }

        let total = self.len.checked_add(other.len).expect("`RBMultiSet::append()` - total length overflow!");
        debug_log!(len = self.len, incoming = other.len, "appending multiset");
        for (value, extra) in other.tree.drain_to_vec() {
            let (node, inserted) = self.tree.insert_node(value, extra);
            if !inserted {
                let count = self.tree.value_mut(node);
                *count = count.checked_add(extra.get()).expect("`RBMultiSet::append()` - occurrence count overflow!");
            }
        }
        self.len = total;
        other.len = 0;
    }
}

impl<T: Clone> Clone for RBMultiSet<T> {
    fn clone(&self) -> Self {
        RBMultiSet {
            tree: self.tree.clone(),
            len: self.len,
        }
    }
}

impl<T: PartialEq> PartialEq for RBMultiSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.tree == other.tree
    }
}

impl<T: Eq> Eq for RBMultiSet<T> {}

impl<T: fmt::Debug> fmt::Debug for RBMultiSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for RBMultiSet<T> {
    fn default() -> Self {
        RBMultiSet::new()
    }
}

impl<T: Ord> FromIterator<T> for RBMultiSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = RBMultiSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord> Extend<T> for RBMultiSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for RBMultiSet<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, T> IntoIterator for &'a RBMultiSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iter<'a, T> {
    fn new(inner: Range<'a, T, NonZero<usize>>, remaining: usize) -> Self {
        Iter {
            inner,
            front: None,
            back: None,
            remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }

        // Once the inner span is exhausted the last item may be held by the back cursor.
        if self.front.is_none() {
            self.front = self.inner.next().map(|(item, count)| (item, count.get())).or_else(|| self.back.take());
        }

        let (item, repeats) = self.front.as_mut()?;
        let item = *item;
        *repeats -= 1;
        if *repeats == 0 {
            self.front = None;
        }
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }

        if self.back.is_none() {
            self.back = self.inner.next_back().map(|(item, count)| (item, count.get())).or_else(|| self.front.take());
        }

        let (item, repeats) = self.back.as_mut()?;
        let item = *item;
        *repeats -= 1;
        if *repeats == 0 {
            self.back = None;
        }
        self.remaining -= 1;
        Some(item)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Default for Iter<'_, T> {
    fn default() -> Self {
        Iter::new(Range::default(), 0)
    }
}
