use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Index;

use alloc::vec::Vec;

use crate::rbtree::RBTree;
use crate::{Error, NodeRef};

mod entry;

pub use crate::rbtree::{IntoIter, Iter, IterMut, Keys, Range, Values, ValuesMut};
pub use entry::{Entry, OccupiedEntry, VacantEntry};

/// An ordered map based on a red-black tree.
///
/// Keys are unique. Unlike the standard library's maps, [`insert`] never
/// overwrites: inserting a key that is already present keeps the existing
/// value and reports `false`. Use [`insert_or_assign`] or the [`entry`] API to
/// replace values.
///
/// It is a logic error for a key to be modified in such a way that the key's
/// ordering relative to any other key, as determined by the [`Ord`] trait,
/// changes while it is in the map. The behavior resulting from such a logic
/// error is not specified, but will be encapsulated to the `RBTreeMap` that
/// observed the logic error and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use rbtree_collections::{Error, RBTreeMap};
///
/// let mut reviews = RBTreeMap::new();
/// reviews.insert("Office Space", "Deals with real issues in the workplace.");
/// reviews.insert("Pulp Fiction", "Masterpiece.");
///
/// assert!(reviews.contains_key("Pulp Fiction"));
/// assert_eq!(reviews.at("Gone Girl"), Err(Error::KeyNotFound));
///
/// reviews.remove("Office Space");
/// for (movie, review) in &reviews {
///     println!("{movie}: \"{review}\"");
/// }
/// ```
///
/// A `RBTreeMap` with a known list of items can be initialized from an array:
///
/// ```
/// use rbtree_collections::RBTreeMap;
///
/// let solar_distance = RBTreeMap::from([
///     ("Mercury", 0.4),
///     ("Venus", 0.7),
///     ("Earth", 1.0),
///     ("Mars", 1.5),
/// ]);
/// assert_eq!(solar_distance.len(), 4);
/// ```
///
/// [`insert`]: RBTreeMap::insert
/// [`insert_or_assign`]: RBTreeMap::insert_or_assign
/// [`entry`]: RBTreeMap::entry
pub struct RBTreeMap<K, V> {
    tree: RBTree<K, V>,
}

impl<K, V> RBTreeMap<K, V> {
    /// Makes a new, empty `RBTreeMap`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        RBTreeMap { tree: RBTree::new() }
    }

    /// Creates an empty map with room for at least `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RBTreeMap {
            tree: RBTree::with_capacity(capacity),
        }
    }

    /// Returns the current capacity of the map.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Returns the largest number of entries the map could ever hold.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    /// Returns the number of elements in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Clears the map, removing all elements.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Exchanges the contents of two maps in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Returns the underlying tree, for structural inspection.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::{Color, RBTreeMap};
    ///
    /// let map = RBTreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// let tree = map.as_tree();
    /// let root = tree.root().unwrap();
    /// assert_eq!(*tree.key(root), 2);
    /// assert_eq!(tree.color(root), Color::Black);
    /// ```
    #[must_use]
    pub const fn as_tree(&self) -> &RBTree<K, V> {
        &self.tree
    }

    /// Returns the entry held by `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNode`] if `node` does not name a live entry of
    /// this map.
    pub fn get_node(&self, node: NodeRef) -> Result<(&K, &V), Error> {
        self.tree.get_node(node)
    }

    /// Removes the entry held by `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNode`] if `node` does not name a live entry of
    /// this map; the map is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::from([(1, "a"), (2, "b")]);
    /// let node = map.find(&2).unwrap();
    /// assert_eq!(map.remove_node(node), Ok((2, "b")));
    /// assert!(map.remove_node(node).is_err());
    /// ```
    pub fn remove_node(&mut self, node: NodeRef) -> Result<(K, V), Error> {
        self.tree.remove_node(node)
    }

    /// Returns the first key-value pair in the map.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first_key_value()
    }

    /// Returns the last key-value pair in the map.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last_key_value()
    }

    /// Removes and returns the first element in the map.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first()
    }

    /// Removes and returns the last element in the map.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last()
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let mut map: RBTreeMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert!(map.into_iter().eq(vec![(0, 0), (2, 20), (4, 40), (6, 60)]));
    /// ```
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.tree.retain(f);
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.tree.iter_mut()
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        self.tree.keys()
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        self.tree.values()
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::from([(1, String::from("hello")), (2, String::from("goodbye"))]);
    /// for value in a.values_mut() {
    ///     value.push_str("!");
    /// }
    /// let values: Vec<String> = a.values().cloned().collect();
    /// assert_eq!(values, [String::from("hello!"), String::from("goodbye!")]);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        self.tree.values_mut()
    }
}

impl<K: Ord, V> RBTreeMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.get_mut(key)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.get_key_value(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.contains(key)
    }

    /// Returns a reference to the node holding `key`, for use with
    /// [`get_node`](RBTreeMap::get_node) and
    /// [`remove_node`](RBTreeMap::remove_node).
    pub fn find<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.find(key)
    }

    /// Checked access to the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::{Error, RBTreeMap};
    ///
    /// let map = RBTreeMap::from([("a", 1)]);
    /// assert_eq!(map.at("a"), Ok(&1));
    /// assert_eq!(map.at("b"), Err(Error::KeyNotFound));
    /// ```
    pub fn at<Q>(&self, key: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.get(key).ok_or(Error::KeyNotFound)
    }

    /// Checked mutable access to the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the key is absent.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the value stored under `key`, inserting `V::default()` first if
    /// the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let mut counts: RBTreeMap<&str, u32> = RBTreeMap::new();
    /// *counts.get_or_insert_default("x") += 1;
    /// *counts.get_or_insert_default("x") += 1;
    /// assert_eq!(counts["x"], 2);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Inserts a key-value pair unless the key is already present.
    ///
    /// Returns `true` if the pair was inserted. If the key was present the map
    /// is not modified: the existing value is kept and `key` and `value` are
    /// dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// assert!(map.insert(37, "a"));
    /// assert!(!map.insert(37, "b"));
    /// assert_eq!(map[&37], "a");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.tree.insert(key, value)
    }

    /// Fallible [`insert`](RBTreeMap::insert).
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if storage for the new entry could
    /// not be reserved; the map is left unchanged.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<bool, Error> {
        self.tree.try_insert(key, value)
    }

    /// Inserts a key-value pair, replacing the value if the key is present.
    ///
    /// Returns the previous value, if any. The stored key is not updated.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// assert_eq!(map.insert_or_assign(37, "a"), None);
    /// assert_eq!(map.insert_or_assign(37, "b"), Some("a"));
    /// assert_eq!(map[&37], "b");
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Option<V> {
        match self.entry(key) {
            Entry::Occupied(mut entry) => Some(entry.insert(value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Inserts every pair of `iter` in order, returning for each whether it
    /// was inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// let inserted = map.insert_many([(1, 'a'), (2, 'b'), (1, 'c')]);
    /// assert_eq!(inserted, [true, true, false]);
    /// assert_eq!(map[&1], 'a');
    /// ```
    pub fn insert_many<I>(&mut self, iter: I) -> Vec<bool>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        iter.into_iter().map(|(k, v)| self.insert(k, v)).collect()
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let mut count: RBTreeMap<&str, usize> = RBTreeMap::new();
    ///
    /// // count the number of occurrences of letters in the vec
    /// for x in ["a", "b", "a", "c", "a", "b"] {
    ///     count.entry(x).and_modify(|curr| *curr += 1).or_insert(1);
    /// }
    ///
    /// assert_eq!(count["a"], 3);
    /// assert_eq!(count["b"], 2);
    /// assert_eq!(count["c"], 1);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        match self.tree.locate(&key) {
            Ok(node) => Entry::Occupied(OccupiedEntry {
                node,
                tree: &mut self.tree,
            }),
            Err(vacancy) => Entry::Vacant(VacantEntry {
                key,
                vacancy,
                tree: &mut self.tree,
            }),
        }
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.remove(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.remove(key)
    }

    /// Returns the first entry whose key is not less than `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(10, 'a'), (20, 'b'), (30, 'c')]);
    /// assert_eq!(map.lower_bound(&20), Some((&20, &'b')));
    /// assert_eq!(map.lower_bound(&21), Some((&30, &'c')));
    /// assert_eq!(map.lower_bound(&31), None);
    /// ```
    pub fn lower_bound<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.lower_bound(key).map(|node| (self.tree.key(node), self.tree.value(node)))
    }

    /// Returns the first entry whose key is greater than `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(10, 'a'), (20, 'b'), (30, 'c')]);
    /// assert_eq!(map.upper_bound(&20), Some((&30, &'c')));
    /// assert_eq!(map.upper_bound(&5), Some((&10, &'a')));
    /// assert_eq!(map.upper_bound(&30), None);
    /// ```
    pub fn upper_bound<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.upper_bound(key).map(|node| (self.tree.key(node), self.tree.value(node)))
    }

    /// Returns an iterator over the entries with keys equal to `key`: the
    /// span from [`lower_bound`](RBTreeMap::lower_bound) up to
    /// [`upper_bound`](RBTreeMap::upper_bound).
    pub fn equal_range<Q>(&self, key: &Q) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.equal_range(key)
    }

    /// Moves all entries from `other` whose keys are not yet in `self`.
    ///
    /// On a collision the entry already in `self` wins and the colliding entry
    /// stays in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_collections::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::from([(1, "a"), (3, "c")]);
    /// let mut b = RBTreeMap::from([(2, "b"), (3, "z")]);
    ///
    /// a.append(&mut b);
    /// assert_eq!(a.len(), 3);
    /// assert_eq!(a[&3], "c");
    /// assert_eq!(b.into_iter().collect::<Vec<_>>(), [(3, "z")]);
    /// ```
    pub fn append(&mut self, other: &mut Self) {
        self.tree.append(&mut other.tree);
    }
}

impl<K: Clone, V: Clone> Clone for RBTreeMap<K, V> {
    fn clone(&self) -> Self {
        RBTreeMap {
            tree: self.tree.clone(),
        }
    }
}

impl<K: Hash, V: Hash> Hash for RBTreeMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for RBTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, V: Eq> Eq for RBTreeMap<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for RBTreeMap<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord> Ord for RBTreeMap<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RBTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

impl<K, V> Default for RBTreeMap<K, V> {
    /// Creates an empty `RBTreeMap`.
    fn default() -> Self {
        RBTreeMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RBTreeMap<K, V> {
    /// Builds a map from pairs. The first occurrence of a key wins.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        RBTreeMap {
            tree: iter.into_iter().collect(),
        }
    }
}

impl<K: Ord, V> Extend<(K, V)> for RBTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.tree.extend(iter);
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for RBTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<'a, K, V> IntoIterator for &'a RBTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut RBTreeMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for RBTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        self.tree.into_iter()
    }
}

impl<K, Q, V> Index<&Q> for RBTreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the `RBTreeMap`.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for RBTreeMap<K, V> {
    /// Converts a `[(K, V); N]` into a `RBTreeMap<K, V>`.
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn at_reports_missing_keys() {
        let mut map = RBTreeMap::from([(1, 10)]);
        assert_eq!(map.at(&1), Ok(&10));
        assert_eq!(map.at(&2), Err(Error::KeyNotFound));

        *map.at_mut(&1).unwrap() += 1;
        assert_eq!(map[&1], 11);
        assert_eq!(map.at_mut(&2), Err(Error::KeyNotFound));
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_panics_on_missing_key() {
        let map: RBTreeMap<i32, i32> = RBTreeMap::new();
        let _ = map[&1];
    }

    #[test]
    fn insert_keeps_existing_value() {
        let mut map = RBTreeMap::new();
        assert!(map.insert(String::from("k"), 1));
        assert!(!map.insert(String::from("k"), 2));
        assert_eq!(map.get("k"), Some(&1));
        assert_eq!(map.insert_or_assign(String::from("k"), 3), Some(1));
        assert_eq!(map.get("k"), Some(&3));
    }

    #[test]
    fn bounds_on_empty_map() {
        let map: RBTreeMap<i32, i32> = RBTreeMap::new();
        assert_eq!(map.lower_bound(&0), None);
        assert_eq!(map.upper_bound(&0), None);
        assert_eq!(map.equal_range(&0).count(), 0);
        assert_eq!(map.first_key_value(), None);
    }

    #[test]
    fn ordering_follows_entries() {
        let a = RBTreeMap::from([(1, 1), (2, 2)]);
        let b = RBTreeMap::from([(1, 1), (3, 0)]);
        assert!(a < b);
        assert_eq!(a.clone(), a);
        assert_ne!(a, b);
    }

    #[test]
    fn vacant_entries_attach_like_insert() {
        let keys = [50, 20, 80, 10, 30, 25, 27, 26, 90, 95, 99, 5, 1];
        let mut by_entry = RBTreeMap::new();
        let mut by_insert = RBTreeMap::new();
        for k in keys {
            let Entry::Vacant(v) = by_entry.entry(k) else {
                panic!("{k} is not in the map yet");
            };
            assert_eq!(*v.insert(k * 10), k * 10);
            by_insert.insert(k, k * 10);
            by_entry.tree.validate_invariants();
        }

        let shape = |map: &RBTreeMap<i32, i32>| {
            let tree = &map.tree;
            let mut out = Vec::new();
            let mut node = tree.first();
            while let Some(n) = node {
                out.push((*tree.key(n), tree.color(n), tree.parent(n).map(|p| *tree.key(p))));
                node = tree.successor(n);
            }
            out
        };
        assert_eq!(shape(&by_entry), shape(&by_insert));
        assert_eq!(by_entry, by_insert);
    }
}
