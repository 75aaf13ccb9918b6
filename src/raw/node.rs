use super::handle::Handle;

/// The color bit of a red-black tree node.
///
/// Absent children count as [`Color::Black`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    /// A red node. Its children are always black.
    Red,
    /// A black node. Every path to a leaf crosses the same number of these.
    Black,
}

/// Which child slot of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

// The value lives in a separate arena so that walking links never borrows it.
pub(crate) struct Node<K> {
    key: K,
    value: Handle,
    color: Color,
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
}

impl<K> Node<K> {
    /// Creates a detached red node.
    pub(crate) const fn new(key: K, value: Handle) -> Self {
        Self::with_color(key, value, Color::Red)
    }

    /// Creates a detached node with the given color.
    pub(crate) const fn with_color(key: K, value: Handle, color: Color) -> Self {
        Self {
            key,
            value,
            color,
            parent: None,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) const fn value(&self) -> Handle {
        self.value
    }

    #[inline]
    pub(crate) const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub(crate) const fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }

    #[inline]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Returns which side `child` hangs from. Panics if it is not a child of this node.
    #[inline]
    pub(crate) fn side_of(&self, child: Handle) -> Side {
        if self.left == Some(child) {
            Side::Left
        } else {
            assert_eq!(self.right, Some(child), "`Node::side_of()` - `child` is not linked here!");
            Side::Right
        }
    }

    /// Exchanges key and value with `other`, leaving links and colors in place.
    pub(crate) fn swap_payload(&mut self, other: &mut Node<K>) {
        core::mem::swap(&mut self.key, &mut other.key);
        core::mem::swap(&mut self.value, &mut other.value);
    }

    /// Consumes the node, returning its key and value handle.
    pub(crate) fn into_payload(self) -> (K, Handle) {
        (self.key, self.value)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn slot(index: usize) -> Handle {
        Handle::try_from_index(index).unwrap()
    }

    #[test]
    fn new_nodes_are_red_and_detached() {
        let node = Node::new(7, slot(0));
        assert_eq!(node.color(), Color::Red);
        assert!(node.is_red());
        assert_eq!(node.parent(), None);
        assert_eq!(node.left(), None);
        assert_eq!(node.right(), None);
    }

    #[test]
    fn children_by_side() {
        let mut node = Node::with_color(1, slot(0), Color::Black);
        let a = slot(1);
        let b = slot(2);
        node.set_child(Side::Left, Some(a));
        node.set_child(Side::Right, Some(b));

        assert_eq!(node.child(Side::Left), Some(a));
        assert_eq!(node.child(Side::Right.opposite()), Some(a));
        assert_eq!(node.side_of(a), Side::Left);
        assert_eq!(node.side_of(b), Side::Right);
    }

    #[test]
    #[should_panic(expected = "`Node::side_of()` - `child` is not linked here!")]
    fn side_of_unlinked_child_panics() {
        let node = Node::new(1, slot(0));
        let _ = node.side_of(slot(3));
    }

    #[test]
    fn swap_payload_keeps_links() {
        let mut a = Node::with_color("a", slot(0), Color::Black);
        let mut b = Node::new("b", slot(1));
        a.set_parent(Some(slot(5)));

        a.swap_payload(&mut b);

        assert_eq!(*a.key(), "b");
        assert_eq!(a.value(), slot(1));
        assert_eq!(a.color(), Color::Black);
        assert_eq!(a.parent(), Some(slot(5)));
        assert_eq!(b.into_payload(), ("a", slot(0)));
    }
}
