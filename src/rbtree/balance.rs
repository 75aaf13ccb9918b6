//! Rotations and the recoloring passes that restore the red-black invariants
//! after a structural change.

use super::RBTree;
use crate::raw::{Color, Handle, Side};
use crate::tracing_helpers::trace_log;

impl<K, V> RBTree<K, V> {
    /// Points whatever referenced `old` (a parent's child slot, or the root)
    /// at `new` instead. Does not touch `new`'s parent link.
    pub(super) fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.node(parent).side_of(old);
                self.node_mut(parent).set_child(side, new);
            }
        }
    }

    /// Rotates the subtree rooted at `pivot` towards `dir`.
    ///
    /// The child on the opposite side takes `pivot`'s place, and `pivot`
    /// becomes its `dir` child. Key order is preserved, colors are untouched.
    ///
    /// ```text
    ///        p                     c
    ///       / \     rotate        / \
    ///      a   c    ----->       p   e
    ///         / \   (Left)      / \
    ///        d   e             a   d
    /// ```
    pub(super) fn rotate(&mut self, pivot: Handle, dir: Side) {
        let heir = self
            .node(pivot)
            .child(dir.opposite())
            .expect("`RBTree::rotate()` - rotation needs a child on the opposite side!");
        let inner = self.node(heir).child(dir);

        self.node_mut(pivot).set_child(dir.opposite(), inner);
        if let Some(inner) = inner {
            self.node_mut(inner).set_parent(Some(pivot));
        }

        let parent = self.node(pivot).parent();
        self.node_mut(heir).set_parent(parent);
        self.replace_child(parent, pivot, Some(heir));

        self.node_mut(heir).set_child(dir, Some(pivot));
        self.node_mut(pivot).set_parent(Some(heir));
    }

    #[inline]
    pub(super) fn rotate_left(&mut self, pivot: Handle) {
        self.rotate(pivot, Side::Left);
    }

    #[inline]
    pub(super) fn rotate_right(&mut self, pivot: Handle) {
        self.rotate(pivot, Side::Right);
    }

    fn set_color(&mut self, handle: Handle, color: Color) {
        self.node_mut(handle).set_color(color);
    }

    /// Repairs a red-red violation introduced by linking the red node `node`.
    pub(super) fn insert_fixup(&mut self, mut node: Handle) {
        while let Some(parent) = self.node(node).parent()
            && self.node(parent).is_red()
        {
            // A red parent is never the root, so the grandparent exists.
            let grandparent = self
                .node(parent)
                .parent()
                .expect("`RBTree::insert_fixup()` - red node has no parent!");
            let side = self.node(grandparent).side_of(parent);
            let uncle = self.node(grandparent).child(side.opposite());

            if let Some(uncle) = uncle.filter(|&u| self.node(u).is_red()) {
                trace_log!("insert fixup: recolor");
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            // Inner grandchild: straighten the zig-zag first.
            let mut top = parent;
            if self.node(parent).side_of(node) != side {
                trace_log!("insert fixup: inner rotation");
                self.rotate(parent, side);
                top = node;
            }

            trace_log!("insert fixup: outer rotation");
            self.set_color(top, Color::Black);
            self.set_color(grandparent, Color::Red);
            match side {
                Side::Left => self.rotate_right(grandparent),
                Side::Right => self.rotate_left(grandparent),
            }
            break;
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    /// Repairs the black-height deficit left on `side` of `parent` after a
    /// black node was spliced out there.
    pub(super) fn fix_double_black(&mut self, mut parent: Handle, mut side: Side) {
        loop {
            // The deficient side has black-height at least one less than its
            // sibling, which therefore exists.
            let mut sibling = self
                .node(parent)
                .child(side.opposite())
                .expect("`RBTree::fix_double_black()` - deficient node has no sibling!");

            if self.node(sibling).is_red() {
                trace_log!("delete fixup: red sibling");
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                continue;
            }

            let near = self.node(sibling).child(side);
            let far = self.node(sibling).child(side.opposite());

            if self.is_red(near) || self.is_red(far) {
                if !self.is_red(far) {
                    trace_log!("delete fixup: near nibling red");
                    let near = near.expect("`RBTree::fix_double_black()` - red nibling vanished!");
                    self.set_color(near, Color::Black);
                    self.set_color(sibling, Color::Red);
                    self.rotate(sibling, side.opposite());
                    sibling = near;
                }

                trace_log!("delete fixup: far nibling red");
                let parent_color = self.node(parent).color();
                self.set_color(sibling, parent_color);
                self.set_color(parent, Color::Black);
                if let Some(far) = self.node(sibling).child(side.opposite()) {
                    self.set_color(far, Color::Black);
                }
                self.rotate(parent, side);
                break;
            }

            // Both nephews black: push the deficit up.
            self.set_color(sibling, Color::Red);
            if self.node(parent).is_red() {
                self.set_color(parent, Color::Black);
                break;
            }

            let Some(grandparent) = self.node(parent).parent() else {
                break;
            };
            side = self.node(grandparent).side_of(parent);
            parent = grandparent;
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }
}
