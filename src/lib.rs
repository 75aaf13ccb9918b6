//! Red-black tree collections for Rust.
//!
//! The heart of this crate is [`RBTree`], an ordered associative engine: a
//! red-black tree holding unique keys with O(log n) insertion, removal and
//! lookup. Three adapters are built on top of it:
//!
//! - [`RBTreeMap`] - an ordered map with unique keys
//! - [`RBTreeSet`] - an ordered set with unique items
//! - [`RBMultiSet`] - an ordered multiset that counts repeated items
//!
//! # Example
//!
//! ```
//! use rbtree_collections::{RBMultiSet, RBTreeMap};
//!
//! let mut scores = RBTreeMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//!
//! // `insert` never overwrites; `insert_or_assign` does.
//! assert!(!scores.insert("Bob", 0));
//! assert_eq!(scores.insert_or_assign("Bob", 90), Some(85));
//! assert_eq!(scores.at(&"Bob"), Ok(&90));
//!
//! let mut bag = RBMultiSet::new();
//! bag.insert('a');
//! bag.insert('a');
//! bag.insert('b');
//! assert_eq!(bag.count(&'a'), 2);
//! assert_eq!(bag.iter().collect::<String>(), "aab");
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Inspectable structure** - [`NodeRef`] handles expose colors and links for
//!   building further adapters on the engine
//! - **`tracing`** - Optional cargo feature that logs rebalancing and bulk operations
//!
//! # Implementation
//!
//! Nodes are kept in an arena and linked by non-zero indices rather than
//! pointers. Parent links are plain indices as well, so the tree never needs
//! reference counting, and a whole tree is released by dropping its arena.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: Mutable iteration needs a small amount of unsafe code to hand out disjoint value borrows.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;
mod tracing_helpers;

pub mod rbtree;
pub mod rbtree_map;
pub mod rbtree_multiset;
pub mod rbtree_set;

pub use error::Error;
pub use raw::Color;
pub use rbtree::{NodeRef, RBTree};
pub use rbtree_map::RBTreeMap;
pub use rbtree_multiset::RBMultiSet;
pub use rbtree_set::RBTreeSet;
