use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rbtree_collections::rbtree_map::Entry;
use rbtree_collections::{Color, Error, RBTreeMap};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

fn key_strategy() -> impl Strategy<Value = i64> {
    // Use a range that's smaller than TEST_SIZE to ensure key collisions
    -2_000i64..2_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    InsertOrAssign(i64, i64),
    Remove(i64),
    Get(i64),
    At(i64),
    ContainsKey(i64),
    LowerBound(i64),
    UpperBound(i64),
    FirstKeyValue,
    LastKeyValue,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        2 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::InsertOrAssign(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::At),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => key_strategy().prop_map(MapOp::LowerBound),
        1 => key_strategy().prop_map(MapOp::UpperBound),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

// ─── Core CRUD operations ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both RBTreeMap and BTreeMap
    /// and asserts identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut rb_map: RBTreeMap<i64, i64> = RBTreeMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match *op {
                MapOp::Insert(k, v) => {
                    let rb_result = rb_map.insert(k, v);
                    let bt_result = !bt_map.contains_key(&k);
                    bt_map.entry(k).or_insert(v);
                    prop_assert_eq!(rb_result, bt_result, "insert({}, {})", k, v);
                }
                MapOp::InsertOrAssign(k, v) => {
                    let rb_result = rb_map.insert_or_assign(k, v);
                    let bt_result = bt_map.insert(k, v);
                    prop_assert_eq!(rb_result, bt_result, "insert_or_assign({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(rb_map.remove(&k), bt_map.remove(&k), "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(rb_map.get(&k), bt_map.get(&k), "get({})", k);
                }
                MapOp::At(k) => {
                    prop_assert_eq!(rb_map.at(&k), bt_map.get(&k).ok_or(Error::KeyNotFound), "at({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(rb_map.contains_key(&k), bt_map.contains_key(&k), "contains_key({})", k);
                }
                MapOp::LowerBound(k) => {
                    prop_assert_eq!(rb_map.lower_bound(&k), bt_map.range(k..).next(), "lower_bound({})", k);
                }
                MapOp::UpperBound(k) => {
                    let bt_result = bt_map.range(k + 1..).next();
                    prop_assert_eq!(rb_map.upper_bound(&k), bt_result, "upper_bound({})", k);
                }
                MapOp::FirstKeyValue => {
                    prop_assert_eq!(rb_map.first_key_value(), bt_map.first_key_value(), "first_key_value");
                }
                MapOp::LastKeyValue => {
                    prop_assert_eq!(rb_map.last_key_value(), bt_map.last_key_value(), "last_key_value");
                }
                MapOp::PopFirst => {
                    prop_assert_eq!(rb_map.pop_first(), bt_map.pop_first(), "pop_first");
                }
                MapOp::PopLast => {
                    prop_assert_eq!(rb_map.pop_last(), bt_map.pop_last(), "pop_last");
                }
            }
            prop_assert_eq!(rb_map.len(), bt_map.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(rb_map.is_empty(), bt_map.is_empty(), "is_empty mismatch after {:?}", op);
        }

        prop_assert!(rb_map.iter().eq(bt_map.iter()));
    }

    /// Tests that all iterator flavors agree with BTreeMap, from both ends.
    #[test]
    fn iterators_match_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE)) {
        let rb_map: RBTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();
        for (k, v) in &entries {
            bt_map.entry(*k).or_insert(*v);
        }

        prop_assert_eq!(rb_map.iter().len(), bt_map.len());
        prop_assert!(rb_map.iter().eq(bt_map.iter()));
        prop_assert!(rb_map.iter().rev().eq(bt_map.iter().rev()));
        prop_assert!(rb_map.keys().eq(bt_map.keys()));
        prop_assert!(rb_map.values().rev().eq(bt_map.values().rev()));
        prop_assert!(rb_map.clone().into_iter().eq(bt_map.clone().into_iter()));
        prop_assert!(rb_map.into_iter().rev().eq(bt_map.into_iter().rev()));
    }

    #[test]
    fn mutable_iterators_match_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE)) {
        let mut rb_map: RBTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();
        for (k, v) in &entries {
            bt_map.entry(*k).or_insert(*v);
        }

        for (k, v) in rb_map.iter_mut() {
            *v = v.wrapping_add(*k);
        }
        for (k, v) in &mut bt_map {
            *v = v.wrapping_add(*k);
        }
        for v in rb_map.values_mut().rev() {
            *v = v.wrapping_mul(3);
        }
        for v in bt_map.values_mut() {
            *v = v.wrapping_mul(3);
        }

        prop_assert!(rb_map.iter().eq(bt_map.iter()));
    }

    #[test]
    fn retain_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let mut rb_map: RBTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt_map: BTreeMap<i64, i64> = rb_map.iter().map(|(k, v)| (*k, *v)).collect();

        rb_map.retain(|k, v| (k ^ *v) & 1 == 0);
        bt_map.retain(|k, v| (k ^ *v) & 1 == 0);

        prop_assert!(rb_map.iter().eq(bt_map.iter()));
        if let Some(root) = rb_map.as_tree().root() {
            prop_assert_eq!(rb_map.as_tree().color(root), Color::Black);
        }
    }

    #[test]
    fn append_matches_btreemap(
        entries_a in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        entries_b in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
    ) {
        let mut rb_a: RBTreeMap<i64, i64> = entries_a.iter().copied().collect();
        let mut rb_b: RBTreeMap<i64, i64> = entries_b.iter().copied().collect();

        let bt_a: BTreeMap<i64, i64> = rb_a.iter().map(|(k, v)| (*k, *v)).collect();
        let bt_b: BTreeMap<i64, i64> = rb_b.iter().map(|(k, v)| (*k, *v)).collect();
        let mut expected = bt_b.clone();
        expected.extend(bt_a.clone());
        let leftovers: BTreeMap<i64, i64> = bt_b.into_iter().filter(|(k, _)| bt_a.contains_key(k)).collect();

        rb_a.append(&mut rb_b);

        prop_assert!(rb_a.iter().eq(expected.iter()));
        prop_assert!(rb_b.iter().eq(leftovers.iter()));
    }

    #[test]
    fn entry_api_matches_btreemap(
        initial in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        entry_keys in proptest::collection::vec(key_strategy(), TEST_SIZE / 2),
    ) {
        let mut rb_map: RBTreeMap<i64, i64> = initial.iter().copied().collect();
        let mut bt_map: BTreeMap<i64, i64> = rb_map.iter().map(|(k, v)| (*k, *v)).collect();

        for k in &entry_keys {
            rb_map.entry(*k).and_modify(|v| *v = v.wrapping_add(1)).or_insert(*k);
            bt_map.entry(*k).and_modify(|v| *v = v.wrapping_add(1)).or_insert(*k);
        }

        prop_assert!(rb_map.iter().eq(bt_map.iter()));
    }

    #[test]
    fn clone_and_eq_match_btreemap(
        entries_a in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE / 2),
        entries_b in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE / 2),
    ) {
        let rb_a: RBTreeMap<i64, i64> = entries_a.iter().copied().collect();
        let rb_b: RBTreeMap<i64, i64> = entries_b.iter().copied().collect();
        let bt_a: BTreeMap<i64, i64> = rb_a.iter().map(|(k, v)| (*k, *v)).collect();
        let bt_b: BTreeMap<i64, i64> = rb_b.iter().map(|(k, v)| (*k, *v)).collect();

        prop_assert_eq!(rb_a.clone(), rb_a.clone());
        prop_assert_eq!(rb_a == rb_b, bt_a == bt_b);
        prop_assert_eq!(rb_a.cmp(&rb_b), bt_a.cmp(&bt_b));
    }
}

// ─── Adapter-specific behavior ───────────────────────────────────────────────

#[test]
fn insert_never_overwrites() {
    let mut map = RBTreeMap::from([("a", 1)]);
    assert!(!map.insert("a", 2));
    assert_eq!(map["a"], 1);
    assert_eq!(map.insert_or_assign("a", 3), Some(1));
    assert_eq!(map["a"], 3);
}

#[test]
fn insert_many_reports_each_element() {
    let mut map = RBTreeMap::new();
    assert_eq!(map.insert_many([(2, 'b'), (1, 'a'), (2, 'z')]), [true, true, false]);
    assert_eq!(map.iter().collect::<Vec<_>>(), [(&1, &'a'), (&2, &'b')]);
}

#[test]
fn get_or_insert_default_acts_as_subscript() {
    let mut map: RBTreeMap<&str, Vec<u32>> = RBTreeMap::new();
    map.get_or_insert_default("evens").push(2);
    map.get_or_insert_default("evens").push(4);
    map.get_or_insert_default("odds").push(1);

    assert_eq!(map["evens"], [2, 4]);
    assert_eq!(map["odds"], [1]);
}

#[test]
fn at_mut_reports_missing_keys() {
    let mut map = RBTreeMap::from([(1, 10)]);
    *map.at_mut(&1).unwrap() += 5;
    assert_eq!(map.at(&1), Ok(&15));
    assert_eq!(map.at_mut(&2).map(|v| *v), Err(Error::KeyNotFound));
}

#[test]
fn occupied_entry_round_trip() {
    let mut map = RBTreeMap::from([(1, "one"), (2, "two")]);

    match map.entry(2) {
        Entry::Occupied(mut entry) => {
            assert_eq!(entry.key(), &2);
            assert_eq!(entry.insert("deux"), "two");
            assert_eq!(entry.remove_entry(), (2, "deux"));
        }
        Entry::Vacant(_) => panic!("expected an occupied entry"),
    }
    assert_eq!(map.len(), 1);

    match map.entry(3) {
        Entry::Vacant(entry) => {
            assert_eq!(entry.into_key(), 3);
        }
        Entry::Occupied(_) => panic!("expected a vacant entry"),
    }
    assert_eq!(map.len(), 1);
}

#[test]
fn remove_node_through_find() {
    let mut map = RBTreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    let node = map.find(&3).unwrap();
    assert_eq!(map.get_node(node), Ok((&3, &'c')));
    assert_eq!(map.remove_node(node), Ok((3, 'c')));
    assert_eq!(map.get_node(node), Err(Error::InvalidNode));

    let other = RBTreeMap::from([(1, 'a')]);
    let foreign = other.find(&1).unwrap();
    assert_eq!(map.remove_node(foreign), Err(Error::InvalidNode));
    assert_eq!(map.len(), 2);
}

#[test]
fn equal_range_holds_at_most_one_entry() {
    let map = RBTreeMap::from([(1, 'a'), (2, 'b')]);
    assert_eq!(map.equal_range(&2).collect::<Vec<_>>(), [(&2, &'b')]);
    assert_eq!(map.equal_range(&3).next(), None);
}

#[test]
fn swap_and_clear() {
    let mut a = RBTreeMap::from([(1, 1)]);
    let mut b = RBTreeMap::from([(2, 2), (3, 3)]);
    a.swap(&mut b);
    assert_eq!(a.len(), 2);
    assert_eq!(b.len(), 1);

    a.clear();
    assert!(a.is_empty());
    assert_eq!(a.first_key_value(), None);
}

#[test]
fn capacity_and_max_size() {
    let map: RBTreeMap<u64, u64> = RBTreeMap::with_capacity(64);
    assert!(map.capacity() >= 64);
    assert!(map.max_size() >= map.capacity());
}

#[test]
fn debug_formats_as_a_map() {
    let map = RBTreeMap::from([(2, "b"), (1, "a")]);
    assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
}
