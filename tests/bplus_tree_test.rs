// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! B+Tree Index Tests
//!
//! Range lookups against a brute-force scan, duplicate handling and
//! rebuild idempotence for several node orders.

use colstore::storage::index::BPlusTree;

/// Deterministic pseudo-random values in `0..modulus`
fn values(count: usize, modulus: i32, seed: u64) -> Vec<i32> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as i32).rem_euclid(modulus)
        })
        .collect()
}

fn brute_force(data: &[i32], lower: i32, upper: i32) -> Vec<u32> {
    let mut rows: Vec<(i32, u32)> = data
        .iter()
        .enumerate()
        .filter(|&(_, &v)| lower <= v && v < upper)
        .map(|(i, &v)| (v, i as u32))
        .collect();
    // key order, insertion order within a key
    rows.sort_by_key(|&(v, i)| (v, i));
    rows.into_iter().map(|(_, i)| i).collect()
}

#[test]
fn test_small_tree_range() {
    let mut tree = BPlusTree::new(4).unwrap();
    for (row, key) in [10, 20, 5, 15].into_iter().enumerate() {
        tree.insert(key, row as u32).unwrap();
    }
    assert_eq!(tree.find_range(5, 16), vec![2, 0, 3]);
    assert_eq!(tree.find_range(16, 100), vec![1]);
    assert!(tree.find_range(21, 30).is_empty());
}

#[test]
fn test_matches_brute_force() {
    for order in [3, 4, 5, 16, 64] {
        let data = values(2000, 300, order as u64);
        let tree = BPlusTree::build(order, &data).unwrap();
        assert_eq!(tree.len(), data.len());
        for (lower, upper) in [(0, 1), (17, 18), (-5, 40), (100, 250), (299, 300), (0, 300)] {
            assert_eq!(
                tree.find_range(lower, upper),
                brute_force(&data, lower, upper),
                "order {} range [{}, {})",
                order,
                lower,
                upper
            );
        }
    }
}

#[test]
fn test_duplicates_keep_insertion_order() {
    let mut tree = BPlusTree::new(3).unwrap();
    let mut expected = Vec::new();
    for row in 0..50u32 {
        let key = if row % 3 == 0 { 7 } else { row as i32 };
        if key == 7 {
            expected.push(row);
        }
        tree.insert(key, row).unwrap();
    }
    assert_eq!(tree.find(7), expected);
    assert_eq!(tree.find_range(7, 8), expected);
}

#[test]
fn test_entries_are_sorted() {
    let data = values(500, 1000, 7);
    let tree = BPlusTree::build(5, &data).unwrap();
    let keys: Vec<i32> = tree.entries().map(|(k, _)| k).collect();
    let mut sorted = data.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
    assert!(tree.height() > 1);
}

#[test]
fn test_rebuild_is_idempotent() {
    let data = values(1000, 50, 42);
    let first = BPlusTree::build(8, &data).unwrap();
    let second = BPlusTree::build(8, &data).unwrap();
    for lower in (0..50).step_by(7) {
        assert_eq!(first.find_range(lower, lower + 9), second.find_range(lower, lower + 9));
    }
}

#[test]
fn test_extreme_keys() {
    let data = vec![i32::MIN, 0, i32::MAX, -1];
    let tree = BPlusTree::build(4, &data).unwrap();
    assert_eq!(tree.find_range(i32::MIN, i32::MAX), vec![0, 3, 1]);
    assert_eq!(tree.find(i32::MAX), vec![2]);
}

#[test]
fn test_order_too_small() {
    assert!(BPlusTree::new(2).is_err());
}
