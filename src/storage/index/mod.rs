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

//! Index implementations for colstore
//!
//! - [`BPlusTree`] - arena B+Tree for range lookups
//! - [`SortedIndex`] - parallel sorted arrays
//! - [`ColumnIndex`] - the index owned by a column

pub mod bplus_tree;
pub mod sorted;

pub use bplus_tree::BPlusTree;
pub use sorted::{find_range_leading_sorted, leading_column_sort, SortedIndex};

use crate::core::{IndexType, Result};

/// Index attached to a column
#[derive(Debug, Clone)]
pub enum ColumnIndex {
    Sorted(SortedIndex),
    BPlusTree(BPlusTree),
}

impl ColumnIndex {
    /// Build an index of `kind` over the full column; `None` for IndexType::None
    pub fn build(kind: IndexType, data: &[i32], btree_order: usize) -> Result<Option<Self>> {
        Ok(match kind {
            IndexType::None => None,
            IndexType::Sorted => Some(ColumnIndex::Sorted(SortedIndex::build(data))),
            IndexType::BPlusTree => Some(ColumnIndex::BPlusTree(BPlusTree::build(
                btree_order,
                data,
            )?)),
        })
    }

    pub fn index_type(&self) -> IndexType {
        match self {
            ColumnIndex::Sorted(_) => IndexType::Sorted,
            ColumnIndex::BPlusTree(_) => IndexType::BPlusTree,
        }
    }

    /// Add the entry for a freshly appended row
    pub fn insert(&mut self, value: i32, position: u32) -> Result<()> {
        match self {
            ColumnIndex::Sorted(index) => {
                index.insert(value, position);
                Ok(())
            }
            ColumnIndex::BPlusTree(tree) => tree.insert(value, position),
        }
    }

    /// Row positions with `lower <= value < upper`, in value order
    pub fn find_range(&self, lower: i32, upper: i32) -> Vec<u32> {
        match self {
            ColumnIndex::Sorted(index) => index.find_range(lower, upper).to_vec(),
            ColumnIndex::BPlusTree(tree) => tree.find_range(lower, upper),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnIndex::Sorted(index) => index.len(),
            ColumnIndex::BPlusTree(tree) => tree.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_each_kind() {
        let data = [5, 3, 8, 3, 1];
        assert!(ColumnIndex::build(IndexType::None, &data, 4).unwrap().is_none());

        for kind in [IndexType::Sorted, IndexType::BPlusTree] {
            let index = ColumnIndex::build(kind, &data, 4).unwrap().unwrap();
            assert_eq!(index.index_type(), kind);
            assert_eq!(index.len(), 5);
            let mut got = index.find_range(3, 8);
            got.sort_unstable();
            assert_eq!(got, vec![0, 1, 3]);
        }
    }

    #[test]
    fn test_insert_keeps_index_current() {
        let mut index = ColumnIndex::build(IndexType::BPlusTree, &[2, 4], 3)
            .unwrap()
            .unwrap();
        index.insert(3, 2).unwrap();
        assert_eq!(index.find_range(3, 5), vec![2, 1]);
    }
}
