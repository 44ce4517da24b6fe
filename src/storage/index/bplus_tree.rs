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

//! Arena-backed B+Tree over (column value, row position) pairs
//!
//! Nodes live in a single `Vec` and refer to each other by index, so parent,
//! child and sibling links never dangle. Internal nodes hold up to
//! `order - 1` separator keys and `order` children; leaves hold up to
//! `order - 1` entries plus a link to the next leaf for ordered scans.
//!
//! Keys are not unique. An insert descends into the rightmost child whose
//! separator is `<= key` and lands after existing equal keys, so entries
//! sharing a key are kept in insertion order across leaves. Lookups descend
//! into the leftmost child that may hold the lower bound and then follow the
//! leaf chain.

use std::ops::Range;

use crate::core::{Error, Result};
use crate::storage::config::MIN_BTREE_ORDER;

/// Index of a node in the arena
type NodeId = usize;

/// Split point used for both leaf and internal splits
#[inline]
fn cut(length: usize) -> usize {
    length / 2 + length % 2
}

/// A B+Tree node
#[derive(Debug, Clone)]
struct Node {
    /// Keys stored in this node (sorted, duplicates allowed)
    keys: Vec<i32>,
    /// Row positions, parallel to `keys` (leaves only)
    rows: Vec<u32>,
    /// Child links, `keys.len() + 1` of them (internal nodes only)
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    /// Right sibling (leaves only)
    next: Option<NodeId>,
    is_leaf: bool,
}

impl Node {
    fn leaf(keys: Vec<i32>, rows: Vec<u32>) -> Self {
        Self {
            keys,
            rows,
            children: Vec::new(),
            parent: None,
            next: None,
            is_leaf: true,
        }
    }

    fn internal(keys: Vec<i32>, children: Vec<NodeId>) -> Self {
        Self {
            keys,
            rows: Vec::new(),
            children,
            parent: None,
            next: None,
            is_leaf: false,
        }
    }
}

/// B+Tree index mapping column values to row positions
#[derive(Debug, Clone)]
pub struct BPlusTree {
    nodes: Vec<Node>,
    root: NodeId,
    order: usize,
    len: usize,
}

impl BPlusTree {
    /// Create an empty tree with the given fanout
    pub fn new(order: usize) -> Result<Self> {
        if order < MIN_BTREE_ORDER {
            return Err(Error::invalid_argument(format!(
                "btree order must be at least {}, got {}",
                MIN_BTREE_ORDER, order
            )));
        }
        let mut tree = Self {
            nodes: Vec::new(),
            root: 0,
            order,
            len: 0,
        };
        tree.root = tree.push_node(Node::leaf(Vec::new(), Vec::new()))?;
        Ok(tree)
    }

    /// Build a tree holding `(values[i], i)` for every row `i`
    pub fn build(order: usize, values: &[i32]) -> Result<Self> {
        let mut tree = Self::new(order)?;
        for (row, &value) in values.iter().enumerate() {
            tree.insert(value, row as u32)?;
        }
        Ok(tree)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of levels from the root to the leaves
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self.root;
        while !self.nodes[node].is_leaf {
            node = self.nodes[node].children[0];
            height += 1;
        }
        height
    }

    /// Insert an entry, splitting nodes up to the root as needed
    ///
    /// An `Error::Allocation` aborts the insert; the tree must be rebuilt
    /// before it is used again.
    pub fn insert(&mut self, key: i32, row: u32) -> Result<()> {
        let leaf = self.descend(|k| k <= key);
        let node = &mut self.nodes[leaf];
        let pos = node.keys.partition_point(|&k| k <= key);

        if node.keys.len() < self.order - 1 {
            node.keys.insert(pos, key);
            node.rows.insert(pos, row);
        } else {
            // Worst case every level splits and a new root is added
            self.nodes.try_reserve(self.height() + 1)?;
            self.split_leaf(leaf, pos, key, row)?;
        }
        self.len += 1;
        Ok(())
    }

    /// Row positions of entries with `lower <= key < upper`, in key order
    pub fn find_range(&self, lower: i32, upper: i32) -> Vec<u32> {
        if lower >= upper {
            return Vec::new();
        }
        self.iter_from(lower)
            .take_while(|&(key, _)| key < upper)
            .map(|(_, row)| row)
            .collect()
    }

    /// Row positions of entries equal to `key`, in insertion order
    pub fn find(&self, key: i32) -> Vec<u32> {
        self.iter_from(key)
            .take_while(|&(k, _)| k == key)
            .map(|(_, row)| row)
            .collect()
    }

    /// Contiguous row range for a tree over a leading (physically sorted)
    /// column of `data_count` rows
    ///
    /// The range starts at the row of the first entry `>= lower` and ends at
    /// the row of the first entry `>= upper`; either end defaults to
    /// `data_count` when no such entry exists.
    pub fn find_range_leading(&self, lower: i32, upper: i32, data_count: usize) -> Range<usize> {
        let first_row = |bound: i32| {
            self.iter_from(bound)
                .next()
                .map_or(data_count, |(_, row)| row as usize)
        };
        let start = first_row(lower);
        if lower >= upper {
            return start..start;
        }
        let end = first_row(upper).max(start);
        start..end
    }

    /// All entries in key order
    pub fn entries(&self) -> Entries<'_> {
        let mut node = self.root;
        while !self.nodes[node].is_leaf {
            node = self.nodes[node].children[0];
        }
        Entries {
            tree: self,
            leaf: Some(node),
            index: 0,
        }
    }

    /// Entries with `key >= lower`, in key order
    pub fn iter_from(&self, lower: i32) -> Entries<'_> {
        let mut leaf = self.descend(|k| k < lower);
        loop {
            let node = &self.nodes[leaf];
            let index = node.keys.partition_point(|&k| k < lower);
            if index < node.keys.len() {
                return Entries {
                    tree: self,
                    leaf: Some(leaf),
                    index,
                };
            }
            match node.next {
                Some(next) => leaf = next,
                None => {
                    return Entries {
                        tree: self,
                        leaf: None,
                        index: 0,
                    }
                }
            }
        }
    }

    /// Walk from the root to a leaf; in every internal node follow the child
    /// after the last separator satisfying `skip`
    fn descend(&self, skip: impl Fn(i32) -> bool) -> NodeId {
        let mut node = self.root;
        while !self.nodes[node].is_leaf {
            let current = &self.nodes[node];
            let child = current.keys.partition_point(|&k| skip(k));
            node = current.children[child];
        }
        node
    }

    /// Append a node to the arena with room for a full complement of entries
    fn push_node(&mut self, mut node: Node) -> Result<NodeId> {
        let order = self.order;
        node.keys
            .try_reserve_exact(order.saturating_sub(node.keys.len()))
            .map_err(|_| Error::allocation("b+tree node keys"))?;
        if node.is_leaf {
            node.rows
                .try_reserve_exact(order.saturating_sub(node.rows.len()))
                .map_err(|_| Error::allocation("b+tree leaf payload"))?;
        } else {
            node.children
                .try_reserve_exact((order + 1).saturating_sub(node.children.len()))
                .map_err(|_| Error::allocation("b+tree node children"))?;
        }
        self.nodes
            .try_reserve(1)
            .map_err(|_| Error::allocation("b+tree node"))?;
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    /// Split a full leaf while inserting `(key, row)` at `pos`
    fn split_leaf(&mut self, leaf: NodeId, pos: usize, key: i32, row: u32) -> Result<()> {
        let split = cut(self.order - 1);
        let node = &mut self.nodes[leaf];
        node.keys.insert(pos, key);
        node.rows.insert(pos, row);
        let upper_keys = node.keys.split_off(split);
        let upper_rows = node.rows.split_off(split);
        let old_next = node.next;
        let parent = node.parent;

        let separator = upper_keys[0];
        let mut new_leaf = Node::leaf(upper_keys, upper_rows);
        new_leaf.next = old_next;
        new_leaf.parent = parent;
        let new_id = self.push_node(new_leaf)?;
        self.nodes[leaf].next = Some(new_id);

        self.insert_into_parent(leaf, separator, new_id)
    }

    /// Register `right` as the sibling following `left` under `key`
    fn insert_into_parent(&mut self, left: NodeId, key: i32, right: NodeId) -> Result<()> {
        let Some(parent) = self.nodes[left].parent else {
            let root = self.push_node(Node::internal(vec![key], vec![left, right]))?;
            self.nodes[left].parent = Some(root);
            self.nodes[right].parent = Some(root);
            self.root = root;
            return Ok(());
        };

        let left_index = self.nodes[parent]
            .children
            .iter()
            .position(|&child| child == left)
            .ok_or_else(|| Error::invalid_argument("b+tree child missing from its parent"))?;

        let node = &mut self.nodes[parent];
        node.keys.insert(left_index, key);
        node.children.insert(left_index + 1, right);
        let overflow = node.keys.len() > self.order - 1;
        self.nodes[right].parent = Some(parent);

        if overflow {
            self.split_internal(parent)
        } else {
            Ok(())
        }
    }

    /// Split an internal node holding `order` keys, moving the middle key up
    fn split_internal(&mut self, node_id: NodeId) -> Result<()> {
        let split = cut(self.order);
        let node = &mut self.nodes[node_id];
        let upper_children = node.children.split_off(split);
        let upper_keys = node.keys.split_off(split);
        let k_prime = node
            .keys
            .pop()
            .ok_or_else(|| Error::invalid_argument("b+tree internal node without keys"))?;
        let parent = node.parent;

        let mut new_node = Node::internal(upper_keys, upper_children);
        new_node.parent = parent;
        let new_id = self.push_node(new_node)?;
        for i in 0..self.nodes[new_id].children.len() {
            let child = self.nodes[new_id].children[i];
            self.nodes[child].parent = Some(new_id);
        }

        self.insert_into_parent(node_id, k_prime, new_id)
    }
}

/// Iterator over `(key, row)` entries following the leaf chain
pub struct Entries<'a> {
    tree: &'a BPlusTree,
    leaf: Option<NodeId>,
    index: usize,
}

impl Iterator for Entries<'_> {
    type Item = (i32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = &self.tree.nodes[self.leaf?];
            if self.index < node.keys.len() {
                let item = (node.keys[self.index], node.rows[self.index]);
                self.index += 1;
                return Some(item);
            }
            self.leaf = node.next;
            self.index = 0;
        }
    }
}
