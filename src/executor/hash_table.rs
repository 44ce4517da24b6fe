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

//! Chained hash table for the build side of a join.
//!
//! Entries live in one flat vector and are chained through indices, so the
//! table is built with a single allocation per side:
//!
//! ```text
//! JoinHashTable
//! ├── bucket_heads: Vec<i32>    [bucket_count]     // First entry index per bucket
//! └── entries: Vec<HashEntry>   [row_count]        // One per build tuple
//!
//! HashEntry (12 bytes)
//! ├── key: i32       // Join value, compared on probe
//! ├── position: i32  // Row position reported on match
//! └── next: u32      // Next in chain (EMPTY = end)
//! ```
//!
//! Keys are not unique. Inserts prepend to the bucket chain, so a probe
//! yields matching positions in reverse insertion order.

/// Sentinel value indicating end of chain or empty bucket.
const EMPTY: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct HashEntry {
    key: i32,
    position: i32,
    /// Index of next entry in the chain (EMPTY = end of chain).
    next: u32,
}

/// Hash table keyed by join value.
///
/// ```ignore
/// let table = JoinHashTable::build(&build_values, &build_positions, size);
/// for (&value, &position) in probe_values.iter().zip(&probe_positions) {
///     for build_position in table.probe(value) {
///         // emit (build_position, position)
///     }
/// }
/// ```
pub struct JoinHashTable {
    /// First entry index for each bucket (-1 if empty).
    bucket_heads: Vec<i32>,
    entries: Vec<HashEntry>,
}

impl JoinHashTable {
    /// Create an empty table with `bucket_count` buckets (at least one).
    pub fn with_buckets(bucket_count: usize, row_count: usize) -> Self {
        Self {
            bucket_heads: vec![-1; bucket_count.max(1)],
            entries: Vec::with_capacity(row_count),
        }
    }

    /// Build a table over parallel value / position slices.
    pub fn build(values: &[i32], positions: &[i32], bucket_count: usize) -> Self {
        let mut table = Self::with_buckets(bucket_count, values.len());
        for (&key, &position) in values.iter().zip(positions) {
            table.insert(key, position);
        }
        table
    }

    /// Bucket of a key: `|key mod bucket_count|`
    #[inline]
    fn bucket(&self, key: i32) -> usize {
        (i64::from(key) % self.bucket_heads.len() as i64).unsigned_abs() as usize
    }

    /// Prepend an entry to its bucket chain.
    #[inline]
    pub fn insert(&mut self, key: i32, position: i32) {
        let bucket = self.bucket(key);
        let old_head = self.bucket_heads[bucket];
        let next = if old_head >= 0 {
            old_head as u32
        } else {
            EMPTY
        };
        let entry_idx = self.entries.len() as i32;
        self.entries.push(HashEntry {
            key,
            position,
            next,
        });
        self.bucket_heads[bucket] = entry_idx;
    }

    /// Positions of every entry whose key equals `key`.
    #[inline]
    pub fn probe(&self, key: i32) -> ProbeIter<'_> {
        let first = self.bucket_heads[self.bucket(key)];
        ProbeIter {
            table: self,
            key,
            current: first,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.bucket_heads.len()
    }
}

/// Zero-allocation iterator over probe results.
pub struct ProbeIter<'a> {
    table: &'a JoinHashTable,
    key: i32,
    current: i32,
}

impl Iterator for ProbeIter<'_> {
    type Item = i32;

    #[inline]
    fn next(&mut self) -> Option<i32> {
        while self.current >= 0 {
            let entry = &self.table.entries[self.current as usize];
            self.current = if entry.next == EMPTY {
                -1
            } else {
                entry.next as i32
            };
            if entry.key == self.key {
                return Some(entry.position);
            }
        }
        None
    }
}
