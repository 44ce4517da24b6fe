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

//! Sorted index and leading-column ordering
//!
//! A secondary sorted index keeps a copy of the column as parallel
//! `values`/`positions` arrays ordered by value. A leading column needs no
//! copy at all: the table is physically reordered so the column itself is
//! sorted, and lookups binary search the column data.

use std::ops::Range;

use rayon::prelude::*;

/// Parallel (value, row position) arrays sorted by value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedIndex {
    values: Vec<i32>,
    positions: Vec<u32>,
}

impl SortedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a full column; order among equal values is unspecified
    pub fn build(data: &[i32]) -> Self {
        let mut pairs: Vec<(i32, u32)> = data
            .iter()
            .enumerate()
            .map(|(row, &value)| (value, row as u32))
            .collect();
        pairs.sort_unstable_by_key(|&(value, _)| value);
        let (values, positions) = pairs.into_iter().unzip();
        Self { values, positions }
    }

    /// Insert one entry, shifting larger values right
    pub fn insert(&mut self, value: i32, position: u32) {
        let at = self.values.partition_point(|&v| v <= value);
        self.values.insert(at, value);
        self.positions.insert(at, position);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Row positions with `lower <= value < upper`, in value order
    pub fn find_range(&self, lower: i32, upper: i32) -> &[u32] {
        let range = bounds(&self.values, lower, upper);
        &self.positions[range]
    }
}

/// Row range of a sorted column holding `lower <= value < upper`
pub fn find_range_leading_sorted(data: &[i32], lower: i32, upper: i32) -> Range<usize> {
    bounds(data, lower, upper)
}

/// Half-open slice bounds of `[lower, upper)` in sorted `data`
fn bounds(data: &[i32], lower: i32, upper: i32) -> Range<usize> {
    let start = data.partition_point(|&v| v < lower);
    if lower >= upper {
        return start..start;
    }
    let end = start + data[start..].partition_point(|&v| v < upper);
    start..end
}

/// Reorder every column in lock-step so that `columns[leading]` is sorted
pub fn leading_column_sort(mut columns: Vec<&mut Vec<i32>>, leading: usize) {
    let Some(keys) = columns.get(leading) else {
        return;
    };
    let mut permutation: Vec<u32> = (0..keys.len() as u32).collect();
    permutation.sort_by_key(|&row| keys[row as usize]);

    columns.par_iter_mut().for_each(|column| {
        let reordered: Vec<i32> = permutation
            .iter()
            .filter_map(|&row| column.get(row as usize).copied())
            .collect();
        **column = reordered;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_find() {
        let index = SortedIndex::build(&[5, 3, 8, 3, 1]);
        assert_eq!(index.values(), &[1, 3, 3, 5, 8]);
        let mut got = index.find_range(3, 8).to_vec();
        got.sort_unstable();
        assert_eq!(got, vec![0, 1, 3]);
        assert!(index.find_range(8, 3).is_empty());
        assert_eq!(index.find_range(i32::MIN, i32::MAX).len(), 5);
    }

    #[test]
    fn test_incremental_insert_matches_build() {
        let data = [4, -2, 9, 4, 0, 7, -2];
        let mut index = SortedIndex::new();
        for (row, &value) in data.iter().enumerate() {
            index.insert(value, row as u32);
        }
        let built = SortedIndex::build(&data);
        assert_eq!(index.values(), built.values());
        let mut a = index.find_range(-2, 5).to_vec();
        let mut b = built.find_range(-2, 5).to_vec();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn test_leading_range_guards_array_end() {
        let data = [1, 2, 2, 2];
        assert_eq!(find_range_leading_sorted(&data, 2, 3), 1..4);
        assert_eq!(find_range_leading_sorted(&data, 2, i32::MAX), 1..4);
        assert_eq!(find_range_leading_sorted(&data, 5, 9), 4..4);
        assert_eq!(find_range_leading_sorted(&[], 0, 1), 0..0);
    }

    #[test]
    fn test_leading_column_sort() {
        let mut keys = vec![3, 1, 2, 1];
        let mut other = vec![30, 10, 20, 11];
        leading_column_sort(vec![&mut other, &mut keys], 1);
        assert_eq!(keys, vec![1, 1, 2, 3]);
        assert_eq!(other, vec![10, 11, 20, 30]);
    }
}
