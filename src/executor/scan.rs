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

//! Selection primitives
//!
//! All predicates are half-open: a value qualifies when
//! `lower <= value < upper`. Results are row positions.

use tracing::trace;

use crate::core::{Error, Result};
use crate::storage::index::{find_range_leading_sorted, ColumnIndex};
use crate::storage::Column;

/// How a select on a column is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMethod {
    /// B+Tree over the physically sorted column; yields one row interval
    LeadingBPlusTree,
    /// Binary search over the physically sorted column
    LeadingSorted,
    /// Secondary sorted index or B+Tree
    SecondaryIndex,
    /// Full column scan
    Linear,
}

impl ScanMethod {
    /// Access path for `column`; indexes and leading order take precedence
    pub fn for_column(column: &Column) -> Self {
        match (column.is_leading(), column.index()) {
            (true, Some(ColumnIndex::BPlusTree(_))) => ScanMethod::LeadingBPlusTree,
            (true, _) => ScanMethod::LeadingSorted,
            (false, Some(_)) => ScanMethod::SecondaryIndex,
            (false, None) => ScanMethod::Linear,
        }
    }
}

/// Map optional bounds onto the integer domain; a missing bound is open
pub fn resolve_bounds(lower: Option<i32>, upper: Option<i32>) -> (i32, i32) {
    (lower.unwrap_or(i32::MIN), upper.unwrap_or(i32::MAX))
}

/// Positions of qualifying values, in ascending row order
pub fn col_scan(data: &[i32], lower: i32, upper: i32) -> Vec<i32> {
    data.iter()
        .enumerate()
        .filter(|&(_, &v)| lower <= v && v < upper)
        .map(|(i, _)| i as i32)
        .collect()
}

/// Select over a prior (positions, values) result
pub fn vec_scan(positions: &[i32], values: &[i32], lower: i32, upper: i32) -> Result<Vec<i32>> {
    if positions.len() != values.len() {
        return Err(Error::LengthMismatch {
            left: positions.len(),
            right: values.len(),
        });
    }
    Ok(positions
        .iter()
        .zip(values)
        .filter(|&(_, &v)| lower <= v && v < upper)
        .map(|(&p, _)| p)
        .collect())
}

/// Select through the column's index or leading order
pub fn index_scan(column: &Column, lower: i32, upper: i32) -> Result<Vec<i32>> {
    let method = ScanMethod::for_column(column);
    trace!(column = column.name(), ?method, lower, upper, "index scan");
    match (method, column.index()) {
        (ScanMethod::LeadingBPlusTree, Some(ColumnIndex::BPlusTree(tree))) => {
            let rows = tree.find_range_leading(lower, upper, column.len());
            Ok(rows.map(|row| row as i32).collect())
        }
        (ScanMethod::LeadingSorted, _) | (ScanMethod::LeadingBPlusTree, _) => {
            let rows = find_range_leading_sorted(column.data(), lower, upper);
            Ok(rows.map(|row| row as i32).collect())
        }
        (ScanMethod::SecondaryIndex, Some(index)) => Ok(index
            .find_range(lower, upper)
            .into_iter()
            .map(|row| row as i32)
            .collect()),
        _ => Err(Error::IndexMissing(column.name().to_string())),
    }
}

/// Select on a column using the best available access path
pub fn select_column(column: &Column, lower: i32, upper: i32) -> Vec<i32> {
    match index_scan(column, lower, upper) {
        Ok(positions) => positions,
        Err(_) => col_scan(column.data(), lower, upper),
    }
}

/// Values of `data` at `positions`
pub fn fetch(data: &[i32], positions: &[i32]) -> Result<Vec<i32>> {
    positions
        .iter()
        .map(|&p| {
            usize::try_from(p)
                .ok()
                .and_then(|i| data.get(i).copied())
                .ok_or(Error::PositionOutOfBounds {
                    position: i64::from(p),
                    len: data.len(),
                })
        })
        .collect()
}
