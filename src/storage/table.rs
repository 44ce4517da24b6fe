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

//! Tables: column groups sharing a row count
//!
//! A table is created with a declared number of columns. Rows can be
//! inserted once every declared column exists. If one column is leading the
//! table is kept physically sorted on it; inserts then only append and mark
//! the table unorganised, and [`Table::organize`] restores the order and
//! rebuilds the indexes in one pass.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::common::{new_string_map, StringMap};
use crate::core::{Error, IndexType, Result};
use crate::storage::column::Column;
use crate::storage::index::leading_column_sort;

/// Columns reserved up front; wider tables grow on demand
const PREALLOC_COLUMNS: usize = 64;

static NEXT_LAYOUT: AtomicU64 = AtomicU64::new(1);

fn next_layout() -> u64 {
    NEXT_LAYOUT.fetch_add(1, Ordering::Relaxed)
}

/// An ordered set of equally long columns
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    capacity: usize,
    columns: Vec<Column>,
    lookup: StringMap<usize>,
    leading: Option<usize>,
    /// Leading order or indexes are stale
    dirty: bool,
    /// Changes whenever existing rows may move; unique across tables
    layout: u64,
    btree_order: usize,
}

impl Table {
    pub fn new(name: impl Into<String>, capacity: usize, btree_order: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
            columns: Vec::with_capacity(capacity.min(PREALLOC_COLUMNS)),
            lookup: new_string_map(),
            leading: None,
            dirty: false,
            layout: next_layout(),
            btree_order,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared number of columns
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.lookup
            .get(name)
            .map(|&i| &self.columns[i])
            .ok_or_else(|| Error::ColumnNotFound(format!("{}.{}", self.name, name)))
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Position of the leading column, if any
    pub fn leading(&self) -> Option<usize> {
        self.leading
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// True when leading order and indexes reflect the data
    pub fn is_organized(&self) -> bool {
        !self.dirty
    }

    /// Identifies the current row order. Appends keep it; re-sorting or
    /// replacing the table changes it.
    pub fn layout(&self) -> u64 {
        self.layout
    }

    /// Add a column; `leading` makes it the physical sort key
    pub fn create_column(&mut self, name: &str, leading: bool) -> Result<()> {
        if self.lookup.contains_key(name) {
            return Err(Error::ColumnAlreadyExists(format!("{}.{}", self.name, name)));
        }
        if self.columns.len() >= self.capacity {
            return Err(Error::TableFull {
                table: self.name.clone(),
                capacity: self.capacity,
            });
        }
        if leading && self.leading.is_some() {
            return Err(Error::invalid_argument(format!(
                "table '{}' already has a leading column",
                self.name
            )));
        }
        let position = self.columns.len();
        let data = vec![0; self.row_count()];
        self.columns.push(Column::with_data(name, leading, data));
        self.lookup.insert(name.to_string(), position);
        if leading {
            self.leading = Some(position);
            self.dirty = true;
        }
        Ok(())
    }

    /// Declare and build an index on a column
    pub fn create_index(&mut self, name: &str, index_type: IndexType) -> Result<()> {
        if index_type == IndexType::None {
            return Err(Error::invalid_argument("index type must be btree or sorted"));
        }
        let position = self
            .column_position(name)
            .ok_or_else(|| Error::ColumnNotFound(format!("{}.{}", self.name, name)))?;
        if self.columns[position].index_type() != IndexType::None {
            return Err(Error::IndexAlreadyExists(format!("{}.{}", self.name, name)));
        }
        self.organize()?;
        let column = &mut self.columns[position];
        column.set_index_type(index_type);
        column.rebuild_index(self.btree_order)?;
        debug!(table = %self.name, column = name, %index_type, "built index");
        Ok(())
    }

    /// Restore a column's declared index without building it
    pub(crate) fn declare_index(&mut self, position: usize, index_type: IndexType) {
        if let Some(column) = self.columns.get_mut(position) {
            column.set_index_type(index_type);
            self.dirty = true;
        }
    }

    fn check_complete(&self) -> Result<()> {
        if self.columns.len() != self.capacity {
            return Err(Error::invalid_argument(format!(
                "table '{}' has {} of {} declared columns",
                self.name,
                self.columns.len(),
                self.capacity
            )));
        }
        Ok(())
    }

    /// Append one row given in schema order
    pub fn insert_row(&mut self, values: &[i32]) -> Result<()> {
        self.check_complete()?;
        if values.len() != self.capacity {
            return Err(Error::ColumnCountMismatch {
                expected: self.capacity,
                got: values.len(),
            });
        }
        let maintain = self.leading.is_none() && !self.dirty;
        let rows = self.row_count();
        for (column, &value) in self.columns.iter_mut().zip(values) {
            if let Err(err) = column.push(value, maintain) {
                self.rollback(rows);
                return Err(err);
            }
        }
        if !maintain {
            self.dirty = true;
        }
        Ok(())
    }

    /// Append rows whose value `j` belongs to column `mapping[j]`, then
    /// organize the table
    pub fn load_rows(&mut self, mapping: &[usize], rows: &[Vec<i32>]) -> Result<()> {
        self.check_complete()?;
        let mut seen = vec![false; self.capacity];
        for &position in mapping {
            match seen.get_mut(position) {
                Some(flag) if !*flag => *flag = true,
                _ => {
                    return Err(Error::invalid_argument(format!(
                        "load header does not map onto the columns of '{}'",
                        self.name
                    )))
                }
            }
        }
        if mapping.len() != self.capacity {
            return Err(Error::ColumnCountMismatch {
                expected: self.capacity,
                got: mapping.len(),
            });
        }
        if let Some(bad) = rows.iter().find(|row| row.len() != self.capacity) {
            return Err(Error::ColumnCountMismatch {
                expected: self.capacity,
                got: bad.len(),
            });
        }

        let before = self.row_count();
        for row in rows {
            for (&position, &value) in mapping.iter().zip(row) {
                if let Err(err) = self.columns[position].push(value, false) {
                    self.rollback(before);
                    return Err(err);
                }
            }
        }
        self.dirty = true;
        self.organize()
    }

    /// Drop rows past `rows` after a failed append and force a rebuild
    fn rollback(&mut self, rows: usize) {
        for column in &mut self.columns {
            column.data_mut().truncate(rows);
        }
        self.dirty = true;
    }

    /// Sort by the leading column and rebuild every declared index
    pub fn organize(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(leading) = self.leading {
            let data = self.columns.iter_mut().map(Column::data_mut).collect();
            leading_column_sort(data, leading);
            self.layout = next_layout();
        }
        for column in &mut self.columns {
            if column.index_type() != IndexType::None {
                column.rebuild_index(self.btree_order)?;
            }
        }
        self.dirty = false;
        debug!(table = %self.name, rows = self.row_count(), "organized table");
        Ok(())
    }

    /// Add a column read back from a snapshot
    pub(crate) fn restore_column(&mut self, column: Column) -> Result<()> {
        let name = column.name().to_string();
        let leading = column.is_leading();
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(Error::snapshot(format!(
                "column '{}' has {} rows, expected {}",
                name,
                column.len(),
                self.row_count()
            )));
        }
        self.create_column(&name, leading)?;
        if let Some(&position) = self.lookup.get(&name) {
            self.columns[position] = column;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grades() -> Table {
        let mut table = Table::new("grades", 2, 4);
        table.create_column("id", false).unwrap();
        table.create_column("score", false).unwrap();
        table
    }

    #[test]
    fn test_create_column_limits() {
        let mut table = grades();
        assert!(matches!(
            table.create_column("extra", false),
            Err(Error::TableFull { .. })
        ));
        let mut table = Table::new("t", 3, 4);
        table.create_column("a", true).unwrap();
        assert!(matches!(
            table.create_column("a", false),
            Err(Error::ColumnAlreadyExists(_))
        ));
        assert!(table.create_column("b", true).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_insert_row_width() {
        let mut table = Table::new("t", 2, 4);
        table.create_column("a", false).unwrap();
        assert!(table.insert_row(&[1, 2]).is_err());
        table.create_column("b", false).unwrap();
        assert!(matches!(
            table.insert_row(&[1]),
            Err(Error::ColumnCountMismatch { expected: 2, got: 1 })
        ));
        table.insert_row(&[1, 2]).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_index_maintained_without_leading() {
        let mut table = grades();
        table.create_index("score", IndexType::BPlusTree).unwrap();
        table.insert_row(&[1, 90]).unwrap();
        table.insert_row(&[2, 70]).unwrap();
        assert!(table.is_organized());
        let index = table.column("score").unwrap().index().unwrap();
        assert_eq!(index.find_range(60, 80), vec![1]);
        assert!(matches!(
            table.create_index("score", IndexType::Sorted),
            Err(Error::IndexAlreadyExists(_))
        ));
    }

    #[test]
    fn test_leading_insert_then_organize() {
        let mut table = Table::new("t", 2, 4);
        table.create_column("k", true).unwrap();
        table.create_column("v", false).unwrap();
        table.create_index("v", IndexType::Sorted).unwrap();
        for (k, v) in [(3, 30), (1, 10), (2, 20)] {
            table.insert_row(&[k, v]).unwrap();
        }
        assert!(!table.is_organized());
        table.organize().unwrap();
        assert_eq!(table.column("k").unwrap().data(), &[1, 2, 3]);
        assert_eq!(table.column("v").unwrap().data(), &[10, 20, 30]);
        let index = table.column("v").unwrap().index().unwrap();
        assert_eq!(index.find_range(20, 31), vec![1, 2]);
    }

    #[test]
    fn test_layout_tracks_reordering() {
        let mut plain = grades();
        let before = plain.layout();
        plain.insert_row(&[1, 90]).unwrap();
        plain.organize().unwrap();
        assert_eq!(plain.layout(), before);

        let mut sorted = Table::new("t", 1, 4);
        sorted.create_column("k", true).unwrap();
        assert_ne!(sorted.layout(), plain.layout());
        sorted.organize().unwrap();
        let organized = sorted.layout();
        sorted.insert_row(&[5]).unwrap();
        assert_eq!(sorted.layout(), organized);
        sorted.organize().unwrap();
        assert_ne!(sorted.layout(), organized);
    }

    #[test]
    fn test_rollback_restores_row_count() {
        let mut table = grades();
        table.create_index("score", IndexType::Sorted).unwrap();
        table.insert_row(&[1, 90]).unwrap();
        // a row that reached only the first column
        table.columns[0].push(2, true).unwrap();
        table.rollback(1);
        assert!(!table.is_organized());
        assert_eq!(table.column("id").unwrap().data(), &[1]);
        table.organize().unwrap();
        table.insert_row(&[3, 70]).unwrap();
        assert_eq!(table.column("id").unwrap().data(), &[1, 3]);
        let index = table.column("score").unwrap().index().unwrap();
        assert_eq!(index.find_range(60, 100), vec![1, 0]);
    }

    #[test]
    fn test_huge_declared_width() {
        let mut table = Table::new("wide", usize::MAX, 4);
        table.create_column("a", false).unwrap();
        assert_eq!(table.capacity(), usize::MAX);
        assert!(table.insert_row(&[1]).is_err());
    }

    #[test]
    fn test_load_rows_maps_header() {
        let mut table = grades();
        table
            .load_rows(&[1, 0], &[vec![90, 1], vec![80, 2]])
            .unwrap();
        assert_eq!(table.column("id").unwrap().data(), &[1, 2]);
        assert_eq!(table.column("score").unwrap().data(), &[90, 80]);
        assert!(table.load_rows(&[0, 0], &[vec![1, 2]]).is_err());
        assert!(table.load_rows(&[0, 1], &[vec![1]]).is_err());
    }
}
