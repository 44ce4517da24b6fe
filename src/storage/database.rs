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

//! The database: a named set of tables

use crate::common::{new_string_map, StringMap};
use crate::core::{Error, Result};
use crate::storage::column::Column;
use crate::storage::table::Table;

/// A fully qualified `db.tbl.col` reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef<'a> {
    pub db: &'a str,
    pub table: &'a str,
    pub column: &'a str,
}

impl<'a> ColumnRef<'a> {
    /// Split `db.tbl.col`; anything else is not a column reference
    pub fn parse(reference: &'a str) -> Option<Self> {
        let mut parts = reference.split('.');
        let (db, table, column) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || db.is_empty() || table.is_empty() || column.is_empty() {
            return None;
        }
        Some(Self { db, table, column })
    }
}

/// Split a `db.tbl` reference
pub fn parse_table_ref(reference: &str) -> Option<(&str, &str)> {
    let (db, table) = reference.split_once('.')?;
    if db.is_empty() || table.is_empty() || table.contains('.') {
        return None;
    }
    Some((db, table))
}

/// A named collection of tables
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    tables: Vec<Table>,
    lookup: StringMap<usize>,
    btree_order: usize,
}

impl Database {
    pub fn new(name: impl Into<String>, btree_order: usize) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            lookup: new_string_map(),
            btree_order,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    fn check_db(&self, db: &str, table: &str) -> Result<()> {
        if db != self.name {
            return Err(Error::TableNotFound(format!("{}.{}", db, table)));
        }
        Ok(())
    }

    pub fn create_table(&mut self, name: &str, capacity: usize) -> Result<&mut Table> {
        if self.lookup.contains_key(name) {
            return Err(Error::TableAlreadyExists(format!("{}.{}", self.name, name)));
        }
        if capacity == 0 {
            return Err(Error::invalid_argument("a table needs at least one column"));
        }
        let position = self.tables.len();
        self.tables
            .push(Table::new(name, capacity, self.btree_order));
        self.lookup.insert(name.to_string(), position);
        Ok(&mut self.tables[position])
    }

    pub fn table(&self, name: &str) -> Result<&Table> {
        self.lookup
            .get(name)
            .map(|&i| &self.tables[i])
            .ok_or_else(|| Error::TableNotFound(format!("{}.{}", self.name, name)))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        match self.lookup.get(name) {
            Some(&i) => Ok(&mut self.tables[i]),
            None => Err(Error::TableNotFound(format!("{}.{}", self.name, name))),
        }
    }

    /// Resolve a `db.tbl` reference
    pub fn resolve_table(&self, db: &str, table: &str) -> Result<&Table> {
        self.check_db(db, table)?;
        self.table(table)
    }

    pub fn resolve_table_mut(&mut self, db: &str, table: &str) -> Result<&mut Table> {
        self.check_db(db, table)?;
        self.table_mut(table)
    }

    /// Resolve a `db.tbl.col` reference to its table and column
    pub fn resolve_column(&self, reference: &ColumnRef<'_>) -> Result<(&Table, &Column)> {
        let table = self.resolve_table(reference.db, reference.table)?;
        let column = table.column(reference.column)?;
        Ok((table, column))
    }

    pub(crate) fn push_table(&mut self, table: Table) -> Result<()> {
        if self.lookup.contains_key(table.name()) {
            return Err(Error::TableAlreadyExists(table.name().to_string()));
        }
        self.lookup.insert(table.name().to_string(), self.tables.len());
        self.tables.push(table);
        Ok(())
    }
}
