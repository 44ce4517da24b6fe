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

//! Per-client execution context
//!
//! A [`Session`] owns the client's catalog and shared-scan queue and holds a
//! handle to the database shared by all sessions. Commands that only read
//! take the database lock shared; commands that modify storage, and reads
//! that find a table unorganised, take it exclusively.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::core::{DataType, Error, QueryResult, Result};
use crate::executor::aggregate;
use crate::executor::catalog::Catalog;
use crate::executor::join::{join, JoinInput};
use crate::executor::operator::{CreateOperator, Operator, SelectSource};
use crate::executor::scan::{fetch, resolve_bounds, select_column, vec_scan, ScanMethod};
use crate::executor::shared_scan::{shared_scan, PendingSelect, SelectBatch};
use crate::parser;
use crate::storage::{persistence, Column, ColumnRef, Config, Database, Table};

/// The database shared by every session of a server
pub type SharedDatabase = Arc<RwLock<Option<Database>>>;

/// Create an empty shared database handle
pub fn shared_database(db: Option<Database>) -> SharedDatabase {
    Arc::new(RwLock::new(db))
}

/// Outcome of one command
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Command completed without output
    Done,
    /// Columns of a `tuple`, all of one type and length
    Tuple(Vec<QueryResult>),
    /// The server should stop
    Shutdown,
}

/// How a column select is answered
enum ColumnSelect {
    Now(Vec<i32>),
    /// Queue for a shared scan over the first `rows` rows
    Queue { layout: u64, rows: usize },
}

pub struct Session {
    db: SharedDatabase,
    config: Arc<Config>,
    catalog: Catalog,
    batch: SelectBatch,
    batching: bool,
}

impl Session {
    pub fn new(db: SharedDatabase, config: Arc<Config>) -> Self {
        let batch = SelectBatch::new(config.shared_scan_capacity);
        Self {
            db,
            config,
            catalog: Catalog::new(),
            batch,
            batching: false,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// True while selects are being batched
    pub fn is_batching(&self) -> bool {
        self.batching
    }

    /// Parse and execute one DSL line; blank and comment lines do nothing
    pub fn execute_dsl(&mut self, line: &str) -> Result<Response> {
        match parser::parse(line)? {
            Some(op) => self.execute(op),
            None => Ok(Response::Done),
        }
    }

    /// Execute one operator
    pub fn execute(&mut self, op: Operator) -> Result<Response> {
        debug!(command = %op, "execute");
        if self.must_flush_before(&op) {
            self.flush()?;
        }

        match op {
            Operator::Create(create) => self.create(create),
            Operator::Select {
                target,
                source,
                lower,
                upper,
            } => {
                let (lower, upper) = resolve_bounds(lower, upper);
                self.select(target, source, lower, upper)
            }
            Operator::Project {
                target,
                column,
                positions,
            } => {
                let positions = self.operand(&positions)?;
                let positions = positions.as_ints()?;
                let values = self.with_column(&column, |_, c| fetch(c.data(), positions))?;
                self.catalog.insert(target, QueryResult::Int(values));
                Ok(Response::Done)
            }
            Operator::Join {
                left_target,
                right_target,
                left_values,
                left_positions,
                right_values,
                right_positions,
                strategy,
            } => {
                let lv = self.operand(&left_values)?;
                let lp = self.operand(&left_positions)?;
                let rv = self.operand(&right_values)?;
                let rp = self.operand(&right_positions)?;
                let left = JoinInput::new(lp.as_ints()?, lv.as_ints()?)?;
                let right = JoinInput::new(rp.as_ints()?, rv.as_ints()?)?;
                let out = join(left, right, &self.config, strategy);
                self.catalog.insert(left_target, QueryResult::Int(out.left));
                self.catalog.insert(right_target, QueryResult::Int(out.right));
                Ok(Response::Done)
            }
            Operator::Insert { db, table, values } => {
                let mut guard = self.db.write();
                let database = guard.as_mut().ok_or(Error::DatabaseNotFound)?;
                database.resolve_table_mut(&db, &table)?.insert_row(&values)?;
                Ok(Response::Done)
            }
            Operator::Aggregate {
                target,
                kind,
                source,
            } => {
                let input = self.operand(&source)?;
                let result = aggregate::aggregate(kind, &input)?;
                self.catalog.insert(target, result);
                Ok(Response::Done)
            }
            Operator::Add {
                target,
                left,
                right,
            } => {
                let result = aggregate::add(&*self.operand(&left)?, &*self.operand(&right)?)?;
                self.catalog.insert(target, result);
                Ok(Response::Done)
            }
            Operator::Sub {
                target,
                left,
                right,
            } => {
                let result = aggregate::sub(&*self.operand(&left)?, &*self.operand(&right)?)?;
                self.catalog.insert(target, result);
                Ok(Response::Done)
            }
            Operator::Tuple { sources } => self.tuple(&sources),
            Operator::SharedScan => {
                self.batching = !self.batching;
                if !self.batching {
                    self.flush()?;
                }
                debug!(batching = self.batching, "shared scan mode");
                Ok(Response::Done)
            }
            Operator::Shutdown => {
                self.persist()?;
                Ok(Response::Shutdown)
            }
        }
    }

    /// Bulk load rows whose values follow the `db.tbl.col` names in `header`
    pub fn load(&mut self, header: &str, rows: &[Vec<i32>]) -> Result<()> {
        self.flush()?;
        let names: Vec<&str> = header.split(',').map(str::trim).collect();
        let refs = names
            .iter()
            .map(|name| {
                ColumnRef::parse(name)
                    .ok_or_else(|| Error::invalid_argument(format!("bad load header entry '{}'", name)))
            })
            .collect::<Result<Vec<_>>>()?;
        let first = refs
            .first()
            .ok_or_else(|| Error::invalid_argument("empty load header"))?;
        if refs
            .iter()
            .any(|r| r.db != first.db || r.table != first.table)
        {
            return Err(Error::invalid_argument(
                "load header must name columns of a single table",
            ));
        }

        let mut guard = self.db.write();
        let database = guard.as_mut().ok_or(Error::DatabaseNotFound)?;
        let table = database.resolve_table_mut(first.db, first.table)?;
        let mapping = refs
            .iter()
            .map(|r| {
                table
                    .column_position(r.column)
                    .ok_or_else(|| Error::ColumnNotFound(format!("{}.{}.{}", r.db, r.table, r.column)))
            })
            .collect::<Result<Vec<_>>>()?;
        table.load_rows(&mapping, rows)?;
        info!(table = %table.name(), rows = rows.len(), "bulk load complete");
        Ok(())
    }

    /// Write the database to the configured snapshot path
    pub fn persist(&mut self) -> Result<()> {
        self.flush()?;
        let guard = self.db.read();
        match guard.as_ref() {
            Some(database) => persistence::save(database, &self.config.snapshot_path),
            None => Ok(()),
        }
    }

    fn must_flush_before(&self, op: &Operator) -> bool {
        if self.batch.is_empty() {
            return false;
        }
        matches!(op, Operator::Shutdown)
            || op.modifies_storage()
            || op
                .inputs()
                .into_iter()
                .chain(op.targets())
                .any(|name| self.batch.produces(name))
            || self.reads_unorganized_batch_table(op)
    }

    /// True when `op` reads columns while the queued column's table has
    /// unorganized rows from another session. Organizing may re-sort them.
    fn reads_unorganized_batch_table(&self, op: &Operator) -> bool {
        if !op.inputs().into_iter().any(|name| ColumnRef::parse(name).is_some()) {
            return false;
        }
        let Some(queued) = self.batch.column().and_then(ColumnRef::parse) else {
            return false;
        };
        let guard = self.db.read();
        guard
            .as_ref()
            .and_then(|database| database.resolve_table(queued.db, queued.table).ok())
            .is_some_and(|table| !table.is_organized())
    }

    fn create(&mut self, create: CreateOperator) -> Result<Response> {
        let mut guard = self.db.write();
        match create {
            CreateOperator::Database { name } => {
                if let Some(existing) = guard.as_ref() {
                    if existing.name() == name {
                        return Err(Error::DatabaseAlreadyExists(name));
                    }
                    warn!(old = existing.name(), new = %name, "replacing open database");
                }
                info!(db = %name, "created database");
                *guard = Some(Database::new(name, self.config.btree_order));
            }
            CreateOperator::Table { db, name, columns } => {
                let database = guard.as_mut().ok_or(Error::DatabaseNotFound)?;
                if database.name() != db {
                    return Err(Error::invalid_argument(format!(
                        "database '{}' is not open",
                        db
                    )));
                }
                database.create_table(&name, columns)?;
            }
            CreateOperator::Column {
                db,
                table,
                name,
                leading,
            } => {
                let database = guard.as_mut().ok_or(Error::DatabaseNotFound)?;
                database
                    .resolve_table_mut(&db, &table)?
                    .create_column(&name, leading)?;
            }
            CreateOperator::Index {
                db,
                table,
                column,
                index_type,
            } => {
                let database = guard.as_mut().ok_or(Error::DatabaseNotFound)?;
                database
                    .resolve_table_mut(&db, &table)?
                    .create_index(&column, index_type)?;
            }
        }
        Ok(Response::Done)
    }

    fn select(&mut self, target: String, source: SelectSource, lower: i32, upper: i32) -> Result<Response> {
        match source {
            SelectSource::Result { positions, values } => {
                let p = self.operand(&positions)?;
                let v = self.operand(&values)?;
                let selected = vec_scan(p.as_ints()?, v.as_ints()?, lower, upper)?;
                self.catalog.insert(target, QueryResult::Int(selected));
                Ok(Response::Done)
            }
            SelectSource::Column(column) => {
                let batching = self.batching;
                let plan = self.with_column(&column, |t, c| {
                    if batching && ScanMethod::for_column(c) == ScanMethod::Linear {
                        Ok(ColumnSelect::Queue {
                            layout: t.layout(),
                            rows: c.len(),
                        })
                    } else {
                        Ok(ColumnSelect::Now(select_column(c, lower, upper)))
                    }
                })?;
                match plan {
                    ColumnSelect::Now(positions) => {
                        self.catalog.insert(target, QueryResult::Int(positions))
                    }
                    ColumnSelect::Queue { layout, rows } => {
                        if !self.batch.accepts(&column, layout) {
                            self.flush()?;
                        }
                        self.batch.push(
                            &column,
                            layout,
                            PendingSelect {
                                target,
                                lower,
                                upper,
                                rows,
                            },
                        );
                        if self.batch.is_full() {
                            self.flush()?;
                        }
                    }
                }
                Ok(Response::Done)
            }
        }
    }

    /// Run the queued selects with one pass over their column.
    ///
    /// The column is read as is, without organizing its table: rows other
    /// sessions appended since queueing sit past each select's row count.
    fn flush(&mut self) -> Result<()> {
        let Some((source, pending)) = self.batch.take() else {
            return Ok(());
        };
        let column = source.column;
        let column_ref = ColumnRef::parse(&column)
            .ok_or_else(|| Error::ColumnNotFound(column.clone()))?;
        let page_size = self.config.page_size;
        let results = {
            let guard = self.db.read();
            let database = guard.as_ref().ok_or(Error::DatabaseNotFound)?;
            let (table, c) = database.resolve_column(&column_ref)?;
            let rows = pending.iter().map(|s| s.rows).max().unwrap_or(0);
            if table.layout() != source.layout || c.len() < rows {
                return Err(Error::invalid_argument(format!(
                    "table '{}' was reorganized while {} selects on '{}' were queued",
                    table.name(),
                    pending.len(),
                    column
                )));
            }
            shared_scan(c.data(), &pending, page_size)
        };
        debug!(column = %column, selects = pending.len(), "shared scan flushed");
        for (select, positions) in pending.into_iter().zip(results) {
            self.catalog.insert(select.target, QueryResult::Int(positions));
        }
        Ok(())
    }

    fn tuple(&self, sources: &[String]) -> Result<Response> {
        let results = sources
            .iter()
            .map(|name| self.operand(name))
            .collect::<Result<Vec<_>>>()?;
        let Some(first) = results.first() else {
            return Err(Error::invalid_argument("tuple needs at least one operand"));
        };
        let mut widest = DataType::Int;
        for result in &results {
            if !result.data_type().is_numeric() {
                return Err(Error::type_mismatch("a numeric result", result.data_type()));
            }
            if result.len() != first.len() {
                return Err(Error::LengthMismatch {
                    left: first.len(),
                    right: result.len(),
                });
            }
            if result.data_type().rank() > widest.rank() {
                widest = result.data_type();
            }
        }
        let columns = results
            .iter()
            .map(|result| result.promote(widest))
            .collect::<Result<Vec<_>>>()?;
        Ok(Response::Tuple(columns))
    }

    /// Resolve a name: catalog first, then a `db.tbl.col` column
    fn operand(&self, name: &str) -> Result<Arc<QueryResult>> {
        if let Some(result) = self.catalog.get(name) {
            return Ok(result);
        }
        if ColumnRef::parse(name).is_none() {
            return Err(Error::VariableNotFound(name.to_string()));
        }
        self.with_column(name, |_, c| Ok(Arc::new(QueryResult::Int(c.data().to_vec()))))
    }

    /// Run `f` on an organised column and its table
    fn with_column<T>(
        &self,
        reference: &str,
        f: impl FnOnce(&Table, &Column) -> Result<T>,
    ) -> Result<T> {
        let column_ref = ColumnRef::parse(reference)
            .ok_or_else(|| Error::ColumnNotFound(reference.to_string()))?;
        {
            let guard = self.db.read();
            let database = guard.as_ref().ok_or(Error::DatabaseNotFound)?;
            let (table, column) = database.resolve_column(&column_ref)?;
            if table.is_organized() {
                return f(table, column);
            }
        }

        let mut guard = self.db.write();
        let database = guard.as_mut().ok_or(Error::DatabaseNotFound)?;
        database
            .resolve_table_mut(column_ref.db, column_ref.table)?
            .organize()?;
        let guard = RwLockWriteGuard::downgrade(guard);
        let database = guard.as_ref().ok_or(Error::DatabaseNotFound)?;
        let (table, column) = database.resolve_column(&column_ref)?;
        f(table, column)
    }
}
