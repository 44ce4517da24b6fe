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

//! Snapshot files
//!
//! The snapshot is line oriented text, one token per line:
//!
//! ```text
//! db_name
//! table_count
//!   table_name
//!   col_count
//!     col_name
//!     leading | none
//!     sorted | b_plus_tree | none
//!     data_count
//!     value (data_count lines)
//! ```
//!
//! Indexes are not stored; they are rebuilt from the column data on load.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::core::{Error, IndexType, Result};
use crate::storage::column::Column;
use crate::storage::database::Database;
use crate::storage::table::Table;

/// Values reserved before reading a column; counts come from the file
const PREALLOC_VALUES: usize = 1 << 16;

/// Write `db` in snapshot format
pub fn write_snapshot<W: Write>(db: &Database, mut out: W) -> Result<()> {
    writeln!(out, "{}", db.name())?;
    writeln!(out, "{}", db.tables().len())?;
    for table in db.tables() {
        writeln!(out, "{}", table.name())?;
        writeln!(out, "{}", table.columns().len())?;
        for column in table.columns() {
            writeln!(out, "{}", column.name())?;
            writeln!(out, "{}", if column.is_leading() { "leading" } else { "none" })?;
            writeln!(out, "{}", column.index_type())?;
            writeln!(out, "{}", column.len())?;
            for value in column.data() {
                writeln!(out, "{}", value)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Persist `db` to `path`, replacing any previous snapshot
pub fn save(db: &Database, path: &Path) -> Result<()> {
    let tmp = path.with_extension("tmp");
    {
        let file = File::create(&tmp)?;
        write_snapshot(db, BufWriter::new(file))?;
    }
    fs::rename(&tmp, path)?;
    info!(path = %path.display(), tables = db.tables().len(), "snapshot saved");
    Ok(())
}

/// Line reader that reports where a snapshot ended early
struct Lines<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> Lines<R> {
    fn token(&mut self, what: &str) -> Result<&str> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Err(Error::snapshot(format!(
                "unexpected end of file at line {}, expected {}",
                self.line + 1,
                what
            )));
        }
        self.line += 1;
        Ok(self.buf.trim())
    }

    fn number<T: std::str::FromStr>(&mut self, what: &str) -> Result<T> {
        let line = self.line + 1;
        let token = self.token(what)?;
        token
            .parse()
            .map_err(|_| Error::snapshot(format!("line {}: invalid {} '{}'", line, what, token)))
    }
}

/// Rebuild a database from snapshot text
pub fn read_snapshot<R: BufRead>(reader: R, btree_order: usize) -> Result<Database> {
    let mut lines = Lines {
        reader,
        line: 0,
        buf: String::new(),
    };
    let name = lines.token("database name")?.to_string();
    let mut db = Database::new(name, btree_order);
    let table_count: usize = lines.number("table count")?;

    for _ in 0..table_count {
        let table_name = lines.token("table name")?.to_string();
        let col_count: usize = lines.number("column count")?;
        let mut table = Table::new(table_name, col_count, btree_order);

        for position in 0..col_count {
            let col_name = lines.token("column name")?.to_string();
            let leading = match lines.token("leading flag")? {
                "leading" => true,
                "none" => false,
                other => {
                    return Err(Error::snapshot(format!("invalid leading flag '{}'", other)))
                }
            };
            let index_type: IndexType = lines
                .token("index type")?
                .parse()
                .map_err(|e: Error| Error::snapshot(e.to_string()))?;
            let data_count: usize = lines.number("data count")?;
            let mut data = Vec::with_capacity(data_count.min(PREALLOC_VALUES));
            for _ in 0..data_count {
                data.push(lines.number::<i32>("value")?);
            }
            table.restore_column(Column::with_data(col_name, leading, data))?;
            if index_type != IndexType::None {
                table.declare_index(position, index_type);
            }
        }
        table.organize()?;
        db.push_table(table)?;
    }
    Ok(db)
}

/// Load the snapshot at `path`; `None` when no snapshot exists
pub fn load(path: &Path, btree_order: usize) -> Result<Option<Database>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let db = read_snapshot(BufReader::new(file), btree_order)?;
    info!(path = %path.display(), db = db.name(), tables = db.tables().len(), "snapshot loaded");
    Ok(Some(db))
}
