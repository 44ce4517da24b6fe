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

//! # colstore - an in-memory column store
//!
//! colstore keeps tables of 32-bit integer columns in memory and answers
//! queries written in a small operator language. Each client talks to the
//! server over a Unix domain socket and keeps its own intermediate results.
//!
//! ## Key Features
//!
//! - **Column-oriented storage** - Tables are arrays of `i32` columns
//! - **Indexes** - Sorted and B+Tree indexes, clustered or secondary
//! - **Joins** - Nested-loop, hash and radix-partitioned hash joins using Rayon
//! - **Shared scans** - Batched selects answered by a single pass over a column
//! - **Snapshots** - The database is saved on shutdown and reloaded at startup
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use colstore::{shared_database, Config, QueryResult, Response, Session};
//!
//! let config = Arc::new(Config::default());
//! let mut session = Session::new(shared_database(None), config);
//!
//! session.execute_dsl(r#"create(db,"db1")"#).unwrap();
//! session.execute_dsl(r#"create(tbl,"tbl1",db1,2)"#).unwrap();
//! session.execute_dsl(r#"create(col,"a",db1.tbl1,unsorted)"#).unwrap();
//! session.execute_dsl(r#"create(col,"b",db1.tbl1,unsorted)"#).unwrap();
//! session.execute_dsl("relational_insert(db1.tbl1,1,10)").unwrap();
//! session.execute_dsl("relational_insert(db1.tbl1,2,20)").unwrap();
//! session.execute_dsl("s=select(db1.tbl1.a,2,null)").unwrap();
//! session.execute_dsl("f=fetch(db1.tbl1.b,s)").unwrap();
//!
//! let response = session.execute_dsl("tuple(f)").unwrap();
//! assert_eq!(response, Response::Tuple(vec![QueryResult::Int(vec![20])]));
//! ```
//!
//! ## Modules
//!
//! - [`core`] - Core types ([`DataType`], [`QueryResult`], [`Error`])
//! - [`storage`] - Databases, tables, columns, indexes and snapshots
//! - [`parser`] - Operator language parser
//! - [`executor`] - Sessions, scans, joins and aggregates
//! - [`server`] - Wire protocol, socket server and client
//! - [`common`] - Utilities (string maps, version)

pub mod common;
pub mod core;
pub mod executor;
pub mod parser;
pub mod server;
pub mod storage;

pub use core::{AggregateKind, DataType, Error, IndexType, QueryResult, Result};

pub use common::{version, version_info, VERSION};

pub use storage::{BPlusTree, Column, ColumnIndex, ColumnRef, Config, Database, SortedIndex, Table};

pub use executor::{
    shared_database, Catalog, JoinInput, JoinOutput, JoinStrategy, Operator, Response, Session,
    SharedDatabase,
};

pub use server::{Client, Server, Status};
