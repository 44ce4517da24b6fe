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

//! Storage engine for colstore
//!
//! - [`Database`] / [`Table`] / [`Column`] - the column-store data model
//! - [`index`] - B+Tree and sorted indexes
//! - [`persistence`] - snapshot files
//! - [`Config`] - engine and server tunables

pub mod column;
pub mod config;
pub mod database;
pub mod index;
pub mod persistence;
pub mod table;

pub use column::Column;
pub use config::Config;
pub use database::{parse_table_ref, ColumnRef, Database};
pub use index::{BPlusTree, ColumnIndex, SortedIndex};
pub use table::Table;
