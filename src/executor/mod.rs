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

//! Query executor
//!
//! Commands run inside a [`Session`], which keeps the client's variables
//! in a [`Catalog`] and evaluates each [`Operator`] against the shared
//! database:
//!
//! ```text
//! DSL line
//!   ↓ parser::parse
//! Operator
//!   ↓ Session::execute
//! select / fetch / join / aggregate / tuple
//!   ↓
//! Catalog (named results) or Response::Tuple
//! ```
//!
//! # Components
//!
//! - [`scan`] - Column, index and result-vector selections
//! - [`join`] - Nested-loop, hash and radix-partitioned joins
//! - [`aggregate`] - min, max, avg, count, add and sub
//! - [`shared_scan`] - Batched selects answered by one pass over a column

pub mod aggregate;
pub mod catalog;
pub mod hash_table;
pub mod join;
pub mod operator;
pub mod scan;
pub mod session;
pub mod shared_scan;

pub use catalog::Catalog;
pub use hash_table::JoinHashTable;
pub use join::{choose_strategy, join, JoinInput, JoinOutput, JoinStrategy};
pub use operator::{CreateOperator, Operator, SelectSource};
pub use session::{shared_database, Response, Session, SharedDatabase};
