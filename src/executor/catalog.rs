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

//! Per-session named results
//!
//! Entries are appended in execution order and never overwritten. When a
//! name is registered twice, lookups keep returning the first entry.

use std::sync::Arc;

use crate::common::{new_string_map, StringMap};
use crate::core::QueryResult;

#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<(String, Arc<QueryResult>)>,
    /// Name to the index of its first entry
    first: StringMap<usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            first: new_string_map(),
        }
    }

    /// Append a named result
    pub fn insert(&mut self, name: impl Into<String>, result: QueryResult) {
        let name = name.into();
        let index = self.entries.len();
        self.first.entry(name.clone()).or_insert(index);
        self.entries.push((name, Arc::new(result)));
    }

    /// First result registered under `name`
    pub fn get(&self, name: &str) -> Option<Arc<QueryResult>> {
        self.first
            .get(name)
            .map(|&index| Arc::clone(&self.entries[index].1))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.first.contains_key(name)
    }

    /// Number of entries, duplicates included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}
