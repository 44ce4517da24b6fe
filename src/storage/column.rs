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

//! Column storage

use crate::core::{IndexType, Result};
use crate::storage::index::ColumnIndex;

/// An append-only column of 32-bit integers
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    data: Vec<i32>,
    /// Physical sort key of the owning table
    leading: bool,
    /// Declared index kind; survives rebuilds and snapshots
    index_type: IndexType,
    index: Option<ColumnIndex>,
}

impl Column {
    pub fn new(name: impl Into<String>, leading: bool) -> Self {
        Self {
            name: name.into(),
            data: Vec::new(),
            leading,
            index_type: IndexType::None,
            index: None,
        }
    }

    /// Create a column holding existing data, as read from a snapshot
    pub fn with_data(name: impl Into<String>, leading: bool, data: Vec<i32>) -> Self {
        Self {
            data,
            ..Self::new(name, leading)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[i32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_leading(&self) -> bool {
        self.leading
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub fn index(&self) -> Option<&ColumnIndex> {
        self.index.as_ref()
    }

    pub(crate) fn data_mut(&mut self) -> &mut Vec<i32> {
        &mut self.data
    }

    /// Append a value, keeping the index current when `maintain_index` is set
    pub(crate) fn push(&mut self, value: i32, maintain_index: bool) -> Result<()> {
        let position = self.data.len() as u32;
        self.data.push(value);
        if maintain_index {
            if let Some(index) = self.index.as_mut() {
                index.insert(value, position)?;
            }
        }
        Ok(())
    }

    /// Declare the index kind without building it
    pub(crate) fn set_index_type(&mut self, index_type: IndexType) {
        self.index_type = index_type;
        self.index = None;
    }

    /// Rebuild the declared index from the current data
    pub(crate) fn rebuild_index(&mut self, btree_order: usize) -> Result<()> {
        self.index = ColumnIndex::build(self.index_type, &self.data, btree_order)?;
        Ok(())
    }
}
