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

//! Batched selects over one column
//!
//! While batching is on, selects that would scan the same column linearly
//! are queued and later answered by a single pass. The column is processed
//! page by page; inside a page every pending select runs as its own rayon
//! task and appends to a private buffer. The scope closes before the next
//! page starts, so each buffer stays in ascending row order and the output
//! equals running the selects one by one.
//!
//! Each select remembers how many rows the column held when it was queued
//! and only sees that prefix. Rows appended later by other sessions are
//! ignored. The batch also pins the table layout; a table that was re-sorted
//! in the meantime cannot answer the queued selects.

use crate::executor::scan::col_scan;

/// A queued column select
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelect {
    pub target: String,
    pub lower: i32,
    pub upper: i32,
    /// Column length when the select was issued
    pub rows: usize,
}

/// Column and table layout a batch was queued against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSource {
    pub column: String,
    pub layout: u64,
}

/// Queue of selects waiting for a shared pass over one column
#[derive(Debug)]
pub struct SelectBatch {
    source: Option<BatchSource>,
    pending: Vec<PendingSelect>,
    capacity: usize,
}

impl SelectBatch {
    pub fn new(capacity: usize) -> Self {
        Self {
            source: None,
            pending: Vec::new(),
            capacity,
        }
    }

    /// Column the queued selects target
    pub fn column(&self) -> Option<&str> {
        self.source.as_ref().map(|source| source.column.as_str())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.pending.len() >= self.capacity
    }

    /// True if a select on `column` at `layout` can join the batch
    pub fn accepts(&self, column: &str, layout: u64) -> bool {
        self.source
            .as_ref()
            .map_or(true, |queued| queued.column == column && queued.layout == layout)
    }

    /// True if a queued select will register `name`
    pub fn produces(&self, name: &str) -> bool {
        self.pending.iter().any(|select| select.target == name)
    }

    pub fn push(&mut self, column: &str, layout: u64, select: PendingSelect) {
        if self.source.is_none() {
            self.source = Some(BatchSource {
                column: column.to_string(),
                layout,
            });
        }
        self.pending.push(select);
    }

    /// Empty the queue, returning its source and selects
    pub fn take(&mut self) -> Option<(BatchSource, Vec<PendingSelect>)> {
        let source = self.source.take()?;
        Some((source, std::mem::take(&mut self.pending)))
    }
}

/// Answer every select with one pass over `data`
pub fn shared_scan(data: &[i32], selects: &[PendingSelect], page_size: usize) -> Vec<Vec<i32>> {
    let mut buffers: Vec<Vec<i32>> = vec![Vec::new(); selects.len()];
    let page_size = page_size.max(1);
    let rows = selects.iter().map(|s| s.rows).max().unwrap_or(0).min(data.len());

    for (page_index, page) in data[..rows].chunks(page_size).enumerate() {
        let start = page_index * page_size;
        let offset = start as i32;
        rayon::scope(|scope| {
            for (buffer, select) in buffers.iter_mut().zip(selects) {
                let visible = &page[..select.rows.saturating_sub(start).min(page.len())];
                if visible.is_empty() {
                    continue;
                }
                scope.spawn(move |_| {
                    buffer.extend(
                        col_scan(visible, select.lower, select.upper)
                            .into_iter()
                            .map(|row| row + offset),
                    );
                });
            }
        });
    }
    buffers
}
