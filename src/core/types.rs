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

//! Core type definitions for colstore
//!
//! This module defines the fundamental enums: DataType, IndexType, AggregateKind

use std::fmt;
use std::str::FromStr;

use super::error::Error;

/// Element type of a query result
///
/// The discriminants are the on-wire type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum DataType {
    /// 32-bit signed integer (column values and row positions)
    #[default]
    Int = 0,

    /// 64-bit signed integer (sums and differences)
    Long = 1,

    /// UTF-8 text, used for messages
    Char = 2,

    /// Extended precision float (averages), stored as f64
    LongDouble = 3,
}

impl DataType {
    /// Returns true if values of this type can be tupled and aggregated
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataType::Char)
    }

    /// Size in bytes of one encoded value; Char is byte oriented
    pub fn width(&self) -> usize {
        match self {
            DataType::Int => 4,
            DataType::Long | DataType::LongDouble => 8,
            DataType::Char => 1,
        }
    }

    /// Rank in the numeric promotion order Int < Long < LongDouble
    pub(crate) fn rank(&self) -> u8 {
        match self {
            DataType::Int => 0,
            DataType::Long => 1,
            DataType::LongDouble => 2,
            DataType::Char => 3,
        }
    }

    /// Returns the type code for the wire header
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// Create DataType from a wire type code
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(DataType::Int),
            1 => Some(DataType::Long),
            2 => Some(DataType::Char),
            3 => Some(DataType::LongDouble),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "Int"),
            DataType::Long => write!(f, "Long"),
            DataType::Char => write!(f, "Char"),
            DataType::LongDouble => write!(f, "LongDouble"),
        }
    }
}

/// Index kinds a column can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexType {
    /// No index
    #[default]
    None,
    /// Parallel (value, position) arrays sorted by value
    Sorted,
    /// B+Tree keyed by value with row positions as payload
    BPlusTree,
}

impl IndexType {
    /// Token used for this index kind in snapshot files
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::None => "none",
            IndexType::Sorted => "sorted",
            IndexType::BPlusTree => "b_plus_tree",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexType {
    type Err = Error;

    /// Accepts both the snapshot tokens and the DSL spelling `btree`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(IndexType::None),
            "sorted" => Ok(IndexType::Sorted),
            "b_plus_tree" | "btree" => Ok(IndexType::BPlusTree),
            other => Err(Error::invalid_argument(format!(
                "unknown index type '{}'",
                other
            ))),
        }
    }
}

/// Scalar aggregates over a single result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Min,
    Max,
    Avg,
    Count,
}

impl AggregateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::Min => "min",
            AggregateKind::Max => "max",
            AggregateKind::Avg => "avg",
            AggregateKind::Count => "count",
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(AggregateKind::Min),
            "max" => Ok(AggregateKind::Max),
            "avg" => Ok(AggregateKind::Avg),
            "count" => Ok(AggregateKind::Count),
            other => Err(Error::parse(format!("unknown aggregate '{}'", other))),
        }
    }
}
