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

//! Operator descriptors
//!
//! The parser turns each DSL line into one [`Operator`]; the session
//! executes it. Operands are referenced by name and resolved at execution
//! time against the session catalog first, then as `db.tbl.col` columns.

use std::fmt;

use crate::core::{AggregateKind, IndexType};
use crate::executor::join::JoinStrategy;

/// Schema definition commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOperator {
    Database {
        name: String,
    },
    Table {
        db: String,
        name: String,
        columns: usize,
    },
    Column {
        db: String,
        table: String,
        name: String,
        leading: bool,
    },
    Index {
        db: String,
        table: String,
        column: String,
        index_type: IndexType,
    },
}

/// Input of a select
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectSource {
    /// `db.tbl.col` reference
    Column(String),
    /// Prior positions result and the values found at them
    Result { positions: String, values: String },
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Create(CreateOperator),
    Select {
        target: String,
        source: SelectSource,
        lower: Option<i32>,
        upper: Option<i32>,
    },
    /// Fetch column values at a set of positions
    Project {
        target: String,
        column: String,
        positions: String,
    },
    Join {
        left_target: String,
        right_target: String,
        left_values: String,
        left_positions: String,
        right_values: String,
        right_positions: String,
        strategy: Option<JoinStrategy>,
    },
    Insert {
        db: String,
        table: String,
        values: Vec<i32>,
    },
    Aggregate {
        target: String,
        kind: AggregateKind,
        source: String,
    },
    Tuple {
        sources: Vec<String>,
    },
    Add {
        target: String,
        left: String,
        right: String,
    },
    Sub {
        target: String,
        left: String,
        right: String,
    },
    Shutdown,
    SharedScan,
}

impl Operator {
    /// Names of results or columns this operator reads
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Operator::Select { source, .. } => match source {
                SelectSource::Column(column) => vec![column.as_str()],
                SelectSource::Result { positions, values } => {
                    vec![positions.as_str(), values.as_str()]
                }
            },
            Operator::Project {
                column, positions, ..
            } => vec![column.as_str(), positions.as_str()],
            Operator::Join {
                left_values,
                left_positions,
                right_values,
                right_positions,
                ..
            } => vec![
                left_values.as_str(),
                left_positions.as_str(),
                right_values.as_str(),
                right_positions.as_str(),
            ],
            Operator::Aggregate { source, .. } => vec![source.as_str()],
            Operator::Tuple { sources } => sources.iter().map(String::as_str).collect(),
            Operator::Add { left, right, .. } | Operator::Sub { left, right, .. } => {
                vec![left.as_str(), right.as_str()]
            }
            Operator::Create(_) | Operator::Insert { .. } | Operator::Shutdown | Operator::SharedScan => {
                Vec::new()
            }
        }
    }

    /// Names this operator registers in the catalog
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Operator::Select { target, .. }
            | Operator::Project { target, .. }
            | Operator::Aggregate { target, .. }
            | Operator::Add { target, .. }
            | Operator::Sub { target, .. } => vec![target.as_str()],
            Operator::Join {
                left_target,
                right_target,
                ..
            } => vec![left_target.as_str(), right_target.as_str()],
            _ => Vec::new(),
        }
    }

    /// True for commands that change stored data or schema
    pub fn modifies_storage(&self) -> bool {
        matches!(self, Operator::Create(_) | Operator::Insert { .. })
    }

    /// Short command name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Operator::Create(_) => "create",
            Operator::Select { .. } => "select",
            Operator::Project { .. } => "fetch",
            Operator::Join { .. } => "join",
            Operator::Insert { .. } => "relational_insert",
            Operator::Aggregate { .. } => "aggregate",
            Operator::Tuple { .. } => "tuple",
            Operator::Add { .. } => "add",
            Operator::Sub { .. } => "sub",
            Operator::Shutdown => "shutdown",
            Operator::SharedScan => "shared",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.targets().as_slice() {
            [] => write!(f, "{}", self.kind()),
            targets => write!(f, "{}={}", targets.join(","), self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs_and_targets() {
        let op = Operator::Join {
            left_target: "p1".into(),
            right_target: "p2".into(),
            left_values: "v1".into(),
            left_positions: "s1".into(),
            right_values: "v2".into(),
            right_positions: "s2".into(),
            strategy: None,
        };
        assert_eq!(op.inputs(), vec!["v1", "s1", "v2", "s2"]);
        assert_eq!(op.targets(), vec!["p1", "p2"]);
        assert_eq!(op.to_string(), "p1,p2=join");
        assert!(!op.modifies_storage());
    }

    #[test]
    fn test_select_inputs() {
        let op = Operator::Select {
            target: "s1".into(),
            source: SelectSource::Column("db1.tbl1.col1".into()),
            lower: None,
            upper: Some(5),
        };
        assert_eq!(op.inputs(), vec!["db1.tbl1.col1"]);
        assert_eq!(op.targets(), vec!["s1"]);
        assert!(Operator::Shutdown.targets().is_empty());
        assert!(Operator::Insert {
            db: "db1".into(),
            table: "tbl1".into(),
            values: vec![1]
        }
        .modifies_storage());
    }
}
