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

//! DSL parser
//!
//! One command per line. Whitespace is ignored and lines starting with
//! `--` are comments. A command has the shape
//!
//! ```text
//! [target[,target]=]name(arg,arg,...)
//! ```
//!
//! except for the bare words `shutdown` and `shared`. Arguments are
//! identifiers (`[A-Za-z0-9_.]+`), quoted names, integers or `null`.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::{AggregateKind, Error, IndexType, Result};
use crate::executor::join::JoinStrategy;
use crate::executor::operator::{CreateOperator, Operator, SelectSource};
use crate::storage::{parse_table_ref, ColumnRef};

struct Grammar {
    command: Regex,
    ident: Regex,
    quoted: Regex,
}

impl Grammar {
    fn build() -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            command: Regex::new(
                r"^(?:(?P<targets>[A-Za-z0-9_]+(?:,[A-Za-z0-9_]+)?)=)?(?P<name>[a-z_]+)\((?P<args>.*)\)$",
            )?,
            ident: Regex::new(r"^[A-Za-z0-9_.]+$")?,
            quoted: Regex::new(r#"^"(?P<inner>[^"\s]+)"$"#)?,
        })
    }
}

static GRAMMAR: LazyLock<std::result::Result<Grammar, regex::Error>> = LazyLock::new(Grammar::build);

fn grammar() -> Result<&'static Grammar> {
    GRAMMAR
        .as_ref()
        .map_err(|e| Error::parse(format!("invalid command grammar: {}", e)))
}

/// Remove all whitespace
fn compact(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Parse one DSL line; `None` for blank and comment lines
pub fn parse(line: &str) -> Result<Option<Operator>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("--") {
        return Ok(None);
    }
    let text = compact(trimmed);
    match text.as_str() {
        "shutdown" => return Ok(Some(Operator::Shutdown)),
        "shared" => return Ok(Some(Operator::SharedScan)),
        _ => {}
    }

    let grammar = grammar()?;
    let caps = grammar
        .command
        .captures(&text)
        .ok_or_else(|| Error::parse(format!("unrecognized command '{}'", trimmed)))?;
    let targets: Vec<&str> = caps
        .name("targets")
        .map_or_else(Vec::new, |m| m.as_str().split(',').collect());
    let name = &caps["name"];
    let args: Vec<&str> = match &caps["args"] {
        "" => Vec::new(),
        args => args.split(',').collect(),
    };
    let cmd = Command {
        grammar,
        name,
        targets,
        args,
    };

    let op = match name {
        "create" => cmd.create()?,
        "relational_insert" => cmd.insert()?,
        "select" => cmd.select()?,
        "fetch" => {
            cmd.arity(1, 2)?;
            Operator::Project {
                target: cmd.target(0),
                column: cmd.ident(0)?,
                positions: cmd.ident(1)?,
            }
        }
        "avg" | "min" | "max" | "count" => {
            cmd.arity(1, 1)?;
            Operator::Aggregate {
                target: cmd.target(0),
                kind: name.parse::<AggregateKind>()?,
                source: cmd.ident(0)?,
            }
        }
        "add" | "sub" => {
            cmd.arity(1, 2)?;
            let (target, left, right) = (cmd.target(0), cmd.ident(0)?, cmd.ident(1)?);
            if name == "add" {
                Operator::Add { target, left, right }
            } else {
                Operator::Sub { target, left, right }
            }
        }
        "hashjoin" => {
            cmd.arity(2, 4)?;
            cmd.join(Some(JoinStrategy::Hash))?
        }
        "join" => match cmd.args.len() {
            4 => {
                cmd.arity(2, 4)?;
                cmd.join(None)?
            }
            _ => {
                cmd.arity(2, 5)?;
                let strategy = cmd.args[4].parse::<JoinStrategy>()?;
                cmd.join(Some(strategy))?
            }
        },
        "tuple" => {
            cmd.expect_targets(0)?;
            if cmd.args.is_empty() {
                return Err(Error::parse("tuple needs at least one operand"));
            }
            Operator::Tuple {
                sources: (0..cmd.args.len())
                    .map(|i| cmd.ident(i))
                    .collect::<Result<Vec<_>>>()?,
            }
        }
        "load" => {
            return Err(Error::parse(
                "load is performed by the client with the bulk-load protocol",
            ))
        }
        other => return Err(Error::parse(format!("unknown command '{}'", other))),
    };
    Ok(Some(op))
}

/// Path of a `load("file")` command, if `line` is one
pub fn load_path(line: &str) -> Option<String> {
    let text = compact(line);
    let inner = text.strip_prefix("load(")?.strip_suffix(')')?;
    let grammar = grammar().ok()?;
    let caps = grammar.quoted.captures(inner)?;
    Some(caps["inner"].to_string())
}

/// A matched command awaiting argument validation
struct Command<'a> {
    grammar: &'a Grammar,
    name: &'a str,
    targets: Vec<&'a str>,
    args: Vec<&'a str>,
}

impl Command<'_> {
    fn expect_targets(&self, targets: usize) -> Result<()> {
        if self.targets.len() != targets {
            return Err(Error::parse(format!(
                "{} assigns {} result(s), got {}",
                self.name,
                targets,
                self.targets.len()
            )));
        }
        Ok(())
    }

    fn arity(&self, targets: usize, args: usize) -> Result<()> {
        self.expect_targets(targets)?;
        if self.args.len() != args {
            return Err(Error::parse(format!(
                "{} takes {} arguments, got {}",
                self.name,
                args,
                self.args.len()
            )));
        }
        Ok(())
    }

    fn target(&self, i: usize) -> String {
        self.targets[i].to_string()
    }

    fn ident(&self, i: usize) -> Result<String> {
        let arg = self.args[i];
        if !self.grammar.ident.is_match(arg) {
            return Err(Error::parse(format!("invalid name '{}'", arg)));
        }
        Ok(arg.to_string())
    }

    fn quoted(&self, i: usize) -> Result<String> {
        let arg = self.args[i];
        self.grammar
            .quoted
            .captures(arg)
            .map(|caps| caps["inner"].to_string())
            .ok_or_else(|| Error::parse(format!("expected a quoted name, got '{}'", arg)))
    }

    fn table_ref(&self, i: usize) -> Result<(String, String)> {
        let arg = self.args[i];
        parse_table_ref(arg)
            .map(|(db, table)| (db.to_string(), table.to_string()))
            .ok_or_else(|| Error::parse(format!("expected db.tbl, got '{}'", arg)))
    }

    fn column_ref(&self, i: usize) -> Result<String> {
        let arg = self.ident(i)?;
        if ColumnRef::parse(&arg).is_none() {
            return Err(Error::parse(format!("expected db.tbl.col, got '{}'", arg)));
        }
        Ok(arg)
    }

    fn bound(&self, i: usize) -> Result<Option<i32>> {
        match self.args[i] {
            "null" => Ok(None),
            arg => arg
                .parse::<i32>()
                .map(Some)
                .map_err(|_| Error::parse(format!("invalid bound '{}'", arg))),
        }
    }

    fn create(&self) -> Result<Operator> {
        self.expect_targets(0)?;
        let kind = self.args.first().copied().unwrap_or_default();
        let create = match kind {
            "db" => {
                self.arity(0, 2)?;
                CreateOperator::Database {
                    name: self.quoted(1)?,
                }
            }
            "tbl" => {
                self.arity(0, 4)?;
                let columns = self.args[3]
                    .parse::<usize>()
                    .map_err(|_| Error::parse(format!("invalid column count '{}'", self.args[3])))?;
                CreateOperator::Table {
                    db: self.ident(2)?,
                    name: self.quoted(1)?,
                    columns,
                }
            }
            "col" => {
                self.arity(0, 4)?;
                let (db, table) = self.table_ref(2)?;
                let leading = match self.args[3] {
                    "sorted" => true,
                    "unsorted" => false,
                    other => {
                        return Err(Error::parse(format!(
                            "expected sorted or unsorted, got '{}'",
                            other
                        )))
                    }
                };
                CreateOperator::Column {
                    db,
                    table,
                    name: self.quoted(1)?,
                    leading,
                }
            }
            "idx" => {
                self.arity(0, 3)?;
                let reference = self.column_ref(1)?;
                let index_type = match self.args[2] {
                    "btree" => IndexType::BPlusTree,
                    "sorted" => IndexType::Sorted,
                    other => return Err(Error::parse(format!("unknown index type '{}'", other))),
                };
                let mut parts = reference.splitn(3, '.').map(str::to_string);
                CreateOperator::Index {
                    db: parts.next().unwrap_or_default(),
                    table: parts.next().unwrap_or_default(),
                    column: parts.next().unwrap_or_default(),
                    index_type,
                }
            }
            other => return Err(Error::parse(format!("cannot create '{}'", other))),
        };
        Ok(Operator::Create(create))
    }

    fn insert(&self) -> Result<Operator> {
        self.expect_targets(0)?;
        if self.args.len() < 2 {
            return Err(Error::parse("relational_insert needs a table and values"));
        }
        let (db, table) = self.table_ref(0)?;
        let values = self.args[1..]
            .iter()
            .map(|v| {
                v.parse::<i32>()
                    .map_err(|_| Error::parse(format!("invalid value '{}'", v)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Operator::Insert { db, table, values })
    }

    fn select(&self) -> Result<Operator> {
        self.expect_targets(1)?;
        let (source, first_bound) = match self.args.len() {
            3 => (SelectSource::Column(self.column_ref(0)?), 1),
            4 => (
                SelectSource::Result {
                    positions: self.ident(0)?,
                    values: self.ident(1)?,
                },
                2,
            ),
            n => return Err(Error::parse(format!("select takes 3 or 4 arguments, got {}", n))),
        };
        Ok(Operator::Select {
            target: self.target(0),
            source,
            lower: self.bound(first_bound)?,
            upper: self.bound(first_bound + 1)?,
        })
    }

    fn join(&self, strategy: Option<JoinStrategy>) -> Result<Operator> {
        Ok(Operator::Join {
            left_target: self.target(0),
            right_target: self.target(1),
            left_values: self.ident(0)?,
            left_positions: self.ident(1)?,
            right_values: self.ident(2)?,
            right_positions: self.ident(3)?,
            strategy,
        })
    }
}
