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

//! Equi-join over (position, value) column projections.
//!
//! Three strategies produce the same set of position pairs:
//!
//! - **Nested loop** for small inputs. The outer loop runs over the larger
//!   side; output order is outer-major.
//! - **Hash**: one chained table over the smaller side, probed with the
//!   larger side.
//! - **Radix partitioned hash**: both sides are split recursively on value
//!   bit `level` until one side of a partition is small enough for a
//!   cache-resident hash join; leaves are joined left to right.
//!
//! Strategy selection follows the configured byte thresholds; a strategy can
//! also be forced.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::core::{Error, Result};
use crate::executor::hash_table::JoinHashTable;
use crate::storage::Config;

/// Bits available for radix partitioning
const MAX_PARTITION_LEVEL: u32 = i32::BITS;

/// Partitions at least this large join their children on separate threads
const PARALLEL_PARTITION_TUPLES: usize = 1 << 14;

/// Join algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinStrategy {
    NestedLoop,
    Hash,
    RadixPartitioned,
}

impl fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinStrategy::NestedLoop => "nested-loop",
            JoinStrategy::Hash => "hash",
            JoinStrategy::RadixPartitioned => "radix",
        })
    }
}

impl FromStr for JoinStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nested-loop" => Ok(JoinStrategy::NestedLoop),
            "hash" => Ok(JoinStrategy::Hash),
            "radix" => Ok(JoinStrategy::RadixPartitioned),
            other => Err(Error::parse(format!("unknown join strategy '{}'", other))),
        }
    }
}

/// One join operand: row positions and the values found at them
#[derive(Debug, Clone, Copy)]
pub struct JoinInput<'a> {
    pub positions: &'a [i32],
    pub values: &'a [i32],
}

impl<'a> JoinInput<'a> {
    pub fn new(positions: &'a [i32], values: &'a [i32]) -> Result<Self> {
        if positions.len() != values.len() {
            return Err(Error::LengthMismatch {
                left: positions.len(),
                right: values.len(),
            });
        }
        Ok(Self { positions, values })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Matching position pairs; `left[i]` joins `right[i]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOutput {
    pub left: Vec<i32>,
    pub right: Vec<i32>,
}

impl JoinOutput {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    #[inline]
    fn emit(&mut self, left: i32, right: i32) {
        self.left.push(left);
        self.right.push(right);
    }

    fn append(&mut self, mut other: JoinOutput) {
        self.left.append(&mut other.left);
        self.right.append(&mut other.right);
    }
}

/// Strategy picked for inputs of the given sizes
pub fn choose_strategy(left_len: usize, right_len: usize, config: &Config) -> JoinStrategy {
    if left_len.min(right_len) < config.nested_loop_threshold() {
        JoinStrategy::NestedLoop
    } else {
        JoinStrategy::RadixPartitioned
    }
}

/// Join two operands on value equality
pub fn join(
    left: JoinInput<'_>,
    right: JoinInput<'_>,
    config: &Config,
    strategy: Option<JoinStrategy>,
) -> JoinOutput {
    let strategy = strategy.unwrap_or_else(|| choose_strategy(left.len(), right.len(), config));
    debug!(
        %strategy,
        left = left.len(),
        right = right.len(),
        "join"
    );
    let mut out = JoinOutput::default();
    if left.is_empty() || right.is_empty() {
        return out;
    }
    match strategy {
        JoinStrategy::NestedLoop => nested_loop_join(left, right, &mut out),
        JoinStrategy::Hash => hash_join(left, right, &mut out),
        JoinStrategy::RadixPartitioned => {
            let root = Partition::build(
                Side::copy_of(left),
                Side::copy_of(right),
                0,
                config.partition_threshold(),
            );
            root.join_into(&mut out);
        }
    }
    out
}

fn nested_loop_join(left: JoinInput<'_>, right: JoinInput<'_>, out: &mut JoinOutput) {
    if left.len() > right.len() {
        for (&lv, &lp) in left.values.iter().zip(left.positions) {
            for (&rv, &rp) in right.values.iter().zip(right.positions) {
                if lv == rv {
                    out.emit(lp, rp);
                }
            }
        }
    } else {
        for (&rv, &rp) in right.values.iter().zip(right.positions) {
            for (&lv, &lp) in left.values.iter().zip(left.positions) {
                if lv == rv {
                    out.emit(lp, rp);
                }
            }
        }
    }
}

/// Build on the smaller side, probe with the larger one
fn hash_join(left: JoinInput<'_>, right: JoinInput<'_>, out: &mut JoinOutput) {
    let bucket_count = left.len().max(right.len());
    if left.len() > right.len() {
        let table = JoinHashTable::build(right.values, right.positions, bucket_count);
        for (&value, &position) in left.values.iter().zip(left.positions) {
            for matched in table.probe(value) {
                out.emit(position, matched);
            }
        }
    } else {
        let table = JoinHashTable::build(left.values, left.positions, bucket_count);
        for (&value, &position) in right.values.iter().zip(right.positions) {
            for matched in table.probe(value) {
                out.emit(matched, position);
            }
        }
    }
}

/// Owned values and positions of one operand inside a partition
#[derive(Debug, Default)]
struct Side {
    values: Vec<i32>,
    positions: Vec<i32>,
}

impl Side {
    fn copy_of(input: JoinInput<'_>) -> Self {
        Self {
            values: input.values.to_vec(),
            positions: input.positions.to_vec(),
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn input(&self) -> JoinInput<'_> {
        JoinInput {
            positions: &self.positions,
            values: &self.values,
        }
    }

    /// Move every tuple into the child selected by bit `level` of its value
    fn split(self, level: u32) -> (Side, Side) {
        let mask = 1i32.wrapping_shl(level);
        let mut low = Side::default();
        let mut high = Side::default();
        for (value, position) in self.values.into_iter().zip(self.positions) {
            let child = if value & mask != 0 { &mut high } else { &mut low };
            child.values.push(value);
            child.positions.push(position);
        }
        (low, high)
    }
}

/// Radix partition tree
#[derive(Debug)]
enum Partition {
    Leaf { left: Side, right: Side },
    Internal { low: Box<Partition>, high: Box<Partition>, tuples: usize },
}

impl Partition {
    fn build(left: Side, right: Side, level: u32, threshold: usize) -> Partition {
        if left.len().min(right.len()) < threshold || level >= MAX_PARTITION_LEVEL {
            return Partition::Leaf { left, right };
        }
        let tuples = left.len() + right.len();
        let (left_low, left_high) = left.split(level);
        let (right_low, right_high) = right.split(level);
        Partition::Internal {
            low: Box::new(Partition::build(left_low, right_low, level + 1, threshold)),
            high: Box::new(Partition::build(left_high, right_high, level + 1, threshold)),
            tuples,
        }
    }

    /// Join leaves in post-order, low child before high child
    fn join_into(&self, out: &mut JoinOutput) {
        match self {
            Partition::Leaf { left, right } => {
                if !left.values.is_empty() && !right.values.is_empty() {
                    hash_join(left.input(), right.input(), out);
                }
            }
            Partition::Internal { low, high, tuples } if *tuples >= PARALLEL_PARTITION_TUPLES => {
                let (low_out, high_out) = rayon::join(
                    || {
                        let mut part = JoinOutput::default();
                        low.join_into(&mut part);
                        part
                    },
                    || {
                        let mut part = JoinOutput::default();
                        high.join_into(&mut part);
                        part
                    },
                );
                out.append(low_out);
                out.append(high_out);
            }
            Partition::Internal { low, high, .. } => {
                low.join_into(out);
                high.join_into(out);
            }
        }
    }
}
