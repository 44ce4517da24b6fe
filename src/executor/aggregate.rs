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

//! Scalar aggregates and element-wise arithmetic over results

use crate::core::{AggregateKind, Error, QueryResult, Result};

/// Evaluate `kind` over a numeric result
///
/// min and max keep the input type, avg always yields LongDouble and count
/// yields Int. Every aggregate except count rejects empty input.
pub fn aggregate(kind: AggregateKind, input: &QueryResult) -> Result<QueryResult> {
    if kind == AggregateKind::Count {
        if !input.data_type().is_numeric() {
            return Err(Error::type_mismatch("a numeric result", input.data_type()));
        }
        let count = i32::try_from(input.len())
            .map_err(|_| Error::invalid_argument("count exceeds the Int range"))?;
        return Ok(QueryResult::Int(vec![count]));
    }
    if input.is_empty() {
        return Err(Error::EmptyInput(kind.to_string()));
    }
    match (kind, input) {
        (AggregateKind::Min | AggregateKind::Max, QueryResult::Int(v)) => {
            Ok(QueryResult::Int(extreme(kind, v).into_iter().collect()))
        }
        (AggregateKind::Min | AggregateKind::Max, QueryResult::Long(v)) => {
            Ok(QueryResult::Long(extreme(kind, v).into_iter().collect()))
        }
        (AggregateKind::Avg, QueryResult::Int(_) | QueryResult::Long(_)) => {
            let values = input.to_longs()?;
            let sum: i128 = values.iter().map(|&x| i128::from(x)).sum();
            Ok(QueryResult::LongDouble(vec![sum as f64 / values.len() as f64]))
        }
        (_, other) => Err(Error::type_mismatch("Int or Long", other.data_type())),
    }
}

fn extreme<T: Ord + Copy>(kind: AggregateKind, values: &[T]) -> Option<T> {
    if kind == AggregateKind::Min {
        values.iter().min().copied()
    } else {
        values.iter().max().copied()
    }
}

/// Element-wise `left + right`, widened to Long
pub fn add(left: &QueryResult, right: &QueryResult) -> Result<QueryResult> {
    arithmetic(left, right, "add", i64::checked_add)
}

/// Element-wise `left - right`, widened to Long
pub fn sub(left: &QueryResult, right: &QueryResult) -> Result<QueryResult> {
    arithmetic(left, right, "sub", i64::checked_sub)
}

fn arithmetic(
    left: &QueryResult,
    right: &QueryResult,
    name: &str,
    op: fn(i64, i64) -> Option<i64>,
) -> Result<QueryResult> {
    let a = left.to_longs()?;
    let b = right.to_longs()?;
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    a.iter()
        .zip(&b)
        .map(|(&x, &y)| {
            op(x, y).ok_or_else(|| Error::invalid_argument(format!("{} overflows Long", name)))
        })
        .collect::<Result<Vec<i64>>>()
        .map(QueryResult::Long)
}
