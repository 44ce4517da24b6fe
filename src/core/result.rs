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

//! Typed intermediate results
//!
//! Every operator produces a [`QueryResult`]: a flat, owned vector of one
//! element type. Results are registered in the session catalog by name and
//! are what the server ships to clients.

use super::error::{Error, Result};
use super::types::DataType;

/// An owned, typed, flat sequence of values
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Int(Vec<i32>),
    Long(Vec<i64>),
    LongDouble(Vec<f64>),
    Char(String),
}

impl QueryResult {
    /// Element type of the result
    pub fn data_type(&self) -> DataType {
        match self {
            QueryResult::Int(_) => DataType::Int,
            QueryResult::Long(_) => DataType::Long,
            QueryResult::LongDouble(_) => DataType::LongDouble,
            QueryResult::Char(_) => DataType::Char,
        }
    }

    /// Number of tuples (bytes for Char)
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Int(v) => v.len(),
            QueryResult::Long(v) => v.len(),
            QueryResult::LongDouble(v) => v.len(),
            QueryResult::Char(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the values of an Int result
    pub fn as_ints(&self) -> Result<&[i32]> {
        match self {
            QueryResult::Int(v) => Ok(v),
            other => Err(Error::type_mismatch("Int", other.data_type())),
        }
    }

    /// Values of an Int or Long result widened to i64
    pub fn to_longs(&self) -> Result<Vec<i64>> {
        match self {
            QueryResult::Int(v) => Ok(v.iter().map(|&x| i64::from(x)).collect()),
            QueryResult::Long(v) => Ok(v.clone()),
            other => Err(Error::type_mismatch("Int or Long", other.data_type())),
        }
    }

    /// Convert a numeric result to a wider numeric type
    pub fn promote(&self, target: DataType) -> Result<QueryResult> {
        if !self.data_type().is_numeric() {
            return Err(Error::type_mismatch("a numeric result", self.data_type()));
        }
        if self.data_type().rank() > target.rank() || !target.is_numeric() {
            return Err(Error::invalid_argument(format!(
                "cannot convert {} to {}",
                self.data_type(),
                target
            )));
        }
        Ok(match (self, target) {
            (QueryResult::Int(v), DataType::Long) => {
                QueryResult::Long(v.iter().map(|&x| i64::from(x)).collect())
            }
            (QueryResult::Int(v), DataType::LongDouble) => {
                QueryResult::LongDouble(v.iter().map(|&x| f64::from(x)).collect())
            }
            (QueryResult::Long(v), DataType::LongDouble) => {
                QueryResult::LongDouble(v.iter().map(|&x| x as f64).collect())
            }
            (same, _) => same.clone(),
        })
    }

    /// Append the little-endian encoding of every value to `out`
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            QueryResult::Int(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            QueryResult::Long(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            QueryResult::LongDouble(v) => {
                v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes()))
            }
            QueryResult::Char(s) => out.extend_from_slice(s.as_bytes()),
        }
    }

    /// Decode a payload of `data_type` values
    pub fn decode(data_type: DataType, bytes: &[u8]) -> Result<QueryResult> {
        if bytes.len() % data_type.width() != 0 {
            return Err(Error::protocol(format!(
                "payload of {} bytes is not a whole number of {} values",
                bytes.len(),
                data_type
            )));
        }
        Ok(match data_type {
            DataType::Int => QueryResult::Int(
                bytes
                    .chunks_exact(4)
                    .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            DataType::Long => {
                QueryResult::Long(bytes.chunks_exact(8).map(|c| i64::from_le_bytes(le8(c))).collect())
            }
            DataType::LongDouble => QueryResult::LongDouble(
                bytes.chunks_exact(8).map(|c| f64::from_le_bytes(le8(c))).collect(),
            ),
            DataType::Char => QueryResult::Char(String::from_utf8_lossy(bytes).into_owned()),
        })
    }

    /// Render the value at `index` the way the client prints it
    pub fn format_value(&self, index: usize) -> Option<String> {
        match self {
            QueryResult::Int(v) => v.get(index).map(|x| x.to_string()),
            QueryResult::Long(v) => v.get(index).map(|x| x.to_string()),
            QueryResult::LongDouble(v) => v.get(index).map(|x| format!("{:.12}", x)),
            QueryResult::Char(s) => (index == 0).then(|| s.clone()),
        }
    }
}

fn le8(c: &[u8]) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(c);
    buf
}

impl From<Vec<i32>> for QueryResult {
    fn from(v: Vec<i32>) -> Self {
        QueryResult::Int(v)
    }
}

impl From<Vec<i64>> for QueryResult {
    fn from(v: Vec<i64>) -> Self {
        QueryResult::Long(v)
    }
}

impl From<Vec<f64>> for QueryResult {
    fn from(v: Vec<f64>) -> Self {
        QueryResult::LongDouble(v)
    }
}
