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

//! Error types for colstore
//!
//! Every fallible operation in the engine returns [`Result`]. Errors carry a
//! kind (see the `is_*` helpers) and a human readable message which the
//! server forwards to the client verbatim.

use thiserror::Error;

use super::types::DataType;

/// Result type alias for colstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the storage and execution engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Resource errors
    // =========================================================================
    /// Memory for a structure could not be reserved. Fatal for the current
    /// operation; retrying without freeing memory will fail again.
    #[error("allocation failed: {0}")]
    Allocation(String),

    // =========================================================================
    // Lookup errors
    // =========================================================================
    /// No database has been created or loaded yet
    #[error("no database is open")]
    DatabaseNotFound,

    /// Table not found in the database
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Column not found in table
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    /// Neither a catalog variable nor a column reference
    #[error("variable '{0}' not found")]
    VariableNotFound(String),

    // =========================================================================
    // Definition errors
    // =========================================================================
    /// A database is already open
    #[error("database '{0}' already exists")]
    DatabaseAlreadyExists(String),

    /// Table already exists when trying to create
    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),

    /// Column already exists in table
    #[error("column '{0}' already exists")]
    ColumnAlreadyExists(String),

    /// Column already carries an index
    #[error("index already exists on column '{0}'")]
    IndexAlreadyExists(String),

    /// Table already holds its declared number of columns
    #[error("table '{table}' is full, it was declared with {capacity} columns")]
    TableFull { table: String, capacity: usize },

    // =========================================================================
    // Argument errors
    // =========================================================================
    /// Invalid argument for an operation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two operands that must be aligned have different lengths
    #[error("vectors must have the same length, got {left} and {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Aggregate over zero tuples
    #[error("cannot compute {0} of an empty result")]
    EmptyInput(String),

    /// Operand has a type the operation does not accept
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: DataType },

    /// Position vector references a row past the end of a column
    #[error("position {position} out of bounds for column of length {len}")]
    PositionOutOfBounds { position: i64, len: usize },

    /// Row width does not match the table width
    #[error("expected {expected} values, got {got}")]
    ColumnCountMismatch { expected: usize, got: usize },

    // =========================================================================
    // Index errors
    // =========================================================================
    /// Range lookup requested on a column without a usable index
    #[error("no index on column '{0}'")]
    IndexMissing(String),

    // =========================================================================
    // Input / output errors
    // =========================================================================
    /// DSL command could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Malformed wire message
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Malformed snapshot file
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// IO error (wrapped)
    #[error("IO error: {message}")]
    Io { message: String },
}

impl Error {
    /// Create a new Allocation error
    pub fn allocation(what: impl Into<String>) -> Self {
        Error::Allocation(what.into())
    }

    /// Create a new InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Create a new TypeMismatch error
    pub fn type_mismatch(expected: impl Into<String>, got: DataType) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            got,
        }
    }

    /// Create a new Parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    /// Create a new Protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol(message.into())
    }

    /// Create a new Snapshot error
    pub fn snapshot(message: impl Into<String>) -> Self {
        Error::Snapshot(message.into())
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::DatabaseNotFound
                | Error::TableNotFound(_)
                | Error::ColumnNotFound(_)
                | Error::VariableNotFound(_)
        )
    }

    /// Check if this error was caused by a bad operand
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::LengthMismatch { .. }
                | Error::EmptyInput(_)
                | Error::TypeMismatch { .. }
                | Error::PositionOutOfBounds { .. }
                | Error::ColumnCountMismatch { .. }
        )
    }

    /// Check if the error aborts the operation without a sensible retry
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Allocation(_) | Error::Io { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
        }
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Error::Allocation(err.to_string())
    }
}
