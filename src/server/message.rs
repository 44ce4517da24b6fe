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

//! Wire messages
//!
//! Every message is a fixed 28-byte little-endian header followed by
//! exactly `length` payload bytes:
//!
//! ```text
//! +--------+--------+--------+----------+----------+---------+
//! | status | length |  type  | num_rows | num_cols | payload |
//! |  u32   |  i32   |  u32   |   u64    |   u64    |  bytes  |
//! +--------+--------+--------+----------+----------+---------+
//! ```

use std::fmt;
use std::io::{ErrorKind, Read, Write};

use crate::core::{DataType, Error, QueryResult, Result};

/// Size of the encoded header in bytes
pub const HEADER_LEN: usize = 28;

/// Message status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Status {
    /// Command completed, nothing to read
    OkDone = 0,
    /// Tuple payload follows (server) or a load row (client)
    OkWaitForResponse = 1,
    /// The command could not be parsed
    UnknownCommand = 2,
    /// The command failed; payload holds the error text
    IncorrectFormat = 3,
    /// Start of a bulk load; payload holds the CSV header
    LoadRequest = 4,
    /// End of a bulk load
    LoadDone = 5,
    /// The server is shutting down
    ShutdownClient = 6,
}

impl Status {
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Status::OkDone),
            1 => Some(Status::OkWaitForResponse),
            2 => Some(Status::UnknownCommand),
            3 => Some(Status::IncorrectFormat),
            4 => Some(Status::LoadRequest),
            5 => Some(Status::LoadDone),
            6 => Some(Status::ShutdownClient),
            _ => None,
        }
    }

    /// Returns true for the two error statuses
    pub fn is_error(&self) -> bool {
        matches!(self, Status::UnknownCommand | Status::IncorrectFormat)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::OkDone => "OK_DONE",
            Status::OkWaitForResponse => "OK_WAIT_FOR_RESPONSE",
            Status::UnknownCommand => "UNKNOWN_COMMAND",
            Status::IncorrectFormat => "INCORRECT_FORMAT",
            Status::LoadRequest => "LOAD_REQUEST",
            Status::LoadDone => "LOAD_DONE",
            Status::ShutdownClient => "SHUTDOWN_CLIENT",
        };
        f.write_str(name)
    }
}

/// Fixed-size message header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub status: Status,
    pub length: i32,
    pub data_type: DataType,
    pub num_rows: u64,
    pub num_cols: u64,
}

impl MessageHeader {
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&self.status.as_u32().to_le_bytes());
        buf[4..8].copy_from_slice(&self.length.to_le_bytes());
        buf[8..12].copy_from_slice(&self.data_type.as_u32().to_le_bytes());
        buf[12..20].copy_from_slice(&self.num_rows.to_le_bytes());
        buf[20..28].copy_from_slice(&self.num_cols.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8; HEADER_LEN]) -> Result<Self> {
        let u32_at = |at: usize| u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
        let u64_at = |at: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&buf[at..at + 8]);
            u64::from_le_bytes(b)
        };

        let status = Status::from_u32(u32_at(0))
            .ok_or_else(|| Error::protocol(format!("unknown status code {}", u32_at(0))))?;
        let length = u32_at(4) as i32;
        if length < 0 {
            return Err(Error::protocol(format!("negative payload length {}", length)));
        }
        let data_type = DataType::from_u32(u32_at(8))
            .ok_or_else(|| Error::protocol(format!("unknown type code {}", u32_at(8))))?;
        Ok(Self {
            status,
            length,
            data_type,
            num_rows: u64_at(12),
            num_cols: u64_at(20),
        })
    }
}

/// A header together with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub status: Status,
    pub data_type: DataType,
    pub num_rows: u64,
    pub num_cols: u64,
    pub payload: Vec<u8>,
}

impl Message {
    /// Message with a text payload (commands, errors, CSV rows)
    pub fn text(status: Status, text: impl Into<String>) -> Self {
        Self {
            status,
            data_type: DataType::Char,
            num_rows: 0,
            num_cols: 0,
            payload: text.into().into_bytes(),
        }
    }

    /// Message without payload
    pub fn empty(status: Status) -> Self {
        Self::text(status, String::new())
    }

    /// `OkWaitForResponse` carrying equally long columns of one type,
    /// encoded column after column
    pub fn tuple(columns: &[QueryResult]) -> Result<Self> {
        let data_type = columns.first().map_or(DataType::Int, QueryResult::data_type);
        let num_rows = columns.first().map_or(0, QueryResult::len);
        let mut payload = Vec::with_capacity(num_rows * columns.len() * data_type.width());
        for column in columns {
            if column.data_type() != data_type {
                return Err(Error::type_mismatch(data_type.to_string(), column.data_type()));
            }
            if column.len() != num_rows {
                return Err(Error::LengthMismatch {
                    left: num_rows,
                    right: column.len(),
                });
            }
            column.encode_into(&mut payload);
        }
        Ok(Self {
            status: Status::OkWaitForResponse,
            data_type,
            num_rows: num_rows as u64,
            num_cols: columns.len() as u64,
            payload,
        })
    }

    /// Payload as text
    pub fn as_text(&self) -> Result<&str> {
        std::str::from_utf8(&self.payload)
            .map_err(|e| Error::protocol(format!("payload is not UTF-8: {}", e)))
    }

    /// Split a tuple payload back into its columns
    pub fn columns(&self) -> Result<Vec<QueryResult>> {
        let rows = usize::try_from(self.num_rows)
            .map_err(|_| Error::protocol("row count does not fit in memory"))?;
        let cols = usize::try_from(self.num_cols)
            .map_err(|_| Error::protocol("column count does not fit in memory"))?;
        let column_bytes = rows
            .checked_mul(self.data_type.width())
            .ok_or_else(|| Error::protocol("tuple size overflows"))?;
        if column_bytes.checked_mul(cols) != Some(self.payload.len()) {
            return Err(Error::protocol(format!(
                "payload of {} bytes does not hold {} x {} {} values",
                self.payload.len(),
                rows,
                cols,
                self.data_type
            )));
        }
        if column_bytes == 0 {
            return (0..cols)
                .map(|_| QueryResult::decode(self.data_type, &[]))
                .collect();
        }
        self.payload
            .chunks_exact(column_bytes)
            .map(|chunk| QueryResult::decode(self.data_type, chunk))
            .collect()
    }

    fn header(&self) -> Result<MessageHeader> {
        let length = i32::try_from(self.payload.len()).map_err(|_| {
            Error::protocol(format!("payload of {} bytes is too large", self.payload.len()))
        })?;
        Ok(MessageHeader {
            status: self.status,
            length,
            data_type: self.data_type,
            num_rows: self.num_rows,
            num_cols: self.num_cols,
        })
    }
}

/// Write the header then the payload
pub fn write_message<W: Write>(writer: &mut W, message: &Message) -> Result<()> {
    let header = message.header()?;
    writer.write_all(&header.encode())?;
    writer.write_all(&message.payload)?;
    writer.flush()?;
    Ok(())
}

/// Read one message; `None` when the peer closed the connection cleanly
/// before a new header
pub fn read_message<R: Read>(reader: &mut R) -> Result<Option<Message>> {
    let mut buf = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(Error::protocol("connection closed inside a message header")),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    let header = MessageHeader::decode(&buf)?;

    let mut payload = Vec::new();
    payload.try_reserve_exact(header.length as usize)?;
    payload.resize(header.length as usize, 0);
    reader.read_exact(&mut payload)?;
    Ok(Some(Message {
        status: header.status,
        data_type: header.data_type,
        num_rows: header.num_rows,
        num_cols: header.num_cols,
        payload,
    }))
}
