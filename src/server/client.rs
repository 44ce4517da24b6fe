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

//! Client side of the wire protocol

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::os::unix::net::UnixStream;
use std::path::Path;

use crate::core::{Error, QueryResult, Result};
use crate::server::message::{read_message, write_message, Message, Status};

/// Server answer to one command or load
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Done,
    Tuple(Vec<QueryResult>),
    /// `UnknownCommand` or `IncorrectFormat` with the server's message
    Error { status: Status, message: String },
    Shutdown,
}

impl Reply {
    /// Rows of a tuple reply as comma separated lines
    pub fn format_rows(&self) -> Vec<String> {
        let Reply::Tuple(columns) = self else {
            return Vec::new();
        };
        let rows = columns.first().map_or(0, QueryResult::len);
        (0..rows)
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|column| column.format_value(row))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error { .. })
    }
}

pub struct Client {
    reader: BufReader<UnixStream>,
    writer: BufWriter<UnixStream>,
}

impl Client {
    pub fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let stream = UnixStream::connect(path.as_ref())?;
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one DSL line and wait for the reply
    pub fn execute(&mut self, line: &str) -> Result<Reply> {
        write_message(&mut self.writer, &Message::text(Status::OkDone, line))?;
        self.receive()
    }

    /// Stream a CSV file whose first line names the target columns
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Reply> {
        let file = File::open(path.as_ref())?;
        self.load_csv(BufReader::new(file))
    }

    /// Stream CSV text: a `db.tbl.col,...` header, then one row per line
    pub fn load_csv<R: BufRead>(&mut self, input: R) -> Result<Reply> {
        let mut lines = input.lines();
        let header = lines
            .next()
            .ok_or_else(|| Error::invalid_argument("load file is empty"))??;
        write_message(&mut self.writer, &Message::text(Status::LoadRequest, header.trim()))?;
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            write_message(
                &mut self.writer,
                &Message::text(Status::OkWaitForResponse, line.trim()),
            )?;
        }
        write_message(&mut self.writer, &Message::empty(Status::LoadDone))?;
        self.receive()
    }

    fn receive(&mut self) -> Result<Reply> {
        let message = read_message(&mut self.reader)?
            .ok_or_else(|| Error::protocol("server closed the connection"))?;
        Ok(match message.status {
            Status::OkDone => Reply::Done,
            Status::OkWaitForResponse => Reply::Tuple(message.columns()?),
            Status::ShutdownClient => Reply::Shutdown,
            status @ (Status::UnknownCommand | Status::IncorrectFormat) => Reply::Error {
                status,
                message: message.as_text()?.to_string(),
            },
            other => {
                return Err(Error::protocol(format!("unexpected {} reply", other)));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rows() {
        let reply = Reply::Tuple(vec![QueryResult::Int(vec![1, 2]), QueryResult::Int(vec![10, 20])]);
        assert_eq!(reply.format_rows(), vec!["1,10", "2,20"]);

        let reply = Reply::Tuple(vec![QueryResult::LongDouble(vec![2.5])]);
        assert_eq!(reply.format_rows(), vec!["2.500000000000"]);

        assert!(Reply::Done.format_rows().is_empty());
    }
}
