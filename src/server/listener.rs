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

//! Unix socket server
//!
//! Each accepted connection gets its own thread and [`Session`]. All
//! sessions share one database. A `shutdown` command from any client
//! saves the snapshot and stops the accept loop; sessions that are still
//! connected finish their current command and see the socket close.

use std::io::{self, BufReader, BufWriter};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::core::{Error, Result};
use crate::executor::{shared_database, Response, Session, SharedDatabase};
use crate::server::message::{read_message, write_message, Message, Status};
use crate::storage::{persistence, Config, Database};

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone)]
pub struct Server {
    config: Arc<Config>,
    db: SharedDatabase,
    running: Arc<AtomicBool>,
    next_session: Arc<AtomicU64>,
}

impl Server {
    /// Create a server around an already open database
    pub fn new(config: Config, db: Option<Database>) -> Self {
        Self {
            config: Arc::new(config),
            db: shared_database(db),
            running: Arc::new(AtomicBool::new(false)),
            next_session: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Validate `config` and load the snapshot it points at, if present
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let db = persistence::load(&config.snapshot_path, config.btree_order)?;
        match &db {
            Some(db) => info!(db = %db.name(), tables = db.tables().len(), "restored snapshot"),
            None => info!(path = %config.snapshot_path.display(), "no snapshot, starting empty"),
        }
        Ok(Self::new(config, db))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> SharedDatabase {
        Arc::clone(&self.db)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Ask the accept loop to stop
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Bind the configured socket, replacing a stale socket file
    pub fn bind(&self) -> Result<UnixListener> {
        let path = &self.config.socket_path;
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        let listener = UnixListener::bind(path)?;
        listener.set_nonblocking(true)?;
        self.running.store(true, Ordering::Relaxed);
        Ok(listener)
    }

    /// Bind and serve until a client issues `shutdown`
    pub fn run(&self) -> Result<()> {
        let listener = self.bind()?;
        self.serve(listener)
    }

    /// Accept connections on `listener` until stopped
    pub fn serve(&self, listener: UnixListener) -> Result<()> {
        let path = self.config.socket_path.clone();
        info!(socket = %path.display(), "server listening");

        while self.is_running() {
            match listener.accept() {
                Ok((stream, _)) => {
                    let id = self.next_session.fetch_add(1, Ordering::Relaxed);
                    let server = self.clone();
                    thread::Builder::new()
                        .name(format!("colstore-session-{}", id))
                        .spawn(move || server.handle_connection(id, stream))?;
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    error!(error = %e, "accept failed");
                }
            }
        }

        remove_socket(&path);
        info!("server stopped");
        Ok(())
    }

    fn handle_connection(&self, id: u64, stream: UnixStream) {
        info!(session = id, "session opened");
        match self.run_session(stream) {
            Ok(SessionEnd::Disconnected) => info!(session = id, "session closed"),
            Ok(SessionEnd::Shutdown) => {
                info!(session = id, "shutdown requested");
                self.stop();
            }
            // An I/O failure ends only this session
            Err(e) => warn!(session = id, error = %e, "session terminated"),
        }
    }

    fn run_session(&self, stream: UnixStream) -> Result<SessionEnd> {
        stream.set_nonblocking(false)?;
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = BufWriter::new(stream);
        let mut session = Session::new(self.database(), Arc::clone(&self.config));

        while let Some(message) = read_message(&mut reader)? {
            let reply = match message.status {
                Status::LoadRequest => bulk_load(&mut session, &message, &mut reader)?,
                Status::OkDone | Status::OkWaitForResponse => {
                    let line = message.as_text()?;
                    debug!(command = %line, "received");
                    match session.execute_dsl(line) {
                        Ok(Response::Done) => Message::empty(Status::OkDone),
                        Ok(Response::Tuple(columns)) => match Message::tuple(&columns) {
                            Ok(reply) => reply,
                            Err(e) => Message::text(Status::IncorrectFormat, e.to_string()),
                        },
                        Ok(Response::Shutdown) => {
                            write_message(&mut writer, &Message::empty(Status::ShutdownClient))?;
                            return Ok(SessionEnd::Shutdown);
                        }
                        Err(e) => error_reply(&e),
                    }
                }
                other => Message::text(
                    Status::IncorrectFormat,
                    format!("unexpected {} message", other),
                ),
            };
            write_message(&mut writer, &reply)?;
        }
        Ok(SessionEnd::Disconnected)
    }
}

enum SessionEnd {
    Disconnected,
    Shutdown,
}

/// Map a command failure to its wire status
fn error_reply(err: &Error) -> Message {
    let status = match err {
        Error::Parse(_) => Status::UnknownCommand,
        _ => Status::IncorrectFormat,
    };
    debug!(error = %err, %status, "command failed");
    Message::text(status, err.to_string())
}

/// Receive rows until `LoadDone` and load them into the table named by
/// the header line
fn bulk_load<R: io::Read>(session: &mut Session, request: &Message, reader: &mut R) -> Result<Message> {
    let header = request.as_text()?.trim().to_string();
    info!(header = %header, "bulk load started");

    let mut rows = Vec::new();
    let mut failure: Option<Error> = None;
    loop {
        let message = read_message(reader)?
            .ok_or_else(|| Error::protocol("connection closed during bulk load"))?;
        match message.status {
            Status::LoadDone => break,
            Status::OkWaitForResponse if failure.is_none() => match parse_row(message.as_text()?) {
                Ok(row) => rows.push(row),
                Err(e) => failure = Some(e),
            },
            Status::OkWaitForResponse => {}
            other => {
                return Err(Error::protocol(format!(
                    "unexpected {} message during bulk load",
                    other
                )))
            }
        }
    }

    if let Some(err) = failure {
        return Ok(Message::text(Status::IncorrectFormat, err.to_string()));
    }
    Ok(match session.load(&header, &rows) {
        Ok(()) => Message::empty(Status::OkDone),
        Err(e) => Message::text(Status::IncorrectFormat, e.to_string()),
    })
}

fn parse_row(line: &str) -> Result<Vec<i32>> {
    line.trim()
        .split(',')
        .map(|field| {
            let field = field.trim();
            field
                .parse::<i32>()
                .map_err(|_| Error::invalid_argument(format!("invalid value '{}' in load row", field)))
        })
        .collect()
}

fn remove_socket(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(socket = %path.display(), error = %e, "could not remove socket file");
        }
    }
}
