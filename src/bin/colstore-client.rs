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

//! colstore client
//!
//! Reads DSL commands from a terminal (with line editing and history) or
//! from piped stdin, sends them to the server and prints tuple results as
//! comma separated rows. `load("file")` is handled locally by streaming
//! the CSV file with the bulk-load protocol.

use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, DefaultEditor, EditMode, Editor};

use colstore::parser::load_path;
use colstore::server::{Client, Reply};
use colstore::storage::config::DEFAULT_SOCKET_PATH;

/// colstore command line client
#[derive(Parser, Debug)]
#[command(name = "colstore-client")]
#[command(author = "Stoolap Contributors")]
#[command(version = colstore::VERSION)]
#[command(about = "Send operator-language commands to a colstore server")]
struct Args {
    /// Path of the server's Unix domain socket
    #[arg(short = 's', long = "socket", default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,
}

/// What the input loop should do after a command
enum Flow {
    Continue,
    Stop,
}

/// Send one input line and print its outcome
fn run_line(client: &mut Client, line: &str) -> colstore::Result<Flow> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("--") {
        return Ok(Flow::Continue);
    }

    let reply = match load_path(line) {
        Some(path) => client.load_file(&path)?,
        None => client.execute(line)?,
    };
    match reply {
        Reply::Done => {}
        Reply::Tuple(_) => {
            for row in reply.format_rows() {
                println!("{}", row);
            }
        }
        Reply::Error { status, message } => eprintln!("{}: {}", status, message),
        Reply::Shutdown => return Ok(Flow::Stop),
    }
    Ok(Flow::Continue)
}

fn run_piped(client: &mut Client) -> colstore::Result<()> {
    for line in io::stdin().lock().lines() {
        if let Flow::Stop = run_line(client, &line?)? {
            break;
        }
    }
    Ok(())
}

struct Cli {
    client: Client,
    editor: Editor<(), DefaultHistory>,
}

impl Cli {
    fn new(client: Client) -> io::Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .edit_mode(EditMode::Emacs)
            .build();
        let mut editor =
            DefaultEditor::with_config(config).map_err(|e| io::Error::other(e.to_string()))?;
        if let Some(home) = dirs::home_dir() {
            let _ = editor.load_history(&home.join(".colstore_history"));
        }
        Ok(Self { client, editor })
    }

    fn run(&mut self) {
        println!("{}", colstore::version_info());
        println!("Enter commands, or 'exit' to quit.");
        println!();

        loop {
            match self.editor.readline("\x1b[1;36mcolstore>\x1b[0m ") {
                Ok(line) => {
                    let line = line.trim();
                    if matches!(line, "exit" | "quit" | "\\q") {
                        break;
                    }
                    if !line.is_empty() {
                        let _ = self.editor.add_history_entry(line);
                    }
                    match run_line(&mut self.client, line) {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Stop) => {
                            println!("Server shut down.");
                            break;
                        }
                        Err(e) => {
                            eprintln!("\x1b[1;31mError:\x1b[0m {}", e);
                            if e.is_fatal() {
                                break;
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    break;
                }
            }
        }

        if let Some(home) = dirs::home_dir() {
            let _ = self.editor.save_history(&home.join(".colstore_history"));
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut client = match Client::connect(&args.socket) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error connecting to {}: {}", args.socket.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if !io::stdin().is_terminal() {
        return match run_piped(&mut client) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    match Cli::new(client) {
        Ok(mut cli) => {
            cli.run();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error initializing CLI: {}", e);
            ExitCode::FAILURE
        }
    }
}
