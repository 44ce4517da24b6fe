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

//! colstore server
//!
//! Restores the snapshot (if any), listens on a Unix domain socket and
//! serves clients until one of them sends `shutdown`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use colstore::storage::config::{
    DEFAULT_BTREE_ORDER, DEFAULT_CACHE_SIZE_BYTES, DEFAULT_HASH_THRESHOLD_BYTES,
    DEFAULT_PAGE_SIZE, DEFAULT_SHARED_SCAN_CAPACITY, DEFAULT_SNAPSHOT_PATH, DEFAULT_SOCKET_PATH,
};
use colstore::{Config, Server};

/// colstore column-store server
#[derive(Parser, Debug)]
#[command(name = "colstore-server")]
#[command(author = "Stoolap Contributors")]
#[command(version = colstore::VERSION)]
#[command(about = "In-memory column store served over a Unix domain socket")]
struct Args {
    /// Unix socket to listen on
    #[arg(short = 's', long = "socket", default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Snapshot file restored at start-up and written on shutdown
    #[arg(short = 'f', long = "snapshot", default_value = DEFAULT_SNAPSHOT_PATH)]
    snapshot: PathBuf,

    /// B+Tree node fanout (minimum 3)
    #[arg(long = "btree-order", default_value_t = DEFAULT_BTREE_ORDER)]
    btree_order: usize,

    /// Join inputs smaller than this many bytes use a nested-loop join
    #[arg(long = "hash-threshold", default_value_t = DEFAULT_HASH_THRESHOLD_BYTES)]
    hash_threshold: usize,

    /// Radix partitioning stops below this many bytes per side
    #[arg(long = "cache-size", default_value_t = DEFAULT_CACHE_SIZE_BYTES)]
    cache_size: usize,

    /// Rows per shared-scan page
    #[arg(long = "page-size", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Pending selects that trigger a shared-scan flush
    #[arg(long = "shared-scan-capacity", default_value_t = DEFAULT_SHARED_SCAN_CAPACITY)]
    shared_scan_capacity: usize,

    /// Default log level, overridden by RUST_LOG
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> Config {
        Config::new()
            .with_socket_path(&self.socket)
            .with_snapshot_path(&self.snapshot)
            .with_btree_order(self.btree_order)
            .with_hash_threshold_bytes(self.hash_threshold)
            .with_cache_size_bytes(self.cache_size)
            .with_page_size(self.page_size)
            .with_shared_scan_capacity(self.shared_scan_capacity)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .try_init()
        .ok();

    info!("starting {}", colstore::version_info());

    let server = match Server::open(args.config()) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "could not start server");
            return ExitCode::FAILURE;
        }
    };

    match server.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
