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

//! Engine and server configuration
//!

use std::path::PathBuf;

use crate::core::{Error, Result};

/// Default server socket path
pub const DEFAULT_SOCKET_PATH: &str = "colstore.sock";

/// Default snapshot file
pub const DEFAULT_SNAPSHOT_PATH: &str = "db.txt";

/// Default fanout of B+Tree nodes
pub const DEFAULT_BTREE_ORDER: usize = 4096;

/// Smallest fanout for which node splits are well defined
pub const MIN_BTREE_ORDER: usize = 3;

/// Bytes of the smaller join input below which a nested-loop join is used
pub const DEFAULT_HASH_THRESHOLD_BYTES: usize = 4096;

/// Bytes of the smaller partition below which radix partitioning stops
pub const DEFAULT_CACHE_SIZE_BYTES: usize = 24;

/// Rows per shared-scan page
pub const DEFAULT_PAGE_SIZE: usize = 524288;

/// Pending selects per shared-scan batch
pub const DEFAULT_SHARED_SCAN_CAPACITY: usize = 10;

/// Configuration options for the engine and the server front-end
#[derive(Debug, Clone)]
pub struct Config {
    /// Unix socket the server listens on
    /// Default: colstore.sock
    pub socket_path: PathBuf,

    /// Snapshot file read at start-up and written on shutdown
    /// Default: db.txt
    pub snapshot_path: PathBuf,

    /// Maximum number of children of an internal B+Tree node
    /// Default: 4096
    pub btree_order: usize,

    /// Join inputs whose smaller side holds fewer than
    /// `hash_threshold_bytes / 4` tuples use a nested-loop join
    /// Default: 4096
    pub hash_threshold_bytes: usize,

    /// Radix partitioning stops once a side holds fewer than
    /// `cache_size_bytes / 4` tuples
    /// Default: 24
    pub cache_size_bytes: usize,

    /// Rows scanned per shared-scan page
    /// Default: 524288
    pub page_size: usize,

    /// Pending selects that trigger a shared-scan flush
    /// Default: 10
    pub shared_scan_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            btree_order: DEFAULT_BTREE_ORDER,
            hash_threshold_bytes: DEFAULT_HASH_THRESHOLD_BYTES,
            cache_size_bytes: DEFAULT_CACHE_SIZE_BYTES,
            page_size: DEFAULT_PAGE_SIZE,
            shared_scan_capacity: DEFAULT_SHARED_SCAN_CAPACITY,
        }
    }
}

impl Config {
    /// Creates a new Config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the socket path
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = path.into();
        self
    }

    /// Builder method to set the snapshot path
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    /// Builder method to set the B+Tree order
    pub fn with_btree_order(mut self, order: usize) -> Self {
        self.btree_order = order;
        self
    }

    /// Builder method to set the nested-loop join threshold in bytes
    pub fn with_hash_threshold_bytes(mut self, bytes: usize) -> Self {
        self.hash_threshold_bytes = bytes;
        self
    }

    /// Builder method to set the radix partition cut-off in bytes
    pub fn with_cache_size_bytes(mut self, bytes: usize) -> Self {
        self.cache_size_bytes = bytes;
        self
    }

    /// Builder method to set the shared-scan page size in rows
    pub fn with_page_size(mut self, rows: usize) -> Self {
        self.page_size = rows;
        self
    }

    /// Builder method to set the shared-scan batch capacity
    pub fn with_shared_scan_capacity(mut self, capacity: usize) -> Self {
        self.shared_scan_capacity = capacity;
        self
    }

    /// Tuple count below which a nested-loop join is used
    pub fn nested_loop_threshold(&self) -> usize {
        self.hash_threshold_bytes / std::mem::size_of::<i32>()
    }

    /// Tuple count below which radix partitioning stops
    pub fn partition_threshold(&self) -> usize {
        self.cache_size_bytes / std::mem::size_of::<i32>()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.btree_order < MIN_BTREE_ORDER {
            return Err(Error::invalid_argument(format!(
                "btree order must be at least {}, got {}",
                MIN_BTREE_ORDER, self.btree_order
            )));
        }
        if self.page_size == 0 {
            return Err(Error::invalid_argument("page size must be positive"));
        }
        if self.shared_scan_capacity == 0 {
            return Err(Error::invalid_argument(
                "shared scan capacity must be positive",
            ));
        }
        Ok(())
    }
}
