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

//! Client/server plumbing over a Unix domain socket
//!
//! - [`message`] - Fixed header wire codec
//! - [`listener`] - Thread-per-session server
//! - [`client`] - Blocking client used by the CLI and tests

pub mod client;
pub mod listener;
pub mod message;

pub use client::{Client, Reply};
pub use listener::Server;
pub use message::{read_message, write_message, Message, MessageHeader, Status, HEADER_LEN};
