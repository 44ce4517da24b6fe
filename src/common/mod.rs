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

//! Common utilities for colstore
//!
//! - [`version`] - Version information and constants
//! - [`maps`] - Hash maps keyed by names

pub mod maps;
pub mod version;

// Re-export main types for convenience
pub use maps::{new_string_map, new_string_map_with_capacity, FxBuildHasher, StringMap};
pub use version::{version, version_info, GIT_COMMIT, VERSION};
