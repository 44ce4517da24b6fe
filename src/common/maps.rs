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

//! Hash map aliases for name lookups
//!
//! Catalog variables and table columns are looked up by name on every
//! command. Names are short and trusted, so FxHash is used throughout.

use rustc_hash::{FxHashMap, FxHasher};
use std::hash::BuildHasherDefault;

/// Type alias for FxHash's BuildHasher
pub type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Fast hash map for String keys
pub type StringMap<V> = FxHashMap<String, V>;

/// Create a new StringMap with default capacity
#[inline]
pub fn new_string_map<V>() -> StringMap<V> {
    FxHashMap::default()
}

/// Create a new StringMap with specified capacity
#[inline]
pub fn new_string_map_with_capacity<V>(capacity: usize) -> StringMap<V> {
    FxHashMap::with_capacity_and_hasher(capacity, Default::default())
}
