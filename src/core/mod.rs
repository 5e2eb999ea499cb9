// Copyright 2025 bakri (tidynest@proton.me)
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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the data structures and algorithms for key file
//! reconciliation, including:
//! - Type definitions for bindings, scancodes and modifiers
//! - Key file parsing and line classification
//! - The required callback list
//! - Key usage indexing and keyspace allocation
//!
//! All business logic is isolated from file I/O and the simulator so it
//! can be unit tested without either.

pub mod keyspace;
pub mod model;
pub mod parser;
pub mod required;
pub mod types;
pub mod usage;
pub mod validator;

pub use keyspace::{Keyspace, KeyspaceExhausted};
pub use model::{Classification, KeyFile};
pub use required::RequiredActionSet;
pub use types::*;
pub use usage::{Conflict, KeyUsage};
pub use validator::ValidationError;

#[cfg(test)]
mod tests;
