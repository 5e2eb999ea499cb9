// Copyright 2025 Eric Jingryd (tidynest@proton.me)
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

use std::{io, path::PathBuf};
use thiserror::Error;

use crate::core::KeyspaceExhausted;

/// Errors that can occur while reading or rewriting a key file.
///
/// Every variant is fatal for the reconciliation pass that raised it. None
/// of them leave the key file partially written.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key file does not exist.
    #[error("Key file not found: {0}")]
    NotFound(PathBuf),

    /// Key file exists but could not be opened or read.
    #[error("Key file unreadable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Not enough free keys for the callbacks that need one.
    #[error(transparent)]
    KeyspaceExhausted(#[from] KeyspaceExhausted),

    /// Failed to copy the key file to its backup.
    #[error("Failed to create backup {path}: {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
}
