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

//! Key file management with atomic writes and backup support.
//!
//! This module owns every byte that is written to a BMS key file:
//!
//! - **Atomic writes**: Uses temp-file-then-rename to prevent corruption
//! - **Backups**: Every rewrite first copies the file to `<path>.bak`
//! - **Fail before touching**: Allocation runs before the backup, so an
//!   exhausted keyspace leaves the directory exactly as it was
//!
//! # Example
//!
//! ```no_run
//! use bms_cockpit_randomizer::config::{KeyFileManager, Reconciler};
//!
//! let manager = KeyFileManager::new("BMS - Full.key".into())?;
//! let outcome = Reconciler::default().reconcile(&manager)?;
//! println!("{}", outcome);
//! # Ok::<(), bms_cockpit_randomizer::config::ConfigError>(())
//! ```

mod error;
pub mod reconcile;
pub mod transaction;
pub mod writer;

pub use error::ConfigError;
pub use reconcile::{Assignment, ReconcileOutcome, Reconciler};
pub use transaction::KeyFileTransaction;

use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::core::KeyFile;

/// Suffix appended to the key file name for its backup copy.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Manages one key file on disk.
///
/// Reads are plain file reads. Writes only happen through
/// [`KeyFileTransaction`], which backs the file up first.
///
/// A symlinked key file stays a symlink: reads, the backup copy and the
/// rewrite all go to the file it points at. The backup itself is written
/// next to the path as given.
#[derive(Debug)]
pub struct KeyFileManager {
    key_file: PathBuf,
    target: PathBuf,
}

impl KeyFileManager {
    /// Creates a manager for the given key file.
    ///
    /// If the key file is a symlink it is resolved, a warning is logged
    /// and the operation continues.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the key file doesn't exist and
    /// `ConfigError::Unreadable` if the path is not a regular file.
    pub fn new(key_file: PathBuf) -> Result<Self, ConfigError> {
        match fs::metadata(&key_file) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(ConfigError::Unreadable {
                    path: key_file,
                    source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(key_file))
            }
            Err(source) => {
                return Err(ConfigError::Unreadable {
                    path: key_file,
                    source,
                })
            }
        }

        let target = if key_file.read_link().is_ok() {
            let target = fs::canonicalize(&key_file).map_err(|source| ConfigError::Unreadable {
                path: key_file.clone(),
                source,
            })?;
            warn!(
                path = %key_file.display(),
                target = %target.display(),
                "Key file is a symlink, its target will be rewritten"
            );
            target
        } else {
            key_file.clone()
        };

        Ok(Self { key_file, target })
    }

    pub fn path(&self) -> &Path {
        &self.key_file
    }

    /// The file actually read and rewritten; differs from `path()` only
    /// for a symlink.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Where the backup of this key file lives: the full file name plus
    /// `.bak`, so `BMS - Full.key` is backed up to `BMS - Full.key.bak`.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = OsString::from(self.key_file.as_os_str());
        name.push(BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    /// Reads the key file's bytes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Unreadable` if the file cannot be read.
    pub fn read(&self) -> Result<Vec<u8>, ConfigError> {
        fs::read(&self.target).map_err(|source| ConfigError::Unreadable {
            path: self.key_file.clone(),
            source,
        })
    }

    /// Reads and parses the key file.
    ///
    /// Bytes that are not UTF-8 never fail the load; they stay in the
    /// lines they belong to and are written back unchanged.
    pub fn load(&self) -> Result<KeyFile, ConfigError> {
        let content = self.read()?;
        let key_file = KeyFile::from_bytes(&content);
        debug!(
            path = %self.key_file.display(),
            lines = key_file.lines().len(),
            "Parsed key file"
        );
        Ok(key_file)
    }

    /// Copies the key file byte for byte to its backup path.
    ///
    /// An existing backup is overwritten.
    pub(crate) fn create_backup(&self) -> Result<PathBuf, ConfigError> {
        let backup_path = self.backup_path();

        fs::copy(&self.target, &backup_path).map_err(|source| ConfigError::BackupFailed {
            path: backup_path.clone(),
            source,
        })?;

        Ok(backup_path)
    }
}
