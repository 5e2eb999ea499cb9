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

//! Key file transaction management with automatic backups
//!
//! Provides atomic write operations: the key file is either fully rewritten
//! or left exactly as it was.

use atomic_write_file::AtomicWriteFile;
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::config::{ConfigError, KeyFileManager};

/// Atomic key file rewrite with a backup taken up front.
///
/// # Lifecycle
///
/// 1. `begin()` - Copies the key file to `<path>.bak` immediately
/// 2. Caller renders the new content (in memory)
/// 3. `commit()` - Writes atomically
///
/// Dropping the transaction without committing leaves the key file as it
/// was, with the backup in place.
///
/// # Example
///
/// ```no_run
/// use bms_cockpit_randomizer::config::{KeyFileManager, KeyFileTransaction};
///
/// let manager = KeyFileManager::new("BMS - Full.key".into())?;
/// let tx = KeyFileTransaction::begin(&manager)?;
///
/// tx.commit(b"SimEpuToggle -1 0 0x2F 4 0 0 1 \"EPU\"\n")?;
/// # Ok::<(), bms_cockpit_randomizer::config::ConfigError>(())
/// ```
pub struct KeyFileTransaction<'a> {
    manager: &'a KeyFileManager,
    backup_path: PathBuf,
}

impl<'a> KeyFileTransaction<'a> {
    /// Begins a new transaction by creating the backup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::BackupFailed` if the copy fails. The key file is
    /// untouched in that case.
    pub fn begin(manager: &'a KeyFileManager) -> Result<Self, ConfigError> {
        let backup_path = manager.create_backup()?;
        info!(backup = %backup_path.display(), "Backed up key file");

        Ok(Self {
            manager,
            backup_path,
        })
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Commits the transaction by atomically replacing the key file.
    ///
    /// Consumes the transaction, preventing accidental double-commits. On
    /// failure the original file is unchanged and the backup is still in
    /// place.
    pub fn commit(self, new_content: &[u8]) -> Result<PathBuf, ConfigError> {
        write_atomically(self.manager.target(), new_content)?;
        Ok(self.backup_path)
    }
}

fn write_atomically(path: &Path, content: &[u8]) -> Result<(), ConfigError> {
    let mut file = AtomicWriteFile::options().open(path).map_err(|e| {
        ConfigError::WriteFailed(format!("Failed to open for atomic write: {}", e))
    })?;

    file.write_all(content)
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to write content: {}", e)))?;

    file.commit()
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

    Ok(())
}
