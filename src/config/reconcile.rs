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

//! Key file reconciliation
//!
//! One pass: parse, find required callbacks without a key, allocate free
//! keys for them, then back up and rewrite. The order matters. Allocation
//! is the only step that can fail for reasons inside the file, and it runs
//! before anything on disk is touched.

use std::{fmt, path::PathBuf};
use tracing::{debug, info};

use crate::{
    config::{writer, ConfigError, KeyFileManager, KeyFileTransaction},
    core::{KeyCode, KeyFile, Keyspace, KeyspaceExhausted, RequiredActionSet},
};

/// A key handed to a callback that had none
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment {
    pub action: String,
    pub key_code: KeyCode,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.action, self.key_code)
    }
}

/// What a reconciliation pass did
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// Every required callback already had a key. Nothing was written.
    AlreadyComplete,
    /// The file was backed up and rewritten.
    Updated {
        assignments: Vec<Assignment>,
        backup: PathBuf,
    },
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::AlreadyComplete => {
                write!(f, "All required callbacks are bound")
            }
            ReconcileOutcome::Updated {
                assignments,
                backup,
            } => write!(
                f,
                "Bound {} callback(s), backup at {}",
                assignments.len(),
                backup.display()
            ),
        }
    }
}

/// Brings a key file up to date with a required callback set
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    required: RequiredActionSet,
    keyspace: Keyspace,
}

impl Reconciler {
    pub fn new(required: RequiredActionSet, keyspace: Keyspace) -> Self {
        Self { required, keyspace }
    }

    pub fn required(&self) -> &RequiredActionSet {
        &self.required
    }

    /// Works out which key each missing callback gets.
    ///
    /// Pure: the same key file always produces the same plan. Missing
    /// callbacks are taken in required-set order and paired with free keys
    /// in allocation order.
    pub fn plan(&self, key_file: &KeyFile) -> Result<Vec<Assignment>, KeyspaceExhausted> {
        let missing = key_file.missing_actions(&self.required);
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        let used = key_file.classify().used_codes;
        let codes = self.keyspace.allocate(&used, missing.len())?;

        Ok(missing
            .into_iter()
            .zip(codes)
            .map(|(action, key_code)| Assignment {
                action: action.to_string(),
                key_code,
            })
            .collect())
    }

    /// Runs one reconciliation pass over the managed key file.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Unreadable` if the file can't be read
    /// - `ConfigError::KeyspaceExhausted` before any backup or write
    /// - `ConfigError::BackupFailed` before the file is touched
    /// - `ConfigError::WriteFailed` with the original file intact
    pub fn reconcile(&self, manager: &KeyFileManager) -> Result<ReconcileOutcome, ConfigError> {
        let key_file = manager.load()?;

        let assignments = self.plan(&key_file)?;
        if assignments.is_empty() {
            debug!(path = %manager.path().display(), "Key file already complete");
            return Ok(ReconcileOutcome::AlreadyComplete);
        }

        let content = writer::render(&key_file, &assignments);

        let tx = KeyFileTransaction::begin(manager)?;
        let backup = tx.commit(&content)?;

        for assignment in &assignments {
            debug!(%assignment, "Assigned key");
        }
        info!(
            path = %manager.path().display(),
            count = assignments.len(),
            "Bound missing callbacks"
        );

        Ok(ReconcileOutcome::Updated {
            assignments,
            backup,
        })
    }
}
