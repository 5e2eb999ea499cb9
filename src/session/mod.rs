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

//! The polling loop
//!
//! # Architecture
//! [`SessionDriver`] owns everything that lives across ticks: the latch,
//! the key file path BMS last reported and the bindings parsed from it.
//! Each tick runs to completion on the calling thread:
//!
//! 1. Read the string table. If it can't be opened, BMS is not running and
//!    the latch goes back to `Armed`. If it opens but doesn't decode, the
//!    tick is skipped and the latch is left alone.
//! 2. If BMS reports no key file, wait.
//! 3. If the key file path changed, reconcile it and reload the bindings.
//! 4. Read the flight records and step the latch, randomizing on trigger.
//!
//! Loss of telemetry is logged once when it starts and once when it ends,
//! not on every tick.

pub mod machine;

pub use machine::{SessionMachine, SessionState, Transition};

use rand::Rng;
use std::{
    path::{Path, PathBuf},
    thread,
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::{ConfigError, KeyFileManager, Reconciler},
    core::Binding,
    input::{InjectError, KeyInjector, Randomizer},
    telemetry::{
        snapshot::read_strings, FlightRecords, RegionSource, TelemetryError, TelemetrySnapshot,
    },
};

/// Default time between polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Errors that stop the polling loop.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Inject(#[from] InjectError),
}

/// What a single tick observed
#[derive(Clone, Debug, PartialEq)]
pub enum Tick {
    /// String table unreadable; BMS is not running
    NotRunning,
    /// BMS is running but has not reported a key file
    NoKeyFile,
    /// Telemetry could not be read or decoded this tick
    NoSnapshot,
    /// The latch was stepped
    Stepped(Transition),
}

/// Owns the polling state and runs ticks.
pub struct SessionDriver<S, I, R> {
    source: S,
    randomizer: Randomizer<I, R>,
    reconciler: Reconciler,
    machine: SessionMachine,
    key_file: Option<PathBuf>,
    bindings: Vec<Binding>,
    outage: Option<TelemetryError>,
    interval: Duration,
}

impl<S, I, R> SessionDriver<S, I, R>
where
    S: RegionSource,
    I: KeyInjector,
    R: Rng,
{
    pub fn new(source: S, randomizer: Randomizer<I, R>, reconciler: Reconciler) -> Self {
        Self {
            source,
            randomizer,
            reconciler,
            machine: SessionMachine::new(),
            key_file: None,
            bindings: Vec::new(),
            outage: None,
            interval: POLL_INTERVAL,
        }
    }

    /// Overrides the poll interval.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    /// The key file currently in use, if any.
    pub fn key_file(&self) -> Option<&Path> {
        self.key_file.as_deref()
    }

    /// Bindings loaded from the current key file.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn randomizer(&self) -> &Randomizer<I, R> {
        &self.randomizer
    }

    #[cfg(test)]
    pub(crate) fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Reconciles `path` and makes it the current key file.
    ///
    /// Called on startup with a user-supplied path, and whenever BMS
    /// reports a different key file.
    pub fn load_key_file(&mut self, path: &Path) -> Result<(), SessionError> {
        let manager = KeyFileManager::new(path.to_path_buf())?;
        let outcome = self.reconciler.reconcile(&manager)?;
        info!(path = %path.display(), "{}", outcome);

        let key_file = manager.load()?;
        let missing = key_file.missing_actions(self.reconciler.required());
        if !missing.is_empty() {
            warn!(count = missing.len(), "Required callbacks still unbound after reconciliation");
        }

        for line in key_file.malformed() {
            debug!(line = line.number, text = %line.text(), "Skipped malformed line");
        }

        self.bindings = key_file.bindings().cloned().collect();
        self.key_file = Some(path.to_path_buf());
        Ok(())
    }

    /// Runs one polling tick.
    ///
    /// # Errors
    ///
    /// Key file errors and injection failures. Telemetry errors are never
    /// returned; they end the tick early instead.
    pub fn tick(&mut self) -> Result<Tick, SessionError> {
        let strings = match read_strings(&self.source) {
            Ok(strings) => strings,
            Err(e) if e.is_unavailable() => {
                self.note_outage(e);
                self.machine.reset();
                return Ok(Tick::NotRunning);
            }
            Err(e) => {
                self.note_outage(e);
                return Ok(Tick::NoSnapshot);
            }
        };

        let Some(reported) = strings.key_file() else {
            self.note_recovery();
            return Ok(Tick::NoKeyFile);
        };

        let reported = PathBuf::from(reported);
        if self.key_file.as_deref() != Some(reported.as_path()) {
            info!(path = %reported.display(), "BMS reported key file");
            self.load_key_file(&reported)?;
        }

        let records = match FlightRecords::read(&self.source) {
            Ok(records) => records,
            Err(e) => {
                self.note_outage(e);
                return Ok(Tick::NoSnapshot);
            }
        };
        self.note_recovery();

        let snapshot = TelemetrySnapshot::assemble(&records, &strings);
        let randomizer = &mut self.randomizer;
        let bindings = &self.bindings;
        let transition = self
            .machine
            .step(Some(&snapshot), || randomizer.execute(bindings).map(|_| ()))?;

        match transition {
            Transition::Fired => info!("Cockpit randomized, waiting for the flight to end"),
            Transition::Rearmed => info!("Flight ended, armed for the next ramp start"),
            Transition::Unchanged => {}
        }

        Ok(Tick::Stepped(transition))
    }

    /// Polls until an error stops the loop.
    pub fn run(&mut self) -> Result<(), SessionError> {
        info!(interval = ?self.interval, "Waiting to randomize cockpit");
        loop {
            self.tick()?;
            thread::sleep(self.interval);
        }
    }

    fn note_outage(&mut self, error: TelemetryError) {
        if self.outage.is_none() {
            warn!(%error, "Telemetry unavailable, will keep retrying");
        } else {
            debug!(%error, "Telemetry still unavailable");
        }
        self.outage = Some(error);
    }

    fn note_recovery(&mut self) {
        if self.outage.take().is_some() {
            info!("Telemetry available again");
        }
    }
}

#[cfg(test)]
mod tests;
