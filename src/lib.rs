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

//! BMS Cockpit Randomizer
//!
//! Watches Falcon BMS through its shared memory and, when the jet is
//! sitting cold and dark on the ramp, flips cockpit switches to random
//! positions by replaying key file bindings.
//!
//! # Features
//!
//! - **Session Detection:** Polls BMS telemetry and fires once per ramp start
//! - **Key File Reconciliation:** Binds every required callback, without
//!   touching any other line of the key file
//! - **Automatic Backups:** `<keyfile>.bak` before every rewrite
//! - **Atomic Operations:** Safe file writes, no partial key files
//! - **Dry Run:** Log key presses instead of sending them
//!
//! # Architecture
//!
//! - **`core`:** Business logic (types, parser, required callbacks, keyspace)
//! - **`config`:** File operations (reading, rendering, atomic updates, backups)
//! - **`telemetry`:** Shared memory regions and their decoding
//! - **`session`:** The Armed/Triggered latch and the polling loop
//! - **`input`:** Key injection and the randomizer
//!
//! # Examples
//!
//! ## Finding unbound callbacks
//!
//! ```no_run
//! use bms_cockpit_randomizer::core::{KeyFile, RequiredActionSet};
//!
//! let content = std::fs::read("BMS - Full.key")?;
//! let key_file = KeyFile::from_bytes(&content);
//!
//! for action in key_file.missing_actions(&RequiredActionSet::STANDARD) {
//!     println!("{} has no key", action);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Running the watcher
//!
//! ```no_run
//! use bms_cockpit_randomizer::{
//!     config::Reconciler,
//!     core::RequiredActionSet,
//!     input::{InjectorMode, KeyboardInjector, Randomizer},
//!     session::SessionDriver,
//!     telemetry::SharedMemorySource,
//! };
//!
//! let injector = KeyboardInjector::new(InjectorMode::Live);
//! let randomizer = Randomizer::new(injector, RequiredActionSet::STANDARD);
//! let mut driver = SessionDriver::new(SharedMemorySource, randomizer, Reconciler::default());
//! driver.run()?; // Blocks until an error stops the loop
//! # Ok::<(), bms_cockpit_randomizer::session::SessionError>(())
//! ```

pub mod config;
pub mod core;
pub mod input;
pub mod logging;
pub mod session;
pub mod telemetry;

// Re-export commonly used types for convenience
pub use core::{Binding, KeyCode, KeyFile, Modifier, RequiredActionSet, ScanCode};
