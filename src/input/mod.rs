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

//! Keyboard injection and cockpit randomization
//!
//! # Safety Modes
//!
//! Injection operates in two modes:
//! - **DryRun**: Validates and logs every key event, never sends one
//! - **Live**: Sends scancode events to the foreground window
//!
//! Tests use DryRun or a [`RecordingInjector`].
//!
//! # Example
//! ```
//! use bms_cockpit_randomizer::core::{KeyFile, RequiredActionSet};
//! use bms_cockpit_randomizer::input::{InjectorMode, KeyboardInjector, Randomizer};
//!
//! let key_file = KeyFile::parse("SimEpuToggle -1 0 0x2F 4 0 0 1 \"EPU\"\n");
//! let injector = KeyboardInjector::new(InjectorMode::DryRun);
//! let mut randomizer = Randomizer::new(injector, RequiredActionSet::STANDARD);
//!
//! // Logs the presses but sends nothing
//! let bindings: Vec<_> = key_file.bindings().cloned().collect();
//! assert!(randomizer.execute(&bindings).is_ok());
//! ```

pub mod injector;
pub mod randomizer;

pub use injector::{
    InjectError, InjectorMode, KeyEvent, KeyInjector, KeyboardInjector, RecordingInjector,
};
pub use randomizer::Randomizer;

#[cfg(test)]
mod tests;
