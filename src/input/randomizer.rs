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

//! Cockpit randomization
//!
//! Every required callback with a key is pressed between one and six
//! times. Cycling switches land in a random position that way. Switches
//! that have one callback per position would always end up in the
//! position listed last, so the bindings are shuffled first and the last
//! one pressed is random too.

use rand::{rngs::ThreadRng, seq::SliceRandom, Rng};
use std::{thread, time::Duration};
use tracing::{debug, info};

use crate::{
    core::{Binding, KeyCode, RequiredActionSet},
    input::injector::{modifier_scancode, InjectError, KeyInjector},
};

/// How long the primary key is held down.
pub const HOLD_DELAY: Duration = Duration::from_millis(10);

/// Upper bound (inclusive) of presses per binding.
pub const MAX_PRESSES: u32 = 6;

/// Replays bindings through a key injector in random order
pub struct Randomizer<I, R = ThreadRng> {
    injector: I,
    rng: R,
    required: RequiredActionSet,
    hold: Duration,
}

impl<I: KeyInjector> Randomizer<I, ThreadRng> {
    /// A randomizer backed by the thread-local RNG.
    pub fn new(injector: I, required: RequiredActionSet) -> Self {
        Self::with_rng(injector, required, rand::rng())
    }
}

impl<I: KeyInjector, R: Rng> Randomizer<I, R> {
    pub fn with_rng(injector: I, required: RequiredActionSet, rng: R) -> Self {
        Self {
            injector,
            rng,
            required,
            hold: HOLD_DELAY,
        }
    }

    /// Overrides the key hold delay.
    pub fn hold_delay(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    /// Randomizes the cockpit.
    ///
    /// Bindings for callbacks outside the required set, and unassigned
    /// bindings, are skipped. Returns the number of key presses sent.
    ///
    /// # Errors
    ///
    /// The first injector failure. Nothing after it is sent.
    pub fn execute(&mut self, bindings: &[Binding]) -> Result<usize, InjectError> {
        let mut keys: Vec<(&str, KeyCode)> = bindings
            .iter()
            .filter(|b| self.required.contains(&b.action))
            .filter_map(|b| b.key_code().map(|key| (b.action.as_str(), key)))
            .collect();

        keys.shuffle(&mut self.rng);

        let mut presses = 0;
        for (action, key) in keys {
            let count = self.rng.random_range(1..=MAX_PRESSES);
            debug!(action, %key, count, "Toggling callback");
            for _ in 0..count {
                self.send_key(key)?;
                presses += 1;
            }
        }

        info!(presses, "Randomized cockpit");
        Ok(presses)
    }

    /// Sends one key with its modifiers.
    ///
    /// Modifiers go down in order, then the key. After the hold delay the
    /// key comes up, then the modifiers in reverse.
    pub fn send_key(&mut self, key: KeyCode) -> Result<(), InjectError> {
        let modifiers = key.modifier.keys();

        for modifier in modifiers {
            self.injector.press(modifier_scancode(*modifier))?;
        }
        self.injector.press(key.scancode)?;

        if !self.hold.is_zero() {
            thread::sleep(self.hold);
        }

        self.injector.release(key.scancode)?;
        for modifier in modifiers.iter().rev() {
            self.injector.release(modifier_scancode(*modifier))?;
        }

        Ok(())
    }
}
