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

//! Keyspace allocation for unbound callbacks
//!
//! The keyspace is the Cartesian product of a fixed DirectInput scancode
//! table and the assignable modifiers. Allocation subtracts every key
//! already used by the key file and hands out the remainder in a fixed
//! order: modifier first, then scancode table order.
//!
//! # Determinism
//! There is no randomness here. The same key file always yields the same
//! assignments, so two runs over identical input write identical files.

use std::collections::HashSet;
use thiserror::Error;

use crate::core::types::{KeyCode, Modifier, ScanCode};

/// Not enough free keys for the callbacks that need one
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("Keyspace exhausted: {needed} callback(s) need a key but only {available} key(s) are free")]
pub struct KeyspaceExhausted {
    pub needed: usize,
    pub available: usize,
}

/// DirectInput scancodes eligible for assignment, in allocation order
///
/// Modifier keys, Escape, Enter, Tab, Space, Backspace and the lock keys
/// are left out.
#[rustfmt::skip]
pub const SCANCODE_TABLE: &[(u32, &str)] = &[
    // Number row
    (0x02, "1"), (0x03, "2"), (0x04, "3"), (0x05, "4"), (0x06, "5"), (0x07, "6"),
    (0x08, "7"), (0x09, "8"), (0x0A, "9"), (0x0B, "0"), (0x0C, "-"), (0x0D, "="),
    // Top letter row
    (0x10, "Q"), (0x11, "W"), (0x12, "E"), (0x13, "R"), (0x14, "T"), (0x15, "Y"),
    (0x16, "U"), (0x17, "I"), (0x18, "O"), (0x19, "P"), (0x1A, "["), (0x1B, "]"),
    // Home row
    (0x1E, "A"), (0x1F, "S"), (0x20, "D"), (0x21, "F"), (0x22, "G"), (0x23, "H"),
    (0x24, "J"), (0x25, "K"), (0x26, "L"), (0x27, ";"), (0x28, "'"), (0x29, "`"),
    // Bottom row
    (0x2B, "\\"), (0x2C, "Z"), (0x2D, "X"), (0x2E, "C"), (0x2F, "V"), (0x30, "B"),
    (0x31, "N"), (0x32, "M"), (0x33, ","), (0x34, "."), (0x35, "/"),
    // Function keys
    (0x3B, "F1"), (0x3C, "F2"), (0x3D, "F3"), (0x3E, "F4"), (0x3F, "F5"), (0x40, "F6"),
    (0x41, "F7"), (0x42, "F8"), (0x43, "F9"), (0x44, "F10"), (0x57, "F11"), (0x58, "F12"),
    // Numeric keypad
    (0x37, "NUM*"), (0x47, "NUM7"), (0x48, "NUM8"), (0x49, "NUM9"), (0x4A, "NUM-"),
    (0x4B, "NUM4"), (0x4C, "NUM5"), (0x4D, "NUM6"), (0x4E, "NUM+"), (0x4F, "NUM1"),
    (0x50, "NUM2"), (0x51, "NUM3"), (0x52, "NUM0"), (0x53, "NUM."),
];

/// Human-readable label for a scancode, if it is in the table.
pub fn scancode_label(code: ScanCode) -> Option<&'static str> {
    SCANCODE_TABLE
        .iter()
        .find(|(value, _)| *value == code.0)
        .map(|(_, label)| *label)
}

/// The finite set of keys the allocator may hand out
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Keyspace {
    scancodes: Vec<ScanCode>,
    modifiers: Vec<Modifier>,
}

impl Keyspace {
    /// The full keyspace: every table scancode with every assignable modifier.
    pub fn standard() -> Self {
        Self::new(SCANCODE_TABLE.iter().map(|(code, _)| ScanCode(*code)))
    }

    /// A keyspace over the given scancodes and all assignable modifiers.
    pub fn new(scancodes: impl IntoIterator<Item = ScanCode>) -> Self {
        Self::with_modifiers(scancodes, Modifier::ASSIGNABLE)
    }

    /// A keyspace over the given scancodes and modifiers.
    ///
    /// Modifiers that are never assignable are dropped, so Alt+Shift can not
    /// sneak back in through this constructor.
    pub fn with_modifiers(
        scancodes: impl IntoIterator<Item = ScanCode>,
        modifiers: impl IntoIterator<Item = Modifier>,
    ) -> Self {
        let mut seen = HashSet::new();
        let scancodes = scancodes
            .into_iter()
            .filter(|code| seen.insert(*code))
            .collect();

        let mut modifiers: Vec<Modifier> = modifiers
            .into_iter()
            .filter(|m| m.is_assignable())
            .collect();
        modifiers.sort();
        modifiers.dedup();

        Self {
            scancodes,
            modifiers,
        }
    }

    /// Total number of keys in the keyspace.
    pub fn size(&self) -> usize {
        self.scancodes.len() * self.modifiers.len()
    }

    /// Every key in allocation order (modifier-major, then table order).
    pub fn iter(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.modifiers.iter().flat_map(move |modifier| {
            self.scancodes
                .iter()
                .map(move |scancode| KeyCode::new(*scancode, *modifier))
        })
    }

    /// Keys not present in `used`, in allocation order.
    pub fn available(&self, used: &HashSet<KeyCode>) -> Vec<KeyCode> {
        self.iter().filter(|code| !used.contains(code)).collect()
    }

    /// Allocates `needed` free keys.
    ///
    /// # Errors
    ///
    /// Returns `KeyspaceExhausted` without allocating anything if fewer than
    /// `needed` keys are free.
    pub fn allocate(
        &self,
        used: &HashSet<KeyCode>,
        needed: usize,
    ) -> Result<Vec<KeyCode>, KeyspaceExhausted> {
        let mut pool = self.available(used);

        if pool.len() < needed {
            return Err(KeyspaceExhausted {
                needed,
                available: pool.len(),
            });
        }

        pool.truncate(needed);
        Ok(pool)
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::standard()
    }
}
