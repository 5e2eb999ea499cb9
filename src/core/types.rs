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

//! src/core/types.rs
//!
//! Core type definitions for key file management
//!
//! This module defines the fundamental types used throughout the application:
//! - `Modifier`: The eight modifier combinations a BMS key file can express
//! - `ScanCode`: A DirectInput keyboard scancode
//! - `KeyCode`: A scancode plus modifier, the unit of allocation
//! - `Binding`: One callback-to-key assignment read from a key file
//! - `BindingLine`: One classified line of a key file, in file order
//!
//! The `0xFFFFFFFF` "unassigned" sentinel only exists at the text boundary.
//! Inside the crate an unbound callback is `input_code: None`.

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt};

use crate::core::validator::ValidationError;

/// Sentinel input code used by key files for "no key bound".
pub const UNASSIGNED_CODE: u32 = 0xFFFF_FFFF;

/// Keyboard modifier combination
///
/// Key files store modifiers as a single digit `0`-`7`. The numeric value of
/// each variant is that digit.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum Modifier {
    /// No modifier (0)
    None = 0,
    /// Shift (1)
    Shift = 1,
    /// Ctrl (2)
    Ctrl = 2,
    /// Ctrl+Shift (3)
    CtrlShift = 3,
    /// Alt (4)
    Alt = 4,
    /// Alt+Shift (5). Windows uses this chord to switch keyboard layouts,
    /// so it is honoured when read but never handed out.
    AltShift = 5,
    /// Ctrl+Alt (6)
    CtrlAlt = 6,
    /// Ctrl+Shift+Alt (7)
    CtrlShiftAlt = 7,
}

/// A physical modifier key pressed around the primary key
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ModifierKey {
    Ctrl,
    Shift,
    Alt,
}

impl Modifier {
    /// Modifiers the keyspace allocator may generate, in allocation order.
    pub const ASSIGNABLE: [Modifier; 7] = [
        Modifier::None,
        Modifier::Shift,
        Modifier::Ctrl,
        Modifier::CtrlShift,
        Modifier::Alt,
        Modifier::CtrlAlt,
        Modifier::CtrlShiftAlt,
    ];

    /// Decodes a key file modifier digit.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Modifier::None),
            1 => Some(Modifier::Shift),
            2 => Some(Modifier::Ctrl),
            3 => Some(Modifier::CtrlShift),
            4 => Some(Modifier::Alt),
            5 => Some(Modifier::AltShift),
            6 => Some(Modifier::CtrlAlt),
            7 => Some(Modifier::CtrlShiftAlt),
            _ => None,
        }
    }

    /// The digit written to a key file for this modifier.
    pub fn as_digit(self) -> u8 {
        self as u8
    }

    /// Whether the allocator is allowed to generate this modifier.
    pub fn is_assignable(self) -> bool {
        self != Modifier::AltShift
    }

    /// Physical modifier keys in the order they are pressed.
    ///
    /// Release happens in reverse order.
    pub fn keys(self) -> &'static [ModifierKey] {
        match self {
            Modifier::None => &[],
            Modifier::Shift => &[ModifierKey::Shift],
            Modifier::Ctrl => &[ModifierKey::Ctrl],
            Modifier::CtrlShift => &[ModifierKey::Ctrl, ModifierKey::Shift],
            Modifier::Alt => &[ModifierKey::Alt],
            Modifier::AltShift => &[ModifierKey::Alt, ModifierKey::Shift],
            Modifier::CtrlAlt => &[ModifierKey::Ctrl, ModifierKey::Alt],
            Modifier::CtrlShiftAlt => &[ModifierKey::Ctrl, ModifierKey::Shift, ModifierKey::Alt],
        }
    }
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierKey::Ctrl => write!(f, "CTRL"),
            ModifierKey::Shift => write!(f, "SHIFT"),
            ModifierKey::Alt => write!(f, "ALT"),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .keys()
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>();

        if names.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}

/// A DirectInput keyboard scancode
///
/// Parsed from hexadecimal text, with or without a `0x` prefix and in any
/// case, so `0x1e`, `0X1E` and `1E` are the same code.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct ScanCode(pub u32);

impl ScanCode {
    /// Parses a key file input code field.
    ///
    /// Returns `Ok(None)` for the unassigned sentinel.
    pub fn parse_field(field: &str) -> Result<Option<Self>, ValidationError> {
        let digits = field
            .strip_prefix("0x")
            .or_else(|| field.strip_prefix("0X"))
            .unwrap_or(field);

        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| ValidationError::InvalidInputCode(field.to_string()))?;

        if value == UNASSIGNED_CODE {
            Ok(None)
        } else {
            Ok(Some(ScanCode(value)))
        }
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// A scancode combined with a modifier
///
/// This is the unit the keyspace allocator hands out and the key used to
/// detect collisions between bindings.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct KeyCode {
    pub scancode: ScanCode,
    pub modifier: Modifier,
}

impl KeyCode {
    pub fn new(scancode: ScanCode, modifier: Modifier) -> Self {
        Self { scancode, modifier }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            Modifier::None => write!(f, "{}", self.scancode),
            modifier => write!(f, "{}+{}", modifier, self.scancode),
        }
    }
}

/// A callback binding read from a key file
///
/// # Example
/// ```ignore
/// // SimEpuToggle -1 0 0x2F 4 0 0 1 "EPU"
/// let binding = Binding {
///     action: "SimEpuToggle".to_string(),
///     input_code: Some(ScanCode(0x2F)),
///     modifier: Modifier::Alt,
///     description: "\"EPU\"".to_string(),
/// };
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Binding {
    /// Callback name (first field)
    pub action: String,

    /// Keyboard scancode (fourth field), `None` when unassigned
    pub input_code: Option<ScanCode>,

    /// Modifier combination (fifth field)
    pub modifier: Modifier,

    /// Fields nine onwards, rejoined with single spaces.
    /// Kept as found, quotes included. Never interpreted.
    pub description: String,
}

impl Binding {
    /// The key this binding occupies, if it is assigned.
    pub fn key_code(&self) -> Option<KeyCode> {
        self.input_code
            .map(|scancode| KeyCode::new(scancode, self.modifier))
    }

    pub fn is_assigned(&self) -> bool {
        self.input_code.is_some()
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key_code() {
            Some(code) => write!(f, "{} = {}", self.action, code),
            None => write!(f, "{} = <unassigned>", self.action),
        }
    }
}

/// Classification of one key file line
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LineKind {
    /// Empty line
    Blank,
    /// `#` comment or a no-op callback line
    Comment,
    /// A line the reconciler reads
    Binding(Binding),
    /// A line that could not be classified; passed through untouched
    Malformed(ValidationError),
}

/// Line terminator
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// One line of a key file, in original order
///
/// `raw` holds the line's bytes exactly as read and `ending` the terminator
/// that followed them. Every line that is not rewritten is emitted from
/// these two, so unrelated content survives byte for byte even when it is
/// not valid UTF-8.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BindingLine {
    /// 1-based line number
    pub number: usize,
    pub raw: Vec<u8>,
    /// `None` only for a final line with no terminator
    pub ending: Option<LineEnding>,
    pub kind: LineKind,
}

impl BindingLine {
    pub fn binding(&self) -> Option<&Binding> {
        match &self.kind {
            LineKind::Binding(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.kind, LineKind::Blank)
    }

    /// The line as text, with invalid bytes replaced. For display only.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}
