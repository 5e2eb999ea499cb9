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

//! Key file rendering
//!
//! Turns a parsed key file plus a list of new assignments into the bytes
//! that replace it. No I/O here; the transaction does that.
//!
//! Every original line comes out either exactly as it went in, terminator
//! included, or with a single `#` in front when it is a stale unassigned
//! binding for a callback that is getting a key now. New bindings go after
//! a banner at the end.

use std::collections::HashSet;

use crate::{
    config::reconcile::Assignment,
    core::{KeyCode, KeyFile},
};

/// Comment line written above generated bindings.
pub const BANNER: &str = "# Bindings added by bms-cockpit-randomizer";

/// Description written on generated bindings.
pub const MARKER: &str = "Cockpit randomizer";

/// Formats one generated binding line, without terminator.
///
/// ```text
/// SimLeftAPSwitch -1 0 0x2 0 0 0 1 "Cockpit randomizer"
/// ```
///
/// The sound index is always `-1`.
pub fn format_binding(action: &str, key_code: KeyCode) -> String {
    format!(
        "{} -1 0 {} {} 0 0 1 \"{}\"",
        action,
        key_code.scancode,
        key_code.modifier.as_digit(),
        MARKER
    )
}

/// Renders the rewritten key file.
///
/// With no assignments the output is the input, byte for byte.
pub fn render(key_file: &KeyFile, assignments: &[Assignment]) -> Vec<u8> {
    let rebound: HashSet<&str> = assignments.iter().map(|a| a.action.as_str()).collect();

    let mut out = Vec::new();
    for line in key_file.lines() {
        if line
            .binding()
            .is_some_and(|binding| rebound.contains(binding.action.as_str()))
        {
            out.push(b'#');
        }
        out.extend_from_slice(&line.raw);
        if let Some(ending) = line.ending {
            out.extend_from_slice(ending.as_str().as_bytes());
        }
    }

    if assignments.is_empty() {
        return out;
    }

    let eol = key_file.line_ending().as_str();
    if key_file.lines().last().is_some_and(|line| line.ending.is_none()) {
        out.extend_from_slice(eol.as_bytes());
    }

    out.extend_from_slice(BANNER.as_bytes());
    out.extend_from_slice(eol.as_bytes());
    for assignment in assignments {
        out.extend_from_slice(format_binding(&assignment.action, assignment.key_code).as_bytes());
        out.extend_from_slice(eol.as_bytes());
    }

    out
}
