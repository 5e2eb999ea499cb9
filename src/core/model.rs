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

//! In-memory model of one key file
//!
//! Built fresh from text on every reconciliation pass and never mutated
//! afterwards. Answers the two questions reconciliation asks: which
//! callbacks are already bound, and which keys are already taken.

use std::collections::HashSet;

use crate::core::{
    parser::parse_key_file,
    required::RequiredActionSet,
    types::{Binding, BindingLine, KeyCode, LineEnding, LineKind},
    usage::KeyUsage,
};

/// Result of classifying a key file
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Classification {
    /// Callbacks with at least one assigned key
    pub assigned_actions: HashSet<String>,
    /// Keys occupied by assigned bindings
    pub used_codes: HashSet<KeyCode>,
}

/// A parsed key file
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyFile {
    lines: Vec<BindingLine>,
}

impl KeyFile {
    /// Parses key file content.
    pub fn parse(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Parses key file bytes. Lines that are not UTF-8 come out malformed.
    pub fn from_bytes(content: &[u8]) -> Self {
        Self {
            lines: parse_key_file(content),
        }
    }

    pub fn lines(&self) -> &[BindingLine] {
        &self.lines
    }

    /// Terminator for lines appended after the last one: whatever the
    /// last terminated line used, LF if none.
    pub fn line_ending(&self) -> LineEnding {
        self.lines
            .iter()
            .rev()
            .find_map(|line| line.ending)
            .unwrap_or_default()
    }

    /// Every binding line, assigned or not, in file order.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.lines.iter().filter_map(BindingLine::binding)
    }

    /// Lines that could not be read as bindings, with the reason.
    pub fn malformed(&self) -> impl Iterator<Item = &BindingLine> {
        self.lines
            .iter()
            .filter(|line| matches!(line.kind, LineKind::Malformed(_)))
    }

    /// Assigned callbacks and occupied keys.
    ///
    /// Only bindings with a real key count. A callback that appears solely
    /// with the unassigned sentinel is neither assigned nor occupying a key.
    pub fn classify(&self) -> Classification {
        let assigned_actions = self
            .bindings()
            .filter(|b| b.is_assigned())
            .map(|b| b.action.clone())
            .collect();

        Classification {
            assigned_actions,
            used_codes: self.usage().codes(),
        }
    }

    /// Key usage index over the assigned bindings.
    pub fn usage(&self) -> KeyUsage {
        KeyUsage::from_lines(&self.lines)
    }

    /// Required callbacks with no assigned key, in required-set order.
    pub fn missing_actions(&self, required: &RequiredActionSet) -> Vec<&'static str> {
        let assigned = self.classify().assigned_actions;
        required
            .iter()
            .filter(|action| !assigned.contains(*action))
            .collect()
    }

    /// Assigned bindings for required callbacks, in file order.
    ///
    /// This is what the randomizer replays.
    pub fn required_bindings(&self, required: &RequiredActionSet) -> Vec<Binding> {
        self.bindings()
            .filter(|b| b.is_assigned() && required.contains(&b.action))
            .cloned()
            .collect()
    }
}
