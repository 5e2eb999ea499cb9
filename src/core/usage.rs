//! Key usage index
//!
//! Tracks which callbacks occupy each key. The reconciler reads the set of
//! occupied keys from here; the `check` command also reports keys that are
//! bound to more than one callback.
//!
//! # Performance
//! - Add binding: O(1) average case
//! - Check a key: O(1) average case
//! - List conflicts: O(n log n) in the number of distinct keys (sorted output)

use std::collections::{HashMap, HashSet};

use crate::core::types::{Binding, BindingLine, KeyCode};

/// Index from key to every assigned binding using it.
///
/// Unassigned bindings occupy no key and are ignored by `add_binding`.
#[derive(Debug, Default)]
pub struct KeyUsage {
    bindings: HashMap<KeyCode, Vec<Binding>>,
}

/// A key bound to two or more callbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    /// The shared key
    pub key_code: KeyCode,

    /// All bindings using this key (always 2 or more)
    pub conflicting_bindings: Vec<Binding>,
}

impl KeyUsage {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Builds the index from classified key file lines.
    pub fn from_lines(lines: &[BindingLine]) -> Self {
        let mut usage = Self::new();
        for binding in lines.iter().filter_map(BindingLine::binding) {
            usage.add_binding(binding.clone());
        }
        usage
    }

    /// Adds a binding. Returns `false` if it is unassigned and was skipped.
    pub fn add_binding(&mut self, binding: Binding) -> bool {
        match binding.key_code() {
            Some(key_code) => {
                self.bindings.entry(key_code).or_default().push(binding);
                true
            }
            None => false,
        }
    }

    /// Every occupied key, whatever its modifier.
    pub fn codes(&self) -> HashSet<KeyCode> {
        self.bindings.keys().copied().collect()
    }

    /// Keys shared by two or more bindings, ordered by key.
    pub fn find_conflicts(&self) -> Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = self
            .bindings
            .iter()
            .filter(|(_, bindings)| bindings.len() > 1)
            .map(|(key_code, bindings)| Conflict {
                key_code: *key_code,
                conflicting_bindings: bindings.clone(),
            })
            .collect();

        conflicts.sort_by_key(|c| c.key_code);
        conflicts
    }

    /// Total number of assigned bindings tracked.
    pub fn total_bindings(&self) -> usize {
        self.bindings.values().map(|v| v.len()).sum()
    }
}
