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

//! Field validation for key file lines
//!
//! A line that fails any of these checks is classified as malformed and
//! passed through the rewrite untouched. Nothing here is fatal.
//!
//! # Philosophy
//! Only the fields the reconciler actually reads are validated (callback
//! name, input code, modifier). Everything else on the line is opaque.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Minimum number of whitespace-separated fields on a binding line
pub const MIN_BINDING_FIELDS: usize = 8;

#[allow(clippy::expect_used)]
static ACTION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("callback name pattern should be valid regex")
});

#[allow(clippy::expect_used)]
static INPUT_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[xX])?[0-9A-Fa-f]{1,8}$").expect("input code pattern should be valid regex")
});

/// Reasons a key file line cannot be read as a binding
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ValidationError {
    /// Line has fewer than eight fields
    #[error("Expected at least {MIN_BINDING_FIELDS} fields, found {0}")]
    TooFewFields(usize),

    /// Callback name contains characters BMS never uses
    #[error("Invalid callback name '{0}'")]
    InvalidActionName(String),

    /// Fourth field is not a hexadecimal code
    #[error("Invalid input code '{0}': expected hexadecimal")]
    InvalidInputCode(String),

    /// Fifth field is not a digit 0-7
    #[error("Invalid modifier '{0}': expected a digit 0-7")]
    InvalidModifier(String),
}

/// Validates a callback name
pub fn validate_action_name(name: &str) -> Result<(), ValidationError> {
    if ACTION_NAME.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidActionName(name.to_string()))
    }
}

/// Validates the shape of an input code field
///
/// Accepts one to eight hex digits with an optional `0x`/`0X` prefix.
pub fn validate_input_code(code: &str) -> Result<(), ValidationError> {
    if INPUT_CODE.is_match(code) {
        Ok(())
    } else {
        Err(ValidationError::InvalidInputCode(code.to_string()))
    }
}

/// Validates a modifier field and returns its digit
pub fn validate_modifier(field: &str) -> Result<u8, ValidationError> {
    match field.as_bytes() {
        [digit @ b'0'..=b'7'] => Ok(digit - b'0'),
        _ => Err(ValidationError::InvalidModifier(field.to_string())),
    }
}
