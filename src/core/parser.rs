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

//! src/core/parser.rs
//!
//! Falcon BMS key file parser
//!
//! A key file holds one callback binding or comment per line, with
//! whitespace-separated fields:
//!
//! ```text
//! SimEpuToggle -1 0 0X2F 4 0 0 1 "EPU Toggle"
//! ^callback    ^sound  ^code ^mod      ^description (fields 9+)
//! ```
//!
//! # Architecture
//! Every line goes through exactly one classification step,
//! [`classify_line`], which produces a [`LineKind`]. Nothing downstream
//! looks at field counts or prefixes again.
//!
//! Parsing never fails as a whole. A line that cannot be read as a binding
//! becomes `LineKind::Malformed` and is carried through unchanged.

use nom::{
    bytes::complete::take_while1,
    character::complete::{space0, space1},
    multi::separated_list0,
    sequence::preceded,
    IResult, Parser,
};

use crate::core::{
    required::NO_OP_ACTION,
    types::{Binding, BindingLine, LineEnding, LineKind, Modifier, ScanCode},
    validator::{
        validate_action_name, validate_input_code, validate_modifier, ValidationError,
        MIN_BINDING_FIELDS,
    },
};

/// Parse a complete key file
///
/// # Arguments
/// * `content` - The full key file content, as bytes
///
/// # Returns
/// One `BindingLine` per line, in file order
///
/// # Example
/// ```ignore
/// let content = std::fs::read("BMS - Full.key")?;
/// let lines = parse_key_file(&content);
/// ```
pub fn parse_key_file(content: &[u8]) -> Vec<BindingLine> {
    split_lines(content)
        .enumerate()
        .map(|(index, (raw, ending))| BindingLine {
            number: index + 1,
            raw: raw.to_vec(),
            ending,
            kind: classify_raw(raw),
        })
        .collect()
}

/// Split content into lines, each with the terminator that ended it
///
/// A final line without a terminator gets `None`. A lone `\r` is line
/// content, not a terminator.
pub fn split_lines(content: &[u8]) -> impl Iterator<Item = (&[u8], Option<LineEnding>)> {
    content.split_inclusive(|&b| b == b'\n').map(|chunk| {
        if let Some(line) = chunk.strip_suffix(b"\r\n") {
            (line, Some(LineEnding::CrLf))
        } else if let Some(line) = chunk.strip_suffix(b"\n") {
            (line, Some(LineEnding::Lf))
        } else {
            (chunk, None)
        }
    })
}

/// Classify a line that may not be valid UTF-8
///
/// Invalid bytes are replaced before classifying. The fields the reconciler
/// reads are ASCII, so a stray byte in a description still yields a binding
/// and its key still counts as taken. A stray byte in a field that is read
/// fails that field's validation.
pub fn classify_raw(raw: &[u8]) -> LineKind {
    classify_line(&String::from_utf8_lossy(raw))
}

/// Classify a single key file line
///
/// Rules, in order:
/// 1. Empty or whitespace-only → `Blank`
/// 2. Starts with `#` or names the no-op callback → `Comment`
/// 3. Fewer than eight fields → `Malformed`
/// 4. Otherwise a `Binding`, unless a field the reconciler reads is invalid
pub fn classify_line(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    if trimmed.starts_with('#') {
        return LineKind::Comment;
    }

    let fields = match split_fields(trimmed) {
        Ok((_, fields)) => fields,
        Err(_) => return LineKind::Malformed(ValidationError::TooFewFields(0)),
    };

    if fields.first() == Some(&NO_OP_ACTION) {
        return LineKind::Comment;
    }

    if fields.len() < MIN_BINDING_FIELDS {
        return LineKind::Malformed(ValidationError::TooFewFields(fields.len()));
    }

    match parse_binding_fields(&fields) {
        Ok(binding) => LineKind::Binding(binding),
        Err(issue) => LineKind::Malformed(issue),
    }
}

/// Split a line into whitespace-separated fields
pub fn split_fields(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        space0,
        separated_list0(space1, take_while1(|c: char| !c.is_whitespace())),
    )
    .parse(input)
}

/// Build a binding from the fields of a line
///
/// Field 1 is the callback, field 4 the input code, field 5 the modifier,
/// and fields 9 onwards the description.
pub fn parse_binding_fields(fields: &[&str]) -> Result<Binding, ValidationError> {
    let [action, _sound, _kind, code, modifier, _combo_code, _combo_modifier, _visibility, description @ ..] =
        fields
    else {
        return Err(ValidationError::TooFewFields(fields.len()));
    };

    validate_action_name(action)?;
    validate_input_code(code)?;
    let digit = validate_modifier(modifier)?;

    let input_code = ScanCode::parse_field(code)?;
    let modifier = Modifier::from_digit(digit)
        .ok_or_else(|| ValidationError::InvalidModifier(modifier.to_string()))?;

    Ok(Binding {
        action: action.to_string(),
        input_code,
        modifier,
        description: description.join(" "),
    })
}
