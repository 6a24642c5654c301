// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Naming and formatting helpers
//!
//! Raw EXPRESS tokens carry structural punctuation (`(IfcRoot);`,
//! `,IfcWall`). These helpers turn them into registry keys and property
//! names. All of them are pure.

use crate::PrimitiveKind;

/// Suffix appended to list-valued property names
pub const LIST_SUFFIX: &str = "_List";

fn is_structural(ch: char) -> bool {
    matches!(ch, '(' | ')' | ';' | ',')
}

/// Strip `(`, `)`, `;` and `,`
pub fn filter_extras(token: &str) -> String {
    token.chars().filter(|&ch| !is_structural(ch)).collect()
}

/// Strip structural punctuation and ASCII digits
///
/// Turns parameterized built-ins such as `STRING(255);` into `STRING`.
pub fn filter_primitive_extras(token: &str) -> String {
    token
        .chars()
        .filter(|&ch| !is_structural(ch) && !ch.is_ascii_digit())
        .collect()
}

/// Canonical registry key: punctuation stripped, upper-cased
///
/// Idempotent, and case variants of one name share a key.
pub fn format_class_name(raw: &str) -> String {
    filter_extras(raw).to_uppercase()
}

/// Property name, with a list marker when `is_list` is set
pub fn format_property(name: &str, is_list: bool) -> String {
    if is_list {
        format!("{name}{LIST_SUFFIX}")
    } else {
        name.to_string()
    }
}

/// Globally unique property name: `originalName_EntityName`
pub fn qualified_property(name: &str, entity: &str) -> String {
    format!("{name}_{entity}")
}

/// True when no letter in `s` is lower-case
pub fn is_all_upper(s: &str) -> bool {
    !s.chars().any(|ch| ch.is_lowercase())
}

/// Built-in named by a raw token, ignoring punctuation and width parameters
pub fn primitive_kind(token: &str) -> Option<PrimitiveKind> {
    filter_primitive_extras(token).parse().ok()
}
