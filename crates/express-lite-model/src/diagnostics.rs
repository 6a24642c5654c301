// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recoverable structural diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a recoverable schema problem
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// `SUBTYPE OF` names an entity that is never declared
    UnresolvedSuperclass,
    /// More than one supertype listed; only the first is kept
    MultipleSupertypes,
    /// Supertype chain loops back on itself
    InheritanceCycle,
    /// Inverse `FOR` target has no matching property
    UnresolvedInverse,
    /// Two inverses claim the same forward property
    InverseConflict,
    /// Select member is not a type, entity or built-in
    UnresolvedSelectMember,
    /// Entity name registered in two ONEOF groups
    DuplicateSibling,
    /// `LIST OF LIST OF LIST` attribute
    NestedListUnsupported,
    /// `UNIQUE` rule naming several attributes
    MultiNameUnique,
    /// Bracketed cardinality that does not parse
    MalformedCardinality,
    /// Two properties renamed to the same final name
    DuplicateProperty,
}

/// A single recoverable problem found while building the model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}
