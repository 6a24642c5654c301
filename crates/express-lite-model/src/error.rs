// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for EXPRESS schema loading

use thiserror::Error;

/// Result type alias for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors that can occur while loading or querying a schema
///
/// Structural problems inside a schema are never errors; they are recorded
/// as [`Diagnostic`](crate::Diagnostic)s and the model is still built.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema stream could not be opened or read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The schema stream is not usable text
    #[error("Invalid schema input: {0}")]
    InvalidFormat(String),

    /// Entity not found
    #[error("Entity {0} not found")]
    EntityNotFound(String),

    /// Type not found
    #[error("Type {0} not found")]
    TypeNotFound(String),

    /// Property not found
    #[error("Property {0} not found")]
    PropertyNotFound(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl SchemaError {
    /// Create a new format error
    pub fn format(msg: impl Into<String>) -> Self {
        SchemaError::InvalidFormat(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        SchemaError::Other(msg.into())
    }
}
