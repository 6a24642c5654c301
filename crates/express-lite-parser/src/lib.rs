// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Express-Lite Parser - EXPRESS schema reader
//!
//! This crate reads ISO-10303-11 EXPRESS schemas (such as the IFC schema)
//! and builds a resolved model implementing the traits defined in
//! `express-lite-model`.
//!
//! # Features
//!
//! - **Fast tokenization** using `nom` combinators
//! - **memchr-accelerated comment stripping**
//! - **Token-driven state machine** covering TYPE, ENTITY, INVERSE, UNIQUE,
//!   WHERE, DERIVE, FUNCTION and RULE blocks
//! - **Structure passes**: inheritance flattening, inverse pairing, unique
//!   property renaming and select membership
//! - **Diagnostics instead of failures** for unresolved references
//! - **Progress reporting** for large schemas
//!
//! # Example
//!
//! ```ignore
//! use express_lite_parser::ExpressParser;
//! use express_lite_model::{SchemaModelExt, SchemaParser};
//!
//! let parser = ExpressParser::new();
//! let model = parser.parse(express_text)?;
//!
//! let wall = model.entity_named("IfcWall").unwrap();
//! for attr in model.derived_attributes(wall) {
//!     println!("{} ({})", attr.name, attr.original_name);
//! }
//! ```

mod machine;
mod model;
mod registry;
mod scanner;
mod structure;
mod tokenizer;

pub use machine::{Machine, State};
pub use model::ParsedSchema;
pub use registry::{ClassNameCache, PrimitiveSelects, SchemaRegistry};
pub use scanner::{CommentStripper, SchemaScanner};
pub use structure::StructureBuilder;
pub use tokenizer::{parse_bounds, tokens, Tokens};

use express_lite_model::{ProgressCallback, Result, SchemaModel, SchemaParser};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// Main EXPRESS parser implementing the `SchemaParser` trait
///
/// Creates a `ParsedSchema` that exposes the resolved declarations
/// through the trait interfaces.
#[derive(Clone, Copy, Debug)]
pub struct ExpressParser {
    /// Whether to run the structure passes after reading declarations
    pub build_structure: bool,
    /// Whether to remove `(* *)` and `--` comments before tokenizing
    pub strip_comments: bool,
}

impl Default for ExpressParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressParser {
    /// Create a new parser with default settings
    pub fn new() -> Self {
        Self {
            build_structure: true,
            strip_comments: true,
        }
    }

    /// Parser that only reads declarations, skipping the structure passes
    pub fn declarations_only() -> Self {
        Self {
            build_structure: false,
            strip_comments: true,
        }
    }

    /// Set whether to run the structure passes
    pub fn with_structure(mut self, enabled: bool) -> Self {
        self.build_structure = enabled;
        self
    }

    /// Set whether to strip comments
    pub fn with_comments_stripped(mut self, enabled: bool) -> Self {
        self.strip_comments = enabled;
        self
    }

    /// Parse a schema file from disk
    ///
    /// Fails when the file cannot be opened or read.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Arc<dyn SchemaModel>> {
        let path = path.as_ref();
        log::debug!("reading schema {}", path.display());
        let file = File::open(path)?;
        ParsedSchema::from_reader(BufReader::new(file), self.build_structure, self.strip_comments)
            .map(|m| Arc::new(m) as Arc<dyn SchemaModel>)
    }
}

impl SchemaParser for ExpressParser {
    fn parse(&self, content: &str) -> Result<Arc<dyn SchemaModel>> {
        ParsedSchema::parse(content, self.build_structure, self.strip_comments)
            .map(|m| Arc::new(m) as Arc<dyn SchemaModel>)
    }

    fn parse_with_progress(
        &self,
        content: &str,
        on_progress: ProgressCallback,
    ) -> Result<Arc<dyn SchemaModel>> {
        ParsedSchema::parse_with_progress(
            content,
            self.build_structure,
            self.strip_comments,
            on_progress,
        )
        .map(|m| Arc::new(m) as Arc<dyn SchemaModel>)
    }
}

/// Quick parse function for simple use cases
pub fn parse(content: &str) -> Result<Arc<dyn SchemaModel>> {
    ExpressParser::new().parse(content)
}

/// Parse with progress reporting
pub fn parse_with_progress(
    content: &str,
    on_progress: impl Fn(&str, f32) + Send + 'static,
) -> Result<Arc<dyn SchemaModel>> {
    ExpressParser::new().parse_with_progress(content, Box::new(on_progress))
}

/// Parse a schema file with default settings
pub fn parse_file(path: impl AsRef<Path>) -> Result<Arc<dyn SchemaModel>> {
    ExpressParser::new().parse_file(path)
}
