// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core traits for EXPRESS schema loading
//!
//! These traits define the main abstractions for working with a resolved
//! schema, independent of the parser backend that produced it.

use crate::{
    Diagnostic, Entity, NameMap, NamedIndividual, PrimitiveKind, PropertyRegistry, Result,
    SiblingIndex, TypeDecl,
};
use std::sync::Arc;

/// Progress callback type for parsing operations
pub type ProgressCallback = Box<dyn Fn(&str, f32) + Send>;

/// Main parsing interface - entry point for loading EXPRESS schemas
///
/// # Example
///
/// ```ignore
/// use express_lite_model::{SchemaParser, SchemaModel};
///
/// let parser: Box<dyn SchemaParser> = get_parser();
/// let model = parser.parse(express_text)?;
/// println!("Entities: {}", model.entities().len());
/// ```
pub trait SchemaParser: Send + Sync {
    /// Parse EXPRESS text and return the resolved model
    ///
    /// Structural problems in the schema never fail the parse; they are
    /// reported through [`SchemaModel::diagnostics`].
    fn parse(&self, content: &str) -> Result<Arc<dyn SchemaModel>>;

    /// Parse EXPRESS text with progress reporting
    ///
    /// # Arguments
    /// * `content` - The schema text
    /// * `on_progress` - Callback receiving (phase_name, percent_complete)
    fn parse_with_progress(
        &self,
        content: &str,
        on_progress: ProgressCallback,
    ) -> Result<Arc<dyn SchemaModel>>;
}

/// Read-only access to a resolved schema
///
/// All name-keyed collections iterate in declaration order, so two loads
/// of the same text observe identical sequences.
pub trait SchemaModel: Send + Sync {
    /// Name given by `SCHEMA <name>;`, if the text declares one
    fn schema_name(&self) -> Option<&str>;

    /// Entities keyed by canonical name
    fn entities(&self) -> &NameMap<Entity>;

    /// Types keyed by canonical name
    fn types(&self) -> &NameMap<TypeDecl>;

    /// ONEOF groups, indexed by member
    fn siblings(&self) -> &SiblingIndex;

    /// Enumeration values, in declaration order
    fn named_individuals(&self) -> &[NamedIndividual];

    /// Uniquely named properties of every entity
    fn properties(&self) -> &PropertyRegistry;

    /// Canonical names of the select types listing a built-in as a member
    fn primitive_selects(&self, kind: PrimitiveKind) -> &[String];

    /// Recoverable problems found while building the model
    fn diagnostics(&self) -> &[Diagnostic];
}
