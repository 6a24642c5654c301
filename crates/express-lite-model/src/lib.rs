// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EXPRESS-Lite Model - Trait definitions and shared types for EXPRESS schemas
//!
//! This crate provides the data model produced by loading an EXPRESS
//! (ISO 10303-11) schema such as the IFC schemas: entities, types, their
//! attributes and inverses, and a flat registry of uniquely named
//! properties ready for ontology serialization. Parser backends implement
//! [`SchemaParser`]; consumers work against [`SchemaModel`].
//!
//! # Architecture
//!
//! - [`SchemaParser`] - Entry point for loading schema text
//! - [`SchemaModel`] - Read-only access to a resolved schema
//! - [`SchemaModelExt`] - Name lookups, inheritance and listings
//! - [`PrimitiveRegistry`] - Process-wide catalogue of EXPRESS built-ins
//!
//! # Example
//!
//! ```ignore
//! use express_lite_model::{SchemaModel, SchemaModelExt, SchemaParser};
//!
//! let model = parser.parse(express_text)?;
//! let wall = model.entity_or_err("IfcWall")?;
//! for attr in model.derived_attributes(wall) {
//!     println!("{} -> {}", attr.name, attr.range);
//! }
//! ```

pub mod declarations;
pub mod diagnostics;
pub mod error;
pub mod names;
pub mod primitives;
pub mod properties;
pub mod resolver;
pub mod traits;
pub mod types;

// Re-export all public types
pub use declarations::*;
pub use diagnostics::*;
pub use error::*;
pub use primitives::*;
pub use properties::*;
pub use resolver::*;
pub use traits::*;
pub use types::*;
