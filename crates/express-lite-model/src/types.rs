// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for EXPRESS schema representation
//!
//! This module defines the identifiers and classifiers shared by the
//! declaration, property and parser layers.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name-keyed registry map that iterates in insertion (declaration) order
pub type NameMap<V> = IndexMap<String, V, FxBuildHasher>;

/// Create an empty [`NameMap`]
pub fn name_map<V>() -> NameMap<V> {
    NameMap::with_hasher(FxBuildHasher)
}

// ============================================================================
// Identifiers
// ============================================================================

/// Position of an entity in the entity registry
///
/// Entities are never removed, so an id stays valid for the lifetime of the
/// model it was issued by.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Registry index
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

impl From<usize> for EntityId {
    fn from(index: usize) -> Self {
        EntityId(index as u32)
    }
}

/// Declared attribute: owning entity plus slot in its attribute list
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct AttributeId {
    pub entity: EntityId,
    pub slot: u32,
}

impl AttributeId {
    pub fn new(entity: EntityId, slot: usize) -> Self {
        Self {
            entity,
            slot: slot as u32,
        }
    }
}

/// Declared inverse: owning entity plus slot in its inverse list
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct InverseId {
    pub entity: EntityId,
    pub slot: u32,
}

impl InverseId {
    pub fn new(entity: EntityId, slot: usize) -> Self {
        Self {
            entity,
            slot: slot as u32,
        }
    }
}

/// Slot in the property arena
///
/// Removing a property from the registry never invalidates its id; the
/// arena keeps every property ever created.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct PropertyId(pub u32);

impl PropertyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Slot in the sibling-set arena
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SiblingSetId(pub u32);

impl SiblingSetId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// Primitive kinds
// ============================================================================

/// EXPRESS built-in simple types
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimitiveKind {
    Number,
    Real,
    Integer,
    Logical,
    Boolean,
    String,
    Binary,
}

impl PrimitiveKind {
    /// All built-ins in the order EXPRESS lists them
    pub const ALL: [PrimitiveKind; 7] = [
        PrimitiveKind::Number,
        PrimitiveKind::Real,
        PrimitiveKind::Integer,
        PrimitiveKind::Logical,
        PrimitiveKind::Boolean,
        PrimitiveKind::String,
        PrimitiveKind::Binary,
    ];

    /// Keyword as written in EXPRESS
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Number => "NUMBER",
            PrimitiveKind::Real => "REAL",
            PrimitiveKind::Integer => "INTEGER",
            PrimitiveKind::Logical => "LOGICAL",
            PrimitiveKind::Boolean => "BOOLEAN",
            PrimitiveKind::String => "STRING",
            PrimitiveKind::Binary => "BINARY",
        }
    }
}

/// Error returned when a name is not one of the seven built-ins
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotPrimitive(pub String);

impl fmt::Display for NotPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not an EXPRESS built-in type", self.0)
    }
}

impl std::error::Error for NotPrimitive {}

impl FromStr for PrimitiveKind {
    type Err = NotPrimitive;

    /// Case-insensitive match against the built-in keywords
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| NotPrimitive(s.to_string()))
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Classifiers
// ============================================================================

/// Right-hand side classification of a `TYPE` declaration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimaryType {
    /// Alias of a built-in, e.g. `TYPE IfcLabel = STRING;`
    Primitive(PrimitiveKind),
    /// Alias of another named type or an unknown upper-case keyword
    Named(String),
    /// `ENUMERATION OF (...)`
    Enumeration,
    /// `SELECT (...)`
    Select,
    /// Collection specification such as `LIST [1:?] OF IfcLengthMeasure`
    Collection(String),
    /// Reference to an entity class
    Class,
}

impl PrimaryType {
    pub fn is_class(&self) -> bool {
        matches!(self, PrimaryType::Class)
    }

    pub fn is_select(&self) -> bool {
        matches!(self, PrimaryType::Select)
    }

    pub fn is_enumeration(&self) -> bool {
        matches!(self, PrimaryType::Enumeration)
    }

    /// Property classification for attributes ranging over this type
    ///
    /// Anything that is not an enumeration, select or class is a datatype.
    pub fn property_kind(&self) -> PropertyKind {
        match self {
            PrimaryType::Enumeration => PropertyKind::Enumeration,
            PrimaryType::Select => PropertyKind::Select,
            PrimaryType::Class => PropertyKind::Entity,
            PrimaryType::Primitive(_) | PrimaryType::Named(_) | PrimaryType::Collection(_) => {
                PropertyKind::Datatype
            }
        }
    }

    /// Textual label, as a serializer would print it
    pub fn label(&self) -> &str {
        match self {
            PrimaryType::Primitive(kind) => kind.as_str(),
            PrimaryType::Named(name) => name,
            PrimaryType::Enumeration => "ENUMERATION",
            PrimaryType::Select => "SELECT",
            PrimaryType::Collection(spec) => spec,
            PrimaryType::Class => "CLASS",
        }
    }
}

impl fmt::Display for PrimaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregation shape of an attribute or property
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub enum CollectionKind {
    #[default]
    Scalar,
    Array,
    Set,
    List,
    /// `LIST OF LIST OF ...`
    ListOfList,
}

impl CollectionKind {
    pub fn is_collection(self) -> bool {
        !matches!(self, CollectionKind::Scalar)
    }

    /// Label used in entity property listings
    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::Scalar => "ENTITY",
            CollectionKind::Array => "ARRAY",
            CollectionKind::Set => "SET",
            CollectionKind::List => "LIST",
            CollectionKind::ListOfList => "LISTOFLIST",
        }
    }
}

/// Bounds of an aggregate, `[min:max]`
///
/// `max == None` means unbounded (`?`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct Cardinality {
    pub min: u32,
    pub max: Option<u32>,
}

impl Cardinality {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Apply parsed bounds; a `?` side (None) keeps the current value
    pub fn apply(&mut self, min: Option<u32>, max: Option<u32>) {
        if let Some(min) = min {
            self.min = min;
        }
        if let Some(max) = max {
            self.max = Some(max);
        }
    }

    pub fn is_single(&self) -> bool {
        self.max == Some(1)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}:{}]", self.min, max),
            None => write!(f, "[{}:?]", self.min),
        }
    }
}

/// Namespace a property range lives in
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum RangeNamespace {
    /// EXPRESS built-ins
    Express,
    /// Types and entities declared by the schema itself
    Schema,
}

impl RangeNamespace {
    /// Namespace for a range name: built-ins live in the EXPRESS namespace
    pub fn for_range(range: &str) -> Self {
        if range.parse::<PrimitiveKind>().is_ok() {
            RangeNamespace::Express
        } else {
            RangeNamespace::Schema
        }
    }
}

/// Classification of a unified property
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub enum PropertyKind {
    #[default]
    Datatype,
    Enumeration,
    Select,
    Entity,
}
