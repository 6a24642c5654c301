// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unified property view over attributes and inverses

use crate::{
    name_map, Cardinality, CollectionKind, EntityId, NameMap, PropertyId, PropertyKind,
    RangeNamespace,
};
use serde::{Deserialize, Serialize};

/// A uniquely named property, ready for ontology serialization
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Final, schema-wide unique name
    pub name: String,
    /// Name as declared on the entity
    pub original_name: String,
    pub domain: EntityId,
    pub range: String,
    pub range_ns: RangeNamespace,
    pub collection: CollectionKind,
    pub cardinality: Cardinality,
    pub nested_cardinality: Cardinality,
    pub optional: bool,
    pub kind: PropertyKind,
    /// Members of the range select, when `kind` is `Select`
    pub select_members: Vec<String>,
    /// Paired inverse property
    pub inverse: Option<PropertyId>,
}

impl Property {
    /// Create a scalar datatype property
    pub fn new(name: impl Into<String>, domain: EntityId, range: impl Into<String>) -> Self {
        let name = name.into();
        let range = range.into();
        Self {
            original_name: name.clone(),
            name,
            domain,
            range_ns: RangeNamespace::for_range(&range),
            range,
            collection: CollectionKind::Scalar,
            cardinality: Cardinality::default(),
            nested_cardinality: Cardinality::default(),
            optional: false,
            kind: PropertyKind::Datatype,
            select_members: Vec::new(),
            inverse: None,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.collection.is_collection()
    }
}

/// Property arena plus the name index handed to serializers
///
/// Every property ever created stays in the arena so that ids held by
/// inverses and inverse links stay valid; removal only drops the name
/// from the index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyRegistry {
    arena: Vec<Property>,
    by_name: NameMap<PropertyId>,
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self {
            arena: Vec::new(),
            by_name: name_map(),
        }
    }
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property and index it under its name
    ///
    /// Returns the new id and the id previously indexed under that name,
    /// if any.
    pub fn insert(&mut self, property: Property) -> (PropertyId, Option<PropertyId>) {
        let id = PropertyId(self.arena.len() as u32);
        let name = property.name.clone();
        self.arena.push(property);
        let previous = self.by_name.insert(name, id);
        (id, previous)
    }

    /// Drop a name from the index, keeping declaration order of the rest
    pub fn remove(&mut self, name: &str) -> Option<PropertyId> {
        self.by_name.shift_remove(name)
    }

    /// Indexed property by name
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.id_of(name).and_then(|id| self.by_id(id))
    }

    pub fn id_of(&self, name: &str) -> Option<PropertyId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Arena lookup, including properties removed from the index
    pub fn by_id(&self, id: PropertyId) -> Option<&Property> {
        self.arena.get(id.index())
    }

    pub fn by_id_mut(&mut self, id: PropertyId) -> Option<&mut Property> {
        self.arena.get_mut(id.index())
    }

    /// Whether `id` is still reachable by name
    pub fn is_indexed(&self, id: PropertyId) -> bool {
        self.by_id(id)
            .is_some_and(|p| self.by_name.get(&p.name) == Some(&id))
    }

    /// Pair two properties as mutual inverses
    pub fn link(&mut self, a: PropertyId, b: PropertyId) {
        if let Some(p) = self.by_id_mut(a) {
            p.inverse = Some(b);
        }
        if let Some(p) = self.by_id_mut(b) {
            p.inverse = Some(a);
        }
    }

    /// Clear the inverse link of one property
    pub fn unlink(&mut self, id: PropertyId) {
        if let Some(p) = self.by_id_mut(id) {
            p.inverse = None;
        }
    }

    /// Paired inverse of an indexed property
    pub fn inverse_of(&self, name: &str) -> Option<&Property> {
        self.get(name)?.inverse.and_then(|id| self.by_id(id))
    }

    /// Indexed properties in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.by_name.values().filter_map(|id| self.arena.get(id.index()))
    }

    /// Indexed names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
