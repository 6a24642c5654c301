// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lookup helpers over a resolved schema

use crate::names::format_class_name;
use crate::{
    Attribute, AttributeId, Entity, EntityId, Inverse, InverseId, Property, Result,
    SchemaError, SchemaModel, TypeDecl,
};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// One row of an entity property listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRow {
    /// Entity display name
    pub entity: String,
    /// Attribute name as declared
    pub original_name: String,
    /// Final attribute name
    pub name: String,
    /// `SET`, `ARRAY`, `LISTOFLIST`, `LIST` or `ENTITY`
    pub collection: &'static str,
}

/// Extension methods for SchemaModel
///
/// Name lookups are case-insensitive, matching how the registries are keyed.
pub trait SchemaModelExt: SchemaModel {
    /// Entity by name
    fn entity_named(&self, name: &str) -> Option<&Entity> {
        self.entities().get(&format_class_name(name))
    }

    /// Type by name
    fn type_named(&self, name: &str) -> Option<&TypeDecl> {
        self.types().get(&format_class_name(name))
    }

    /// Id of an entity by name
    fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.entities()
            .get_index_of(&format_class_name(name))
            .map(EntityId::from)
    }

    fn entity_at(&self, id: EntityId) -> Option<&Entity> {
        self.entities().get_index(id.index()).map(|(_, e)| e)
    }

    fn attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.entity_at(id.entity)?.attributes.get(id.slot as usize)
    }

    fn inverse(&self, id: InverseId) -> Option<&Inverse> {
        self.entity_at(id.entity)?.inverses.get(id.slot as usize)
    }

    /// Inherited and own attributes, ancestors first
    fn derived_attributes(&self, entity: &Entity) -> Vec<&Attribute> {
        entity
            .derived_attributes
            .iter()
            .filter_map(|id| self.attribute(*id))
            .collect()
    }

    /// Inherited and own inverses, ancestors first
    fn derived_inverses(&self, entity: &Entity) -> Vec<&Inverse> {
        entity
            .derived_inverses
            .iter()
            .filter_map(|id| self.inverse(*id))
            .collect()
    }

    /// Supertype chain, nearest first
    ///
    /// Stops at the first undeclared supertype or when the chain loops.
    fn ancestors(&self, entity: &Entity) -> Vec<&Entity> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(entity.key.as_str());

        let mut current = entity;
        while let Some(parent) = current
            .superclass
            .as_deref()
            .and_then(|name| self.entity_named(name))
        {
            if !seen.insert(parent.key.as_str()) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Derived attributes of every entity, one row each
    ///
    /// Inherited attributes repeat under every subtype.
    fn property_rows(&self) -> Vec<PropertyRow> {
        self.entities()
            .values()
            .flat_map(|entity| {
                self.derived_attributes(entity)
                    .into_iter()
                    .map(move |attr| PropertyRow {
                        entity: entity.name.clone(),
                        original_name: attr.original_name.clone(),
                        name: attr.name.clone(),
                        collection: attr.collection.label(),
                    })
            })
            .collect()
    }

    /// Paired inverse of a property, if it is still indexed
    fn paired_inverse(&self, property: &Property) -> Option<&Property> {
        let id = property.inverse?;
        let properties = self.properties();
        if properties.is_indexed(id) {
            properties.by_id(id)
        } else {
            None
        }
    }

    /// Get entity or return error
    fn entity_or_err(&self, name: &str) -> Result<&Entity> {
        self.entity_named(name)
            .ok_or_else(|| SchemaError::EntityNotFound(name.to_string()))
    }

    /// Get type or return error
    fn type_or_err(&self, name: &str) -> Result<&TypeDecl> {
        self.type_named(name)
            .ok_or_else(|| SchemaError::TypeNotFound(name.to_string()))
    }

    /// Get property or return error
    fn property_or_err(&self, name: &str) -> Result<&Property> {
        self.properties()
            .get(name)
            .ok_or_else(|| SchemaError::PropertyNotFound(name.to_string()))
    }
}

// Blanket implementation for all SchemaModel types
impl<T: SchemaModel + ?Sized> SchemaModelExt for T {}
