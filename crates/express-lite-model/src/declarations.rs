// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EXPRESS declarations: entities, types, attributes and inverses

use crate::names::format_class_name;
use crate::{
    name_map, AttributeId, Cardinality, CollectionKind, EntityId, InverseId, NameMap,
    PrimaryType, PrimitiveKind, PropertyId, RangeNamespace, SiblingSetId,
};
use serde::{Deserialize, Serialize};

/// An EXPRESS `ENTITY`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Canonical (upper-case) registry key
    pub key: String,
    /// Name as declared
    pub name: String,
    /// Direct supertype, punctuation stripped
    pub superclass: Option<String>,
    pub is_abstract: bool,
    /// `SUPERTYPE OF (ONEOF ...)` group of this entity's subtypes
    pub subclasses: Option<SiblingSetId>,
    /// Declared attributes, in declaration order
    pub attributes: Vec<Attribute>,
    /// Declared inverses, in declaration order
    pub inverses: Vec<Inverse>,
    /// Inherited and own attributes, ancestors first
    pub derived_attributes: Vec<AttributeId>,
    /// Inherited and own inverses, ancestors first
    pub derived_inverses: Vec<InverseId>,
    /// Canonical names of the select types naming this entity
    pub parent_selects: Vec<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: format_class_name(&name),
            name,
            superclass: None,
            is_abstract: false,
            subclasses: None,
            attributes: Vec::new(),
            inverses: Vec::new(),
            derived_attributes: Vec::new(),
            derived_inverses: Vec::new(),
            parent_selects: Vec::new(),
        }
    }

    /// Declared attribute by current (possibly renamed) name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn inverse(&self, name: &str) -> Option<&Inverse> {
        self.inverses.iter().find(|i| i.name == name)
    }
}

/// An EXPRESS `TYPE`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Canonical (upper-case) registry key
    pub key: String,
    /// Name as declared
    pub name: String,
    pub primary: PrimaryType,
    /// Canonical enumeration values
    pub enum_values: Vec<String>,
    /// Select members as written, punctuation stripped
    pub select_members: Vec<String>,
    /// Canonical names of the select types naming this type
    pub parent_selects: Vec<String>,
}

impl TypeDecl {
    /// New type; the primary type is settled once the `=` side is read
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: format_class_name(&name),
            primary: PrimaryType::Named(name.clone()),
            name,
            enum_values: Vec::new(),
            select_members: Vec::new(),
            parent_selects: Vec::new(),
        }
    }

    pub fn is_select(&self) -> bool {
        self.primary.is_select()
    }

    pub fn is_enumeration(&self) -> bool {
        self.primary.is_enumeration()
    }
}

/// Attribute declared on an entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Final name; `originalName_EntityName` once the structure is built
    pub name: String,
    pub original_name: String,
    /// Owning entity
    pub domain: EntityId,
    /// Range as written (built-ins in canonical form)
    pub range: String,
    /// Canonical key of `range`
    pub range_key: String,
    /// Set when the range is an EXPRESS built-in
    pub primitive: Option<PrimitiveKind>,
    pub collection: CollectionKind,
    pub cardinality: Cardinality,
    /// Inner bounds of a `LIST OF LIST`
    pub nested_cardinality: Cardinality,
    pub optional: bool,
    pub unique: bool,
    /// Targeted by a single-valued inverse while being single-valued itself
    pub one_to_one: bool,
    /// Targeted by some inverse
    pub reverse_pointer: bool,
    /// Inverse that resolved to this attribute
    pub inverted_by: Option<InverseId>,
    /// Filled in when properties are materialized
    pub range_ns: Option<RangeNamespace>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, domain: EntityId, range: impl Into<String>) -> Self {
        let name = name.into();
        let range = range.into();
        Self {
            original_name: name.clone(),
            name,
            domain,
            range_key: format_class_name(&range),
            range,
            primitive: None,
            collection: CollectionKind::Scalar,
            cardinality: Cardinality::default(),
            nested_cardinality: Cardinality::default(),
            optional: false,
            unique: false,
            one_to_one: false,
            reverse_pointer: false,
            inverted_by: None,
            range_ns: None,
        }
    }
}

/// `INVERSE` declaration on an entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inverse {
    pub name: String,
    /// Owning entity
    pub domain: EntityId,
    /// Entity the inverse ranges over
    pub class_range: String,
    /// Forward attribute this inverts
    pub inverse_of: String,
    pub is_set: bool,
    pub cardinality: Cardinality,
    /// Copied from the forward attribute
    pub unique: bool,
    /// Property generated for this inverse
    pub property: Option<PropertyId>,
}

impl Inverse {
    pub fn new(
        name: impl Into<String>,
        domain: EntityId,
        class_range: impl Into<String>,
        inverse_of: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            domain,
            class_range: class_range.into(),
            inverse_of: inverse_of.into(),
            is_set: false,
            cardinality: Cardinality::default(),
            unique: false,
            property: None,
        }
    }
}

/// Enumeration value exposed as an ontology individual
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedIndividual {
    /// Enumeration type name as declared
    pub type_name: String,
    pub value: String,
    pub label: String,
}

impl NamedIndividual {
    pub fn new(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            type_name: type_name.into(),
            label: value.clone(),
            value,
        }
    }
}

/// Entity names declared mutually exclusive by one `ONEOF`
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiblingSet {
    pub members: Vec<String>,
}

impl SiblingSet {
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// All ONEOF groups of a schema, indexed by member
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiblingIndex {
    sets: Vec<SiblingSet>,
    by_member: NameMap<SiblingSetId>,
}

impl Default for SiblingIndex {
    fn default() -> Self {
        Self {
            sets: Vec::new(),
            by_member: name_map(),
        }
    }
}

impl SiblingIndex {
    /// Open a new, empty group
    pub fn open_set(&mut self) -> SiblingSetId {
        self.sets.push(SiblingSet::default());
        SiblingSetId((self.sets.len() - 1) as u32)
    }

    /// Add a member to a group
    ///
    /// The member always joins `set`; the index keeps its first group.
    /// Returns false when the member was already indexed under a group.
    pub fn add_member(&mut self, set: SiblingSetId, member: &str) -> bool {
        if let Some(group) = self.sets.get_mut(set.index()) {
            if !group.contains(member) {
                group.members.push(member.to_string());
            }
        }
        let key = format_class_name(member);
        if self.by_member.contains_key(&key) {
            return false;
        }
        self.by_member.insert(key, set);
        true
    }

    /// Group a member belongs to (case-insensitive)
    pub fn get(&self, member: &str) -> Option<&SiblingSet> {
        let id = self.by_member.get(&format_class_name(member))?;
        self.sets.get(id.index())
    }

    pub fn set(&self, id: SiblingSetId) -> Option<&SiblingSet> {
        self.sets.get(id.index())
    }

    /// `(canonical member, group)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SiblingSet)> {
        self.by_member
            .iter()
            .filter_map(|(key, id)| Some((key.as_str(), self.sets.get(id.index())?)))
    }

    /// Number of indexed members
    pub fn len(&self) -> usize {
        self.by_member.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_member.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key_is_canonical() {
        let entity = Entity::new("IfcWall");
        assert_eq!(entity.key, "IFCWALL");
        assert_eq!(entity.name, "IfcWall");
    }

    #[test]
    fn test_sibling_index_flags_duplicates() {
        let mut index = SiblingIndex::default();
        let first = index.open_set();
        assert!(index.add_member(first, "IfcA"));
        assert!(index.add_member(first, "IfcB"));

        let second = index.open_set();
        assert!(!index.add_member(second, "IfcA"));

        // index keeps the first registration, the second group still lists it
        assert_eq!(index.get("ifca").map(|s| s.len()), Some(2));
        assert!(index.set(second).is_some_and(|s| s.contains("IfcA")));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_named_individual_label_is_value() {
        let ni = NamedIndividual::new("IfcDoorTypeEnum", "DOOR");
        assert_eq!(ni.label, "DOOR");
        assert_eq!(ni.value, "DOOR");
    }
}
