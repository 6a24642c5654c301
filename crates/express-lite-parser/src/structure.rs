// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Post-parse structure passes
//!
//! Runs after every declaration has been read, in a fixed order:
//!
//! 1. derived attribute lists (ancestors first) and the `entity#attribute` index
//! 2. derived inverse lists, marking the forward attributes they target
//! 3. named individuals for enumeration values
//! 4. renaming to `name_EntityName` and one property per inverse
//! 5. one property per attribute, classified by its range type
//! 6. inverse pairing and pruning
//! 7. select membership back-references
//!
//! Nothing here fails; every unresolved reference becomes a diagnostic.

use crate::registry::SchemaRegistry;
use express_lite_model::names::{primitive_kind, qualified_property};
use express_lite_model::{
    AttributeId, CollectionKind, DiagnosticKind, EntityId, InverseId, NamedIndividual,
    PrimaryType, PrimitiveKind, PrimitiveRegistry, Property, PropertyId, PropertyKind,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// Where a select member resolved to
enum SelectMember {
    Type,
    Entity,
    Primitive(PrimitiveKind),
    Unresolved,
}

/// Runs the structure passes over one schema registry
pub struct StructureBuilder<'r> {
    reg: &'r mut SchemaRegistry,
    /// `CANONICAL_ENTITY#attributeName` for own and inherited attributes
    attribute_index: FxHashMap<String, AttributeId>,
    /// Supertype chain per entity, root first, entity last
    chains: Vec<Vec<usize>>,
}

impl<'r> StructureBuilder<'r> {
    pub fn new(reg: &'r mut SchemaRegistry) -> Self {
        Self {
            reg,
            attribute_index: FxHashMap::default(),
            chains: Vec::new(),
        }
    }

    /// Run all passes, reporting progress between `start` and `end` percent
    pub fn build(mut self, on_progress: &dyn Fn(&str, f32), start: f32, end: f32) {
        let step = (end - start) / 7.0;
        let report = |phase: &str, done: u8| on_progress(phase, start + step * f32::from(done));

        report("Flattening attributes", 0);
        self.derive_attributes();
        report("Flattening inverses", 1);
        self.derive_inverses();
        report("Creating named individuals", 2);
        self.named_individuals();
        report("Renaming properties", 3);
        self.rename();
        report("Materializing properties", 4);
        self.attribute_properties();
        report("Resolving inverses", 5);
        self.resolve_inverses();
        report("Interpreting selects", 6);
        self.interpret_selects();
    }

    // ------------------------------------------------------------------
    // Passes 1-2: inheritance
    // ------------------------------------------------------------------

    /// Supertype chain of `index`, root first
    fn chain(&mut self, index: usize) -> Vec<usize> {
        let mut chain = vec![index];
        let mut current = index;

        while let Some(parent) = self.reg.entities[current].superclass.clone() {
            let key = self.reg.canonical(&parent);
            match self.reg.entities.get_index_of(&key) {
                Some(next) if chain.contains(&next) => {
                    if next == index {
                        let name = self.reg.entities[index].name.clone();
                        self.reg.diagnose(
                            DiagnosticKind::InheritanceCycle,
                            format!("supertype chain of {name} loops back to itself"),
                        );
                    }
                    break;
                }
                Some(next) => {
                    chain.push(next);
                    current = next;
                }
                None => {
                    if current == index {
                        let name = self.reg.entities[index].name.clone();
                        self.reg.diagnose(
                            DiagnosticKind::UnresolvedSuperclass,
                            format!("supertype {parent} of {name} is not declared"),
                        );
                    }
                    break;
                }
            }
        }

        chain.reverse();
        chain
    }

    fn derive_attributes(&mut self) {
        let count = self.reg.entities.len();
        self.chains = (0..count).map(|index| self.chain(index)).collect();

        for index in 0..count {
            let top = self.reg.entities[index].key.clone();
            let mut derived = Vec::new();
            for &member in &self.chains[index] {
                let entity = &self.reg.entities[member];
                for (slot, attr) in entity.attributes.iter().enumerate() {
                    let id = AttributeId::new(EntityId::from(member), slot);
                    self.attribute_index.insert(format!("{top}#{}", attr.name), id);
                    derived.push(id);
                }
            }
            self.reg.entities[index].derived_attributes = derived;
        }

        log::debug!(
            "flattened attributes of {count} entities, {} indexed",
            self.attribute_index.len()
        );
    }

    fn derive_inverses(&mut self) {
        for index in 0..self.chains.len() {
            let chain = self.chains[index].clone();
            let mut derived = Vec::new();
            for member in chain {
                for slot in 0..self.reg.entities[member].inverses.len() {
                    let id = InverseId::new(EntityId::from(member), slot);
                    if member == index {
                        self.mark_forward(id);
                    }
                    derived.push(id);
                }
            }
            self.reg.entities[index].derived_inverses = derived;
        }
    }

    /// Flag the forward attribute an inverse points at
    fn mark_forward(&mut self, id: InverseId) {
        let inverse = &self.reg.entities[id.entity.index()].inverses[id.slot as usize];
        let single = inverse.cardinality.is_single();
        let inverse_of = inverse.inverse_of.clone();
        let class_range = inverse.class_range.clone();
        let key = format!("{}#{inverse_of}", self.reg.canonical(&class_range));

        let unique = match self.attribute_index.get(&key) {
            Some(target) => {
                let attr = &mut self.reg.entities[target.entity.index()].attributes
                    [target.slot as usize];
                if single && !attr.collection.is_collection() {
                    attr.one_to_one = true;
                }
                attr.reverse_pointer = true;
                attr.inverted_by = Some(id);
                attr.unique
            }
            None => {
                log::debug!("no attribute {key} for inverse in {}", id.entity);
                false
            }
        };
        self.reg.entities[id.entity.index()].inverses[id.slot as usize].unique = unique;
    }

    // ------------------------------------------------------------------
    // Passes 3-5: individuals and properties
    // ------------------------------------------------------------------

    fn named_individuals(&mut self) {
        let reg = &mut *self.reg;
        for ty in reg.types.values() {
            for value in &ty.enum_values {
                reg.individuals
                    .push(NamedIndividual::new(ty.name.clone(), value.clone()));
            }
        }
        log::debug!("{} named individuals", reg.individuals.len());
    }

    fn rename(&mut self) {
        let reg = &mut *self.reg;
        let mut duplicates = Vec::new();

        for (index, entity) in reg.entities.values_mut().enumerate() {
            let domain = EntityId::from(index);
            for attr in &mut entity.attributes {
                attr.domain = domain;
                attr.original_name = attr.name.clone();
                attr.name = qualified_property(&attr.original_name, &entity.name);
            }

            for inverse in &mut entity.inverses {
                let name = qualified_property(&inverse.name, &entity.name);
                let mut property = Property::new(name, domain, inverse.class_range.clone());
                property.original_name = inverse.name.clone();
                property.cardinality = inverse.cardinality;
                property.kind = PropertyKind::Entity;
                if inverse.is_set {
                    property.collection = CollectionKind::Set;
                }

                let (id, previous) = reg.properties.insert(property);
                if previous.is_some() {
                    duplicates.push(qualified_property(&inverse.name, &entity.name));
                }
                inverse.property = Some(id);
            }
        }

        for name in duplicates {
            self.reg
                .diagnose(DiagnosticKind::DuplicateProperty, format!("{name} declared twice"));
        }
    }

    fn attribute_properties(&mut self) {
        let reg = &mut *self.reg;
        let mut duplicates = Vec::new();

        for entity in reg.entities.values_mut() {
            for attr in &mut entity.attributes {
                let (range, primary, members) = match attr.primitive {
                    Some(kind) => (kind.as_str().to_string(), PrimaryType::Primitive(kind), None),
                    None => match reg.types.get(&attr.range_key) {
                        Some(ty) => (
                            ty.name.clone(),
                            ty.primary.clone(),
                            Some(&ty.select_members),
                        ),
                        None => (attr.range.clone(), PrimaryType::Class, None),
                    },
                };

                let mut property = Property::new(attr.name.clone(), attr.domain, range);
                property.original_name = attr.original_name.clone();
                property.collection = attr.collection;
                property.cardinality = attr.cardinality;
                property.nested_cardinality = attr.nested_cardinality;
                property.optional = attr.optional;
                property.kind = primary.property_kind();
                if primary.is_select() {
                    property.select_members = members.cloned().unwrap_or_default();
                }
                attr.range_ns = Some(property.range_ns);

                if reg.properties.insert(property).1.is_some() {
                    duplicates.push(attr.name.clone());
                }
            }
        }

        for name in duplicates {
            self.reg
                .diagnose(DiagnosticKind::DuplicateProperty, format!("{name} declared twice"));
        }
        log::debug!("{} properties before inverse pruning", self.reg.properties.len());
    }

    // ------------------------------------------------------------------
    // Pass 6: inverse pairing
    // ------------------------------------------------------------------

    /// Drop a property from the name index
    fn remove_property(&mut self, id: PropertyId) {
        let reg = &mut *self.reg;
        if let Some(name) = reg.properties.by_id(id).map(|p| p.name.clone()) {
            if reg.properties.remove(&name).is_none() {
                log::debug!("property {name} was already removed");
            }
        }
    }

    fn resolve_inverses(&mut self) {
        let pending: Vec<(PropertyId, String, String)> = self
            .reg
            .entities
            .values()
            .flat_map(|entity| entity.inverses.iter())
            .filter_map(|inv| {
                let property = inv.property?;
                Some((property, inv.inverse_of.clone(), inv.class_range.clone()))
            })
            .collect();
        let mut claimed: FxHashSet<PropertyId> = FxHashSet::default();

        for (own, inverse_of, class_range) in pending {
            let properties = &self.reg.properties;
            let target = properties
                .id_of(&inverse_of)
                .or_else(|| properties.id_of(&qualified_property(&inverse_of, &class_range)));

            match target {
                Some(target) if !claimed.contains(&target) => {
                    claimed.insert(target);
                    self.reg.properties.link(own, target);

                    let collection = self
                        .reg
                        .properties
                        .by_id(target)
                        .is_some_and(|p| p.is_collection());
                    if collection {
                        self.remove_property(own);
                        self.reg.properties.unlink(own);
                        self.reg.properties.unlink(target);
                        claimed.remove(&target);
                    }
                }
                Some(target) => {
                    let previous = self.reg.properties.by_id(target).and_then(|p| p.inverse);
                    if let Some(previous) = previous {
                        let names = self
                            .reg
                            .properties
                            .by_id(previous)
                            .map(|p| (p.name.clone(), p.original_name.clone()));
                        if let Some((name, original)) = names {
                            if self.reg.properties.remove(&name).is_none() {
                                self.reg.properties.remove(&original);
                            }
                        }
                        self.reg.properties.unlink(previous);
                    }
                    self.remove_property(own);
                    self.reg.properties.unlink(target);

                    let target_name = self
                        .reg
                        .properties
                        .by_id(target)
                        .map(|p| p.name.clone())
                        .unwrap_or_default();
                    self.reg.diagnose(
                        DiagnosticKind::InverseConflict,
                        format!("{target_name} is claimed by more than one inverse"),
                    );
                }
                None => {
                    self.remove_property(own);
                    let own_name = self
                        .reg
                        .properties
                        .by_id(own)
                        .map(|p| p.name.clone())
                        .unwrap_or_default();
                    self.reg.diagnose(
                        DiagnosticKind::UnresolvedInverse,
                        format!("{own_name} inverts unknown property {inverse_of}"),
                    );
                }
            }
        }

        log::debug!("{} properties after inverse pruning", self.reg.properties.len());
    }

    // ------------------------------------------------------------------
    // Pass 7: selects
    // ------------------------------------------------------------------

    fn classify_member(&mut self, member: &str) -> (String, SelectMember) {
        let key = self.reg.canonical(member);
        let resolved = if self
            .reg
            .types
            .get(&key)
            .is_some_and(|ty| !ty.primary.is_class())
        {
            SelectMember::Type
        } else if self.reg.entities.contains_key(&key) {
            SelectMember::Entity
        } else if let Some(kind) = primitive_kind(member) {
            SelectMember::Primitive(kind)
        } else {
            SelectMember::Unresolved
        };
        (key, resolved)
    }

    fn interpret_selects(&mut self) {
        let selects: Vec<(String, Vec<String>)> = self
            .reg
            .types
            .values()
            .filter(|ty| !ty.select_members.is_empty())
            .map(|ty| (ty.key.clone(), ty.select_members.clone()))
            .collect();

        for (parent, members) in selects {
            for member in members {
                let (key, resolved) = self.classify_member(&member);
                let reg = &mut *self.reg;
                match resolved {
                    SelectMember::Type => {
                        if let Some(ty) = reg.types.get_mut(&key) {
                            ty.parent_selects.push(parent.clone());
                        }
                    }
                    SelectMember::Entity => {
                        if let Some(entity) = reg.entities.get_mut(&key) {
                            entity.parent_selects.push(parent.clone());
                        }
                    }
                    SelectMember::Primitive(kind) => {
                        PrimitiveRegistry::register(kind);
                        log::debug!("built-in {kind} is a member of select {parent}");
                        reg.primitive_selects
                            .entry(kind)
                            .or_default()
                            .push(parent.clone());
                    }
                    SelectMember::Unresolved => reg.diagnose(
                        DiagnosticKind::UnresolvedSelectMember,
                        format!("{member} in select {parent} is not a type, entity or built-in"),
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Machine;
    use express_lite_model::Cardinality;

    fn build(text: &str) -> SchemaRegistry {
        let mut reg = SchemaRegistry::new();
        let mut machine = Machine::new();
        for line in text.lines() {
            machine.feed_line(line, &mut reg);
        }
        StructureBuilder::new(&mut reg).build(&|_: &str, _: f32| {}, 0.0, 100.0);
        reg
    }

    fn count(reg: &SchemaRegistry, kind: DiagnosticKind) -> usize {
        reg.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    #[test]
    fn test_inheritance_chain_is_flattened() {
        let reg = build(concat!(
            "ENTITY A;\n a : REAL;\nEND_ENTITY;\n",
            "ENTITY B\n SUBTYPE OF (A);\n b : REAL;\nEND_ENTITY;\n",
            "ENTITY C\n SUBTYPE OF (B);\n c : REAL;\nEND_ENTITY;\n",
        ));
        let c = reg.entities.get("C").unwrap();
        let names: Vec<_> = c
            .derived_attributes
            .iter()
            .map(|id| reg.entities[id.entity.index()].attributes[id.slot as usize].name.as_str())
            .collect();
        assert_eq!(names, ["a_A", "b_B", "c_C"]);
        assert_eq!(reg.entities.get("A").unwrap().derived_attributes.len(), 1);
    }

    #[test]
    fn test_property_names_are_unique() {
        let reg = build(concat!(
            "TYPE IfcLabel = STRING;\nEND_TYPE;\n",
            "ENTITY IfcWall;\n Name : IfcLabel;\nEND_ENTITY;\n",
            "ENTITY IfcDoor;\n Name : IfcLabel;\nEND_ENTITY;\n",
        ));
        let wall = reg.properties.get("Name_IfcWall").unwrap();
        let door = reg.properties.get("Name_IfcDoor").unwrap();
        assert_eq!(wall.original_name, "Name");
        assert_eq!(door.domain, EntityId(1));
        assert_eq!(reg.properties.len(), 2);
        assert_eq!(count(&reg, DiagnosticKind::DuplicateProperty), 0);
    }

    #[test]
    fn test_inverse_on_collection_target_is_pruned() {
        let reg = build(concat!(
            "ENTITY IfcRelNests;\n",
            " RelatedObjects : LIST [1:?] OF IfcObj;\n",
            "END_ENTITY;\n",
            "ENTITY IfcRelAggregates;\n",
            " RelatingObject : IfcObj;\n",
            "END_ENTITY;\n",
            "ENTITY IfcObj;\n",
            " INVERSE\n",
            "  Nests : SET [0:1] OF IfcRelNests FOR RelatedObjects;\n",
            "  IsDecomposedBy : SET [0:?] OF IfcRelAggregates FOR RelatingObject;\n",
            "END_ENTITY;\n",
        ));
        let properties = &reg.properties;
        assert!(!properties.contains("Nests_IfcObj"));
        assert!(properties.inverse_of("RelatedObjects_IfcRelNests").is_none());

        let kept = properties.inverse_of("RelatingObject_IfcRelAggregates").unwrap();
        assert_eq!(kept.name, "IsDecomposedBy_IfcObj");
        assert_eq!(kept.collection, CollectionKind::Set);
        assert_eq!(kept.kind, PropertyKind::Entity);
        assert_eq!(
            properties.inverse_of("IsDecomposedBy_IfcObj").map(|p| p.name.as_str()),
            Some("RelatingObject_IfcRelAggregates")
        );
    }

    #[test]
    fn test_inverse_collision_deletes_both_inverses() {
        let reg = build(concat!(
            "ENTITY IfcRel;\n Relating : IfcA;\nEND_ENTITY;\n",
            "ENTITY IfcA;\n INVERSE\n First : SET OF IfcRel FOR Relating;\nEND_ENTITY;\n",
            "ENTITY IfcB;\n INVERSE\n Second : SET OF IfcRel FOR Relating;\nEND_ENTITY;\n",
        ));
        let properties = &reg.properties;
        assert!(!properties.contains("First_IfcA"));
        assert!(!properties.contains("Second_IfcB"));
        assert!(properties.contains("Relating_IfcRel"));
        assert!(properties.inverse_of("Relating_IfcRel").is_none());
        assert_eq!(count(&reg, DiagnosticKind::InverseConflict), 1);
    }

    #[test]
    fn test_collection_target_released_after_pruning() {
        let reg = build(concat!(
            "ENTITY IfcRel;\n Many : LIST [1:?] OF IfcA;\nEND_ENTITY;\n",
            "ENTITY IfcA;\n INVERSE\n First : SET OF IfcRel FOR Many;\nEND_ENTITY;\n",
            "ENTITY IfcB;\n INVERSE\n Second : SET OF IfcRel FOR Many;\nEND_ENTITY;\n",
        ));
        let names: Vec<_> = reg.properties.names().collect();
        assert_eq!(names, ["Many_IfcRel"]);
        assert!(reg.properties.inverse_of("Many_IfcRel").is_none());
        // the second inverse found the target free again, not claimed
        assert_eq!(count(&reg, DiagnosticKind::InverseConflict), 0);
    }

    #[test]
    fn test_third_inverse_on_claimed_target() {
        let reg = build(concat!(
            "ENTITY IfcRel;\n",
            " Relating : IfcA;\n",
            " Many : LIST [1:?] OF IfcA;\n",
            "END_ENTITY;\n",
            "ENTITY IfcA;\n INVERSE\n",
            "  First : SET OF IfcRel FOR Relating;\n",
            "  ListedA : SET OF IfcRel FOR Many;\n",
            "END_ENTITY;\n",
            "ENTITY IfcB;\n INVERSE\n",
            "  Second : SET OF IfcRel FOR Relating;\n",
            "  ListedB : SET OF IfcRel FOR Many;\n",
            "END_ENTITY;\n",
            "ENTITY IfcC;\n INVERSE\n",
            "  Third : SET OF IfcRel FOR Relating;\n",
            "END_ENTITY;\n",
        ));
        let names: Vec<_> = reg.properties.names().collect();
        assert_eq!(names, ["Relating_IfcRel", "Many_IfcRel"]);
        assert!(reg.properties.inverse_of("Relating_IfcRel").is_none());
        assert_eq!(count(&reg, DiagnosticKind::InverseConflict), 2);

        // the third claimant met an unlinked target and was never paired
        let third = reg.entities.get("IFCC").unwrap().inverses[0].property.unwrap();
        assert!(!reg.properties.is_indexed(third));
        assert_eq!(reg.properties.by_id(third).and_then(|p| p.inverse), None);
    }

    #[test]
    fn test_unresolved_inverse_is_removed() {
        let reg = build("ENTITY IfcA;\n INVERSE\n Lost : IfcGhost FOR Nothing;\nEND_ENTITY;\n");
        assert!(!reg.properties.contains("Lost_IfcA"));
        assert_eq!(count(&reg, DiagnosticKind::UnresolvedInverse), 1);
        // the arena still holds the property the inverse points at
        let inverse = &reg.entities.get("IFCA").unwrap().inverses[0];
        let property = inverse.property.and_then(|id| reg.properties.by_id(id));
        assert_eq!(property.map(|p| p.name.as_str()), Some("Lost_IfcA"));
    }

    #[test]
    fn test_forward_attribute_flags() {
        let reg = build(concat!(
            "ENTITY IfcRel;\n",
            " Relating : IfcA;\n",
            " Others : SET [1:?] OF IfcA;\n",
            " UNIQUE\n",
            "  UR1 : Relating;\n",
            "END_ENTITY;\n",
            "ENTITY IfcA;\n",
            " INVERSE\n",
            "  One : SET [0:1] OF IfcRel FOR Relating;\n",
            "  Many : SET [0:1] OF IfcRel FOR Others;\n",
            "END_ENTITY;\n",
        ));
        let rel = reg.entities.get("IFCREL").unwrap();
        let relating = &rel.attributes[0];
        assert!(relating.reverse_pointer);
        assert!(relating.one_to_one);
        assert_eq!(relating.inverted_by, Some(InverseId::new(EntityId(1), 0)));

        let others = &rel.attributes[1];
        assert!(others.reverse_pointer);
        assert!(!others.one_to_one);

        let a = reg.entities.get("IFCA").unwrap();
        assert!(a.inverses[0].unique);
        assert!(!a.inverses[1].unique);
        assert_eq!(a.derived_inverses.len(), 2);
    }

    #[test]
    fn test_inherited_inverses_are_listed() {
        let reg = build(concat!(
            "ENTITY IfcRel;\n Relating : IfcA;\nEND_ENTITY;\n",
            "ENTITY IfcA;\n INVERSE\n One : IfcRel FOR Relating;\nEND_ENTITY;\n",
            "ENTITY IfcB\n SUBTYPE OF (IfcA);\nEND_ENTITY;\n",
        ));
        let b = reg.entities.get("IFCB").unwrap();
        assert_eq!(b.derived_inverses, [InverseId::new(EntityId(1), 0)]);
    }

    #[test]
    fn test_select_members_resolve_everywhere() {
        let reg = build(concat!(
            "TYPE IfcLabel = STRING;\nEND_TYPE;\n",
            "TYPE IfcValue = SELECT\n (IfcLabel\n ,IfcRoot\n ,REAL\n ,IfcGhost);\nEND_TYPE;\n",
            "ENTITY IfcRoot;\nEND_ENTITY;\n",
        ));
        let label = reg.types.get("IFCLABEL").unwrap();
        assert_eq!(label.parent_selects, ["IFCVALUE"]);
        let root = reg.entities.get("IFCROOT").unwrap();
        assert_eq!(root.parent_selects, ["IFCVALUE"]);
        assert_eq!(
            reg.primitive_selects.get(&PrimitiveKind::Real).map(Vec::as_slice),
            Some(&["IFCVALUE".to_string()][..])
        );
        assert_eq!(count(&reg, DiagnosticKind::UnresolvedSelectMember), 1);
    }

    #[test]
    fn test_property_classification() {
        let reg = build(concat!(
            "TYPE IfcLabel = STRING;\nEND_TYPE;\n",
            "TYPE IfcKindEnum = ENUMERATION OF\n (A\n ,B);\nEND_TYPE;\n",
            "TYPE IfcChoice = SELECT\n (IfcLabel\n ,IfcThing);\nEND_TYPE;\n",
            "ENTITY IfcThing;\n",
            " Label : IfcLabel;\n",
            " Kind : IfcKindEnum;\n",
            " Choice : OPTIONAL IfcChoice;\n",
            " Other : IfcThing;\n",
            " Count : INTEGER;\n",
            " Coords : LIST [1:?] OF LIST [2:3] OF IfcLabel;\n",
            "END_ENTITY;\n",
        ));
        let kind_of = |name: &str| reg.properties.get(name).map(|p| p.kind);
        assert_eq!(kind_of("Label_IfcThing"), Some(PropertyKind::Datatype));
        assert_eq!(kind_of("Kind_IfcThing"), Some(PropertyKind::Enumeration));
        assert_eq!(kind_of("Choice_IfcThing"), Some(PropertyKind::Select));
        assert_eq!(kind_of("Other_IfcThing"), Some(PropertyKind::Entity));
        assert_eq!(kind_of("Count_IfcThing"), Some(PropertyKind::Datatype));

        let choice = reg.properties.get("Choice_IfcThing").unwrap();
        assert!(choice.optional);
        assert_eq!(choice.select_members, ["IfcLabel", "IfcThing"]);

        let count_prop = reg.properties.get("Count_IfcThing").unwrap();
        assert_eq!(count_prop.range, "INTEGER");
        assert_eq!(count_prop.range_ns, express_lite_model::RangeNamespace::Express);

        let coords = reg.properties.get("Coords_IfcThing").unwrap();
        assert_eq!(coords.collection, CollectionKind::ListOfList);
        assert_eq!(coords.nested_cardinality, Cardinality::new(2, Some(3)));

        let names: Vec<_> = reg.individuals.iter().map(|i| i.value.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(reg.individuals[0].type_name, "IfcKindEnum");
    }

    #[test]
    fn test_inheritance_cycle_is_diagnosed() {
        let reg = build(concat!(
            "ENTITY A\n SUBTYPE OF (B);\n a : REAL;\nEND_ENTITY;\n",
            "ENTITY B\n SUBTYPE OF (A);\n b : REAL;\nEND_ENTITY;\n",
        ));
        assert_eq!(count(&reg, DiagnosticKind::InheritanceCycle), 2);
        let a = reg.entities.get("A").unwrap();
        assert_eq!(a.derived_attributes.len(), 2);
    }

    #[test]
    fn test_unresolved_superclass_reported_once() {
        let reg = build(concat!(
            "ENTITY B\n SUBTYPE OF (Missing);\nEND_ENTITY;\n",
            "ENTITY C\n SUBTYPE OF (B);\nEND_ENTITY;\n",
        ));
        assert_eq!(count(&reg, DiagnosticKind::UnresolvedSuperclass), 1);
        let c = reg.entities.get("C").unwrap();
        assert!(c.derived_attributes.is_empty());
    }
}
