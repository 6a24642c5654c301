// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Token-driven state machine for EXPRESS declarations
//!
//! Each state carries only the data its declaration needs so far. A
//! transition consumes exactly one token and never backtracks; finished
//! attributes, inverses and type right-hand sides are committed straight
//! into the [`SchemaRegistry`].

use crate::registry::SchemaRegistry;
use crate::tokenizer::{parse_bounds, tokens};
use express_lite_model::names::{filter_extras, format_property, is_all_upper, primitive_kind};
use express_lite_model::{
    Attribute, Cardinality, CollectionKind, DiagnosticKind, EntityId, Inverse, PrimaryType,
    PrimitiveRegistry, SiblingSetId,
};
use std::mem;

fn is(token: &str, keyword: &str) -> bool {
    token.eq_ignore_ascii_case(keyword)
}

/// Text before the first `;`
fn before_semicolon(token: &str) -> &str {
    token.split(';').next().unwrap_or(token)
}

/// Comma-separated names in a token, punctuation removed
fn member_names(token: &str) -> impl Iterator<Item = String> + '_ {
    token
        .split(',')
        .map(filter_extras)
        .filter(|name| !name.is_empty())
}

/// Attribute being read, from its name up to the range token
#[derive(Debug, Default)]
pub struct AttributeAcc {
    name: String,
    optional: bool,
    collection: CollectionKind,
    /// Aggregate keywords seen so far
    depth: u8,
    cardinality: Cardinality,
    nested: Cardinality,
}

impl AttributeAcc {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Record `ARRAY`, `SET` or `LIST`; false for an unsupported third list level
    fn aggregate(&mut self, kind: CollectionKind) -> bool {
        self.depth = self.depth.saturating_add(1);
        match (self.collection, kind) {
            (CollectionKind::Scalar, _) => self.collection = kind,
            (CollectionKind::List, CollectionKind::List) => {
                self.collection = CollectionKind::ListOfList
            }
            (CollectionKind::ListOfList, CollectionKind::List) => return false,
            _ => {}
        }
        true
    }

    /// Apply bounds to the aggregate level just opened
    ///
    /// Returns false when the level is too deep to be kept.
    fn bounds(&mut self, min: Option<u32>, max: Option<u32>) -> bool {
        match self.depth {
            0 | 1 => self.cardinality.apply(min, max),
            2 => self.nested.apply(min, max),
            _ => return false,
        }
        true
    }

    fn finish(self, domain: EntityId, range: &str) -> Attribute {
        let mut attr = Attribute::new(self.name, domain, range);
        if let Some(kind) = primitive_kind(range) {
            PrimitiveRegistry::register(kind);
            attr.range = kind.as_str().to_string();
            attr.range_key = attr.range.clone();
            attr.primitive = Some(kind);
        }
        attr.optional = self.optional;
        attr.collection = self.collection;
        attr.cardinality = self.cardinality;
        attr.nested_cardinality = self.nested;
        attr
    }
}

/// Inverse being read, from its name up to `FOR`
#[derive(Debug, Default)]
pub struct InverseAcc {
    name: String,
    is_set: bool,
    cardinality: Cardinality,
    class_range: String,
}

/// Parser state; each variant owns its in-progress declaration
#[derive(Debug, Default)]
pub enum State {
    #[default]
    TopLevel,
    SchemaName,
    /// Inside a `FUNCTION` or `RULE` body
    Skip {
        until: &'static str,
    },
    TypeName {
        ty: Option<usize>,
    },
    TypeSwitch {
        ty: usize,
    },
    TypeSelect {
        ty: usize,
    },
    TypeEnumeration {
        ty: usize,
    },
    TypeEnumerationValues {
        ty: usize,
    },
    TypeCollection {
        ty: usize,
        spec: String,
    },
    EntityName,
    EntityBody {
        entity: EntityId,
    },
    Attribute {
        entity: EntityId,
        acc: AttributeAcc,
    },
    Subtype {
        entity: EntityId,
    },
    SubtypeOf {
        entity: EntityId,
    },
    /// Skipping additional supertypes up to `)`
    SubtypeList {
        entity: EntityId,
    },
    Supertype {
        entity: EntityId,
    },
    OneOf {
        entity: EntityId,
        set: SiblingSetId,
    },
    InverseName {
        entity: EntityId,
        name: Option<String>,
    },
    InverseRange {
        entity: EntityId,
        acc: InverseAcc,
    },
    InverseFor {
        entity: EntityId,
        acc: InverseAcc,
    },
    Unique {
        entity: EntityId,
    },
    UniqueName {
        entity: EntityId,
    },
    Where {
        entity: EntityId,
    },
    Derive {
        entity: EntityId,
    },
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            State::TopLevel => "TopLevel",
            State::SchemaName => "SchemaName",
            State::Skip { .. } => "Skip",
            State::TypeName { .. } => "TypeName",
            State::TypeSwitch { .. } => "TypeSwitch",
            State::TypeSelect { .. } => "TypeSelect",
            State::TypeEnumeration { .. } => "TypeEnumeration",
            State::TypeEnumerationValues { .. } => "TypeEnumerationValues",
            State::TypeCollection { .. } => "TypeCollection",
            State::EntityName => "EntityName",
            State::EntityBody { .. } => "EntityBody",
            State::Attribute { .. } => "Attribute",
            State::Subtype { .. } => "Subtype",
            State::SubtypeOf { .. } => "SubtypeOf",
            State::SubtypeList { .. } => "SubtypeList",
            State::Supertype { .. } => "Supertype",
            State::OneOf { .. } => "OneOf",
            State::InverseName { .. } => "InverseName",
            State::InverseRange { .. } => "InverseRange",
            State::InverseFor { .. } => "InverseFor",
            State::Unique { .. } => "Unique",
            State::UniqueName { .. } => "UniqueName",
            State::Where { .. } => "Where",
            State::Derive { .. } => "Derive",
        }
    }

    /// Apply one token
    pub fn step(self, token: &str, reg: &mut SchemaRegistry) -> State {
        match self {
            State::TopLevel => top_level(token),
            State::SchemaName => {
                let name = before_semicolon(token);
                if !name.is_empty() {
                    reg.schema_name = Some(name.to_string());
                }
                State::TopLevel
            }
            State::Skip { until } => {
                if is(token, until) {
                    State::TopLevel
                } else {
                    State::Skip { until }
                }
            }

            // TYPE
            State::TypeName { ty } => type_name(ty, token, reg),
            State::TypeSwitch { ty } => type_switch(ty, token, reg),
            State::TypeSelect { ty } => {
                if let Some(decl) = reg.type_mut(ty) {
                    decl.select_members.extend(member_names(token));
                }
                if token.ends_with(';') {
                    State::TopLevel
                } else {
                    State::TypeSelect { ty }
                }
            }
            State::TypeEnumeration { ty } => {
                if is(token, "OF") {
                    State::TypeEnumerationValues { ty }
                } else {
                    State::TypeEnumeration { ty }
                }
            }
            State::TypeEnumerationValues { ty } => {
                let values: Vec<String> = member_names(token)
                    .map(|value| reg.canonical(&value))
                    .collect();
                if let Some(decl) = reg.type_mut(ty) {
                    decl.enum_values.extend(values);
                }
                if token.ends_with(';') {
                    State::TopLevel
                } else {
                    State::TypeEnumerationValues { ty }
                }
            }
            State::TypeCollection { ty, mut spec } => {
                spec.push(' ');
                spec.push_str(token);
                if token.ends_with(';') {
                    finish_collection(ty, spec, reg);
                    State::TopLevel
                } else {
                    State::TypeCollection { ty, spec }
                }
            }

            // ENTITY
            State::EntityName => {
                let name = token.strip_suffix(';').unwrap_or(token);
                let entity = reg.entity_or_insert(name);
                log::trace!("entity {name} -> {entity}");
                State::EntityBody { entity }
            }
            State::EntityBody { entity } => entity_body(entity, token, reg),
            State::Attribute { entity, acc } => attribute(entity, acc, token, reg),
            State::Subtype { entity } => {
                if is(token, "OF") {
                    State::SubtypeOf { entity }
                } else {
                    State::EntityBody { entity }
                }
            }
            State::SubtypeOf { entity } => subtype_of(entity, token, reg),
            State::SubtypeList { entity } => {
                if is(token, "END_ENTITY;") {
                    return State::TopLevel;
                }
                let extra = filter_extras(token);
                if !extra.is_empty() {
                    reg.diagnose(
                        DiagnosticKind::MultipleSupertypes,
                        format!("supertype {extra} of {entity} ignored"),
                    );
                }
                if token.contains(')') || token.contains(';') {
                    State::EntityBody { entity }
                } else {
                    State::SubtypeList { entity }
                }
            }
            State::Supertype { entity } => supertype(entity, token, reg),
            State::OneOf { entity, set } => one_of(entity, set, token, reg),

            // INVERSE
            State::InverseName { entity, name } => inverse_name(entity, name, token),
            State::InverseRange { entity, mut acc } => {
                if let Some(next) = entity_exit(entity, token) {
                    return next;
                }
                if is(token, "SET") {
                    acc.is_set = true;
                } else if is(token, "FOR") {
                    return State::InverseFor { entity, acc };
                } else if token.starts_with('[') {
                    match parse_bounds(token) {
                        Some((min, max)) => acc.cardinality.apply(min, max),
                        None => reg.diagnose(
                            DiagnosticKind::MalformedCardinality,
                            format!("bounds {token} on inverse {}", acc.name),
                        ),
                    }
                } else if !is(token, "OF") {
                    acc.class_range = token.to_string();
                }
                State::InverseRange { entity, acc }
            }
            State::InverseFor { entity, acc } => {
                if let Some(next) = entity_exit(entity, token) {
                    return next;
                }
                if !token.contains(';') {
                    return State::InverseFor { entity, acc };
                }
                let mut inverse =
                    Inverse::new(acc.name, entity, acc.class_range, before_semicolon(token));
                inverse.is_set = acc.is_set;
                inverse.cardinality = acc.cardinality;
                if let Some(owner) = reg.entity_mut(entity) {
                    owner.inverses.push(inverse);
                }
                State::InverseName { entity, name: None }
            }

            // UNIQUE, WHERE, DERIVE
            State::Unique { entity } => {
                if let Some(next) = rule_exit(entity, token) {
                    next
                } else if token == ":" || token.ends_with(':') {
                    State::UniqueName { entity }
                } else {
                    State::Unique { entity }
                }
            }
            State::UniqueName { entity } => {
                if let Some(next) = rule_exit(entity, token) {
                    return next;
                }
                mark_unique(entity, token, reg);
                State::Unique { entity }
            }
            State::Where { entity } => {
                entity_exit(entity, token).unwrap_or(State::Where { entity })
            }
            State::Derive { entity } => {
                if let Some(next) = entity_exit(entity, token) {
                    next
                } else if is(token, "INVERSE") {
                    State::InverseName { entity, name: None }
                } else if is(token, "UNIQUE") {
                    State::Unique { entity }
                } else if is(token, "WHERE") {
                    State::Where { entity }
                } else {
                    State::Derive { entity }
                }
            }
        }
    }
}

fn top_level(token: &str) -> State {
    if is(token, "TYPE") {
        State::TypeName { ty: None }
    } else if is(token, "ENTITY") {
        State::EntityName
    } else if is(token, "FUNCTION") {
        State::Skip {
            until: "END_FUNCTION;",
        }
    } else if is(token, "RULE") {
        State::Skip { until: "END_RULE;" }
    } else if is(token, "SCHEMA") {
        State::SchemaName
    } else {
        State::TopLevel
    }
}

/// `END_ENTITY;` and `SUBTYPE` leave any entity sub-state
fn entity_exit(entity: EntityId, token: &str) -> Option<State> {
    if is(token, "END_ENTITY;") {
        Some(State::TopLevel)
    } else if is(token, "SUBTYPE") {
        Some(State::Subtype { entity })
    } else {
        None
    }
}

/// Exits out of a `UNIQUE` clause
fn rule_exit(entity: EntityId, token: &str) -> Option<State> {
    if is(token, "WHERE") {
        Some(State::Where { entity })
    } else {
        entity_exit(entity, token)
    }
}

fn type_name(ty: Option<usize>, token: &str, reg: &mut SchemaRegistry) -> State {
    match token.strip_suffix('=') {
        Some(name) => {
            let ty = if name.is_empty() {
                ty
            } else {
                Some(reg.type_or_insert(name))
            };
            match ty {
                Some(ty) => State::TypeSwitch { ty },
                None => State::TopLevel,
            }
        }
        None => State::TypeName {
            ty: Some(reg.type_or_insert(token)),
        },
    }
}

fn type_switch(ty: usize, token: &str, reg: &mut SchemaRegistry) -> State {
    let bare = token.strip_suffix(';').unwrap_or(token);

    let (primary, next) = if is(token, "SELECT") {
        (PrimaryType::Select, State::TypeSelect { ty })
    } else if is(token, "ENUMERATION") {
        (PrimaryType::Enumeration, State::TypeEnumeration { ty })
    } else if is_all_upper(bare) {
        if ["ARRAY", "SET", "LIST"].iter().any(|k| bare.starts_with(k)) {
            let spec = reg.canonical(bare);
            if token.ends_with(';') {
                finish_collection(ty, spec, reg);
                return State::TopLevel;
            }
            return State::TypeCollection { ty, spec };
        }
        match primitive_kind(bare) {
            Some(kind) => {
                PrimitiveRegistry::register(kind);
                (PrimaryType::Primitive(kind), State::TopLevel)
            }
            None => (PrimaryType::Named(reg.canonical(bare)), State::TopLevel),
        }
    } else {
        (PrimaryType::Named(bare.to_string()), State::TopLevel)
    };

    if let Some(decl) = reg.type_mut(ty) {
        decl.primary = primary;
    }
    next
}

fn finish_collection(ty: usize, spec: String, reg: &mut SchemaRegistry) {
    let spec = spec.trim_end_matches(';').to_string();
    if let Some(decl) = reg.type_mut(ty) {
        decl.primary = PrimaryType::Collection(spec);
    }
}

fn entity_body(entity: EntityId, token: &str, reg: &mut SchemaRegistry) -> State {
    if is(token, "SUBTYPE") {
        State::Subtype { entity }
    } else if is(token, "SUPERTYPE") {
        State::Supertype { entity }
    } else if is(token, "ABSTRACT") {
        if let Some(e) = reg.entity_mut(entity) {
            e.is_abstract = true;
        }
        State::Supertype { entity }
    } else if is(token, "INVERSE") {
        State::InverseName { entity, name: None }
    } else if is(token, "UNIQUE") {
        State::Unique { entity }
    } else if is(token, "WHERE") {
        State::Where { entity }
    } else if is(token, "DERIVE") {
        State::Derive { entity }
    } else if is(token, "END_ENTITY;") {
        State::TopLevel
    } else {
        // aggregate keywords come after the name, so no list suffix applies yet
        let name = token.strip_suffix(':').unwrap_or(token);
        State::Attribute {
            entity,
            acc: AttributeAcc::new(format_property(name, false)),
        }
    }
}

fn attribute(
    entity: EntityId,
    mut acc: AttributeAcc,
    token: &str,
    reg: &mut SchemaRegistry,
) -> State {
    if is(token, "END_ENTITY;") {
        return State::TopLevel;
    } else if is(token, "OPTIONAL") {
        acc.optional = true;
    } else if is(token, "ARRAY") {
        acc.aggregate(CollectionKind::Array);
    } else if is(token, "SET") {
        acc.aggregate(CollectionKind::Set);
    } else if is(token, "LIST") {
        if !acc.aggregate(CollectionKind::List) {
            reg.diagnose(
                DiagnosticKind::NestedListUnsupported,
                format!("LIST OF LIST OF LIST attribute {} on {entity}", acc.name),
            );
        }
    } else if token.starts_with('[') && token.ends_with(']') {
        match parse_bounds(token) {
            Some((min, max)) => {
                if !acc.bounds(min, max) {
                    reg.diagnose(
                        DiagnosticKind::MalformedCardinality,
                        format!("bounds {token} on attribute {} nest too deep", acc.name),
                    );
                }
            }
            None => reg.diagnose(
                DiagnosticKind::MalformedCardinality,
                format!("bounds {token} on attribute {}", acc.name),
            ),
        }
    } else if is(token, "SUBTYPE") {
        return State::Subtype { entity };
    } else if token.contains(';') {
        let attr = acc.finish(entity, before_semicolon(token));
        if let Some(owner) = reg.entity_mut(entity) {
            owner.attributes.push(attr);
        }
        return State::EntityBody { entity };
    }
    State::Attribute { entity, acc }
}

fn subtype_of(entity: EntityId, token: &str, reg: &mut SchemaRegistry) -> State {
    if is(token, "END_ENTITY;") {
        return State::TopLevel;
    }
    let mut names = member_names(token);
    let Some(superclass) = names.next() else {
        // lone `(`
        return State::SubtypeOf { entity };
    };
    let extra: Vec<String> = names.collect();
    if let Some(e) = reg.entity_mut(entity) {
        e.superclass = Some(superclass);
    }
    for name in extra {
        reg.diagnose(
            DiagnosticKind::MultipleSupertypes,
            format!("supertype {name} of {entity} ignored"),
        );
    }

    if token.contains(')') || token.contains(';') {
        State::EntityBody { entity }
    } else {
        State::SubtypeList { entity }
    }
}

fn supertype(entity: EntityId, token: &str, reg: &mut SchemaRegistry) -> State {
    if let Some(next) = entity_exit(entity, token) {
        return next;
    }
    let oneof = token
        .get(..6)
        .filter(|head| head.eq_ignore_ascii_case("(ONEOF"));
    if oneof.is_some() {
        let set = reg.siblings.open_set();
        let rest = &token[6..];
        if rest.is_empty() {
            return State::OneOf { entity, set };
        }
        return one_of(entity, set, rest, reg);
    }
    if token.contains(';') {
        State::EntityBody { entity }
    } else {
        State::Supertype { entity }
    }
}

fn one_of(entity: EntityId, set: SiblingSetId, token: &str, reg: &mut SchemaRegistry) -> State {
    if let Some(next) = entity_exit(entity, token) {
        return next;
    }
    for member in member_names(token) {
        if !reg.siblings.add_member(set, &member) {
            reg.diagnose(
                DiagnosticKind::DuplicateSibling,
                format!("{member} already belongs to a ONEOF group"),
            );
        }
    }

    if token.contains(';') || token.contains(')') {
        if let Some(e) = reg.entity_mut(entity) {
            e.subclasses = Some(set);
        }
        if token.contains(';') {
            State::EntityBody { entity }
        } else {
            State::Supertype { entity }
        }
    } else {
        State::OneOf { entity, set }
    }
}

fn inverse_name(entity: EntityId, name: Option<String>, token: &str) -> State {
    if let Some(next) = entity_exit(entity, token) {
        return next;
    }
    if is(token, "WHERE") {
        return State::Where { entity };
    }
    if is(token, "UNIQUE") {
        return State::Unique { entity };
    }

    let (name, ready) = if token == ":" {
        (name, true)
    } else if let Some(head) = token.strip_suffix(':') {
        (Some(format_property(head, false)), true)
    } else {
        (Some(format_property(token, false)), false)
    };

    if ready {
        State::InverseRange {
            entity,
            acc: InverseAcc {
                name: name.unwrap_or_default(),
                ..InverseAcc::default()
            },
        }
    } else {
        State::InverseName { entity, name }
    }
}

/// `UNIQUE` rule naming one attribute; multi-name rules are not decomposed
fn mark_unique(entity: EntityId, token: &str, reg: &mut SchemaRegistry) {
    if token.contains(',') {
        reg.diagnose(
            DiagnosticKind::MultiNameUnique,
            format!("multi-attribute UNIQUE rule on {entity} starting at {token}"),
        );
        return;
    }
    let name = before_semicolon(token);
    if let Some(owner) = reg.entity_mut(entity) {
        for attr in owner.attributes.iter_mut().filter(|a| a.name == name) {
            attr.unique = true;
        }
    }
}

/// Drives [`State`] over a token stream
#[derive(Debug, Default)]
pub struct Machine {
    state: State,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, token: &str, reg: &mut SchemaRegistry) {
        let state = mem::take(&mut self.state);
        let from = state.name();
        self.state = state.step(token, reg);
        if from != self.state.name() {
            log::trace!("{from} -> {} on {token:?}", self.state.name());
        }
    }

    /// Feed every token of one line
    pub fn feed_line(&mut self, line: &str, reg: &mut SchemaRegistry) {
        for token in tokens(line) {
            self.feed(token, reg);
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use express_lite_model::PrimitiveKind;

    fn run(text: &str) -> SchemaRegistry {
        let mut reg = SchemaRegistry::new();
        let mut machine = Machine::new();
        for line in text.lines() {
            machine.feed_line(line, &mut reg);
        }
        reg
    }

    fn entity<'a>(reg: &'a SchemaRegistry, key: &str) -> &'a express_lite_model::Entity {
        reg.entities.get(key).unwrap()
    }

    #[test]
    fn test_primitive_alias() {
        let reg = run("TYPE IfcLabel = STRING;\nEND_TYPE;");
        let label = reg.types.get("IFCLABEL").unwrap();
        assert_eq!(label.name, "IfcLabel");
        assert_eq!(label.primary, PrimaryType::Primitive(PrimitiveKind::String));
        assert!(PrimitiveRegistry::get(PrimitiveKind::String).is_some());
    }

    #[test]
    fn test_parameterized_primitive_alias() {
        let reg = run("TYPE IfcGloballyUniqueId = STRING(22) FIXED;\nEND_TYPE;");
        let ty = reg.types.get("IFCGLOBALLYUNIQUEID").unwrap();
        assert_eq!(ty.primary, PrimaryType::Primitive(PrimitiveKind::String));
    }

    #[test]
    fn test_type_reference() {
        let reg = run(concat!(
            "TYPE IfcPositiveLengthMeasure = IfcLengthMeasure;\n",
            " WHERE\n",
            "\tWR1 : SELF > 0.;\n",
            "END_TYPE;\n",
        ));
        let ty = reg.types.get("IFCPOSITIVELENGTHMEASURE").unwrap();
        assert_eq!(ty.primary, PrimaryType::Named("IfcLengthMeasure".into()));
        assert_eq!(reg.types.len(), 1);
    }

    #[test]
    fn test_collection_type() {
        let reg = run("TYPE IfcComplexNumber = ARRAY [1:2] OF REAL;\nEND_TYPE;");
        let ty = reg.types.get("IFCCOMPLEXNUMBER").unwrap();
        assert_eq!(ty.primary, PrimaryType::Collection("ARRAY [1:2] OF REAL".into()));
    }

    #[test]
    fn test_select_and_enumeration() {
        let reg = run(concat!(
            "TYPE IfcActorSelect = SELECT\n",
            "\t(IfcOrganization\n",
            "\t,IfcPerson\n",
            "\t,IfcPersonAndOrganization);\n",
            "END_TYPE;\n",
            "TYPE IfcDoorTypeEnum = ENUMERATION OF\n",
            "\t(DOOR\n",
            "\t,gate\n",
            "\t,NOTDEFINED);\n",
            "END_TYPE;\n",
        ));
        let select = reg.types.get("IFCACTORSELECT").unwrap();
        assert!(select.is_select());
        assert_eq!(
            select.select_members,
            ["IfcOrganization", "IfcPerson", "IfcPersonAndOrganization"]
        );
        let kind = reg.types.get("IFCDOORTYPEENUM").unwrap();
        assert!(kind.is_enumeration());
        assert_eq!(kind.enum_values, ["DOOR", "GATE", "NOTDEFINED"]);
    }

    #[test]
    fn test_entity_attributes() {
        let reg = run(concat!(
            "ENTITY IfcPolyline\n",
            " SUBTYPE OF (IfcBoundedCurve);\n",
            "\tPoints : LIST [2:?] OF IfcCartesianPoint;\n",
            "\tTag : OPTIONAL IfcLabel;\n",
            "\tCoordList : LIST [1:?] OF LIST [2:3] OF IfcLengthMeasure;\n",
            "\tFlag : BOOLEAN;\n",
            "END_ENTITY;\n",
        ));
        let polyline = entity(&reg, "IFCPOLYLINE");
        assert_eq!(polyline.superclass.as_deref(), Some("IfcBoundedCurve"));
        assert_eq!(polyline.attributes.len(), 4);

        let points = &polyline.attributes[0];
        assert_eq!(points.name, "Points");
        assert_eq!(points.collection, CollectionKind::List);
        assert_eq!(points.cardinality, Cardinality::new(2, None));
        assert_eq!(points.range, "IfcCartesianPoint");

        assert!(polyline.attributes[1].optional);

        let coords = &polyline.attributes[2];
        assert_eq!(coords.collection, CollectionKind::ListOfList);
        assert_eq!(coords.cardinality, Cardinality::new(1, None));
        assert_eq!(coords.nested_cardinality, Cardinality::new(2, Some(3)));

        let flag = &polyline.attributes[3];
        assert_eq!(flag.primitive, Some(PrimitiveKind::Boolean));
        assert_eq!(flag.range, "BOOLEAN");
    }

    #[test]
    fn test_triple_list_is_diagnosed() {
        let reg = run(concat!(
            "ENTITY IfcCube;\n",
            "\tCells : LIST OF LIST OF LIST OF REAL;\n",
            "END_ENTITY;\n",
        ));
        let cells = &entity(&reg, "IFCCUBE").attributes[0];
        assert_eq!(cells.collection, CollectionKind::ListOfList);
        assert!(reg
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::NestedListUnsupported));
    }

    #[test]
    fn test_oneof_siblings() {
        let reg = run(concat!(
            "ENTITY IfcRoot\n",
            " ABSTRACT SUPERTYPE OF (ONEOF\n",
            "\t(IfcObjectDefinition\n",
            "\t,IfcRelationship));\n",
            "\tGlobalId : IfcGloballyUniqueId;\n",
            "END_ENTITY;\n",
            "ENTITY IfcOther\n",
            " SUPERTYPE OF (ONEOF(IfcRelationship, IfcThing));\n",
            "END_ENTITY;\n",
        ));
        let root = entity(&reg, "IFCROOT");
        assert!(root.is_abstract);
        assert_eq!(root.attributes.len(), 1);
        let set = reg.siblings.set(root.subclasses.unwrap()).unwrap();
        assert_eq!(set.members, ["IfcObjectDefinition", "IfcRelationship"]);

        assert!(reg.siblings.get("IfcThing").is_some());
        let duplicates = reg
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::DuplicateSibling)
            .count();
        assert_eq!(duplicates, 1);
    }

    #[test]
    fn test_inverse_clause() {
        let reg = run(concat!(
            "ENTITY IfcObjectDefinition\n",
            " SUBTYPE OF (IfcRoot);\n",
            " INVERSE\n",
            "\tIsDecomposedBy : SET [0:?] OF IfcRelAggregates FOR RelatingObject;\n",
            "\tDecomposes : SET [0:1] OF IfcRelAggregates FOR RelatedObjects;\n",
            "\tShape: IfcShape FOR Of;\n",
            "END_ENTITY;\n",
        ));
        let def = entity(&reg, "IFCOBJECTDEFINITION");
        assert_eq!(def.inverses.len(), 3);

        let first = &def.inverses[0];
        assert_eq!(first.name, "IsDecomposedBy");
        assert_eq!(first.class_range, "IfcRelAggregates");
        assert_eq!(first.inverse_of, "RelatingObject");
        assert!(first.is_set);
        assert_eq!(first.cardinality, Cardinality::new(0, None));

        assert_eq!(def.inverses[1].cardinality, Cardinality::new(0, Some(1)));
        assert_eq!(def.inverses[2].name, "Shape");
        assert!(!def.inverses[2].is_set);
    }

    #[test]
    fn test_unique_single_and_multi_name() {
        let reg = run(concat!(
            "ENTITY IfcRoot;\n",
            "\tGlobalId : IfcGloballyUniqueId;\n",
            "\tName : IfcLabel;\n",
            "\tTag : IfcLabel;\n",
            " UNIQUE\n",
            "\tUR1 : GlobalId;\n",
            "\tUR2 : Name, Tag;\n",
            " WHERE\n",
            "\tWR1 : EXISTS(Name);\n",
            "END_ENTITY;\n",
        ));
        let root = entity(&reg, "IFCROOT");
        let unique: Vec<_> = root.attributes.iter().map(|a| a.unique).collect();
        assert_eq!(unique, [true, false, false]);
        assert!(reg
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::MultiNameUnique));
    }

    #[test]
    fn test_multiple_supertypes_keep_first() {
        let reg = run(concat!(
            "ENTITY IfcBoth\n",
            " SUBTYPE OF (IfcA, IfcB);\n",
            "\tValue : REAL;\n",
            "END_ENTITY;\n",
        ));
        let both = entity(&reg, "IFCBOTH");
        assert_eq!(both.superclass.as_deref(), Some("IfcA"));
        assert_eq!(both.attributes.len(), 1);
        assert!(reg
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::MultipleSupertypes));
    }

    #[test]
    fn test_function_and_rule_bodies_are_skipped() {
        let reg = run(concat!(
            "SCHEMA IFC4;\n",
            "FUNCTION IfcDummy (Arg : INTEGER) : BOOLEAN;\n",
            "  ENTITY Fake;\n",
            "END_FUNCTION;\n",
            "RULE IfcSingleProject FOR (IfcProject);\n",
            "  TYPE Fake = STRING;\n",
            "END_RULE;\n",
            "ENTITY IfcReal;\nEND_ENTITY;\n",
            "END_SCHEMA;\n",
        ));
        assert_eq!(reg.schema_name.as_deref(), Some("IFC4"));
        assert_eq!(reg.entities.len(), 1);
        assert!(reg.types.is_empty());
    }

    #[test]
    fn test_derive_then_inverse() {
        let reg = run(concat!(
            "ENTITY IfcX;\n",
            "\tA : REAL;\n",
            " DERIVE\n",
            "\tB : REAL := A * 2.0;\n",
            " INVERSE\n",
            "\tUsedBy : SET OF IfcY FOR Target;\n",
            "END_ENTITY;\n",
        ));
        let x = entity(&reg, "IFCX");
        assert_eq!(x.attributes.len(), 1);
        assert_eq!(x.inverses.len(), 1);
    }

    #[test]
    fn test_malformed_bounds_are_ignored() {
        let reg = run("ENTITY IfcX;\n\tA : SET [1:x] OF REAL;\nEND_ENTITY;\n");
        let a = &entity(&reg, "IFCX").attributes[0];
        assert_eq!(a.cardinality, Cardinality::default());
        assert!(reg
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::MalformedCardinality));
    }

    #[test]
    fn test_inner_aggregate_bounds_are_kept() {
        let reg = run(concat!(
            "ENTITY IfcGrid;\n",
            "\tRows : SET [1:5] OF LIST [2:3] OF REAL;\n",
            "\tCells : ARRAY [1:2] OF ARRAY [1:3] OF REAL;\n",
            "\tDeep : SET [1:2] OF SET [1:2] OF SET [4:4] OF REAL;\n",
            "END_ENTITY;\n",
        ));
        let grid = entity(&reg, "IFCGRID");

        let rows = &grid.attributes[0];
        assert_eq!(rows.collection, CollectionKind::Set);
        assert_eq!(rows.cardinality, Cardinality::new(1, Some(5)));
        assert_eq!(rows.nested_cardinality, Cardinality::new(2, Some(3)));

        let cells = &grid.attributes[1];
        assert_eq!(cells.cardinality, Cardinality::new(1, Some(2)));
        assert_eq!(cells.nested_cardinality, Cardinality::new(1, Some(3)));

        let deep = &grid.attributes[2];
        assert_eq!(deep.nested_cardinality, Cardinality::new(1, Some(2)));
        let discarded = reg
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::MalformedCardinality)
            .count();
        assert_eq!(discarded, 1);
    }

    #[test]
    fn test_state_tracks_open_declaration() {
        let mut reg = SchemaRegistry::new();
        let mut machine = Machine::new();
        machine.feed_line("ENTITY IfcOpen;", &mut reg);
        assert_eq!(machine.state().name(), "EntityBody");
        machine.feed_line("END_ENTITY;", &mut reg);
        assert!(matches!(machine.state(), State::TopLevel));
    }
}
