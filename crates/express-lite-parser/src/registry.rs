// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-parse schema registries
//!
//! Everything a single schema load mutates lives here, so concurrent loads
//! of different schemas never share state.

use express_lite_model::names::format_class_name;
use express_lite_model::{
    name_map, Diagnostic, DiagnosticKind, Entity, EntityId, NameMap, NamedIndividual,
    PrimitiveKind, PropertyRegistry, SiblingIndex, TypeDecl,
};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use serde::{Deserialize, Serialize};

/// Select types listing each built-in, in resolution order
pub type PrimitiveSelects = IndexMap<PrimitiveKind, Vec<String>, FxBuildHasher>;

/// Memo of raw token to canonical class name
#[derive(Debug, Default)]
pub struct ClassNameCache {
    formatted: FxHashMap<String, String>,
}

impl ClassNameCache {
    pub fn format(&mut self, raw: &str) -> String {
        if let Some(key) = self.formatted.get(raw) {
            return key.clone();
        }
        let key = format_class_name(raw);
        self.formatted.insert(raw.to_string(), key.clone());
        key
    }

    pub fn len(&self) -> usize {
        self.formatted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatted.is_empty()
    }
}

/// Mutable registries filled by the state machine and the structure passes
#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaRegistry {
    pub schema_name: Option<String>,
    pub entities: NameMap<Entity>,
    pub types: NameMap<TypeDecl>,
    pub siblings: SiblingIndex,
    pub properties: PropertyRegistry,
    pub individuals: Vec<NamedIndividual>,
    pub primitive_selects: PrimitiveSelects,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    names: ClassNameCache,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self {
            schema_name: None,
            entities: name_map(),
            types: name_map(),
            siblings: SiblingIndex::default(),
            properties: PropertyRegistry::new(),
            individuals: Vec::new(),
            primitive_selects: IndexMap::with_hasher(FxBuildHasher),
            diagnostics: Vec::new(),
            names: ClassNameCache::default(),
        }
    }
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical key for a raw name, memoized
    pub fn canonical(&mut self, raw: &str) -> String {
        self.names.format(raw)
    }

    /// Entity registered under `name`, created on first reference
    pub fn entity_or_insert(&mut self, name: &str) -> EntityId {
        let key = self.canonical(name);
        let entry = self.entities.entry(key);
        let id = EntityId::from(entry.index());
        entry.or_insert_with(|| Entity::new(name));
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get_index(id.index()).map(|(_, e)| e)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_index_mut(id.index()).map(|(_, e)| e)
    }

    /// Index of the type registered under `name`, created on first reference
    pub fn type_or_insert(&mut self, name: &str) -> usize {
        let key = self.canonical(name);
        let entry = self.types.entry(key);
        let index = entry.index();
        entry.or_insert_with(|| TypeDecl::new(name));
        index
    }

    pub fn type_mut(&mut self, index: usize) -> Option<&mut TypeDecl> {
        self.types.get_index_mut(index).map(|(_, t)| t)
    }

    /// Record a recoverable problem
    pub fn diagnose(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(kind, message);
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}
