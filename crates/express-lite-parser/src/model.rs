// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ParsedSchema - resolved EXPRESS schema implementing `SchemaModel`

use crate::machine::{Machine, State};
use crate::registry::SchemaRegistry;
use crate::scanner::{CommentStripper, SchemaScanner};
use crate::structure::StructureBuilder;

use express_lite_model::{
    Diagnostic, Entity, NameMap, NamedIndividual, PrimitiveKind, ProgressCallback,
    PropertyRegistry, Result, SchemaError, SchemaModel, SiblingIndex, TypeDecl,
};
use serde::Serialize;
use std::io::{self, BufRead};

/// Feeds lines through the state machine into a fresh registry
struct Loader {
    registry: SchemaRegistry,
    machine: Machine,
    comments: Option<CommentStripper>,
    lines: usize,
}

impl Loader {
    fn new(strip_comments: bool) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            machine: Machine::new(),
            comments: strip_comments.then(CommentStripper::new),
            lines: 0,
        }
    }

    fn feed(&mut self, line: &str) {
        self.lines += 1;
        match self.comments.as_mut() {
            Some(stripper) => {
                let line = stripper.strip(line);
                self.machine.feed_line(&line, &mut self.registry);
            }
            None => self.machine.feed_line(line, &mut self.registry),
        }
    }

    fn finish(self, build_structure: bool, on_progress: &dyn Fn(&str, f32)) -> ParsedSchema {
        let state = self.machine.state();
        if !matches!(state, State::TopLevel) {
            log::warn!("schema text ended inside a declaration ({})", state.name());
        }

        let mut registry = self.registry;
        log::debug!(
            "read {} lines: {} entities, {} types",
            self.lines,
            registry.entities.len(),
            registry.types.len()
        );

        if build_structure {
            StructureBuilder::new(&mut registry).build(on_progress, 30.0, 100.0);
        }
        on_progress("Complete", 100.0);

        if !registry.diagnostics.is_empty() {
            log::info!("schema loaded with {} diagnostics", registry.diagnostics.len());
        }
        ParsedSchema { registry }
    }
}

/// Resolved schema implementing the `SchemaModel` trait
///
/// Built once per input and immutable afterwards.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ParsedSchema {
    registry: SchemaRegistry,
}

impl ParsedSchema {
    /// Parse schema text
    pub fn parse(content: &str, build_structure: bool, strip_comments: bool) -> Result<Self> {
        Self::parse_with_progress(
            content,
            build_structure,
            strip_comments,
            Box::new(|_: &str, _: f32| {}),
        )
    }

    /// Parse with progress reporting
    pub fn parse_with_progress(
        content: &str,
        build_structure: bool,
        strip_comments: bool,
        on_progress: ProgressCallback,
    ) -> Result<Self> {
        on_progress("Reading declarations", 0.0);

        let mut loader = Loader::new(false);
        let scanner = if strip_comments {
            SchemaScanner::new(content)
        } else {
            SchemaScanner::raw(content)
        };
        for line in scanner {
            loader.feed(&line);
        }

        Ok(loader.finish(build_structure, &*on_progress))
    }

    /// Parse from an already split sequence of lines
    pub fn from_lines<I, S>(lines: I, build_structure: bool, strip_comments: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut loader = Loader::new(strip_comments);
        for line in lines {
            loader.feed(line.as_ref());
        }
        loader.finish(build_structure, &|_: &str, _: f32| {})
    }

    /// Parse from a buffered reader
    ///
    /// Fails only when the stream cannot be read; everything the stream
    /// contains is handled through diagnostics.
    pub fn from_reader<R: BufRead>(
        reader: R,
        build_structure: bool,
        strip_comments: bool,
    ) -> Result<Self> {
        let mut loader = Loader::new(strip_comments);
        for line in reader.lines() {
            let line = line.map_err(|err| match err.kind() {
                io::ErrorKind::InvalidData => {
                    SchemaError::format(format!("schema is not valid UTF-8: {err}"))
                }
                _ => SchemaError::Io(err),
            })?;
            loader.feed(&line);
        }
        Ok(loader.finish(build_structure, &|_: &str, _: f32| {}))
    }

    /// Underlying registries
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Render the model as JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SchemaError::other(e.to_string()))
    }
}

impl SchemaModel for ParsedSchema {
    fn schema_name(&self) -> Option<&str> {
        self.registry.schema_name.as_deref()
    }

    fn entities(&self) -> &NameMap<Entity> {
        &self.registry.entities
    }

    fn types(&self) -> &NameMap<TypeDecl> {
        &self.registry.types
    }

    fn siblings(&self) -> &SiblingIndex {
        &self.registry.siblings
    }

    fn named_individuals(&self) -> &[NamedIndividual] {
        &self.registry.individuals
    }

    fn properties(&self) -> &PropertyRegistry {
        &self.registry.properties
    }

    fn primitive_selects(&self, kind: PrimitiveKind) -> &[String] {
        self.registry
            .primitive_selects
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn diagnostics(&self) -> &[Diagnostic] {
        &self.registry.diagnostics
    }
}
