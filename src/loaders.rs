//! Schema set loading
//!
//! The [`SchemaLoader`] takes every schema document the caller supplies,
//! follows the import/include/redefine/override directives between them and
//! merges their components into one [`SchemaRegistry`]. It never fetches
//! anything: directive targets are matched against the supplied documents
//! by resolved location, then by file name, then (for imports) by target
//! namespace.
//!
//! Documents are processed depth-first in post-order from the entry
//! document, so a redefined document is always registered before the
//! redefinitions that shadow it.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::Location;
use crate::schema::{DirectiveKind, SchemaDirective, SchemaDocument, SchemaRegistry};

/// Collects supplied schema documents and builds registries from them
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    /// Supplied documents by identity, in the order they were added
    documents: IndexMap<String, Arc<SchemaDocument>>,
    /// Resource limits
    limits: Limits,
}

impl SchemaLoader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self {
            documents: IndexMap::new(),
            limits: Limits::default(),
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Supply a parsed document
    pub fn add_document(&mut self, document: SchemaDocument) -> &mut Self {
        self.add_shared(Arc::new(document))
    }

    /// Supply a document that is shared with other loaders
    pub fn add_shared(&mut self, document: Arc<SchemaDocument>) -> &mut Self {
        tracing::trace!(document = %document.id, "schema document supplied");
        self.documents.insert(document.id.clone(), document);
        self
    }

    /// Parse XSD text and supply it under `id`
    pub fn add_source(&mut self, id: impl Into<String>, xsd: &str) -> Result<&mut Self> {
        self.limits.check_xml_size(xsd.len())?;
        let document = SchemaDocument::parse(id, xsd)?;
        Ok(self.add_document(document))
    }

    /// Number of supplied documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if no document has been supplied
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// A supplied document by identity
    pub fn document(&self, id: &str) -> Option<&Arc<SchemaDocument>> {
        self.documents.get(id)
    }

    /// Build the registry reachable from `entry`
    pub fn load(&self, entry: &str) -> Result<SchemaRegistry> {
        let document = self
            .documents
            .get(entry)
            .cloned()
            .ok_or_else(|| Error::Resource(format!("Entry schema document '{}' was not supplied", entry)))?;

        let mut state = LoadState::new(self);
        state.visit(document, None)?;
        state.finish()
    }

    /// Build one registry from every supplied document
    pub fn load_all(&self) -> Result<SchemaRegistry> {
        let mut state = LoadState::new(self);
        for document in self.documents.values() {
            if !state.visited.contains_key(&(document.id.clone(), None)) {
                state.visit(document.clone(), None)?;
            }
        }
        state.finish()
    }

    /// Find the supplied document a directive in `from` refers to
    fn find_target(&self, from: &SchemaDocument, directive: &SchemaDirective) -> Option<Arc<SchemaDocument>> {
        if let Some(location) = &directive.schema_location {
            let resolved = Location::parse(&from.id).join(location);
            let resolved_str = resolved.as_str();

            if let Some(doc) = self
                .documents
                .values()
                .find(|doc| Location::parse(&doc.id).as_str() == resolved_str)
            {
                return Some(doc.clone());
            }

            if let Some(file_name) = resolved.file_name() {
                let mut by_name = self
                    .documents
                    .values()
                    .filter(|doc| Location::parse(&doc.id).file_name().as_deref() == Some(file_name.as_str()));
                let found = match directive.kind {
                    DirectiveKind::Import => by_name.find(|doc| doc.target_namespace == directive.namespace),
                    _ => by_name.next(),
                };
                if found.is_some() {
                    return found.cloned();
                }
            }
        }

        if directive.kind == DirectiveKind::Import {
            return self
                .documents
                .values()
                .find(|doc| doc.id != from.id && doc.target_namespace == directive.namespace)
                .cloned();
        }

        None
    }
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// Key of a processed document: identity plus adopted chameleon namespace
type VisitKey = (String, Option<String>);

struct LoadState<'a> {
    loader: &'a SchemaLoader,
    registry: SchemaRegistry,
    visited: HashMap<VisitKey, VisitState>,
}

impl<'a> LoadState<'a> {
    fn new(loader: &'a SchemaLoader) -> Self {
        Self {
            loader,
            registry: SchemaRegistry::new(loader.limits.clone()),
            visited: HashMap::new(),
        }
    }

    fn visit(&mut self, document: Arc<SchemaDocument>, adopted: Option<String>) -> Result<()> {
        let key = (document.id.clone(), adopted);
        self.visited.insert(key.clone(), VisitState::InProgress);

        for directive in &document.directives {
            let target = match self.loader.find_target(&document, directive) {
                Some(target) => target,
                None => {
                    tracing::warn!(
                        document = %document.id,
                        kind = %directive.kind,
                        location = ?directive.schema_location,
                        namespace = ?directive.namespace,
                        "directive target was not supplied"
                    );
                    continue;
                }
            };

            let (target, target_key) = self.prepare_target(&document, directive, target)?;
            self.registry.add_edge(&document.id, &target.id, directive.kind);

            match self.visited.get(&target_key) {
                Some(VisitState::Done) => {}
                Some(VisitState::InProgress) => {
                    tracing::trace!(from = %document.id, to = %target.id, "directive cycle");
                }
                None => self.visit(target, target_key.1)?,
            }
        }

        let origin = self.registry.register_document(&document)?;
        for directive in &document.directives {
            if matches!(directive.kind, DirectiveKind::Redefine | DirectiveKind::Override) {
                self.registry.register_redefinitions(&directive.components, &origin)?;
            }
        }

        self.visited.insert(key, VisitState::Done);
        Ok(())
    }

    /// Apply chameleon adoption and check namespace agreement of a target
    fn prepare_target(
        &self,
        from: &SchemaDocument,
        directive: &SchemaDirective,
        target: Arc<SchemaDocument>,
    ) -> Result<(Arc<SchemaDocument>, VisitKey)> {
        if directive.kind == DirectiveKind::Import {
            if target.target_namespace != directive.namespace {
                return Err(Error::Namespace(format!(
                    "'{}' imports namespace {:?} but '{}' has target namespace {:?}",
                    from.id, directive.namespace, target.id, target.target_namespace
                )));
            }
            let key = (target.id.clone(), None);
            return Ok((target, key));
        }

        match (&from.target_namespace, &target.target_namespace) {
            (Some(namespace), None) => {
                tracing::debug!(from = %from.id, to = %target.id, namespace = %namespace, "chameleon include");
                let key = (target.id.clone(), Some(namespace.clone()));
                Ok((Arc::new(target.with_chameleon_namespace(namespace)), key))
            }
            (ours, theirs) if ours == theirs => {
                let key = (target.id.clone(), None);
                Ok((target, key))
            }
            (ours, theirs) => Err(Error::Namespace(format!(
                "'{}' {}s '{}' whose target namespace {:?} differs from {:?}",
                from.id, directive.kind, target.id, theirs, ours
            ))),
        }
    }

    fn finish(self) -> Result<SchemaRegistry> {
        self.registry.check_acyclic()?;
        tracing::debug!(
            documents = self.registry.documents().count(),
            components = self.registry.globals().len(),
            "schema registry built"
        );
        Ok(self.registry)
    }
}
