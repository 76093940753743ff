//! Global component registry
//!
//! The [`SchemaRegistry`] merges the top-level components of every loaded
//! document into one map per definition kind, keyed by qualified name.
//! Each entry remembers the document it came from ([`Origin`]) so that
//! local declarations reached through it are named with the right form
//! defaults and diagnostics point at the declaring document.
//!
//! Redefinitions (`xs:redefine`, `xs:override`) shadow the definition they
//! replace; the replaced definition is kept as `previous` so a redefined
//! type or group can still refer to its original.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{DefinitionKind, Result, StructuralError};
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};

use super::attributes::{AttributeDecls, AttributeDef, AttributeGroupDef};
use super::elements::ElementDef;
use super::groups::GroupDef;
use super::particles::Particle;
use super::schemas::{Components, DirectiveKind, FormDefault, SchemaDocument, TypeDef};

/// Context of the document a global component was declared in
#[derive(Debug, Clone, PartialEq)]
pub struct Origin {
    /// Document identity
    pub document: String,
    /// Target namespace of the document (after chameleon adoption)
    pub target_namespace: Option<String>,
    /// Form default for local elements
    pub element_form_default: FormDefault,
    /// Form default for local attributes
    pub attribute_form_default: FormDefault,
    /// Prefix bindings of the schema element
    pub namespaces: NamespaceContext,
}

impl Origin {
    /// Origin of components declared in `doc`
    pub fn of(doc: &SchemaDocument) -> Self {
        Self {
            document: doc.id.clone(),
            target_namespace: doc.target_namespace.clone(),
            element_form_default: doc.element_form_default,
            attribute_form_default: doc.attribute_form_default,
            namespaces: doc.namespaces.clone(),
        }
    }

    /// Name of a global component
    pub fn qualify(&self, local_name: &str) -> QName {
        QName::new(self.target_namespace.clone(), local_name)
    }

    /// Name of a local element declaration
    pub fn local_element_name(&self, local_name: &str, form: Option<FormDefault>) -> QName {
        match form.unwrap_or(self.element_form_default) {
            FormDefault::Qualified => self.qualify(local_name),
            FormDefault::Unqualified => QName::local(local_name),
        }
    }

    /// Name of a local attribute declaration
    pub fn local_attribute_name(&self, local_name: &str, form: Option<FormDefault>) -> QName {
        match form.unwrap_or(self.attribute_form_default) {
            FormDefault::Qualified => self.qualify(local_name),
            FormDefault::Unqualified => QName::local(local_name),
        }
    }
}

/// A registered top-level component
#[derive(Debug, Clone)]
pub struct Global<T> {
    /// Qualified name
    pub name: QName,
    /// The definition itself
    pub definition: T,
    /// Declaring document
    pub origin: Arc<Origin>,
    /// Whether this entry came from a redefine/override block
    pub redefinition: bool,
    /// Definition shadowed by this redefinition
    pub previous: Option<Box<Global<T>>>,
}

impl<T> Global<T> {
    /// Document that declared this component
    pub fn document(&self) -> &str {
        &self.origin.document
    }

    /// The definition a self-reference inside this one points at
    pub fn shadowed(&self) -> Option<&Global<T>> {
        self.previous.as_deref()
    }
}

/// Global components of all kinds, keyed by qualified name
#[derive(Debug, Clone, Default)]
pub struct GlobalMaps {
    /// Global element declarations
    pub elements: IndexMap<QName, Global<ElementDef>>,
    /// Global attribute declarations
    pub attributes: IndexMap<QName, Global<AttributeDef>>,
    /// Named simple and complex types
    pub types: IndexMap<QName, Global<TypeDef>>,
    /// Named model groups
    pub groups: IndexMap<QName, Global<GroupDef>>,
    /// Named attribute groups
    pub attribute_groups: IndexMap<QName, Global<AttributeGroupDef>>,
}

impl GlobalMaps {
    /// Create empty maps
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of registered components
    pub fn len(&self) -> usize {
        self.elements.len()
            + self.attributes.len()
            + self.types.len()
            + self.groups.len()
            + self.attribute_groups.len()
    }

    /// Check if no component is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An import/include/redefine edge between two loaded documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEdge {
    /// Document holding the directive
    pub from: String,
    /// Document the directive resolved to
    pub to: String,
    /// Directive kind
    pub kind: DirectiveKind,
}

/// The merged, namespace-qualified registry of a loaded schema set
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    globals: GlobalMaps,
    documents: IndexMap<String, Arc<Origin>>,
    edges: Vec<DocumentEdge>,
    limits: Limits,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Limits the registry was built with
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// All registered components
    pub fn globals(&self) -> &GlobalMaps {
        &self.globals
    }

    /// Identities of the loaded documents in processing order
    pub fn documents(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(|id| id.as_str())
    }

    /// Origin of a loaded document
    pub fn origin(&self, document: &str) -> Option<&Arc<Origin>> {
        self.documents.get(document)
    }

    /// Directive edges between loaded documents
    pub fn edges(&self) -> &[DocumentEdge] {
        &self.edges
    }

    /// Look up a global element
    pub fn element(&self, name: &QName) -> Option<&Global<ElementDef>> {
        self.globals.elements.get(name)
    }

    /// Look up a global attribute
    pub fn attribute(&self, name: &QName) -> Option<&Global<AttributeDef>> {
        self.globals.attributes.get(name)
    }

    /// Look up a named type
    pub fn type_def(&self, name: &QName) -> Option<&Global<TypeDef>> {
        self.globals.types.get(name)
    }

    /// Look up a named model group
    pub fn group(&self, name: &QName) -> Option<&Global<GroupDef>> {
        self.globals.groups.get(name)
    }

    /// Look up a named attribute group
    pub fn attribute_group(&self, name: &QName) -> Option<&Global<AttributeGroupDef>> {
        self.globals.attribute_groups.get(name)
    }

    pub(crate) fn add_edge(&mut self, from: &str, to: &str, kind: DirectiveKind) {
        tracing::trace!(from, to, %kind, "schema edge");
        self.edges.push(DocumentEdge {
            from: from.to_string(),
            to: to.to_string(),
            kind,
        });
    }

    /// Register a document's own top-level components
    pub(crate) fn register_document(&mut self, doc: &SchemaDocument) -> Result<Arc<Origin>> {
        self.limits.check_schema_documents(self.documents.len() + 1)?;
        let origin = Arc::new(Origin::of(doc));
        self.documents.insert(doc.id.clone(), origin.clone());
        self.register_components(&doc.components, &origin, false)?;
        tracing::debug!(
            document = %doc.id,
            namespace = ?doc.target_namespace,
            components = doc.components.len(),
            "registered schema document"
        );
        Ok(origin)
    }

    /// Register the components of a redefine/override block
    pub(crate) fn register_redefinitions(&mut self, components: &Components, origin: &Arc<Origin>) -> Result<()> {
        self.register_components(components, origin, true)
    }

    fn register_components(&mut self, components: &Components, origin: &Arc<Origin>, redefinition: bool) -> Result<()> {
        for (name, def) in &components.elements {
            register(&mut self.globals.elements, DefinitionKind::Element, origin.qualify(name), def, origin, redefinition)?;
        }
        for (name, def) in &components.attributes {
            register(&mut self.globals.attributes, DefinitionKind::Attribute, origin.qualify(name), def, origin, redefinition)?;
        }
        for (name, def) in &components.types {
            register(&mut self.globals.types, DefinitionKind::Type, origin.qualify(name), def, origin, redefinition)?;
        }
        for (name, def) in &components.groups {
            register(&mut self.globals.groups, DefinitionKind::Group, origin.qualify(name), def, origin, redefinition)?;
        }
        for (name, def) in &components.attribute_groups {
            register(
                &mut self.globals.attribute_groups,
                DefinitionKind::AttributeGroup,
                origin.qualify(name),
                def,
                origin,
                redefinition,
            )?;
        }
        Ok(())
    }

    /// One-time check that derivation and group reference graphs are acyclic
    pub fn check_acyclic(&self) -> Result<()> {
        for global in self.globals.types.values() {
            self.check_derivation_chain(global)?;
        }
        for global in self.globals.groups.values() {
            let mut stack = Vec::new();
            self.check_group(global, &mut stack)?;
        }
        for global in self.globals.attribute_groups.values() {
            let mut stack = Vec::new();
            self.check_attribute_group(global, &mut stack)?;
        }
        Ok(())
    }

    /// Base type a derivation step refers to, honouring redefinition
    pub fn base_of<'a>(&'a self, global: &'a Global<TypeDef>) -> Option<&'a Global<TypeDef>> {
        let base = global.definition.base_name()?;
        if *base == global.name {
            if let Some(previous) = global.shadowed() {
                return Some(previous);
            }
        }
        self.type_def(base)
    }

    fn check_derivation_chain(&self, start: &Global<TypeDef>) -> Result<()> {
        let mut seen: HashSet<*const Global<TypeDef>> = HashSet::new();
        let mut chain = vec![start.name.clone()];
        let mut current = start;
        seen.insert(current as *const _);

        while let Some(next) = self.base_of(current) {
            chain.push(next.name.clone());
            if !seen.insert(next as *const _) {
                return Err(StructuralError::CyclicInheritance {
                    name: start.name.clone(),
                    chain,
                    document: start.document().to_string(),
                }
                .into());
            }
            self.limits.check_derivation_depth(chain.len())?;
            current = next;
        }
        Ok(())
    }

    /// Group a reference inside `holder` points at, honouring redefinition
    pub fn referenced_group<'a>(&'a self, holder: Option<&'a Global<GroupDef>>, name: &QName) -> Option<&'a Global<GroupDef>> {
        if let Some(holder) = holder {
            if holder.name == *name {
                if let Some(previous) = holder.shadowed() {
                    return Some(previous);
                }
            }
        }
        self.group(name)
    }

    /// Attribute group a reference inside `holder` points at, honouring redefinition
    pub fn referenced_attribute_group<'a>(
        &'a self,
        holder: Option<&'a Global<AttributeGroupDef>>,
        name: &QName,
    ) -> Option<&'a Global<AttributeGroupDef>> {
        if let Some(holder) = holder {
            if holder.name == *name {
                if let Some(previous) = holder.shadowed() {
                    return Some(previous);
                }
            }
        }
        self.attribute_group(name)
    }

    fn check_group<'a>(&'a self, global: &'a Global<GroupDef>, stack: &mut Vec<&'a Global<GroupDef>>) -> Result<()> {
        if let Some(pos) = stack.iter().position(|g| std::ptr::eq(*g, global)) {
            let mut chain: Vec<QName> = stack[pos..].iter().map(|g| g.name.clone()).collect();
            chain.push(global.name.clone());
            return Err(StructuralError::CyclicGroup {
                name: global.name.clone(),
                chain,
                document: global.document().to_string(),
            }
            .into());
        }
        stack.push(global);
        let mut refs = Vec::new();
        collect_group_refs(&global.definition.content.particles, &mut refs);
        for name in refs {
            if let Some(target) = self.referenced_group(Some(global), name) {
                self.check_group(target, stack)?;
            }
        }
        stack.pop();
        Ok(())
    }

    fn check_attribute_group<'a>(
        &'a self,
        global: &'a Global<AttributeGroupDef>,
        stack: &mut Vec<&'a Global<AttributeGroupDef>>,
    ) -> Result<()> {
        if let Some(pos) = stack.iter().position(|g| std::ptr::eq(*g, global)) {
            let mut chain: Vec<QName> = stack[pos..].iter().map(|g| g.name.clone()).collect();
            chain.push(global.name.clone());
            return Err(StructuralError::CyclicGroup {
                name: global.name.clone(),
                chain,
                document: global.document().to_string(),
            }
            .into());
        }
        stack.push(global);
        let decls: &AttributeDecls = &global.definition.attributes;
        for name in &decls.groups {
            if let Some(target) = self.referenced_attribute_group(Some(global), name) {
                self.check_attribute_group(target, stack)?;
            }
        }
        stack.pop();
        Ok(())
    }
}

/// Group references of a particle tree, not descending into element declarations
fn collect_group_refs<'a>(particles: &'a [Particle], out: &mut Vec<&'a QName>) {
    for particle in particles {
        match particle {
            Particle::GroupRef(group) => out.push(&group.name),
            Particle::Container(container) => collect_group_refs(&container.particles, out),
            Particle::Element(_) | Particle::Wildcard(_) => {}
        }
    }
}

fn register<T: Clone + PartialEq>(
    map: &mut IndexMap<QName, Global<T>>,
    kind: DefinitionKind,
    name: QName,
    definition: &T,
    origin: &Arc<Origin>,
    redefinition: bool,
) -> Result<()> {
    let entry = Global {
        name: name.clone(),
        definition: definition.clone(),
        origin: origin.clone(),
        redefinition,
        previous: None,
    };

    let existing = match map.get_mut(&name) {
        None => {
            map.insert(name, entry);
            return Ok(());
        }
        Some(existing) => existing,
    };

    if redefinition {
        tracing::debug!(
            %kind,
            name = %name,
            document = %origin.document,
            shadowed = %existing.origin.document,
            "redefinition shadows earlier definition"
        );
        let previous = std::mem::replace(existing, entry);
        existing.previous = Some(Box::new(previous));
        return Ok(());
    }

    if existing.redefinition {
        // The original arrived after its redefinition
        if existing.previous.is_none() {
            existing.previous = Some(Box::new(entry));
        }
        return Ok(());
    }

    if existing.definition == *definition {
        tracing::trace!(%kind, name = %name, document = %origin.document, "identical definition ignored");
        return Ok(());
    }

    Err(StructuralError::DuplicateDefinition {
        kind,
        name,
        document: origin.document.clone(),
        previous: existing.origin.document.clone(),
    }
    .into())
}
