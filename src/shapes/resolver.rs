//! Type Shape Resolver
//!
//! Flattens named and anonymous types of a [`SchemaRegistry`] into
//! [`EffectiveShape`]s. Base types are built eagerly (a derived shape copies
//! its base's slots), while nested element types are only reserved and
//! built afterwards from a worklist, so recursive content models terminate.
//!
//! Every reference is resolved in the context of the document that declared
//! it: a particle inherited from a base type keeps the origin of the base's
//! document, however far away the derived type is declared.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::{AttributeSlot, EffectiveShape, ElementSlot, ScalarType, ShapeArena, ShapeId, SlotContent};
use crate::error::{DefinitionKind, Error, Result, StructuralError};
use crate::namespaces::QName;
use crate::schema::builtins::{builtin_collapses_whitespace, builtin_kind, XSD_ANY_SIMPLE_TYPE, XSD_ANY_TYPE};
use crate::schema::{
    AttributeDecls, AttributeGroupDef, AttributeTarget, AttributeType, AttributeUse, ComplexContent,
    ComplexTypeDef, DerivationMethod, ElementDef, ElementTarget, ElementType, Facets, Global, GroupDef,
    ModelGroup, ModelType, Occurs, Origin, Particle, ScalarKind, SchemaRegistry, SimpleBase, SimpleTypeDef,
    SimpleVariety, TypeDef, WhiteSpace,
};

/// Document identity reported for lookups requested by the caller
const REQUEST: &str = "(request)";

/// Where a shape comes from
#[derive(Debug, Clone)]
enum ShapeSource<'r> {
    Global(&'r Global<TypeDef>),
    Anonymous(&'r ComplexTypeDef, &'r Arc<Origin>),
    Builtin(QName),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Global(usize),
    Anonymous(usize),
    Builtin(QName),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    Reserved,
    Building,
    Done,
}

/// What a complex type derives from
enum BaseShape {
    AnyType,
    Scalar(ScalarType),
    Complex(ShapeId),
}

/// Element slots collected from one particle tree
#[derive(Default)]
struct ContentModel {
    elements: Vec<ElementSlot>,
    preserve_unknown: bool,
}

/// Resolves types of one registry into memoized shapes
pub struct ShapeResolver<'r> {
    registry: &'r SchemaRegistry,
    arena: ShapeArena,
    sources: Vec<ShapeSource<'r>>,
    states: Vec<BuildState>,
    cache: HashMap<CacheKey, ShapeId>,
    pending: Vec<ShapeId>,
    building: Vec<ShapeId>,
    scalars: HashMap<usize, ScalarType>,
    scalar_stack: Vec<&'r Global<TypeDef>>,
}

impl<'r> ShapeResolver<'r> {
    /// Create a resolver over a loaded registry
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            arena: ShapeArena::new(),
            sources: Vec::new(),
            states: Vec::new(),
            cache: HashMap::new(),
            pending: Vec::new(),
            building: Vec::new(),
            scalars: HashMap::new(),
            scalar_stack: Vec::new(),
        }
    }

    /// The registry shapes are resolved from
    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// All shapes resolved so far
    pub fn shapes(&self) -> &ShapeArena {
        &self.arena
    }

    /// Take ownership of the resolved shapes
    pub fn into_shapes(self) -> ShapeArena {
        self.arena
    }

    /// Shape behind a handle
    pub fn shape(&self, id: ShapeId) -> Option<&EffectiveShape> {
        self.arena.get(id)
    }

    /// Resolve a named type (or XSD builtin) to its effective shape
    pub fn resolve(&mut self, type_ref: &QName) -> Result<ShapeId> {
        let checkpoint = self.arena.len();
        let result = self
            .type_source(type_ref, REQUEST)
            .and_then(|source| self.ensure_built(source))
            .and_then(|id| self.drain().map(|_| id));
        if result.is_err() {
            self.rollback(checkpoint);
        }
        result
    }

    /// Resolve a global element: its root tag and content
    pub fn resolve_element(&mut self, name: &QName) -> Result<ElementSlot> {
        let checkpoint = self.arena.len();
        let result = self.element_entry(name).and_then(|slot| self.drain().map(|_| slot));
        if result.is_err() {
            self.rollback(checkpoint);
        }
        result
    }

    fn element_entry(&mut self, name: &QName) -> Result<ElementSlot> {
        let registry = self.registry;
        let global = registry
            .element(name)
            .ok_or_else(|| unresolved(DefinitionKind::Element, name, REQUEST))?;
        let content = self.element_content(&global.definition, &global.origin)?;
        Ok(ElementSlot {
            name: name.clone(),
            key: name.local_name.clone(),
            content,
            occurs: Occurs::once(),
            nillable: global.definition.nillable,
            default: global.definition.default.clone().or_else(|| global.definition.fixed.clone()),
            origin: global.document().to_string(),
        })
    }

    fn rollback(&mut self, checkpoint: usize) {
        tracing::debug!(discarded = self.arena.len() - checkpoint, "rolling back failed resolution");
        self.arena.truncate(checkpoint);
        self.sources.truncate(checkpoint);
        self.states.truncate(checkpoint);
        self.cache.retain(|_, id| id.0 < checkpoint);
        self.pending.clear();
        self.building.clear();
        self.scalar_stack.clear();
    }

    /// Build every reserved shape
    fn drain(&mut self) -> Result<()> {
        while let Some(id) = self.pending.pop() {
            if self.states[id.0] == BuildState::Reserved {
                self.build(id)?;
            }
        }
        Ok(())
    }

    fn type_source(&self, name: &QName, referrer: &str) -> Result<ShapeSource<'r>> {
        if name.is_in(crate::XSD_NAMESPACE) {
            if name.local_name == XSD_ANY_TYPE || builtin_kind(&name.local_name).is_some() {
                return Ok(ShapeSource::Builtin(name.clone()));
            }
            return Err(unresolved(DefinitionKind::Type, name, referrer));
        }
        self.registry
            .type_def(name)
            .map(ShapeSource::Global)
            .ok_or_else(|| unresolved(DefinitionKind::Type, name, referrer))
    }

    /// Handle for a source, reserving a new shape on a cache miss
    fn shape_for(&mut self, source: ShapeSource<'r>) -> ShapeId {
        let key = match &source {
            ShapeSource::Global(global) => CacheKey::Global(*global as *const Global<TypeDef> as usize),
            ShapeSource::Anonymous(def, _) => CacheKey::Anonymous(*def as *const ComplexTypeDef as usize),
            ShapeSource::Builtin(name) => CacheKey::Builtin(name.clone()),
        };
        if let Some(id) = self.cache.get(&key) {
            tracing::trace!(shape = %id, "shape cache hit");
            return *id;
        }
        let id = self.arena.reserve();
        tracing::trace!(shape = %id, source = %source_name(&source), "shape cache miss");
        self.sources.push(source);
        self.states.push(BuildState::Reserved);
        self.cache.insert(key, id);
        self.pending.push(id);
        id
    }

    /// Handle for a source whose shape is complete on return
    fn ensure_built(&mut self, source: ShapeSource<'r>) -> Result<ShapeId> {
        let id = self.shape_for(source);
        match self.states[id.0] {
            BuildState::Done => Ok(id),
            BuildState::Building => Err(self.cycle_at(id)),
            BuildState::Reserved => {
                self.build(id)?;
                Ok(id)
            }
        }
    }

    fn cycle_at(&self, id: ShapeId) -> Error {
        let start = self.building.iter().position(|b| *b == id).unwrap_or(0);
        let mut chain: Vec<QName> = self.building[start..]
            .iter()
            .map(|b| source_name(&self.sources[b.0]))
            .collect();
        let name = source_name(&self.sources[id.0]);
        chain.push(name.clone());
        StructuralError::CyclicInheritance {
            name,
            chain,
            document: source_document(&self.sources[id.0]).to_string(),
        }
        .into()
    }

    fn build(&mut self, id: ShapeId) -> Result<()> {
        self.states[id.0] = BuildState::Building;
        self.building.push(id);
        self.registry.limits().check_derivation_depth(self.building.len())?;

        let shape = match self.sources[id.0].clone() {
            ShapeSource::Global(global) => match &global.definition {
                TypeDef::Complex(def) => self.build_complex(def, Some(global), &global.origin)?,
                TypeDef::Simple(_) => EffectiveShape {
                    name: Some(global.name.clone()),
                    text: Some(self.global_scalar(global)?),
                    origin: global.document().to_string(),
                    ..Default::default()
                },
            },
            ShapeSource::Anonymous(def, origin) => self.build_complex(def, None, origin)?,
            ShapeSource::Builtin(name) => build_builtin(name),
        };

        tracing::trace!(
            shape = %id,
            attributes = shape.attributes.len(),
            elements = shape.elements.len(),
            "shape built"
        );
        self.building.pop();
        self.arena.set(id, shape);
        self.states[id.0] = BuildState::Done;
        Ok(())
    }

    fn build_complex(
        &mut self,
        def: &'r ComplexTypeDef,
        global: Option<&'r Global<TypeDef>>,
        origin: &'r Arc<Origin>,
    ) -> Result<EffectiveShape> {
        let name = global.map(|g| g.name.clone());
        let owner = name.clone().unwrap_or_else(|| QName::local("(anonymous)"));
        let mut shape = EffectiveShape {
            name,
            mixed: def.mixed,
            abstract_type: def.abstract_type,
            namespaces: namespaces_of(origin),
            origin: origin.document.clone(),
            ..Default::default()
        };

        match &def.content {
            ComplexContent::Particles { particle, attributes } => {
                self.apply_attributes(&mut shape, attributes, origin)?;
                if let Some(particle) = particle {
                    let model = self.flatten_content(particle, origin, &owner)?;
                    shape.elements = model.elements;
                    shape.preserve_unknown = model.preserve_unknown;
                }
            }
            ComplexContent::Complex {
                method,
                base,
                particle,
                attributes,
            } => {
                match self.complex_base(base, global, origin)? {
                    BaseShape::AnyType => {}
                    BaseShape::Scalar(scalar) => shape.text = Some(scalar),
                    BaseShape::Complex(base_id) => self.inherit(&mut shape, base_id, *method),
                }
                self.apply_attributes(&mut shape, attributes, origin)?;
                let own = match particle {
                    Some(particle) => self.flatten_content(particle, origin, &owner)?,
                    None => ContentModel::default(),
                };
                match method {
                    DerivationMethod::Extension => {
                        for slot in own.elements {
                            push_element(&mut shape.elements, slot);
                        }
                        shape.preserve_unknown |= own.preserve_unknown;
                    }
                    DerivationMethod::Restriction => {
                        shape.elements = own.elements;
                        shape.preserve_unknown = own.preserve_unknown;
                    }
                }
            }
            ComplexContent::Simple {
                method,
                base,
                inline,
                facets,
                attributes,
            } => {
                match self.complex_base(base, global, origin)? {
                    BaseShape::AnyType => shape.text = Some(builtin_scalar(XSD_ANY_SIMPLE_TYPE).unwrap_or_else(string_scalar)),
                    BaseShape::Scalar(scalar) => shape.text = Some(scalar),
                    BaseShape::Complex(base_id) => {
                        self.inherit(&mut shape, base_id, DerivationMethod::Extension);
                        shape.elements.clear();
                    }
                }
                if *method == DerivationMethod::Restriction {
                    let restricted = match inline {
                        Some(inline) => Some(self.simple_scalar(inline, None, origin)?),
                        None => shape.text.take(),
                    };
                    shape.text = restricted.map(|mut scalar| {
                        scalar.facets = scalar.facets.restricted_by(facets);
                        scalar
                    });
                }
                self.apply_attributes(&mut shape, attributes, origin)?;
            }
        }

        assign_keys(&mut shape);
        Ok(shape)
    }

    /// Copy a base shape's slots into a derived one
    fn inherit(&self, shape: &mut EffectiveShape, base_id: ShapeId, method: DerivationMethod) {
        let base = &self.arena[base_id];
        shape.base = Some(base_id);
        shape.attributes = base.attributes.clone();
        for binding in &base.namespaces {
            if !shape.namespaces.contains(binding) {
                shape.namespaces.push(binding.clone());
            }
        }
        shape.text = base.text.clone();
        if method == DerivationMethod::Extension {
            shape.elements = base.elements.clone();
            shape.mixed |= base.mixed;
            shape.preserve_unknown = base.preserve_unknown;
        }
    }

    fn complex_base(
        &mut self,
        base: &QName,
        holder: Option<&'r Global<TypeDef>>,
        origin: &'r Arc<Origin>,
    ) -> Result<BaseShape> {
        if let Some(holder) = holder {
            if holder.name == *base {
                if let Some(previous) = holder.shadowed() {
                    return self.global_base(previous);
                }
            }
        }
        if base.is_in(crate::XSD_NAMESPACE) {
            if base.local_name == XSD_ANY_TYPE {
                return Ok(BaseShape::AnyType);
            }
            return builtin_scalar(&base.local_name)
                .map(BaseShape::Scalar)
                .ok_or_else(|| unresolved(DefinitionKind::Type, base, &origin.document));
        }
        let registry = self.registry;
        let global = registry
            .type_def(base)
            .ok_or_else(|| unresolved(DefinitionKind::Type, base, &origin.document))?;
        self.global_base(global)
    }

    fn global_base(&mut self, global: &'r Global<TypeDef>) -> Result<BaseShape> {
        match &global.definition {
            TypeDef::Simple(_) => Ok(BaseShape::Scalar(self.global_scalar(global)?)),
            TypeDef::Complex(_) => Ok(BaseShape::Complex(self.ensure_built(ShapeSource::Global(global))?)),
        }
    }

    fn apply_attributes(
        &mut self,
        shape: &mut EffectiveShape,
        decls: &'r AttributeDecls,
        origin: &'r Arc<Origin>,
    ) -> Result<()> {
        let mut own = Vec::new();
        let mut prohibited = Vec::new();
        self.collect_attributes(decls, origin, None, &mut own, &mut prohibited)?;
        shape.attributes.retain(|slot| !prohibited.contains(&slot.name));
        for slot in own {
            match shape.attributes.iter_mut().find(|s| s.name == slot.name) {
                Some(existing) => *existing = slot,
                None => shape.attributes.push(slot),
            }
        }
        Ok(())
    }

    fn collect_attributes(
        &mut self,
        decls: &'r AttributeDecls,
        origin: &'r Arc<Origin>,
        holder: Option<&'r Global<AttributeGroupDef>>,
        out: &mut Vec<AttributeSlot>,
        prohibited: &mut Vec<QName>,
    ) -> Result<()> {
        let registry = self.registry;

        for attr in &decls.attributes {
            let (name, def, def_origin) = match &attr.target {
                AttributeTarget::Name(local) => (origin.local_attribute_name(local, attr.form), attr, origin),
                AttributeTarget::Ref(name) => match registry.attribute(name) {
                    Some(global) => (name.clone(), &global.definition, &global.origin),
                    // xml:lang and friends without xml.xsd supplied
                    None if name.is_in(crate::XML_NAMESPACE) => (name.clone(), attr, origin),
                    None => return Err(unresolved(DefinitionKind::Attribute, name, &origin.document)),
                },
            };

            if attr.use_ == AttributeUse::Prohibited {
                prohibited.push(name);
                continue;
            }

            let scalar = match &def.type_def {
                Some(AttributeType::Named(type_name)) => self.scalar_type(type_name, &def_origin.document)?,
                Some(AttributeType::Inline(inline)) => self.simple_scalar(inline, None, def_origin)?,
                None => string_scalar(),
            };

            let slot = AttributeSlot {
                key: name.local_name.clone(),
                name,
                scalar,
                required: attr.use_ == AttributeUse::Required,
                default: attr.default.clone().or_else(|| def.default.clone()),
                fixed: attr.fixed.clone().or_else(|| def.fixed.clone()),
                origin: origin.document.clone(),
            };
            match out.iter_mut().find(|s| s.name == slot.name) {
                Some(existing) => *existing = slot,
                None => out.push(slot),
            }
        }

        for group_name in &decls.groups {
            let group = registry
                .referenced_attribute_group(holder, group_name)
                .ok_or_else(|| unresolved(DefinitionKind::AttributeGroup, group_name, &origin.document))?;
            self.collect_attributes(&group.definition.attributes, &group.origin, Some(group), out, prohibited)?;
        }

        Ok(())
    }

    fn flatten_content(&mut self, particle: &'r Particle, origin: &'r Arc<Origin>, owner: &QName) -> Result<ContentModel> {
        let mut model = ContentModel::default();
        self.flatten(particle, Occurs::once(), false, origin, None, owner, &mut model)?;
        Ok(model)
    }

    #[allow(clippy::too_many_arguments)]
    fn flatten(
        &mut self,
        particle: &'r Particle,
        outer: Occurs,
        in_choice: bool,
        origin: &'r Arc<Origin>,
        holder: Option<&'r Global<GroupDef>>,
        owner: &QName,
        model: &mut ContentModel,
    ) -> Result<()> {
        match particle {
            Particle::Element(def) => {
                let mut occurs = def.occurs.within(outer);
                if in_choice {
                    occurs = occurs.relaxed();
                }
                let slot = self.element_slot(def, origin, occurs)?;
                if !slot.occurs.is_empty() {
                    push_element(&mut model.elements, slot);
                }
            }
            Particle::GroupRef(group_ref) => {
                check_occurs(group_ref.occurs, &group_ref.name, &origin.document)?;
                let registry = self.registry;
                let group = registry
                    .referenced_group(holder, &group_ref.name)
                    .ok_or_else(|| unresolved(DefinitionKind::Group, &group_ref.name, &origin.document))?;
                self.flatten_group(
                    &group.definition.content,
                    group_ref.occurs.within(outer),
                    in_choice,
                    &group.origin,
                    Some(group),
                    &group.name,
                    model,
                )?;
            }
            Particle::Wildcard(wildcard) => {
                check_occurs(wildcard.occurs, &QName::local("any"), &origin.document)?;
                if !wildcard.occurs.is_empty() {
                    model.preserve_unknown = true;
                }
            }
            Particle::Container(group) => {
                self.flatten_group(group, outer, in_choice, origin, holder, owner, model)?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn flatten_group(
        &mut self,
        group: &'r ModelGroup,
        outer: Occurs,
        in_choice: bool,
        origin: &'r Arc<Origin>,
        holder: Option<&'r Global<GroupDef>>,
        owner: &QName,
        model: &mut ContentModel,
    ) -> Result<()> {
        check_occurs(group.occurs, owner, &origin.document)?;
        let combined = group.occurs.within(outer);
        let branches = in_choice || (group.model == ModelType::Choice && group.particles.len() > 1);
        for particle in &group.particles {
            self.flatten(particle, combined, branches, origin, holder, owner, model)?;
        }
        Ok(())
    }

    fn element_slot(&mut self, def: &'r ElementDef, origin: &'r Arc<Origin>, occurs: Occurs) -> Result<ElementSlot> {
        let registry = self.registry;
        let (name, decl, decl_origin) = match &def.target {
            ElementTarget::Name(local) => (origin.local_element_name(local, def.form), def, origin),
            ElementTarget::Ref(name) => {
                let global = registry
                    .element(name)
                    .ok_or_else(|| unresolved(DefinitionKind::Element, name, &origin.document))?;
                (name.clone(), &global.definition, &global.origin)
            }
        };
        check_occurs(def.occurs, &name, &origin.document)?;

        let content = self.element_content(decl, decl_origin)?;
        Ok(ElementSlot {
            key: name.local_name.clone(),
            name,
            content,
            occurs,
            nillable: decl.nillable,
            default: decl.default.clone().or_else(|| decl.fixed.clone()),
            origin: origin.document.clone(),
        })
    }

    fn element_content(&mut self, def: &'r ElementDef, origin: &'r Arc<Origin>) -> Result<SlotContent> {
        match &def.type_def {
            None => Ok(SlotContent::Complex(
                self.shape_for(ShapeSource::Builtin(QName::namespaced(crate::XSD_NAMESPACE, XSD_ANY_TYPE))),
            )),
            Some(ElementType::Named(type_name)) => match self.type_source(type_name, &origin.document)? {
                ShapeSource::Global(global) => match &global.definition {
                    TypeDef::Simple(_) => Ok(SlotContent::Scalar(self.global_scalar(global)?)),
                    TypeDef::Complex(_) => Ok(SlotContent::Complex(self.shape_for(ShapeSource::Global(global)))),
                },
                ShapeSource::Builtin(name) if name.local_name == XSD_ANY_TYPE => {
                    Ok(SlotContent::Complex(self.shape_for(ShapeSource::Builtin(name))))
                }
                ShapeSource::Builtin(name) => builtin_scalar(&name.local_name)
                    .map(SlotContent::Scalar)
                    .ok_or_else(|| unresolved(DefinitionKind::Type, &name, &origin.document)),
                ShapeSource::Anonymous(..) => Err(unresolved(DefinitionKind::Type, type_name, &origin.document)),
            },
            Some(ElementType::Complex(inline)) => Ok(SlotContent::Complex(
                self.shape_for(ShapeSource::Anonymous(&**inline, origin)),
            )),
            Some(ElementType::Simple(inline)) => Ok(SlotContent::Scalar(self.simple_scalar(inline, None, origin)?)),
        }
    }

    fn scalar_type(&mut self, name: &QName, referrer: &str) -> Result<ScalarType> {
        if name.is_in(crate::XSD_NAMESPACE) {
            if name.local_name == XSD_ANY_TYPE {
                return Ok(string_scalar());
            }
            return builtin_scalar(&name.local_name).ok_or_else(|| unresolved(DefinitionKind::Type, name, referrer));
        }
        let registry = self.registry;
        let global = registry
            .type_def(name)
            .ok_or_else(|| unresolved(DefinitionKind::Type, name, referrer))?;
        self.global_scalar(global)
    }

    fn global_scalar(&mut self, global: &'r Global<TypeDef>) -> Result<ScalarType> {
        let key = global as *const Global<TypeDef> as usize;
        if let Some(scalar) = self.scalars.get(&key) {
            return Ok(scalar.clone());
        }
        if let Some(start) = self.scalar_stack.iter().position(|g| std::ptr::eq(*g, global)) {
            let mut chain: Vec<QName> = self.scalar_stack[start..].iter().map(|g| g.name.clone()).collect();
            chain.push(global.name.clone());
            return Err(StructuralError::CyclicInheritance {
                name: global.name.clone(),
                chain,
                document: global.document().to_string(),
            }
            .into());
        }

        self.scalar_stack.push(global);
        let result = match &global.definition {
            TypeDef::Simple(def) => self.simple_scalar(def, Some(global), &global.origin),
            TypeDef::Complex(_) => self
                .ensure_built(ShapeSource::Global(global))
                .map(|id| self.arena[id].text.clone().unwrap_or_else(string_scalar)),
        };
        self.scalar_stack.pop();

        let scalar = result?;
        self.scalars.insert(key, scalar.clone());
        Ok(scalar)
    }

    fn simple_scalar(
        &mut self,
        def: &'r SimpleTypeDef,
        holder: Option<&'r Global<TypeDef>>,
        origin: &'r Arc<Origin>,
    ) -> Result<ScalarType> {
        match &def.variety {
            SimpleVariety::Restriction { base, facets } => {
                let base = self.simple_base(base, holder, origin)?;
                Ok(ScalarType {
                    facets: base.facets.restricted_by(facets),
                    ..base
                })
            }
            SimpleVariety::List { item } => {
                let item = self.simple_base(item, None, origin)?;
                Ok(ScalarType {
                    kind: ScalarKind::List(Box::new(item.kind)),
                    base: item.base,
                    facets: Facets {
                        white_space: Some(WhiteSpace::Collapse),
                        ..Facets::default()
                    },
                })
            }
            SimpleVariety::Union { members } => {
                let mut kinds = Vec::with_capacity(members.len());
                for member in members {
                    kinds.push(self.simple_base(member, None, origin)?.kind);
                }
                Ok(ScalarType {
                    kind: ScalarKind::Union(kinds),
                    base: QName::namespaced(crate::XSD_NAMESPACE, XSD_ANY_SIMPLE_TYPE),
                    facets: Facets {
                        white_space: Some(WhiteSpace::Collapse),
                        ..Facets::default()
                    },
                })
            }
        }
    }

    fn simple_base(
        &mut self,
        base: &'r SimpleBase,
        holder: Option<&'r Global<TypeDef>>,
        origin: &'r Arc<Origin>,
    ) -> Result<ScalarType> {
        match base {
            SimpleBase::Named(name) => {
                if let Some(previous) = holder.filter(|h| h.name == *name).and_then(|h| h.shadowed()) {
                    return self.global_scalar(previous);
                }
                self.scalar_type(name, &origin.document)
            }
            SimpleBase::Inline(def) => self.simple_scalar(def, None, origin),
        }
    }
}

fn unresolved(kind: DefinitionKind, name: &QName, document: &str) -> Error {
    StructuralError::UnresolvedReference {
        kind,
        name: name.clone(),
        document: document.to_string(),
    }
    .into()
}

fn check_occurs(occurs: Occurs, name: &QName, document: &str) -> Result<()> {
    match occurs.max {
        Some(max) if occurs.is_conflicting() => Err(StructuralError::ConflictingOccurs {
            name: name.clone(),
            min: occurs.min,
            max,
            document: document.to_string(),
        }
        .into()),
        _ => Ok(()),
    }
}

fn source_name(source: &ShapeSource<'_>) -> QName {
    match source {
        ShapeSource::Global(global) => global.name.clone(),
        ShapeSource::Anonymous(..) => QName::local("(anonymous)"),
        ShapeSource::Builtin(name) => name.clone(),
    }
}

fn source_document<'a>(source: &'a ShapeSource<'_>) -> &'a str {
    match source {
        ShapeSource::Global(global) => global.document(),
        ShapeSource::Anonymous(_, origin) => &origin.document,
        ShapeSource::Builtin(_) => REQUEST,
    }
}

fn string_scalar() -> ScalarType {
    ScalarType {
        kind: ScalarKind::String,
        base: QName::namespaced(crate::XSD_NAMESPACE, "string"),
        facets: Facets {
            white_space: Some(WhiteSpace::Preserve),
            ..Facets::default()
        },
    }
}

fn builtin_scalar(local_name: &str) -> Option<ScalarType> {
    let kind = builtin_kind(local_name)?;
    let white_space = if local_name == "normalizedString" {
        WhiteSpace::Replace
    } else if builtin_collapses_whitespace(local_name) {
        WhiteSpace::Collapse
    } else {
        WhiteSpace::Preserve
    };
    Some(ScalarType {
        kind,
        base: QName::namespaced(crate::XSD_NAMESPACE, local_name),
        facets: Facets {
            white_space: Some(white_space),
            ..Facets::default()
        },
    })
}

fn build_builtin(name: QName) -> EffectiveShape {
    if name.local_name == XSD_ANY_TYPE {
        return EffectiveShape {
            name: Some(name),
            mixed: true,
            preserve_unknown: true,
            origin: REQUEST.to_string(),
            ..Default::default()
        };
    }
    EffectiveShape {
        text: builtin_scalar(&name.local_name),
        name: Some(name),
        origin: REQUEST.to_string(),
        ..Default::default()
    }
}

fn namespaces_of(origin: &Origin) -> Vec<(String, String)> {
    origin
        .namespaces
        .iter()
        .filter(|(_, uri)| *uri != crate::XSD_NAMESPACE)
        .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
        .collect()
}

/// Add a slot, merging bounds with an earlier slot of the same name
fn push_element(elements: &mut Vec<ElementSlot>, slot: ElementSlot) {
    match elements.iter_mut().find(|existing| existing.name == slot.name) {
        Some(existing) => existing.occurs = existing.occurs.merged(slot.occurs),
        None => elements.push(slot),
    }
}

/// Record keys: local names, Clark names for clashing elements, `@` for attributes
fn assign_keys(shape: &mut EffectiveShape) {
    let mut used = HashSet::new();
    for slot in &mut shape.elements {
        slot.key = if used.contains(&slot.name.local_name) {
            slot.name.to_string()
        } else {
            slot.name.local_name.clone()
        };
        used.insert(slot.key.clone());
    }
    for slot in &mut shape.attributes {
        let local = &slot.name.local_name;
        slot.key = if !used.contains(local) {
            local.clone()
        } else if !used.contains(&format!("@{}", local)) {
            format!("@{}", local)
        } else {
            format!("@{}", slot.name)
        };
        used.insert(slot.key.clone());
    }
}
