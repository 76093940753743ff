//! XSD Document Parsing
//!
//! This module parses XSD text into a [`SchemaDocument`]. QName-valued
//! attributes (`type`, `ref`, `base`, `itemType`, `memberTypes`,
//! `substitutionGroup`) are resolved against the prefix bindings in scope
//! on the XML element that carries them, so every reference in the model
//! already holds the namespace of its declaration site.

use indexmap::IndexMap;

use super::attributes::{
    AttributeDecls, AttributeDef, AttributeGroupDef, AttributeTarget, AttributeType, AttributeUse,
};
use super::complex_types::{ComplexContent, ComplexTypeDef, DerivationMethod};
use super::elements::{ElementDef, ElementTarget, ElementType};
use super::groups::{GroupDef, ModelGroup, ModelType};
use super::particles::{parse_occurs, GroupRef, Occurs, Particle};
use super::schemas::{Components, DirectiveKind, FormDefault, SchemaDirective, SchemaDocument, TypeDef};
use super::simple_types::{Facets, SimpleBase, SimpleTypeDef, SimpleVariety, WhiteSpace};
use super::wildcards::{ProcessContents, Wildcard};

use crate::documents::{Document, Element};
use crate::error::{Error, ParseError, Result};
use crate::names::{validate_ncname, validate_qname};
use crate::namespaces::QName;

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const ATTRIBUTE_GROUP: &str = "attributeGroup";
    pub const GROUP: &str = "group";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const ANNOTATION: &str = "annotation";
    pub const IMPORT: &str = "import";
    pub const INCLUDE: &str = "include";
    pub const REDEFINE: &str = "redefine";
    pub const OVERRIDE: &str = "override";
    pub const RESTRICTION: &str = "restriction";
    pub const EXTENSION: &str = "extension";
    pub const LIST: &str = "list";
    pub const UNION: &str = "union";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
    pub const ANY: &str = "any";
    pub const ANY_ATTRIBUTE: &str = "anyAttribute";
    // Facets
    pub const PATTERN: &str = "pattern";
    pub const ENUMERATION: &str = "enumeration";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const LENGTH: &str = "length";
    pub const MIN_INCLUSIVE: &str = "minInclusive";
    pub const MAX_INCLUSIVE: &str = "maxInclusive";
    pub const MIN_EXCLUSIVE: &str = "minExclusive";
    pub const MAX_EXCLUSIVE: &str = "maxExclusive";
    pub const TOTAL_DIGITS: &str = "totalDigits";
    pub const FRACTION_DIGITS: &str = "fractionDigits";
    pub const WHITE_SPACE: &str = "whiteSpace";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const ELEMENT_FORM_DEFAULT: &str = "elementFormDefault";
    pub const ATTRIBUTE_FORM_DEFAULT: &str = "attributeFormDefault";
    pub const FORM: &str = "form";
    pub const NILLABLE: &str = "nillable";
    pub const DEFAULT: &str = "default";
    pub const FIXED: &str = "fixed";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const MIXED: &str = "mixed";
    pub const ABSTRACT: &str = "abstract";
    pub const SUBSTITUTION_GROUP: &str = "substitutionGroup";
    pub const NAMESPACE: &str = "namespace";
    pub const SCHEMA_LOCATION: &str = "schemaLocation";
    pub const ITEM_TYPE: &str = "itemType";
    pub const MEMBER_TYPES: &str = "memberTypes";
    pub const PROCESS_CONTENTS: &str = "processContents";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const USE: &str = "use";
}

impl SchemaDocument {
    /// Parse an XSD schema document from text
    pub fn parse(id: impl Into<String>, xsd: &str) -> Result<Self> {
        let id = id.into();
        let doc = Document::from_string(xsd).map_err(|e| match e {
            Error::Xml(message) => Error::Parse(ParseError::new(message).with_document(id.clone())),
            other => other,
        })?;
        Self::from_document(id, &doc)
    }

    /// Build a schema document from a parsed XML tree
    pub fn from_document(id: impl Into<String>, doc: &Document) -> Result<Self> {
        let id = id.into();
        let parser = XsdParser { document: &id };
        let root = doc
            .root()
            .ok_or_else(|| parser.error("Empty document", None))?;

        if root.local_name() != xsd_elements::SCHEMA || !root.qname.is_in(crate::XSD_NAMESPACE) {
            return Err(parser.error(
                format!("Expected xs:schema root element, got {}", root.qname),
                None,
            ));
        }

        let mut schema = SchemaDocument::new(id.clone(), None);
        parser.parse_schema_element(&mut schema, root)?;
        tracing::debug!(
            document = %id,
            namespace = ?schema.target_namespace,
            components = schema.components.len(),
            "parsed schema document"
        );
        Ok(schema)
    }
}

/// Parser state: the identity of the document being parsed
struct XsdParser<'a> {
    document: &'a str,
}

impl<'a> XsdParser<'a> {
    fn error(&self, message: impl Into<String>, elem: Option<&Element>) -> Error {
        let mut err = ParseError::new(message).with_document(self.document);
        if let Some(elem) = elem {
            err = err.with_location(describe(elem));
        }
        Error::Parse(err)
    }

    /// Resolve a QName-valued attribute in the scope of `elem`
    fn resolve(&self, elem: &Element, value: &str) -> Result<QName> {
        let value = value.trim();
        validate_qname(value).map_err(|e| self.error(e.to_string(), Some(elem)))?;
        elem.namespaces
            .resolve(value)
            .map_err(|e| self.error(e.to_string(), Some(elem)))
    }

    fn required_name(&self, elem: &Element) -> Result<String> {
        let name = elem.get_attribute(xsd_attrs::NAME).ok_or_else(|| {
            self.error(format!("{} is missing its 'name' attribute", elem.local_name()), Some(elem))
        })?;
        validate_ncname(name).map_err(|e| self.error(e.to_string(), Some(elem)))?;
        Ok(name.to_string())
    }

    fn occurs(&self, elem: &Element) -> Result<Occurs> {
        parse_occurs(
            elem.get_attribute(xsd_attrs::MIN_OCCURS),
            elem.get_attribute(xsd_attrs::MAX_OCCURS),
        )
        .map_err(|e| match e {
            Error::Parse(p) => Error::Parse(p.with_document(self.document).with_location(describe(elem))),
            other => other,
        })
    }

    fn flag(&self, elem: &Element, name: &str) -> Result<bool> {
        match elem.get_attribute(name).map(str::trim) {
            None => Ok(false),
            Some("true") | Some("1") => Ok(true),
            Some("false") | Some("0") => Ok(false),
            Some(other) => Err(self.error(
                format!("Attribute '{}' must be a boolean, got '{}'", name, other),
                Some(elem),
            )),
        }
    }

    fn form(&self, elem: &Element, attr: &str) -> Result<Option<FormDefault>> {
        match elem.get_attribute(attr) {
            None => Ok(None),
            Some(value) => FormDefault::from_str(value.trim())
                .map(Some)
                .ok_or_else(|| self.error(format!("Invalid form value '{}'", value), Some(elem))),
        }
    }

    /// Parse the xs:schema root element
    fn parse_schema_element(&self, schema: &mut SchemaDocument, elem: &Element) -> Result<()> {
        schema.namespaces = elem.namespaces.clone();
        schema.target_namespace = elem
            .get_attribute(xsd_attrs::TARGET_NAMESPACE)
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);
        schema.element_form_default = self
            .form(elem, xsd_attrs::ELEMENT_FORM_DEFAULT)?
            .unwrap_or_default();
        schema.attribute_form_default = self
            .form(elem, xsd_attrs::ATTRIBUTE_FORM_DEFAULT)?
            .unwrap_or_default();

        for child in xsd_children(elem) {
            match child.local_name() {
                xsd_elements::IMPORT => {
                    schema.directives.push(SchemaDirective::import(
                        child.get_attribute(xsd_attrs::NAMESPACE).map(str::to_string),
                        child.get_attribute(xsd_attrs::SCHEMA_LOCATION).map(str::to_string),
                    ));
                }
                xsd_elements::INCLUDE => {
                    let location = child.get_attribute(xsd_attrs::SCHEMA_LOCATION).ok_or_else(|| {
                        self.error("include is missing its 'schemaLocation'", Some(child))
                    })?;
                    schema.directives.push(SchemaDirective::include(location));
                }
                xsd_elements::REDEFINE => {
                    schema.directives.push(self.parse_redefine(child, DirectiveKind::Redefine)?);
                }
                xsd_elements::OVERRIDE => {
                    schema.directives.push(self.parse_redefine(child, DirectiveKind::Override)?);
                }
                xsd_elements::ANNOTATION => {}
                _ => {
                    if !self.parse_component(&mut schema.components, child)? {
                        tracing::trace!(document = self.document, child = child.local_name(), "skipping schema child");
                    }
                }
            }
        }

        Ok(())
    }

    fn parse_redefine(&self, elem: &Element, kind: DirectiveKind) -> Result<SchemaDirective> {
        let location = elem.get_attribute(xsd_attrs::SCHEMA_LOCATION).ok_or_else(|| {
            self.error(format!("{} is missing its 'schemaLocation'", kind), Some(elem))
        })?;
        let mut directive = SchemaDirective {
            kind,
            namespace: None,
            schema_location: Some(location.to_string()),
            components: Components::default(),
        };
        for child in xsd_children(elem) {
            if child.local_name() != xsd_elements::ANNOTATION {
                self.parse_component(&mut directive.components, child)?;
            }
        }
        Ok(directive)
    }

    /// Parse a top-level component into `components`; false if `elem` is not one
    fn parse_component(&self, components: &mut Components, elem: &Element) -> Result<bool> {
        match elem.local_name() {
            xsd_elements::ELEMENT => {
                let element = self.parse_element(elem, true)?;
                let name = self.required_name(elem)?;
                self.insert_unique(&mut components.elements, name, element, elem)?;
            }
            xsd_elements::ATTRIBUTE => {
                let attribute = self.parse_attribute(elem, true)?;
                let name = self.required_name(elem)?;
                self.insert_unique(&mut components.attributes, name, attribute, elem)?;
            }
            xsd_elements::COMPLEX_TYPE => {
                let name = self.required_name(elem)?;
                let complex = self.parse_complex_type(elem, Some(name.clone()))?;
                self.insert_unique(&mut components.types, name, TypeDef::Complex(complex), elem)?;
            }
            xsd_elements::SIMPLE_TYPE => {
                let name = self.required_name(elem)?;
                let simple = self.parse_simple_type(elem, Some(name.clone()))?;
                self.insert_unique(&mut components.types, name, TypeDef::Simple(simple), elem)?;
            }
            xsd_elements::GROUP => {
                let name = self.required_name(elem)?;
                let content = xsd_children(elem)
                    .find(|c| ModelType::from_tag(c.local_name()).is_some())
                    .map(|c| self.parse_model_group(c))
                    .transpose()?
                    .unwrap_or_else(|| ModelGroup::new(ModelType::Sequence));
                let group = GroupDef {
                    name: name.clone(),
                    content,
                };
                self.insert_unique(&mut components.groups, name, group, elem)?;
            }
            xsd_elements::ATTRIBUTE_GROUP => {
                let name = self.required_name(elem)?;
                let mut attributes = AttributeDecls::default();
                for child in xsd_children(elem) {
                    self.parse_attribute_child(&mut attributes, child)?;
                }
                let group = AttributeGroupDef {
                    name: name.clone(),
                    attributes,
                };
                self.insert_unique(&mut components.attribute_groups, name, group, elem)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn insert_unique<T>(
        &self,
        map: &mut IndexMap<String, T>,
        name: String,
        value: T,
        elem: &Element,
    ) -> Result<()> {
        if map.contains_key(&name) {
            return Err(self.error(
                format!("Duplicate {} '{}' in the same document", elem.local_name(), name),
                Some(elem),
            ));
        }
        map.insert(name, value);
        Ok(())
    }

    /// Parse an element declaration or reference
    fn parse_element(&self, elem: &Element, global: bool) -> Result<ElementDef> {
        let target = match (elem.get_attribute(xsd_attrs::NAME), elem.get_attribute(xsd_attrs::REF)) {
            (Some(_), Some(_)) => {
                return Err(self.error("element has both 'name' and 'ref'", Some(elem)));
            }
            (Some(_), None) => ElementTarget::Name(self.required_name(elem)?),
            (None, Some(reference)) if !global => ElementTarget::Ref(self.resolve(elem, reference)?),
            _ => return Err(self.error("element needs a 'name' (or a 'ref' when local)", Some(elem))),
        };

        let type_def = if let Some(type_str) = elem.get_attribute(xsd_attrs::TYPE) {
            Some(ElementType::Named(self.resolve(elem, type_str)?))
        } else {
            let mut inline = None;
            for child in xsd_children(elem) {
                match child.local_name() {
                    xsd_elements::COMPLEX_TYPE => {
                        inline = Some(ElementType::Complex(Box::new(self.parse_complex_type(child, None)?)));
                        break;
                    }
                    xsd_elements::SIMPLE_TYPE => {
                        inline = Some(ElementType::Simple(Box::new(self.parse_simple_type(child, None)?)));
                        break;
                    }
                    _ => {}
                }
            }
            inline
        };

        let substitution_group = elem
            .get_attribute(xsd_attrs::SUBSTITUTION_GROUP)
            .map(|head| self.resolve(elem, head))
            .transpose()?;

        Ok(ElementDef {
            target,
            type_def,
            occurs: if global { Occurs::once() } else { self.occurs(elem)? },
            nillable: self.flag(elem, xsd_attrs::NILLABLE)?,
            default: elem.get_attribute(xsd_attrs::DEFAULT).map(str::to_string),
            fixed: elem.get_attribute(xsd_attrs::FIXED).map(str::to_string),
            form: self.form(elem, xsd_attrs::FORM)?,
            abstract_element: self.flag(elem, xsd_attrs::ABSTRACT)?,
            substitution_group,
        })
    }

    /// Parse an attribute declaration or reference
    fn parse_attribute(&self, elem: &Element, global: bool) -> Result<AttributeDef> {
        let target = match (elem.get_attribute(xsd_attrs::NAME), elem.get_attribute(xsd_attrs::REF)) {
            (Some(_), Some(_)) => {
                return Err(self.error("attribute has both 'name' and 'ref'", Some(elem)));
            }
            (Some(_), None) => AttributeTarget::Name(self.required_name(elem)?),
            (None, Some(reference)) if !global => AttributeTarget::Ref(self.resolve(elem, reference)?),
            _ => return Err(self.error("attribute needs a 'name' (or a 'ref' when local)", Some(elem))),
        };

        let type_def = if let Some(type_str) = elem.get_attribute(xsd_attrs::TYPE) {
            Some(AttributeType::Named(self.resolve(elem, type_str)?))
        } else {
            xsd_children(elem)
                .find(|c| c.local_name() == xsd_elements::SIMPLE_TYPE)
                .map(|c| self.parse_simple_type(c, None))
                .transpose()?
                .map(|st| AttributeType::Inline(Box::new(st)))
        };

        let use_ = match elem.get_attribute(xsd_attrs::USE) {
            None => AttributeUse::Optional,
            Some(value) => AttributeUse::from_str(value.trim()).ok_or_else(|| {
                self.error(format!("Invalid attribute use '{}'", value), Some(elem))
            })?,
        };

        Ok(AttributeDef {
            target,
            type_def,
            use_,
            default: elem.get_attribute(xsd_attrs::DEFAULT).map(str::to_string),
            fixed: elem.get_attribute(xsd_attrs::FIXED).map(str::to_string),
            form: self.form(elem, xsd_attrs::FORM)?,
        })
    }

    /// Parse attribute, attributeGroup ref or anyAttribute; false for anything else
    fn parse_attribute_child(&self, decls: &mut AttributeDecls, elem: &Element) -> Result<bool> {
        match elem.local_name() {
            xsd_elements::ATTRIBUTE => decls.attributes.push(self.parse_attribute(elem, false)?),
            xsd_elements::ATTRIBUTE_GROUP => {
                let reference = elem.get_attribute(xsd_attrs::REF).ok_or_else(|| {
                    self.error("attributeGroup reference is missing its 'ref'", Some(elem))
                })?;
                decls.groups.push(self.resolve(elem, reference)?);
            }
            xsd_elements::ANY_ATTRIBUTE => decls.any_attribute = Some(self.parse_wildcard(elem, false)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn parse_wildcard(&self, elem: &Element, with_occurs: bool) -> Result<Wildcard> {
        let process_contents = match elem.get_attribute(xsd_attrs::PROCESS_CONTENTS) {
            None => ProcessContents::default(),
            Some(value) => ProcessContents::from_str(value.trim()).ok_or_else(|| {
                self.error(format!("Invalid processContents '{}'", value), Some(elem))
            })?,
        };
        Ok(Wildcard {
            namespace: elem
                .get_attribute(xsd_attrs::NAMESPACE)
                .unwrap_or("##any")
                .to_string(),
            process_contents,
            occurs: if with_occurs { self.occurs(elem)? } else { Occurs::once() },
        })
    }

    /// Parse one content-model particle; None for annotations and unknown children
    fn parse_particle(&self, elem: &Element) -> Result<Option<Particle>> {
        let particle = match elem.local_name() {
            xsd_elements::ELEMENT => Particle::Element(self.parse_element(elem, false)?),
            xsd_elements::GROUP => {
                let reference = elem.get_attribute(xsd_attrs::REF).ok_or_else(|| {
                    self.error("group reference is missing its 'ref'", Some(elem))
                })?;
                Particle::GroupRef(GroupRef {
                    name: self.resolve(elem, reference)?,
                    occurs: self.occurs(elem)?,
                })
            }
            xsd_elements::ANY => Particle::Wildcard(self.parse_wildcard(elem, true)?),
            xsd_elements::SEQUENCE | xsd_elements::CHOICE | xsd_elements::ALL => {
                Particle::Container(self.parse_model_group(elem)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(particle))
    }

    fn parse_model_group(&self, elem: &Element) -> Result<ModelGroup> {
        let model = ModelType::from_tag(elem.local_name())
            .ok_or_else(|| self.error("expected sequence, choice or all", Some(elem)))?;
        let mut group = ModelGroup::new(model).with_occurs(self.occurs(elem)?);
        for child in xsd_children(elem) {
            if let Some(particle) = self.parse_particle(child)? {
                group.particles.push(particle);
            }
        }
        Ok(group)
    }

    /// First content-model particle among the children of `elem`
    fn content_particle(&self, elem: &Element) -> Result<Option<Particle>> {
        for child in xsd_children(elem) {
            match child.local_name() {
                xsd_elements::SEQUENCE | xsd_elements::CHOICE | xsd_elements::ALL | xsd_elements::GROUP => {
                    return self.parse_particle(child);
                }
                _ => {}
            }
        }
        Ok(None)
    }

    /// Parse a complex type definition (named or anonymous)
    fn parse_complex_type(&self, elem: &Element, name: Option<String>) -> Result<ComplexTypeDef> {
        let mut mixed = self.flag(elem, xsd_attrs::MIXED)?;
        let abstract_type = self.flag(elem, xsd_attrs::ABSTRACT)?;

        let mut content = None;
        for child in xsd_children(elem) {
            match child.local_name() {
                xsd_elements::SIMPLE_CONTENT => {
                    content = Some(self.parse_simple_content(child)?);
                }
                xsd_elements::COMPLEX_CONTENT => {
                    if child.get_attribute(xsd_attrs::MIXED).is_some() {
                        mixed = self.flag(child, xsd_attrs::MIXED)?;
                    }
                    content = Some(self.parse_complex_content(child)?);
                }
                _ => {}
            }
        }

        let content = match content {
            Some(content) => content,
            None => {
                let mut attributes = AttributeDecls::default();
                for child in xsd_children(elem) {
                    self.parse_attribute_child(&mut attributes, child)?;
                }
                ComplexContent::Particles {
                    particle: self.content_particle(elem)?,
                    attributes,
                }
            }
        };

        Ok(ComplexTypeDef {
            name,
            content,
            mixed,
            abstract_type,
        })
    }

    /// The extension or restriction child of simpleContent/complexContent
    fn derivation<'e>(&self, elem: &'e Element) -> Result<(DerivationMethod, QName, &'e Element)> {
        let step = xsd_children(elem)
            .find(|c| matches!(c.local_name(), xsd_elements::RESTRICTION | xsd_elements::EXTENSION))
            .ok_or_else(|| self.error("expected an extension or restriction", Some(elem)))?;
        let method = DerivationMethod::from_str(step.local_name()).unwrap_or_default();
        let base = step
            .get_attribute(xsd_attrs::BASE)
            .ok_or_else(|| self.error(format!("{} is missing its 'base'", method), Some(step)))?;
        Ok((method, self.resolve(step, base)?, step))
    }

    fn parse_simple_content(&self, elem: &Element) -> Result<ComplexContent> {
        let (method, base, step) = self.derivation(elem)?;
        let mut attributes = AttributeDecls::default();
        for child in xsd_children(step) {
            self.parse_attribute_child(&mut attributes, child)?;
        }
        let inline = xsd_children(step)
            .find(|c| c.local_name() == xsd_elements::SIMPLE_TYPE)
            .map(|c| self.parse_simple_type(c, None))
            .transpose()?
            .map(Box::new);
        let facets = if method == DerivationMethod::Restriction {
            self.parse_facets(step)?
        } else {
            Facets::default()
        };
        Ok(ComplexContent::Simple {
            method,
            base,
            inline,
            facets,
            attributes,
        })
    }

    fn parse_complex_content(&self, elem: &Element) -> Result<ComplexContent> {
        let (method, base, step) = self.derivation(elem)?;
        let mut attributes = AttributeDecls::default();
        for child in xsd_children(step) {
            self.parse_attribute_child(&mut attributes, child)?;
        }
        Ok(ComplexContent::Complex {
            method,
            base,
            particle: self.content_particle(step)?,
            attributes,
        })
    }

    /// Parse a simple type definition (named or anonymous)
    fn parse_simple_type(&self, elem: &Element, name: Option<String>) -> Result<SimpleTypeDef> {
        for child in xsd_children(elem) {
            let variety = match child.local_name() {
                xsd_elements::RESTRICTION => SimpleVariety::Restriction {
                    base: self.simple_base(child, xsd_attrs::BASE)?,
                    facets: self.parse_facets(child)?,
                },
                xsd_elements::LIST => SimpleVariety::List {
                    item: self.simple_base(child, xsd_attrs::ITEM_TYPE)?,
                },
                xsd_elements::UNION => {
                    let mut members = Vec::new();
                    if let Some(list) = child.get_attribute(xsd_attrs::MEMBER_TYPES) {
                        for member in list.split_whitespace() {
                            members.push(SimpleBase::Named(self.resolve(child, member)?));
                        }
                    }
                    for inline in xsd_children(child).filter(|c| c.local_name() == xsd_elements::SIMPLE_TYPE) {
                        members.push(SimpleBase::Inline(Box::new(self.parse_simple_type(inline, None)?)));
                    }
                    if members.is_empty() {
                        return Err(self.error("union has no member types", Some(child)));
                    }
                    SimpleVariety::Union { members }
                }
                _ => continue,
            };
            return Ok(SimpleTypeDef { name, variety });
        }
        Err(self.error("simpleType needs a restriction, list or union", Some(elem)))
    }

    /// Named base from `attr`, or the inline simpleType child
    fn simple_base(&self, elem: &Element, attr: &str) -> Result<SimpleBase> {
        if let Some(name) = elem.get_attribute(attr) {
            return Ok(SimpleBase::Named(self.resolve(elem, name)?));
        }
        let inline = xsd_children(elem)
            .find(|c| c.local_name() == xsd_elements::SIMPLE_TYPE)
            .ok_or_else(|| self.error(format!("missing '{}' or inline simpleType", attr), Some(elem)))?;
        Ok(SimpleBase::Inline(Box::new(self.parse_simple_type(inline, None)?)))
    }

    fn parse_facets(&self, elem: &Element) -> Result<Facets> {
        let mut facets = Facets::default();
        let mut patterns = Vec::new();

        for child in xsd_children(elem) {
            let value = match child.get_attribute(xsd_attrs::VALUE) {
                Some(value) => value,
                None => continue,
            };
            match child.local_name() {
                xsd_elements::ENUMERATION => facets.enumeration.push(value.to_string()),
                xsd_elements::PATTERN => patterns.push(value.to_string()),
                xsd_elements::LENGTH => facets.length = Some(self.facet_number(child, value)?),
                xsd_elements::MIN_LENGTH => facets.min_length = Some(self.facet_number(child, value)?),
                xsd_elements::MAX_LENGTH => facets.max_length = Some(self.facet_number(child, value)?),
                xsd_elements::MIN_INCLUSIVE => facets.min_inclusive = Some(value.to_string()),
                xsd_elements::MAX_INCLUSIVE => facets.max_inclusive = Some(value.to_string()),
                xsd_elements::MIN_EXCLUSIVE => facets.min_exclusive = Some(value.to_string()),
                xsd_elements::MAX_EXCLUSIVE => facets.max_exclusive = Some(value.to_string()),
                xsd_elements::TOTAL_DIGITS => {
                    facets.total_digits = Some(self.facet_number(child, value)? as u32)
                }
                xsd_elements::FRACTION_DIGITS => {
                    facets.fraction_digits = Some(self.facet_number(child, value)? as u32)
                }
                xsd_elements::WHITE_SPACE => {
                    facets.white_space = Some(WhiteSpace::from_str(value.trim()).ok_or_else(|| {
                        self.error(format!("Invalid whiteSpace value '{}'", value), Some(child))
                    })?)
                }
                _ => {}
            }
        }

        // Patterns of one step are alternatives
        match patterns.len() {
            0 => {}
            1 => facets.patterns.push(patterns.remove(0)),
            _ => facets.patterns.push(
                patterns
                    .iter()
                    .map(|p| format!("(?:{})", p))
                    .collect::<Vec<_>>()
                    .join("|"),
            ),
        }

        Ok(facets)
    }

    fn facet_number(&self, elem: &Element, value: &str) -> Result<usize> {
        value.trim().parse::<usize>().map_err(|_| {
            self.error(
                format!("Facet {} needs a non-negative integer, got '{}'", elem.local_name(), value),
                Some(elem),
            )
        })
    }
}

/// Children in the XSD namespace
fn xsd_children(elem: &Element) -> impl Iterator<Item = &Element> {
    elem.children
        .iter()
        .filter(|c| c.qname.is_in(crate::XSD_NAMESPACE))
}

/// Short human-readable location of a schema element
fn describe(elem: &Element) -> String {
    match (elem.get_attribute(xsd_attrs::NAME), elem.get_attribute(xsd_attrs::REF)) {
        (Some(name), _) => format!("<{} name=\"{}\">", elem.local_name(), name),
        (None, Some(reference)) => format!("<{} ref=\"{}\">", elem.local_name(), reference),
        _ => format!("<{}>", elem.local_name()),
    }
}
