//! XML document tree
//!
//! A small namespace-aware DOM over quick-xml. Element and attribute names
//! are resolved against the bindings in scope at the point they appear;
//! each element keeps its in-scope context so QName-valued attribute
//! content can be resolved later. The same tree type is used for writing.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;

/// XML attribute with its resolved name and the prefix it was written with
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Resolved attribute name
    pub qname: QName,
    /// Prefix as written (None for unprefixed)
    pub prefix: Option<String>,
    /// Unescaped value
    pub value: String,
}

/// XML Element in the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Prefix as written (None for unprefixed)
    pub prefix: Option<String>,
    /// Element attributes, excluding namespace declarations
    pub attributes: Vec<Attribute>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Pre-serialized XML written after the children
    pub raw_content: Vec<String>,
    /// Namespace declarations made on this element ("" is the default namespace)
    pub declarations: Vec<(String, String)>,
    /// Bindings in scope for this element
    pub namespaces: NamespaceContext,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            prefix: None,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            raw_content: Vec::new(),
            declarations: Vec::new(),
            namespaces: NamespaceContext::new(),
        }
    }

    /// Set the prefix used when writing this element
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an attribute value by local name, ignoring namespaces
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.qname.namespace.is_none() && a.qname.local_name == name)
            .map(|a| a.value.as_str())
    }

    /// Get an attribute value by qualified name
    pub fn get_attribute_qname(&self, qname: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &a.qname == qname)
            .map(|a| a.value.as_str())
    }

    /// Add an attribute
    pub fn set_attribute(&mut self, qname: QName, prefix: Option<String>, value: impl Into<String>) {
        self.attributes.push(Attribute {
            qname,
            prefix,
            value: value.into(),
        });
    }

    /// Declare a namespace prefix on this element
    pub fn declare(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        if prefix.is_empty() {
            self.namespaces.set_default_namespace(namespace.clone());
        } else {
            self.namespaces.add_prefix(prefix.clone(), namespace.clone());
        }
        self.declarations.push((prefix, namespace));
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Set text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Find child elements by qualified name
    pub fn children_named<'a>(&'a self, qname: &'a QName) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |e| &e.qname == qname)
    }

    /// Find child elements by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }

    /// Serialize this element as a standalone fragment.
    ///
    /// Every in-scope prefix that the subtree uses is declared on the
    /// fragment root, so the result parses on its own and re-serializes to
    /// the same text.
    pub fn to_fragment(&self) -> Result<String> {
        let mut used = BTreeMap::new();
        self.collect_used_prefixes(&mut used);

        let mut root = self.clone();
        let own: Vec<String> = root.declarations.iter().map(|(p, _)| p.clone()).collect();
        for (prefix, _) in used {
            if own.contains(&prefix) {
                continue;
            }
            let namespace = if prefix.is_empty() {
                self.namespaces.get_default_namespace()
            } else {
                self.namespaces.get_namespace(&prefix)
            };
            if let Some(namespace) = namespace {
                if prefix != crate::namespaces::XML_PREFIX {
                    root.declarations.push((prefix, namespace.to_string()));
                }
            }
        }
        root.declarations.sort();

        let mut writer = Writer::new(Vec::new());
        root.write(&mut writer)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Xml(format!("Fragment is not UTF-8: {}", e)))
    }

    fn collect_used_prefixes(&self, used: &mut BTreeMap<String, ()>) {
        if self.qname.namespace.is_some() {
            used.insert(self.prefix.clone().unwrap_or_default(), ());
        }
        for attr in &self.attributes {
            if let Some(prefix) = &attr.prefix {
                used.insert(prefix.clone(), ());
            }
        }
        for child in &self.children {
            child.collect_used_prefixes(used);
        }
    }

    fn raw_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.qname.local_name),
            None => self.qname.local_name.clone(),
        }
    }

    /// Write this element and its subtree
    pub fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let name = self.raw_name();
        let mut start = BytesStart::new(name.as_str());
        for (prefix, namespace) in &self.declarations {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            start.push_attribute((key.as_str(), namespace.as_str()));
        }
        for attr in &self.attributes {
            let key = match &attr.prefix {
                Some(prefix) => format!("{}:{}", prefix, attr.qname.local_name),
                None => attr.qname.local_name.clone(),
            };
            start.push_attribute((key.as_str(), attr.value.as_str()));
        }

        let is_empty = self.text.is_none() && self.children.is_empty() && self.raw_content.is_empty();
        if is_empty {
            return write_event(writer, Event::Empty(start));
        }

        write_event(writer, Event::Start(start))?;
        if let Some(text) = &self.text {
            write_event(writer, Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        for raw in &self.raw_content {
            write_event(writer, Event::Text(BytesText::from_escaped(raw.as_str())))?;
        }
        write_event(writer, Event::End(BytesEnd::new(name.as_str())))
    }
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(format!("Failed to write XML: {}", e)))
}

/// XML Document representation
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document, enforcing size and depth limits
    pub fn parse_with_limits(xml: &str, limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut doc = Document::new();
        // Each open element carries the text collected so far
        let mut stack: Vec<(Element, String)> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let parent_ns = stack.last().map(|(el, _)| &el.namespaces);
                    let element = Self::parse_element(&e, parent_ns, limits)?;
                    stack.push((element, String::new()));
                    limits.check_xml_depth(stack.len())?;
                }
                Ok(Event::End(_)) => {
                    if let Some((mut current, text)) = stack.pop() {
                        Self::finish_text(&mut current, text);
                        if let Some((parent, _)) = stack.last_mut() {
                            parent.add_child(current);
                        } else {
                            doc.root = Some(current);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let parent_ns = stack.last().map(|(el, _)| &el.namespaces);
                    let element = Self::parse_element(&e, parent_ns, limits)?;
                    limits.check_xml_depth(stack.len() + 1)?;
                    if let Some((parent, _)) = stack.last_mut() {
                        parent.add_child(element);
                    } else {
                        doc.root = Some(element);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some((_, text)) = stack.last_mut() {
                        let unescaped = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                        text.push_str(&unescaped);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some((_, text)) = stack.last_mut() {
                        let data = std::str::from_utf8(&e)
                            .map_err(|e| Error::Xml(format!("Invalid CDATA content: {}", e)))?;
                        text.push_str(data);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Ignore other events (comments, processing instructions, etc.)
            }
        }

        if doc.root.is_none() {
            return Err(Error::Xml("Document has no root element".to_string()));
        }

        Ok(doc)
    }

    /// Whitespace between child elements is not content
    /// `<a></a>` keeps an empty text, `<a/>` has none
    fn finish_text(element: &mut Element, text: String) {
        if element.children.is_empty() || !text.trim().is_empty() {
            element.text = Some(text);
        }
    }

    /// Parse element from BytesStart event
    fn parse_element(
        start: &BytesStart,
        parent: Option<&NamespaceContext>,
        limits: &Limits,
    ) -> Result<Element> {
        let raw_name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut namespaces = parent.map(NamespaceContext::child).unwrap_or_default();
        let mut declarations = Vec::new();
        let mut raw_attributes = Vec::new();

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            // Handle namespace declarations
            if attr_name == "xmlns" {
                namespaces.set_default_namespace(attr_value.clone());
                declarations.push((String::new(), attr_value));
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                namespaces.add_prefix(prefix, attr_value.clone());
                declarations.push((prefix.to_string(), attr_value));
            } else {
                raw_attributes.push((attr_name, attr_value));
            }
        }
        limits.check_attributes(raw_attributes.len())?;

        let qname = namespaces.resolve_element_name(&raw_name)?;
        let prefix = raw_name.split_once(':').map(|(p, _)| p.to_string());

        let mut element = Element::new(qname).with_prefix(prefix);
        for (name, value) in raw_attributes {
            let qname = namespaces.resolve_attribute_name(&name)?;
            let prefix = name.split_once(':').map(|(p, _)| p.to_string());
            element.attributes.push(Attribute { qname, prefix, value });
        }
        element.declarations = declarations;
        element.namespaces = namespaces;

        Ok(element)
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Serialize the document, optionally preceded by an XML declaration
    pub fn to_xml(&self, encoding: Option<&str>, indent: usize) -> Result<String> {
        let mut writer = if indent > 0 {
            Writer::new_with_indent(Vec::new(), b' ', indent)
        } else {
            Writer::new(Vec::new())
        };
        if let Some(encoding) = encoding {
            write_event(
                &mut writer,
                Event::Decl(BytesDecl::new("1.0", Some(encoding), None)),
            )?;
        }
        if let Some(root) = &self.root {
            root.write(&mut writer)?;
        }
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Xml(format!("Document is not UTF-8: {}", e)))
    }
}
