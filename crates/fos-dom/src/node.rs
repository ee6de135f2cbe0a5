//! Node storage
//!
//! Nodes never own each other: parent, child and sibling links are `NodeId`s
//! into the tree arena, with `NodeId::NONE` marking an absent link.

use std::collections::HashMap;

use crate::{ClassList, InternedString, NodeId, PropValue, StyleDeclarations};

/// Qualified name (namespace + local name), both interned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualName {
    pub ns: InternedString,
    pub local: InternedString,
}

impl QualName {
    pub fn new(ns: InternedString, local: InternedString) -> Self {
        Self { ns, local }
    }
}

/// One arena slot: tree links plus the node payload
#[derive(Debug, Clone)]
pub struct Node {
    /// `NONE` for the root and for detached nodes
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Detached element
    pub fn element(name: QualName) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(name)))
    }

    /// Detached text node
    pub fn text(content: String) -> Self {
        Self::with_data(NodeData::Text(TextData { content }))
    }

    pub fn comment(content: String) -> Self {
        Self::with_data(NodeData::Comment(content))
    }

    /// Document root; only the tree creates one
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    pub fn fragment() -> Self {
        Self::with_data(NodeData::DocumentFragment)
    }

    pub fn doctype(name: String, public_id: String, system_id: String) -> Self {
        Self::with_data(NodeData::Doctype { name, public_id, system_id })
    }

    /// Node kind without payload
    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Document => NodeKind::Document,
            NodeData::DocumentFragment => NodeKind::DocumentFragment,
            NodeData::Doctype { .. } => NodeKind::Doctype,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Whether this node may hold children
    #[inline]
    pub fn can_have_children(&self) -> bool {
        matches!(
            self.data,
            NodeData::Document | NodeData::DocumentFragment | NodeData::Element(_)
        )
    }

    /// Element payload, for element nodes only
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(elem) => Some(elem),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(elem) => Some(elem),
            _ => None,
        }
    }

    /// Character data of a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(text) => Some(&text.content),
            _ => None,
        }
    }
}

/// Node type without payload, mirrors `Node.nodeType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    Doctype = 10,
    DocumentFragment = 11,
}

/// Payload by node type
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    /// Lightweight container whose children move on insertion
    DocumentFragment,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element(ElementData),
    Text(TextData),
    Comment(String),
}

/// Name, attributes and live state of an element
#[derive(Debug, Clone)]
pub struct ElementData {
    pub name: QualName,
    /// Attributes in source order, names lowercased
    pub attrs: Vec<Attribute>,
    /// Form control state that stops following attributes once written
    pub(crate) checked: Option<bool>,
    pub(crate) selected: Option<bool>,
    pub(crate) value: Option<String>,
    /// Expando properties with no attribute reflection
    pub(crate) expando: HashMap<String, PropValue>,
}

impl ElementData {
    pub fn new(name: QualName) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            checked: None,
            selected: None,
            value: None,
            expando: HashMap::new(),
        }
    }

    /// Attribute value, matched case-insensitively
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    /// Overwrite in place, or append with a lowercased name
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|attr| attr.name.eq_ignore_ascii_case(name)) {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attribute {
                name: name.to_ascii_lowercase(),
                value,
            }),
        }
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self
            .attrs
            .iter()
            .position(|attr| attr.name.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(index).value)
    }

    /// Parsed class list
    pub fn class_list(&self) -> ClassList {
        ClassList::from_attr(self.get_attr("class").unwrap_or(""))
    }

    /// Write a class list back to the `class` attribute
    pub fn set_class_list(&mut self, classes: &ClassList) {
        // An element that never had a class attribute keeps it absent
        if classes.is_empty() && !self.has_attr("class") {
            return;
        }
        self.set_attr("class", classes.to_string());
    }

    /// Parsed inline style
    pub fn style(&self) -> StyleDeclarations {
        StyleDeclarations::parse(self.get_attr("style").unwrap_or(""))
    }

    /// Write inline style back to the `style` attribute
    pub fn set_style(&mut self, style: &StyleDeclarations) {
        if style.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", style.to_css_text());
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextData {
    pub content: String,
}

/// Name/value pair in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}
