//! HTML Node representation
//!
//! Uses NodeId (u32 newtype) for compact, cache-friendly node references.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Compact node identifier (index into the document arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The document node of every document
    pub const DOCUMENT: NodeId = NodeId(0);

    /// Arena index of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type of node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element,
    /// Text content
    Text,
    /// Comment
    Comment,
    /// DOCTYPE declaration
    Doctype,
}

/// Element payload
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Lower-cased tag name
    pub tag: String,
    /// Attributes in source order, names lower-cased
    pub attrs: Vec<(String, String)>,
    /// Dirty value of a form control; `None` falls back to markup
    pub value: Option<String>,
    /// Dirty checkedness; `None` falls back to the `checked` attribute
    pub checked: Option<bool>,
    /// Properties without an attribute counterpart
    pub expando: HashMap<String, Value>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        ElementData {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Get attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set or replace an attribute, keeping its position
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute; returns whether it was present
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(key, _)| key != name);
        self.attrs.len() != before
    }

    /// Whitespace-separated tokens of the `class` attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Check for a class token
    #[inline]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Node payload by kind
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
    Doctype(String),
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (None for the document and for detached roots)
    pub parent: Option<NodeId>,
    /// First child node
    pub first_child: Option<NodeId>,
    /// Last child node
    pub last_child: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Kind-specific payload
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Node {
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            data,
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        Node::with_data(NodeData::Document)
    }

    /// Create a new, unattached element node
    pub fn element(data: ElementData) -> Self {
        Node::with_data(NodeData::Element(data))
    }

    /// Create a new, unattached text node
    pub fn text(content: impl Into<String>) -> Self {
        Node::with_data(NodeData::Text(content.into()))
    }

    /// Create a new, unattached comment node
    pub fn comment(content: impl Into<String>) -> Self {
        Node::with_data(NodeData::Comment(content.into()))
    }

    /// Create a new, unattached doctype node
    pub fn doctype(content: impl Into<String>) -> Self {
        Node::with_data(NodeData::Doctype(content.into()))
    }

    /// Kind of this node
    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Document => NodeKind::Document,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::Doctype(_) => NodeKind::Doctype,
        }
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Element payload, if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Check if this node has children
    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let doc = Node::document();
        assert_eq!(doc.kind(), NodeKind::Document);
        assert!(doc.parent.is_none());
        assert!(!doc.has_children());
    }

    #[test]
    fn test_element_attributes() {
        let mut data = ElementData::new("div");
        data.set_attr("class", "a  b");
        data.set_attr("id", "x");
        data.set_attr("class", "c");
        assert_eq!(data.attrs[0], ("class".to_string(), "c".to_string()));
        assert!(data.has_class("c"));
        assert!(data.remove_attr("id"));
        assert!(!data.remove_attr("id"));

        let node = Node::element(data);
        assert!(node.is_element());
        assert_eq!(node.as_element().map(|e| e.tag.as_str()), Some("div"));
    }
}
