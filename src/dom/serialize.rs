//! Markup serialization
//!
//! Produces `innerHTML` / `outerHTML` strings from the arena. Attribute values
//! are always double-quoted; text is escaped except inside raw text elements.

use super::node::{NodeData, NodeId};
use super::DocumentAccess;
use crate::core::entities::{escape_attr, escape_text};

/// Elements that never have children or an end tag
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[inline]
pub(crate) fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[inline]
fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Serialize the children of a node
pub(crate) fn inner_html<D: DocumentAccess>(doc: &D, id: NodeId) -> String {
    let mut out = String::new();
    let raw = doc
        .element(id)
        .is_some_and(|element| is_raw_text_element(&element.tag));
    let mut stack = Vec::new();
    push_children(doc, id, raw, &mut stack);
    write_all(doc, stack, &mut out);
    out
}

/// Serialize a node including itself
pub(crate) fn outer_html<D: DocumentAccess>(doc: &D, id: NodeId) -> String {
    if matches!(doc.get_node(id).map(|n| &n.data), Some(NodeData::Document)) {
        return inner_html(doc, id);
    }
    let mut out = String::new();
    write_all(doc, vec![Step::Open { id, raw_parent: false }], &mut out);
    out
}

/// Pending serialization work
enum Step {
    Open { id: NodeId, raw_parent: bool },
    Close(NodeId),
}

fn push_children<D: DocumentAccess>(doc: &D, id: NodeId, raw: bool, stack: &mut Vec<Step>) {
    stack.extend(
        doc.children_vec(id)
            .into_iter()
            .rev()
            .map(|child| Step::Open { id: child, raw_parent: raw }),
    );
}

fn write_all<D: DocumentAccess>(doc: &D, mut stack: Vec<Step>, out: &mut String) {
    while let Some(step) = stack.pop() {
        match step {
            Step::Open { id, raw_parent } => write_open(doc, id, raw_parent, out, &mut stack),
            Step::Close(id) => {
                if let Some(element) = doc.element(id) {
                    out.push_str("</");
                    out.push_str(&element.tag);
                    out.push('>');
                }
            }
        }
    }
}

fn write_open<D: DocumentAccess>(
    doc: &D,
    id: NodeId,
    raw_parent: bool,
    out: &mut String,
    stack: &mut Vec<Step>,
) {
    let Some(node) = doc.get_node(id) else {
        return;
    };
    match &node.data {
        NodeData::Document => push_children(doc, id, false, stack),
        NodeData::Text(text) if raw_parent => out.push_str(text),
        NodeData::Text(text) => out.push_str(&escape_text(text)),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Doctype(text) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(text);
            out.push('>');
        }
        NodeData::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if is_void_element(&element.tag) {
                return;
            }
            stack.push(Step::Close(id));
            push_children(doc, id, is_raw_text_element(&element.tag), stack);
        }
    }
}

/// Concatenated text of all descendant text nodes
pub(crate) fn text_content<D: DocumentAccess>(doc: &D, id: NodeId) -> String {
    match doc.get_node(id).map(|n| &n.data) {
        Some(NodeData::Text(text)) | Some(NodeData::Comment(text)) => text.clone(),
        Some(NodeData::Doctype(_)) | None => String::new(),
        Some(_) => doc
            .descendants_vec(id)
            .into_iter()
            .filter_map(|child| match doc.get_node(child).map(|n| &n.data) {
                Some(NodeData::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect(),
    }
}
