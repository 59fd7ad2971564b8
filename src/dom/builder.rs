//! Tree construction from tokens
//!
//! A small subset of the HTML tree builder:
//! - void elements and self-closing tags never take children
//! - `<p>`, `<li>`, `<option>`, `<dt>`/`<dd>`, `<td>`/`<th>`/`<tr>` are
//!   closed implicitly by a sibling of the same family
//! - an end tag closes the nearest open element with that name, or is
//!   ignored when there is none
//! - DOCTYPE is only kept directly under the document node
//!
//! No `<html>`/`<head>`/`<body>` synthesis and no foster parenting.

use super::document::Dom;
use super::node::{ElementData, Node, NodeData, NodeId};
use super::serialize::is_void_element;
use crate::core::tokenizer::{Token, Tokenizer};

/// Parse `html` and append the resulting nodes under `container`
///
/// Stops early if the arena runs out of node ids.
pub(crate) fn build_into(dom: &mut Dom, container: NodeId, html: &str) {
    let mut stack: Vec<(NodeId, String)> = Vec::new();

    for token in Tokenizer::new(html) {
        let parent = stack.last().map_or(container, |(id, _)| *id);
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                if stack
                    .last()
                    .is_some_and(|(_, open)| closes_implicitly(open, &name))
                {
                    stack.pop();
                }
                let parent = stack.last().map_or(container, |(id, _)| *id);

                let mut data = ElementData::new(&*name);
                data.attrs = attributes.into_iter().map(|a| a.into_owned()).collect();
                let Some(id) = dom.alloc(Node::element(data)) else {
                    return;
                };
                dom.append_child(parent, id);

                if !self_closing && !is_void_element(&name) {
                    stack.push((id, name.into_owned()));
                }
            }
            Token::EndTag { name } => {
                if let Some(pos) = stack.iter().rposition(|(_, open)| *open == name) {
                    stack.truncate(pos);
                }
            }
            Token::Text(text) => {
                if text.is_empty() {
                    continue;
                }
                // Merge with a preceding text sibling
                let last = dom.get(parent).and_then(|n| n.last_child);
                if let Some(NodeData::Text(existing)) =
                    last.and_then(|id| dom.get_mut(id)).map(|n| &mut n.data)
                {
                    existing.push_str(&text);
                    continue;
                }
                let Some(id) = dom.alloc(Node::text(text.into_owned())) else {
                    return;
                };
                dom.append_child(parent, id);
            }
            Token::Comment(text) => {
                let Some(id) = dom.alloc(Node::comment(text)) else {
                    return;
                };
                dom.append_child(parent, id);
            }
            Token::Doctype(text) => {
                if parent == NodeId::DOCUMENT {
                    let Some(id) = dom.alloc(Node::doctype(text)) else {
                        return;
                    };
                    dom.append_child(parent, id);
                }
            }
        }
    }
}

/// Whether opening `new_tag` closes the currently open `open_tag`
fn closes_implicitly(open_tag: &str, new_tag: &str) -> bool {
    match open_tag {
        "p" => matches!(
            new_tag,
            "p" | "div" | "ul" | "ol" | "dl" | "table" | "section" | "article" | "aside"
                | "header" | "footer" | "nav" | "form" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
                | "pre" | "blockquote" | "hr"
        ),
        "li" => new_tag == "li",
        "option" => matches!(new_tag, "option" | "optgroup"),
        "dt" | "dd" => matches!(new_tag, "dt" | "dd"),
        "td" | "th" => matches!(new_tag, "td" | "th" | "tr"),
        "tr" => new_tag == "tr",
        _ => false,
    }
}
