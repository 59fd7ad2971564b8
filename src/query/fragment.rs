//! Detached nodes from markup

use super::Collection;
use crate::dom::{Document, NodeId};

/// Parse markup into detached nodes, wrapped as a collection
///
/// Surrounding whitespace is trimmed first. The markup is not sanitized.
pub fn fragment(doc: &Document, html: &str) -> Collection {
    Collection::from_nodes(doc, fragment_nodes(doc, html))
}

/// Parse markup into detached nodes, returned unwrapped
pub fn fragment_nodes(doc: &Document, html: &str) -> Vec<NodeId> {
    doc.parse_fragment(html.trim())
}
