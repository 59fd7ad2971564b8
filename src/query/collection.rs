//! The wrapped result of every query
//!
//! A `Collection` is an ordered list of node references into a `Document`
//! plus a cached first element. It never owns the nodes: dropping it leaves
//! the document untouched.

use crate::dom::document::Dom;
use crate::dom::{Document, DocumentAccess, NodeId};
use crate::error::Result;
use crate::selector;

/// Ordered, indexable set of nodes of one document
#[derive(Clone)]
pub struct Collection {
    doc: Document,
    nodes: Vec<NodeId>,
    el: Option<NodeId>,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.doc.same_document(&other.doc) && self.nodes == other.nodes
    }
}

impl Collection {
    /// An empty collection over `doc`
    pub fn new(doc: &Document) -> Self {
        Collection {
            doc: doc.clone(),
            nodes: Vec::new(),
            el: None,
        }
    }

    pub(crate) fn from_nodes(doc: &Document, nodes: Vec<NodeId>) -> Self {
        let mut collection = Collection::new(doc);
        collection.wrap(nodes);
        collection
    }

    /// Replace the wrapped nodes
    pub fn wrap(&mut self, nodes: impl IntoIterator<Item = NodeId>) -> &mut Self {
        self.nodes = nodes.into_iter().collect();
        self.el = self.nodes.first().copied();
        self
    }

    /// Parse markup into a collection of detached nodes
    pub fn create(doc: &Document, html: &str) -> Self {
        super::fragment(doc, html)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node, cached at wrap time
    #[inline]
    pub fn el(&self) -> Option<NodeId> {
        self.el
    }

    /// Node at `index`; negative indices count from the end
    pub fn get(&self, index: isize) -> Option<NodeId> {
        let index = if index < 0 {
            self.nodes.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        self.nodes.get(index).copied()
    }

    #[inline]
    pub fn first(&self) -> Option<NodeId> {
        self.get(0)
    }

    #[inline]
    pub fn last(&self) -> Option<NodeId> {
        self.get(-1)
    }

    /// Call `f(node, index)` for every node in order
    pub fn each(&self, mut f: impl FnMut(NodeId, usize)) -> &Self {
        for (index, &node) in self.nodes.iter().enumerate() {
            f(node, index);
        }
        self
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, NodeId>> {
        self.nodes.iter().copied()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The document the nodes belong to
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Parent elements, optionally filtered by a selector
    ///
    /// Order follows the collection and duplicates are kept; the document
    /// node is never returned.
    pub fn parent(&self, selector: Option<&str>) -> Result<Collection> {
        let filter = selector.map(|s| selector::engine().compile(s)).transpose()?;
        let dom = self.doc.dom();
        let parents: Vec<NodeId> = self
            .nodes
            .iter()
            .filter_map(|&node| parent_element(&dom, node))
            .filter(|&parent| filter.as_ref().is_none_or(|list| list.matches(&*dom, parent)))
            .collect();
        Ok(Collection::from_nodes(&self.doc, parents))
    }

    /// Nearest ancestor element of each node matching the selector
    ///
    /// Nodes without a matching ancestor contribute nothing. Without a
    /// selector this is `parent(None)`.
    pub fn ancestor(&self, selector: Option<&str>) -> Result<Collection> {
        let Some(selector) = selector else {
            return self.parent(None);
        };
        let list = selector::engine().compile(selector)?;
        let dom = self.doc.dom();
        let mut found = Vec::new();
        for &node in &self.nodes {
            let mut cursor = parent_element(&dom, node);
            while let Some(current) = cursor {
                if list.matches(&*dom, current) {
                    found.push(current);
                    break;
                }
                cursor = parent_element(&dom, current);
            }
        }
        Ok(Collection::from_nodes(&self.doc, found))
    }

    /// Detach every node from its parent
    pub fn remove(&self) -> &Self {
        for &node in &self.nodes {
            self.doc.remove(node);
        }
        self
    }
}

fn parent_element(dom: &Dom, node: NodeId) -> Option<NodeId> {
    dom.parent_of(node).filter(|&parent| dom.element(parent).is_some())
}

impl<'a> IntoIterator for &'a Collection {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
