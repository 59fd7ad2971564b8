//! DOM Module - Arena-based mutable HTML document
//!
//! Implements the host document the query layer delegates to:
//! - Arena allocation for nodes, never freed (detached nodes stay addressable)
//! - NodeId (u32) indices with parent/child/sibling links
//! - Markup parsing into the arena and serialization back out
//! - Listener store and capture/target/bubble event dispatch
//! - Ready-state lifecycle with a one-shot "content loaded" signal

mod builder;
pub mod document;
pub mod event;
pub mod node;
mod properties;
mod serialize;
pub mod style;

pub use document::{Document, ReadyState};
pub use event::{Event, EventHandler, EventPhase, ListenerId};
pub use node::{ElementData, Node, NodeData, NodeId, NodeKind};

/// Read access to a document arena
///
/// The selector engine is written against this trait so it can run over a
/// borrowed arena without knowing about the shared `Document` handle.
pub trait DocumentAccess {
    /// Get a node by ID
    fn get_node(&self, id: NodeId) -> Option<&Node>;

    /// The document node
    fn document_node_id(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    /// Element payload of a node
    fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get_node(id).and_then(Node::as_element)
    }

    /// Parent of a node
    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.parent)
    }

    /// Next sibling of a node
    fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.next_sibling)
    }

    /// Previous sibling of a node
    fn prev_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.prev_sibling)
    }

    /// Nearest previous sibling that is an element
    fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.prev_sibling_of(id);
        while let Some(current) = cursor {
            if self.element(current).is_some() {
                return Some(current);
            }
            cursor = self.prev_sibling_of(current);
        }
        None
    }

    /// Nearest next sibling that is an element
    fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.next_sibling_of(id);
        while let Some(current) = cursor {
            if self.element(current).is_some() {
                return Some(current);
            }
            cursor = self.next_sibling_of(current);
        }
        None
    }

    /// Children of a node in order
    fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.get_node(id).and_then(|n| n.first_child);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.next_sibling_of(current);
        }
        out
    }

    /// Descendants of a node in document (pre-)order, excluding the node
    fn descendants_vec(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children_vec(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children_vec(current).into_iter().rev());
        }
        out
    }

    /// Whether `id` lies strictly inside the subtree of `ancestor`
    fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent_of(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent_of(current);
        }
        false
    }
}
