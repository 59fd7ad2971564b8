//! HTML Document - Arena-based DOM representation
//!
//! Mutable DOM storage with:
//! - Arena allocation for nodes (`Dom`), NodeId indices for traversal
//! - A shared, cheaply cloneable `Document` handle over the arena
//! - Listener store and event dispatch
//! - Ready-state lifecycle
//!
//! No borrow of the arena is held while listeners or ready callbacks run, so
//! callbacks can freely query and mutate the document they were given.

use super::builder::build_into;
use super::event::{Event, EventHandler, EventPhase, ListenerId, ListenerStore};
use super::node::{ElementData, Node, NodeData, NodeId, NodeKind};
use super::serialize;
use super::style;
use super::DocumentAccess;
use crate::error::Result;
use crate::selector;
use serde_json::Value;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// The arena of nodes; node 0 is the document node
///
/// Nodes are never freed: a `NodeId` stays valid for the life of the
/// document, so removed and replaced subtrees keep their slots. Memory grows
/// with every node ever parsed or created (one slot per element, text or
/// comment); fragment parsing reuses a single detached container. The arena
/// holds at most `u32::MAX` nodes, after which allocation fails.
#[derive(Debug, Clone)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
    fragment_host: Option<NodeId>,
}

impl Dom {
    fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(Node::document());
        Dom {
            nodes,
            fragment_host: None,
        }
    }

    /// Add a node to the arena, unattached; None once ids are exhausted
    pub(crate) fn alloc(&mut self, node: Node) -> Option<NodeId> {
        let id = NodeId(u32::try_from(self.nodes.len()).ok()?);
        self.nodes.push(node);
        Some(id)
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    #[inline]
    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Unlink a node from its parent and siblings; the subtree stays intact
    pub(crate) fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        if let Some(prev) = prev {
            self.nodes[prev.index()].next_sibling = next;
        } else if let Some(parent) = parent {
            self.nodes[parent.index()].first_child = next;
        }
        if let Some(next) = next {
            self.nodes[next.index()].prev_sibling = prev;
        } else if let Some(parent) = parent {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Whether `child` may be inserted under `parent`
    fn can_insert(&self, parent: NodeId, child: NodeId) -> bool {
        let parent_ok = self
            .get(parent)
            .is_some_and(|n| matches!(n.kind(), NodeKind::Element | NodeKind::Document));
        let child_ok = self
            .get(child)
            .is_some_and(|n| n.kind() != NodeKind::Document);
        parent_ok && child_ok && child != parent && !self.is_descendant_of(parent, child)
    }

    /// Insert `child` under `parent` before `reference` (append when None)
    pub(crate) fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> bool {
        if !self.can_insert(parent, child) {
            return false;
        }
        if let Some(reference) = reference {
            if reference == child || self.parent_of(reference) != Some(parent) {
                return false;
            }
        }
        self.detach(child);

        match reference {
            Some(reference) => {
                let prev = self.nodes[reference.index()].prev_sibling;
                self.nodes[reference.index()].prev_sibling = Some(child);
                match prev {
                    Some(prev) => self.nodes[prev.index()].next_sibling = Some(child),
                    None => self.nodes[parent.index()].first_child = Some(child),
                }
                let node = &mut self.nodes[child.index()];
                node.prev_sibling = prev;
                node.next_sibling = Some(reference);
            }
            None => {
                let last = self.nodes[parent.index()].last_child;
                match last {
                    Some(last) => self.nodes[last.index()].next_sibling = Some(child),
                    None => self.nodes[parent.index()].first_child = Some(child),
                }
                self.nodes[parent.index()].last_child = Some(child);
                self.nodes[child.index()].prev_sibling = last;
            }
        }
        self.nodes[child.index()].parent = Some(parent);
        true
    }

    #[inline]
    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.insert_before(parent, child, None)
    }

    /// Detach every child of a node
    fn clear_children(&mut self, id: NodeId) {
        for child in self.children_vec(id) {
            self.detach(child);
        }
    }

    /// Copy a node (and optionally its subtree) into a new detached node
    pub(crate) fn clone_node(&mut self, id: NodeId, deep: bool) -> Option<NodeId> {
        if self.get(id)?.kind() == NodeKind::Document {
            return None;
        }
        let copy = self.alloc_copy(id)?;
        if !deep {
            return Some(copy);
        }
        // (source, copy of its parent)
        let mut stack: Vec<(NodeId, NodeId)> = self
            .children_vec(id)
            .into_iter()
            .rev()
            .map(|child| (child, copy))
            .collect();
        while let Some((source, parent)) = stack.pop() {
            let Some(child_copy) = self.alloc_copy(source) else {
                break;
            };
            self.append_child(parent, child_copy);
            stack.extend(
                self.children_vec(source)
                    .into_iter()
                    .rev()
                    .map(|child| (child, child_copy)),
            );
        }
        Some(copy)
    }

    /// A detached node carrying a copy of `id`'s data
    fn alloc_copy(&mut self, id: NodeId) -> Option<NodeId> {
        let data = self.get(id)?.data.clone();
        self.alloc(Node {
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            data,
        })
    }

    /// Parse markup into detached nodes, in order
    pub(crate) fn parse_fragment(&mut self, html: &str) -> Vec<NodeId> {
        let container = match self.fragment_host {
            Some(host) => host,
            None => {
                let Some(host) = self.alloc(Node::element(ElementData::new("template"))) else {
                    return Vec::new();
                };
                self.fragment_host = Some(host);
                host
            }
        };
        build_into(self, container, html);
        let children = self.children_vec(container);
        for &child in &children {
            self.detach(child);
        }
        children
    }

    pub(crate) fn set_inner_html(&mut self, id: NodeId, html: &str) {
        if !matches!(
            self.get(id).map(Node::kind),
            Some(NodeKind::Element | NodeKind::Document)
        ) {
            return;
        }
        self.clear_children(id);
        build_into(self, id, html);
    }

    pub(crate) fn set_outer_html(&mut self, id: NodeId, html: &str) {
        let Some(parent) = self.parent_of(id) else {
            return;
        };
        if self.element(id).is_none() {
            return;
        }
        for node in self.parse_fragment(html) {
            self.insert_before(parent, node, Some(id));
        }
        self.detach(id);
    }

    pub(crate) fn set_text_content(&mut self, id: NodeId, text: &str) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        match &mut node.data {
            NodeData::Text(data) | NodeData::Comment(data) => {
                *data = text.to_string();
                return;
            }
            NodeData::Element(_) => {}
            NodeData::Document | NodeData::Doctype(_) => return,
        }
        self.clear_children(id);
        if text.is_empty() {
            return;
        }
        if let Some(text_node) = self.alloc(Node::text(text)) {
            self.append_child(id, text_node);
        }
    }

    /// Current value of a form control
    pub(crate) fn value(&self, id: NodeId) -> Option<String> {
        let element = self.element(id)?;
        if let Some(value) = &element.value {
            return Some(value.clone());
        }
        let value = match element.tag.as_str() {
            "textarea" => serialize::text_content(self, id),
            "select" => {
                let options: Vec<NodeId> = self
                    .descendants_vec(id)
                    .into_iter()
                    .filter(|&n| self.element(n).is_some_and(|e| e.tag == "option"))
                    .collect();
                let chosen = options
                    .iter()
                    .copied()
                    .find(|&n| self.element(n).is_some_and(|e| e.attr("selected").is_some()))
                    .or_else(|| options.first().copied());
                chosen.and_then(|n| self.value(n)).unwrap_or_default()
            }
            "option" => element
                .attr("value")
                .map(str::to_string)
                .unwrap_or_else(|| serialize::text_content(self, id).trim().to_string()),
            "input" if element.attr("value").is_none()
                && matches!(element.attr("type"), Some("checkbox" | "radio")) =>
            {
                "on".to_string()
            }
            _ => element.attr("value").unwrap_or("").to_string(),
        };
        Some(value)
    }

    fn update_classes(&mut self, id: NodeId, update: impl FnOnce(&mut Vec<String>)) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        let mut classes: Vec<String> = Vec::new();
        for class in element.classes() {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }
        update(&mut classes);
        element.set_attr("class", classes.join(" "));
    }
}

impl DocumentAccess for Dom {
    #[inline]
    fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.get(id)
    }
}

/// Document loading state, as exposed by `document.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

type ReadyCallback = Box<dyn FnOnce(&Document)>;

struct Lifecycle {
    state: ReadyState,
    pending: Vec<ReadyCallback>,
}

struct Inner {
    dom: RefCell<Dom>,
    listeners: RefCell<ListenerStore>,
    lifecycle: RefCell<Lifecycle>,
}

/// Shared handle to a document
///
/// Cloning the handle is cheap and every clone refers to the same nodes.
#[derive(Clone)]
pub struct Document {
    inner: Rc<Inner>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.node_count())
            .field("ready_state", &self.ready_state())
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    fn with_state(state: ReadyState) -> Self {
        Document {
            inner: Rc::new(Inner {
                dom: RefCell::new(Dom::new()),
                listeners: RefCell::new(ListenerStore::default()),
                lifecycle: RefCell::new(Lifecycle {
                    state,
                    pending: Vec::new(),
                }),
            }),
        }
    }

    /// An empty, fully loaded document
    pub fn new() -> Self {
        Document::with_state(ReadyState::Complete)
    }

    /// An empty document that is still loading
    pub fn loading() -> Self {
        Document::with_state(ReadyState::Loading)
    }

    /// Parse markup into a fully loaded document
    pub fn parse(html: &str) -> Self {
        let doc = Document::new();
        doc.dom_mut().set_inner_html(NodeId::DOCUMENT, html);
        doc
    }

    /// Parse markup into a document that is still loading
    pub fn parse_loading(html: &str) -> Self {
        let doc = Document::loading();
        doc.dom_mut().set_inner_html(NodeId::DOCUMENT, html);
        doc
    }

    #[inline]
    pub(crate) fn dom(&self) -> Ref<'_, Dom> {
        self.inner.dom.borrow()
    }

    #[inline]
    pub(crate) fn dom_mut(&self) -> RefMut<'_, Dom> {
        self.inner.dom.borrow_mut()
    }

    /// Whether two handles refer to the same document
    pub fn same_document(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The document node
    #[inline]
    pub fn document_node(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    /// Number of nodes ever allocated (detached ones included)
    pub fn node_count(&self) -> usize {
        self.dom().nodes.len()
    }

    /// Whether the id names a node of this document
    pub fn contains(&self, id: NodeId) -> bool {
        self.dom().get(id).is_some()
    }

    /// Whether the node is attached under the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == NodeId::DOCUMENT || self.dom().is_descendant_of(id, NodeId::DOCUMENT)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.dom().get(id).map(Node::kind)
    }

    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Element)
    }

    /// Lower-cased tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        self.dom().element(id).map(|e| e.tag.clone())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.dom().parent_of(id)
    }

    /// Parent if it is an element (the document node is not)
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let dom = self.dom();
        dom.parent_of(id).filter(|&p| dom.element(p).is_some())
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.dom().children_vec(id)
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.dom().get(id).and_then(|n| n.first_child)
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.dom().get(id).and_then(|n| n.last_child)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.dom().next_sibling_of(id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.dom().prev_sibling_of(id)
    }

    /// Descendants in document order, excluding the node itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.dom().descendants_vec(id)
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// First element under `root` whose `id` attribute equals `id`
    pub fn element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        let dom = self.dom();
        dom.descendants_vec(root)
            .into_iter()
            .find(|&n| dom.element(n).and_then(|e| e.attr("id")) == Some(id))
    }

    /// Elements under `root` with the given tag (`*` for all)
    pub fn elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        let dom = self.dom();
        dom.descendants_vec(root)
            .into_iter()
            .filter(|&n| dom.element(n).is_some_and(|e| tag == "*" || e.tag == tag))
            .collect()
    }

    /// Elements under `root` carrying every class in the whitespace list
    pub fn elements_by_class_name(&self, root: NodeId, names: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = names.split_ascii_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }
        let dom = self.dom();
        dom.descendants_vec(root)
            .into_iter()
            .filter(|&n| {
                dom.element(n)
                    .is_some_and(|e| wanted.iter().all(|w| e.has_class(w)))
            })
            .collect()
    }

    /// All elements under `root` matching a selector, in document order
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        selector::engine().query_all(&*self.dom(), root, selector)
    }

    /// First element under `root` matching a selector
    pub fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(root, selector)?.into_iter().next())
    }

    /// Whether an element matches a selector (false for non-elements)
    pub fn matches(&self, id: NodeId, selector: &str) -> Result<bool> {
        selector::engine().matches(&*self.dom(), id, selector)
    }

    // ------------------------------------------------------------------
    // Attributes, classes, style
    // ------------------------------------------------------------------

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.dom()
            .element(id)
            .and_then(|e| e.attr(&name).map(str::to_string))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// All attributes in source order
    pub fn attributes(&self, id: NodeId) -> Vec<(String, String)> {
        self.dom()
            .element(id)
            .map(|e| e.attrs.clone())
            .unwrap_or_default()
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if let Some(element) = self.dom_mut().element_mut(id) {
            element.set_attr(&name, value);
        }
    }

    pub fn remove_attribute(&self, id: NodeId, name: &str) {
        let name = name.to_ascii_lowercase();
        if let Some(element) = self.dom_mut().element_mut(id) {
            element.remove_attr(&name);
        }
    }

    /// Class tokens of an element, in order
    pub fn class_list(&self, id: NodeId) -> Vec<String> {
        self.dom()
            .element(id)
            .map(|e| e.classes().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.dom().element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&self, id: NodeId, class: &str) {
        self.dom_mut().update_classes(id, |classes| {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        });
    }

    pub fn remove_class(&self, id: NodeId, class: &str) {
        if !self.has_attribute(id, "class") {
            return;
        }
        self.dom_mut()
            .update_classes(id, |classes| classes.retain(|c| c != class));
    }

    /// Flip a class; returns whether it is present afterwards
    pub fn toggle_class(&self, id: NodeId, class: &str) -> bool {
        if !self.is_element(id) {
            return false;
        }
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class);
            true
        }
    }

    /// Inline style value of a property given in camel form
    pub fn style_property(&self, id: NodeId, camel_name: &str) -> Option<String> {
        let name = style::camel_to_hyphen(camel_name)?;
        let dom = self.dom();
        let declarations = style::parse_declarations(dom.element(id)?.attr("style")?);
        declarations
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Set (or, with an empty value, remove) an inline style property
    pub fn set_style_property(&self, id: NodeId, camel_name: &str, value: &str) {
        let Some(name) = style::camel_to_hyphen(camel_name) else {
            return;
        };
        let mut dom = self.dom_mut();
        let Some(element) = dom.element_mut(id) else {
            return;
        };
        let mut declarations = style::parse_declarations(element.attr("style").unwrap_or(""));
        let value = value.trim();
        if value.is_empty() {
            declarations.retain(|(key, _)| *key != name);
        } else {
            match declarations.iter_mut().find(|(key, _)| *key == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => declarations.push((name, value.to_string())),
            }
        }
        element.set_attr("style", style::serialize_declarations(&declarations));
    }

    // ------------------------------------------------------------------
    // Properties and content
    // ------------------------------------------------------------------

    /// Live property of an element
    pub fn property(&self, id: NodeId, key: &str) -> Option<Value> {
        self.dom().property(id, key)
    }

    /// Set a live property of an element
    pub fn set_property(&self, id: NodeId, key: &str, value: Value) {
        self.dom_mut().set_property(id, key, value);
    }

    /// Current value of a form control (`None` for non-elements)
    pub fn value(&self, id: NodeId) -> Option<String> {
        self.dom().value(id)
    }

    pub fn set_value(&self, id: NodeId, value: &str) {
        if let Some(element) = self.dom_mut().element_mut(id) {
            element.value = Some(value.to_string());
        }
    }

    pub fn text_content(&self, id: NodeId) -> Option<String> {
        let dom = self.dom();
        dom.get(id)?;
        Some(serialize::text_content(&*dom, id))
    }

    pub fn set_text_content(&self, id: NodeId, text: &str) {
        self.dom_mut().set_text_content(id, text);
    }

    /// Markup of the children of an element (or the document)
    pub fn inner_html(&self, id: NodeId) -> Option<String> {
        let dom = self.dom();
        match dom.get(id)?.kind() {
            NodeKind::Element | NodeKind::Document => Some(serialize::inner_html(&*dom, id)),
            _ => None,
        }
    }

    /// Replace the children of an element with parsed markup
    pub fn set_inner_html(&self, id: NodeId, html: &str) {
        self.dom_mut().set_inner_html(id, html);
    }

    /// Markup of a node including itself
    pub fn outer_html(&self, id: NodeId) -> Option<String> {
        let dom = self.dom();
        dom.get(id)?;
        Some(serialize::outer_html(&*dom, id))
    }

    /// Replace an attached element with parsed markup
    pub fn set_outer_html(&self, id: NodeId, html: &str) {
        self.dom_mut().set_outer_html(id, html);
    }

    // ------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------

    /// A new detached element; None once the arena is full
    pub fn create_element(&self, tag: &str) -> Option<NodeId> {
        self.dom_mut()
            .alloc(Node::element(ElementData::new(tag.to_ascii_lowercase())))
    }

    /// A new detached text node
    pub fn create_text_node(&self, text: &str) -> Option<NodeId> {
        self.dom_mut().alloc(Node::text(text))
    }

    /// A new detached comment node
    pub fn create_comment(&self, text: &str) -> Option<NodeId> {
        self.dom_mut().alloc(Node::comment(text))
    }

    /// Parse markup into detached nodes, in order
    pub fn parse_fragment(&self, html: &str) -> Vec<NodeId> {
        self.dom_mut().parse_fragment(html)
    }

    /// Move `child` to the end of `parent`; false if the move is not allowed
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.dom_mut().append_child(parent, child)
    }

    /// Move `child` before `reference` under `parent`
    pub fn insert_before(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> bool {
        self.dom_mut().insert_before(parent, child, reference)
    }

    /// Detach a node from its parent
    pub fn remove(&self, id: NodeId) {
        self.dom_mut().detach(id);
    }

    /// Copy a node into a new detached node
    pub fn clone_node(&self, id: NodeId, deep: bool) -> Option<NodeId> {
        self.dom_mut().clone_node(id, deep)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register a listener on a node
    pub fn add_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        capture: bool,
        handler: EventHandler,
    ) -> ListenerId {
        self.inner
            .listeners
            .borrow_mut()
            .add(node, event_type, capture, handler)
    }

    /// Unregister a listener; returns whether it was registered
    pub fn remove_event_listener(&self, node: NodeId, id: ListenerId) -> bool {
        self.inner.listeners.borrow_mut().remove(node, id)
    }

    /// Number of listeners registered on a node
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.inner.listeners.borrow().count(node)
    }

    /// Dispatch an event at `target`
    ///
    /// Runs capture listeners from the top of the tree down, then the
    /// target's own listeners, then (for bubbling events) bubble listeners back
    /// up. Returns false if a listener prevented the default action or the
    /// event was already dispatched.
    pub fn dispatch_event(&self, target: NodeId, event: &Event) -> bool {
        if !self.contains(target) || !event.begin_dispatch(target) {
            tracing::debug!(target = %target, event = event.event_type(), "event not dispatched");
            return false;
        }

        let path: Vec<NodeId> = {
            let dom = self.dom();
            let mut path = Vec::new();
            let mut cursor = dom.parent_of(target);
            while let Some(node) = cursor {
                path.push(node);
                cursor = dom.parent_of(node);
            }
            path
        };

        for &node in path.iter().rev() {
            if event.propagation_stopped() {
                break;
            }
            self.invoke_listeners(node, event, EventPhase::Capturing, Some(true));
        }
        if !event.propagation_stopped() {
            self.invoke_listeners(target, event, EventPhase::AtTarget, None);
        }
        if event.bubbles() {
            for &node in &path {
                if event.propagation_stopped() {
                    break;
                }
                self.invoke_listeners(node, event, EventPhase::Bubbling, Some(false));
            }
        }

        event.finish_dispatch();
        !event.default_prevented()
    }

    fn invoke_listeners(&self, node: NodeId, event: &Event, phase: EventPhase, capture: Option<bool>) {
        event.enter(node, phase);
        let listeners = self
            .inner
            .listeners
            .borrow()
            .snapshot(node, event.event_type(), capture);
        for listener in listeners {
            if event.immediate_propagation_stopped() {
                break;
            }
            // Removed by an earlier listener of this dispatch
            if !self.inner.listeners.borrow().contains(node, listener.id) {
                continue;
            }
            (listener.handler)(self, event);
        }
    }

    /// Dispatch a bubbling, cancelable `click` at `target`
    pub fn click(&self, target: NodeId) -> bool {
        self.dispatch_event(target, &Event::new("click"))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub fn ready_state(&self) -> ReadyState {
        self.inner.lifecycle.borrow().state
    }

    /// Register a one-shot observer of the "content loaded" signal
    ///
    /// Returns false (and drops `callback`) if the signal already fired;
    /// like a late `DOMContentLoaded` listener it would never run.
    pub fn on_content_loaded(&self, callback: impl FnOnce(&Document) + 'static) -> bool {
        let mut lifecycle = self.inner.lifecycle.borrow_mut();
        if lifecycle.state != ReadyState::Loading {
            return false;
        }
        lifecycle.pending.push(Box::new(callback));
        true
    }

    /// Fire the "content loaded" signal: move to `Interactive`, run the
    /// queued observers once, then dispatch `DOMContentLoaded` at the
    /// document node. A no-op unless the document is loading.
    pub fn finish_loading(&self) {
        let pending = {
            let mut lifecycle = self.inner.lifecycle.borrow_mut();
            if lifecycle.state != ReadyState::Loading {
                return;
            }
            lifecycle.state = ReadyState::Interactive;
            std::mem::take(&mut lifecycle.pending)
        };
        tracing::debug!(callbacks = pending.len(), "document content loaded");
        for callback in pending {
            callback(self);
        }
        let event = Event::with_options("DOMContentLoaded", true, false, Value::Null);
        self.dispatch_event(NodeId::DOCUMENT, &event);
    }

    /// Finish loading (if needed) and move to `Complete`
    pub fn mark_complete(&self) {
        self.finish_loading();
        self.inner.lifecycle.borrow_mut().state = ReadyState::Complete;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_parse_simple() {
        let doc = Document::parse("<div id=\"root\">hello</div>");
        let root = doc.element_by_id(NodeId::DOCUMENT, "root").unwrap();
        assert_eq!(doc.tag_name(root).as_deref(), Some("div"));
        assert_eq!(doc.text_content(root).as_deref(), Some("hello"));
        assert_eq!(doc.parent(root), Some(NodeId::DOCUMENT));
        assert_eq!(doc.parent_element(root), None);
    }

    #[test]
    fn test_descendants_order() {
        let doc = Document::parse("<a><b><c></c></b><d></d></a>");
        let tags: Vec<_> = doc
            .descendants(NodeId::DOCUMENT)
            .into_iter()
            .filter_map(|n| doc.tag_name(n))
            .collect();
        assert_eq!(tags, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_siblings() {
        let doc = Document::parse("<ul><li>1</li><li>2<li>3</ul>");
        let items = doc.elements_by_tag_name(NodeId::DOCUMENT, "LI");
        assert_eq!(items.len(), 3);
        assert!(doc.previous_sibling(items[0]).is_none());
        assert_eq!(doc.next_sibling(items[0]), Some(items[1]));
        assert_eq!(doc.parent(items[2]), doc.parent(items[0]));
    }

    #[test]
    fn test_serialization_round_trip() {
        let html = "<!DOCTYPE html><div class=\"a\" title=\"x &amp; &quot;y&quot;\"><br><!--c-->1 &lt; 2<script>a<b</script></div>";
        let doc = Document::parse(html);
        assert_eq!(doc.inner_html(NodeId::DOCUMENT).as_deref(), Some(html));
    }

    #[test]
    fn test_insert_rejects_cycles() {
        let doc = Document::parse("<div><p></p></div>");
        let div = doc.elements_by_tag_name(NodeId::DOCUMENT, "div")[0];
        let p = doc.elements_by_tag_name(NodeId::DOCUMENT, "p")[0];
        assert!(!doc.append_child(p, div));
        assert!(!doc.append_child(p, p));
        assert!(!doc.append_child(div, NodeId::DOCUMENT));
        let text = doc.create_text_node("t").unwrap();
        assert!(!doc.append_child(text, p));
    }

    #[test]
    fn test_insert_before_and_remove() {
        let doc = Document::parse("<ul><li id=\"b\"></li></ul>");
        let ul = doc.elements_by_tag_name(NodeId::DOCUMENT, "ul")[0];
        let b = doc.element_by_id(NodeId::DOCUMENT, "b").unwrap();
        let a = doc.create_element("LI").unwrap();
        doc.set_attribute(a, "id", "a");
        assert!(doc.insert_before(ul, a, Some(b)));
        assert_eq!(doc.inner_html(ul).as_deref(), Some("<li id=\"a\"></li><li id=\"b\"></li>"));

        doc.remove(a);
        assert_eq!(doc.children(ul), vec![b]);
        assert!(!doc.is_connected(a));
        assert!(doc.contains(a));
    }

    #[test]
    fn test_clone_node_deep() {
        let doc = Document::parse("<p class=\"x\">a<b>b</b></p>");
        let p = doc.elements_by_tag_name(NodeId::DOCUMENT, "p")[0];
        let copy = doc.clone_node(p, true).unwrap();
        assert_ne!(copy, p);
        assert_eq!(doc.outer_html(copy), doc.outer_html(p));
        assert_eq!(doc.parent(copy), None);
        let shallow = doc.clone_node(p, false).unwrap();
        assert_eq!(doc.outer_html(shallow).as_deref(), Some("<p class=\"x\"></p>"));
    }

    #[test]
    fn test_deep_nesting_serializes_and_clones() {
        let depth = 10_000;
        let doc = Document::parse(&"<div>".repeat(depth));
        let html = doc.inner_html(NodeId::DOCUMENT).unwrap();
        assert_eq!(html.len(), depth * "<div></div>".len());
        assert!(html.starts_with("<div><div>") && html.ends_with("</div></div>"));

        let outer = doc.elements_by_tag_name(NodeId::DOCUMENT, "div")[0];
        assert_eq!(doc.outer_html(outer).as_deref(), Some(html.as_str()));

        let copy = doc.clone_node(outer, true).unwrap();
        assert_eq!(doc.descendants(copy).len(), depth - 1);
        assert_eq!(doc.outer_html(copy).as_deref(), Some(html.as_str()));
    }

    #[test]
    fn test_fragment_parsing_allocates_only_parsed_nodes() {
        let doc = Document::parse("<a></a>");
        let a = doc.elements_by_tag_name(NodeId::DOCUMENT, "a")[0];
        doc.parse_fragment("<b>i</b>");
        let before = doc.node_count();
        for _ in 0..100 {
            assert_eq!(doc.parse_fragment("<b>i</b>").len(), 1);
        }
        assert_eq!(doc.node_count(), before + 200);

        let before = doc.node_count();
        for _ in 0..100 {
            doc.set_inner_html(a, "<b>i</b>");
            doc.set_outer_html(doc.first_child(a).unwrap(), "<i>j</i>");
        }
        assert_eq!(doc.node_count(), before + 400);
        assert_eq!(doc.inner_html(a).as_deref(), Some("<i>j</i>"));
    }

    #[test]
    fn test_class_list_edits() {
        let doc = Document::parse("<i class=\" a  a b \"></i>");
        let i = doc.elements_by_tag_name(NodeId::DOCUMENT, "i")[0];
        doc.add_class(i, "c");
        assert_eq!(doc.attribute(i, "class").as_deref(), Some("a b c"));
        doc.remove_class(i, "a");
        assert_eq!(doc.class_list(i), vec!["b", "c"]);
        assert!(!doc.toggle_class(i, "b"));
        assert!(doc.toggle_class(i, "b"));
        assert_eq!(doc.class_list(i), vec!["c", "b"]);
    }

    #[test]
    fn test_style_property_backed_by_attribute() {
        let doc = Document::parse("<div style=\"color: red\"></div>");
        let div = doc.elements_by_tag_name(NodeId::DOCUMENT, "div")[0];
        assert_eq!(doc.style_property(div, "color").as_deref(), Some("red"));
        doc.set_style_property(div, "backgroundColor", "blue");
        assert_eq!(
            doc.attribute(div, "style").as_deref(),
            Some("color: red; background-color: blue;")
        );
        doc.set_style_property(div, "color", "");
        assert_eq!(doc.style_property(div, "color"), None);
    }

    #[test]
    fn test_outer_html_replacement() {
        let doc = Document::parse("<div><span>old</span><i></i></div>");
        let span = doc.elements_by_tag_name(NodeId::DOCUMENT, "span")[0];
        let div = doc.elements_by_tag_name(NodeId::DOCUMENT, "div")[0];
        doc.set_outer_html(span, "<b>1</b><b>2</b>");
        assert_eq!(doc.inner_html(div).as_deref(), Some("<b>1</b><b>2</b><i></i>"));
        assert_eq!(doc.parent(span), None);
    }

    #[test]
    fn test_values() {
        let doc = Document::parse(
            "<input id=\"t\" value=\"v\"><input id=\"c\" type=\"checkbox\"><textarea id=\"a\">x &amp; y</textarea>\
             <select id=\"s\"><option>one</option><option value=\"2\" selected>two</option></select>",
        );
        let by = |id: &str| doc.element_by_id(NodeId::DOCUMENT, id).unwrap();
        assert_eq!(doc.value(by("t")).as_deref(), Some("v"));
        assert_eq!(doc.value(by("c")).as_deref(), Some("on"));
        assert_eq!(doc.value(by("a")).as_deref(), Some("x & y"));
        assert_eq!(doc.value(by("s")).as_deref(), Some("2"));
        doc.set_value(by("t"), "typed");
        assert_eq!(doc.value(by("t")).as_deref(), Some("typed"));
        assert_eq!(doc.attribute(by("t"), "value").as_deref(), Some("v"));
    }

    #[test]
    fn test_dispatch_phases_and_order() {
        let doc = Document::parse("<div id=\"outer\"><p id=\"inner\"></p></div>");
        let outer = doc.element_by_id(NodeId::DOCUMENT, "outer").unwrap();
        let inner = doc.element_by_id(NodeId::DOCUMENT, "inner").unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (node, capture, label) in [
            (outer, true, "outer-capture"),
            (outer, false, "outer-bubble"),
            (inner, false, "inner"),
        ] {
            let log = log.clone();
            doc.add_event_listener(
                node,
                "click",
                capture,
                Rc::new(move |_: &Document, event: &Event| {
                    log.borrow_mut().push((label, event.phase(), event.current_target()));
                }),
            );
        }

        assert!(doc.click(inner));
        assert_eq!(
            *log.borrow(),
            vec![
                ("outer-capture", EventPhase::Capturing, outer),
                ("inner", EventPhase::AtTarget, inner),
                ("outer-bubble", EventPhase::Bubbling, outer),
            ]
        );
    }

    #[test]
    fn test_stop_propagation_and_prevent_default() {
        let doc = Document::parse("<div><p></p></div>");
        let div = doc.elements_by_tag_name(NodeId::DOCUMENT, "div")[0];
        let p = doc.elements_by_tag_name(NodeId::DOCUMENT, "p")[0];
        let reached = Rc::new(Cell::new(false));

        doc.add_event_listener(
            p,
            "click",
            false,
            Rc::new(|_: &Document, event: &Event| {
                event.prevent_default();
                event.stop_propagation();
            }),
        );
        let flag = reached.clone();
        doc.add_event_listener(
            div,
            "click",
            false,
            Rc::new(move |_: &Document, _: &Event| flag.set(true)),
        );

        assert!(!doc.click(p));
        assert!(!reached.get());
    }

    #[test]
    fn test_custom_event_does_not_bubble() {
        let doc = Document::parse("<div><p></p></div>");
        let div = doc.elements_by_tag_name(NodeId::DOCUMENT, "div")[0];
        let p = doc.elements_by_tag_name(NodeId::DOCUMENT, "p")[0];
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        doc.add_event_listener(
            div,
            "saved",
            false,
            Rc::new(move |_: &Document, _: &Event| counter.set(counter.get() + 1)),
        );
        doc.dispatch_event(p, &Event::custom("saved", Value::Null));
        doc.dispatch_event(div, &Event::custom("saved", Value::Null));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_listener_can_mutate_document() {
        let doc = Document::parse("<button></button>");
        let button = doc.elements_by_tag_name(NodeId::DOCUMENT, "button")[0];
        doc.add_event_listener(
            button,
            "click",
            false,
            Rc::new(|doc: &Document, event: &Event| {
                doc.set_text_content(event.target(), "clicked");
            }),
        );
        doc.click(button);
        assert_eq!(doc.text_content(button).as_deref(), Some("clicked"));
    }

    #[test]
    fn test_event_dispatched_once() {
        let doc = Document::parse("<p></p>");
        let p = doc.elements_by_tag_name(NodeId::DOCUMENT, "p")[0];
        let event = Event::new("click");
        assert!(doc.dispatch_event(p, &event));
        assert!(!doc.dispatch_event(p, &event));
    }

    #[test]
    fn test_content_loaded_fires_once() {
        let doc = Document::parse_loading("<p></p>");
        assert_eq!(doc.ready_state(), ReadyState::Loading);
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        assert!(doc.on_content_loaded(move |_| counter.set(counter.get() + 1)));

        doc.finish_loading();
        doc.finish_loading();
        assert_eq!(runs.get(), 1);
        assert_eq!(doc.ready_state(), ReadyState::Interactive);
        assert!(!doc.on_content_loaded(|_| {}));

        doc.mark_complete();
        assert_eq!(doc.ready_state(), ReadyState::Complete);
    }
}
