//! Input classification
//!
//! Turns a string, node, node list or ready callback into a `Collection`.
//! Strings take the first matching path:
//! 1. markup (`<tag ...>` or `<!...>`) -> fragment
//! 2. `#id`, `tag` or `.class` -> direct lookup against the context
//! 3. anything else -> the selector engine

use super::{fragment, ready, Collection};
use crate::dom::{Document, NodeId};
use crate::error::Result;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static HTML_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<(?:[A-Za-z][^\s/>]*|!)[^>]*>").expect("valid pattern")
});

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([\w-]*)$").expect("valid pattern"));

static TAG_OR_CLASS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\.)?([\w-]+)$").expect("valid pattern"));

/// Anything a collection can be built from
pub enum Selector {
    /// Markup or a selector string
    Str(String),
    Node(NodeId),
    Nodes(Vec<NodeId>),
    /// Callback deferred until the document is ready
    Ready(Box<dyn FnOnce(&Document)>),
    Empty,
}

impl Selector {
    /// A ready callback, as accepted by `query`
    pub fn ready(f: impl FnOnce(&Document) + 'static) -> Self {
        Selector::Ready(Box::new(f))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Selector::Node(id) => f.debug_tuple("Node").field(id).finish(),
            Selector::Nodes(ids) => f.debug_tuple("Nodes").field(ids).finish(),
            Selector::Ready(_) => f.write_str("Ready(..)"),
            Selector::Empty => f.write_str("Empty"),
        }
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        Selector::Str(s.to_string())
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::Str(s)
    }
}

impl From<&String> for Selector {
    fn from(s: &String) -> Self {
        Selector::Str(s.clone())
    }
}

impl From<NodeId> for Selector {
    fn from(id: NodeId) -> Self {
        Selector::Node(id)
    }
}

impl From<Vec<NodeId>> for Selector {
    fn from(ids: Vec<NodeId>) -> Self {
        Selector::Nodes(ids)
    }
}

impl From<&[NodeId]> for Selector {
    fn from(ids: &[NodeId]) -> Self {
        Selector::Nodes(ids.to_vec())
    }
}

impl From<&Collection> for Selector {
    fn from(collection: &Collection) -> Self {
        Selector::Nodes(collection.nodes().to_vec())
    }
}

impl<T: Into<Selector>> From<Option<T>> for Selector {
    fn from(value: Option<T>) -> Self {
        value.map_or(Selector::Empty, Into::into)
    }
}

/// Root that direct lookups and selector queries run under
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Context {
    #[default]
    Document,
    Node(NodeId),
    /// Context taken from an empty collection; every lookup is empty
    Empty,
}

impl From<NodeId> for Context {
    fn from(id: NodeId) -> Self {
        Context::Node(id)
    }
}

impl From<&Collection> for Context {
    fn from(collection: &Collection) -> Self {
        collection.el().map_or(Context::Empty, Context::Node)
    }
}

impl Context {
    fn root(self) -> Option<NodeId> {
        match self {
            Context::Document => Some(NodeId::DOCUMENT),
            Context::Node(id) => Some(id),
            Context::Empty => None,
        }
    }
}

/// Build a collection against the whole document
pub fn query(doc: &Document, selector: impl Into<Selector>) -> Result<Collection> {
    query_in(doc, selector, Context::Document)
}

/// Build a collection with lookups rooted at `context`
///
/// Missing elements give an empty collection. Only a selector string the
/// engine cannot compile is an error.
pub fn query_in(
    doc: &Document,
    selector: impl Into<Selector>,
    context: impl Into<Context>,
) -> Result<Collection> {
    let context = context.into();
    let mut collection = Collection::new(doc);

    match selector.into() {
        Selector::Str(s) => return resolve_str(doc, &s, context),
        Selector::Node(id) => {
            if doc.contains(id) {
                collection.wrap([id]);
            }
        }
        Selector::Nodes(ids) => {
            collection.wrap(ids.into_iter().filter(|&id| doc.contains(id)));
        }
        Selector::Ready(callback) => ready(doc, callback),
        Selector::Empty => {}
    }
    Ok(collection)
}

fn resolve_str(doc: &Document, s: &str, context: Context) -> Result<Collection> {
    let mut collection = Collection::new(doc);

    if HTML_PATTERN.is_match(s) {
        tracing::trace!(path = "html", len = s.len(), "resolving selector");
        return Ok(fragment(doc, s));
    }

    let Some(root) = context.root() else {
        tracing::trace!(selector = s, "empty context");
        return Ok(collection);
    };

    if let Some(caps) = ID_PATTERN.captures(s) {
        tracing::trace!(path = "id", selector = s, "resolving selector");
        if let Some(hit) = doc.element_by_id(root, &caps[1]) {
            collection.wrap([hit]);
        }
    } else if let Some(caps) = TAG_OR_CLASS_PATTERN.captures(s) {
        if caps.get(1).is_some() {
            tracing::trace!(path = "class", selector = s, "resolving selector");
            collection.wrap(doc.elements_by_class_name(root, &caps[2]));
        } else {
            tracing::trace!(path = "tag", selector = s, "resolving selector");
            collection.wrap(doc.elements_by_tag_name(root, &caps[2]));
        }
    } else {
        tracing::trace!(path = "engine", selector = s, "resolving selector");
        collection.wrap(doc.query_selector_all(root, s)?);
    }
    Ok(collection)
}
