//! rustyquery - Minimal DOM querying and manipulation
//!
//! Layers:
//! - core: memchr-accelerated HTML tokenizer
//! - dom: arena document with events and a ready-state lifecycle
//! - selector: CSS selector engine with compiled-selector caching
//! - query: `Collection`, the chainable wrapper over query results
//!
//! ```
//! use rustyquery::{query, Document, StyleValue};
//!
//! let doc = Document::parse(r#"<ul id="list"><li class="item">a</li><li>b</li></ul>"#);
//! let items = query(&doc, "li").unwrap();
//! items.add_class("row").set_css("line-height", "2");
//!
//! assert_eq!(items.len(), 2);
//! assert_eq!(items.css("line-height"), Some(StyleValue::Number(2.0)));
//! assert_eq!(query(&doc, "#list > .item.row").unwrap().len(), 1);
//! ```

mod core;
pub mod dom;
pub mod error;
pub mod query;
pub mod selector;

pub use dom::{Document, Event, EventPhase, ListenerId, NodeId, NodeKind, ReadyState};
pub use error::{Error, Result};
pub use query::{
    fragment, fragment_nodes, query, query_in, ready, AttrValue, Collection, Content, Context,
    Selector, StyleValue,
};
