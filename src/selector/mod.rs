//! CSS Selector Engine
//!
//! The matching capability behind `Document::query_selector_all` and
//! `Document::matches`:
//! - Type, universal, id, class and attribute selectors
//! - Structural and form pseudo-classes, `:not()`
//! - Descendant, child, next-sibling and subsequent-sibling combinators
//! - Compiled selector caching (LRU)

pub mod engine;
pub mod lexer;
pub mod matcher;
pub mod parser;

pub use engine::{engine, SelectorEngine, DEFAULT_CACHE_CAPACITY};
pub use parser::{parse, SelectorList};
