//! Collection layer
//!
//! The user-facing half of the crate. Everything here talks to the host
//! document through its public API:
//! - Resolver: classify input into a `Collection`
//! - Mutators: class, attribute, property, style and content access
//! - Event binder: direct and delegated listeners
//! - Fragment builder and `ready`

mod collection;
mod events;
mod fragment;
mod mutate;
mod ready;
mod resolve;

pub use collection::Collection;
pub use fragment::{fragment, fragment_nodes};
pub use mutate::{AttrValue, Content, StyleValue};
pub use ready::ready;
pub use resolve::{query, query_in, Context, Selector};
