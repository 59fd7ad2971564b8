//! Selector Engine
//!
//! Compiles selector strings once and keeps them in an LRU cache, then
//! answers `matches` / `query_all` against any document arena.

use super::matcher::matches_complex;
use super::parser::{self, SelectorList};
use crate::dom::{DocumentAccess, NodeId};
use crate::error::Result;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};

/// Compiled selectors kept by the process-wide engine
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

static ENGINE: OnceLock<SelectorEngine> = OnceLock::new();

/// The process-wide selector engine, created on first use
pub fn engine() -> &'static SelectorEngine {
    ENGINE.get_or_init(SelectorEngine::new)
}

impl SelectorList {
    /// Whether an element matches any selector of the list
    pub fn matches<D: DocumentAccess>(&self, doc: &D, id: NodeId) -> bool {
        self.0.iter().any(|complex| matches_complex(doc, complex, id))
    }
}

/// Selector compiler with a cache of compiled lists
pub struct SelectorEngine {
    cache: Mutex<LruCache<String, Arc<SelectorList>>>,
}

impl std::fmt::Debug for SelectorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectorEngine")
            .field("cached", &self.cached())
            .finish()
    }
}

impl Default for SelectorEngine {
    fn default() -> Self {
        SelectorEngine::new()
    }
}

impl SelectorEngine {
    pub fn new() -> Self {
        SelectorEngine::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Engine caching up to `capacity` compiled selectors (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        SelectorEngine {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, LruCache<String, Arc<SelectorList>>> {
        // A panic while holding the lock cannot leave the cache inconsistent
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of compiled selectors currently cached
    pub fn cached(&self) -> usize {
        self.cache().len()
    }

    /// Compile a selector, reusing a cached compilation when present
    ///
    /// Failures are not cached.
    pub fn compile(&self, selector: &str) -> Result<Arc<SelectorList>> {
        if let Some(list) = self.cache().get(selector) {
            return Ok(Arc::clone(list));
        }
        let list = Arc::new(parser::parse(selector)?);
        tracing::trace!(selector, "compiled selector");
        self.cache().put(selector.to_string(), Arc::clone(&list));
        Ok(list)
    }

    /// Whether an element matches the selector (false for non-elements)
    pub fn matches<D: DocumentAccess>(&self, doc: &D, id: NodeId, selector: &str) -> Result<bool> {
        let list = self.compile(selector)?;
        Ok(list.matches(doc, id))
    }

    /// Elements under `root` (excluding `root`) matching the selector, in
    /// document order
    pub fn query_all<D: DocumentAccess>(
        &self,
        doc: &D,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>> {
        let list = self.compile(selector)?;
        Ok(doc
            .descendants_vec(root)
            .into_iter()
            .filter(|&id| list.matches(doc, id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::error::Error;

    #[test]
    fn test_cache_reuse_and_eviction() {
        let engine = SelectorEngine::with_capacity(2);
        let first = engine.compile("div").unwrap();
        let again = engine.compile("div").unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        engine.compile("p").unwrap();
        engine.compile("span").unwrap();
        assert_eq!(engine.cached(), 2);
        let evicted = engine.compile("div").unwrap();
        assert!(!Arc::ptr_eq(&first, &evicted));
    }

    #[test]
    fn test_errors_not_cached() {
        let engine = SelectorEngine::with_capacity(0);
        assert!(matches!(engine.compile("[x"), Err(Error::InvalidSelector { .. })));
        assert_eq!(engine.cached(), 0);
    }

    #[test]
    fn test_query_all_scoped_to_root() {
        let doc = Document::parse("<p class=\"x\"></p><div><p class=\"x\"></p></div>");
        let div = doc.elements_by_tag_name(NodeId::DOCUMENT, "div")[0];
        let dom = doc.dom();
        let all = engine().query_all(&*dom, NodeId::DOCUMENT, "p.x").unwrap();
        assert_eq!(all.len(), 2);
        let scoped = engine().query_all(&*dom, div, "p.x").unwrap();
        assert_eq!(scoped, vec![all[1]]);
        assert!(!engine().matches(&*dom, div, "p").unwrap());
        assert!(!engine().matches(&*dom, NodeId::DOCUMENT, "*").unwrap());
    }

    #[test]
    fn test_engine_is_shared() {
        assert!(std::ptr::eq(engine(), engine()));
    }
}
