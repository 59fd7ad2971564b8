//! Run code once the document has loaded

use super::Collection;
use crate::dom::{Document, ReadyState};

/// Run `f` now if the document is past loading, else once it finishes
///
/// Registrations are not deduplicated and cannot be cancelled.
pub fn ready(doc: &Document, f: impl FnOnce(&Document) + 'static) {
    if doc.ready_state() != ReadyState::Loading {
        f(doc);
        return;
    }
    tracing::debug!("document loading, deferring ready callback");
    doc.on_content_loaded(f);
}

impl Collection {
    /// `ready` on the collection's document
    pub fn ready(&self, f: impl FnOnce(&Document) + 'static) -> &Self {
        ready(self.document(), f);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::query;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_runs_synchronously_when_loaded() {
        let doc = Document::parse("<p></p>");
        let ran = Rc::new(RefCell::new(false));
        let flag = ran.clone();
        ready(&doc, move |_| *flag.borrow_mut() = true);
        assert!(*ran.borrow());
    }

    #[test]
    fn test_deferred_until_loaded_in_order() {
        let doc = Document::parse_loading("<p></p>");
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in ["a", "b", "a"] {
            let log = order.clone();
            ready(&doc, move |_| log.borrow_mut().push(label));
        }
        assert!(order.borrow().is_empty());
        doc.finish_loading();
        doc.finish_loading();
        assert_eq!(*order.borrow(), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_nested_registration_runs_immediately() {
        let doc = Document::loading();
        let order = Rc::new(RefCell::new(Vec::new()));
        let outer = order.clone();
        ready(&doc, move |doc| {
            outer.borrow_mut().push("outer");
            let inner = outer.clone();
            ready(doc, move |_| inner.borrow_mut().push("inner"));
            outer.borrow_mut().push("after");
        });
        doc.finish_loading();
        assert_eq!(*order.borrow(), vec!["outer", "inner", "after"]);
    }

    #[test]
    fn test_callback_can_query_document() {
        let doc = Document::parse_loading("<p class=\"x\"></p>");
        let count = Rc::new(RefCell::new(0));
        let seen = count.clone();
        query(&doc, ".x").unwrap().ready(move |doc| {
            *seen.borrow_mut() = query(doc, "p").unwrap().len();
        });
        doc.finish_loading();
        assert_eq!(*count.borrow(), 1);
    }
}
