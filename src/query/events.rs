//! Listener binding, direct and delegated

use super::Collection;
use crate::dom::{Document, Event, EventHandler};
use crate::error::Result;
use crate::selector;
use serde_json::Value;
use std::rc::Rc;

impl Collection {
    /// Bind `handler` for each space-separated event name on every element
    pub fn on(&self, events: &str, handler: impl Fn(&Document, &Event) + 'static) -> &Self {
        self.bind(events, Rc::new(handler), false);
        self
    }

    /// Bind a delegated handler: it runs only when the event's direct target
    /// matches `selector`, with `current_target` set to that target
    pub fn on_delegate(
        &self,
        events: &str,
        selector: &str,
        handler: impl Fn(&Document, &Event) + 'static,
    ) -> Result<&Self> {
        self.on_with(events, Some(selector), handler, false)
    }

    /// Full form of `on`: optional delegation selector and capture flag
    pub fn on_with(
        &self,
        events: &str,
        selector: Option<&str>,
        handler: impl Fn(&Document, &Event) + 'static,
        use_capture: bool,
    ) -> Result<&Self> {
        let handler: EventHandler = match selector {
            None => Rc::new(handler),
            Some(selector) => {
                let list = selector::engine().compile(selector)?;
                let selector = selector.to_string();
                Rc::new(move |doc: &Document, event: &Event| {
                    let target = event.target();
                    let hit = list.matches(&*doc.dom(), target);
                    if hit {
                        handler(doc, &event.retargeted(target));
                    } else {
                        tracing::trace!(
                            selector = selector.as_str(),
                            event = event.event_type(),
                            target = %target,
                            "delegated event skipped"
                        );
                    }
                })
            }
        };
        self.bind(events, handler, use_capture);
        Ok(self)
    }

    fn bind(&self, events: &str, handler: EventHandler, use_capture: bool) {
        let doc = self.document();
        for node in self {
            if !doc.is_element(node) {
                continue;
            }
            for event_type in events.split_ascii_whitespace() {
                doc.add_event_listener(node, event_type, use_capture, Rc::clone(&handler));
            }
        }
    }

    /// Dispatch a non-bubbling, non-cancelable custom event at every node
    pub fn trigger(&self, event_type: &str, detail: impl Into<Value>) -> &Self {
        let detail = detail.into();
        for node in self {
            self.document()
                .dispatch_event(node, &Event::custom(event_type, detail.clone()));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::{Document, Event, NodeId};
    use crate::error::Error;
    use crate::query::query;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    const LIST: &str = r#"<ul id="list"><li class="item" id="a"><b id="inner">x</b></li><li id="b"></li></ul>"#;

    fn node(doc: &Document, id: &str) -> NodeId {
        doc.element_by_id(NodeId::DOCUMENT, id).unwrap()
    }

    #[test]
    fn test_direct_binding_multiple_events() {
        let doc = Document::parse(LIST);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        query(&doc, "li")
            .unwrap()
            .on("click  focus", move |_, event| {
                log.borrow_mut().push(event.event_type().to_string())
            });
        doc.click(node(&doc, "b"));
        doc.dispatch_event(node(&doc, "a"), &Event::new("focus"));
        assert_eq!(*seen.borrow(), vec!["click", "focus"]);
        assert_eq!(doc.listener_count(node(&doc, "a")), 2);
    }

    #[test]
    fn test_delegation_tests_direct_target_only() {
        let doc = Document::parse(LIST);
        let hits = Rc::new(RefCell::new(Vec::new()));
        let log = hits.clone();
        query(&doc, "#list")
            .unwrap()
            .on_delegate("click", ".item", move |_, event| {
                log.borrow_mut().push(event.current_target())
            })
            .unwrap();

        doc.click(node(&doc, "a"));
        doc.click(node(&doc, "inner"));
        doc.click(node(&doc, "b"));
        assert_eq!(*hits.borrow(), vec![node(&doc, "a")]);
    }

    #[test]
    fn test_delegated_handler_can_stop_propagation() {
        let doc = Document::parse(r#"<div id="outer"><ul id="list"><li class="item" id="a"></li></ul></div>"#);
        let reached = Rc::new(RefCell::new(false));
        let flag = reached.clone();
        query(&doc, "#outer")
            .unwrap()
            .on("click", move |_, _| *flag.borrow_mut() = true);
        query(&doc, "#list")
            .unwrap()
            .on_delegate("click", "li", |_, event| event.stop_propagation())
            .unwrap();

        doc.click(node(&doc, "a"));
        assert!(!*reached.borrow());
    }

    #[test]
    fn test_invalid_delegate_selector_fails_at_bind() {
        let doc = Document::parse(LIST);
        let list = query(&doc, "#list").unwrap();
        let result = list.on_delegate("click", "li[", |_, _| {});
        assert!(matches!(result, Err(Error::InvalidSelector { .. })));
        assert_eq!(doc.listener_count(node(&doc, "list")), 0);
    }

    #[test]
    fn test_capture_binding() {
        let doc = Document::parse(LIST);
        let order = Rc::new(RefCell::new(Vec::new()));
        let capture_log = order.clone();
        let target_log = order.clone();
        query(&doc, "#list")
            .unwrap()
            .on_with("click", None, move |_, _| capture_log.borrow_mut().push("list"), true)
            .unwrap();
        query(&doc, "#inner")
            .unwrap()
            .on("click", move |_, _| target_log.borrow_mut().push("inner"));
        doc.click(node(&doc, "inner"));
        assert_eq!(*order.borrow(), vec!["list", "inner"]);
    }

    #[test]
    fn test_trigger_custom_event() {
        let doc = Document::parse(LIST);
        let details = Rc::new(RefCell::new(Vec::new()));
        let log = details.clone();
        query(&doc, "#list")
            .unwrap()
            .on("saved", move |_, event| log.borrow_mut().push(event.detail().clone()));
        query(&doc, "#a").unwrap().trigger("saved", json!({ "n": 1 }));
        query(&doc, "#list").unwrap().trigger("saved", json!({ "n": 2 }));
        assert_eq!(*details.borrow(), vec![json!({ "n": 2 })]);
    }
}
