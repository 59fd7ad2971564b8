//! Host events and listener storage
//!
//! Events carry their propagation flags behind an `Rc` so a clone handed to a
//! wrapping handler (delegation) still stops propagation of the original.

use super::document::Document;
use super::node::NodeId;
use serde_json::Value;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Listener callback; receives the document handle and the event
pub type EventHandler = Rc<dyn Fn(&Document, &Event)>;

/// Dispatch phase, numbered like the DOM constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    None = 0,
    Capturing = 1,
    AtTarget = 2,
    Bubbling = 3,
}

#[derive(Debug, Default)]
struct EventFlags {
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    immediate_propagation_stopped: Cell<bool>,
    dispatched: Cell<bool>,
}

/// An event travelling through the document
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    bubbles: bool,
    cancelable: bool,
    detail: Value,
    target: Cell<Option<NodeId>>,
    current_target: Cell<Option<NodeId>>,
    phase: Cell<EventPhase>,
    flags: Rc<EventFlags>,
}

impl Event {
    /// A bubbling, cancelable event, the shape of a user interaction
    pub fn new(event_type: impl Into<String>) -> Self {
        Event::with_options(event_type, true, true, Value::Null)
    }

    /// A custom event: non-bubbling, non-cancelable, carrying `detail`
    pub fn custom(event_type: impl Into<String>, detail: Value) -> Self {
        Event::with_options(event_type, false, false, detail)
    }

    /// Fully specified event
    pub fn with_options(
        event_type: impl Into<String>,
        bubbles: bool,
        cancelable: bool,
        detail: Value,
    ) -> Self {
        Event {
            event_type: event_type.into(),
            bubbles,
            cancelable,
            detail,
            target: Cell::new(None),
            current_target: Cell::new(None),
            phase: Cell::new(EventPhase::None),
            flags: Rc::new(EventFlags::default()),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// Payload of a custom event (`Value::Null` otherwise)
    pub fn detail(&self) -> &Value {
        &self.detail
    }

    /// Node the event was dispatched to (the document node before dispatch)
    pub fn target(&self) -> NodeId {
        self.target.get().unwrap_or(NodeId::DOCUMENT)
    }

    /// Node whose listener is currently running
    pub fn current_target(&self) -> NodeId {
        self.current_target.get().unwrap_or_else(|| self.target())
    }

    pub fn phase(&self) -> EventPhase {
        self.phase.get()
    }

    /// Cancel the default action; ignored for non-cancelable events
    pub fn prevent_default(&self) {
        if self.cancelable {
            self.flags.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.flags.default_prevented.get()
    }

    /// Stop after the listeners of the current node
    pub fn stop_propagation(&self) {
        self.flags.propagation_stopped.set(true);
    }

    /// Stop right after the running listener
    pub fn stop_immediate_propagation(&self) {
        self.flags.propagation_stopped.set(true);
        self.flags.immediate_propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.flags.propagation_stopped.get()
    }

    pub(crate) fn immediate_propagation_stopped(&self) -> bool {
        self.flags.immediate_propagation_stopped.get()
    }

    /// Same event (shared flags) seen from another current target
    pub fn retargeted(&self, current_target: NodeId) -> Event {
        let event = self.clone();
        event.current_target.set(Some(current_target));
        event
    }

    pub(crate) fn begin_dispatch(&self, target: NodeId) -> bool {
        if self.flags.dispatched.replace(true) {
            return false;
        }
        self.target.set(Some(target));
        true
    }

    pub(crate) fn enter(&self, node: NodeId, phase: EventPhase) {
        self.current_target.set(Some(node));
        self.phase.set(phase);
    }

    pub(crate) fn finish_dispatch(&self) {
        self.current_target.set(None);
        self.phase.set(EventPhase::None);
    }
}

/// Handle returned by listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
pub(crate) struct Listener {
    pub id: ListenerId,
    pub event_type: String,
    pub capture: bool,
    pub handler: EventHandler,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("event_type", &self.event_type)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}

/// Listeners per node, in registration order
#[derive(Debug, Default)]
pub(crate) struct ListenerStore {
    next_id: u64,
    map: HashMap<NodeId, Vec<Listener>>,
}

impl ListenerStore {
    pub fn add(
        &mut self,
        node: NodeId,
        event_type: &str,
        capture: bool,
        handler: EventHandler,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.map.entry(node).or_default().push(Listener {
            id,
            event_type: event_type.to_string(),
            capture,
            handler,
        });
        id
    }

    pub fn remove(&mut self, node: NodeId, id: ListenerId) -> bool {
        let Some(listeners) = self.map.get_mut(&node) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.map.remove(&node);
        }
        removed
    }

    pub fn contains(&self, node: NodeId, id: ListenerId) -> bool {
        self.map
            .get(&node)
            .is_some_and(|listeners| listeners.iter().any(|l| l.id == id))
    }

    /// Snapshot of the listeners for one node and phase
    ///
    /// `capture` of `None` selects both (the at-target phase).
    pub fn snapshot(&self, node: NodeId, event_type: &str, capture: Option<bool>) -> Vec<Listener> {
        self.map
            .get(&node)
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|l| l.event_type == event_type)
                    .filter(|l| capture.is_none_or(|c| l.capture == c))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count(&self, node: NodeId) -> usize {
        self.map.get(&node).map_or(0, Vec::len)
    }
}
