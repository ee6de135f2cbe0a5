//! DOM events
//!
//! Listener storage keyed by node, plus the event object handed to
//! handlers. Dispatch itself lives on the document handle that owns the
//! tree, since handlers may mutate the tree while they run.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{DocumentId, NodeId};

/// Events that do not bubble
const NON_BUBBLING: &[&str] = &["focus", "blur", "load", "unload", "mouseenter", "mouseleave"];

/// Whether events of this type bubble
pub fn bubbles(event_type: &str) -> bool {
    !NON_BUBBLING.contains(&event_type)
}

/// Dispatch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// An event travelling through the tree
#[derive(Debug)]
pub struct Event {
    pub event_type: String,
    /// Node the event was dispatched on
    pub target: NodeId,
    pub bubbles: bool,
    pub cancelable: bool,
    current_target: Cell<NodeId>,
    phase: Cell<EventPhase>,
    delegate_target: Cell<Option<NodeId>>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            bubbles: bubbles(event_type),
            cancelable: true,
            current_target: Cell::new(target),
            phase: Cell::new(EventPhase::None),
            delegate_target: Cell::new(None),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Node whose listener is currently running
    pub fn current_target(&self) -> NodeId {
        self.current_target.get()
    }

    pub fn phase(&self) -> EventPhase {
        self.phase.get()
    }

    /// Element matched by a delegated listener's selector
    pub fn delegate_target(&self) -> Option<NodeId> {
        self.delegate_target.get()
    }

    pub fn prevent_default(&self) {
        if self.cancelable {
            self.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub fn set_current_target(&self, node: NodeId) {
        self.current_target.set(node);
    }

    pub fn set_phase(&self, phase: EventPhase) {
        self.phase.set(phase);
    }

    pub fn set_delegate_target(&self, node: Option<NodeId>) {
        self.delegate_target.set(node);
    }
}

/// Event handler function ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub u64);

impl HandlerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        HandlerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Where a delegated wrapper was installed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelegateKey {
    pub document: DocumentId,
    pub node: NodeId,
    pub event_type: String,
    pub selector: String,
    pub capture: bool,
}

/// A listener callback with a stable identity.
///
/// Clones share the identity, so the same handler can be passed to both
/// `on` and `off`. Delegated wrappers installed for this handler are
/// remembered on it, one per (document, node, type, selector, capture).
#[derive(Clone)]
pub struct EventHandler {
    id: HandlerId,
    callback: Rc<dyn Fn(&Event)>,
    delegates: Rc<RefCell<HashMap<DelegateKey, EventHandler>>>,
}

impl EventHandler {
    pub fn new(callback: impl Fn(&Event) + 'static) -> Self {
        Self {
            id: HandlerId::next(),
            callback: Rc::new(callback),
            delegates: Rc::default(),
        }
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn call(&self, event: &Event) {
        (self.callback)(event)
    }

    /// The shared callback without the delegate bookkeeping
    pub fn callback(&self) -> Rc<dyn Fn(&Event)> {
        Rc::clone(&self.callback)
    }

    /// Remember the wrapper installed for a delegated registration
    pub fn remember_delegate(&self, key: DelegateKey, wrapper: EventHandler) {
        self.delegates.borrow_mut().insert(key, wrapper);
    }

    /// Forget and return the wrapper for a delegated registration
    pub fn take_delegate(&self, key: &DelegateKey) -> Option<EventHandler> {
        self.delegates.borrow_mut().remove(key)
    }

    /// Wrapper for a delegated registration, if installed
    pub fn delegate(&self, key: &DelegateKey) -> Option<EventHandler> {
        self.delegates.borrow().get(key).cloned()
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventHandler {}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("id", &self.id)
            .field("delegates", &self.delegates.borrow().len())
            .finish()
    }
}

/// One `addEventListener` registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub event_type: String,
    pub handler: EventHandler,
    pub capture: bool,
}

/// Listener registrations for every node of a document
#[derive(Debug, Default)]
pub struct ListenerTable {
    by_node: HashMap<NodeId, Vec<Registration>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns false when the same (type, handler,
    /// capture) triple is already registered on the node.
    pub fn bind(&mut self, node: NodeId, event_type: &str, handler: EventHandler, capture: bool) -> bool {
        let list = self.by_node.entry(node).or_default();
        let exists = list
            .iter()
            .any(|r| r.event_type == event_type && r.handler == handler && r.capture == capture);
        if exists {
            return false;
        }
        list.push(Registration {
            event_type: event_type.to_string(),
            handler,
            capture,
        });
        true
    }

    /// Remove a listener. Returns whether one was removed.
    pub fn unbind(&mut self, node: NodeId, event_type: &str, handler: &EventHandler, capture: bool) -> bool {
        let Some(list) = self.by_node.get_mut(&node) else {
            return false;
        };
        let before = list.len();
        list.retain(|r| !(r.event_type == event_type && r.handler == *handler && r.capture == capture));
        let removed = list.len() != before;
        if list.is_empty() {
            self.by_node.remove(&node);
        }
        removed
    }

    /// Snapshot of the handlers for one phase of one node
    pub fn listeners(&self, node: NodeId, event_type: &str, capture: bool) -> Vec<EventHandler> {
        self.by_node
            .get(&node)
            .map(|list| {
                list.iter()
                    .filter(|r| r.event_type == event_type && r.capture == capture)
                    .map(|r| r.handler.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of registrations on a node
    pub fn count(&self, node: NodeId) -> usize {
        self.by_node.get(&node).map_or(0, Vec::len)
    }

    /// Drop every registration of a node
    pub fn clear(&mut self, node: NodeId) {
        self.by_node.remove(&node);
    }
}
