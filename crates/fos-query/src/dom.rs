//! Shared document handle
//!
//! Collections hold a [`Dom`], a reference-counted handle to one
//! [`Document`]. Every collection created from the same handle sees the
//! same live tree. Event dispatch lives here rather than on the document
//! because handlers run with no borrow held and may mutate the tree.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use fos_dom::{Document, DomError, DomTree, Event, EventPhase, NodeId};
use fos_html::HtmlParser;

use crate::QueryResult;

/// Handle to a live document
#[derive(Clone)]
pub struct Dom {
    inner: Rc<RefCell<Document>>,
}

/// Non-owning handle, held by delegated listeners
#[derive(Clone)]
pub struct WeakDom {
    inner: Weak<RefCell<Document>>,
}

impl WeakDom {
    pub fn upgrade(&self) -> Option<Dom> {
        self.inner.upgrade().map(|inner| Dom { inner })
    }
}

impl Dom {
    /// Blank document with an empty html/head/body skeleton
    pub fn new() -> QueryResult<Self> {
        Ok(Self::from_document(Document::new("about:blank")?))
    }

    /// Parse a full HTML document
    pub fn parse(html: &str) -> QueryResult<Self> {
        Self::parse_with_url(html, "about:blank")
    }

    pub fn parse_with_url(html: &str, url: &str) -> QueryResult<Self> {
        let document = HtmlParser::new().parse_with_url(html, url)?;
        Ok(Self::from_document(document))
    }

    pub fn from_document(document: Document) -> Self {
        Self {
            inner: Rc::new(RefCell::new(document)),
        }
    }

    /// Run `f` with shared access to the document
    pub fn with_document<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Run `f` with exclusive access to the document
    pub fn with_document_mut<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    pub fn with_tree<R>(&self, f: impl FnOnce(&DomTree) -> R) -> R {
        f(&self.inner.borrow().tree)
    }

    pub fn with_tree_mut<R>(&self, f: impl FnOnce(&mut DomTree) -> R) -> R {
        f(&mut self.inner.borrow_mut().tree)
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        self.with_tree(|tree| tree.root())
    }

    pub fn document_element(&self) -> Option<NodeId> {
        self.with_document(|doc| doc.document_element())
    }

    pub fn body(&self) -> Option<NodeId> {
        self.with_document(|doc| doc.body())
    }

    pub fn title(&self) -> String {
        self.with_document(|doc| doc.title())
    }

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.with_tree_mut(|tree| tree.create_element(tag))
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        self.with_tree_mut(|tree| tree.create_text(text))
    }

    /// Parse markup into detached nodes: one node, or a fragment of several
    pub fn parse_fragment(&self, html: &str) -> QueryResult<NodeId> {
        Ok(self.with_tree_mut(|tree| fos_html::parse_fragment(tree, html))?)
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        self.with_tree(|tree| fos_html::inner_html(tree, node))
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        self.with_tree(|tree| fos_html::outer_html(tree, node))
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.with_tree(|tree| tree.contains_id(node))
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.with_document(|doc| doc.active_element())
    }

    /// Move focus to `node`, firing `blur` on the previously focused
    /// element and then `focus` on the new one
    pub fn focus(&self, node: NodeId) -> QueryResult<()> {
        let previous = self.with_document_mut(|doc| {
            doc.tree.node(node)?;
            Ok::<_, DomError>(doc.set_active_element(node))
        })?;
        if previous == Some(node) {
            return Ok(());
        }
        if let Some(previous) = previous {
            self.dispatch(previous, "blur")?;
        }
        self.dispatch(node, "focus")?;
        Ok(())
    }

    /// Dispatch a fresh event of `event_type` at `target`.
    ///
    /// Returns false when a handler called `prevent_default`.
    pub fn dispatch(&self, target: NodeId, event_type: &str) -> QueryResult<bool> {
        self.dispatch_event(&Event::new(event_type, target))
    }

    /// Dispatch an event: capture from the root down, the target itself,
    /// then bubble back up when the event bubbles
    pub fn dispatch_event(&self, event: &Event) -> QueryResult<bool> {
        let path = self.with_document(|doc| {
            doc.tree.node(event.target)?;
            Ok::<_, DomError>(doc.propagation_path(event.target))
        })?;
        tracing::trace!(event = %event.event_type, target = %event.target, depth = path.len(), "dispatching");

        let ancestors = &path[1..];
        for &node in ancestors.iter().rev() {
            if event.propagation_stopped() {
                break;
            }
            self.invoke(event, node, EventPhase::Capturing, true);
        }

        if !event.propagation_stopped() {
            self.invoke(event, event.target, EventPhase::AtTarget, true);
            self.invoke(event, event.target, EventPhase::AtTarget, false);
        }

        if event.bubbles {
            for &node in ancestors {
                if event.propagation_stopped() {
                    break;
                }
                self.invoke(event, node, EventPhase::Bubbling, false);
            }
        }

        event.set_phase(EventPhase::None);
        Ok(!event.default_prevented())
    }

    /// Run the listeners of one node for one phase. The listener list is
    /// snapshotted first so handlers may bind and unbind freely.
    fn invoke(&self, event: &Event, node: NodeId, phase: EventPhase, capture: bool) {
        let listeners =
            self.with_document(|doc| doc.listeners.listeners(node, &event.event_type, capture));
        if listeners.is_empty() {
            return;
        }
        event.set_current_target(node);
        event.set_phase(phase);
        for listener in listeners {
            listener.call(event);
        }
    }

    /// Whether two handles point at the same document
    pub fn ptr_eq(&self, other: &Dom) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakDom {
        WeakDom {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl fmt::Debug for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Dom");
        debug.field("ptr", &Rc::as_ptr(&self.inner));
        if let Ok(doc) = self.inner.try_borrow() {
            debug.field("url", &doc.url()).field("nodes", &doc.tree.len());
        }
        debug.finish()
    }
}
