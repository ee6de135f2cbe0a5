//! Event binding with optional delegation
//!
//! Without a selector the handler is registered directly on each element.
//! With one, a wrapper is registered instead; it runs the handler only
//! when the event target, or an ancestor of it up to the bound element,
//! matches the selector. The wrapper is remembered on the handler so the
//! same handler and selector can later unbind it.

use std::rc::Rc;

use fos_css::SelectorMatcher;
use fos_dom::{DelegateKey, EventHandler, NodeId};

use crate::{Collection, QueryResult};

impl Collection {
    /// Register `handler` for `event` on every node
    pub fn on(
        &self,
        event: &str,
        selector: Option<&str>,
        handler: &EventHandler,
        capture: bool,
    ) -> QueryResult<&Self> {
        let Some(selector) = selector else {
            self.dom().with_document_mut(|doc| {
                for node in self.iter() {
                    doc.listeners.bind(node, event, handler.clone(), capture);
                }
            });
            return Ok(self);
        };

        let list = Rc::new(fos_css::parse_selector(selector)?);
        let document = self.dom().with_document(|doc| doc.id());
        for node in self.iter() {
            let key = DelegateKey {
                document,
                node,
                event_type: event.to_string(),
                selector: selector.to_string(),
                capture,
            };
            if handler.delegate(&key).is_some() {
                continue;
            }

            let weak = self.dom().downgrade();
            let list = Rc::clone(&list);
            let callback = handler.callback();
            let wrapper = EventHandler::new(move |e| {
                let Some(dom) = weak.upgrade() else {
                    return;
                };
                let hit = dom.with_document(|doc| {
                    let start = if doc.tree.is_element(e.target) {
                        Some(e.target)
                    } else {
                        doc.tree.parent(e.target)
                    };
                    start.and_then(|start| {
                        SelectorMatcher::new(&doc.tree)
                            .with_focus(doc.active_element())
                            .closest(start, &list, Some(node))
                    })
                });
                if let Some(hit) = hit {
                    e.set_delegate_target(Some(hit));
                    callback(e);
                    e.set_delegate_target(None);
                }
            });

            self.dom()
                .with_document_mut(|doc| doc.listeners.bind(node, event, wrapper.clone(), capture));
            handler.remember_delegate(key, wrapper);
        }
        tracing::debug!(event, selector, nodes = self.len(), "delegated listener bound");
        Ok(self)
    }

    /// Unregister a handler bound with the same event, selector and capture
    pub fn off(
        &self,
        event: &str,
        selector: Option<&str>,
        handler: &EventHandler,
        capture: bool,
    ) -> QueryResult<&Self> {
        let Some(selector) = selector else {
            self.dom().with_document_mut(|doc| {
                for node in self.iter() {
                    doc.listeners.unbind(node, event, handler, capture);
                }
            });
            return Ok(self);
        };

        let document = self.dom().with_document(|doc| doc.id());
        for node in self.iter() {
            let key = DelegateKey {
                document,
                node,
                event_type: event.to_string(),
                selector: selector.to_string(),
                capture,
            };
            match handler.take_delegate(&key) {
                Some(wrapper) => {
                    self.dom()
                        .with_document_mut(|doc| doc.listeners.unbind(node, event, &wrapper, capture));
                }
                None => tracing::warn!(%node, event, selector, "no delegated listener to remove"),
            }
        }
        Ok(self)
    }

    /// Dispatch `event` at every node in turn
    pub fn trigger(&self, event: &str) -> QueryResult<&Self> {
        for node in self.iter() {
            self.dom().dispatch(node, event)?;
        }
        Ok(self)
    }

    /// Number of listener registrations on the first node
    pub fn listener_count(&self) -> usize {
        self.get(0)
            .map(|node: NodeId| self.dom().with_document(|doc| doc.listeners.count(node)))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dom;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<NodeId>>>, EventHandler) {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&hits);
        let handler = EventHandler::new(move |e| {
            log.borrow_mut().push(e.delegate_target().unwrap_or(e.current_target()));
        });
        (hits, handler)
    }

    #[test]
    fn test_direct_binding() {
        let dom = Dom::parse("<button>go</button>").unwrap();
        let button = dom.query("button").unwrap();
        let (hits, handler) = recorder();
        button.on("click", None, &handler, false).unwrap();
        button.on("click", None, &handler, false).unwrap();
        button.trigger("click").unwrap();
        assert_eq!(hits.borrow().len(), 1);

        button.off("click", None, &handler, false).unwrap();
        button.trigger("click").unwrap();
        assert_eq!(hits.borrow().len(), 1);
        assert_eq!(button.listener_count(), 0);
    }

    #[test]
    fn test_delegation_matches_within_bound_element() {
        let dom = Dom::parse("<ul><li class=item><b>one</b></li><li>two</li></ul>").unwrap();
        let ul = dom.query("ul").unwrap();
        let (hits, handler) = recorder();
        ul.on("click", Some(".item"), &handler, false).unwrap();

        let bold = dom.query("b").unwrap();
        bold.trigger("click").unwrap();
        dom.query("li").unwrap().at(1).trigger("click").unwrap();

        let item = dom.query(".item").unwrap().get(0).unwrap();
        assert_eq!(*hits.borrow(), vec![item]);
    }

    #[test]
    fn test_delegation_does_not_match_above_bound_element() {
        let dom = Dom::parse("<div class=item><ul><li>x</li></ul></div>").unwrap();
        let ul = dom.query("ul").unwrap();
        let (hits, handler) = recorder();
        ul.on("click", Some(".item"), &handler, false).unwrap();
        dom.query("li").unwrap().trigger("click").unwrap();
        assert!(hits.borrow().is_empty());
    }

    #[test]
    fn test_delegated_off() {
        let dom = Dom::parse("<ul><li>x</li></ul>").unwrap();
        let ul = dom.query("ul").unwrap();
        let (hits, handler) = recorder();
        ul.on("click", Some("li"), &handler, false).unwrap();
        assert_eq!(ul.listener_count(), 1);

        // Wrong selector leaves the registration alone
        ul.off("click", Some("p"), &handler, false).unwrap();
        assert_eq!(ul.listener_count(), 1);

        ul.off("click", Some("li"), &handler, false).unwrap();
        assert_eq!(ul.listener_count(), 0);
        dom.query("li").unwrap().trigger("click").unwrap();
        assert!(hits.borrow().is_empty());
    }
}
