//! The collection type
//!
//! An ordered, immutable sequence of nodes from one document, plus the
//! selector string it was built from. Operations that narrow or walk the
//! tree return new collections; setters mutate the nodes and hand back the
//! same collection for chaining.

use std::fmt;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::Dom;

/// Ordered nodes of one document
#[derive(Clone)]
pub struct Collection {
    dom: Dom,
    elements: Rc<[NodeId]>,
    selector: Option<Rc<str>>,
}

impl Collection {
    pub(crate) fn new(dom: Dom, elements: Vec<NodeId>, selector: Option<&str>) -> Self {
        Self {
            dom,
            elements: elements.into(),
            selector: selector.map(Rc::from),
        }
    }

    /// Collection with no selector over `elements` of the same document
    pub(crate) fn wrap(&self, elements: Vec<NodeId>) -> Self {
        Self::new(self.dom.clone(), elements, None)
    }

    /// Collection with no nodes
    pub fn new_empty(dom: &Dom) -> Self {
        Self::new(dom.clone(), Vec::new(), None)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Selector or markup this collection was built from
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.elements
    }

    /// Plain copy of the node ids
    pub fn to_vec(&self) -> Vec<NodeId> {
        self.elements.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.elements.iter().copied()
    }

    /// The document handle shared by every collection built from it
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Whether both collections are the same object (not just equal)
    pub fn same(&self, other: &Collection) -> bool {
        Rc::ptr_eq(&self.elements, &other.elements)
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.dom.ptr_eq(&other.dom) && self.elements == other.elements
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("elements", &self.elements)
            .field("selector", &self.selector)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter().copied()
    }
}
