//! fOS DOM - Document Object Model
//!
//! Arena-backed live tree owned by the host. Nodes reference each other by
//! `NodeId`; element data carries attributes, classes, inline style, form
//! control state and per-node event listeners.

mod node;
mod tree;
mod document;
mod interner;
mod operations;
mod classlist;
mod style;
mod properties;
pub mod events;

pub use node::{Node, NodeData, ElementData, TextData, Attribute, QualName, NodeKind};
pub use tree::{DomTree, Children, Ancestors};
pub use document::{Document, DocumentId};
pub use interner::{StringInterner, InternedString, HTML_NAMESPACE};
pub use operations::{DomError, DomResult};
pub use classlist::ClassList;
pub use style::{StyleDeclarations, css_property_name};
pub use properties::PropValue;
pub use events::{DelegateKey, Event, EventHandler, EventPhase, HandlerId, ListenerTable, Registration};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Invalid/null node
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Convert the sentinel into `None`
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}
