//! DOM Node Operations
//!
//! Core node manipulation: appendChild, insertBefore, remove, replaceChild,
//! cloneNode, textContent assignment.

use crate::{DomTree, Node, NodeData, NodeId, NodeKind};

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node id unknown to this tree
    #[error("node {0} not found")]
    NotFound(NodeId),
    /// Insertion would break the tree (cycle, or parent cannot hold children)
    #[error("hierarchy request error: cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Reference node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    /// Operation needs a different kind of node
    #[error("invalid node type for {0}")]
    InvalidNodeType(&'static str),
}

impl DomTree {
    /// Append a child node, detaching it from any previous parent.
    ///
    /// Appending a document fragment moves its children instead.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.check_insert(parent, child)?;
        if let Some(reference) = reference {
            if self.node(reference)?.parent != parent {
                return Err(DomError::NotAChild { parent, child: reference });
            }
            if reference == child {
                return Ok(child);
            }
        }

        if matches!(self.node(child)?.data, NodeData::DocumentFragment) {
            let moved: Vec<NodeId> = self.children(child).map(|(id, _)| id).collect();
            for id in moved {
                self.detach(id);
                self.link_before(parent, id, reference);
            }
            return Ok(child);
        }

        self.detach(child);
        self.link_before(parent, child, reference);
        tracing::trace!(%parent, %child, "inserted node");
        Ok(child)
    }

    /// Replace `old_child` of `parent` with `new_child`
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<NodeId> {
        if self.node(old_child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child: old_child });
        }
        if new_child == old_child {
            return Ok(old_child);
        }
        self.insert_before(parent, new_child, Some(old_child))?;
        self.detach(old_child);
        Ok(old_child)
    }

    /// Detach a node from its parent. No-op when already detached.
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        self.node(id)?;
        self.detach(id);
        Ok(())
    }

    /// Detach every child of a node
    pub fn remove_children(&mut self, id: NodeId) -> DomResult<()> {
        self.node(id)?;
        while let Some(child) = self.first_child(id) {
            self.detach(child);
        }
        Ok(())
    }

    /// Replace all children with a single text node (nothing for empty text)
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        match self.node(id)?.kind() {
            NodeKind::Text => {
                if let Some(NodeData::Text(data)) = self.get_mut(id).map(|n| &mut n.data) {
                    data.content = text.to_string();
                }
                Ok(())
            }
            NodeKind::Comment => {
                if let Some(node) = self.get_mut(id) {
                    node.data = NodeData::Comment(text.to_string());
                }
                Ok(())
            }
            NodeKind::Doctype | NodeKind::Document => Ok(()),
            NodeKind::Element | NodeKind::DocumentFragment => {
                self.remove_children(id)?;
                if !text.is_empty() {
                    let text_node = self.create_text(text);
                    self.append_child(id, text_node)?;
                }
                Ok(())
            }
        }
    }

    /// Clone a node into a new detached node.
    ///
    /// Deep clones copy the whole subtree. Listener registrations are not
    /// copied, matching `cloneNode`.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let source = self.node(id)?;
        let mut copy = Node {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data: source.data.clone(),
        };
        if let NodeData::Document = copy.data {
            copy.data = NodeData::DocumentFragment;
        }
        let new_id = self.push(copy);

        if deep {
            let children: Vec<NodeId> = self.children(id).map(|(child, _)| child).collect();
            for child in children {
                let child_copy = self.clone_node(child, true)?;
                self.link_before(new_id, child_copy, None);
            }
        }
        Ok(new_id)
    }

    /// Deep clone shorthand
    pub fn deep_clone(&mut self, id: NodeId) -> DomResult<NodeId> {
        self.clone_node(id, true)
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if !parent_node.can_have_children() || matches!(child_node.data, NodeData::Document) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        // Parent must not be inside child's subtree
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Unlink a node from its parent and siblings
    pub(crate) fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Link a detached node under `parent`, before `reference` or last
    fn link_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let (prev, next) = match reference {
            Some(reference) => (self.nodes[reference.index()].prev_sibling, reference),
            None => (self.nodes[parent.index()].last_child, NodeId::NONE),
        };

        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }
    }
}
