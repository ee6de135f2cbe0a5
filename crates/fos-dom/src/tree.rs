//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed: detaching only unlinks a node, so every `NodeId`
//! handed out stays valid for the lifetime of the tree.

use crate::interner::HTML_NAMESPACE;
use crate::{DomError, DomResult, InternedString, Node, NodeData, NodeId, QualName, StringInterner};

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    pub(crate) nodes: Vec<Node>,
    interner: StringInterner,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            interner: StringInterner::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Get a node or fail with `NotFound`
    pub fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    /// Whether `id` names a node of this tree
    #[inline]
    pub fn contains_id(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Number of nodes in the tree (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Access the interner
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Access the interner mutably
    pub fn interner_mut(&mut self) -> &mut StringInterner {
        &mut self.interner
    }

    /// Resolve an interned string
    #[inline]
    pub fn resolve(&self, id: InternedString) -> &str {
        self.interner.get(id)
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached HTML element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let ns = self.interner.intern(HTML_NAMESPACE);
        self.create_element_ns(ns, &tag.to_ascii_lowercase())
    }

    /// Create a detached element in the given namespace
    pub fn create_element_ns(&mut self, ns: InternedString, local: &str) -> NodeId {
        let local = self.interner.intern(local);
        self.push(Node::element(QualName::new(ns, local)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text.to_string()))
    }

    /// Create an empty document fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.push(Node::fragment())
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.push(Node::doctype(name.to_string(), public_id.to_string(), system_id.to_string()))
    }

    /// Lowercase local name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?
            .as_element()
            .map(|e| self.interner.get(e.name.local))
    }

    /// Check if a node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Parent node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.to_option()
    }

    /// Next sibling node of any kind
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.next_sibling.to_option()
    }

    /// Previous sibling node of any kind
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.prev_sibling.to_option()
    }

    /// First child node of any kind
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.first_child.to_option()
    }

    /// Last child node of any kind
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.last_child.to_option()
    }

    /// Next sibling that is an element
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.next_sibling(id);
        while let Some(current) = cursor {
            if self.is_element(current) {
                return Some(current);
            }
            cursor = self.next_sibling(current);
        }
        None
    }

    /// Previous sibling that is an element
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.prev_sibling(id);
        while let Some(current) = cursor {
            if self.is_element(current) {
                return Some(current);
            }
            cursor = self.prev_sibling(current);
        }
        None
    }

    /// Iterate over children of a node
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            tree: self,
            current: self.first_child(parent),
        }
    }

    /// Element children in order
    pub fn element_children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent)
            .filter(|(_, node)| node.is_element())
            .map(|(id, _)| id)
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Strict descendants in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut child = self.last_child(id);
        while let Some(current) = child {
            stack.push(current);
            child = self.prev_sibling(current);
        }
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut child = self.last_child(current);
            while let Some(c) = child {
                stack.push(c);
                child = self.prev_sibling(c);
            }
        }
        out
    }

    /// Inclusive ancestor test: is `node` equal to or inside `ancestor`?
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        match &node.data {
            NodeData::Text(text) => text.content.clone(),
            NodeData::Comment(text) => text.clone(),
            NodeData::Doctype { .. } => String::new(),
            _ => {
                let mut out = String::new();
                self.collect_text(id, &mut out);
                out
            }
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for (child, node) in self.children(id) {
            match &node.data {
                NodeData::Text(text) => out.push_str(&text.content),
                NodeData::Element(_) | NodeData::DocumentFragment => self.collect_text(child, out),
                _ => {}
            }
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's children
pub struct Children<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.tree.get(id)?;
        self.current = node.next_sibling.to_option();
        Some((id, node))
    }
}

/// Iterator over a node's strict ancestors
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_siblings_skip_text() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let a = tree.create_element("li");
        let text = tree.create_text(" ");
        let b = tree.create_element("li");
        tree.append_child(ul, a).unwrap();
        tree.append_child(ul, text).unwrap();
        tree.append_child(ul, b).unwrap();

        assert_eq!(tree.next_sibling(a), Some(text));
        assert_eq!(tree.next_element_sibling(a), Some(b));
        assert_eq!(tree.prev_element_sibling(b), Some(a));
        assert_eq!(tree.element_children(ul).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_descendants_document_order() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let p = tree.create_element("p");
        let em = tree.create_element("em");
        let span = tree.create_element("span");
        tree.append_child(div, p).unwrap();
        tree.append_child(p, em).unwrap();
        tree.append_child(div, span).unwrap();

        assert_eq!(tree.descendants(div), vec![p, em, span]);
        assert!(tree.contains(div, em));
        assert!(!tree.contains(span, em));
    }

    #[test]
    fn test_text_content_concatenates() {
        let mut tree = DomTree::new();
        let p = tree.create_element("p");
        let hello = tree.create_text("Hello ");
        let em = tree.create_element("em");
        let world = tree.create_text("World");
        tree.append_child(p, hello).unwrap();
        tree.append_child(p, em).unwrap();
        tree.append_child(em, world).unwrap();

        assert_eq!(tree.text_content(p), "Hello World");
    }

    #[test]
    fn test_tag_names_lowercase() {
        let mut tree = DomTree::new();
        let div = tree.create_element("DIV");
        assert_eq!(tree.tag_name(div), Some("div"));
        assert_eq!(tree.tag_name(NodeId::ROOT), None);
    }
}
