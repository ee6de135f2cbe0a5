//! Document - High-level document API
//!
//! Owns the tree together with per-document state that does not belong to
//! any single node: the URL, the focused element and listener registrations.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{DomResult, DomTree, ListenerTable, NodeId};

/// Identity of a document, unique per process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

impl DocumentId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        DocumentId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// HTML Document
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    /// The DOM tree
    pub tree: DomTree,
    /// Listener registrations keyed by node
    pub listeners: ListenerTable,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    /// Focused element
    active_element: NodeId,
}

impl Document {
    /// Create a document with an empty html/head/body skeleton
    pub fn new(url: &str) -> DomResult<Self> {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");
        tree.append_child(tree.root(), html)?;
        tree.append_child(html, head)?;
        tree.append_child(html, body)?;

        Ok(Self {
            id: DocumentId::next(),
            tree,
            listeners: ListenerTable::new(),
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            active_element: NodeId::NONE,
        })
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self::from_tree(DomTree::new(), url)
    }

    /// Wrap an already built tree, locating html/head/body
    pub fn from_tree(tree: DomTree, url: &str) -> Self {
        let mut doc = Self {
            id: DocumentId::next(),
            tree,
            listeners: ListenerTable::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            active_element: NodeId::NONE,
        };
        doc.finalize();
        doc
    }

    /// Refresh cached html/head/body references after structural changes
    pub fn finalize(&mut self) {
        let root = self.tree.root();
        self.html_element = self
            .tree
            .element_children(root)
            .find(|&id| self.tree.tag_name(id) == Some("html"))
            .unwrap_or(NodeId::NONE);
        let html = self.html_element;
        let find = |tag: &str| {
            self.tree
                .element_children(html)
                .find(|&id| self.tree.tag_name(id) == Some(tag))
                .unwrap_or(NodeId::NONE)
        };
        let (head, body) = if html.is_valid() {
            (find("head"), find("body"))
        } else {
            (NodeId::NONE, NodeId::NONE)
        };
        self.head_element = head;
        self.body_element = body;
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Text of the first <title> in <head>
    pub fn title(&self) -> String {
        let Some(head) = self.head() else {
            return String::new();
        };
        self.tree
            .element_children(head)
            .find(|&id| self.tree.tag_name(id) == Some("title"))
            .map(|title| self.tree.text_content(title).trim().to_string())
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> Option<NodeId> {
        self.html_element.to_option()
    }

    /// Get <head> element
    pub fn head(&self) -> Option<NodeId> {
        self.head_element.to_option()
    }

    /// Get <body> element
    pub fn body(&self) -> Option<NodeId> {
        self.body_element.to_option()
    }

    /// Currently focused element
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element.to_option()
    }

    /// Move focus to a node, returning the previously focused one
    pub fn set_active_element(&mut self, id: NodeId) -> Option<NodeId> {
        let previous = self.active_element.to_option();
        self.active_element = id;
        previous
    }

    /// First attached element whose `id` attribute matches
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.tree.root()).into_iter().find(|&node| {
            self.tree
                .get(node)
                .and_then(|n| n.as_element())
                .and_then(|e| e.get_attr("id"))
                == Some(id)
        })
    }

    /// Event path for dispatch: the target, then its ancestors up to the root
    pub fn propagation_path(&self, target: NodeId) -> Vec<NodeId> {
        std::iter::once(target).chain(self.tree.ancestors(target)).collect()
    }

    /// Whether a node is connected to the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.tree.contains(self.tree.root(), id)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}
