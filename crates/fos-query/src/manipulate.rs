//! Tree manipulation and content accessors
//!
//! Insertion operations accept a node, a collection or markup. When there
//! are several targets, the first one receives the original nodes and the
//! rest receive deep clones made before anything is moved.

use fos_dom::{DomTree, NodeId};

use crate::{Collection, Input, QueryError, QueryResult};

/// Nodes to insert
#[derive(Debug, Clone)]
pub enum Content {
    Node(NodeId),
    Collection(Collection),
    /// Parsed into fresh nodes
    Markup(String),
}

impl From<NodeId> for Content {
    fn from(node: NodeId) -> Self {
        Content::Node(node)
    }
}

impl From<Collection> for Content {
    fn from(collection: Collection) -> Self {
        Content::Collection(collection)
    }
}

impl From<&Collection> for Content {
    fn from(collection: &Collection) -> Self {
        Content::Collection(collection.clone())
    }
}

impl From<&str> for Content {
    fn from(markup: &str) -> Self {
        Content::Markup(markup.to_string())
    }
}

impl From<String> for Content {
    fn from(markup: String) -> Self {
        Content::Markup(markup)
    }
}

#[derive(Clone, Copy)]
enum Position {
    Append,
    Prepend,
    After,
    Replace,
}

impl Collection {
    /// Append content as the last children of every node
    pub fn append(&self, content: impl Into<Content>) -> QueryResult<&Self> {
        self.insert(content.into(), Position::Append)
    }

    /// Insert content before the first child of every node
    pub fn prepend(&self, content: impl Into<Content>) -> QueryResult<&Self> {
        self.insert(content.into(), Position::Prepend)
    }

    /// Insert content right after every node
    pub fn insert_after(&self, content: impl Into<Content>) -> QueryResult<&Self> {
        self.insert(content.into(), Position::After)
    }

    /// Put content in place of every node. Returns the original, now
    /// detached, collection.
    pub fn replace(&self, content: impl Into<Content>) -> QueryResult<&Self> {
        self.insert(content.into(), Position::Replace)
    }

    /// Append every node of this collection to `target` (a node, a
    /// collection, or a selector/markup string)
    pub fn append_to(&self, target: impl Into<Input>) -> QueryResult<&Self> {
        let target = self.dom().query(target)?;
        target.append(self)?;
        Ok(self)
    }

    /// Remove all children of every node
    pub fn empty(&self) -> QueryResult<&Self> {
        self.dom().with_tree_mut(|tree| {
            self.iter().try_for_each(|node| tree.remove_children(node))
        })?;
        Ok(self)
    }

    /// Deep copies of every node, detached
    pub fn deep_clone(&self) -> QueryResult<Collection> {
        let copies = self.dom().with_tree_mut(|tree| {
            self.iter().map(|node| tree.deep_clone(node)).collect::<Result<Vec<_>, _>>()
        })?;
        Ok(self.wrap(copies))
    }

    /// Detach every node from its parent
    pub fn remove(&self) -> QueryResult<()> {
        self.dom().with_tree_mut(|tree| self.iter().try_for_each(|node| tree.remove(node)))?;
        Ok(())
    }

    /// Markup of the first node's children (empty for an empty collection)
    pub fn html(&self) -> String {
        self.get(0).map(|node| self.dom().inner_html(node)).unwrap_or_default()
    }

    /// Replace the children of every node with parsed `markup`
    pub fn set_html(&self, markup: &str) -> QueryResult<&Self> {
        for node in self.iter() {
            let parsed = self.dom().parse_fragment(markup)?;
            self.dom().with_tree_mut(|tree| {
                tree.remove_children(node)?;
                tree.append_child(node, parsed)
            })?;
        }
        Ok(self)
    }

    /// Text content of the first node
    pub fn text(&self) -> String {
        self.get(0)
            .map(|node| self.dom().with_tree(|tree| tree.text_content(node)))
            .unwrap_or_default()
    }

    /// Replace the children of every node with one text node
    pub fn set_text(&self, text: &str) -> QueryResult<&Self> {
        self.dom()
            .with_tree_mut(|tree| self.iter().try_for_each(|node| tree.set_text_content(node, text)))?;
        Ok(self)
    }

    /// Form-control value of the first node
    pub fn value(&self) -> String {
        self.get(0)
            .map(|node| self.dom().with_tree(|tree| tree.control_value(node)))
            .unwrap_or_default()
    }

    /// Set the form-control value of every element
    pub fn set_value(&self, value: &str) -> QueryResult<&Self> {
        self.dom().with_tree_mut(|tree| {
            let elements: Vec<_> = self.iter().filter(|&node| tree.is_element(node)).collect();
            elements
                .into_iter()
                .try_for_each(|node| tree.set_control_value(node, value))
        })?;
        Ok(self)
    }

    /// Alias of [`value`](Self::value)
    pub fn val(&self) -> String {
        self.value()
    }

    /// Alias of [`set_value`](Self::set_value)
    pub fn set_val(&self, value: &str) -> QueryResult<&Self> {
        self.set_value(value)
    }

    /// Focus the first node
    pub fn focus(&self) -> QueryResult<&Self> {
        if let Some(node) = self.get(0) {
            self.dom().focus(node)?;
        }
        Ok(self)
    }

    fn insert(&self, content: Content, position: Position) -> QueryResult<&Self> {
        if self.is_empty() {
            return Ok(self);
        }
        let sources = self.resolve_content(content)?;
        self.dom().with_tree_mut(|tree| {
            let mut batches = vec![sources.clone()];
            for _ in 1..self.len() {
                let copies = sources
                    .iter()
                    .map(|&node| tree.deep_clone(node))
                    .collect::<Result<Vec<_>, _>>()?;
                batches.push(copies);
            }
            for (target, batch) in self.iter().zip(batches) {
                place(tree, target, &batch, position)?;
            }
            Ok::<_, QueryError>(())
        })?;
        Ok(self)
    }

    fn resolve_content(&self, content: Content) -> QueryResult<Vec<NodeId>> {
        match content {
            Content::Node(node) => {
                if !self.dom().contains_node(node) {
                    return Err(QueryError::InvalidInput(format!(
                        "node {node} does not belong to this document"
                    )));
                }
                Ok(vec![node])
            }
            Content::Collection(collection) => {
                if !collection.dom().ptr_eq(self.dom()) {
                    return Err(QueryError::InvalidInput(
                        "collection belongs to another document".to_string(),
                    ));
                }
                Ok(collection.to_vec())
            }
            Content::Markup(markup) => Ok(vec![self.dom().parse_fragment(&markup)?]),
        }
    }
}

/// Insert `nodes` relative to `target`. Sibling positions need a parent;
/// detached targets are left alone.
fn place(tree: &mut DomTree, target: NodeId, nodes: &[NodeId], position: Position) -> QueryResult<()> {
    match position {
        Position::Append => {
            for &node in nodes {
                tree.append_child(target, node)?;
            }
        }
        Position::Prepend => {
            let reference = viable_reference(tree, tree.first_child(target), nodes);
            for &node in nodes {
                tree.insert_before(target, node, reference)?;
            }
        }
        Position::After | Position::Replace => {
            let Some(parent) = tree.parent(target) else {
                tracing::warn!(%target, "target has no parent, nothing inserted");
                return Ok(());
            };
            let reference = viable_reference(tree, tree.next_sibling(target), nodes);
            for &node in nodes {
                tree.insert_before(parent, node, reference)?;
            }
            if matches!(position, Position::Replace) && !nodes.contains(&target) {
                tree.remove(target)?;
            }
        }
    }
    Ok(())
}

/// First sibling from `start` on that is not itself being inserted
fn viable_reference(tree: &DomTree, start: Option<NodeId>, nodes: &[NodeId]) -> Option<NodeId> {
    std::iter::successors(start, |&node| tree.next_sibling(node)).find(|node| !nodes.contains(node))
}

#[cfg(test)]
mod tests {
    use crate::Dom;

    #[test]
    fn test_append_clones_for_later_targets() {
        let dom = Dom::parse("<div></div><div></div>").unwrap();
        let divs = dom.query("div").unwrap();
        let em = dom.query("<em>x</em>").unwrap();
        divs.append(&em).unwrap();

        let placed = dom.query("div em").unwrap();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed.get(0), em.get(0));
        assert_ne!(placed.get(1), em.get(0));
    }

    #[test]
    fn test_prepend_keeps_argument_order() {
        let dom = Dom::parse("<ul><li>c</li></ul>").unwrap();
        let ul = dom.query("ul").unwrap();
        ul.prepend("<li>a</li><li>b</li>").unwrap();
        assert_eq!(ul.html(), "<li>a</li><li>b</li><li>c</li>");
    }

    #[test]
    fn test_insert_after_and_replace() {
        let dom = Dom::parse("<p id=one></p><p id=two></p>").unwrap();
        let one = dom.query("#one").unwrap();
        one.insert_after("<hr>").unwrap();
        assert_eq!(dom.query("body").unwrap().html(), "<p id=\"one\"></p><hr><p id=\"two\"></p>");

        let two = dom.query("#two").unwrap();
        let replaced = two.replace("<span>2</span>").unwrap();
        assert!(replaced.same(&two));
        assert_eq!(dom.with_tree(|t| t.parent(two.nodes()[0])), None);
        assert_eq!(dom.query("body").unwrap().html(), "<p id=\"one\"></p><hr><span>2</span>");
    }

    #[test]
    fn test_prepend_batch_holding_first_child() {
        let dom = Dom::parse("<ul><li id=x></li><li id=y></li></ul><ol><li id=z></li></ol>").unwrap();
        let ul = dom.query("ul").unwrap();
        ul.prepend(&dom.query("#x, #z").unwrap()).unwrap();
        assert_eq!(ul.html(), "<li id=\"x\"></li><li id=\"z\"></li><li id=\"y\"></li>");
    }

    #[test]
    fn test_insert_after_batch_holding_next_sibling() {
        let dom = Dom::parse("<div><a></a><b></b><i></i></div>").unwrap();
        let a = dom.query("a").unwrap();
        a.insert_after(&dom.query("b, i").unwrap()).unwrap();
        assert_eq!(dom.query("div").unwrap().html(), "<a></a><b></b><i></i>");

        let div = dom.query("div").unwrap();
        let b = dom.query("b").unwrap();
        b.insert_after(&dom.query("i, a").unwrap()).unwrap();
        assert_eq!(div.html(), "<b></b><a></a><i></i>");
    }

    #[test]
    fn test_replace_with_batch_holding_target() {
        let dom = Dom::parse("<div><a></a><b></b></div>").unwrap();
        let a = dom.query("a").unwrap();
        a.replace(&dom.query("b, a").unwrap()).unwrap();
        assert_eq!(dom.query("div").unwrap().html(), "<a></a><b></b>");
        assert!(dom.with_tree(|t| t.parent(a.nodes()[0])).is_some());
    }

    #[test]
    fn test_set_value_on_every_control() {
        let dom = Dom::parse("<input name=a><input name=b>").unwrap();
        let inputs = dom.query("input").unwrap();
        inputs.set_value("same").unwrap();
        assert_eq!(inputs.first().value(), "same");
        assert_eq!(inputs.last().value(), "same");
    }

    #[test]
    fn test_detached_sibling_target_is_skipped() {
        let dom = Dom::new().unwrap();
        let lone = dom.query("<p></p>").unwrap();
        lone.insert_after("<hr>").unwrap();
        assert_eq!(dom.query("hr").unwrap().len(), 0);
    }

    #[test]
    fn test_content_accessors() {
        let dom = Dom::parse("<div><b>bold</b> text</div><input value=start>").unwrap();
        let div = dom.query("div").unwrap();
        assert_eq!(div.text(), "bold text");
        div.set_text("plain").unwrap();
        assert_eq!(div.html(), "plain");
        div.set_html("<i>x</i>").unwrap();
        assert_eq!(div.html(), "<i>x</i>");
        div.empty().unwrap();
        assert_eq!(div.html(), "");

        let input = dom.query("input").unwrap();
        assert_eq!(input.val(), "start");
        input.set_val("changed").unwrap();
        assert_eq!(input.value(), "changed");
        assert_eq!(input.attr("value").as_deref(), Some("start"));
    }

    #[test]
    fn test_empty_collection_getters() {
        let dom = Dom::new().unwrap();
        let none = dom.query("p").unwrap();
        assert_eq!(none.html(), "");
        assert_eq!(none.text(), "");
        assert!(none.append("<b></b>").unwrap().is_empty());
    }
}
