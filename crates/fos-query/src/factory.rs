//! Collection factory
//!
//! Turns the accepted input shapes into a collection: node lists, an
//! existing collection, a single node, or a string that is either markup
//! or a selector evaluated inside a context.

use std::sync::LazyLock;

use fos_dom::NodeId;
use regex::Regex;

use crate::{Collection, Dom, QueryError, QueryResult, Value};

/// Markup anywhere in the string, or a bare `#id`
static QUICK_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[^#<]*(<[\w\W]+>)[^>]*$|#([\w\-]*)$)").unwrap());

/// Does `s` look like markup rather than a selector?
///
/// Either it is wrapped in `<` ... `>` (at least three characters), or it
/// contains a tag with no `#` before it.
pub fn is_html(s: &str) -> bool {
    if s.starts_with('<') && s.ends_with('>') && s.len() >= 3 {
        return true;
    }
    QUICK_EXPR
        .captures(s)
        .is_some_and(|caps| caps.get(1).is_some())
}

/// What a collection can be built from
#[derive(Debug, Clone)]
pub enum Input {
    /// Ordered node ids
    Nodes(Vec<NodeId>),
    /// Returned unchanged
    Collection(Collection),
    Node(NodeId),
    /// Markup or a selector
    Markup(String),
}

impl From<Vec<NodeId>> for Input {
    fn from(nodes: Vec<NodeId>) -> Self {
        Input::Nodes(nodes)
    }
}

impl From<&[NodeId]> for Input {
    fn from(nodes: &[NodeId]) -> Self {
        Input::Nodes(nodes.to_vec())
    }
}

impl From<Collection> for Input {
    fn from(collection: Collection) -> Self {
        Input::Collection(collection)
    }
}

impl From<&Collection> for Input {
    fn from(collection: &Collection) -> Self {
        Input::Collection(collection.clone())
    }
}

impl From<NodeId> for Input {
    fn from(node: NodeId) -> Self {
        Input::Node(node)
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Markup(s.to_string())
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Markup(s)
    }
}

impl From<&String> for Input {
    fn from(s: &String) -> Self {
        Input::Markup(s.clone())
    }
}

impl TryFrom<Value> for Input {
    type Error = QueryError;

    fn try_from(value: Value) -> QueryResult<Self> {
        match value {
            Value::String(s) => Ok(Input::Markup(s)),
            Value::Node(id) => Ok(Input::Node(id)),
            Value::Collection(c) => Ok(Input::Collection(c)),
            Value::List(items) => items
                .iter()
                .map(|item| {
                    item.as_node()
                        .ok_or_else(|| QueryError::InvalidInput(format!("list item {item} is not a node")))
                })
                .collect::<QueryResult<Vec<_>>>()
                .map(Input::Nodes),
            other => Err(QueryError::InvalidInput(format!(
                "expected nodes, a collection, a node or a string, got {other:?}"
            ))),
        }
    }
}

/// Where a selector is evaluated
#[derive(Debug, Clone)]
pub enum Context {
    Node(NodeId),
    /// The first node of the collection; the document when it is empty
    Collection(Collection),
}

impl From<NodeId> for Context {
    fn from(node: NodeId) -> Self {
        Context::Node(node)
    }
}

impl From<Collection> for Context {
    fn from(collection: Collection) -> Self {
        Context::Collection(collection)
    }
}

impl From<&Collection> for Context {
    fn from(collection: &Collection) -> Self {
        Context::Collection(collection.clone())
    }
}

impl Dom {
    /// Build a collection, evaluating selectors against the whole document
    pub fn query(&self, input: impl Into<Input>) -> QueryResult<Collection> {
        self.build(input.into(), None)
    }

    /// Build a collection, evaluating selectors inside `context`
    pub fn query_in(
        &self,
        input: impl Into<Input>,
        context: impl Into<Context>,
    ) -> QueryResult<Collection> {
        self.build(input.into(), Some(context.into()))
    }

    /// Build a collection from a dynamic value
    pub fn query_value(&self, value: Value) -> QueryResult<Collection> {
        self.build(Input::try_from(value)?, None)
    }

    fn build(&self, input: Input, context: Option<Context>) -> QueryResult<Collection> {
        match input {
            Input::Nodes(nodes) => {
                self.check_nodes(&nodes)?;
                Ok(Collection::new(self.clone(), nodes, None))
            }
            Input::Collection(collection) => Ok(collection),
            Input::Node(node) => {
                self.check_nodes(&[node])?;
                Ok(Collection::new(self.clone(), vec![node], None))
            }
            Input::Markup(s) => {
                let s = s.trim_start();
                if is_html(s) {
                    let node = self.parse_fragment(s)?;
                    tracing::trace!(%node, "built collection from markup");
                    return Ok(Collection::new(self.clone(), vec![node], Some(s)));
                }
                let root = self.context_root(context)?;
                let list = fos_css::parse_selector(s)?;
                let found = self.with_document(|doc| {
                    fos_css::SelectorMatcher::new(&doc.tree)
                        .with_focus(doc.active_element())
                        .select_all(root, &list)
                });
                tracing::trace!(selector = s, %root, matched = found.len(), "built collection from selector");
                Ok(Collection::new(self.clone(), found, Some(s)))
            }
        }
    }

    fn context_root(&self, context: Option<Context>) -> QueryResult<NodeId> {
        match context {
            None => Ok(self.root()),
            Some(Context::Node(node)) => {
                self.check_nodes(&[node])?;
                Ok(node)
            }
            Some(Context::Collection(collection)) => {
                if !collection.dom().ptr_eq(self) {
                    return Err(QueryError::InvalidInput(
                        "context collection belongs to another document".to_string(),
                    ));
                }
                Ok(collection.get(0).unwrap_or_else(|| self.root()))
            }
        }
    }

    fn check_nodes(&self, nodes: &[NodeId]) -> QueryResult<()> {
        match nodes.iter().find(|&&node| !self.contains_node(node)) {
            Some(node) => Err(QueryError::InvalidInput(format!(
                "node {node} does not belong to this document"
            ))),
            None => Ok(()),
        }
    }
}

impl Collection {
    /// Build a collection over the same document
    pub fn query(&self, input: impl Into<Input>) -> QueryResult<Collection> {
        self.dom().query(input)
    }
}
