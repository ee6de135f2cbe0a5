//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it into our arena DOM.

use fos_dom::{Attribute, Document, DomTree, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::ParseError;

/// Parser options
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Keep text nodes that hold only whitespace
    pub keep_whitespace_text: bool,
}

/// HTML5 parser
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    options: ParseOptions,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, ParseError> {
        tracing::debug!(url, bytes = html.len(), "parsing HTML document");

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut tree = DomTree::new();
        let root = tree.root();
        convert_children(&dom.document, &mut tree, root, self.options)?;
        let document = Document::from_tree(tree, url);

        tracing::debug!(nodes = document.tree().len(), "parsed HTML document");
        Ok(document)
    }
}

/// Convert the children of an RcDom node under `parent`
pub(crate) fn convert_children(
    handle: &Handle,
    tree: &mut DomTree,
    parent: NodeId,
    options: ParseOptions,
) -> Result<(), ParseError> {
    for child in handle.children.borrow().iter() {
        convert_node(child, tree, parent, options)?;
    }
    Ok(())
}

/// Convert an RcDom node (and its subtree) under `parent`
fn convert_node(
    handle: &Handle,
    tree: &mut DomTree,
    parent: NodeId,
    options: ParseOptions,
) -> Result<(), ParseError> {
    match &handle.data {
        RcNodeData::Document => convert_children(handle, tree, parent, options)?,
        RcNodeData::Doctype { name, public_id, system_id } => {
            let id = tree.create_doctype(name, public_id, system_id);
            tree.append_child(parent, id)?;
        }
        RcNodeData::Text { contents } => {
            let text = contents.borrow();
            if options.keep_whitespace_text || !text.trim().is_empty() {
                let id = tree.create_text(&text);
                tree.append_child(parent, id)?;
            }
        }
        RcNodeData::Comment { contents } => {
            let id = tree.create_comment(contents);
            tree.append_child(parent, id)?;
        }
        RcNodeData::Element { name, attrs, .. } => {
            let ns = tree.interner_mut().intern(&name.ns);
            let id = tree.create_element_ns(ns, &name.local);
            {
                let elem = tree.element_mut(id)?;
                // Attribute names keep the case the tokenizer gave them
                // (SVG attributes such as `viewBox` are camelCase)
                for attr in attrs.borrow().iter() {
                    elem.attrs.push(Attribute {
                        name: attr.name.local.to_string(),
                        value: attr.value.to_string(),
                    });
                }
            }
            tree.append_child(parent, id)?;
            convert_children(handle, tree, id, options)?;
        }
        RcNodeData::ProcessingInstruction { .. } => {
            // Not part of the HTML DOM
        }
    }
    Ok(())
}
