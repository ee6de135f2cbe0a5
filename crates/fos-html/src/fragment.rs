//! Fragment parsing (markup snippets into an existing tree)
//!
//! Elements such as `<tr>` or `<option>` are only valid inside a specific
//! parent, so snippets starting with them are parsed inside a wrapper
//! chain and the nodes are taken back out of the innermost wrapper.

use fos_dom::{DomTree, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::ParseError;
use crate::parser::{ParseOptions, convert_children};

/// Wrapper markup around a snippet and the element path down to it
struct Wrap {
    open: &'static str,
    close: &'static str,
    path: &'static [&'static str],
}

const BODY: Wrap = Wrap { open: "", close: "", path: &[] };
const SELECT: Wrap = Wrap {
    open: "<select multiple=\"multiple\">",
    close: "</select>",
    path: &["select"],
};
const FIELDSET: Wrap = Wrap { open: "<fieldset>", close: "</fieldset>", path: &["fieldset"] };
const TABLE: Wrap = Wrap { open: "<table>", close: "</table>", path: &["table"] };
const TBODY: Wrap = Wrap {
    open: "<table><tbody>",
    close: "</tbody></table>",
    path: &["table", "tbody"],
};
const TR: Wrap = Wrap {
    open: "<table><tbody><tr>",
    close: "</tr></tbody></table>",
    path: &["table", "tbody", "tr"],
};
const COLGROUP: Wrap = Wrap {
    open: "<table><colgroup>",
    close: "</colgroup></table>",
    path: &["table", "colgroup"],
};
const MAP: Wrap = Wrap { open: "<map>", close: "</map>", path: &["map"] };
const OBJECT: Wrap = Wrap { open: "<object>", close: "</object>", path: &["object"] };
const SVG: Wrap = Wrap {
    open: "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">",
    close: "</svg>",
    path: &["svg"],
};

fn wrap_for(tag: &str) -> &'static Wrap {
    match tag {
        "option" | "optgroup" => &SELECT,
        "legend" => &FIELDSET,
        "thead" | "tbody" | "tfoot" | "caption" | "colgroup" => &TABLE,
        "tr" => &TBODY,
        "td" | "th" => &TR,
        "col" => &COLGROUP,
        "area" => &MAP,
        "param" => &OBJECT,
        "circle" | "ellipse" | "g" | "line" | "path" | "polygon" | "polyline" | "rect"
        | "text" => &SVG,
        _ => &BODY,
    }
}

/// Lowercased name of the first start tag in `html`
fn first_tag(html: &str) -> Option<String> {
    let bytes = html.as_bytes();
    let mut i = 0;
    while let Some(offset) = html[i..].find('<') {
        let start = i + offset + 1;
        let end = bytes[start..]
            .iter()
            .position(|b| !(b.is_ascii_alphanumeric() || *b == b':' || *b == b'_' || *b == b'-'))
            .map_or(bytes.len(), |n| start + n);
        if end > start && bytes[start].is_ascii_alphabetic() {
            return Some(html[start..end].to_ascii_lowercase());
        }
        i = start;
    }
    None
}

/// Parse a markup snippet into `tree`.
///
/// Returns the only top-level node when the snippet produces exactly one,
/// otherwise a document fragment holding all of them. Text is kept
/// verbatim, whitespace included. The new nodes are detached.
pub fn parse_fragment(tree: &mut DomTree, html: &str) -> Result<NodeId, ParseError> {
    let wrap = first_tag(html).map_or(&BODY, |tag| wrap_for(&tag));
    let source = format!("<!DOCTYPE html><body>{}{html}{}", wrap.open, wrap.close);
    let dom = parse_document(RcDom::default(), Default::default()).one(source);

    let fragment = tree.create_fragment();
    if let Some(container) = find_container(&dom.document, wrap.path) {
        let options = ParseOptions { keep_whitespace_text: true };
        convert_children(&container, tree, fragment, options)?;
    }

    let top: Vec<NodeId> = tree.children(fragment).map(|(id, _)| id).collect();
    let result = match top.as_slice() {
        [only] => {
            tree.remove(*only)?;
            *only
        }
        _ => fragment,
    };
    tracing::trace!(%result, wrapper = ?wrap.path, "parsed fragment");
    Ok(result)
}

/// Walk html > body > wrapper path to the element holding the snippet
fn find_container(document: &Handle, path: &[&str]) -> Option<Handle> {
    let html = child_element(document, "html")?;
    let mut current = child_element(&html, "body")?;
    for tag in path {
        current = child_element(&current, tag)?;
    }
    Some(current)
}

fn child_element(parent: &Handle, tag: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| matches!(&child.data, RcNodeData::Element { name, .. } if &*name.local == tag))
        .cloned()
}
