//! fOS HTML Parser
//!
//! HTML5 parsing built on html5ever, converted into the arena DOM of
//! `fos-dom`. Full documents go through [`HtmlParser`]; markup snippets
//! are parsed straight into an existing tree with [`parse_fragment`].
//! [`HtmlSerializer`] produces `innerHTML`/`outerHTML` strings.

mod fragment;
mod parser;
mod serializer;

pub use fos_dom::Document;
pub use fragment::parse_fragment;
pub use parser::{HtmlParser, ParseOptions};
pub use serializer::{HtmlSerializer, inner_html, outer_html};

/// Parse a full HTML document with default options
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Building the converted tree failed
    #[error("tree construction failed: {0}")]
    Dom(#[from] fos_dom::DomError),
}
