//! fOS CSS Selectors
//!
//! Selector parsing and matching against the `fos-dom` tree, covering what
//! `querySelectorAll`, `matches` and `closest` need.

mod matching;
mod parser;
mod selectors;

pub use matching::{SelectorMatcher, closest, matches, select_all, select_first};
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Direction,
    NthExpression, PseudoClass, RelativeSelector, SelectorComponent, SelectorList,
};

/// Parse a selector list, logging rejected input
pub fn parse_selector(selector: &str) -> Result<SelectorList, SelectorError> {
    SelectorList::parse(selector).inspect_err(|error| {
        tracing::debug!(selector, %error, "rejected selector");
    })
}

/// Selector parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected character {found:?} at position {position}")]
    Unexpected { found: char, position: usize },

    #[error("unexpected end of selector")]
    UnexpectedEnd,

    #[error("unsupported pseudo-class :{0}")]
    UnsupportedPseudo(String),

    #[error("invalid :nth-* argument {0:?}")]
    InvalidNth(String),
}
