//! Collection errors

use fos_css::SelectorError;
use fos_dom::DomError;
use fos_html::ParseError;

/// Result type for collection operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors surfaced by the collection API
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Factory input of an unsupported shape, or nodes from another document
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid selector: {0}")]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("markup parsing failed: {0}")]
    Parse(#[from] ParseError),

    /// `call` with a name nothing was registered under
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    #[error("invalid argument for `{operation}`: {reason}")]
    InvalidArgument { operation: String, reason: String },
}

impl QueryError {
    pub(crate) fn invalid_argument(operation: &str, reason: impl Into<String>) -> Self {
        QueryError::InvalidArgument {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }
}
