//! fOS Query
//!
//! A chainable collection API over a live `fos-dom` document:
//! - Factory: selectors, markup, nodes or collections to a [`Collection`]
//! - Traversal: indexing, `find`, ancestor and sibling walks, iteration
//! - Manipulation: insertion, removal, cloning, html/text/value
//! - Attributes, properties, inline style and classes
//! - Events: direct and delegated listeners, dispatch
//! - Registry: named operations callable on any collection
//!
//! ```ignore
//! let dom = Dom::parse("<ul><li>a</li><li>b</li></ul>")?;
//! dom.query("li")?.add_class("item").set_css("color", "red");
//! ```

mod attributes;
mod classes;
mod collection;
mod dom;
mod error;
mod events;
mod factory;
mod manipulate;
pub mod registry;
mod traverse;
mod value;

pub use attributes::{ATTRS, AttrValue, CssValue};
pub use classes::ClassPattern;
pub use collection::Collection;
pub use dom::{Dom, WeakDom};
pub use error::{QueryError, QueryResult};
pub use factory::{Context, Input, is_html};
pub use manipulate::Content;
pub use registry::{NamedOperation, Operation, register, register_map, register_named};
pub use traverse::Limit;
pub use value::Value;

pub use fos_dom::{Event, EventHandler, EventPhase, NodeId, PropValue};
