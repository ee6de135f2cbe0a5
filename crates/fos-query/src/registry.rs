//! Operation registry
//!
//! Named operations callable on any collection through
//! [`Collection::call`]. The built-in operations are registered under
//! their scripting names (`addClass`, `appendTo`, ...) and user code can
//! add or replace entries at any time. The registry is per thread, as
//! collections are.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use fos_dom::PropValue;
use regex::Regex;

use crate::{
    ATTRS, ClassPattern, Collection, Content, CssValue, Input, Limit, QueryError, QueryResult, Value,
};

/// A registered operation
pub type Operation = Rc<dyn Fn(&Collection, &[Value]) -> QueryResult<Value>>;

/// An operation that carries its own name
pub trait NamedOperation {
    fn name(&self) -> &str;
    fn call(&self, collection: &Collection, args: &[Value]) -> QueryResult<Value>;
}

thread_local! {
    static REGISTRY: RefCell<HashMap<String, Operation>> = RefCell::new(builtins());
}

/// Register `op` under `name`, replacing any previous entry
pub fn register(
    name: impl Into<String>,
    op: impl Fn(&Collection, &[Value]) -> QueryResult<Value> + 'static,
) {
    let name = name.into();
    tracing::debug!(%name, "registering operation");
    REGISTRY.with(|registry| registry.borrow_mut().insert(name, Rc::new(op)));
}

/// Register an operation under its own name
pub fn register_named<N: NamedOperation + 'static>(op: N) {
    let name = op.name().to_string();
    register(name, move |collection, args| op.call(collection, args));
}

/// Register every entry of a name to operation map
pub fn register_map<I, K, F>(ops: I)
where
    I: IntoIterator<Item = (K, F)>,
    K: Into<String>,
    F: Fn(&Collection, &[Value]) -> QueryResult<Value> + 'static,
{
    for (name, op) in ops {
        register(name, op);
    }
}

/// Operation registered under `name`
pub fn lookup(name: &str) -> Option<Operation> {
    REGISTRY.with(|registry| registry.borrow().get(name).cloned())
}

pub fn is_registered(name: &str) -> bool {
    REGISTRY.with(|registry| registry.borrow().contains_key(name))
}

/// Every registered name, sorted
pub fn operation_names() -> Vec<String> {
    let mut names: Vec<String> =
        REGISTRY.with(|registry| registry.borrow().keys().cloned().collect());
    names.sort();
    names
}

impl Collection {
    /// Invoke the operation registered under `name` with this collection
    /// as the receiver
    pub fn call(&self, name: &str, args: &[Value]) -> QueryResult<Value> {
        // The registry borrow ends before the operation runs, so operations
        // may register others
        let op = lookup(name).ok_or_else(|| QueryError::UnknownOperation(name.to_string()))?;
        op(self, args)
    }
}

/// Argument at `index`; missing and null arguments are both `None`
fn arg(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index).filter(|value| !value.is_null())
}

fn str_arg<'a>(op: &str, args: &'a [Value], index: usize) -> QueryResult<&'a str> {
    arg(args, index)
        .and_then(Value::as_str)
        .ok_or_else(|| QueryError::invalid_argument(op, format!("argument {index} must be a string")))
}

fn opt_str_arg<'a>(op: &str, args: &'a [Value], index: usize) -> QueryResult<Option<&'a str>> {
    match arg(args, index) {
        None => Ok(None),
        Some(_) => str_arg(op, args, index).map(Some),
    }
}

fn index_arg(op: &str, args: &[Value], index: usize, default: usize) -> QueryResult<usize> {
    match arg(args, index) {
        None => Ok(default),
        Some(Value::Number(n)) if *n >= 0.0 && n.fract() == 0.0 => Ok(*n as usize),
        Some(_) => Err(QueryError::invalid_argument(op, "expected a non-negative integer")),
    }
}

fn limit_arg(op: &str, args: &[Value], index: usize) -> QueryResult<Limit> {
    match arg(args, index) {
        None => Ok(Limit::default()),
        Some(Value::Number(n)) if n.is_infinite() => Ok(Limit::Unbounded),
        Some(_) => index_arg(op, args, index, 1).map(Limit::Count),
    }
}

fn content_arg(op: &str, value: Option<&Value>) -> QueryResult<Content> {
    match value {
        Some(Value::Node(id)) => Ok(Content::Node(*id)),
        Some(Value::Collection(c)) => Ok(Content::Collection(c.clone())),
        Some(Value::String(s)) => Ok(Content::Markup(s.clone())),
        other => Err(QueryError::invalid_argument(
            op,
            format!("expected a node, a collection or markup, got {other:?}"),
        )),
    }
}

fn css_arg(value: &Value) -> CssValue {
    match value {
        Value::Number(n) => CssValue::Number(*n),
        other => CssValue::Text(other.to_string()),
    }
}

/// `"/^b/"` strings are read as regex literals
fn class_pattern_arg(op: &str, value: Option<&Value>) -> QueryResult<ClassPattern> {
    let text = value
        .and_then(Value::as_str)
        .ok_or_else(|| QueryError::invalid_argument(op, "expected a class name or /pattern/"))?;
    match text.strip_prefix('/').and_then(|rest| rest.strip_suffix('/')) {
        Some(pattern) if !pattern.is_empty() => Regex::new(pattern)
            .map(ClassPattern::Regex)
            .map_err(|e| QueryError::invalid_argument(op, e.to_string())),
        _ => Ok(ClassPattern::Exact(text.to_string())),
    }
}

fn chain(collection: &Collection) -> QueryResult<Value> {
    Ok(Value::Collection(collection.clone()))
}

/// Box a closure as an [`Operation`]
fn op(f: impl Fn(&Collection, &[Value]) -> QueryResult<Value> + 'static) -> Operation {
    Rc::new(f)
}

fn builtins() -> HashMap<String, Operation> {
    let mut ops: HashMap<String, Operation> = HashMap::new();
    let mut add = |name: &str, operation: Operation| {
        ops.insert(name.to_string(), operation);
    };

    add("length", op(|c, _| Ok(Value::from(c.len()))));
    add("toArray", op(|c, _| Ok(Value::from(c.to_vec()))));
    add("get", op(|c, args| Ok(Value::from(c.get(index_arg("get", args, 0, 0)?)))));
    add("at", op(|c, args| Ok(Value::from(c.at(index_arg("at", args, 0, 0)?)))));
    add("first", op(|c, _| Ok(Value::from(c.first()))));
    add("last", op(|c, _| Ok(Value::from(c.last()))));
    add("find", op(|c, args| Ok(Value::from(c.find(str_arg("find", args, 0)?)?))));
    add("is", op(|c, args| Ok(Value::from(c.is(str_arg("is", args, 0)?)?))));
    add(
        "parent",
        op(|c, args| {
            let selector = opt_str_arg("parent", args, 0)?;
            Ok(Value::from(c.parent(selector, limit_arg("parent", args, 1)?)?))
        }),
    );
    add(
        "next",
        op(|c, args| {
            let selector = opt_str_arg("next", args, 0)?;
            Ok(Value::from(c.next(selector, limit_arg("next", args, 1)?)?))
        }),
    );
    add(
        "previous",
        op(|c, args| {
            let selector = opt_str_arg("previous", args, 0)?;
            Ok(Value::from(c.previous(selector, limit_arg("previous", args, 1)?)?))
        }),
    );

    add(
        "attr",
        op(|c, args| {
            let name = str_arg("attr", args, 0)?;
            match args.get(1) {
                None => Ok(Value::from(c.attr(name))),
                Some(Value::Null) => chain(c.remove_attr(name)),
                Some(value) => chain(c.set_attr(name, value.to_string())),
            }
        }),
    );
    add(
        "removeAttr",
        op(|c, args| chain(c.remove_attr(str_arg("removeAttr", args, 0)?))),
    );
    add(
        "prop",
        op(|c, args| {
            let name = str_arg("prop", args, 0)?;
            match args.get(1) {
                None => Ok(Value::from(c.prop(name))),
                Some(value) => chain(c.set_prop(name, PropValue::from(value))?),
            }
        }),
    );
    add(
        "css",
        op(|c, args| match arg(args, 0) {
            Some(Value::Map(pairs)) => {
                chain(c.set_css_map(pairs.iter().map(|(name, value)| (name, css_arg(value)))))
            }
            _ => {
                let name = str_arg("css", args, 0)?;
                match args.get(1) {
                    None => Ok(Value::from(c.css(name))),
                    Some(value) => chain(c.set_css(name, css_arg(value))),
                }
            }
        }),
    );

    add(
        "addClass",
        op(|c, args| chain(c.add_class(str_arg("addClass", args, 0)?))),
    );
    add(
        "removeClass",
        op(|c, args| chain(c.remove_class(class_pattern_arg("removeClass", arg(args, 0))?))),
    );
    add(
        "toggleClass",
        op(|c, args| {
            let name = str_arg("toggleClass", args, 0)?;
            let force = args.get(1).map(Value::is_truthy);
            chain(c.toggle_class(name, force))
        }),
    );
    add(
        "hasClass",
        op(|c, args| Ok(Value::from(c.has_class(str_arg("hasClass", args, 0)?)))),
    );

    add(
        "html",
        op(|c, args| match args.first() {
            None => Ok(Value::from(c.html())),
            Some(markup) => chain(c.set_html(&markup.to_string())?),
        }),
    );
    add(
        "text",
        op(|c, args| match args.first() {
            None => Ok(Value::from(c.text())),
            Some(text) => chain(c.set_text(&text.to_string())?),
        }),
    );
    let value: Operation = op(|c, args| match args.first() {
        None => Ok(Value::from(c.value())),
        Some(value) => chain(c.set_value(&value.to_string())?),
    });
    add("value", Rc::clone(&value));
    add("val", value);

    add(
        "append",
        op(|c, args| chain(c.append(content_arg("append", arg(args, 0))?)?)),
    );
    add(
        "prepend",
        op(|c, args| chain(c.prepend(content_arg("prepend", arg(args, 0))?)?)),
    );
    add(
        "insertAfter",
        op(|c, args| chain(c.insert_after(content_arg("insertAfter", arg(args, 0))?)?)),
    );
    add(
        "replace",
        op(|c, args| chain(c.replace(content_arg("replace", arg(args, 0))?)?)),
    );
    add(
        "appendTo",
        op(|c, args| chain(c.append_to(Input::try_from(arg(args, 0).cloned().unwrap_or_default())?)?)),
    );
    add("empty", op(|c, _| chain(c.empty()?)));
    add("clone", op(|c, _| Ok(Value::from(c.deep_clone()?))));
    add(
        "remove",
        op(|c, _| {
            c.remove()?;
            chain(c)
        }),
    );
    add("focus", op(|c, _| chain(c.focus()?)));
    add("trigger", op(|c, args| chain(c.trigger(str_arg("trigger", args, 0)?)?)));
    add(
        "dom",
        op(|c, args| Ok(Value::from(c.dom().query_value(arg(args, 0).cloned().unwrap_or_default())?))),
    );

    for &name in ATTRS {
        add(
            name,
            op(move |c, args| match args.first() {
                None => Ok(Value::from(c.attr(name))),
                Some(Value::Null) => chain(c.remove_attr(name)),
                Some(value) => chain(c.set_attr(name, value.to_string())),
            }),
        );
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dom;

    #[test]
    fn test_builtins_are_registered() {
        for name in ["addClass", "appendTo", "toggleClass", "css", "find", "tabindex", "type"] {
            assert!(is_registered(name), "{name} missing");
        }
        assert!(!is_registered("each"));
    }

    #[test]
    fn test_call_dispatches_getters_and_setters() {
        let dom = Dom::parse("<div></div>").unwrap();
        let div = dom.query("div").unwrap();

        let chained = div.call("addClass", &["foo bar".into()]).unwrap();
        assert_eq!(chained, Value::Collection(div.clone()));
        div.call("removeClass", &["/^b/".into()]).unwrap();
        assert_eq!(div.call("attr", &["class".into()]).unwrap(), Value::from("foo"));

        div.call("css", &[Value::Map(vec![("top".into(), 5.into()), ("left".into(), 10.into())])])
            .unwrap();
        assert_eq!(div.css("left").as_deref(), Some("10px"));

        div.call("toggleClass", &["show".into(), 0.into()]).unwrap();
        assert!(!div.has_class("show"));
        div.call("toggleClass", &["show".into(), 1.into()]).unwrap();
        assert!(div.has_class("show"));
    }

    #[test]
    fn test_unknown_operation() {
        let dom = Dom::new().unwrap();
        let empty = Collection::new_empty(&dom);
        assert!(matches!(
            empty.call("nope", &[]),
            Err(QueryError::UnknownOperation(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_register_and_replace() {
        register("countTwice", |c, _| Ok(Value::from(c.len() * 2)));
        let dom = Dom::parse("<p></p><p></p>").unwrap();
        let ps = dom.query("p").unwrap();
        assert_eq!(ps.call("countTwice", &[]).unwrap(), Value::from(4));

        register("countTwice", |_, _| Ok(Value::Null));
        assert_eq!(ps.call("countTwice", &[]).unwrap(), Value::Null);
    }

    #[test]
    fn test_invalid_argument() {
        let dom = Dom::parse("<p></p>").unwrap();
        let p = dom.query("p").unwrap();
        assert!(matches!(
            p.call("find", &[Value::from(3)]),
            Err(QueryError::InvalidArgument { .. })
        ));
    }
}
