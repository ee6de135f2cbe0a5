//! Edge case tests for fos-query

use std::cell::RefCell;
use std::rc::Rc;

use fos_query::{Collection, Dom, EventHandler, Limit, QueryError, Value};

// ============================================================================
// Empty and degenerate collections
// ============================================================================

#[test]
fn test_empty_collection_is_inert() {
    let dom = Dom::parse("<p>x</p>").unwrap();
    let none = dom.query("video").unwrap();
    assert!(none.is_empty());
    assert_eq!(none.get(0), None);
    assert!(none.first().is_empty());
    assert!(none.last().is_empty());
    assert_eq!(none.attr("id"), None);
    assert_eq!(none.css("color"), None);
    assert!(!none.has_class("x"));
    assert!(!none.is("p").unwrap());
    assert!(none.find("p").unwrap().is_empty());
    assert!(none.parent(None, Limit::Unbounded).unwrap().is_empty());

    none.add_class("x").set_attr("a", "b").set_css("top", 1);
    none.set_html("<b></b>").unwrap().set_text("t").unwrap().remove().unwrap();
    assert_eq!(dom.query("p").unwrap().html(), "x");
}

#[test]
fn test_empty_collection_context_falls_back_to_document() {
    let dom = Dom::parse("<p>x</p>").unwrap();
    let none = Collection::new_empty(&dom);
    assert_eq!(dom.query_in("p", &none).unwrap().len(), 1);
}

#[test]
fn test_walks_from_detached_node_stop_cleanly() {
    let dom = Dom::new().unwrap();
    let lone = dom.query("<span></span>").unwrap();
    assert!(lone.parent(None, Limit::Unbounded).unwrap().is_empty());
    assert!(lone.next(None, 3).unwrap().is_empty());
    assert!(lone.previous(Some("b"), 1).unwrap().is_empty());
}

#[test]
fn test_limit_zero_collects_nothing() {
    let dom = Dom::parse("<div><p><b>x</b></p></div>").unwrap();
    assert!(dom.query("b").unwrap().parent(None, 0).unwrap().is_empty());
}

#[test]
fn test_find_keeps_duplicates_from_nested_roots() {
    let dom = Dom::parse("<div><div><b>x</b></div></div>").unwrap();
    let found = dom.query("div").unwrap().find("b").unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found.get(0), found.get(1));
}

// ============================================================================
// Factory input errors
// ============================================================================

#[test]
fn test_rejected_inputs() {
    let dom = Dom::new().unwrap();
    assert!(matches!(dom.query_value(Value::from(7)), Err(QueryError::InvalidInput(_))));
    assert!(matches!(dom.query_value(Value::Bool(true)), Err(QueryError::InvalidInput(_))));
    assert!(matches!(
        dom.query_value(Value::List(vec![Value::from("x")])),
        Err(QueryError::InvalidInput(_))
    ));
    assert!(matches!(dom.query(""), Err(QueryError::Selector(_))));
    assert!(matches!(dom.query("#"), Err(QueryError::Selector(_))));
}

#[test]
fn test_leading_whitespace_before_markup() {
    let dom = Dom::new().unwrap();
    let list = dom.query("\n   <b>x</b>").unwrap();
    assert_eq!(list.selector(), Some("<b>x</b>"));
    assert_eq!(list.text(), "x");
}

#[test]
fn test_multiple_roots_become_one_fragment() {
    let dom = Dom::new().unwrap();
    let list = dom.query("<p>a</p><p>b</p>").unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list.html(), "<p>a</p><p>b</p>");

    let target = dom.query("<div></div>").unwrap();
    target.append(&list).unwrap();
    assert_eq!(target.find("p").unwrap().len(), 2);
}

#[test]
fn test_table_fragments_parse_in_context() {
    let dom = Dom::parse("<table><tbody></tbody></table>").unwrap();
    let row = dom.query("<tr><td>cell</td></tr>").unwrap();
    assert!(row.is("tr").unwrap());
    row.append_to("tbody").unwrap();
    assert_eq!(dom.query("table td").unwrap().text(), "cell");
}

// ============================================================================
// Cross-document and multi-target mutation
// ============================================================================

#[test]
fn test_foreign_collection_is_rejected() {
    let a = Dom::parse("<div></div>").unwrap();
    let b = Dom::parse("<p></p>").unwrap();
    let div = a.query("div").unwrap();
    let p = b.query("p").unwrap();
    assert!(matches!(div.append(&p), Err(QueryError::InvalidInput(_))));
    assert!(matches!(a.query_in("p", &p), Err(QueryError::InvalidInput(_))));
}

#[test]
fn test_replace_on_many_targets_clones() {
    let dom = Dom::parse("<i>1</i><i>2</i><i>3</i>").unwrap();
    let italics = dom.query("i").unwrap();
    italics.replace("<b>x</b>").unwrap();
    assert_eq!(dom.query("body").unwrap().html(), "<b>x</b><b>x</b><b>x</b>");
    assert!(dom.query("i").unwrap().is_empty());
}

#[test]
fn test_prepend_many_targets() {
    let dom = Dom::parse("<ul><li>a</li></ul><ul><li>b</li></ul>").unwrap();
    dom.query("ul").unwrap().prepend("<li>0</li>").unwrap();
    let texts = dom.query("li").unwrap().map(|li, _| li.text());
    assert_eq!(texts, vec!["0", "a", "0", "b"]);
}

#[test]
fn test_append_into_self_is_hierarchy_error() {
    let dom = Dom::parse("<div><p></p></div>").unwrap();
    let div = dom.query("div").unwrap();
    let p = dom.query("p").unwrap();
    assert!(matches!(p.append(&div), Err(QueryError::Dom(_))));
}

// ============================================================================
// Attributes and classes
// ============================================================================

#[test]
fn test_text_node_members_are_skipped_by_setters() {
    let dom = Dom::new().unwrap();
    let text = dom.create_text("t");
    let el = dom.create_element("span");
    let mixed = dom.query(vec![text, el]).unwrap();
    mixed.add_class("a").set_attr("title", "x").set_css("width", 3);
    assert_eq!(mixed.at(1).attr("class").as_deref(), Some("a"));
    assert_eq!(mixed.at(1).css("width").as_deref(), Some("3px"));
    assert_eq!(mixed.attr("title"), None);
}

#[test]
fn test_remove_class_regex_without_match() {
    let dom = Dom::new().unwrap();
    let el = dom.query(r#"<p class="alpha beta"></p>"#).unwrap();
    el.remove_class(regex::Regex::new("^z").unwrap());
    assert_eq!(el.attr("class").as_deref(), Some("alpha beta"));
}

#[test]
fn test_css_empty_value_removes_declaration() {
    let dom = Dom::new().unwrap();
    let el = dom.query(r#"<p style="color: red"></p>"#).unwrap();
    el.set_css("color", "");
    assert_eq!(el.css("color"), None);
    assert_eq!(el.attr("style"), None);
}

#[test]
fn test_registry_argument_errors() {
    let dom = Dom::parse("<p></p>").unwrap();
    let p = dom.query("p").unwrap();
    assert!(matches!(p.call("get", &[Value::from(-1)]), Err(QueryError::InvalidArgument { .. })));
    assert!(matches!(p.call("append", &[Value::Bool(true)]), Err(QueryError::InvalidArgument { .. })));
    assert!(matches!(p.call("removeClass", &["/(/".into()]), Err(QueryError::InvalidArgument { .. })));
    assert!(matches!(p.call("each", &[]), Err(QueryError::UnknownOperation(_))));
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_off_without_on_is_harmless() {
    let dom = Dom::parse("<ul><li>x</li></ul>").unwrap();
    let ul = dom.query("ul").unwrap();
    let handler = EventHandler::new(|_| {});
    ul.off("click", Some("li"), &handler, false).unwrap();
    ul.off("click", None, &handler, false).unwrap();
    assert_eq!(ul.listener_count(), 0);
}

#[test]
fn test_capture_flag_must_match_to_unbind() {
    let dom = Dom::parse("<ul><li>x</li></ul>").unwrap();
    let ul = dom.query("ul").unwrap();
    let handler = EventHandler::new(|_| {});
    ul.on("click", Some("li"), &handler, true).unwrap();
    ul.off("click", Some("li"), &handler, false).unwrap();
    assert_eq!(ul.listener_count(), 1);
    ul.off("click", Some("li"), &handler, true).unwrap();
    assert_eq!(ul.listener_count(), 0);
}

#[test]
fn test_one_handler_delegated_in_two_documents() {
    let markup = "<ul><li>x</li></ul>";
    let first = Dom::parse(markup).unwrap();
    let second = Dom::parse(markup).unwrap();
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let handler = EventHandler::new(move |_| *counter.borrow_mut() += 1);

    for dom in [&first, &second] {
        dom.query("ul").unwrap().on("click", Some("li"), &handler, false).unwrap();
    }
    assert_eq!(second.query("ul").unwrap().listener_count(), 1);
    first.query("li").unwrap().trigger("click").unwrap();
    second.query("li").unwrap().trigger("click").unwrap();
    assert_eq!(*calls.borrow(), 2);

    second.query("ul").unwrap().off("click", Some("li"), &handler, false).unwrap();
    first.query("li").unwrap().trigger("click").unwrap();
    second.query("li").unwrap().trigger("click").unwrap();
    assert_eq!(*calls.borrow(), 3);
}

#[test]
fn test_handler_removing_itself_during_dispatch() {
    let dom = Dom::parse("<button>b</button>").unwrap();
    let button = dom.query("button").unwrap();
    let calls = Rc::new(RefCell::new(0));
    let slot: Rc<RefCell<Option<EventHandler>>> = Rc::new(RefCell::new(None));

    let counter = Rc::clone(&calls);
    let me = Rc::clone(&slot);
    let target = button.clone();
    let handler = EventHandler::new(move |_| {
        *counter.borrow_mut() += 1;
        if let Some(handler) = me.borrow().as_ref() {
            target.off("click", None, handler, false).unwrap();
        }
    });
    *slot.borrow_mut() = Some(handler.clone());

    button.on("click", None, &handler, false).unwrap();
    button.trigger("click").unwrap();
    button.trigger("click").unwrap();
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn test_non_bubbling_event_skips_ancestors() {
    let dom = Dom::parse("<div><input></div>").unwrap();
    let seen = Rc::new(RefCell::new(0));
    let s = Rc::clone(&seen);
    let handler = EventHandler::new(move |_| *s.borrow_mut() += 1);
    dom.query("div").unwrap().on("focus", None, &handler, false).unwrap();
    dom.query("input").unwrap().focus().unwrap();
    assert_eq!(*seen.borrow(), 0);

    // Capturing listeners still see it
    dom.query("div").unwrap().on("focus", None, &handler, true).unwrap();
    dom.query("input").unwrap().trigger("focus").unwrap();
    assert_eq!(*seen.borrow(), 1);
}

#[test]
fn test_delegate_on_text_target_uses_parent() {
    let dom = Dom::parse("<ul><li>x</li></ul>").unwrap();
    let hits = Rc::new(RefCell::new(0));
    let h = Rc::clone(&hits);
    let handler = EventHandler::new(move |_| *h.borrow_mut() += 1);
    dom.query("ul").unwrap().on("click", Some("li"), &handler, false).unwrap();

    let li = dom.query("li").unwrap().get(0).unwrap();
    let text = dom.with_tree(|t| t.first_child(li)).unwrap();
    dom.dispatch(text, "click").unwrap();
    assert_eq!(*hits.borrow(), 1);
}
