//! Comprehensive tests for fos-dom
//!
//! Tree structure, attributes, properties and listener bookkeeping through
//! the public API.

use fos_dom::{
    ClassList, Document, DomTree, Event, EventHandler, NodeId, NodeKind, PropValue,
};

fn child_ids(tree: &DomTree, parent: NodeId) -> Vec<NodeId> {
    tree.children(parent).map(|(id, _)| id).collect()
}

#[test]
fn test_append_moves_node_between_parents() {
    let mut tree = DomTree::new();
    let left = tree.create_element("ul");
    let right = tree.create_element("ol");
    let item = tree.create_element("li");
    tree.append_child(tree.root(), left).unwrap();
    tree.append_child(tree.root(), right).unwrap();

    tree.append_child(left, item).unwrap();
    assert_eq!(tree.parent(item), Some(left));

    tree.append_child(right, item).unwrap();
    assert_eq!(tree.parent(item), Some(right));
    assert!(child_ids(&tree, left).is_empty());
    assert_eq!(tree.first_child(right), tree.last_child(right));
}

#[test]
fn test_insert_before_and_detach_relink_siblings() {
    let mut tree = DomTree::new();
    let list = tree.create_element("ul");
    let a = tree.create_element("li");
    let b = tree.create_element("li");
    let c = tree.create_element("li");
    tree.append_child(list, a).unwrap();
    tree.append_child(list, c).unwrap();
    tree.insert_before(list, b, Some(c)).unwrap();
    assert_eq!(child_ids(&tree, list), vec![a, b, c]);

    tree.remove(b).unwrap();
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
    assert_eq!(tree.parent(b), None);
    assert!(!tree.get(b).unwrap().next_sibling.is_valid());
}

#[test]
fn test_fragment_children_move_on_insert() {
    let mut tree = DomTree::new();
    let target = tree.create_element("div");
    let fragment = tree.create_fragment();
    let first = tree.create_text("one");
    let second = tree.create_element("br");
    tree.append_child(fragment, first).unwrap();
    tree.append_child(fragment, second).unwrap();

    tree.append_child(target, fragment).unwrap();
    assert_eq!(child_ids(&tree, target), vec![first, second]);
    assert!(child_ids(&tree, fragment).is_empty());
    assert_eq!(tree.text_content(target), "one");
}

#[test]
fn test_ancestors_nearest_first() {
    let mut tree = DomTree::new();
    let outer = tree.create_element("section");
    let inner = tree.create_element("div");
    let leaf = tree.create_element("span");
    tree.append_child(tree.root(), outer).unwrap();
    tree.append_child(outer, inner).unwrap();
    tree.append_child(inner, leaf).unwrap();

    let chain: Vec<NodeId> = tree.ancestors(leaf).collect();
    assert_eq!(chain, vec![inner, outer, tree.root()]);
}

#[test]
fn test_class_and_style_through_element_data() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    let elem = tree.element_mut(div).unwrap();

    let mut classes = ClassList::from_attr("a b");
    classes.add("c");
    elem.set_class_list(&classes);
    assert_eq!(elem.get_attr("class"), Some("a b c"));

    let mut style = elem.style();
    style.set("marginTop", "4px");
    elem.set_style(&style);
    assert_eq!(elem.get_attr("style"), Some("margin-top: 4px;"));
}

#[test]
fn test_properties_reflect_attributes() {
    let mut tree = DomTree::new();
    let input = tree.create_element("input");

    assert_eq!(tree.property(input, "type").unwrap(), PropValue::Str("text".into()));
    tree.set_property(input, "className", "wide".into()).unwrap();
    assert_eq!(
        tree.get(input).unwrap().as_element().unwrap().get_attr("class"),
        Some("wide")
    );

    tree.element_mut(input).unwrap().set_attr("value", "initial");
    assert_eq!(tree.property(input, "value").unwrap(), PropValue::Str("initial".into()));
    tree.set_property(input, "value", "typed".into()).unwrap();
    assert_eq!(tree.property(input, "value").unwrap(), PropValue::Str("typed".into()));
    assert_eq!(
        tree.property(input, "defaultValue").unwrap(),
        PropValue::Str("initial".into())
    );
}

#[test]
fn test_document_listeners() {
    let mut doc = Document::new("about:blank").unwrap();
    let body = doc.body().unwrap();
    let handler = EventHandler::new(|event: &Event| event.prevent_default());

    assert!(doc.listeners.bind(body, "click", handler.clone(), false));
    let snapshot = doc.listeners.listeners(body, "click", false);
    assert_eq!(snapshot.len(), 1);

    let event = Event::new("click", body);
    snapshot[0].call(&event);
    assert!(event.default_prevented());

    doc.listeners.clear(body);
    assert_eq!(doc.listeners.count(body), 0);
}

#[test]
fn test_clone_keeps_attributes_not_identity() {
    let mut tree = DomTree::new();
    let a = tree.create_element("a");
    tree.element_mut(a).unwrap().set_attr("href", "#x");
    let copy = tree.deep_clone(a).unwrap();

    assert_ne!(a, copy);
    assert_eq!(tree.get(copy).unwrap().kind(), NodeKind::Element);
    assert_eq!(
        tree.get(copy).unwrap().as_element().unwrap().get_attr("href"),
        Some("#x")
    );
}
