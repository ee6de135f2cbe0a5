//! Selector Matching
//!
//! Matches parsed selectors against elements of a live `DomTree`.
//! Complex selectors are matched right to left, backtracking over
//! descendant and subsequent-sibling combinators.

use fos_dom::{DomTree, NodeData, NodeId, PropValue};

use crate::selectors::{
    Combinator, ComplexSelector, CompoundSelector, Direction, NthExpression, PseudoClass,
    RelativeSelector, SelectorComponent, SelectorList,
};

/// Form controls that can be disabled
const DISABLEABLE: &[&str] = &[
    "button", "input", "select", "textarea", "optgroup", "option", "fieldset",
];

/// Selector matcher bound to a tree
#[derive(Debug, Clone, Copy)]
pub struct SelectorMatcher<'a> {
    tree: &'a DomTree,
    focus: Option<NodeId>,
    scope: Option<NodeId>,
}

impl<'a> SelectorMatcher<'a> {
    pub fn new(tree: &'a DomTree) -> Self {
        Self {
            tree,
            focus: None,
            scope: None,
        }
    }

    /// Element matched by `:focus`
    pub fn with_focus(mut self, focus: Option<NodeId>) -> Self {
        self.focus = focus;
        self
    }

    /// Element matched by `:scope` (defaults to the root element)
    pub fn with_scope(mut self, scope: NodeId) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Does an element match any selector of the list?
    pub fn matches(&self, node: NodeId, list: &SelectorList) -> bool {
        self.tree.is_element(node) && list.0.iter().any(|sel| self.matches_complex(sel, node))
    }

    /// Matching strict descendants of `root`, in document order
    pub fn select_all(&self, root: NodeId, list: &SelectorList) -> Vec<NodeId> {
        let scoped = self.scoped_to(root);
        self.tree
            .descendants(root)
            .into_iter()
            .filter(|&node| scoped.matches(node, list))
            .collect()
    }

    /// First matching strict descendant of `root`
    pub fn select_first(&self, root: NodeId, list: &SelectorList) -> Option<NodeId> {
        let scoped = self.scoped_to(root);
        self.tree
            .descendants(root)
            .into_iter()
            .find(|&node| scoped.matches(node, list))
    }

    /// Nearest inclusive element ancestor matching the list. The walk
    /// stops after `boundary` has been tested.
    pub fn closest(
        &self,
        node: NodeId,
        list: &SelectorList,
        boundary: Option<NodeId>,
    ) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if !self.tree.is_element(current) {
                return None;
            }
            if self.matches(current, list) {
                return Some(current);
            }
            if Some(current) == boundary {
                return None;
            }
            cursor = self.tree.parent(current);
        }
        None
    }

    fn scoped_to(&self, root: NodeId) -> Self {
        match self.scope {
            Some(_) => *self,
            None if self.tree.is_element(root) => self.with_scope(root),
            None => *self,
        }
    }

    fn matches_complex(&self, selector: &ComplexSelector, node: NodeId) -> bool {
        match selector.compounds.len() {
            0 => false,
            n => self.matches_from(selector, n - 1, node),
        }
    }

    /// Match `compounds[index]` against `node`, then the rest leftwards
    fn matches_from(&self, selector: &ComplexSelector, index: usize, node: NodeId) -> bool {
        if !self.matches_compound(&selector.compounds[index], node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        let next = index - 1;
        match selector.combinators[next] {
            Combinator::Descendant => self
                .element_ancestors(node)
                .any(|ancestor| self.matches_from(selector, next, ancestor)),
            Combinator::Child => self
                .parent_element(node)
                .is_some_and(|parent| self.matches_from(selector, next, parent)),
            Combinator::NextSibling => self
                .tree
                .prev_element_sibling(node)
                .is_some_and(|prev| self.matches_from(selector, next, prev)),
            Combinator::SubsequentSibling => {
                let mut cursor = self.tree.prev_element_sibling(node);
                while let Some(prev) = cursor {
                    if self.matches_from(selector, next, prev) {
                        return true;
                    }
                    cursor = self.tree.prev_element_sibling(prev);
                }
                false
            }
        }
    }

    fn matches_compound(&self, compound: &CompoundSelector, node: NodeId) -> bool {
        compound
            .components
            .iter()
            .all(|component| self.matches_component(component, node))
    }

    fn matches_component(&self, component: &SelectorComponent, node: NodeId) -> bool {
        let Some(elem) = self.tree.get(node).and_then(|n| n.as_element()) else {
            return false;
        };
        match component {
            SelectorComponent::Universal => true,
            SelectorComponent::Type(tag) => self.tree.resolve(elem.name.local).eq_ignore_ascii_case(tag),
            SelectorComponent::Id(id) => elem.get_attr("id") == Some(id.as_str()),
            SelectorComponent::Class(class) => elem
                .get_attr("class")
                .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class)),
            SelectorComponent::Attribute(attr) => attr.matches(elem.get_attr(&attr.name)),
            SelectorComponent::PseudoClass(pseudo) => self.matches_pseudo(pseudo, node),
            SelectorComponent::PseudoElement(_) => false,
        }
    }

    fn matches_pseudo(&self, pseudo: &PseudoClass, node: NodeId) -> bool {
        let tree = self.tree;
        let tag = tree.tag_name(node).unwrap_or("");
        let attr = |name: &str| {
            tree.get(node)
                .and_then(|n| n.as_element())
                .and_then(|e| e.get_attr(name))
        };

        match pseudo {
            // Link pseudo-classes
            PseudoClass::Link | PseudoClass::AnyLink => {
                matches!(tag, "a" | "area") && attr("href").is_some()
            }

            // No browsing context: nothing is visited, hovered or targeted
            PseudoClass::Visited | PseudoClass::Hover | PseudoClass::Active | PseudoClass::Target => {
                false
            }
            PseudoClass::Focus => self.focus == Some(node),
            PseudoClass::FocusWithin => self.focus.is_some_and(|focus| tree.contains(node, focus)),

            // Input pseudo-classes
            PseudoClass::Disabled => self.is_disabled(node, tag),
            PseudoClass::Enabled => DISABLEABLE.contains(&tag) && !self.is_disabled(node, tag),
            PseudoClass::Checked => match tag {
                "input" => {
                    let kind = attr("type").unwrap_or("").to_ascii_lowercase();
                    matches!(kind.as_str(), "checkbox" | "radio")
                        && self.bool_property(node, "checked")
                }
                "option" => self.bool_property(node, "selected"),
                _ => false,
            },
            PseudoClass::Required => is_form_field(tag) && attr("required").is_some(),
            PseudoClass::Optional => is_form_field(tag) && attr("required").is_none(),
            PseudoClass::ReadWrite => self.is_read_write(node, tag),
            PseudoClass::ReadOnly => !self.is_read_write(node, tag),
            PseudoClass::PlaceholderShown => {
                matches!(tag, "input" | "textarea")
                    && attr("placeholder").is_some()
                    && tree.control_value(node).is_empty()
            }

            // Tree-structural pseudo-classes
            PseudoClass::Root => tree
                .parent(node)
                .and_then(|p| tree.get(p))
                .is_some_and(|p| matches!(p.data, NodeData::Document)),
            PseudoClass::Scope => match self.scope {
                Some(scope) => scope == node,
                None => self.matches_pseudo(&PseudoClass::Root, node),
            },
            PseudoClass::Empty => tree.children(node).all(|(_, child)| match &child.data {
                NodeData::Text(text) => text.content.is_empty(),
                NodeData::Comment(_) => true,
                _ => false,
            }),
            PseudoClass::FirstChild => self.position(node, false, false) == 1,
            PseudoClass::LastChild => self.position(node, true, false) == 1,
            PseudoClass::OnlyChild => {
                self.position(node, false, false) == 1 && self.position(node, true, false) == 1
            }
            PseudoClass::FirstOfType => self.position(node, false, true) == 1,
            PseudoClass::LastOfType => self.position(node, true, true) == 1,
            PseudoClass::OnlyOfType => {
                self.position(node, false, true) == 1 && self.position(node, true, true) == 1
            }
            PseudoClass::NthChild(expr) => self.nth(expr, node, false, false),
            PseudoClass::NthLastChild(expr) => self.nth(expr, node, true, false),
            PseudoClass::NthOfType(expr) => self.nth(expr, node, false, true),
            PseudoClass::NthLastOfType(expr) => self.nth(expr, node, true, true),

            // Logical pseudo-classes
            PseudoClass::Not(list) => !self.matches(node, list),
            PseudoClass::Is(list) | PseudoClass::Where(list) => self.matches(node, list),
            PseudoClass::Has(relative) => relative.iter().any(|rel| self.has_relative(node, rel)),

            // Other
            PseudoClass::Lang(lang) => {
                let declared = self.inherited_attr(node, "lang").unwrap_or_default().to_ascii_lowercase();
                declared == *lang || declared.starts_with(&format!("{lang}-"))
            }
            PseudoClass::Dir(dir) => {
                let rtl = self
                    .inherited_attr(node, "dir")
                    .is_some_and(|d| d.eq_ignore_ascii_case("rtl"));
                match dir {
                    Direction::Ltr => !rtl,
                    Direction::Rtl => rtl,
                }
            }
        }
    }

    fn has_relative(&self, anchor: NodeId, relative: &RelativeSelector) -> bool {
        let candidates: Vec<NodeId> = match relative.combinator {
            Combinator::Descendant => self.tree.descendants(anchor),
            Combinator::Child => self.tree.element_children(anchor).collect(),
            Combinator::NextSibling => self.tree.next_element_sibling(anchor).into_iter().collect(),
            Combinator::SubsequentSibling => {
                let mut out = Vec::new();
                let mut cursor = self.tree.next_element_sibling(anchor);
                while let Some(next) = cursor {
                    out.push(next);
                    cursor = self.tree.next_element_sibling(next);
                }
                out
            }
        };
        candidates
            .into_iter()
            .any(|candidate| self.tree.is_element(candidate) && self.matches_complex(&relative.selector, candidate))
    }

    /// 1-based element position among siblings, from the start or end,
    /// optionally counting only siblings of the same type
    fn position(&self, node: NodeId, from_end: bool, same_type: bool) -> i32 {
        let tag = self.tree.tag_name(node);
        let step = |id| {
            if from_end {
                self.tree.next_element_sibling(id)
            } else {
                self.tree.prev_element_sibling(id)
            }
        };
        let mut index = 1;
        let mut cursor = step(node);
        while let Some(sibling) = cursor {
            if !same_type || self.tree.tag_name(sibling) == tag {
                index += 1;
            }
            cursor = step(sibling);
        }
        index
    }

    fn nth(&self, expr: &NthExpression, node: NodeId, from_end: bool, same_type: bool) -> bool {
        expr.matches(self.position(node, from_end, same_type))
    }

    fn element_ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .ancestors(node)
            .take_while(|&ancestor| self.tree.is_element(ancestor))
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node).filter(|&p| self.tree.is_element(p))
    }

    fn inherited_attr(&self, node: NodeId, name: &str) -> Option<String> {
        std::iter::once(node)
            .chain(self.element_ancestors(node))
            .find_map(|id| {
                self.tree
                    .get(id)
                    .and_then(|n| n.as_element())
                    .and_then(|e| e.get_attr(name))
                    .map(str::to_string)
            })
    }

    fn bool_property(&self, node: NodeId, name: &str) -> bool {
        matches!(self.tree.property(node, name), Ok(PropValue::Bool(true)))
    }

    fn is_disabled(&self, node: NodeId, tag: &str) -> bool {
        if !DISABLEABLE.contains(&tag) {
            return false;
        }
        if self.bool_property(node, "disabled") {
            return true;
        }
        // Controls inside a disabled fieldset are disabled too
        self.element_ancestors(node).any(|ancestor| {
            self.tree.tag_name(ancestor) == Some("fieldset") && self.bool_property(ancestor, "disabled")
        })
    }

    fn is_read_write(&self, node: NodeId, tag: &str) -> bool {
        let editable_control = match tag {
            "textarea" => true,
            "input" => {
                let kind = self
                    .tree
                    .get(node)
                    .and_then(|n| n.as_element())
                    .and_then(|e| e.get_attr("type"))
                    .unwrap_or("text")
                    .to_ascii_lowercase();
                !matches!(
                    kind.as_str(),
                    "checkbox" | "radio" | "button" | "submit" | "reset" | "hidden" | "image" | "file" | "range" | "color"
                )
            }
            _ => false,
        };
        if editable_control {
            return !self.bool_property(node, "readOnly") && !self.is_disabled(node, tag);
        }
        self.inherited_attr(node, "contenteditable")
            .is_some_and(|v| v.is_empty() || v.eq_ignore_ascii_case("true"))
    }
}

fn is_form_field(tag: &str) -> bool {
    matches!(tag, "input" | "select" | "textarea")
}

/// Does `node` match the selector list?
pub fn matches(tree: &DomTree, node: NodeId, list: &SelectorList) -> bool {
    SelectorMatcher::new(tree).matches(node, list)
}

/// `querySelectorAll`: matching strict descendants of `root` in document order
pub fn select_all(tree: &DomTree, root: NodeId, list: &SelectorList) -> Vec<NodeId> {
    SelectorMatcher::new(tree).select_all(root, list)
}

/// `querySelector`: first matching strict descendant of `root`
pub fn select_first(tree: &DomTree, root: NodeId, list: &SelectorList) -> Option<NodeId> {
    SelectorMatcher::new(tree).select_first(root, list)
}

/// Nearest inclusive ancestor matching the list, not walking past `boundary`
pub fn closest(
    tree: &DomTree,
    node: NodeId,
    list: &SelectorList,
    boundary: Option<NodeId>,
) -> Option<NodeId> {
    SelectorMatcher::new(tree).closest(node, list, boundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// body > ul#list > li.a, li.b, li.c
    fn list_tree() -> (DomTree, NodeId, Vec<NodeId>) {
        let mut tree = DomTree::new();
        let body = tree.create_element("body");
        tree.append_child(tree.root(), body).unwrap();
        let ul = tree.create_element("ul");
        tree.element_mut(ul).unwrap().set_attr("id", "list");
        tree.append_child(body, ul).unwrap();
        let items = ["a", "b", "c"]
            .iter()
            .map(|class| {
                let li = tree.create_element("li");
                tree.element_mut(li).unwrap().set_attr("class", *class);
                tree.append_child(ul, li).unwrap();
                li
            })
            .collect();
        (tree, ul, items)
    }

    fn sel(s: &str) -> SelectorList {
        SelectorList::parse(s).unwrap()
    }

    #[test]
    fn test_select_all_document_order() {
        let (tree, ul, items) = list_tree();
        assert_eq!(select_all(&tree, ul, &sel("li")), items);
        assert_eq!(select_all(&tree, tree.root(), &sel(".b, .a")), vec![items[0], items[1]]);
        assert_eq!(select_first(&tree, tree.root(), &sel("#list > li")), Some(items[0]));
    }

    #[test]
    fn test_combinators() {
        let (tree, _, items) = list_tree();
        assert!(matches(&tree, items[1], &sel("li.a + li")));
        assert!(matches(&tree, items[2], &sel(".a ~ .c")));
        assert!(!matches(&tree, items[0], &sel("li + li")));
        assert!(matches(&tree, items[2], &sel("body li")));
        assert!(!matches(&tree, items[2], &sel("body > li")));
    }

    #[test]
    fn test_structural_pseudo_classes() {
        let (tree, ul, items) = list_tree();
        assert!(matches(&tree, items[0], &sel("li:first-child")));
        assert!(matches(&tree, items[2], &sel("li:last-of-type")));
        assert!(matches(&tree, items[1], &sel(":nth-child(2)")));
        assert!(matches(&tree, items[0], &sel(":nth-last-child(3)")));
        assert!(matches(&tree, ul, &sel("ul:only-child")));
        assert!(matches(&tree, items[0], &sel(":empty")));
        assert!(!matches(&tree, ul, &sel(":empty")));
        assert!(matches(&tree, ul, &sel(":has(> .c)")));
        assert!(matches(&tree, items[1], &sel("li:not(.a, .c)")));
    }

    #[test]
    fn test_query_is_document_relative() {
        // Ancestors outside the query root still take part in matching
        let (tree, ul, items) = list_tree();
        assert_eq!(select_all(&tree, ul, &sel("body li.c")), vec![items[2]]);
        assert_eq!(select_all(&tree, ul, &sel(":scope > .a")), vec![items[0]]);
    }

    #[test]
    fn test_closest_with_boundary() {
        let (tree, ul, items) = list_tree();
        assert_eq!(closest(&tree, items[1], &sel("li"), None), Some(items[1]));
        assert_eq!(closest(&tree, items[1], &sel("ul"), Some(ul)), Some(ul));
        assert_eq!(closest(&tree, items[1], &sel("body"), Some(ul)), None);
        assert_eq!(closest(&tree, items[1], &sel("section"), None), None);
    }

    #[test]
    fn test_form_states() {
        let mut tree = DomTree::new();
        let input = tree.create_element("input");
        tree.element_mut(input).unwrap().set_attr("type", "checkbox");
        assert!(!matches(&tree, input, &sel(":checked")));
        tree.set_property(input, "checked", true.into()).unwrap();
        assert!(matches(&tree, input, &sel("input:checked")));

        let fieldset = tree.create_element("fieldset");
        tree.element_mut(fieldset).unwrap().set_attr("disabled", "");
        tree.append_child(fieldset, input).unwrap();
        assert!(matches(&tree, input, &sel(":disabled")));
        assert!(!matches(&tree, input, &sel(":enabled")));
    }

    #[test]
    fn test_focus() {
        let (tree, ul, items) = list_tree();
        let matcher = SelectorMatcher::new(&tree).with_focus(Some(items[0]));
        assert!(matcher.matches(items[0], &sel(":focus")));
        assert!(matcher.matches(ul, &sel(":focus-within")));
        assert!(!matcher.matches(items[1], &sel(":focus")));
    }

    #[test]
    fn test_text_nodes_never_match() {
        let mut tree = DomTree::new();
        let text = tree.create_text("x");
        assert!(!matches(&tree, text, &sel("*")));
    }
}
