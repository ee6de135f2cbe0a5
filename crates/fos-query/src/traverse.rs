//! Traversal and iteration
//!
//! Indexing, descendant search, ancestor and sibling walks, and the
//! callback-driven iteration helpers.

use fos_css::{SelectorList, SelectorMatcher};
use fos_dom::{DomTree, NodeId};

use crate::{Collection, QueryResult};

/// How many matches a walk collects per starting element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(usize),
    Unbounded,
}

impl Default for Limit {
    fn default() -> Self {
        Limit::Count(1)
    }
}

impl From<usize> for Limit {
    fn from(count: usize) -> Self {
        Limit::Count(count)
    }
}

/// Negative counts mean no limit
impl From<i32> for Limit {
    fn from(count: i32) -> Self {
        usize::try_from(count).map_or(Limit::Unbounded, Limit::Count)
    }
}

impl Limit {
    fn reached(self, found: usize) -> bool {
        matches!(self, Limit::Count(n) if found >= n)
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Next,
    Previous,
}

impl Collection {
    /// Node at `index`, if any
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes().get(index).copied()
    }

    /// One-element collection for `index` (empty when out of range)
    pub fn at(&self, index: usize) -> Collection {
        self.wrap(self.get(index).into_iter().collect())
    }

    pub fn first(&self) -> Collection {
        self.at(0)
    }

    pub fn last(&self) -> Collection {
        match self.len() {
            0 => self.wrap(Vec::new()),
            n => self.at(n - 1),
        }
    }

    /// Descendants of every node matching `selector`, concatenated in
    /// collection order. Duplicates are kept.
    pub fn find(&self, selector: &str) -> QueryResult<Collection> {
        let list = fos_css::parse_selector(selector)?;
        let found = self.dom().with_document(|doc| {
            let matcher = SelectorMatcher::new(&doc.tree).with_focus(doc.active_element());
            self.iter()
                .flat_map(|node| matcher.select_all(node, &list))
                .collect()
        });
        Ok(Collection::new(self.dom().clone(), found, Some(selector)))
    }

    /// Whether any node matches `selector`
    pub fn is(&self, selector: &str) -> QueryResult<bool> {
        let list = fos_css::parse_selector(selector)?;
        Ok(self.dom().with_document(|doc| {
            let matcher = SelectorMatcher::new(&doc.tree).with_focus(doc.active_element());
            self.iter().any(|node| matcher.matches(node, &list))
        }))
    }

    /// Element ancestors, nearest first, optionally filtered
    pub fn parent(&self, selector: Option<&str>, limit: impl Into<Limit>) -> QueryResult<Collection> {
        self.walk(Direction::Up, selector, limit.into())
    }

    /// Following element siblings, nearest first, optionally filtered
    pub fn next(&self, selector: Option<&str>, limit: impl Into<Limit>) -> QueryResult<Collection> {
        self.walk(Direction::Next, selector, limit.into())
    }

    /// Preceding element siblings, nearest first, optionally filtered
    pub fn previous(&self, selector: Option<&str>, limit: impl Into<Limit>) -> QueryResult<Collection> {
        self.walk(Direction::Previous, selector, limit.into())
    }

    fn walk(&self, direction: Direction, selector: Option<&str>, limit: Limit) -> QueryResult<Collection> {
        let list = selector.map(fos_css::parse_selector).transpose()?;
        let found = self.dom().with_document(|doc| {
            let matcher = SelectorMatcher::new(&doc.tree).with_focus(doc.active_element());
            let mut found = Vec::new();
            for start in self.iter() {
                found.extend(walk_from(&doc.tree, &matcher, start, direction, list.as_ref(), limit));
            }
            found
        });
        Ok(self.wrap(found))
    }

    /// Call `f` with a one-element collection and index for every node
    pub fn each(&self, mut f: impl FnMut(&Collection, usize)) -> &Self {
        for i in 0..self.len() {
            f(&self.at(i), i);
        }
        self
    }

    /// Call `f` with the raw node and index for every node
    pub fn for_each(&self, mut f: impl FnMut(NodeId, usize)) -> &Self {
        for (i, node) in self.iter().enumerate() {
            f(node, i);
        }
        self
    }

    /// Results of `f` for every node, in order
    pub fn map<T>(&self, mut f: impl FnMut(&Collection, usize) -> T) -> Vec<T> {
        (0..self.len()).map(|i| f(&self.at(i), i)).collect()
    }

    /// Nodes for which `f` returns true
    pub fn select(&self, mut f: impl FnMut(&Collection, usize) -> bool) -> Collection {
        let kept = self
            .iter()
            .enumerate()
            .filter(|&(i, _)| f(&self.at(i), i))
            .map(|(_, node)| node)
            .collect();
        self.wrap(kept)
    }

    /// Alias of [`select`](Self::select)
    pub fn filter(&self, f: impl FnMut(&Collection, usize) -> bool) -> Collection {
        self.select(f)
    }

    /// Nodes for which `f` returns false
    pub fn reject(&self, mut f: impl FnMut(&Collection, usize) -> bool) -> Collection {
        self.select(|item, i| !f(item, i))
    }
}

/// Step through the tree from `start`, skipping non-element nodes
fn walk_from(
    tree: &DomTree,
    matcher: &SelectorMatcher<'_>,
    start: NodeId,
    direction: Direction,
    list: Option<&SelectorList>,
    limit: Limit,
) -> Vec<NodeId> {
    let step = |node: NodeId| match direction {
        Direction::Up => tree.parent(node),
        Direction::Next => tree.next_sibling(node),
        Direction::Previous => tree.prev_sibling(node),
    };
    let mut found = Vec::new();
    let mut cursor = step(start);
    while let Some(node) = cursor {
        if limit.reached(found.len()) {
            break;
        }
        if tree.is_element(node) && list.is_none_or(|list| matcher.matches(node, list)) {
            found.push(node);
        }
        cursor = step(node);
    }
    found
}

#[cfg(test)]
mod tests {
    use crate::{Dom, Limit};

    fn dom() -> Dom {
        Dom::parse(
            "<div class=outer><div class=inner><ul><li class=a>a</li> <li class=b>b</li> <li class=c>c</li></ul></div></div>",
        )
        .unwrap()
    }

    #[test]
    fn test_indexing() {
        let dom = dom();
        let items = dom.query("li").unwrap();
        assert_eq!(items.at(1).get(0), items.get(1));
        assert!(items.at(9).is_empty());
        assert_eq!(items.first().get(0), items.get(0));
        assert_eq!(items.last().get(0), items.get(2));
        assert!(items.get(3).is_none());
    }

    #[test]
    fn test_parent_walks() {
        let dom = dom();
        let a = dom.query("li.a").unwrap();
        assert!(a.parent(None, 1).unwrap().is("ul").unwrap());
        assert_eq!(a.parent(Some("div"), 2).unwrap().len(), 2);
        assert_eq!(a.parent(Some("div"), Limit::Unbounded).unwrap().len(), 2);
        // ul, div.inner, div.outer, body, html
        assert_eq!(a.parent(None, Limit::Unbounded).unwrap().len(), 5);
    }

    #[test]
    fn test_sibling_walks_skip_text() {
        let dom = dom();
        let a = dom.query("li.a").unwrap();
        assert!(a.next(None, 1).unwrap().is(".b").unwrap());
        assert_eq!(a.next(None, Limit::Unbounded).unwrap().len(), 2);
        assert!(a.next(Some(".c"), 1).unwrap().is(".c").unwrap());

        let c = dom.query("li.c").unwrap();
        assert!(c.previous(None, 1).unwrap().is(".b").unwrap());
        assert!(a.previous(None, 1).unwrap().is_empty());
    }

    #[test]
    fn test_iteration_helpers() {
        let dom = dom();
        let items = dom.query("li").unwrap();
        let mut seen = Vec::new();
        items.each(|item, i| seen.push((item.len(), i)));
        assert_eq!(seen, vec![(1, 0), (1, 1), (1, 2)]);

        let mut raw = Vec::new();
        items.for_each(|node, _| raw.push(node));
        assert_eq!(raw, items.to_vec());

        assert_eq!(items.select(|_, i| i != 1).len(), 2);
        assert_eq!(items.reject(|_, i| i != 1).len(), 1);
        assert_eq!(items.filter(|item, _| item.is(".c").unwrap()).len(), 1);
    }
}
