//! Name table for element names and namespaces
//!
//! Every element stores its namespace and local name as small ids into the
//! tree's table instead of owned strings.

use std::collections::HashMap;
use std::rc::Rc;

/// Id of a name in a [`StringInterner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct InternedString(pub u32);

impl InternedString {
    /// Always the empty string
    pub const EMPTY: InternedString = InternedString(0);
}

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Names seeded into every table: the namespaces the parser produces,
/// then tags the query layer creates or tests for most often
const SEEDED: &[&str] = &[
    "",
    HTML_NAMESPACE,
    "http://www.w3.org/2000/svg",
    "http://www.w3.org/1998/Math/MathML",
    "html", "head", "body", "title", "div", "span", "p", "a", "b", "i", "em",
    "ul", "ol", "li", "table", "tbody", "tr", "td", "form", "input", "select",
    "option", "textarea", "button", "label",
];

/// Append-only table of names
#[derive(Debug, Clone)]
pub struct StringInterner {
    names: Vec<Rc<str>>,
    ids: HashMap<Rc<str>, InternedString>,
}

impl StringInterner {
    pub fn new() -> Self {
        let mut table = Self {
            names: Vec::with_capacity(SEEDED.len() * 2),
            ids: HashMap::with_capacity(SEEDED.len() * 2),
        };
        for name in SEEDED {
            table.intern(name);
        }
        table
    }

    /// Id for `name`, adding it on first use
    pub fn intern(&mut self, name: &str) -> InternedString {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = InternedString(self.names.len() as u32);
        let shared: Rc<str> = Rc::from(name);
        self.names.push(Rc::clone(&shared));
        self.ids.insert(shared, id);
        id
    }

    /// Id for `name` if it was interned before
    pub fn lookup(&self, name: &str) -> Option<InternedString> {
        self.ids.get(name).copied()
    }

    /// Name behind `id`; unknown ids read as the empty string
    #[inline]
    pub fn get(&self, id: InternedString) -> &str {
        self.names.get(id.0 as usize).map_or("", |name| name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_names() {
        let table = StringInterner::new();
        assert_eq!(table.get(InternedString::EMPTY), "");
        assert_eq!(table.lookup(HTML_NAMESPACE), Some(InternedString(1)));
        assert!(table.lookup("tbody").is_some());
        assert_eq!(table.len(), SEEDED.len());
    }

    #[test]
    fn test_new_names_append() {
        let mut table = StringInterner::new();
        let before = table.len();
        assert!(table.lookup("x-widget").is_none());
        let id = table.intern("x-widget");
        assert_eq!(table.intern("x-widget"), id);
        assert_eq!(table.get(id), "x-widget");
        assert_eq!(table.len(), before + 1);
    }

    #[test]
    fn test_unknown_id_reads_empty() {
        let table = StringInterner::new();
        assert_eq!(table.get(InternedString(9_999)), "");
    }
}
