//! Class manipulation

use regex::Regex;

use crate::Collection;

/// Which classes `remove_class` drops
#[derive(Debug, Clone)]
pub enum ClassPattern {
    /// Whitespace-separated class names
    Exact(String),
    /// Every class token the pattern matches
    Regex(Regex),
}

impl From<&str> for ClassPattern {
    fn from(name: &str) -> Self {
        ClassPattern::Exact(name.to_string())
    }
}

impl From<String> for ClassPattern {
    fn from(name: String) -> Self {
        ClassPattern::Exact(name)
    }
}

impl From<Regex> for ClassPattern {
    fn from(pattern: Regex) -> Self {
        ClassPattern::Regex(pattern)
    }
}

impl From<&Regex> for ClassPattern {
    fn from(pattern: &Regex) -> Self {
        ClassPattern::Regex(pattern.clone())
    }
}

impl Collection {
    /// Add whitespace-separated class names to every element
    pub fn add_class(&self, names: &str) -> &Self {
        self.update_elements(|elem| {
            let mut classes = elem.class_list();
            for name in names.split_ascii_whitespace() {
                classes.add(name);
            }
            elem.set_class_list(&classes);
        });
        self
    }

    /// Remove class names, or every class matching a regex, from every element
    pub fn remove_class(&self, pattern: impl Into<ClassPattern>) -> &Self {
        let pattern = pattern.into();
        self.update_elements(|elem| {
            let mut classes = elem.class_list();
            match &pattern {
                ClassPattern::Exact(names) => {
                    for name in names.split_ascii_whitespace() {
                        classes.remove(name);
                    }
                }
                ClassPattern::Regex(regex) => classes.retain(|token| !regex.is_match(token)),
            }
            elem.set_class_list(&classes);
        });
        self
    }

    /// Flip a class on every element. With `force`, add on `Some(true)`
    /// and remove on `Some(false)` instead.
    pub fn toggle_class(&self, name: &str, force: impl Into<Option<bool>>) -> &Self {
        let force = force.into();
        self.update_elements(|elem| {
            let mut classes = elem.class_list();
            classes.toggle(name, force);
            elem.set_class_list(&classes);
        });
        self
    }

    /// Whether the first node has the class
    pub fn has_class(&self, name: &str) -> bool {
        let Some(node) = self.get(0) else {
            return false;
        };
        self.dom().with_tree(|tree| {
            tree.get(node)
                .and_then(|n| n.as_element())
                .is_some_and(|elem| elem.class_list().contains(name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dom;

    #[test]
    fn test_add_and_remove() {
        let dom = Dom::parse("<div></div>").unwrap();
        let div = dom.query("div").unwrap();
        div.add_class("foo bar").add_class("foo");
        assert_eq!(div.attr("class").as_deref(), Some("foo bar"));

        div.remove_class(Regex::new("^b").unwrap());
        assert_eq!(div.attr("class").as_deref(), Some("foo"));
        div.remove_class("foo");
        assert_eq!(div.attr("class").as_deref(), Some(""));
    }

    #[test]
    fn test_toggle() {
        let dom = Dom::parse("<p></p>").unwrap();
        let p = dom.query("p").unwrap();
        p.toggle_class("show", None);
        assert!(p.has_class("show"));
        p.toggle_class("show", None);
        assert!(!p.has_class("show"));
        p.toggle_class("show", false);
        assert!(!p.has_class("show"));
        p.toggle_class("show", true).toggle_class("show", true);
        assert_eq!(p.attr("class").as_deref(), Some("show"));
    }

    #[test]
    fn test_text_nodes_are_skipped() {
        let dom = Dom::new().unwrap();
        let text = dom.create_text("x");
        let list = dom.query(text).unwrap();
        list.add_class("a");
        assert!(!list.has_class("a"));
    }
}
