//! Attributes, properties and inline style
//!
//! Getters read the first node; setters write every element node and skip
//! anything else (text, comments, fragments).

use fos_dom::{ElementData, PropValue, StyleDeclarations, css_property_name};

use crate::{Collection, QueryResult};

/// Properties whose numeric values are written without a unit
const UNITLESS: &[&str] = &[
    "animation-iteration-count",
    "column-count",
    "fill-opacity",
    "flex",
    "flex-grow",
    "flex-shrink",
    "font-weight",
    "grid-column",
    "grid-row",
    "line-height",
    "opacity",
    "order",
    "orphans",
    "stroke-opacity",
    "tab-size",
    "widows",
    "z-index",
    "zoom",
];

/// Attribute value to write; `Null` removes the attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Text(String),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Text(PropValue::Number(value).to_attr_string())
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Null, Into::into)
    }
}

/// Inline style value; bare numbers get `px` unless the property is unitless
#[derive(Debug, Clone, PartialEq)]
pub enum CssValue {
    Text(String),
    Number(f64),
}

impl CssValue {
    /// Serialized value for `property` (already kebab-case)
    fn to_css(&self, property: &str) -> String {
        match self {
            CssValue::Text(text) => text.clone(),
            CssValue::Number(n) => {
                let number = PropValue::Number(*n).to_attr_string();
                if UNITLESS.contains(&property) {
                    number
                } else {
                    format!("{number}px")
                }
            }
        }
    }
}

impl From<&str> for CssValue {
    fn from(value: &str) -> Self {
        CssValue::Text(value.to_string())
    }
}

impl From<String> for CssValue {
    fn from(value: String) -> Self {
        CssValue::Text(value)
    }
}

impl From<i32> for CssValue {
    fn from(value: i32) -> Self {
        CssValue::Number(f64::from(value))
    }
}

impl From<f64> for CssValue {
    fn from(value: f64) -> Self {
        CssValue::Number(value)
    }
}

impl Collection {
    /// Attribute of the first node
    pub fn attr(&self, name: &str) -> Option<String> {
        let node = self.get(0)?;
        self.dom().with_tree(|tree| {
            tree.get(node)?.as_element()?.get_attr(name).map(str::to_string)
        })
    }

    /// Set (or with `AttrValue::Null`, remove) an attribute on every element
    pub fn set_attr(&self, name: &str, value: impl Into<AttrValue>) -> &Self {
        let value = value.into();
        self.update_elements(|elem| match &value {
            AttrValue::Null => {
                elem.remove_attr(name);
            }
            AttrValue::Text(text) => elem.set_attr(name, text.as_str()),
        });
        self
    }

    pub fn remove_attr(&self, name: &str) -> &Self {
        self.set_attr(name, AttrValue::Null)
    }

    /// Property of the first element (`Null` when there is none)
    pub fn prop(&self, name: &str) -> PropValue {
        let Some(node) = self.get(0) else {
            return PropValue::Null;
        };
        self.dom()
            .with_tree(|tree| tree.property(node, name))
            .unwrap_or_default()
    }

    /// Set a property on every element
    pub fn set_prop(&self, name: &str, value: impl Into<PropValue>) -> QueryResult<&Self> {
        let value = value.into();
        self.dom().with_tree_mut(|tree| {
            let elements: Vec<_> = self.iter().filter(|&node| tree.is_element(node)).collect();
            elements
                .into_iter()
                .try_for_each(|node| tree.set_property(node, name, value.clone()))
        })?;
        Ok(self)
    }

    /// Inline style declaration of the first element
    pub fn css(&self, property: &str) -> Option<String> {
        let node = self.get(0)?;
        let property = css_property_name(property);
        self.dom().with_tree(|tree| {
            tree.get(node)?.as_element()?.style().get(&property).map(str::to_string)
        })
    }

    /// Set one inline style declaration on every element
    pub fn set_css(&self, property: &str, value: impl Into<CssValue>) -> &Self {
        let property = css_property_name(property);
        let value = value.into().to_css(&property);
        self.update_styles(|style| style.set(&property, &value));
        self
    }

    /// Set several inline style declarations on every element, in order
    pub fn set_css_map<K, V>(&self, declarations: impl IntoIterator<Item = (K, V)>) -> &Self
    where
        K: AsRef<str>,
        V: Into<CssValue>,
    {
        let declarations: Vec<(String, String)> = declarations
            .into_iter()
            .map(|(name, value)| {
                let property = css_property_name(name.as_ref());
                let value = value.into().to_css(&property);
                (property, value)
            })
            .collect();
        self.update_styles(|style| {
            for (property, value) in &declarations {
                style.set(property, value);
            }
        });
        self
    }

    fn update_styles(&self, mut f: impl FnMut(&mut StyleDeclarations)) {
        self.update_elements(|elem| {
            let mut style = elem.style();
            f(&mut style);
            elem.set_style(&style);
        });
    }

    /// Run `f` on the data of every element node
    pub(crate) fn update_elements(&self, mut f: impl FnMut(&mut ElementData)) {
        self.dom().with_tree_mut(|tree| {
            for node in self.iter() {
                match tree.get_mut(node).and_then(|n| n.as_element_mut()) {
                    Some(elem) => f(elem),
                    None => tracing::trace!(%node, "skipping non-element"),
                }
            }
        });
    }
}

/// Attribute names with shorthand accessors
macro_rules! shorthand_attrs {
    ($(($getter:ident, $setter:ident, $name:literal)),* $(,)?) => {
        /// Attributes with shorthand getter/setter pairs on [`Collection`]
        pub const ATTRS: &[&str] = &[$($name),*];

        impl Collection {
            $(
                #[doc = concat!("`", $name, "` attribute of the first node")]
                pub fn $getter(&self) -> Option<String> {
                    self.attr($name)
                }

                #[doc = concat!("Set the `", $name, "` attribute on every element")]
                pub fn $setter(&self, value: impl Into<AttrValue>) -> &Self {
                    self.set_attr($name, value)
                }
            )*
        }
    };
}

shorthand_attrs! {
    (id, set_id, "id"),
    (src, set_src, "src"),
    (rel, set_rel, "rel"),
    (cols, set_cols, "cols"),
    (rows, set_rows, "rows"),
    (name, set_name, "name"),
    (href, set_href, "href"),
    (title, set_title, "title"),
    (style, set_style, "style"),
    (width, set_width, "width"),
    (height, set_height, "height"),
    (tabindex, set_tabindex, "tabindex"),
    (placeholder, set_placeholder, "placeholder"),
    (r#type, set_type, "type"),
    (action, set_action, "action"),
    (method, set_method, "method"),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dom;

    #[test]
    fn test_attr_roundtrip_and_removal() {
        let dom = Dom::parse("<a></a><a></a>").unwrap();
        let links = dom.query("a").unwrap();
        links.set_attr("href", "/x");
        assert_eq!(links.at(1).attr("href").as_deref(), Some("/x"));
        links.set_attr("href", None::<&str>);
        assert_eq!(links.attr("href"), None);
        links.set_attr("data-n", 3).remove_attr("data-n");
        assert!(links.attr("data-n").is_none());
    }

    #[test]
    fn test_css_units() {
        let dom = Dom::parse("<div></div>").unwrap();
        let div = dom.query("div").unwrap();
        div.set_css_map([("top", 5), ("left", 10), ("zIndex", 3)]);
        assert_eq!(div.css("top").as_deref(), Some("5px"));
        assert_eq!(div.css("left").as_deref(), Some("10px"));
        assert_eq!(div.css("z-index").as_deref(), Some("3"));

        div.set_css("fontWeight", 700).set_css("opacity", 0.5);
        assert_eq!(div.css("font-weight").as_deref(), Some("700"));
        assert_eq!(div.css("opacity").as_deref(), Some("0.5"));
        assert!(div.attr("style").unwrap().starts_with("top: 5px;"));
    }

    #[test]
    fn test_prop_get_set() {
        let dom = Dom::parse("<input type=checkbox><p></p>").unwrap();
        let input = dom.query("input").unwrap();
        assert_eq!(input.prop("checked"), PropValue::Bool(false));
        input.set_prop("checked", true).unwrap();
        assert_eq!(input.prop("checked"), PropValue::Bool(true));
        assert_eq!(input.attr("checked"), None);

        let none = dom.query("video").unwrap();
        assert_eq!(none.prop("checked"), PropValue::Null);
    }

    #[test]
    fn test_shorthands() {
        let dom = Dom::parse("<div></div>").unwrap();
        let div = dom.query("div").unwrap();
        div.set_type("tobi").set_tabindex(2);
        assert_eq!(div.r#type().as_deref(), Some("tobi"));
        assert_eq!(div.tabindex().as_deref(), Some("2"));
        assert_eq!(ATTRS.len(), 16);
    }
}
