//! Element properties (live object state, not serialized attributes)
//!
//! Some properties reflect an attribute (`id`, `className`, `disabled`),
//! some start from an attribute and then live on their own (`checked`,
//! `value`), a few are derived (`hash`, `tagName`). Unknown names are
//! expando properties stored on the element.

use crate::{DomError, DomResult, DomTree, NodeId};

/// Property value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropValue {
    /// Absent / undefined
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl PropValue {
    /// Truthiness with scripting semantics
    pub fn is_truthy(&self) -> bool {
        match self {
            PropValue::Null => false,
            PropValue::Bool(b) => *b,
            PropValue::Number(n) => *n != 0.0 && !n.is_nan(),
            PropValue::Str(s) => !s.is_empty(),
        }
    }

    /// String form used when a property writes through to an attribute
    pub fn to_attr_string(&self) -> String {
        match self {
            PropValue::Null => String::new(),
            PropValue::Bool(b) => b.to_string(),
            PropValue::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            PropValue::Number(n) => n.to_string(),
            PropValue::Str(s) => s.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(value.into())
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl std::fmt::Display for PropValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropValue::Null => f.write_str("undefined"),
            other => f.write_str(&other.to_attr_string()),
        }
    }
}

/// Boolean properties that mirror an attribute's presence
const REFLECTED_BOOLEANS: &[(&str, &str)] = &[
    ("disabled", "disabled"),
    ("hidden", "hidden"),
    ("required", "required"),
    ("readOnly", "readonly"),
    ("multiple", "multiple"),
    ("autofocus", "autofocus"),
];

/// String properties that mirror an attribute's value
const REFLECTED_STRINGS: &[(&str, &str)] = &[
    ("id", "id"),
    ("className", "class"),
    ("title", "title"),
    ("name", "name"),
    ("href", "href"),
    ("src", "src"),
    ("rel", "rel"),
    ("lang", "lang"),
    ("dir", "dir"),
    ("placeholder", "placeholder"),
    ("defaultValue", "value"),
];

impl DomTree {
    /// Read a property of an element
    pub fn property(&self, id: NodeId, name: &str) -> DomResult<PropValue> {
        let elem = self
            .node(id)?
            .as_element()
            .ok_or(DomError::InvalidNodeType("property access"))?;
        let tag = self.resolve(elem.name.local);

        if let Some((_, attr)) = REFLECTED_BOOLEANS.iter().find(|(prop, _)| *prop == name) {
            return Ok(PropValue::Bool(elem.has_attr(attr)));
        }
        if let Some((_, attr)) = REFLECTED_STRINGS.iter().find(|(prop, _)| *prop == name) {
            return Ok(PropValue::Str(elem.get_attr(attr).unwrap_or("").to_string()));
        }

        let value = match name {
            "checked" => PropValue::Bool(elem.checked.unwrap_or_else(|| elem.has_attr("checked"))),
            "selected" => {
                PropValue::Bool(elem.selected.unwrap_or_else(|| elem.has_attr("selected")))
            }
            "value" => PropValue::Str(self.control_value(id)),
            "type" => {
                let declared = elem.get_attr("type").map(str::to_ascii_lowercase);
                match (tag, declared) {
                    ("input", None) => PropValue::Str("text".to_string()),
                    ("button", None) => PropValue::Str("submit".to_string()),
                    (_, declared) => PropValue::Str(declared.unwrap_or_default()),
                }
            }
            "tagName" | "nodeName" => PropValue::Str(tag.to_ascii_uppercase()),
            "localName" => PropValue::Str(tag.to_string()),
            "textContent" => PropValue::Str(self.text_content(id)),
            "hash" => PropValue::Str(url_hash(elem.get_attr("href").unwrap_or(""))),
            "tabIndex" => {
                let parsed = elem.get_attr("tabindex").and_then(|v| v.trim().parse::<i32>().ok());
                let default = if is_focusable_tag(tag) { 0 } else { -1 };
                PropValue::Number(f64::from(parsed.unwrap_or(default)))
            }
            _ => elem.expando.get(name).cloned().unwrap_or_default(),
        };
        Ok(value)
    }

    /// Write a property of an element. Read-only properties ignore writes.
    pub fn set_property(&mut self, id: NodeId, name: &str, value: PropValue) -> DomResult<()> {
        if !self.node(id)?.is_element() {
            return Err(DomError::InvalidNodeType("property access"));
        }

        if let Some((_, attr)) = REFLECTED_BOOLEANS.iter().find(|(prop, _)| *prop == name) {
            let elem = self.element_mut(id)?;
            if value.is_truthy() {
                elem.set_attr(attr, "");
            } else {
                elem.remove_attr(attr);
            }
            return Ok(());
        }
        if let Some((_, attr)) = REFLECTED_STRINGS.iter().find(|(prop, _)| *prop == name) {
            self.element_mut(id)?.set_attr(attr, value.to_attr_string());
            return Ok(());
        }

        match name {
            "checked" => self.element_mut(id)?.checked = Some(value.is_truthy()),
            "selected" => self.element_mut(id)?.selected = Some(value.is_truthy()),
            "value" => self.set_control_value(id, &value.to_attr_string())?,
            "type" => self.element_mut(id)?.set_attr("type", value.to_attr_string()),
            "textContent" => self.set_text_content(id, &value.to_attr_string())?,
            "tabIndex" => self.element_mut(id)?.set_attr("tabindex", value.to_attr_string()),
            "hash" => {
                let elem = self.element_mut(id)?;
                let href = elem.get_attr("href").unwrap_or("").to_string();
                elem.set_attr("href", with_hash(&href, &value.to_attr_string()));
            }
            "tagName" | "nodeName" | "localName" => {
                tracing::trace!(%id, name, "ignoring write to read-only property");
            }
            _ => {
                self.element_mut(id)?.expando.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Current form-control value of an element
    pub fn control_value(&self, id: NodeId) -> String {
        let Some(elem) = self.get(id).and_then(|n| n.as_element()) else {
            return String::new();
        };
        if let Some(value) = &elem.value {
            return value.clone();
        }
        match self.resolve(elem.name.local) {
            "textarea" => self.text_content(id),
            "select" => self
                .selected_option(id)
                .map(|option| self.control_value(option))
                .unwrap_or_default(),
            "option" => elem
                .get_attr("value")
                .map(str::to_string)
                .unwrap_or_else(|| self.text_content(id).trim().to_string()),
            _ => elem.get_attr("value").unwrap_or("").to_string(),
        }
    }

    /// Assign a form-control value
    pub fn set_control_value(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        if self.tag_name(id) == Some("select") {
            let options: Vec<NodeId> = self
                .descendants(id)
                .into_iter()
                .filter(|&n| self.tag_name(n) == Some("option"))
                .collect();
            for option in options {
                let matches = self.control_value(option) == value;
                self.element_mut(option)?.selected = Some(matches);
            }
            return Ok(());
        }
        self.element_mut(id)?.value = Some(value.to_string());
        Ok(())
    }

    fn selected_option(&self, select: NodeId) -> Option<NodeId> {
        let options: Vec<NodeId> = self
            .descendants(select)
            .into_iter()
            .filter(|&n| self.tag_name(n) == Some("option"))
            .collect();
        options
            .iter()
            .copied()
            .find(|&o| matches!(self.property(o, "selected"), Ok(PropValue::Bool(true))))
            .or_else(|| options.first().copied())
    }

    /// Mutable element data or `InvalidNodeType`
    pub fn element_mut(&mut self, id: NodeId) -> DomResult<&mut crate::ElementData> {
        self.get_mut(id)
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType("element access"))
    }
}

fn is_focusable_tag(tag: &str) -> bool {
    matches!(tag, "a" | "area" | "button" | "input" | "select" | "textarea" | "iframe")
}

/// `location.hash` semantics: empty when there is no fragment or it is empty
fn url_hash(href: &str) -> String {
    match href.split_once('#') {
        Some((_, fragment)) if !fragment.is_empty() => format!("#{fragment}"),
        _ => String::new(),
    }
}

fn with_hash(href: &str, hash: &str) -> String {
    let base = href.split_once('#').map_or(href, |(base, _)| base);
    let fragment = hash.strip_prefix('#').unwrap_or(hash);
    format!("{base}#{fragment}")
}
