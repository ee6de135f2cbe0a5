//! Inline style declarations (`element.style`)
//!
//! The `style` attribute is the single source of truth; this type parses it,
//! edits it and serializes it back.

/// Ordered `property: value` pairs of an inline style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclarations {
    decls: Vec<(String, String)>,
}

impl StyleDeclarations {
    /// Parse a `style` attribute value. Malformed entries are skipped.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::default();
        for entry in text.split(';') {
            let Some((name, value)) = entry.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }
            style.set(name, value);
        }
        style
    }

    /// Value of a property, accepting camelCase or hyphenated names
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = css_property_name(name);
        self.decls
            .iter()
            .find(|(prop, _)| *prop == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set a property. An empty value removes it, as with `style.x = ''`.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = css_property_name(name);
        let value = value.trim();
        if value.is_empty() {
            self.decls.retain(|(prop, _)| *prop != name);
            return;
        }
        match self.decls.iter_mut().find(|(prop, _)| *prop == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.decls.push((name, value.to_string())),
        }
    }

    /// Remove a property, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = css_property_name(name);
        let index = self.decls.iter().position(|(prop, _)| *prop == name)?;
        Some(self.decls.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Serialize as `a: b; c: d;`
    pub fn to_css_text(&self) -> String {
        self.decls
            .iter()
            .map(|(prop, value)| format!("{prop}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }
}

/// Convert a scripting-style property name (`fontWeight`) to its CSS form
/// (`font-weight`). Hyphenated names are lowercased; custom properties
/// (`--x`) pass through untouched.
pub fn css_property_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        return name.to_string();
    }
    if name.contains('-') {
        return name.to_ascii_lowercase();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    // cssFloat is the scripting name of `float`
    if out == "css-float" {
        return "float".to_string();
    }
    if ["webkit-", "moz-", "ms-"].iter().any(|p| out.starts_with(p)) {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let style = StyleDeclarations::parse("display: none; ; color:red;bogus");
        assert_eq!(style.len(), 2);
        assert_eq!(style.get("display"), Some("none"));
        assert_eq!(style.to_css_text(), "display: none; color: red;");
    }

    #[test]
    fn test_set_replaces_and_empty_removes() {
        let mut style = StyleDeclarations::default();
        style.set("top", "5px");
        style.set("top", "6px");
        assert_eq!(style.get("top"), Some("6px"));
        style.set("top", "");
        assert!(style.is_empty());
    }

    #[test]
    fn test_property_names() {
        assert_eq!(css_property_name("fontWeight"), "font-weight");
        assert_eq!(css_property_name("font-weight"), "font-weight");
        assert_eq!(css_property_name("cssFloat"), "float");
        assert_eq!(css_property_name("WebkitTransform"), "-webkit-transform");
        assert_eq!(css_property_name("msTransform"), "-ms-transform");
        assert_eq!(css_property_name("--Accent"), "--Accent");
    }

    #[test]
    fn test_camel_case_lookup() {
        let style = StyleDeclarations::parse("font-weight: bold");
        assert_eq!(style.get("fontWeight"), Some("bold"));
    }
}
