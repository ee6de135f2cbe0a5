//! CSS Selector Model
//!
//! Parsed selector lists: complex selectors made of compound selectors
//! joined by combinators, with attribute and pseudo-class components.

/// Comma-separated selector list (`a, b > c`)
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

impl SelectorList {
    pub fn selectors(&self) -> &[ComplexSelector] {
        &self.0
    }
}

/// Compound selectors joined by combinators, stored left to right.
///
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

/// Simple selectors that must all match one element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

/// Combinator between compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// One simple selector inside a compound
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// `*`
    Universal,
    /// Tag name, lowercased
    Type(String),
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    Attribute(AttributeSelector),
    PseudoClass(PseudoClass),
    /// `::before` and friends; parsed so they are not errors, never match
    PseudoElement(String),
}

/// Supported `:pseudo` classes
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Link,
    AnyLink,
    /// Never matches: there is no history
    Visited,
    /// Never matches: there is no pointer
    Hover,
    Active,
    Focus,
    FocusWithin,

    // form controls
    Enabled,
    Disabled,
    Checked,
    Required,
    Optional,
    ReadOnly,
    ReadWrite,
    PlaceholderShown,

    // position in the tree
    Root,
    Scope,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),

    // selector arguments
    Not(SelectorList),
    Is(SelectorList),
    Where(SelectorList),
    Has(Vec<RelativeSelector>),

    Target,
    Lang(String),
    Dir(Direction),
}

/// Argument of `:has()`, e.g. `> img`
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeSelector {
    pub combinator: Combinator,
    pub selector: ComplexSelector,
}

/// `:dir()` argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

/// `An+B` argument of the `:nth-*` pseudo-classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    pub step: i32,
    pub offset: i32,
}

impl NthExpression {
    pub const ODD: Self = Self { step: 2, offset: 1 };
    pub const EVEN: Self = Self { step: 2, offset: 0 };

    pub fn new(step: i32, offset: i32) -> Self {
        Self { step, offset }
    }

    /// Parse `odd`, `even`, `B`, `An` or `An+B`. Whitespace is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let compact = text.split_whitespace().collect::<String>().to_ascii_lowercase();
        match compact.as_str() {
            "odd" => return Some(Self::ODD),
            "even" => return Some(Self::EVEN),
            _ => {}
        }

        let Some((step, offset)) = compact.split_once('n') else {
            return compact.parse().ok().map(|offset| Self::new(0, offset));
        };
        let step = match step {
            "" | "+" => 1,
            "-" => -1,
            digits => digits.parse().ok()?,
        };
        let offset = match offset.as_bytes().first() {
            None => 0,
            Some(b'+' | b'-') => offset.parse().ok()?,
            Some(_) => return None,
        };
        Some(Self::new(step, offset))
    }

    /// Whether the 1-based `position` equals `A*k + B` for some `k >= 0`
    pub fn matches(&self, position: i32) -> bool {
        let distance = position - self.offset;
        match self.step {
            0 => distance == 0,
            step => distance % step == 0 && distance / step >= 0,
        }
    }
}

/// `[name]`, or `[name op "value" i]`
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    /// `None` tests presence only
    pub matcher: Option<AttributeMatcher>,
    /// The `i` flag
    pub case_insensitive: bool,
}

/// Value test of an attribute selector, by operator
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// `=`
    Exact(String),
    /// `~=`: one of the whitespace-separated words
    Contains(String),
    /// `|=`: the value itself or the value followed by `-`
    DashMatch(String),
    /// `^=`
    Prefix(String),
    /// `$=`
    Suffix(String),
    /// `*=`
    Substring(String),
}

impl AttributeMatcher {
    fn needle(&self) -> &str {
        match self {
            Self::Exact(s)
            | Self::Contains(s)
            | Self::DashMatch(s)
            | Self::Prefix(s)
            | Self::Suffix(s)
            | Self::Substring(s) => s,
        }
    }
}

impl AttributeSelector {
    /// Test an attribute value; `None` means the attribute is absent
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        let Some(matcher) = &self.matcher else {
            return true;
        };
        let (value, needle) = if self.case_insensitive {
            (value.to_lowercase(), matcher.needle().to_lowercase())
        } else {
            (value.to_string(), matcher.needle().to_string())
        };
        let needle = needle.as_str();

        match matcher {
            AttributeMatcher::Exact(_) => value == needle,
            AttributeMatcher::DashMatch(_) => value
                .strip_prefix(needle)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('-')),
            _ if needle.is_empty() => false,
            AttributeMatcher::Contains(_) => value.split_ascii_whitespace().any(|word| word == needle),
            AttributeMatcher::Prefix(_) => value.starts_with(needle),
            AttributeMatcher::Suffix(_) => value.ends_with(needle),
            AttributeMatcher::Substring(_) => value.contains(needle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(matcher: AttributeMatcher) -> AttributeSelector {
        AttributeSelector {
            name: "data-x".to_string(),
            matcher: Some(matcher),
            case_insensitive: false,
        }
    }

    #[test]
    fn test_nth_keywords_and_forms() {
        assert_eq!(NthExpression::parse(" EVEN "), Some(NthExpression::EVEN));
        assert_eq!(NthExpression::parse("odd"), Some(NthExpression::ODD));
        assert_eq!(NthExpression::parse("4"), Some(NthExpression::new(0, 4)));
        assert_eq!(NthExpression::parse("3n"), Some(NthExpression::new(3, 0)));
        assert_eq!(NthExpression::parse("-n + 2"), Some(NthExpression::new(-1, 2)));
        assert_eq!(NthExpression::parse("+n-1"), Some(NthExpression::new(1, -1)));
        assert_eq!(NthExpression::parse("n4"), None);
        assert_eq!(NthExpression::parse("first"), None);
    }

    #[test]
    fn test_nth_positions() {
        let odd: Vec<i32> = (1..=6).filter(|&i| NthExpression::ODD.matches(i)).collect();
        assert_eq!(odd, vec![1, 3, 5]);

        let leading: Vec<i32> = (1..=6).filter(|&i| NthExpression::new(-1, 2).matches(i)).collect();
        assert_eq!(leading, vec![1, 2]);

        assert!(NthExpression::new(0, 4).matches(4));
        assert!(!NthExpression::new(0, 4).matches(8));
        assert!(!NthExpression::new(3, 5).matches(2));
    }

    #[test]
    fn test_attribute_presence_and_flag() {
        let present = AttributeSelector {
            name: "hidden".to_string(),
            matcher: None,
            case_insensitive: false,
        };
        assert!(present.matches(Some("")));
        assert!(!present.matches(None));

        let exact = attr(AttributeMatcher::Exact("Submit".to_string()));
        assert!(!exact.matches(Some("submit")));
        assert!(AttributeSelector { case_insensitive: true, ..exact }.matches(Some("SUBMIT")));
    }

    #[test]
    fn test_attribute_operators() {
        assert!(attr(AttributeMatcher::Contains("b".into())).matches(Some("a b c")));
        assert!(!attr(AttributeMatcher::Contains("b".into())).matches(Some("abc")));
        assert!(attr(AttributeMatcher::DashMatch("zh".into())).matches(Some("zh-Hant")));
        assert!(!attr(AttributeMatcher::DashMatch("zh".into())).matches(Some("zhx")));
        assert!(attr(AttributeMatcher::Suffix(".png".into())).matches(Some("a.png")));
        assert!(attr(AttributeMatcher::Substring("ell".into())).matches(Some("hello")));
        assert!(!attr(AttributeMatcher::Prefix(String::new())).matches(Some("x")));
    }
}
