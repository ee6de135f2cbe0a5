//! Selector Parser
//!
//! Hand-written recursive descent over the selector grammar used by
//! `querySelectorAll`/`matches`: selector lists, combinators, compound
//! selectors, attribute selectors and functional pseudo-classes.

use std::str::FromStr;

use crate::SelectorError;
use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Direction,
    NthExpression, PseudoClass, RelativeSelector, SelectorComponent, SelectorList,
};

/// Pseudo-elements that CSS2 allowed with a single colon
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

impl SelectorList {
    /// Parse a selector list such as `ul > li.active, a[href^="#"]`
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        if input.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut parser = SelectorParser::new(input);
        let list = parser.parse_list()?;
        parser.expect_end()?;
        Ok(list)
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct SelectorParser {
    chars: Vec<char>,
    pos: usize,
}

impl SelectorParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip whitespace, returning whether any was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                found,
                position: self.pos,
            },
            None => SelectorError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_end(&mut self) -> Result<(), SelectorError> {
        self.skip_whitespace();
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = vec![self.parse_complex()?];
        loop {
            self.skip_whitespace();
            if !self.eat(',') {
                break;
            }
            selectors.push(self.parse_complex()?);
        }
        Ok(SelectorList(selectors))
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        self.skip_whitespace();
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(',' | ')') | None => break,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            if combinator != Combinator::Descendant {
                self.bump();
                self.skip_whitespace();
            }
            compounds.push(self.parse_compound()?);
            combinators.push(combinator);
        }

        Ok(ComplexSelector { compounds, combinators })
    }

    /// Selector that may start with a combinator, as inside `:has()`
    fn parse_relative(&mut self) -> Result<RelativeSelector, SelectorError> {
        self.skip_whitespace();
        let combinator = match self.peek() {
            Some('>') => Combinator::Child,
            Some('+') => Combinator::NextSibling,
            Some('~') => Combinator::SubsequentSibling,
            _ => Combinator::Descendant,
        };
        if combinator != Combinator::Descendant {
            self.bump();
        }
        let selector = self.parse_complex()?;
        Ok(RelativeSelector { combinator, selector })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();

        match self.peek() {
            Some('*') => {
                self.bump();
                components.push(SelectorComponent::Universal);
            }
            Some(c) if is_ident_start(c) => {
                let tag = self.parse_ident()?;
                components.push(SelectorComponent::Type(tag.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    components.push(SelectorComponent::Id(self.parse_name()?));
                }
                Some('.') => {
                    self.bump();
                    components.push(SelectorComponent::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.bump();
                    components.push(SelectorComponent::Attribute(self.parse_attribute()?));
                }
                Some(':') => {
                    self.bump();
                    components.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(self.unexpected());
        }
        Ok(CompoundSelector { components })
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        if self.eat(']') {
            return Ok(AttributeSelector {
                name,
                matcher: None,
                case_insensitive: false,
            });
        }

        let operator = match self.peek() {
            Some('=') => None,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) if self.peek_at(1) == Some('=') => {
                self.bump();
                Some(c)
            }
            _ => return Err(self.unexpected()),
        };
        self.expect('=')?;
        self.skip_whitespace();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.parse_string(quote)?
            }
            _ => self.parse_name()?,
        };
        self.skip_whitespace();

        let case_insensitive = match self.peek() {
            Some('i' | 'I') => {
                self.bump();
                true
            }
            Some('s' | 'S') => {
                self.bump();
                false
            }
            _ => false,
        };
        self.skip_whitespace();
        self.expect(']')?;

        let matcher = match operator {
            None => AttributeMatcher::Exact(value),
            Some('~') => AttributeMatcher::Contains(value),
            Some('|') => AttributeMatcher::DashMatch(value),
            Some('^') => AttributeMatcher::Prefix(value),
            Some('$') => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }

    fn parse_pseudo(&mut self) -> Result<SelectorComponent, SelectorError> {
        if self.eat(':') {
            let name = self.parse_ident()?.to_ascii_lowercase();
            return Ok(SelectorComponent::PseudoElement(name));
        }

        let name = self.parse_ident()?.to_ascii_lowercase();
        if LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
            return Ok(SelectorComponent::PseudoElement(name));
        }

        if self.eat('(') {
            let argument = self.parse_argument()?;
            let pseudo = functional_pseudo(&name, &argument)?;
            return Ok(SelectorComponent::PseudoClass(pseudo));
        }

        let pseudo = match name.as_str() {
            "link" => PseudoClass::Link,
            "any-link" => PseudoClass::AnyLink,
            "visited" => PseudoClass::Visited,
            "hover" => PseudoClass::Hover,
            "active" => PseudoClass::Active,
            "focus" => PseudoClass::Focus,
            "focus-within" => PseudoClass::FocusWithin,
            "enabled" => PseudoClass::Enabled,
            "disabled" => PseudoClass::Disabled,
            "checked" => PseudoClass::Checked,
            "required" => PseudoClass::Required,
            "optional" => PseudoClass::Optional,
            "read-only" => PseudoClass::ReadOnly,
            "read-write" => PseudoClass::ReadWrite,
            "placeholder-shown" => PseudoClass::PlaceholderShown,
            "root" => PseudoClass::Root,
            "scope" => PseudoClass::Scope,
            "empty" => PseudoClass::Empty,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "only-of-type" => PseudoClass::OnlyOfType,
            "target" => PseudoClass::Target,
            _ => return Err(SelectorError::UnsupportedPseudo(name)),
        };
        Ok(SelectorComponent::PseudoClass(pseudo))
    }

    /// Raw text up to the matching `)`, which is consumed
    fn parse_argument(&mut self) -> Result<String, SelectorError> {
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut out = String::new();

        loop {
            let c = self.bump().ok_or(SelectorError::UnexpectedEnd)?;
            match (quote, c) {
                (Some(_), '\\') => {
                    out.push(c);
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                    continue;
                }
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '(') => depth += 1,
                (None, ')') if depth == 0 => return Ok(out),
                (None, ')') => depth -= 1,
                (None, _) => {}
            }
            out.push(c);
        }
    }

    fn parse_relative_list(&mut self) -> Result<Vec<RelativeSelector>, SelectorError> {
        let mut selectors = vec![self.parse_relative()?];
        loop {
            self.skip_whitespace();
            if !self.eat(',') {
                break;
            }
            selectors.push(self.parse_relative()?);
        }
        self.expect_end()?;
        Ok(selectors)
    }

    /// CSS identifier (cannot start with a digit)
    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(c) if is_ident_start(c) => self.parse_name(),
            _ => Err(self.unexpected()),
        }
    }

    /// Run of name characters, with escapes resolved
    fn parse_name(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                out.push(self.parse_escape()?);
            } else if is_name_char(c) {
                self.bump();
                out.push(c);
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(self.unexpected());
        }
        Ok(out)
    }

    /// Quoted string body after the opening quote
    fn parse_string(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(SelectorError::UnexpectedEnd),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.parse_escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    /// Escape after a backslash: up to six hex digits or one literal char
    fn parse_escape(&mut self) -> Result<char, SelectorError> {
        let mut hex = String::new();
        while hex.len() < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            hex.extend(self.bump());
        }
        if hex.is_empty() {
            return self.bump().ok_or(SelectorError::UnexpectedEnd);
        }
        // One whitespace character terminates a hex escape
        if self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        let code = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
        Ok(char::from_u32(code).filter(|&c| c != '\0').unwrap_or('\u{FFFD}'))
    }
}

fn functional_pseudo(name: &str, argument: &str) -> Result<PseudoClass, SelectorError> {
    let nth = |arg: &str| {
        NthExpression::parse(arg).ok_or_else(|| SelectorError::InvalidNth(arg.to_string()))
    };

    let pseudo = match name {
        "nth-child" => PseudoClass::NthChild(nth(argument)?),
        "nth-last-child" => PseudoClass::NthLastChild(nth(argument)?),
        "nth-of-type" => PseudoClass::NthOfType(nth(argument)?),
        "nth-last-of-type" => PseudoClass::NthLastOfType(nth(argument)?),
        "not" => PseudoClass::Not(SelectorList::parse(argument)?),
        "is" | "matches" => PseudoClass::Is(SelectorList::parse(argument)?),
        "where" => PseudoClass::Where(SelectorList::parse(argument)?),
        "has" => {
            if argument.trim().is_empty() {
                return Err(SelectorError::Empty);
            }
            PseudoClass::Has(SelectorParser::new(argument).parse_relative_list()?)
        }
        "lang" => {
            let lang = argument.trim().trim_matches(|c| c == '"' || c == '\'');
            PseudoClass::Lang(lang.to_ascii_lowercase())
        }
        "dir" => match argument.trim().to_ascii_lowercase().as_str() {
            "ltr" => PseudoClass::Dir(Direction::Ltr),
            "rtl" => PseudoClass::Dir(Direction::Rtl),
            _ => return Err(SelectorError::UnsupportedPseudo(format!("dir({argument})"))),
        },
        _ => return Err(SelectorError::UnsupportedPseudo(format!("{name}()"))),
    };
    Ok(pseudo)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
