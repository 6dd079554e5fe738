// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selector model and parser for a deliberately small CSS subset.
//!
//! Supported: type selectors, `*`, `#id`, `.class`, attribute selectors
//! with the full operator set, the four combinators, and comma-separated
//! lists. Pseudo-classes, pseudo-elements, and namespaces are outside the
//! subset and produce a [`SelectorParseError`]; callers that need the
//! browser behavior of "an invalid selector matches nothing" map the error
//! to an always-false match.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;

/// Combinator between compound selectors in a complex selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: ancestor descendant.
    Descendant,
    /// `>`: parent > child.
    Child,
    /// `+`: prev + next.
    NextSibling,
    /// `~`: prev ~ subsequent.
    SubsequentSibling,
}

/// Attribute selector operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=val]`
    Eq,
    /// `[attr~=val]`
    Includes,
    /// `[attr|=val]`
    DashMatch,
    /// `[attr^=val]`
    Prefix,
    /// `[attr$=val]`
    Suffix,
    /// `[attr*=val]`
    Substring,
}

impl AttrOp {
    /// Applies this operator to an element's attribute value and the
    /// selector's needle. [`AttrOp::Exists`] ignores the needle.
    ///
    /// The prefix, suffix, and substring operators never match an empty
    /// needle, per the CSS matching rules.
    #[must_use]
    pub fn evaluate(self, actual: &str, needle: &str) -> bool {
        match self {
            Self::Exists => true,
            Self::Eq => actual == needle,
            Self::Includes => actual.split_ascii_whitespace().any(|word| word == needle),
            Self::DashMatch => {
                actual == needle
                    || (actual.len() > needle.len()
                        && actual.starts_with(needle)
                        && actual.as_bytes()[needle.len()] == b'-')
            }
            Self::Prefix => !needle.is_empty() && actual.starts_with(needle),
            Self::Suffix => !needle.is_empty() && actual.ends_with(needle),
            Self::Substring => !needle.is_empty() && actual.contains(needle),
        }
    }
}

/// A single simple selector component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    /// Universal selector `*`.
    Universal,
    /// Type selector, e.g. `div`. Stored lowercased; matching is
    /// ASCII-case-insensitive against the element's tag.
    Type(String),
    /// ID selector `#foo`.
    Id(String),
    /// Class selector `.bar`.
    Class(String),
    /// Attribute selector `[name op value]`.
    Attribute {
        /// The attribute name.
        name: String,
        /// The operator; [`AttrOp::Exists`] when no value was written.
        op: AttrOp,
        /// The needle value; `None` only for [`AttrOp::Exists`].
        value: Option<String>,
    },
}

/// A sequence of simple selectors with no combinators between them,
/// e.g. `div.foo#bar`. All simples must match the same element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The simple selectors, in source order.
    pub simples: SmallVec<[SimpleSelector; 2]>,
}

/// A chain of compound selectors joined by combinators.
///
/// Stored right-to-left for matching: `parts[0]` is the rightmost
/// (subject) compound. Each part carries the combinator connecting it to
/// the part on its left in source order; the leftmost part carries `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    /// Compounds in right-to-left order with their leftward combinator.
    pub parts: Vec<(CompoundSelector, Option<Combinator>)>,
}

/// A comma-separated selector list.
///
/// An element matches the list if it matches any member.
///
/// # Example
///
/// ```
/// use stylecast_css::SelectorList;
///
/// let list = SelectorList::parse("div.note, [data-role=\"card\"]").unwrap();
/// assert_eq!(list.selectors.len(), 2);
///
/// // Pseudo-classes are outside the supported subset.
/// assert!(SelectorList::parse("a:hover").is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorList {
    /// The alternatives, in source order.
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parses a selector list.
    ///
    /// Fails on empty input, dangling combinators or commas, and any
    /// construct outside the supported subset.
    pub fn parse(input: &str) -> Result<Self, SelectorParseError> {
        let mut parser = Parser::new(input);
        let mut selectors = Vec::new();
        loop {
            parser.skip_whitespace();
            selectors.push(parse_complex(&mut parser)?);
            parser.skip_whitespace();
            if parser.at_end() {
                break;
            }
            if !parser.eat(b',') {
                return Err(parser.error("unexpected character in selector list"));
            }
        }
        Ok(Self { selectors })
    }
}

/// Error produced when selector text falls outside the supported subset
/// or is malformed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorParseError {
    /// Byte offset into the source where parsing stopped.
    pub offset: usize,
    /// What was rejected or expected.
    pub message: &'static str,
}

impl fmt::Display for SelectorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "selector parse error at byte {}: {}", self.offset, self.message)
    }
}

impl core::error::Error for SelectorParseError {}

// ----- parser -----

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Skips CSS whitespace, returning `true` if any was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')) {
            self.pos += 1;
        }
        self.pos != start
    }

    /// Consumes an identifier (ASCII letters, digits, `-`, `_`), returning
    /// `None` when the cursor is not at one.
    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        (self.pos != start).then(|| &self.src[start..self.pos])
    }

    /// Consumes a quoted string after the cursor passed its opening quote.
    fn quoted(&mut self, quote: u8) -> Result<&'a str, SelectorParseError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == quote {
                let value = &self.src[start..self.pos];
                self.pos += 1;
                return Ok(value);
            }
            self.pos += 1;
        }
        Err(self.error("unterminated string"))
    }

    fn error(&self, message: &'static str) -> SelectorParseError {
        SelectorParseError {
            offset: self.pos,
            message,
        }
    }
}

fn parse_complex(parser: &mut Parser<'_>) -> Result<ComplexSelector, SelectorParseError> {
    let mut parts: Vec<(CompoundSelector, Option<Combinator>)> = Vec::new();

    let first = parse_compound(parser)?;
    if first.simples.is_empty() {
        return Err(parser.error("expected selector"));
    }
    parts.push((first, None));

    loop {
        let had_whitespace = parser.skip_whitespace();
        let combinator = match parser.peek() {
            None | Some(b',') => break,
            Some(b'>') => {
                parser.bump();
                parser.skip_whitespace();
                Combinator::Child
            }
            Some(b'+') => {
                parser.bump();
                parser.skip_whitespace();
                Combinator::NextSibling
            }
            Some(b'~') => {
                parser.bump();
                parser.skip_whitespace();
                Combinator::SubsequentSibling
            }
            Some(_) if had_whitespace => Combinator::Descendant,
            Some(_) => return Err(parser.error("unexpected character in selector")),
        };
        let compound = parse_compound(parser)?;
        if compound.simples.is_empty() {
            return Err(parser.error("expected selector after combinator"));
        }
        parts.push((compound, Some(combinator)));
    }

    // Reverse source order so parts[0] is the subject compound. After the
    // reversal each part's combinator links it to the next part to walk.
    parts.reverse();
    Ok(ComplexSelector { parts })
}

fn parse_compound(parser: &mut Parser<'_>) -> Result<CompoundSelector, SelectorParseError> {
    let mut simples = SmallVec::new();
    loop {
        match parser.peek() {
            Some(b'*') => {
                parser.bump();
                simples.push(SimpleSelector::Universal);
            }
            Some(b'#') => {
                parser.bump();
                let Some(name) = parser.ident() else {
                    return Err(parser.error("expected identifier after '#'"));
                };
                simples.push(SimpleSelector::Id(name.into()));
            }
            Some(b'.') => {
                parser.bump();
                let Some(name) = parser.ident() else {
                    return Err(parser.error("expected identifier after '.'"));
                };
                simples.push(SimpleSelector::Class(name.into()));
            }
            Some(b'[') => {
                parser.bump();
                simples.push(parse_attribute(parser)?);
            }
            Some(b) if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' => {
                let Some(name) = parser.ident() else {
                    return Err(parser.error("expected type selector"));
                };
                simples.push(SimpleSelector::Type(name.to_ascii_lowercase()));
            }
            _ => break,
        }
    }
    Ok(CompoundSelector { simples })
}

fn parse_attribute(parser: &mut Parser<'_>) -> Result<SimpleSelector, SelectorParseError> {
    parser.skip_whitespace();
    let Some(name) = parser.ident() else {
        return Err(parser.error("expected attribute name"));
    };
    let name = String::from(name);
    parser.skip_whitespace();

    if parser.eat(b']') {
        return Ok(SimpleSelector::Attribute {
            name,
            op: AttrOp::Exists,
            value: None,
        });
    }

    let op = match parser.peek() {
        Some(b'=') => {
            parser.bump();
            AttrOp::Eq
        }
        Some(prefix @ (b'~' | b'|' | b'^' | b'$' | b'*')) => {
            parser.bump();
            if !parser.eat(b'=') {
                return Err(parser.error("expected '=' in attribute operator"));
            }
            match prefix {
                b'~' => AttrOp::Includes,
                b'|' => AttrOp::DashMatch,
                b'^' => AttrOp::Prefix,
                b'$' => AttrOp::Suffix,
                _ => AttrOp::Substring,
            }
        }
        _ => return Err(parser.error("expected attribute operator or ']'")),
    };

    parser.skip_whitespace();
    let value = match parser.peek() {
        Some(quote @ (b'"' | b'\'')) => {
            parser.bump();
            String::from(parser.quoted(quote)?)
        }
        _ => {
            let Some(value) = parser.ident() else {
                return Err(parser.error("expected attribute value"));
            };
            String::from(value)
        }
    };
    parser.skip_whitespace();
    if !parser.eat(b']') {
        return Err(parser.error("expected ']'"));
    }

    Ok(SimpleSelector::Attribute {
        name,
        op,
        value: Some(value),
    })
}
