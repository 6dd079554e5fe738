// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declaration lists: tolerant `property: value` parsing and serialization.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// A single `property: value` pair.
///
/// Both sides are stored trimmed, with their original spelling preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// The property name (standard or custom).
    pub property: String,
    /// The value text, verbatim apart from surrounding whitespace.
    pub value: String,
}

impl Declaration {
    /// Returns `true` if this declares a custom property (`--*`).
    #[must_use]
    pub fn is_custom_property(&self) -> bool {
        self.property.starts_with("--")
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {};", self.property, self.value)
    }
}

/// An ordered list of declarations with keyed access.
///
/// Parsing is tolerant: segments that do not look like a declaration are
/// dropped rather than failing the whole text. Later duplicates overwrite
/// the value of an earlier declaration in place, so a property's position
/// reflects its first occurrence.
///
/// # Example
///
/// ```
/// use stylecast_css::DeclarationList;
///
/// let mut style = DeclarationList::parse("width: 10px; nonsense; height: 2em");
/// assert_eq!(style.get("width"), Some("10px"));
/// assert_eq!(style.len(), 2);
///
/// style.set("--angle", "45deg");
/// assert_eq!(style.to_string(), "width: 10px; height: 2em; --angle: 45deg;");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeclarationList {
    declarations: Vec<Declaration>,
}

impl DeclarationList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declarations: Vec::new(),
        }
    }

    /// Parses declaration text, dropping segments that are not declarations.
    ///
    /// Segments are split on `;`; each must contain a `:` with a plausible
    /// property name on the left and a non-empty value on the right. Values
    /// containing `;` (rare, e.g. inside `url()`) are split like everything
    /// else; the stray pieces fail the shape check and are dropped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut list = Self::new();
        for segment in text.split(';') {
            let Some((property, value)) = segment.split_once(':') else {
                continue;
            };
            let property = property.trim();
            let value = value.trim();
            if value.is_empty() || !is_valid_property_name(property) {
                continue;
            }
            list.set(property, value);
        }
        list
    }

    /// Returns the value of `property`, if declared.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }

    /// Sets `property` to `value`, returning the previous value if any.
    ///
    /// An existing declaration is updated in place and keeps its position;
    /// a new one is appended.
    pub fn set(&mut self, property: &str, value: &str) -> Option<String> {
        if let Some(existing) = self
            .declarations
            .iter_mut()
            .find(|d| d.property == property)
        {
            let mut value = value.to_string();
            core::mem::swap(&mut existing.value, &mut value);
            return Some(value);
        }
        self.declarations.push(Declaration {
            property: property.to_string(),
            value: value.to_string(),
        });
        None
    }

    /// Removes `property`, returning its value if it was declared.
    pub fn remove(&mut self, property: &str) -> Option<String> {
        let index = self
            .declarations
            .iter()
            .position(|d| d.property == property)?;
        Some(self.declarations.remove(index).value)
    }

    /// Returns an iterator over the declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Returns the number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Returns `true` if there are no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Removes all declarations.
    pub fn clear(&mut self) {
        self.declarations.clear();
    }
}

impl fmt::Display for DeclarationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, declaration) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{declaration}")?;
        }
        Ok(())
    }
}

/// Returns `true` if `name` is a plausible property name.
///
/// Accepts standard names (`width`, `margin-top`) and custom properties
/// (`--anything`): ASCII letters, digits, `-`, and `_`, not starting with
/// a digit.
fn is_valid_property_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '-' || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_order_and_drops_junk() {
        let list = DeclarationList::parse("width: 10px; ; garbage; height:2em;");
        assert_eq!(list.len(), 2);
        assert_eq!(list.get("width"), Some("10px"));
        assert_eq!(list.get("height"), Some("2em"));
        assert_eq!(list.get("garbage"), None);
    }

    #[test]
    fn parse_rejects_empty_values_and_bad_names() {
        let list = DeclarationList::parse("width: ; 9lives: 3; top left: 1px; color: red");
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("color"), Some("red"));
    }

    #[test]
    fn parse_accepts_custom_properties() {
        let list = DeclarationList::parse("--card-width: 10px");
        assert_eq!(list.get("--card-width"), Some("10px"));
        assert!(list.iter().next().is_some_and(Declaration::is_custom_property));
    }

    #[test]
    fn value_keeps_inner_colons() {
        let list = DeclarationList::parse("background: url(http://example.com/a.png)");
        assert_eq!(list.get("background"), Some("url(http://example.com/a.png)"));
    }

    #[test]
    fn duplicate_property_updates_in_place() {
        let list = DeclarationList::parse("width: 1px; height: 2px; width: 3px");
        assert_eq!(list.len(), 2);
        assert_eq!(list.get("width"), Some("3px"));
        assert_eq!(list.to_string(), "width: 3px; height: 2px;");
    }

    #[test]
    fn set_returns_previous_value() {
        let mut list = DeclarationList::new();
        assert_eq!(list.set("width", "1px"), None);
        assert_eq!(list.set("width", "2px"), Some("1px".to_string()));
        assert_eq!(list.get("width"), Some("2px"));
    }

    #[test]
    fn remove_returns_value() {
        let mut list = DeclarationList::parse("width: 1px; height: 2px");
        assert_eq!(list.remove("width"), Some("1px".to_string()));
        assert_eq!(list.remove("width"), None);
        assert_eq!(list.to_string(), "height: 2px;");
    }

    #[test]
    fn display_round_trips_through_parse() {
        let list = DeclarationList::parse("width: 10px; --x: 1");
        let reparsed = DeclarationList::parse(&list.to_string());
        assert_eq!(list, reparsed);
    }

    #[test]
    fn empty_list_displays_empty() {
        assert_eq!(DeclarationList::new().to_string(), "");
    }
}
