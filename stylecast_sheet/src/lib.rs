// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stylecast Sheet: the shared stylesheet as a keyed rule table.
//!
//! One [`StyleSheet`] holds at most one rule per element id (when driven
//! through [`StyleSheet::update`] / [`StyleSheet::set_from_attribute`]),
//! with selectors that are exactly `#<id>`. Declarations are stored as
//! pre-rendered segments: every segment is forced to carry `!important`
//! exactly once, and declaration text that positions without transforming
//! gets a `transform: none` segment prepended so offset properties win
//! over a pre-existing transform.
//!
//! The table renders to CSS text only at the boundary
//! ([`StyleSheet::css_text`]); rules are never edited by find/replace on
//! the rendered text, so ids and declaration bodies need no escaping.
//!
//! A generation counter increments on every effective mutation, letting
//! embedders cheaply detect that re-rendering is needed.
//!
//! # Example
//!
//! ```
//! use stylecast_sheet::StyleSheet;
//!
//! let mut sheet = StyleSheet::new();
//! sheet.update("box", "top: 10px; width: 50%");
//! assert_eq!(
//!     sheet.css_text(),
//!     "#box{transform: none !important; top: 10px !important; width: 50% !important;}"
//! );
//!
//! // Attribute-driven writes validate first; garbage clears the rule.
//! sheet.set_from_attribute("box", Some("*#!garbage"));
//! assert_eq!(sheet.css_text(), "");
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use stylecast_css::DeclarationList;

/// One rendered rule: an element id and its important-ized segments.
#[derive(Clone, Debug)]
struct Rule {
    id: String,
    segments: Vec<String>,
}

/// The shared stylesheet.
///
/// Rules render in table order; [`StyleSheet::update`] moves a rule to
/// the end, so the most recently updated rule always renders last.
#[derive(Clone, Debug, Default)]
pub struct StyleSheet {
    rules: Vec<Rule>,
    generation: u64,
}

impl StyleSheet {
    /// Creates an empty stylesheet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            generation: 0,
        }
    }

    /// Returns the current generation.
    ///
    /// The generation increments on every call that changes the table, so
    /// an unchanged generation means [`StyleSheet::css_text`] would render
    /// the same text as before.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if a rule exists for `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.rules.iter().any(|rule| rule.id == id)
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the sheet has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Appends a rule for `id` built from raw declaration text.
    ///
    /// Splits on `;`, drops blank segments, appends ` !important` to each
    /// segment not already containing it, and applies the positional
    /// transform-neutralization rule: when the text mentions any of
    /// `top`/`left`/`right`/`bottom` (substring test) and never mentions
    /// `transform`, a `transform: none` segment is prepended.
    ///
    /// This appends unconditionally; use [`StyleSheet::update`] to keep
    /// at most one rule per id.
    pub fn insert(&mut self, id: &str, declarations: &str) {
        let raw: Cow<'_, str> = if needs_transform_neutralization(declarations) {
            Cow::Owned(format!("transform: none; {declarations}"))
        } else {
            Cow::Borrowed(declarations)
        };
        let segments = raw
            .split(';')
            .filter(|segment| !segment.trim().is_empty())
            .map(importantize)
            .collect();
        self.generation = self.generation.wrapping_add(1);
        self.rules.push(Rule {
            id: String::from(id),
            segments,
        });
    }

    /// Removes the rule for `id`, returning `true` if one existed.
    /// Removing an absent id is a no-op, not an error.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|rule| rule.id != id);
        let removed = self.rules.len() != before;
        if removed {
            self.generation = self.generation.wrapping_add(1);
        }
        removed
    }

    /// Replaces the rule for `id`: [`StyleSheet::remove`] followed by
    /// [`StyleSheet::insert`]. A later update for the same id fully
    /// supersedes an earlier one.
    pub fn update(&mut self, id: &str, declarations: &str) {
        self.remove(id);
        self.insert(id, declarations);
    }

    /// The attribute-driven entry point. `None` removes the rule; `Some`
    /// text is validated first (at least one parseable declaration) and
    /// either updates the rule or, on rejection, removes it. Never fails.
    pub fn set_from_attribute(&mut self, id: &str, declarations: Option<&str>) {
        match declarations {
            Some(text) if !DeclarationList::parse(text).is_empty() => self.update(id, text),
            _ => {
                self.remove(id);
            }
        }
    }

    /// Renders the whole table as CSS text, one `#id{...}` block per rule
    /// in table order.
    #[must_use]
    pub fn css_text(&self) -> String {
        let mut text = String::new();
        for rule in &self.rules {
            text.push('#');
            text.push_str(&rule.id);
            text.push('{');
            for segment in &rule.segments {
                text.push_str(segment);
                text.push(';');
            }
            text.push('}');
        }
        text
    }
}

/// Substring test on the raw text: positions without transforming.
fn needs_transform_neutralization(declarations: &str) -> bool {
    !declarations.contains("transform")
        && ["top", "left", "right", "bottom"]
            .iter()
            .any(|needle| declarations.contains(needle))
}

/// Appends ` !important` unless the segment already contains it. The
/// segment's own spelling, surrounding whitespace included, is preserved.
fn importantize(segment: &str) -> String {
    if segment.contains("!important") {
        String::from(segment)
    } else {
        format!("{segment} !important")
    }
}
