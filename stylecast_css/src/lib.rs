// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stylecast CSS: tolerant declaration lists and a small selector model.
//!
//! This crate provides the two pieces of CSS machinery the rest of the
//! workspace is built on:
//!
//! - **Declarations** ([`Declaration`], [`DeclarationList`]): `property:
//!   value` text parsed tolerantly (malformed segments are dropped, never
//!   errors), with keyed access and stable serialization. Custom
//!   properties (`--*`) are first-class.
//! - **Selectors** ([`SelectorList`], [`ComplexSelector`],
//!   [`CompoundSelector`], [`SimpleSelector`]): a deliberately small
//!   subset of CSS selectors — type, `*`, `#id`, `.class`, attribute
//!   selectors with all operators ([`AttrOp`]), and the four combinators
//!   ([`Combinator`]). Complex selectors are stored right-to-left, ready
//!   for subject-first matching. Anything outside the subset is a
//!   [`SelectorParseError`] rather than a silent partial parse.
//!
//! It is not a general CSS parser: there is no tokenizer, no at-rules, no
//! value grammar. Declaration values are opaque trimmed text.
//!
//! ## Quick Start
//!
//! ```
//! use stylecast_css::{DeclarationList, SelectorList};
//!
//! let style = DeclarationList::parse("width: 42px; bogus;; color: red");
//! assert_eq!(style.get("width"), Some("42px"));
//! assert_eq!(style.to_string(), "width: 42px; color: red;");
//!
//! let list = SelectorList::parse("div[data-role] > .card").unwrap();
//! assert_eq!(list.selectors.len(), 1);
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod declaration;
mod selector;

pub use declaration::{Declaration, DeclarationList};
pub use selector::{
    AttrOp, Combinator, ComplexSelector, CompoundSelector, SelectorList, SelectorParseError,
    SimpleSelector,
};
