// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stylecast: attribute-driven styling for element trees.
//!
//! Elements describe their styling declaratively through `data-*`
//! attributes (the names live in [`attrs`]), and a [`StyleCaster`] keeps
//! two derived artifacts in step with the tree:
//!
//! - a shared stylesheet with one `#id` rule per styled element, fed by
//!   `data-style-declaration` and `data-style-expression`, and
//! - CSS custom properties mirroring inline style values onto ancestor
//!   or selector-chosen target elements, driven by
//!   `data-cast-properties` and its targeting attributes.
//!
//! The pieces:
//!
//! - **[`StyleCaster`]**: owns the stylesheet, the casting functions, and
//!   one session per loaded document; [`StyleCaster::flush`] drains
//!   queued mutation records and reconverges.
//! - **[`Defaults`]**: the configuration snapshot each document takes at
//!   load time, including per-document [`CustomData`].
//! - **Expressions** ([`Expression`], [`Value`], [`evaluate`]): the small
//!   language behind `data-style-expression` and `data-style-action`.
//! - **Diagnostics** ([`DiagnosticSink`], [`SilentSink`],
//!   [`RecordingSink`]): authoring errors fail soft and are reported out
//!   of band.
//! - Helpers: [`set_element_style`], [`style_text`], and
//!   [`remove_style_variable`].
//!
//! ## Quick Start
//!
//! ```
//! use stylecast::{StyleCaster, attrs};
//! use stylecast_dom::Document;
//!
//! let mut doc = Document::new();
//! let card = doc.create_element("div");
//! doc.append_child(doc.root(), card)?;
//! doc.set_attribute(card, "id", "card");
//! doc.set_attribute(card, attrs::STYLE_DECLARATION, "top: 10px");
//! doc.set_attribute(card, attrs::CAST_PROPERTIES, "card:width");
//! doc.set_style_property(card, "width", "320px");
//!
//! let mut caster = StyleCaster::new();
//! let id = caster.load_document(&mut doc);
//! assert_eq!(
//!     caster.css_text(),
//!     "#card{transform: none !important; top: 10px !important;}"
//! );
//! assert_eq!(doc.style_value(doc.root(), "--card-width"), Some("320px"));
//!
//! // Later mutations are picked up on flush.
//! doc.set_style_property(card, "width", "480px");
//! caster.flush(id, &mut doc);
//! assert_eq!(doc.style_value(doc.root(), "--card-width"), Some("480px"));
//! # Ok::<(), stylecast_dom::TreeError>(())
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

pub mod attrs;

mod caster;
mod casting;
mod config;
mod diag;
mod expr;
mod styling;

pub use caster::{DocumentId, StyleCaster};
pub use casting::remove_style_variable;
pub use config::Defaults;
pub use diag::{DiagnosticSink, RecordingSink, SilentSink};
pub use expr::{CustomData, ExprError, Expression, Value, evaluate};
pub use styling::{set_element_style, style_text};
