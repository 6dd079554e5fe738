// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stylecast DOM: the host element tree the caster engine runs against.
//!
//! A [`Document`] is a generational arena of elements. Each element has a
//! tag, an attribute map, an inline style ([`stylecast_css::DeclarationList`]),
//! and a place in the tree. On top of that the document provides the two
//! facilities a reactive style engine needs:
//!
//! - **Mutation observers** ([`ObserverId`], [`ObserveOptions`],
//!   [`MutationRecord`]): registrations with attribute filters, old-value
//!   capture, and subtree scope. Mutations queue records; consumers drain
//!   them with [`Document::take_records`] at a time of their choosing.
//!   Writes that change nothing queue nothing, so write-back loops
//!   terminate.
//! - **Selector matching** ([`Document::matches`], [`Document::closest`],
//!   [`Document::query_selector`], [`Document::query_selector_all`]) over
//!   the subset parsed by [`stylecast_css::SelectorList`].
//!
//! Handles ([`NodeId`]) are generational: removing an element kills its
//! handles for good, and recycled storage never aliases them.
//!
//! ## Quick Start
//!
//! ```
//! use stylecast_dom::{Document, MutationRecord, ObserveOptions};
//!
//! let mut doc = Document::new();
//! let card = doc.create_element("div");
//! doc.append_child(doc.root(), card)?;
//!
//! let obs = doc.create_observer();
//! doc.observe(obs, doc.root(), ObserveOptions::attributes().with_subtree());
//!
//! doc.set_attribute(card, "data-role", "card");
//! let records = doc.take_records(obs);
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].target(), card);
//! # Ok::<(), stylecast_dom::TreeError>(())
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod matching;
mod observer;
mod tree;

pub use observer::{MutationInterest, MutationRecord, ObserveOptions, ObserverId};
pub use tree::{Descendants, Document, NodeId, TreeError};
