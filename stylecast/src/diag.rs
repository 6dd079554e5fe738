// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics for attribute content that fails to parse or evaluate.
//!
//! Bad expressions and selectors are authoring mistakes in document
//! attributes, not caster bugs, so they are reported through a sink
//! rather than returned as errors. The element that carried the bad
//! text fails soft and processing continues with the remaining
//! elements.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use stylecast_css::SelectorParseError;
use stylecast_dom::NodeId;

use crate::expr::ExprError;

/// Receives authoring errors encountered while processing a document.
///
/// `element` is the node whose attribute carried the offending text and
/// `source` is that text verbatim.
pub trait DiagnosticSink {
    /// A `data-style-expression` or `data-style-action` value failed.
    fn expression_failed(&mut self, element: NodeId, source: &str, error: &ExprError);

    /// A targeting or scene selector failed to parse.
    fn selector_failed(&mut self, element: NodeId, source: &str, error: &SelectorParseError);
}

/// Discards all diagnostics. The default sink.
#[derive(Copy, Clone, Debug, Default)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn expression_failed(&mut self, _element: NodeId, _source: &str, _error: &ExprError) {}

    fn selector_failed(&mut self, _element: NodeId, _source: &str, _error: &SelectorParseError) {}
}

/// Collects diagnostics as formatted messages.
///
/// Clones share one buffer, so a test can keep a handle while the
/// caster owns the boxed sink.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    entries: Rc<RefCell<Vec<(NodeId, String)>>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected `(element, message)` pairs in report order.
    #[must_use]
    pub fn entries(&self) -> Vec<(NodeId, String)> {
        self.entries.borrow().clone()
    }

    /// Returns how many diagnostics have been reported.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl DiagnosticSink for RecordingSink {
    fn expression_failed(&mut self, element: NodeId, source: &str, error: &ExprError) {
        self.entries
            .borrow_mut()
            .push((element, format!("expression `{source}`: {error}")));
    }

    fn selector_failed(&mut self, element: NodeId, source: &str, error: &SelectorParseError) {
        self.entries
            .borrow_mut()
            .push((element, format!("selector `{source}`: {error}")));
    }
}
