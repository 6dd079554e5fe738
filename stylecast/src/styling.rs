// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keeps shared-stylesheet rules in step with styling attributes.

use alloc::string::{String, ToString};

use stylecast_dom::{Document, NodeId};
use stylecast_sheet::StyleSheet;

use crate::attrs;
use crate::caster::Session;
use crate::diag::DiagnosticSink;
use crate::expr;

/// Rebuilds the sheet rule for one element from its styling attributes.
///
/// The rule is keyed by the element's `id` attribute; elements without an
/// id are skipped. The rule body is the `data-style-declaration` value,
/// extended by the `data-style-expression` result when expressions are
/// enabled and the result is truthy. An element left with no effective
/// declaration has its rule removed.
pub(crate) fn apply_style_mutation(
    sheet: &mut StyleSheet,
    sink: &mut dyn DiagnosticSink,
    session: &Session,
    doc: &Document,
    element: NodeId,
) {
    let Some(id) = doc.attribute(element, "id").filter(|id| !id.is_empty()) else {
        return;
    };
    let mut declaration = doc
        .attribute(element, attrs::STYLE_DECLARATION)
        .unwrap_or_default()
        .to_string();

    if session.allow_style_expression
        && let Some(source) = doc.attribute(element, attrs::STYLE_EXPRESSION)
        && !source.is_empty()
    {
        match expr::evaluate(source, &session.custom_data) {
            Ok(value) if value.truthy() => {
                if !declaration.is_empty() {
                    declaration.push(';');
                }
                declaration.push_str(&value.to_string());
            }
            Ok(_) => {}
            Err(error) => sink.expression_failed(element, source, &error),
        }
    }

    if declaration.is_empty() {
        sheet.set_from_attribute(id, None);
    } else {
        sheet.set_from_attribute(id, Some(&declaration));
    }
}

/// Writes `declaration` to the element's `data-style-declaration`
/// attribute, the canonical way to restyle an element through the
/// caster. Returns `false` if the element is dead.
pub fn set_element_style(doc: &mut Document, element: NodeId, declaration: &str) -> bool {
    doc.set_attribute(element, attrs::STYLE_DECLARATION, declaration)
}

/// Renders `(property, value)` pairs as declaration text, lowering
/// camelCase property names to kebab-case.
///
/// ```
/// let text = stylecast::style_text(&[("backgroundColor", "red"), ("width", "10px")]);
/// assert_eq!(text, "background-color: red;width: 10px;");
/// ```
#[must_use]
pub fn style_text(pairs: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (property, value) in pairs {
        for c in property.chars() {
            if c.is_ascii_uppercase() {
                out.push('-');
                out.push(c.to_ascii_lowercase());
            } else {
                out.push(c);
            }
        }
        out.push_str(": ");
        out.push_str(value);
        out.push(';');
    }
    out
}
