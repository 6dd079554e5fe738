// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selector matching against the element tree.
//!
//! Complex selectors are matched right to left: the subject compound must
//! match the element itself, then each combinator walks up or sideways
//! through the tree. Descendant and subsequent-sibling steps take the
//! nearest matching candidate.

use alloc::vec::Vec;

use stylecast_css::{Combinator, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};

use crate::tree::{Document, NodeId};

impl Document {
    /// Returns `true` if `node` matches any selector in the list.
    #[must_use]
    pub fn matches(&self, node: NodeId, selectors: &SelectorList) -> bool {
        selectors
            .selectors
            .iter()
            .any(|selector| self.matches_complex(node, selector))
    }

    /// The nearest ancestor-or-self of `node` matching the list.
    #[must_use]
    pub fn closest(&self, node: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(n) = cursor {
            if self.matches(n, selectors) {
                return Some(n);
            }
            cursor = self.parent(n);
        }
        None
    }

    /// The first descendant of `scope` matching the list, in pre-order.
    ///
    /// `scope` itself is never returned.
    #[must_use]
    pub fn query_selector(&self, scope: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        self.descendants(scope).find(|&n| self.matches(n, selectors))
    }

    /// All descendants of `scope` matching the list, in pre-order.
    #[must_use]
    pub fn query_selector_all(&self, scope: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&n| self.matches(n, selectors))
            .collect()
    }

    fn matches_complex(&self, node: NodeId, selector: &ComplexSelector) -> bool {
        let Some((subject, leftward)) = selector.parts.first() else {
            return false;
        };
        if !self.matches_compound(node, subject) {
            return false;
        }

        let mut current = node;
        let mut combinator = *leftward;
        for (compound, next) in &selector.parts[1..] {
            match combinator {
                Some(Combinator::Descendant) => {
                    let mut found = false;
                    let mut ancestor = self.parent(current);
                    while let Some(anc) = ancestor {
                        if self.matches_compound(anc, compound) {
                            current = anc;
                            found = true;
                            break;
                        }
                        ancestor = self.parent(anc);
                    }
                    if !found {
                        return false;
                    }
                }
                Some(Combinator::Child) => match self.parent(current) {
                    Some(parent) if self.matches_compound(parent, compound) => current = parent,
                    _ => return false,
                },
                Some(Combinator::NextSibling) => match self.prev_sibling(current) {
                    Some(sibling) if self.matches_compound(sibling, compound) => {
                        current = sibling;
                    }
                    _ => return false,
                },
                Some(Combinator::SubsequentSibling) => {
                    let mut found = false;
                    let mut sibling = self.prev_sibling(current);
                    while let Some(sib) = sibling {
                        if self.matches_compound(sib, compound) {
                            current = sib;
                            found = true;
                            break;
                        }
                        sibling = self.prev_sibling(sib);
                    }
                    if !found {
                        return false;
                    }
                }
                None => return false,
            }
            combinator = *next;
        }
        true
    }

    fn matches_compound(&self, node: NodeId, compound: &CompoundSelector) -> bool {
        compound
            .simples
            .iter()
            .all(|simple| self.matches_simple(node, simple))
    }

    fn matches_simple(&self, node: NodeId, simple: &SimpleSelector) -> bool {
        match simple {
            SimpleSelector::Universal => self.is_alive(node),
            SimpleSelector::Type(tag) => {
                self.tag(node).is_some_and(|t| t.eq_ignore_ascii_case(tag))
            }
            SimpleSelector::Id(id) => self.attribute(node, "id") == Some(id.as_str()),
            SimpleSelector::Class(class) => self
                .attribute(node, "class")
                .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class)),
            SimpleSelector::Attribute { name, op, value } => {
                let Some(actual) = self.attribute(node, name) else {
                    return false;
                };
                op.evaluate(actual, value.as_deref().unwrap_or(""))
            }
        }
    }

    fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let children = self.children(parent);
        let position = children.iter().position(|&c| c == node)?;
        position.checked_sub(1).map(|i| children[i])
    }
}
