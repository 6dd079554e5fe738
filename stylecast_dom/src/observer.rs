// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutation observers: registrations, record queues, and delivery.
//!
//! Observers never run callbacks. Mutations queue [`MutationRecord`]s at
//! mutation time; a consumer drains them later with
//! [`Document::take_records`](crate::Document::take_records) and decides
//! what to do. One mutation yields at most one record per observer, no
//! matter how many of its registrations cover the mutated element.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use bitflags::bitflags;
use hashbrown::{HashMap, HashSet};

use crate::tree::NodeId;

bitflags! {
    /// Which kinds of mutations a registration receives.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MutationInterest: u8 {
        /// Attribute and inline-style mutations.
        const ATTRIBUTES = 1 << 0;
        /// Children added to or removed from an element.
        const CHILD_LIST = 1 << 1;
    }
}

/// Options for one observer registration on one target.
///
/// Build with [`ObserveOptions::attributes`] or
/// [`ObserveOptions::child_list`] and chain the `with_*` methods:
///
/// ```
/// use stylecast_dom::ObserveOptions;
///
/// let options = ObserveOptions::attributes()
///     .with_subtree()
///     .with_attribute_filter(["data-role"]);
/// assert!(options.subtree);
/// ```
#[derive(Clone, Debug)]
pub struct ObserveOptions {
    /// Which mutation kinds to receive.
    pub interest: MutationInterest,
    /// Extend the registration to the target's whole subtree.
    pub subtree: bool,
    /// Capture the previous value in attribute records.
    pub attribute_old_value: bool,
    /// If set, only attribute mutations whose name is in the set are
    /// delivered. `None` delivers all names.
    pub attribute_filter: Option<HashSet<String>>,
}

impl ObserveOptions {
    /// Options interested in attribute mutations on the target only.
    #[must_use]
    pub fn attributes() -> Self {
        Self {
            interest: MutationInterest::ATTRIBUTES,
            subtree: false,
            attribute_old_value: false,
            attribute_filter: None,
        }
    }

    /// Options interested in child-list mutations on the target only.
    #[must_use]
    pub fn child_list() -> Self {
        Self {
            interest: MutationInterest::CHILD_LIST,
            subtree: false,
            attribute_old_value: false,
            attribute_filter: None,
        }
    }

    /// Extends the registration to the target's subtree.
    #[must_use]
    pub fn with_subtree(mut self) -> Self {
        self.subtree = true;
        self
    }

    /// Captures previous values in attribute records.
    #[must_use]
    pub fn with_attribute_old_value(mut self) -> Self {
        self.attribute_old_value = true;
        self
    }

    /// Restricts attribute records to the given names.
    #[must_use]
    pub fn with_attribute_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attribute_filter = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// One queued mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord {
    /// An attribute changed on `target`. Inline style edits are reported
    /// under the name `style`.
    Attributes {
        /// The mutated element.
        target: NodeId,
        /// The attribute name.
        name: String,
        /// The previous value, if the registration asked for it and the
        /// attribute was present before the mutation.
        old_value: Option<String>,
    },
    /// The children of `target` changed.
    ChildList {
        /// The element whose child list changed.
        target: NodeId,
        /// Children appended by the mutation.
        added: Vec<NodeId>,
        /// Children detached by the mutation.
        removed: Vec<NodeId>,
    },
}

impl MutationRecord {
    /// The element the record is about.
    #[must_use]
    pub fn target(&self) -> NodeId {
        match self {
            Self::Attributes { target, .. } | Self::ChildList { target, .. } => *target,
        }
    }
}

/// Handle for an observer created by
/// [`Document::create_observer`](crate::Document::create_observer).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ObserverId(u64);

#[derive(Debug, Default)]
struct Entry {
    registrations: HashMap<NodeId, ObserveOptions>,
    queue: Vec<MutationRecord>,
}

/// All observers of one document.
#[derive(Debug, Default)]
pub(crate) struct Observers {
    entries: HashMap<u64, Entry>,
    next: u64,
}

impl Observers {
    pub(crate) fn create(&mut self) -> ObserverId {
        let id = self.next;
        self.next += 1;
        self.entries.insert(id, Entry::default());
        ObserverId(id)
    }

    pub(crate) fn observe(
        &mut self,
        observer: ObserverId,
        target: NodeId,
        options: ObserveOptions,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&observer.0) else {
            return false;
        };
        entry.registrations.insert(target, options);
        true
    }

    pub(crate) fn unobserve(&mut self, observer: ObserverId, target: NodeId) -> bool {
        self.entries
            .get_mut(&observer.0)
            .is_some_and(|entry| entry.registrations.remove(&target).is_some())
    }

    pub(crate) fn disconnect(&mut self, observer: ObserverId) -> bool {
        let Some(entry) = self.entries.get_mut(&observer.0) else {
            return false;
        };
        entry.registrations.clear();
        entry.queue.clear();
        true
    }

    pub(crate) fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.entries
            .get_mut(&observer.0)
            .map(|entry| core::mem::take(&mut entry.queue))
            .unwrap_or_default()
    }

    pub(crate) fn has_records(&self, observer: ObserverId) -> bool {
        self.entries
            .get(&observer.0)
            .is_some_and(|entry| !entry.queue.is_empty())
    }

    pub(crate) fn is_observing(&self, observer: ObserverId, target: NodeId) -> bool {
        self.entries
            .get(&observer.0)
            .is_some_and(|entry| entry.registrations.contains_key(&target))
    }

    pub(crate) fn observed_targets(&self, observer: ObserverId) -> Vec<NodeId> {
        self.entries
            .get(&observer.0)
            .map(|entry| entry.registrations.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Queues an attribute record with every observer covering the
    /// mutation. `chain` is the mutated element followed by its ancestors;
    /// `old_value` is included per observer only when a covering
    /// registration asked for it.
    pub(crate) fn notify_attribute(
        &mut self,
        chain: &[NodeId],
        name: &str,
        old_value: Option<&str>,
    ) {
        let Some(&target) = chain.first() else {
            return;
        };
        for entry in self.entries.values_mut() {
            let mut covered = false;
            let mut wants_old = false;
            for (&node, options) in &entry.registrations {
                if !options.interest.contains(MutationInterest::ATTRIBUTES) {
                    continue;
                }
                if let Some(filter) = &options.attribute_filter
                    && !filter.contains(name)
                {
                    continue;
                }
                let hit = if options.subtree {
                    chain.contains(&node)
                } else {
                    node == target
                };
                if hit {
                    covered = true;
                    wants_old |= options.attribute_old_value;
                }
            }
            if covered {
                entry.queue.push(MutationRecord::Attributes {
                    target,
                    name: name.to_string(),
                    old_value: if wants_old {
                        old_value.map(ToString::to_string)
                    } else {
                        None
                    },
                });
            }
        }
    }

    /// Queues a child-list record with every observer covering the
    /// mutation. `chain` is the parent whose children changed followed by
    /// its ancestors.
    pub(crate) fn notify_child_list(
        &mut self,
        chain: &[NodeId],
        added: &[NodeId],
        removed: &[NodeId],
    ) {
        let Some(&target) = chain.first() else {
            return;
        };
        for entry in self.entries.values_mut() {
            let covered = entry.registrations.iter().any(|(node, options)| {
                options.interest.contains(MutationInterest::CHILD_LIST)
                    && if options.subtree {
                        chain.contains(node)
                    } else {
                        *node == target
                    }
            });
            if covered {
                entry.queue.push(MutationRecord::ChildList {
                    target,
                    added: added.to_vec(),
                    removed: removed.to_vec(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Document;

    #[test]
    fn attribute_records_are_queued_and_drained() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        doc.append_child(doc.root(), a).unwrap();
        let obs = doc.create_observer();
        assert!(doc.observe(obs, a, ObserveOptions::attributes()));

        doc.set_attribute(a, "id", "card");
        let records = doc.take_records(obs);
        assert_eq!(
            records,
            [MutationRecord::Attributes {
                target: a,
                name: "id".into(),
                old_value: None,
            }]
        );
        assert!(doc.take_records(obs).is_empty());
    }

    #[test]
    fn unchanged_writes_are_suppressed() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let obs = doc.create_observer();
        doc.observe(obs, a, ObserveOptions::attributes());

        doc.set_attribute(a, "id", "card");
        doc.take_records(obs);

        doc.set_attribute(a, "id", "card");
        doc.remove_attribute(a, "missing");
        doc.set_style_property(a, "width", "1px");
        doc.take_records(obs);
        doc.set_style_property(a, "width", "1px");
        doc.remove_style_property(a, "height");
        assert!(!doc.has_records(obs));
    }

    #[test]
    fn old_values_are_captured_on_request() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let obs = doc.create_observer();
        doc.observe(obs, a, ObserveOptions::attributes().with_attribute_old_value());

        doc.set_attribute(a, "data-x", "1");
        doc.set_attribute(a, "data-x", "2");
        doc.remove_attribute(a, "data-x");
        let old_values: Vec<Option<String>> = doc
            .take_records(obs)
            .into_iter()
            .map(|record| match record {
                MutationRecord::Attributes { old_value, .. } => old_value,
                MutationRecord::ChildList { .. } => panic!("unexpected record"),
            })
            .collect();
        assert_eq!(old_values, [None, Some("1".into()), Some("2".into())]);
    }

    #[test]
    fn attribute_filter_limits_delivery() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let obs = doc.create_observer();
        doc.observe(
            obs,
            a,
            ObserveOptions::attributes().with_attribute_filter(["data-keep"]),
        );

        doc.set_attribute(a, "data-drop", "x");
        doc.set_attribute(a, "data-keep", "y");
        let records = doc.take_records(obs);
        assert_eq!(records.len(), 1);
        assert!(matches!(
            &records[0],
            MutationRecord::Attributes { name, .. } if name == "data-keep"
        ));
    }

    #[test]
    fn subtree_registrations_cover_descendants() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("span");
        doc.append_child(doc.root(), a).unwrap();
        doc.append_child(a, b).unwrap();
        let obs = doc.create_observer();
        doc.observe(obs, doc.root(), ObserveOptions::attributes().with_subtree());

        doc.set_attribute(b, "id", "deep");
        let records = doc.take_records(obs);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target(), b);

        // Without subtree, mutations below the target are not delivered.
        let narrow = doc.create_observer();
        doc.observe(narrow, a, ObserveOptions::attributes());
        doc.set_attribute(b, "id", "deeper");
        assert!(!doc.has_records(narrow));
    }

    #[test]
    fn one_record_per_observer_per_mutation() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        doc.append_child(doc.root(), a).unwrap();
        let obs = doc.create_observer();
        doc.observe(obs, doc.root(), ObserveOptions::attributes().with_subtree());
        doc.observe(obs, a, ObserveOptions::attributes());

        doc.set_attribute(a, "id", "x");
        assert_eq!(doc.take_records(obs).len(), 1);
    }

    #[test]
    fn reobserving_replaces_the_registration() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let obs = doc.create_observer();
        doc.observe(
            obs,
            a,
            ObserveOptions::attributes().with_attribute_filter(["data-a"]),
        );
        doc.observe(
            obs,
            a,
            ObserveOptions::attributes().with_attribute_filter(["data-b"]),
        );

        doc.set_attribute(a, "data-a", "1");
        doc.set_attribute(a, "data-b", "2");
        let records = doc.take_records(obs);
        assert_eq!(records.len(), 1);
        assert!(matches!(
            &records[0],
            MutationRecord::Attributes { name, .. } if name == "data-b"
        ));
        assert_eq!(doc.observed_targets(obs), [a]);
    }

    #[test]
    fn child_list_records_report_added_and_removed() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        doc.append_child(doc.root(), a).unwrap();
        let obs = doc.create_observer();
        doc.observe(obs, doc.root(), ObserveOptions::child_list().with_subtree());

        let b = doc.create_element("span");
        doc.append_child(a, b).unwrap();
        doc.detach(b).unwrap();
        let records = doc.take_records(obs);
        assert_eq!(
            records,
            [
                MutationRecord::ChildList {
                    target: a,
                    added: alloc::vec![b],
                    removed: alloc::vec![],
                },
                MutationRecord::ChildList {
                    target: a,
                    added: alloc::vec![],
                    removed: alloc::vec![b],
                },
            ]
        );
    }

    #[test]
    fn moving_a_child_reports_both_parents() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(doc.root(), a).unwrap();
        doc.append_child(doc.root(), b).unwrap();
        doc.append_child(a, child).unwrap();
        let obs = doc.create_observer();
        doc.observe(obs, doc.root(), ObserveOptions::child_list().with_subtree());

        doc.append_child(b, child).unwrap();
        let records = doc.take_records(obs);
        let targets: Vec<NodeId> = records.iter().map(MutationRecord::target).collect();
        assert_eq!(targets, [a, b]);
    }

    #[test]
    fn style_edits_surface_as_style_attribute_records() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let obs = doc.create_observer();
        doc.observe(
            obs,
            a,
            ObserveOptions::attributes()
                .with_attribute_old_value()
                .with_attribute_filter(["style"]),
        );

        doc.set_style_property(a, "width", "10px");
        doc.set_style_property(a, "width", "20px");
        let records = doc.take_records(obs);
        assert_eq!(
            records,
            [
                MutationRecord::Attributes {
                    target: a,
                    name: "style".into(),
                    old_value: Some("".into()),
                },
                MutationRecord::Attributes {
                    target: a,
                    name: "style".into(),
                    old_value: Some("width: 10px;".into()),
                },
            ]
        );
    }

    #[test]
    fn disconnect_clears_registrations_and_queue() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let obs = doc.create_observer();
        doc.observe(obs, a, ObserveOptions::attributes());
        doc.set_attribute(a, "id", "x");
        assert!(doc.disconnect(obs));
        assert!(!doc.has_records(obs));
        doc.set_attribute(a, "id", "y");
        assert!(doc.take_records(obs).is_empty());
        assert!(doc.observed_targets(obs).is_empty());
    }

    #[test]
    fn unobserve_drops_a_single_registration() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let obs = doc.create_observer();
        doc.observe(obs, a, ObserveOptions::attributes());
        doc.observe(obs, b, ObserveOptions::attributes());
        assert!(doc.unobserve(obs, a));
        assert!(!doc.unobserve(obs, a));
        assert!(doc.is_observing(obs, b));

        doc.set_attribute(a, "id", "x");
        doc.set_attribute(b, "id", "y");
        assert_eq!(doc.take_records(obs).len(), 1);
    }
}
