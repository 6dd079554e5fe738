// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The element tree: a generational arena of elements plus the mutation
//! plumbing that feeds observers.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;
use stylecast_css::DeclarationList;

use crate::observer::{MutationRecord, ObserveOptions, ObserverId, Observers};

/// Stable identity for an element in a [`Document`].
///
/// # Semantics
///
/// - Returned by [`Document::create_element`] and never reused for a
///   different element: slots are recycled, generations are not.
/// - Copyable and hashable; safe to hold across arbitrary tree edits.
///
/// # Liveness
///
/// A `NodeId` whose element has been removed is *dead*: accessors return
/// `None` (or empty), mutators report failure, and the id never compares
/// equal to the id of any element created later.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Error from a structural edit that cannot be applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// A handle referred to a removed element.
    DeadNode,
    /// The edit would detach or remove the document root.
    Root,
    /// The edit would make an element an ancestor of itself.
    Cycle,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadNode => f.write_str("node is not alive"),
            Self::Root => f.write_str("the document root cannot be detached"),
            Self::Cycle => f.write_str("edit would create a cycle"),
        }
    }
}

impl core::error::Error for TreeError {}

#[derive(Debug)]
struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: HashMap<String, String>,
    style: DeclarationList,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            parent: None,
            children: Vec::new(),
            attributes: HashMap::new(),
            style: DeclarationList::new(),
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// An element tree with attributes, inline styles, and mutation observers.
///
/// The document owns a fixed root element (created by [`Document::new`])
/// and an arena of further elements. Elements carry a tag, an attribute
/// map, and an inline style modeled as a [`DeclarationList`].
///
/// Every observable mutation is routed to the observers registered via
/// [`Document::observe`]. Inline style edits surface as attribute records
/// named `style` whose old value is the previous serialized style text.
/// Writes that do not change anything produce no record, so a consumer
/// that reacts to records by writing the same values back reaches a fixed
/// point.
///
/// # Example
///
/// ```
/// use stylecast_dom::Document;
///
/// let mut doc = Document::new();
/// let card = doc.create_element("div");
/// doc.append_child(doc.root(), card).unwrap();
/// doc.set_attribute(card, "data-role", "card");
///
/// assert!(doc.is_connected(card));
/// assert_eq!(doc.attribute(card, "data-role"), Some("card"));
/// ```
#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    observers: Observers,
}

impl Document {
    /// Creates a document whose root element has the tag `root`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root("root")
    }

    /// Creates a document whose root element has the given tag.
    #[must_use]
    pub fn with_root(tag: &str) -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::new(0, 0),
            observers: Observers::default(),
        };
        doc.root = doc.create_element(tag);
        doc
    }

    /// The root element. Always alive and connected.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates a detached element with the given tag.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let element = Element::new(tag);
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.element = Some(element);
            NodeId::new(idx, slot.generation)
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                element: Some(element),
            });
            NodeId::new(idx, 0)
        }
    }

    /// Returns `true` if `node` refers to an element that still exists.
    #[must_use]
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    /// Returns `true` if `node` is the root or a descendant of the root.
    ///
    /// Detached subtrees are alive but not connected.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        if !self.is_alive(node) {
            return false;
        }
        let mut cursor = node;
        while let Some(parent) = self.parent(cursor) {
            cursor = parent;
        }
        cursor == self.root
    }

    /// The number of live elements, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// The element's tag, or `None` if `node` is dead.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    /// The element's parent, or `None` for the root, detached elements,
    /// and dead handles.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node)?.parent
    }

    /// The element's children in order. Empty for dead handles.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.element(node).map_or(&[], |el| el.children.as_slice())
    }

    /// Iterates over the subtree below `node` in pre-order, excluding
    /// `node` itself.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let mut stack = Vec::new();
        stack.extend(self.children(node).iter().rev());
        Descendants { doc: self, stack }
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// A child that is already attached elsewhere is moved; both the old
    /// and the new parent get a child-list record.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return Err(TreeError::DeadNode);
        }
        if child == self.root {
            return Err(TreeError::Root);
        }
        let mut cursor = Some(parent);
        while let Some(n) = cursor {
            if n == child {
                return Err(TreeError::Cycle);
            }
            cursor = self.parent(n);
        }

        if let Some(old_parent) = self.parent(child) {
            self.unlink(child, old_parent);
        }
        if let Some(el) = self.element_mut(parent) {
            el.children.push(child);
        }
        if let Some(el) = self.element_mut(child) {
            el.parent = Some(parent);
        }
        let chain = self.ancestor_chain(parent);
        self.observers.notify_child_list(&chain, &[child], &[]);
        Ok(())
    }

    /// Detaches `node` from its parent, keeping its subtree alive.
    ///
    /// Detaching an element that has no parent is a no-op.
    pub fn detach(&mut self, node: NodeId) -> Result<(), TreeError> {
        if !self.is_alive(node) {
            return Err(TreeError::DeadNode);
        }
        if node == self.root {
            return Err(TreeError::Root);
        }
        if let Some(parent) = self.parent(node) {
            self.unlink(node, parent);
        }
        Ok(())
    }

    /// Detaches `node` and frees it together with its whole subtree.
    ///
    /// Every handle into the removed subtree becomes dead.
    pub fn remove(&mut self, node: NodeId) -> Result<(), TreeError> {
        self.detach(node)?;
        let mut stack = Vec::new();
        stack.push(node);
        while let Some(n) = stack.pop() {
            if let Some(slot) = self.slots.get_mut(n.idx())
                && slot.generation == n.1
                && let Some(element) = slot.element.take()
            {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(n.0);
                stack.extend(element.children);
            }
        }
        Ok(())
    }

    // ----- attributes -----

    /// The value of attribute `name`, if set. Names are case-sensitive.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attributes.get(name).map(String::as_str)
    }

    /// Sets attribute `name` to `value`.
    ///
    /// Queues an attribute record unless the value is unchanged. Returns
    /// `false` only when `node` is dead.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(el) = self.element_mut(node) else {
            return false;
        };
        if el.attributes.get(name).is_some_and(|v| v == value) {
            return true;
        }
        let old = el.attributes.insert(name.to_string(), value.to_string());
        let chain = self.ancestor_chain(node);
        self.observers.notify_attribute(&chain, name, old.as_deref());
        true
    }

    /// Removes attribute `name`.
    ///
    /// Queues an attribute record if the attribute was present. Returns
    /// `false` only when `node` is dead.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool {
        let Some(el) = self.element_mut(node) else {
            return false;
        };
        let Some(old) = el.attributes.remove(name) else {
            return true;
        };
        let chain = self.ancestor_chain(node);
        self.observers.notify_attribute(&chain, name, Some(&old));
        true
    }

    // ----- inline style -----

    /// Read access to the element's inline style.
    #[must_use]
    pub fn style(&self, node: NodeId) -> Option<&DeclarationList> {
        self.element(node).map(|el| &el.style)
    }

    /// The inline value of `property`, if declared.
    #[must_use]
    pub fn style_value(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node)?.style.get(property)
    }

    /// The serialized inline style text. Empty for dead handles.
    #[must_use]
    pub fn inline_style_text(&self, node: NodeId) -> String {
        self.element(node).map(|el| el.style.to_string()).unwrap_or_default()
    }

    /// Sets one inline style property.
    ///
    /// Queues a `style` attribute record carrying the previous serialized
    /// style text, unless the property already had this value. Returns
    /// `false` only when `node` is dead.
    pub fn set_style_property(&mut self, node: NodeId, property: &str, value: &str) -> bool {
        let Some(el) = self.element_mut(node) else {
            return false;
        };
        if el.style.get(property) == Some(value) {
            return true;
        }
        let old = el.style.to_string();
        el.style.set(property, value);
        let chain = self.ancestor_chain(node);
        self.observers.notify_attribute(&chain, "style", Some(&old));
        true
    }

    /// Removes one inline style property.
    ///
    /// Queues a `style` attribute record if the property was declared.
    /// Returns `false` only when `node` is dead.
    pub fn remove_style_property(&mut self, node: NodeId, property: &str) -> bool {
        let Some(el) = self.element_mut(node) else {
            return false;
        };
        if el.style.get(property).is_none() {
            return true;
        }
        let old = el.style.to_string();
        el.style.remove(property);
        let chain = self.ancestor_chain(node);
        self.observers.notify_attribute(&chain, "style", Some(&old));
        true
    }

    /// Replaces the whole inline style with parsed `text`.
    ///
    /// Queues a `style` attribute record unless the parsed list equals the
    /// current one. Returns `false` only when `node` is dead.
    pub fn set_inline_style(&mut self, node: NodeId, text: &str) -> bool {
        let Some(el) = self.element_mut(node) else {
            return false;
        };
        let parsed = DeclarationList::parse(text);
        if parsed == el.style {
            return true;
        }
        let old = el.style.to_string();
        el.style = parsed;
        let chain = self.ancestor_chain(node);
        self.observers.notify_attribute(&chain, "style", Some(&old));
        true
    }

    // ----- observers -----

    /// Creates a new observer with no registrations.
    pub fn create_observer(&mut self) -> ObserverId {
        self.observers.create()
    }

    /// Registers `observer` on `target` with the given options.
    ///
    /// Observing a target the observer already watches replaces the
    /// previous options. Returns `false` when the observer is unknown or
    /// the target is dead.
    pub fn observe(
        &mut self,
        observer: ObserverId,
        target: NodeId,
        options: ObserveOptions,
    ) -> bool {
        if !self.is_alive(target) {
            return false;
        }
        self.observers.observe(observer, target, options)
    }

    /// Drops the registration of `observer` on `target`, if any.
    pub fn unobserve(&mut self, observer: ObserverId, target: NodeId) -> bool {
        self.observers.unobserve(observer, target)
    }

    /// Drops all of the observer's registrations and queued records.
    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        self.observers.disconnect(observer)
    }

    /// Drains and returns the observer's queued records in delivery order.
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers.take_records(observer)
    }

    /// Returns `true` if the observer has undelivered records.
    #[must_use]
    pub fn has_records(&self, observer: ObserverId) -> bool {
        self.observers.has_records(observer)
    }

    /// Returns `true` if the observer is registered on `target`.
    #[must_use]
    pub fn is_observing(&self, observer: ObserverId, target: NodeId) -> bool {
        self.observers.is_observing(observer, target)
    }

    /// The targets the observer is registered on, in no particular order.
    #[must_use]
    pub fn observed_targets(&self, observer: ObserverId) -> Vec<NodeId> {
        self.observers.observed_targets(observer)
    }

    // ----- internals -----

    fn element(&self, node: NodeId) -> Option<&Element> {
        let slot = self.slots.get(node.idx())?;
        if slot.generation != node.1 {
            return None;
        }
        slot.element.as_ref()
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        let slot = self.slots.get_mut(node.idx())?;
        if slot.generation != node.1 {
            return None;
        }
        slot.element.as_mut()
    }

    /// Unlinks `child` from `parent` and queues the child-list record.
    fn unlink(&mut self, child: NodeId, parent: NodeId) {
        if let Some(el) = self.element_mut(parent) {
            el.children.retain(|&c| c != child);
        }
        if let Some(el) = self.element_mut(child) {
            el.parent = None;
        }
        let chain = self.ancestor_chain(parent);
        self.observers.notify_child_list(&chain, &[], &[child]);
    }

    /// The node itself followed by its ancestors up to its tree's root.
    fn ancestor_chain(&self, node: NodeId) -> SmallVec<[NodeId; 8]> {
        let mut chain = SmallVec::new();
        let mut cursor = Some(node);
        while let Some(n) = cursor {
            chain.push(n);
            cursor = self.parent(n);
        }
        chain
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator over a subtree, excluding its root.
///
/// Returned by [`Document::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack.extend(self.doc.children(node).iter().rev());
        Some(node)
    }
}
