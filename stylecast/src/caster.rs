// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The caster: document sessions, observers, and the flush loop.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::iter;
use core::mem;

use hashbrown::HashMap;

use stylecast_css::SelectorList;
use stylecast_dom::{Document, MutationRecord, NodeId, ObserveOptions, ObserverId};
use stylecast_sheet::StyleSheet;
use stylecast_value::{CastRegistry, CastValue};

use crate::attrs;
use crate::casting;
use crate::config::Defaults;
use crate::diag::{DiagnosticSink, SilentSink};
use crate::expr::{self, CustomData};
use crate::styling;

/// Handle for a loaded document's session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

/// Per-document state: the observer handles and the configuration
/// snapshot taken at load time.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) root: NodeId,
    pub(crate) style_observer: ObserverId,
    pub(crate) cast_observer: ObserverId,
    pub(crate) basename_observer: ObserverId,
    pub(crate) tree_observer: ObserverId,
    pub(crate) allow_style_expression: bool,
    pub(crate) allow_style_action: bool,
    pub(crate) cast_properties: Vec<String>,
    pub(crate) scene_selector: Option<SelectorList>,
    pub(crate) custom_data: CustomData,
}

/// Synchronizes styling attributes with the shared stylesheet and casts
/// inline style values to CSS custom properties, across any number of
/// loaded documents.
///
/// Mutations made to a [`Document`] queue observer records; nothing is
/// recomputed until [`StyleCaster::flush`] drains them. Loading a
/// document snapshots the caster's [`Defaults`]; later default changes
/// affect only documents loaded afterwards, while each session's custom
/// data stays live through [`StyleCaster::custom_data_mut`].
pub struct StyleCaster {
    defaults: Defaults,
    casts: CastRegistry,
    sheet: StyleSheet,
    sink: Box<dyn DiagnosticSink>,
    sessions: HashMap<DocumentId, Session>,
    next_session: u64,
}

impl Default for StyleCaster {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StyleCaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleCaster")
            .field("defaults", &self.defaults)
            .field("sheet", &self.sheet)
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl StyleCaster {
    /// Creates a caster with default configuration, the built-in casting
    /// functions, an empty stylesheet, and no diagnostics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            defaults: Defaults::default(),
            casts: CastRegistry::new(),
            sheet: StyleSheet::new(),
            sink: Box::new(SilentSink),
            sessions: HashMap::new(),
            next_session: 0,
        }
    }

    // ----- document lifecycle -----

    /// Loads a document: installs its observers, snapshots the current
    /// defaults into a session, styles and casts everything already in
    /// the tree, and flushes.
    pub fn load_document(&mut self, doc: &mut Document) -> DocumentId {
        let root = doc.root();
        let style_observer = doc.create_observer();
        doc.observe(
            style_observer,
            root,
            ObserveOptions::attributes()
                .with_subtree()
                .with_attribute_filter([attrs::STYLE_DECLARATION, attrs::STYLE_EXPRESSION]),
        );
        // Per-element registrations are added by the tree scan below.
        let cast_observer = doc.create_observer();
        let basename_observer = doc.create_observer();
        doc.observe(
            basename_observer,
            root,
            ObserveOptions::attributes()
                .with_subtree()
                .with_attribute_filter([attrs::CAST_BASENAME]),
        );
        let tree_observer = doc.create_observer();
        doc.observe(tree_observer, root, ObserveOptions::child_list().with_subtree());

        let scene_selector = match &self.defaults.scene_selector {
            Some(source) => match SelectorList::parse(source) {
                Ok(list) => Some(list),
                Err(error) => {
                    self.sink.selector_failed(root, source, &error);
                    None
                }
            },
            None => None,
        };
        let session = Session {
            root,
            style_observer,
            cast_observer,
            basename_observer,
            tree_observer,
            allow_style_expression: self.defaults.allow_style_expression,
            allow_style_action: self.defaults.allow_style_action,
            cast_properties: self.defaults.cast_properties.clone(),
            scene_selector,
            custom_data: self.defaults.custom_data.clone(),
        };

        let styled: Vec<NodeId> = iter::once(root)
            .chain(doc.descendants(root))
            .filter(|node| {
                doc.attribute(*node, attrs::STYLE_DECLARATION).is_some()
                    || doc.attribute(*node, attrs::STYLE_EXPRESSION).is_some()
            })
            .collect();
        for element in styled {
            styling::apply_style_mutation(&mut self.sheet, &mut *self.sink, &session, doc, element);
        }
        casting::refresh_tree(&self.casts, &mut *self.sink, &session, doc);

        let id = DocumentId(self.next_session);
        self.next_session += 1;
        self.sessions.insert(id, session);
        self.flush(id, doc);
        id
    }

    /// Unloads a document: drops the session and disconnects its
    /// observers. Returns `false` if the document was not loaded.
    pub fn unload_document(&mut self, document: DocumentId, doc: &mut Document) -> bool {
        let Some(session) = self.sessions.remove(&document) else {
            return false;
        };
        doc.disconnect(session.style_observer);
        doc.disconnect(session.cast_observer);
        doc.disconnect(session.basename_observer);
        doc.disconnect(session.tree_observer);
        true
    }

    /// Returns `true` if the document has a live session.
    #[must_use]
    pub fn is_loaded(&self, document: DocumentId) -> bool {
        self.sessions.contains_key(&document)
    }

    // ----- mutation processing -----

    /// Drains queued mutation records and recomputes what they touched,
    /// repeating until every observer is quiet.
    ///
    /// Recomputation writes back into the document, which can queue
    /// further records; those are processed in the same call.
    /// Convergence relies on same-value writes being suppressed and on
    /// casting functions being pure functions of their input.
    pub fn flush(&mut self, document: DocumentId, doc: &mut Document) {
        loop {
            let progressed = self.drain_style(document, doc)
                | self.drain_cast(document, doc)
                | self.drain_basename(document, doc)
                | self.drain_tree(document, doc);
            if !progressed {
                break;
            }
        }
    }

    /// Runs the scene-display pass: re-scans the tree, then evaluates
    /// every `data-style-action` attribute, writing truthy results into
    /// the element's `data-style-declaration`, and flushes.
    pub fn scene_displayed(&mut self, document: DocumentId, doc: &mut Document) {
        let Some(session) = self.sessions.get(&document) else {
            return;
        };
        casting::refresh_tree(&self.casts, &mut *self.sink, session, doc);
        if session.allow_style_action {
            let actions: Vec<(NodeId, String)> = iter::once(session.root)
                .chain(doc.descendants(session.root))
                .filter_map(|node| {
                    doc.attribute(node, attrs::STYLE_ACTION)
                        .filter(|source| !source.trim().is_empty())
                        .map(|source| (node, source.to_string()))
                })
                .collect();
            for (element, source) in actions {
                match expr::evaluate(&source, &session.custom_data) {
                    Ok(value) if value.truthy() => {
                        styling::set_element_style(doc, element, &value.to_string());
                    }
                    Ok(_) => {}
                    Err(error) => self.sink.expression_failed(element, &source, &error),
                }
            }
        }
        self.flush(document, doc);
    }

    fn drain_style(&mut self, document: DocumentId, doc: &mut Document) -> bool {
        let Some(session) = self.sessions.get(&document) else {
            return false;
        };
        let records = doc.take_records(session.style_observer);
        if records.is_empty() {
            return false;
        }
        for record in records {
            if let MutationRecord::Attributes { target, .. } = record {
                styling::apply_style_mutation(
                    &mut self.sheet,
                    &mut *self.sink,
                    session,
                    doc,
                    target,
                );
            }
        }
        true
    }

    fn drain_cast(&mut self, document: DocumentId, doc: &mut Document) -> bool {
        let Some(session) = self.sessions.get(&document) else {
            return false;
        };
        let records = doc.take_records(session.cast_observer);
        if records.is_empty() {
            return false;
        }
        for record in records {
            let MutationRecord::Attributes { target, name, old_value } = record else {
                continue;
            };
            if name == attrs::CAST_TO_CLOSEST
                && let Some(old) = old_value.as_deref()
                && !old.trim().is_empty()
            {
                casting::sweep_previous_scope(&mut *self.sink, session, doc, target, old);
            }
            casting::recompute_casting(&self.casts, &mut *self.sink, session, doc, target);
        }
        true
    }

    fn drain_basename(&mut self, document: DocumentId, doc: &mut Document) -> bool {
        let Some(session) = self.sessions.get(&document) else {
            return false;
        };
        let records = doc.take_records(session.basename_observer);
        if records.is_empty() {
            return false;
        }
        for record in records {
            let MutationRecord::Attributes { target, .. } = record else {
                continue;
            };
            if !doc.is_alive(target) {
                continue;
            }
            // A basename shift changes the stem of every casting element
            // below the carrier, so each one recomputes.
            let affected: Vec<NodeId> = iter::once(target)
                .chain(doc.descendants(target))
                .filter(|node| doc.attribute(*node, attrs::CAST_PROPERTIES).is_some())
                .collect();
            for element in affected {
                casting::recompute_casting(&self.casts, &mut *self.sink, session, doc, element);
            }
        }
        true
    }

    fn drain_tree(&mut self, document: DocumentId, doc: &mut Document) -> bool {
        let Some(session) = self.sessions.get(&document) else {
            return false;
        };
        if doc.take_records(session.tree_observer).is_empty() {
            return false;
        }
        casting::refresh_tree(&self.casts, &mut *self.sink, session, doc);
        true
    }

    // ----- programmatic styling -----

    /// Writes or replaces the sheet rule for `id`, subject to the same
    /// validation as the declaration attribute.
    pub fn set_style(&mut self, id: &str, declaration: &str) {
        self.sheet.set_from_attribute(id, Some(declaration));
    }

    /// Removes the sheet rule for `id`, returning `true` if one existed.
    pub fn remove_style(&mut self, id: &str) -> bool {
        self.sheet.remove(id)
    }

    /// Renders the shared stylesheet.
    #[must_use]
    pub fn css_text(&self) -> String {
        self.sheet.css_text()
    }

    /// Read access to the shared stylesheet.
    #[must_use]
    pub fn sheet(&self) -> &StyleSheet {
        &self.sheet
    }

    /// Registers a casting function. A later registration for the same
    /// name wins.
    pub fn register_cast(
        &mut self,
        name: impl Into<String>,
        cast: impl Fn(&str) -> CastValue + 'static,
    ) {
        self.casts.register(name, cast);
    }

    // ----- configuration -----

    /// The defaults applied to documents loaded from now on.
    #[must_use]
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Mutable access to the defaults. Loaded documents keep their
    /// snapshot.
    pub fn defaults_mut(&mut self) -> &mut Defaults {
        &mut self.defaults
    }

    /// Replaces the defaults wholesale.
    pub fn set_defaults(&mut self, defaults: Defaults) {
        self.defaults = defaults;
    }

    /// The document's live custom data.
    #[must_use]
    pub fn custom_data(&self, document: DocumentId) -> Option<&CustomData> {
        self.sessions.get(&document).map(|session| &session.custom_data)
    }

    /// Mutable access to the document's custom data. Takes effect the
    /// next time an expression on that document is evaluated.
    pub fn custom_data_mut(&mut self, document: DocumentId) -> Option<&mut CustomData> {
        self.sessions
            .get_mut(&document)
            .map(|session| &mut session.custom_data)
    }

    /// Replaces the diagnostic sink, returning the previous one.
    pub fn set_diagnostic_sink(
        &mut self,
        sink: Box<dyn DiagnosticSink>,
    ) -> Box<dyn DiagnosticSink> {
        mem::replace(&mut self.sink, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::diag::RecordingSink;
    use crate::expr::Value;

    fn child_of(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
        let node = doc.create_element(tag);
        doc.append_child(parent, node).unwrap();
        node
    }

    #[test]
    fn load_styles_elements_already_in_the_tree() {
        let mut doc = Document::new();
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, "id", "box");
        doc.set_attribute(element, attrs::STYLE_DECLARATION, "width: 10px");

        let mut caster = StyleCaster::new();
        let id = caster.load_document(&mut doc);

        assert!(caster.is_loaded(id));
        assert_eq!(caster.css_text(), "#box{width: 10px !important;}");
    }

    #[test]
    fn declaration_changes_flow_through_flush() {
        let mut doc = Document::new();
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, "id", "box");

        let mut caster = StyleCaster::new();
        let id = caster.load_document(&mut doc);
        assert_eq!(caster.css_text(), "");

        doc.set_attribute(element, attrs::STYLE_DECLARATION, "color: red");
        caster.flush(id, &mut doc);
        assert_eq!(caster.css_text(), "#box{color: red !important;}");

        doc.remove_attribute(element, attrs::STYLE_DECLARATION);
        caster.flush(id, &mut doc);
        assert_eq!(caster.css_text(), "");
    }

    #[test]
    fn garbage_declarations_leave_no_rule() {
        let mut doc = Document::new();
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, "id", "box");

        let mut caster = StyleCaster::new();
        let id = caster.load_document(&mut doc);

        doc.set_attribute(element, attrs::STYLE_DECLARATION, "width: 10px");
        caster.flush(id, &mut doc);
        assert!(caster.css_text().contains("#box"));

        doc.set_attribute(element, attrs::STYLE_DECLARATION, "*#!garbage");
        caster.flush(id, &mut doc);
        assert_eq!(caster.css_text(), "");
    }

    #[test]
    fn casting_follows_inline_style_changes() {
        let mut doc = Document::new();
        let root = doc.root();
        let scene = child_of(&mut doc, root, "section");
        doc.set_attribute(scene, attrs::CAST_BASENAME, "hero");
        let element = child_of(&mut doc, scene, "div");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box:width");
        doc.set_style_property(element, "width", "50px");

        let mut caster = StyleCaster::new();
        let id = caster.load_document(&mut doc);
        assert_eq!(doc.style_value(doc.root(), "--hero-box-width"), Some("50px"));

        doc.set_style_property(element, "width", "70px");
        caster.flush(id, &mut doc);
        assert_eq!(doc.style_value(doc.root(), "--hero-box-width"), Some("70px"));
    }

    #[test]
    fn appended_elements_start_casting_within_one_flush() {
        let mut doc = Document::new();
        let mut caster = StyleCaster::new();
        let id = caster.load_document(&mut doc);

        let late = doc.create_element("div");
        doc.set_attribute(late, attrs::CAST_PROPERTIES, "late");
        doc.set_style_property(late, "width", "7px");
        doc.append_child(doc.root(), late).unwrap();

        caster.flush(id, &mut doc);
        assert_eq!(doc.style_value(doc.root(), "--late-width"), Some("7px"));
        assert_eq!(doc.style_value(doc.root(), "--late-height"), None);
    }

    #[test]
    fn retargeting_sweeps_the_old_scope() {
        let mut doc = Document::new();
        let root = doc.root();
        let outer = child_of(&mut doc, root, "div");
        doc.set_attribute(outer, "class", "outer");
        let pane = child_of(&mut doc, outer, "div");
        doc.set_attribute(pane, "class", "pane");
        let element = child_of(&mut doc, pane, "span");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box");
        doc.set_attribute(element, attrs::CAST_TO_CLOSEST, ".pane");
        doc.set_style_property(element, "width", "50px");

        let mut caster = StyleCaster::new();
        let id = caster.load_document(&mut doc);
        assert_eq!(doc.style_value(pane, "--box-width"), Some("50px"));

        doc.set_attribute(element, attrs::CAST_TO_CLOSEST, ".outer");
        caster.flush(id, &mut doc);
        assert_eq!(doc.style_value(pane, "--box-width"), None);
        assert_eq!(doc.style_value(outer, "--box-width"), Some("50px"));
    }

    #[test]
    fn basename_changes_recompute_the_subtree() {
        let mut doc = Document::new();
        let root = doc.root();
        let scene = child_of(&mut doc, root, "section");
        doc.set_attribute(scene, attrs::CAST_BASENAME, "hero");
        let element = child_of(&mut doc, scene, "div");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box:width");
        doc.set_style_property(element, "width", "50px");

        let mut caster = StyleCaster::new();
        let id = caster.load_document(&mut doc);
        assert_eq!(doc.style_value(doc.root(), "--hero-box-width"), Some("50px"));

        doc.set_attribute(scene, attrs::CAST_BASENAME, "villain");
        caster.flush(id, &mut doc);
        assert_eq!(doc.style_value(doc.root(), "--villain-box-width"), Some("50px"));
    }

    #[test]
    fn registered_casts_apply_through_the_pipeline() {
        let mut doc = Document::new();
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box:(int) width");
        doc.set_style_property(element, "width", "50px");

        let mut caster = StyleCaster::new();
        caster.register_cast("shout", |value| CastValue::Str(value.to_uppercase()));
        caster.load_document(&mut doc);
        assert_eq!(doc.style_value(doc.root(), "--box-width-int"), Some("50"));

        let mut doc2 = Document::new();
        let root2 = doc2.root();
        let loud = child_of(&mut doc2, root2, "div");
        doc2.set_attribute(loud, attrs::CAST_PROPERTIES, "box:(shout) width");
        doc2.set_style_property(loud, "width", "50px");
        caster.load_document(&mut doc2);
        assert_eq!(doc2.style_value(doc2.root(), "--box-width-shout"), Some("50PX"));
    }

    #[test]
    fn expression_failures_report_and_spare_the_rest() {
        let mut doc = Document::new();
        let root = doc.root();
        let bad = child_of(&mut doc, root, "div");
        doc.set_attribute(bad, "id", "bad");
        doc.set_attribute(bad, attrs::STYLE_EXPRESSION, "nope + 1");
        let root = doc.root();
        let good = child_of(&mut doc, root, "div");
        doc.set_attribute(good, "id", "good");
        doc.set_attribute(good, attrs::STYLE_DECLARATION, "width: 1px");

        let sink = RecordingSink::new();
        let mut caster = StyleCaster::new();
        caster.set_diagnostic_sink(Box::new(sink.clone()));
        caster.load_document(&mut doc);

        assert_eq!(caster.css_text(), "#good{width: 1px !important;}");
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.entries()[0].0, bad);
    }

    #[test]
    fn custom_data_stays_live_per_session() {
        let mut doc = Document::new();
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, "id", "box");
        doc.set_attribute(element, attrs::STYLE_EXPRESSION, "'width: ' + size + 'px'");

        let mut caster = StyleCaster::new();
        caster
            .defaults_mut()
            .custom_data
            .insert("size".into(), Value::Number(10.0));
        let id = caster.load_document(&mut doc);
        assert_eq!(caster.css_text(), "#box{width: 10px !important;}");

        caster
            .custom_data_mut(id)
            .unwrap()
            .insert("size".into(), Value::Number(20.0));
        doc.set_attribute(element, attrs::STYLE_EXPRESSION, "'width: ' + size + 'px' ");
        caster.flush(id, &mut doc);
        assert_eq!(caster.css_text(), "#box{width: 20px !important;}");
    }

    #[test]
    fn defaults_snapshot_at_load() {
        let mut doc = Document::new();
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, "id", "box");

        let mut caster = StyleCaster::new();
        let id = caster.load_document(&mut doc);
        caster.defaults_mut().allow_style_expression = false;

        doc.set_attribute(element, attrs::STYLE_EXPRESSION, "'color: red'");
        caster.flush(id, &mut doc);
        assert_eq!(caster.css_text(), "#box{color: red !important;}");
    }

    #[test]
    fn scene_display_runs_style_actions() {
        let mut doc = Document::new();
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, "id", "hero");
        doc.set_attribute(element, attrs::STYLE_ACTION, "tone == 'warm' ? 'background: red' : ''");

        let mut caster = StyleCaster::new();
        caster
            .defaults_mut()
            .custom_data
            .insert("tone".into(), Value::Str("warm".into()));
        let id = caster.load_document(&mut doc);
        assert_eq!(caster.css_text(), "");

        caster.scene_displayed(id, &mut doc);
        assert_eq!(caster.css_text(), "#hero{background: red !important;}");
        assert_eq!(
            doc.attribute(element, attrs::STYLE_DECLARATION),
            Some("background: red")
        );
    }

    #[test]
    fn falsy_actions_write_nothing() {
        let mut doc = Document::new();
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, "id", "hero");
        doc.set_attribute(element, attrs::STYLE_ACTION, "''");

        let mut caster = StyleCaster::new();
        let id = caster.load_document(&mut doc);
        caster.scene_displayed(id, &mut doc);

        assert_eq!(caster.css_text(), "");
        assert_eq!(doc.attribute(element, attrs::STYLE_DECLARATION), None);
    }

    #[test]
    fn unload_stops_all_reaction() {
        let mut doc = Document::new();
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, "id", "box");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box:width");
        doc.set_style_property(element, "width", "50px");

        let mut caster = StyleCaster::new();
        let id = caster.load_document(&mut doc);
        assert!(caster.unload_document(id, &mut doc));
        assert!(!caster.unload_document(id, &mut doc));
        assert!(!caster.is_loaded(id));

        doc.set_attribute(element, attrs::STYLE_DECLARATION, "color: red");
        doc.set_style_property(element, "width", "70px");
        caster.flush(id, &mut doc);
        assert_eq!(caster.css_text(), "");
        assert_eq!(doc.style_value(doc.root(), "--box-width"), Some("50px"));
    }

    #[test]
    fn programmatic_styles_share_the_sheet() {
        let mut caster = StyleCaster::new();
        caster.set_style("panel", "width: 10px");
        assert_eq!(caster.css_text(), "#panel{width: 10px !important;}");
        assert!(caster.sheet().contains("panel"));

        assert!(caster.remove_style("panel"));
        assert!(!caster.remove_style("panel"));
        assert_eq!(caster.css_text(), "");
    }
}
