// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mirrors inline style values into CSS custom properties.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::iter;

use stylecast_css::SelectorList;
use stylecast_dom::{Document, NodeId, ObserveOptions};
use stylecast_value::{CastRegistry, CastSpec, PropertySpec, parse_transform};

use crate::attrs;
use crate::caster::Session;
use crate::diag::DiagnosticSink;

/// Recomputes every custom property the element casts.
///
/// The variable stem joins the nearest `data-cast-basename` (ancestor or
/// self) with the local name from `data-cast-properties`; an element with
/// neither casts nothing. Properties come from the descriptor list in the
/// attribute value, falling back to the session's defaults. Each property
/// reads the element's inline style; properties not declared inline fall
/// back to an argument of the same-named function in the inline
/// `transform`. Resolved values are written to the target element's
/// inline style as `--<stem>-<key>`.
pub(crate) fn recompute_casting(
    casts: &CastRegistry,
    sink: &mut dyn DiagnosticSink,
    session: &Session,
    doc: &mut Document,
    element: NodeId,
) {
    let Some(raw) = doc.attribute(element, attrs::CAST_PROPERTIES) else {
        return;
    };
    if raw.trim().is_empty() {
        return;
    }
    let spec = CastSpec::parse(raw);
    let basename = nearest_basename(doc, element);
    let Some(stem) = spec.stem(basename.as_deref()) else {
        return;
    };
    let target = resolve_target(sink, session, doc, element);
    let properties: Vec<PropertySpec> = match spec.properties {
        Some(list) => list.into_vec(),
        None => session
            .cast_properties
            .iter()
            .map(|name| PropertySpec::parse(name))
            .collect(),
    };

    let render = |prop: &PropertySpec, value: &str| -> String {
        match prop.cast.as_deref() {
            Some(cast) => casts.resolve(cast, value).to_string(),
            None => value.to_string(),
        }
    };

    let mut writes: Vec<(String, String)> = Vec::new();
    let mut remaining: Vec<PropertySpec> = Vec::new();
    for prop in properties {
        if let Some(value) = doc.style_value(element, &prop.property) {
            writes.push((format!("--{stem}-{}", prop.variable_key), render(&prop, value)));
        } else {
            remaining.push(prop);
        }
    }
    if !remaining.is_empty()
        && let Some(transform) = doc.style_value(element, "transform")
    {
        for prop in &remaining {
            let argument = parse_transform(&prop.property, transform);
            if argument.is_empty() {
                continue;
            }
            writes.push((format!("--{stem}-{}", prop.variable_key), render(prop, argument)));
        }
    }

    for (name, value) in writes {
        doc.set_style_property(target, &name, &value);
    }
}

/// Removes the element's previous custom properties from the scope its
/// old `data-cast-to-closest` selector resolved to.
pub(crate) fn sweep_previous_scope(
    sink: &mut dyn DiagnosticSink,
    session: &Session,
    doc: &mut Document,
    element: NodeId,
    old_selector: &str,
) {
    let Some(raw) = doc.attribute(element, attrs::CAST_PROPERTIES) else {
        return;
    };
    if raw.trim().is_empty() {
        return;
    }
    let spec = CastSpec::parse(raw);
    let basename = nearest_basename(doc, element);
    let Some(stem) = spec.stem(basename.as_deref()) else {
        return;
    };
    let scope = match parse_selector(sink, element, old_selector) {
        Some(list) => doc.closest(element, &list).unwrap_or(session.root),
        None => session.root,
    };
    strip_variables(doc, scope, &format!("--{stem}"));
}

/// Removes every inline custom property under `scope` (the scope element
/// included) whose name starts with `--<stem>`.
///
/// Casting leaves stale variables behind when an element stops casting or
/// changes its stem; embedders call this to clean up after such moves.
pub fn remove_style_variable(doc: &mut Document, scope: NodeId, stem: &str) {
    strip_variables(doc, scope, &format!("--{stem}"));
}

pub(crate) fn strip_variables(doc: &mut Document, scope: NodeId, prefix: &str) {
    let nodes: Vec<NodeId> = iter::once(scope).chain(doc.descendants(scope)).collect();
    for node in nodes {
        let Some(style) = doc.style(node) else {
            continue;
        };
        let names: Vec<String> = style
            .iter()
            .filter(|declaration| declaration.property.starts_with(prefix))
            .map(|declaration| declaration.property.clone())
            .collect();
        for name in names {
            doc.remove_style_property(node, &name);
        }
    }
}

/// Re-scans the whole document for casting elements: registers the
/// session's cast observer on each (dropping registrations on nodes that
/// left the tree) and recomputes their variables.
pub(crate) fn refresh_tree(
    casts: &CastRegistry,
    sink: &mut dyn DiagnosticSink,
    session: &Session,
    doc: &mut Document,
) {
    let stale: Vec<NodeId> = doc
        .observed_targets(session.cast_observer)
        .into_iter()
        .filter(|target| !doc.is_connected(*target))
        .collect();
    for target in stale {
        doc.unobserve(session.cast_observer, target);
    }

    let casting: Vec<NodeId> = iter::once(session.root)
        .chain(doc.descendants(session.root))
        .filter(|node| doc.attribute(*node, attrs::CAST_PROPERTIES).is_some())
        .collect();
    for element in casting {
        doc.observe(
            session.cast_observer,
            element,
            ObserveOptions::attributes()
                .with_attribute_old_value()
                .with_attribute_filter([
                    "style",
                    attrs::CAST_PROPERTIES,
                    attrs::CAST_TO_CLOSEST,
                    attrs::CAST_TO_TARGET,
                ]),
        );
        recompute_casting(casts, sink, session, doc, element);
    }
}

/// Resolves where the element's variables land.
///
/// `data-cast-to-closest` picks the nearest ancestor-or-self match and
/// wins outright when present. Otherwise the container is the closest
/// scene (when the session has a scene selector) or the root, and
/// `data-cast-to-target` selects a descendant of that container. Every
/// miss or bad selector falls back to the enclosing step's element.
fn resolve_target(
    sink: &mut dyn DiagnosticSink,
    session: &Session,
    doc: &Document,
    element: NodeId,
) -> NodeId {
    if let Some(source) = doc.attribute(element, attrs::CAST_TO_CLOSEST)
        && !source.trim().is_empty()
    {
        return match parse_selector(sink, element, source) {
            Some(list) => doc.closest(element, &list).unwrap_or(session.root),
            None => session.root,
        };
    }
    let container = session
        .scene_selector
        .as_ref()
        .and_then(|list| doc.closest(element, list))
        .unwrap_or(session.root);
    if let Some(source) = doc.attribute(element, attrs::CAST_TO_TARGET)
        && !source.trim().is_empty()
    {
        return match parse_selector(sink, element, source) {
            Some(list) => doc.query_selector(container, &list).unwrap_or(container),
            None => container,
        };
    }
    container
}

fn parse_selector(
    sink: &mut dyn DiagnosticSink,
    element: NodeId,
    source: &str,
) -> Option<SelectorList> {
    match SelectorList::parse(source) {
        Ok(list) => Some(list),
        Err(error) => {
            sink.selector_failed(element, source, &error);
            None
        }
    }
}

/// The value of the nearest `data-cast-basename`, walking from the
/// element up through its ancestors. The first carrier wins, its value
/// taken verbatim even when empty.
fn nearest_basename(doc: &Document, element: NodeId) -> Option<String> {
    let mut current = Some(element);
    while let Some(node) = current {
        if let Some(value) = doc.attribute(node, attrs::CAST_BASENAME) {
            return Some(value.to_string());
        }
        current = doc.parent(node);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    use crate::diag::SilentSink;
    use crate::expr::CustomData;

    fn session_for(doc: &mut Document) -> Session {
        let observer = doc.create_observer();
        Session {
            root: doc.root(),
            style_observer: observer,
            cast_observer: doc.create_observer(),
            basename_observer: observer,
            tree_observer: observer,
            allow_style_expression: true,
            allow_style_action: true,
            cast_properties: Vec::from([String::from("width"), String::from("height")]),
            scene_selector: None,
            custom_data: CustomData::new(),
        }
    }

    fn child_of(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
        let node = doc.create_element(tag);
        doc.append_child(parent, node).unwrap();
        node
    }

    #[test]
    fn casts_default_properties_to_the_root() {
        let mut doc = Document::new();
        let session = session_for(&mut doc);
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box");
        doc.set_style_property(element, "width", "50px");

        recompute_casting(&CastRegistry::new(), &mut SilentSink, &session, &mut doc, element);

        assert_eq!(doc.style_value(doc.root(), "--box-width"), Some("50px"));
        assert_eq!(doc.style_value(doc.root(), "--box-height"), None);
    }

    #[test]
    fn basename_prefixes_the_stem() {
        let mut doc = Document::new();
        let session = session_for(&mut doc);
        let root = doc.root();
        let scene = child_of(&mut doc, root, "section");
        let element = child_of(&mut doc, scene, "div");
        doc.set_attribute(scene, attrs::CAST_BASENAME, "hero");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box:width");
        doc.set_style_property(element, "width", "50px");

        recompute_casting(&CastRegistry::new(), &mut SilentSink, &session, &mut doc, element);

        assert_eq!(doc.style_value(doc.root(), "--hero-box-width"), Some("50px"));
    }

    #[test]
    fn descriptor_casts_rename_the_variable_key() {
        let mut doc = Document::new();
        let session = session_for(&mut doc);
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box:(int) width");
        doc.set_style_property(element, "width", "50px");

        recompute_casting(&CastRegistry::new(), &mut SilentSink, &session, &mut doc, element);

        assert_eq!(doc.style_value(doc.root(), "--box-width-int"), Some("50"));
        assert_eq!(doc.style_value(doc.root(), "--box-width"), None);
    }

    #[test]
    fn transform_arguments_back_missing_properties() {
        let mut doc = Document::new();
        let session = session_for(&mut doc);
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box:translateX");
        doc.set_style_property(element, "transform", "scale(2) translateX(4px)");

        recompute_casting(&CastRegistry::new(), &mut SilentSink, &session, &mut doc, element);

        assert_eq!(doc.style_value(doc.root(), "--box-translateX"), Some("4px"));
    }

    #[test]
    fn closest_target_beats_the_scene_container() {
        let mut doc = Document::new();
        let mut session = session_for(&mut doc);
        session.scene_selector = Some(SelectorList::parse(".scene").unwrap());
        let root = doc.root();
        let scene = child_of(&mut doc, root, "section");
        doc.set_attribute(scene, "class", "scene");
        let card = child_of(&mut doc, scene, "div");
        doc.set_attribute(card, "class", "card");
        let element = child_of(&mut doc, card, "span");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box");
        doc.set_attribute(element, attrs::CAST_TO_CLOSEST, ".card");
        doc.set_style_property(element, "width", "50px");

        recompute_casting(&CastRegistry::new(), &mut SilentSink, &session, &mut doc, element);

        assert_eq!(doc.style_value(card, "--box-width"), Some("50px"));
        assert_eq!(doc.style_value(scene, "--box-width"), None);
        assert_eq!(doc.style_value(doc.root(), "--box-width"), None);
    }

    #[test]
    fn target_selector_picks_inside_the_container() {
        let mut doc = Document::new();
        let mut session = session_for(&mut doc);
        session.scene_selector = Some(SelectorList::parse(".scene").unwrap());
        let root = doc.root();
        let scene = child_of(&mut doc, root, "section");
        doc.set_attribute(scene, "class", "scene");
        let sibling = child_of(&mut doc, scene, "aside");
        doc.set_attribute(sibling, "id", "panel");
        let element = child_of(&mut doc, scene, "div");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box");
        doc.set_attribute(element, attrs::CAST_TO_TARGET, "#panel");
        doc.set_style_property(element, "width", "50px");

        recompute_casting(&CastRegistry::new(), &mut SilentSink, &session, &mut doc, element);

        assert_eq!(doc.style_value(sibling, "--box-width"), Some("50px"));
        assert_eq!(doc.style_value(scene, "--box-width"), None);
    }

    #[test]
    fn missed_selectors_fall_back() {
        let mut doc = Document::new();
        let session = session_for(&mut doc);
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box");
        doc.set_attribute(element, attrs::CAST_TO_CLOSEST, ".nowhere");
        doc.set_style_property(element, "width", "50px");

        recompute_casting(&CastRegistry::new(), &mut SilentSink, &session, &mut doc, element);

        assert_eq!(doc.style_value(doc.root(), "--box-width"), Some("50px"));
    }

    #[test]
    fn sweep_strips_stem_variables_from_the_old_scope() {
        let mut doc = Document::new();
        let session = session_for(&mut doc);
        let root = doc.root();
        let card = child_of(&mut doc, root, "div");
        doc.set_attribute(card, "class", "card");
        let inner = child_of(&mut doc, card, "span");
        let element = child_of(&mut doc, card, "i");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box");
        doc.set_style_property(card, "--box-width", "50px");
        doc.set_style_property(inner, "--box-height", "2em");
        doc.set_style_property(inner, "--other-width", "1px");

        sweep_previous_scope(&mut SilentSink, &session, &mut doc, element, ".card");

        assert_eq!(doc.style_value(card, "--box-width"), None);
        assert_eq!(doc.style_value(inner, "--box-height"), None);
        assert_eq!(doc.style_value(inner, "--other-width"), Some("1px"));
    }

    #[test]
    fn refresh_tree_observes_and_recomputes_casting_elements() {
        let mut doc = Document::new();
        let session = session_for(&mut doc);
        let root = doc.root();
        let element = child_of(&mut doc, root, "div");
        let plain = child_of(&mut doc, root, "p");
        doc.set_attribute(element, attrs::CAST_PROPERTIES, "box");
        doc.set_style_property(element, "width", "50px");

        refresh_tree(&CastRegistry::new(), &mut SilentSink, &session, &mut doc);

        assert!(doc.is_observing(session.cast_observer, element));
        assert!(!doc.is_observing(session.cast_observer, plain));
        assert_eq!(doc.style_value(doc.root(), "--box-width"), Some("50px"));

        doc.remove(element).unwrap();
        refresh_tree(&CastRegistry::new(), &mut SilentSink, &session, &mut doc);
        assert!(doc.observed_targets(session.cast_observer).is_empty());
    }
}
