// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Behavior configuration.

use alloc::string::String;
use alloc::vec::Vec;

use crate::expr::CustomData;

/// Engine behavior settings.
///
/// The caster holds one `Defaults` value as its process-wide defaults.
/// Loading a document captures an immutable snapshot, so later changes
/// affect only documents loaded afterwards; the snapshot's custom data
/// seeds the session's live data map.
///
/// # Example
///
/// ```
/// use stylecast::Defaults;
///
/// let mut defaults = Defaults::default();
/// defaults.cast_properties.push("top".into());
/// defaults.scene_selector = Some(".scene".into());
/// ```
#[derive(Clone, Debug)]
pub struct Defaults {
    /// Evaluate `data-style-expression` attributes. On by default.
    pub allow_style_expression: bool,
    /// Evaluate `data-style-action` attributes on scene display. On by
    /// default.
    pub allow_style_action: bool,
    /// Properties cast when a `data-cast-properties` value names none.
    pub cast_properties: Vec<String>,
    /// Selector for the scene container scoping `data-cast-to-target`
    /// lookups. `None` scopes them to the document root.
    pub scene_selector: Option<String>,
    /// Initial custom data for new document sessions.
    pub custom_data: CustomData,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            allow_style_expression: true,
            allow_style_action: true,
            cast_properties: Vec::from([String::from("width"), String::from("height")]),
            scene_selector: None,
            custom_data: CustomData::new(),
        }
    }
}
