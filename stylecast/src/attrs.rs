// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The attribute names the engine observes and writes.

/// Static CSS declaration text, applied to the shared sheet by element id.
pub const STYLE_DECLARATION: &str = "data-style-declaration";

/// Expression whose truthy result extends the declaration text.
pub const STYLE_EXPRESSION: &str = "data-style-expression";

/// Expression evaluated when a scene is displayed; a truthy result is
/// written back as the declaration attribute.
pub const STYLE_ACTION: &str = "data-style-action";

/// `name[:props]` casting spec enabling variable mirroring.
pub const CAST_PROPERTIES: &str = "data-cast-properties";

/// Selector choosing an ancestor-or-self as the variable target.
pub const CAST_TO_CLOSEST: &str = "data-cast-to-closest";

/// Selector narrowing the target within the scene container.
pub const CAST_TO_TARGET: &str = "data-cast-to-target";

/// Inheritable variable-name prefix for a subtree.
pub const CAST_BASENAME: &str = "data-cast-basename";
