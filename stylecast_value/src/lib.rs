// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stylecast Value: casting functions and casting-spec parsing.
//!
//! The pieces that turn raw style text into typed custom-property values:
//!
//! - **Cast registry** ([`CastRegistry`], [`CastValue`]): named
//!   string-to-value functions, seeded with `int`, `float`, and `string`
//!   and extensible at runtime. Lookups through an unregistered name pass
//!   the value through unchanged.
//! - **Casting specs** ([`CastSpec`], [`PropertySpec`]): the parsed form
//!   of a `name[:prop,(fn) prop,...]` casting attribute, including the
//!   variable-key naming each descriptor produces and the basename-prefix
//!   stem rule.
//! - **Transform scanner** ([`parse_transform`]): extracts one function
//!   call's argument from a `transform` value by name, with no general
//!   value parsing.
//!
//! ## Quick Start
//!
//! ```
//! use stylecast_value::{CastRegistry, CastSpec, CastValue, parse_transform};
//!
//! let registry = CastRegistry::new();
//! let spec = CastSpec::parse("box:(int) width");
//! let prop = &spec.properties.as_ref().unwrap()[0];
//!
//! let value = registry.resolve(prop.cast.as_deref().unwrap(), "50px");
//! assert_eq!(value, CastValue::Int(50));
//!
//! // The custom-property name is `--<stem>-<variable key>`.
//! assert_eq!(spec.stem(Some("hero")).unwrap(), "hero-box");
//! assert_eq!(prop.variable_key, "width-int");
//!
//! assert_eq!(parse_transform("rotateY", "rotateY(45deg)"), "45deg");
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod registry;
mod spec;
mod transform;

pub use registry::{CastFn, CastRegistry, CastValue};
pub use spec::{CastSpec, PropertySpec};
pub use transform::parse_transform;
