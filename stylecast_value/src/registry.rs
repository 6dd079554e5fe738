// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cast values and the named casting-function registry.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;

use hashbrown::HashMap;

/// The result of applying a casting function to a raw style value.
///
/// Rendered with [`fmt::Display`] when written into a custom property.
/// Floats print in their shortest round-trip form, so `50.0` renders as
/// `50`, matching what authors expect from numeric casts.
#[derive(Clone, Debug, PartialEq)]
pub enum CastValue {
    /// A whole number, e.g. from the `int` cast.
    Int(i64),
    /// A floating-point number, e.g. from the `float` cast.
    Float(f64),
    /// Text, either passed through verbatim or produced by a cast.
    Str(String),
}

impl fmt::Display for CastValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

/// A registered casting function.
pub type CastFn = Box<dyn Fn(&str) -> CastValue>;

/// Name → casting function table.
///
/// [`CastRegistry::new`] seeds the three built-in casts:
///
/// - `int`: longest leading integer prefix of the value, sign included.
/// - `float`: longest leading number prefix, fraction and exponent included.
/// - `string`: wraps the value in double quotes.
///
/// Registering a name again overwrites the previous entry; entries are
/// never removed. Resolving through an unregistered name passes the raw
/// value through unchanged.
///
/// # Example
///
/// ```
/// use stylecast_value::{CastRegistry, CastValue};
///
/// let mut registry = CastRegistry::new();
/// assert_eq!(registry.resolve("int", "50px"), CastValue::Int(50));
/// assert_eq!(registry.resolve("nonesuch", "50px"), CastValue::Str("50px".into()));
///
/// registry.register("upper", |v| CastValue::Str(v.to_uppercase()));
/// assert_eq!(registry.resolve("upper", "5em"), CastValue::Str("5EM".into()));
/// ```
pub struct CastRegistry {
    casts: HashMap<String, CastFn>,
}

impl Default for CastRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CastRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CastRegistry")
            .field("len", &self.casts.len())
            .finish_non_exhaustive()
    }
}

impl CastRegistry {
    /// Creates a registry seeded with the `int`, `float`, and `string`
    /// built-ins.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            casts: HashMap::new(),
        };
        registry.register("int", cast_int);
        registry.register("float", cast_float);
        registry.register("string", |value| {
            CastValue::Str(format!("\"{value}\""))
        });
        registry
    }

    /// Registers `cast` under `name`, overwriting any previous entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        cast: impl Fn(&str) -> CastValue + 'static,
    ) {
        self.casts.insert(name.into(), Box::new(cast));
    }

    /// Returns `true` if a cast is registered under `name`.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.casts.contains_key(name)
    }

    /// Applies the cast registered under `name` to `value`.
    ///
    /// An unregistered name passes `value` through as [`CastValue::Str`].
    #[must_use]
    pub fn resolve(&self, name: &str, value: &str) -> CastValue {
        match self.casts.get(name) {
            Some(cast) => cast(value),
            None => CastValue::Str(value.to_string()),
        }
    }
}

/// The `int` built-in: parses the longest leading integer prefix after
/// trimming. Values with no such prefix, or outside the `i64` range, pass
/// through raw.
fn cast_int(value: &str) -> CastValue {
    let trimmed = value.trim_start();
    let prefix = number_prefix(trimmed, false);
    match prefix.parse::<i64>() {
        Ok(v) => CastValue::Int(v),
        Err(_) => CastValue::Str(value.to_string()),
    }
}

/// The `float` built-in: parses the longest leading number prefix after
/// trimming, fraction and exponent included. Values with no such prefix
/// pass through raw.
fn cast_float(value: &str) -> CastValue {
    let trimmed = value.trim_start();
    let prefix = number_prefix(trimmed, true);
    match prefix.parse::<f64>() {
        Ok(v) => CastValue::Float(v),
        Err(_) => CastValue::Str(value.to_string()),
    }
}

/// Returns the longest prefix of `s` shaped like a number: optional sign,
/// digits, and (when `float`) an optional fraction and exponent.
fn number_prefix(s: &str, float: bool) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let mut saw_digit = false;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
        saw_digit = true;
    }
    if float {
        if bytes.get(end) == Some(&b'.') {
            let mut frac = end + 1;
            while bytes.get(frac).is_some_and(u8::is_ascii_digit) {
                frac += 1;
                saw_digit = true;
            }
            if saw_digit {
                end = frac;
            }
        }
        if saw_digit && matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            let digits_start = exp;
            while bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                exp += 1;
            }
            if exp > digits_start {
                end = exp;
            }
        }
    }
    if saw_digit { &s[..end] } else { "" }
}
