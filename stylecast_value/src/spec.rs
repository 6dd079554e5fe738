// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Casting specs: the parsed form of a `data-cast-properties` value.

use alloc::format;
use alloc::string::String;

use smallvec::SmallVec;

/// One property descriptor from a casting spec: a bare property name, or
/// `(castFn) propertyName`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertySpec {
    /// The casting function name, when one was written in parentheses.
    pub cast: Option<String>,
    /// The CSS property to read.
    pub property: String,
    /// The trailing piece of the custom-property name this descriptor
    /// produces: `property`, or `property-castFn` when a cast is named.
    pub variable_key: String,
}

impl PropertySpec {
    /// Parses a single descriptor.
    ///
    /// Hyphenated names are accepted on both sides: `(int) margin-top`
    /// reads `margin-top` and writes under `margin-top-int`. Text that
    /// does not follow the parenthesized shape is taken whole as a bare
    /// property name; a descriptor naming no real property simply never
    /// matches a style value.
    #[must_use]
    pub fn parse(descriptor: &str) -> Self {
        let descriptor = descriptor.trim();
        if let Some(rest) = descriptor.strip_prefix('(')
            && let Some((cast, property)) = rest.split_once(')')
        {
            let cast = cast.trim();
            let property = property.trim();
            if !cast.is_empty() && !property.is_empty() {
                return Self {
                    cast: Some(String::from(cast)),
                    property: String::from(property),
                    variable_key: format!("{property}-{cast}"),
                };
            }
        }
        Self {
            cast: None,
            property: String::from(descriptor),
            variable_key: String::from(descriptor),
        }
    }
}

/// The parsed value of a casting attribute: `name[:propList]`.
///
/// # Example
///
/// ```
/// use stylecast_value::CastSpec;
///
/// let spec = CastSpec::parse("box:(int) width, height");
/// assert_eq!(spec.local_name, "box");
/// let props = spec.properties.as_ref().unwrap();
/// assert_eq!(props.len(), 2);
/// assert_eq!(props[0].variable_key, "width-int");
/// assert_eq!(props[1].property, "height");
///
/// // Without a property list the configured defaults apply.
/// assert!(CastSpec::parse("box").properties.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastSpec {
    /// The local variable name; may be empty when the element relies
    /// entirely on an inherited basename.
    pub local_name: String,
    /// The descriptors, or `None` when the configured default property
    /// list applies. `Some` but empty (a list of only blanks) casts
    /// nothing.
    pub properties: Option<SmallVec<[PropertySpec; 4]>>,
}

impl CastSpec {
    /// Parses an attribute value of shape `name[:propList]`.
    ///
    /// The property list is split on commas with blanks dropped. A bare
    /// `name:` with nothing after the colon behaves like no list at all.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut parts = value.split(':');
        let local_name = String::from(parts.next().unwrap_or("").trim());
        let properties = match parts.next() {
            None | Some("") => None,
            Some(list) => Some(
                list.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(PropertySpec::parse)
                    .collect(),
            ),
        };
        Self {
            local_name,
            properties,
        }
    }

    /// Joins an inherited basename prefix with the local name to form the
    /// variable stem. Empty pieces are skipped; returns `None` when both
    /// are empty, in which case no variable can be written.
    #[must_use]
    pub fn stem(&self, basename: Option<&str>) -> Option<String> {
        let prefix = basename.map(str::trim).unwrap_or("");
        let local = self.local_name.as_str();
        match (prefix.is_empty(), local.is_empty()) {
            (true, true) => None,
            (false, true) => Some(String::from(prefix)),
            (true, false) => Some(String::from(local)),
            (false, false) => Some(format!("{prefix}-{local}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_property() {
        let spec = PropertySpec::parse("width");
        assert_eq!(spec.cast, None);
        assert_eq!(spec.property, "width");
        assert_eq!(spec.variable_key, "width");
    }

    #[test]
    fn cast_property_with_hyphens() {
        let spec = PropertySpec::parse("(int) margin-top");
        assert_eq!(spec.cast.as_deref(), Some("int"));
        assert_eq!(spec.property, "margin-top");
        assert_eq!(spec.variable_key, "margin-top-int");
    }

    #[test]
    fn malformed_parens_fall_back_to_bare() {
        let spec = PropertySpec::parse("(int width");
        assert_eq!(spec.cast, None);
        assert_eq!(spec.property, "(int width");

        let spec = PropertySpec::parse("() width");
        assert_eq!(spec.cast, None);

        let spec = PropertySpec::parse("(int)");
        assert_eq!(spec.cast, None);
        assert_eq!(spec.property, "(int)");
    }

    #[test]
    fn spec_without_list_uses_defaults() {
        let spec = CastSpec::parse("card");
        assert_eq!(spec.local_name, "card");
        assert!(spec.properties.is_none());

        let spec = CastSpec::parse("card:");
        assert!(spec.properties.is_none());
    }

    #[test]
    fn spec_list_drops_blanks() {
        let spec = CastSpec::parse("card: width, , height ,");
        let props = spec.properties.unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].property, "width");
        assert_eq!(props[1].property, "height");
    }

    #[test]
    fn spec_with_only_blanks_casts_nothing() {
        let spec = CastSpec::parse("card: , ");
        let props = spec.properties.unwrap();
        assert!(props.is_empty());
    }

    #[test]
    fn spec_name_may_be_empty() {
        let spec = CastSpec::parse(":width");
        assert_eq!(spec.local_name, "");
        assert_eq!(spec.properties.unwrap().len(), 1);
    }

    #[test]
    fn stem_joins_non_empty_pieces() {
        let spec = CastSpec::parse("card:width");
        assert_eq!(spec.stem(Some("hero")).as_deref(), Some("hero-card"));
        assert_eq!(spec.stem(Some("  ")).as_deref(), Some("card"));
        assert_eq!(spec.stem(None).as_deref(), Some("card"));

        let anonymous = CastSpec::parse(":width");
        assert_eq!(anonymous.stem(Some("hero")).as_deref(), Some("hero"));
        assert_eq!(anonymous.stem(None), None);
    }
}
