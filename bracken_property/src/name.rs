// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute and property name mapping.
//!
//! Host attributes use the `ui5-` prefix and kebab-case; declared properties
//! use camelCase. The two functions here convert between the forms and are
//! exact inverses for names that round-trip (a camelCase name with no
//! consecutive uppercase letters).

use alloc::string::String;

/// The prefix carried by component attributes in host markup.
pub const ATTRIBUTE_PREFIX: &str = "ui5-";

/// Maps a host attribute name to the corresponding property name.
///
/// Strips the `ui5-` prefix if present, then folds kebab-case into
/// camelCase. Returns `None` for names that cannot name a property
/// (empty after stripping, or ending in a dash).
///
/// # Example
///
/// ```rust
/// use bracken_property::attribute_to_property;
///
/// assert_eq!(attribute_to_property("ui5-value-state").as_deref(), Some("valueState"));
/// assert_eq!(attribute_to_property("disabled").as_deref(), Some("disabled"));
/// assert_eq!(attribute_to_property("ui5-"), None);
/// ```
#[must_use]
pub fn attribute_to_property(attribute: &str) -> Option<String> {
    let stripped = attribute.strip_prefix(ATTRIBUTE_PREFIX).unwrap_or(attribute);
    if stripped.is_empty() || stripped.ends_with('-') {
        return None;
    }

    let mut property = String::with_capacity(stripped.len());
    let mut upper_next = false;
    for c in stripped.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            property.extend(c.to_uppercase());
            upper_next = false;
        } else {
            property.push(c);
        }
    }
    Some(property)
}

/// Maps a property name to its host attribute name.
///
/// Expands camelCase to kebab-case without adding the `ui5-` prefix; the
/// caller decides whether the attribute is prefixed.
///
/// # Example
///
/// ```rust
/// use bracken_property::property_to_attribute;
///
/// assert_eq!(property_to_attribute("valueState"), "value-state");
/// assert_eq!(property_to_attribute("disabled"), "disabled");
/// ```
#[must_use]
pub fn property_to_attribute(property: &str) -> String {
    let mut attribute = String::with_capacity(property.len() + 2);
    for c in property.chars() {
        if c.is_uppercase() {
            attribute.push('-');
            attribute.extend(c.to_lowercase());
        } else {
            attribute.push(c);
        }
    }
    attribute
}
