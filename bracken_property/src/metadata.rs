// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property and slot metadata definitions.
//!
//! This module provides [`PropertySpec`] and [`SlotSpec`], the per-class
//! declarations that [`ClassDescriptor`](crate::ClassDescriptor) merges
//! across an ancestor chain, and [`ListenFor`] for describing which slotted
//! child property changes a parent wants to observe.

use alloc::format;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;

use crate::value::Value;

/// The name of the default slot, used for children without a `slot` attribute.
pub const DEFAULT_SLOT: &str = "default";

/// The declared value type of a property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A boolean. Defaults to `false`, always.
    Boolean,
    /// A text string.
    Text,
    /// A signed integer.
    Integer,
    /// An embedder-defined payload, compared by identity.
    Object,
    /// Any value; validation is left to the property's validator.
    Custom,
}

/// A validation callback applied after kind coercion.
///
/// Returning `false` rejects the assignment: no state change, no
/// invalidation, no notification.
pub type Validator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Metadata for a declared property.
///
/// Built with the kind constructors and chained configuration, then handed to
/// [`ClassDeclaration::property`](crate::ClassDeclaration::property):
///
/// ```rust
/// use bracken_property::{PropertySpec, Value};
///
/// let pressed = PropertySpec::boolean();
/// let header_text = PropertySpec::text("");
/// let level = PropertySpec::integer(0).validator(|v| {
///     v.as_int().is_some_and(|i| (1..=6).contains(&i))
/// });
/// let items = PropertySpec::custom(Value::Null).multiple();
/// ```
#[derive(Clone)]
pub struct PropertySpec {
    kind: ValueKind,
    multiple: bool,
    default: Value,
    validator: Option<Validator>,
}

impl PropertySpec {
    /// Declares a boolean property. The default is `false` and cannot be
    /// anything else.
    #[must_use]
    pub fn boolean() -> Self {
        Self {
            kind: ValueKind::Boolean,
            multiple: false,
            default: Value::Bool(false),
            validator: None,
        }
    }

    /// Declares a text property with the given default.
    #[must_use]
    pub fn text(default: &str) -> Self {
        Self {
            kind: ValueKind::Text,
            multiple: false,
            default: Value::Text(default.to_string()),
            validator: None,
        }
    }

    /// Declares an integer property with the given default.
    #[must_use]
    pub fn integer(default: i64) -> Self {
        Self {
            kind: ValueKind::Integer,
            multiple: false,
            default: Value::Int(default),
            validator: None,
        }
    }

    /// Declares an object property. The default is [`Value::Null`].
    #[must_use]
    pub fn object() -> Self {
        Self {
            kind: ValueKind::Object,
            multiple: false,
            default: Value::Null,
            validator: None,
        }
    }

    /// Declares a custom-typed property with the given default.
    #[must_use]
    pub fn custom(default: Value) -> Self {
        Self {
            kind: ValueKind::Custom,
            multiple: false,
            default,
            validator: None,
        }
    }

    /// Marks the property as holding an ordered sequence of values.
    ///
    /// The default becomes the empty sequence; individual elements are
    /// coerced per the declared kind.
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self.default = Value::empty_seq();
        self
    }

    /// Overrides the default value.
    ///
    /// The override is validated when the class descriptor is built: it must
    /// match the declared kind, and boolean properties may only default to
    /// `false`.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    /// Sets a validation callback, run after kind coercion.
    #[must_use]
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Returns the declared value kind.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns whether this property holds an ordered sequence.
    #[must_use]
    #[inline]
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Returns the default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Returns whether a validator is set.
    #[must_use]
    #[inline]
    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Coerces a proposed value to this property's kind.
    ///
    /// Returns `None` if the value cannot represent the declared kind or if
    /// the validator rejects it. The coercion table is intentionally small:
    ///
    /// - `Boolean`: booleans pass through; `"true"`/`""`/`"false"` text and
    ///   `0`/`1` integers convert; everything else is rejected.
    /// - `Integer`: integers pass through; text is parsed as a base-10 `i64`.
    /// - `Text`: text passes through; booleans and integers are formatted.
    /// - `Object`: objects and [`Value::Null`] pass through.
    /// - `Custom`: anything passes through to the validator.
    ///
    /// For `multiple` properties the value must be a [`Value::Seq`] and every
    /// element is coerced individually.
    #[must_use]
    pub fn coerce(&self, value: Value) -> Option<Value> {
        let coerced = if self.multiple {
            let Value::Seq(items) = value else {
                return None;
            };
            let items: Option<Vec<Value>> =
                items.into_iter().map(|item| self.coerce_single(item)).collect();
            Value::Seq(items?)
        } else {
            self.coerce_single(value)?
        };

        if let Some(validator) = &self.validator
            && !validator(&coerced)
        {
            return None;
        }
        Some(coerced)
    }

    fn coerce_single(&self, value: Value) -> Option<Value> {
        match self.kind {
            ValueKind::Boolean => match value {
                Value::Bool(_) => Some(value),
                Value::Text(s) => match s.as_str() {
                    "true" | "" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    _ => None,
                },
                Value::Int(0) => Some(Value::Bool(false)),
                Value::Int(1) => Some(Value::Bool(true)),
                _ => None,
            },
            ValueKind::Integer => match value {
                Value::Int(_) => Some(value),
                Value::Text(s) => s.trim().parse::<i64>().ok().map(Value::Int),
                _ => None,
            },
            ValueKind::Text => match value {
                Value::Text(_) => Some(value),
                Value::Bool(b) => Some(Value::Text(format!("{b}"))),
                Value::Int(i) => Some(Value::Text(format!("{i}"))),
                _ => None,
            },
            ValueKind::Object => match value {
                Value::Object(_) | Value::Null => Some(value),
                _ => None,
            },
            ValueKind::Custom => Some(value),
        }
    }
}

// Manual Debug impl since validators aren't Debug
impl fmt::Debug for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySpec")
            .field("kind", &self.kind)
            .field("multiple", &self.multiple)
            .field("default", &self.default)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// Which properties of a slotted child a parent observes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Observed {
    /// Every property of the child.
    All,
    /// Only the named properties.
    Named(HashSet<&'static str>),
}

/// A parent's interest in property changes of children in a slot.
///
/// A change to property `p` of a watched child re-invalidates the parent when
/// `p` is observed (explicitly named, or anything under [`Observed::All`])
/// and not excluded.
///
/// ```rust
/// use bracken_property::ListenFor;
///
/// let interest = ListenFor::all().exclude(["busy"]);
/// assert!(interest.matches("text"));
/// assert!(!interest.matches("busy"));
///
/// let narrow = ListenFor::props(["selected", "text"]);
/// assert!(narrow.matches("selected"));
/// assert!(!narrow.matches("icon"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenFor {
    observed: Observed,
    exclude: HashSet<&'static str>,
}

impl ListenFor {
    /// Observes every property of the child.
    #[must_use]
    pub fn all() -> Self {
        Self {
            observed: Observed::All,
            exclude: HashSet::new(),
        }
    }

    /// Observes only the named properties.
    #[must_use]
    pub fn props(names: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            observed: Observed::Named(names.into_iter().collect()),
            exclude: HashSet::new(),
        }
    }

    /// Excludes the named properties from observation.
    #[must_use]
    pub fn exclude(mut self, names: impl IntoIterator<Item = &'static str>) -> Self {
        self.exclude.extend(names);
        self
    }

    /// Returns whether a change to `property` should reach the parent.
    #[must_use]
    pub fn matches(&self, property: &str) -> bool {
        if self.exclude.contains(property) {
            return false;
        }
        match &self.observed {
            Observed::All => true,
            Observed::Named(names) => names.contains(property),
        }
    }

    /// Returns the observed property set.
    #[must_use]
    pub fn observed(&self) -> &Observed {
        &self.observed
    }
}

/// Metadata for a declared slot.
///
/// A slot is a named channel through which host children are distributed
/// into the component's state. Each slot is backed by a sequence-valued
/// property (named after the slot unless overridden).
///
/// ```rust
/// use bracken_property::{ListenFor, SlotSpec};
///
/// let items = SlotSpec::new("items")
///     .accepted_type("x-list-item")
///     .individual_slots()
///     .listen_for(ListenFor::props(["selected"]));
///
/// let default = SlotSpec::new("default").property_name("content").raw_text();
/// ```
#[derive(Clone, Debug)]
pub struct SlotSpec {
    name: &'static str,
    property_name: &'static str,
    accepted_type: Option<&'static str>,
    individual: bool,
    raw_text: bool,
    listen_for: Option<ListenFor>,
}

impl SlotSpec {
    /// Declares a slot with the given name, backed by a property of the same
    /// name.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            property_name: name,
            accepted_type: None,
            individual: false,
            raw_text: false,
            listen_for: None,
        }
    }

    /// Overrides the name of the backing property.
    #[must_use]
    pub fn property_name(mut self, name: &'static str) -> Self {
        self.property_name = name;
        self
    }

    /// Requires distributed children to satisfy the given host type.
    ///
    /// The meaning of the type string is up to the host adapter (typically a
    /// custom-element tag name or interface marker).
    #[must_use]
    pub fn accepted_type(mut self, accepted: &'static str) -> Self {
        self.accepted_type = Some(accepted);
        self
    }

    /// Gives each distributed child its own addressable sub-slot, numbered
    /// sequentially from 1 in document order.
    #[must_use]
    pub fn individual_slots(mut self) -> Self {
        self.individual = true;
        self
    }

    /// Accepts raw text nodes (only meaningful on the default slot).
    #[must_use]
    pub fn raw_text(mut self) -> Self {
        self.raw_text = true;
        self
    }

    /// Observes property changes of distributed children.
    #[must_use]
    pub fn listen_for(mut self, interest: ListenFor) -> Self {
        self.listen_for = Some(interest);
        self
    }

    /// Returns the slot name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the name of the backing property.
    #[must_use]
    #[inline]
    pub fn backing_property(&self) -> &'static str {
        self.property_name
    }

    /// Returns the accepted host type, if constrained.
    #[must_use]
    #[inline]
    pub fn accepted(&self) -> Option<&'static str> {
        self.accepted_type
    }

    /// Returns whether children get individually addressable sub-slots.
    #[must_use]
    #[inline]
    pub fn has_individual_slots(&self) -> bool {
        self.individual
    }

    /// Returns whether raw text nodes are accepted.
    #[must_use]
    #[inline]
    pub fn accepts_raw_text(&self) -> bool {
        self.raw_text
    }

    /// Returns the child-change interest, if declared.
    #[must_use]
    #[inline]
    pub fn listened(&self) -> Option<&ListenFor> {
        self.listen_for.as_ref()
    }

    /// Returns whether this is the default slot.
    #[must_use]
    #[inline]
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_SLOT
    }
}
