// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Class declarations and merged descriptors.
//!
//! Each component class contributes a [`ClassDeclaration`]: the properties,
//! slots, and events it declares locally. A [`ClassDescriptor`] is the
//! immutable merged view of a whole ancestor chain, built once per class by
//! folding declarations oldest-ancestor-first with subclass entries winning
//! on collision. The merge is pure, idempotent, and order-stable: an
//! overridden entry keeps the position its oldest declarer gave it.

use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};

use crate::id::ClassId;
use crate::metadata::{PropertySpec, SlotSpec, ValueKind};
use crate::value::Value;

/// Names that collide with host-provided attributes and can never be declared
/// as properties or slot backing properties.
pub const RESERVED_NAMES: &[&str] = &[
    "id",
    "class",
    "style",
    "slot",
    "dir",
    "draggable",
    "hidden",
    "lang",
    "tabindex",
    "title",
];

/// An error raised while declaring a class or building its descriptor.
///
/// These are construction-time fatal errors: the class cannot be used until
/// its declaration is fixed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DescriptorError {
    /// A property or slot backing property uses a reserved host name.
    ReservedName {
        /// The offending name.
        name: &'static str,
    },
    /// A boolean property declared a default other than `false`.
    NonFalseBooleanDefault {
        /// The offending property name.
        name: &'static str,
    },
    /// A declared default does not match the property's kind.
    DefaultKindMismatch {
        /// The offending property name.
        name: &'static str,
    },
    /// The same name was declared twice within one class, or a slot's backing
    /// property collides with a declared property.
    DuplicateName {
        /// The offending name.
        name: &'static str,
    },
    /// A [`ClassId`] that the registry has never handed out.
    UnknownClass {
        /// The unknown id.
        id: ClassId,
    },
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedName { name } => {
                write!(f, "'{name}' is a reserved host name")
            }
            Self::NonFalseBooleanDefault { name } => {
                write!(f, "boolean property '{name}' must default to false")
            }
            Self::DefaultKindMismatch { name } => {
                write!(f, "default value of '{name}' does not match its kind")
            }
            Self::DuplicateName { name } => {
                write!(f, "'{name}' is declared more than once")
            }
            Self::UnknownClass { id } => write!(f, "unknown class {id}"),
        }
    }
}

impl core::error::Error for DescriptorError {}

/// One class's locally declared metadata.
///
/// Declarations are cheap descriptions; validation and merging happen when
/// the [`ClassRegistry`](crate::ClassRegistry) builds the class's
/// [`ClassDescriptor`] on first use.
///
/// # Example
///
/// ```rust
/// use bracken_property::{ClassDeclaration, PropertySpec, SlotSpec};
///
/// let decl = ClassDeclaration::new("Button")
///     .property("pressed", PropertySpec::boolean())
///     .property("design", PropertySpec::text("Default"))
///     .slot(SlotSpec::new("default").property_name("text").raw_text())
///     .event("click");
/// ```
#[derive(Clone, Debug)]
pub struct ClassDeclaration {
    name: &'static str,
    parent: Option<ClassId>,
    properties: Vec<(&'static str, PropertySpec)>,
    slots: Vec<SlotSpec>,
    events: Vec<&'static str>,
}

impl ClassDeclaration {
    /// Creates an empty declaration for a class with the given name.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            properties: Vec::new(),
            slots: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Sets the parent class this class extends.
    #[must_use]
    pub fn extends(mut self, parent: ClassId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declares a property.
    #[must_use]
    pub fn property(mut self, name: &'static str, spec: PropertySpec) -> Self {
        self.properties.push((name, spec));
        self
    }

    /// Declares a slot.
    #[must_use]
    pub fn slot(mut self, spec: SlotSpec) -> Self {
        self.slots.push(spec);
        self
    }

    /// Declares an event name.
    #[must_use]
    pub fn event(mut self, name: &'static str) -> Self {
        self.events.push(name);
        self
    }

    /// Returns the class name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the parent class, if any.
    #[must_use]
    #[inline]
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }
}

/// The immutable merged metadata of a component class.
///
/// One descriptor exists per class, built lazily by
/// [`ClassRegistry::descriptor`](crate::ClassRegistry::descriptor) and cached
/// for the registry's lifetime. Property and slot order is
/// oldest-declarer-first, which keeps default-state snapshots and iteration
/// deterministic across runs.
#[derive(Debug)]
pub struct ClassDescriptor {
    class_name: &'static str,
    properties: Vec<(&'static str, PropertySpec)>,
    property_index: HashMap<&'static str, usize>,
    slots: Vec<SlotSpec>,
    slot_index: HashMap<&'static str, usize>,
    slot_by_property: HashMap<&'static str, usize>,
    events: HashSet<&'static str>,
}

impl ClassDescriptor {
    /// Builds a descriptor by folding a declaration chain, oldest ancestor
    /// first.
    ///
    /// Subclass entries override ancestor entries with the same name in
    /// place. Fails on reserved names, duplicate declarations within one
    /// class, boolean defaults other than `false`, and defaults that do not
    /// match their declared kind.
    pub fn from_chain(chain: &[&ClassDeclaration]) -> Result<Self, DescriptorError> {
        let class_name = chain.last().map_or("", |decl| decl.name);

        let mut properties: Vec<(&'static str, PropertySpec)> = Vec::new();
        let mut property_index: HashMap<&'static str, usize> = HashMap::new();
        let mut slots: Vec<SlotSpec> = Vec::new();
        let mut slot_index: HashMap<&'static str, usize> = HashMap::new();
        let mut events: HashSet<&'static str> = HashSet::new();

        for decl in chain {
            let mut seen: HashSet<&'static str> = HashSet::new();

            for (name, spec) in &decl.properties {
                validate_property(name, spec)?;
                if !seen.insert(name) {
                    return Err(DescriptorError::DuplicateName { name });
                }
                match property_index.get(name) {
                    Some(&idx) => properties[idx] = (name, spec.clone()),
                    None => {
                        property_index.insert(name, properties.len());
                        properties.push((name, spec.clone()));
                    }
                }
            }

            for slot in &decl.slots {
                let backing = slot.backing_property();
                if RESERVED_NAMES.contains(&backing) {
                    return Err(DescriptorError::ReservedName { name: backing });
                }
                if !seen.insert(slot.name()) {
                    return Err(DescriptorError::DuplicateName { name: slot.name() });
                }
                match slot_index.get(slot.name()) {
                    Some(&idx) => slots[idx] = slot.clone(),
                    None => {
                        slot_index.insert(slot.name(), slots.len());
                        slots.push(slot.clone());
                    }
                }
            }

            events.extend(decl.events.iter().copied());
        }

        // A slot's backing property must not collide with a declared property.
        let mut slot_by_property: HashMap<&'static str, usize> = HashMap::new();
        for (idx, slot) in slots.iter().enumerate() {
            let backing = slot.backing_property();
            if property_index.contains_key(backing) {
                return Err(DescriptorError::DuplicateName { name: backing });
            }
            if slot_by_property.insert(backing, idx).is_some() {
                return Err(DescriptorError::DuplicateName { name: backing });
            }
        }

        Ok(Self {
            class_name,
            properties,
            property_index,
            slots,
            slot_index,
            slot_by_property,
            events,
        })
    }

    /// Returns the (most-derived) class name.
    #[must_use]
    #[inline]
    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    /// Looks up a declared property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.property_index
            .get(name)
            .map(|&idx| &self.properties[idx].1)
    }

    /// Looks up a declared property by name, returning the `'static`
    /// declared name alongside the spec.
    #[must_use]
    pub fn property_entry(&self, name: &str) -> Option<(&'static str, &PropertySpec)> {
        self.property_index.get(name).map(|&idx| {
            let (declared, spec) = &self.properties[idx];
            (*declared, spec)
        })
    }

    /// Returns an iterator over declared properties in merge order.
    pub fn properties(&self) -> impl Iterator<Item = (&'static str, &PropertySpec)> {
        self.properties.iter().map(|(name, spec)| (*name, spec))
    }

    /// Looks up a declared slot by slot name.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&SlotSpec> {
        self.slot_index.get(name).map(|&idx| &self.slots[idx])
    }

    /// Returns an iterator over declared slots in merge order.
    pub fn slots(&self) -> impl Iterator<Item = &SlotSpec> {
        self.slots.iter()
    }

    /// Returns the default slot, if declared.
    #[must_use]
    pub fn default_slot(&self) -> Option<&SlotSpec> {
        self.slots.iter().find(|slot| slot.is_default())
    }

    /// Looks up the slot backed by the given property name.
    #[must_use]
    pub fn slot_for_property(&self, property_name: &str) -> Option<&SlotSpec> {
        self.slot_by_property
            .get(property_name)
            .map(|&idx| &self.slots[idx])
    }

    /// Returns whether `name` is a slot's backing property.
    #[must_use]
    pub fn is_slot_property(&self, name: &str) -> bool {
        self.slot_by_property.contains_key(name)
    }

    /// Returns whether the class declares the given event.
    #[must_use]
    pub fn has_event(&self, name: &str) -> bool {
        self.events.contains(name)
    }

    /// Returns an iterator over declared event names.
    pub fn events(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.events.iter().copied()
    }
}

fn validate_property(name: &'static str, spec: &PropertySpec) -> Result<(), DescriptorError> {
    if RESERVED_NAMES.contains(&name) {
        return Err(DescriptorError::ReservedName { name });
    }
    if spec.kind() == ValueKind::Boolean
        && !spec.is_multiple()
        && spec.default_value() != &Value::Bool(false)
    {
        return Err(DescriptorError::NonFalseBooleanDefault { name });
    }
    if !default_matches_kind(spec) {
        return Err(DescriptorError::DefaultKindMismatch { name });
    }
    Ok(())
}

fn default_matches_kind(spec: &PropertySpec) -> bool {
    if spec.is_multiple() {
        // The builder resets the default to the empty sequence; anything
        // sequence-shaped is acceptable here.
        return matches!(spec.default_value(), Value::Seq(_));
    }
    match spec.kind() {
        ValueKind::Boolean => matches!(spec.default_value(), Value::Bool(_)),
        ValueKind::Text => matches!(spec.default_value(), Value::Text(_)),
        ValueKind::Integer => matches!(spec.default_value(), Value::Int(_)),
        ValueKind::Object => matches!(spec.default_value(), Value::Object(_) | Value::Null),
        ValueKind::Custom => true,
    }
}
