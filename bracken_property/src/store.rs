// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-instance property state.
//!
//! This module provides [`StateStore`], the mutable name → value mapping each
//! component instance owns, and the generic accessor dispatch that validates,
//! coerces, and diffs incoming writes.
//!
//! # Implementation
//!
//! A sorted vector with binary search rather than a hash map: better cache
//! locality, lower memory overhead, and O(log n) lookup, which is fast for
//! typical property counts (5-20). The first 8 entries are stored inline via
//! `SmallVec`.
//!
//! # Scope
//!
//! The store never schedules anything itself. [`StateStore::set`] reports a
//! [`SetOutcome`]; the caller is responsible for requesting invalidation and
//! emitting the change notification when the outcome is
//! [`SetOutcome::Changed`].

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;

use crate::descriptor::ClassDescriptor;
use crate::id::NodeKey;
use crate::metadata::ValueKind;
use crate::value::Value;

/// Default inline capacity for state entries.
///
/// Most components declare fewer than 8 properties and slots, so this avoids
/// heap allocation in the common case.
const INLINE_CAPACITY: usize = 8;

const EMPTY: &[Value] = &[];

/// The result of a successful [`StateStore::set`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetOutcome {
    /// The coerced value equals the stored value; nothing happened.
    Unchanged,
    /// The value was stored. The caller must request invalidation and emit
    /// the property-changed notification.
    Changed {
        /// The declared property name.
        name: &'static str,
    },
}

/// An error raised by the accessor layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateError {
    /// The value could not be coerced to the declared kind, or the property's
    /// validator rejected it. The stored value is unchanged.
    Validation {
        /// The declared property name.
        name: &'static str,
        /// The declared kind.
        kind: ValueKind,
    },
    /// Slot-backed properties are distributed from host children and cannot
    /// be assigned directly.
    SlotAssignment {
        /// The backing property name.
        name: &'static str,
    },
    /// No property with this name is declared on the class.
    UnknownProperty {
        /// The requested name.
        name: String,
    },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { name, kind } => {
                write!(f, "invalid value for {kind:?} property '{name}'")
            }
            Self::SlotAssignment { name } => {
                write!(f, "slot property '{name}' cannot be assigned directly")
            }
            Self::UnknownProperty { name } => write!(f, "unknown property '{name}'"),
        }
    }
}

impl core::error::Error for StateError {}

/// Per-instance property and slot state.
///
/// Created from a class's default snapshot — a value copy, never an alias, so
/// every instance mutates independently. The store is fully seeded: every
/// declared property and every slot backing property has an entry from
/// construction, so reads never fall back to the descriptor.
///
/// # Example
///
/// ```rust
/// use bracken_property::{
///     ClassDeclaration, ClassRegistry, PropertySpec, SetOutcome, Value,
/// };
///
/// let mut registry = ClassRegistry::new();
/// let class = registry
///     .declare(ClassDeclaration::new("Badge").property("text", PropertySpec::text("")))
///     .unwrap();
///
/// let descriptor = registry.descriptor(class).unwrap();
/// let mut state = registry.new_instance_state(class).unwrap();
///
/// assert_eq!(state.get("text"), Some(&Value::Text("".into())));
///
/// let descriptor = registry.descriptor(class).unwrap();
/// let outcome = state.set(descriptor, "text", Value::from("new")).unwrap();
/// assert_eq!(outcome, SetOutcome::Changed { name: "text" });
///
/// // Writing the same value again is a no-op.
/// let outcome = state.set(descriptor, "text", Value::from("new")).unwrap();
/// assert_eq!(outcome, SetOutcome::Unchanged);
/// ```
#[derive(Clone, Debug)]
pub struct StateStore {
    /// Entries sorted by name for binary search lookup.
    entries: SmallVec<[(&'static str, Value); INLINE_CAPACITY]>,
}

impl StateStore {
    /// Builds the default snapshot for a class: every property seeded with
    /// its declared default, every slot backing property with an empty
    /// sequence.
    #[must_use]
    pub fn default_snapshot(descriptor: &ClassDescriptor) -> Self {
        let mut entries: SmallVec<[(&'static str, Value); INLINE_CAPACITY]> = descriptor
            .properties()
            .map(|(name, spec)| (name, spec.default_value().clone()))
            .collect();
        entries.extend(
            descriptor
                .slots()
                .map(|slot| (slot.backing_property(), Value::empty_seq())),
        );
        entries.sort_unstable_by_key(|(name, _)| *name);
        Self { entries }
    }

    /// Returns the number of entries (properties plus slot backing
    /// properties).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the class declares no properties or slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    fn find(&self, name: &str) -> Result<usize, usize> {
        self.entries.binary_search_by(|(entry, _)| (*entry).cmp(name))
    }

    /// Returns the current value of a property or slot backing property.
    ///
    /// Returns `None` only for names the class does not declare; declared
    /// entries always hold at least their default.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.find(name).ok().map(|idx| &self.entries[idx].1)
    }

    /// Returns the distributed children of a slot backing property, in
    /// document order. Empty for unknown names.
    #[must_use]
    pub fn slot_values(&self, property_name: &str) -> &[Value] {
        self.get(property_name)
            .and_then(Value::as_seq)
            .unwrap_or(EMPTY)
    }

    /// Returns the distributed child node keys of a slot backing property,
    /// in document order.
    pub fn slot_children(&self, property_name: &str) -> impl Iterator<Item = NodeKey> + '_ {
        self.slot_values(property_name)
            .iter()
            .filter_map(Value::as_node)
    }

    /// The generic set dispatcher.
    ///
    /// Coerces `value` per the property's declared kind, runs its validator,
    /// and diffs against the stored value using shallow equality. A write of
    /// an equal value reports [`SetOutcome::Unchanged`] and has no other
    /// effect. Slot-backed properties reject with
    /// [`StateError::SlotAssignment`] — slots are driven by distribution,
    /// not by assignment.
    ///
    /// # Panics
    ///
    /// Panics if `descriptor` belongs to a different class than the one this
    /// store was seeded from: the store holds an entry for every property
    /// that descriptor declares, and no others.
    pub fn set(
        &mut self,
        descriptor: &ClassDescriptor,
        name: &str,
        value: Value,
    ) -> Result<SetOutcome, StateError> {
        if let Some(slot) = descriptor.slot_for_property(name) {
            return Err(StateError::SlotAssignment {
                name: slot.backing_property(),
            });
        }
        let Some((declared_name, spec)) = descriptor.property_entry(name) else {
            return Err(StateError::UnknownProperty {
                name: name.to_string(),
            });
        };

        let coerced = spec.coerce(value).ok_or(StateError::Validation {
            name: declared_name,
            kind: spec.kind(),
        })?;

        let idx = match self.find(declared_name) {
            Ok(idx) => idx,
            // The store is seeded with every declared property.
            Err(_) => unreachable!("seeded store missing declared property"),
        };
        if self.entries[idx].1 == coerced {
            return Ok(SetOutcome::Unchanged);
        }
        self.entries[idx].1 = coerced;
        Ok(SetOutcome::Changed {
            name: declared_name,
        })
    }

    /// Writes a slot's distributed children. Used by the distributor only;
    /// external assignment goes through [`StateStore::set`] and is rejected
    /// there.
    ///
    /// Returns `true` if the stored sequence changed.
    pub fn set_slot_children(
        &mut self,
        property_name: &'static str,
        children: Vec<NodeKey>,
    ) -> bool {
        let value = Value::nodes(children);
        match self.find(property_name) {
            Ok(idx) => {
                if self.entries[idx].1 == value {
                    false
                } else {
                    self.entries[idx].1 = value;
                    true
                }
            }
            Err(_) => false,
        }
    }

    /// Resets a slot backing property to the empty sequence.
    ///
    /// Returns `true` if the stored sequence was non-empty.
    pub fn clear_slot(&mut self, property_name: &str) -> bool {
        match self.find(property_name) {
            Ok(idx) => {
                if self.entries[idx].1 == Value::empty_seq() {
                    false
                } else {
                    self.entries[idx].1 = Value::empty_seq();
                    true
                }
            }
            Err(_) => false,
        }
    }

    /// Returns an iterator over all entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.entries.iter().map(|(name, value)| (*name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ClassDeclaration;
    use crate::metadata::{PropertySpec, SlotSpec};
    use alloc::vec;

    fn descriptor() -> ClassDescriptor {
        let decl = ClassDeclaration::new("Panel")
            .property("headerText", PropertySpec::text(""))
            .property("collapsed", PropertySpec::boolean())
            .property("height", PropertySpec::integer(0))
            .slot(SlotSpec::new("default").property_name("content"));
        ClassDescriptor::from_chain(&[&decl]).unwrap()
    }

    #[test]
    fn snapshot_seeds_every_entry() {
        let descriptor = descriptor();
        let state = StateStore::default_snapshot(&descriptor);

        assert_eq!(state.len(), 4);
        assert_eq!(state.get("collapsed"), Some(&Value::Bool(false)));
        assert_eq!(state.get("headerText"), Some(&Value::Text("".into())));
        assert_eq!(state.get("content"), Some(&Value::empty_seq()));
        assert_eq!(state.get("missing"), None);
    }

    #[test]
    fn snapshot_copies_do_not_alias() {
        let descriptor = descriptor();
        let snapshot = StateStore::default_snapshot(&descriptor);
        let mut a = snapshot.clone();
        let b = snapshot.clone();

        a.set(&descriptor, "height", Value::Int(10)).unwrap();
        assert_eq!(a.get("height"), Some(&Value::Int(10)));
        assert_eq!(b.get("height"), Some(&Value::Int(0)));
    }

    #[test]
    fn set_changed_and_unchanged() {
        let descriptor = descriptor();
        let mut state = StateStore::default_snapshot(&descriptor);

        assert_eq!(
            state.set(&descriptor, "collapsed", Value::Bool(true)).unwrap(),
            SetOutcome::Changed { name: "collapsed" }
        );
        assert_eq!(
            state.set(&descriptor, "collapsed", Value::Bool(true)).unwrap(),
            SetOutcome::Unchanged
        );
    }

    #[test]
    fn set_coerces_before_diffing() {
        let descriptor = descriptor();
        let mut state = StateStore::default_snapshot(&descriptor);

        state.set(&descriptor, "height", Value::Int(42)).unwrap();
        // "42" coerces to 42, which equals the stored value.
        assert_eq!(
            state
                .set(&descriptor, "height", Value::Text("42".into()))
                .unwrap(),
            SetOutcome::Unchanged
        );
    }

    #[test]
    fn rejected_write_leaves_state_unchanged() {
        let descriptor = descriptor();
        let mut state = StateStore::default_snapshot(&descriptor);
        state
            .set(&descriptor, "headerText", Value::from("kept"))
            .unwrap();

        let err = state
            .set(&descriptor, "height", Value::Text("abc".into()))
            .unwrap_err();
        assert_eq!(
            err,
            StateError::Validation {
                name: "height",
                kind: ValueKind::Integer,
            }
        );
        assert_eq!(state.get("height"), Some(&Value::Int(0)));
        assert_eq!(state.get("headerText"), Some(&Value::Text("kept".into())));
    }

    #[test]
    fn slot_assignment_rejected() {
        let descriptor = descriptor();
        let mut state = StateStore::default_snapshot(&descriptor);

        let err = state
            .set(&descriptor, "content", Value::empty_seq())
            .unwrap_err();
        assert_eq!(err, StateError::SlotAssignment { name: "content" });
    }

    #[test]
    fn unknown_property_rejected() {
        let descriptor = descriptor();
        let mut state = StateStore::default_snapshot(&descriptor);

        let err = state.set(&descriptor, "nope", Value::Int(1)).unwrap_err();
        assert_eq!(
            err,
            StateError::UnknownProperty {
                name: "nope".to_string()
            }
        );
    }

    #[test]
    fn slot_children_write_and_read() {
        let descriptor = descriptor();
        let mut state = StateStore::default_snapshot(&descriptor);

        let keys = vec![NodeKey::new(3), NodeKey::new(1), NodeKey::new(2)];
        assert!(state.set_slot_children("content", keys.clone()));
        let read: Vec<_> = state.slot_children("content").collect();
        assert_eq!(read, keys);

        // Same children again: unchanged.
        assert!(!state.set_slot_children("content", keys));

        assert!(state.clear_slot("content"));
        assert!(!state.clear_slot("content"));
        assert_eq!(state.slot_values("content"), &[] as &[Value]);
    }

    #[test]
    #[should_panic(expected = "seeded store missing declared property")]
    fn mismatched_descriptor_panics() {
        let mut state = StateStore::default_snapshot(&descriptor());

        let other = ClassDeclaration::new("Other").property("zzz", PropertySpec::text(""));
        let other = ClassDescriptor::from_chain(&[&other]).unwrap();
        let _ = state.set(&other, "zzz", Value::from("x"));
    }

    #[test]
    fn text_round_trip() {
        let descriptor = descriptor();
        let mut state = StateStore::default_snapshot(&descriptor);

        let value = "exact value — no coercion loss";
        state
            .set(&descriptor, "headerText", Value::from(value))
            .unwrap();
        assert_eq!(state.get("headerText").unwrap().as_text(), Some(value));
    }
}
