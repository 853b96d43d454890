// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bracken Property: Class descriptors and per-instance component state.
//!
//! This crate provides the class-level and instance-level data model of the
//! Bracken component runtime. Rendering, slot distribution, and scheduling
//! live in the sibling crates; everything here is plain data and per-call
//! logic.
//!
//! ## Core Concepts
//!
//! ### Class Descriptors
//!
//! Component classes are declared as [`ClassDeclaration`]s and merged along
//! their inheritance chain into a [`ClassDescriptor`]: the complete,
//! order-stable view of every declared property ([`PropertySpec`]), slot
//! ([`SlotSpec`]), and event name. [`ClassRegistry`] owns the declarations,
//! builds descriptors lazily, and caches a default-state snapshot per class.
//!
//! ### Instance State
//!
//! [`StateStore`] holds one [`Value`] per declared property. Writes go
//! through [`StateStore::set`], which coerces the incoming value to the
//! declared kind, runs the validator, and diffs against the stored value so
//! callers learn whether anything actually changed.
//!
//! ## Quick Start
//!
//! ```rust
//! use bracken_property::{
//!     ClassDeclaration, ClassRegistry, PropertySpec, SetOutcome, Value,
//! };
//!
//! let mut registry = ClassRegistry::new();
//! let button = registry
//!     .declare(
//!         ClassDeclaration::new("Button")
//!             .property("text", PropertySpec::text(""))
//!             .property("disabled", PropertySpec::boolean()),
//!     )
//!     .unwrap();
//!
//! let mut state = registry.new_instance_state(button).unwrap();
//! let descriptor = registry.descriptor(button).unwrap();
//!
//! // Attribute strings are coerced to the declared kind.
//! let outcome = state.set(descriptor, "disabled", Value::from("true")).unwrap();
//! assert_eq!(outcome, SetOutcome::Changed { name: "disabled" });
//! assert_eq!(state.get("disabled"), Some(&Value::Bool(true)));
//!
//! // Setting the value it already holds is a no-op.
//! let outcome = state.set(descriptor, "disabled", Value::Bool(true)).unwrap();
//! assert_eq!(outcome, SetOutcome::Unchanged);
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod descriptor;
mod id;
mod metadata;
mod name;
mod registry;
mod store;
mod value;

pub use descriptor::{
    ClassDeclaration, ClassDescriptor, DescriptorError, RESERVED_NAMES,
};
pub use id::{ClassId, NodeKey};
pub use metadata::{
    DEFAULT_SLOT, ListenFor, Observed, PropertySpec, SlotSpec, Validator, ValueKind,
};
pub use name::{ATTRIBUTE_PREFIX, attribute_to_property, property_to_attribute};
pub use registry::{ClassRegistry, DefineOutcome};
pub use store::{SetOutcome, StateError, StateStore};
pub use value::{ErasedValue, Value};
