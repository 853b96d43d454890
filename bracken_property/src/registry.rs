// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-wide class registry.
//!
//! This module provides [`ClassRegistry`], the single owner of everything
//! that is per-class rather than per-instance: declarations, lazily built
//! merged descriptors, cached default-state snapshots, per-class instance
//! serial counters, and the tag-definition table behind `define`.
//!
//! The registry is an explicit handle, not ambient module state: embedders
//! create one at startup and thread it through. Entries are append-only and
//! keyed by stable identity, so no teardown is ever needed.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::descriptor::{ClassDeclaration, ClassDescriptor, DescriptorError};
use crate::id::ClassId;
use crate::store::StateStore;

/// The result of registering a tag with [`ClassRegistry::define_tag`].
///
/// Definition is idempotent; neither repeated nor conflicting registration
/// is an error. The embedder decides whether the non-`Defined` outcomes are
/// worth reporting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DefineOutcome {
    /// The tag is now registered for the class.
    Defined,
    /// The same class was already registered under this tag; nothing
    /// happened.
    AlreadyDefined,
    /// A different class is already registered under this tag; nothing
    /// happened.
    TagTaken,
}

struct ClassEntry {
    declaration: ClassDeclaration,
    /// Merged descriptor, built on first use.
    descriptor: Option<ClassDescriptor>,
    /// Default-state snapshot, built on first use.
    default_state: Option<StateStore>,
    /// Monotonic per-class instance counter.
    serial: u32,
}

/// The process-wide registry of component classes.
///
/// # Example
///
/// ```rust
/// use bracken_property::{ClassDeclaration, ClassRegistry, DefineOutcome, PropertySpec};
///
/// let mut registry = ClassRegistry::new();
///
/// let base = registry
///     .declare(ClassDeclaration::new("Element").property("hiddenText", PropertySpec::text("")))
///     .unwrap();
/// let button = registry
///     .declare(
///         ClassDeclaration::new("Button")
///             .extends(base)
///             .property("pressed", PropertySpec::boolean()),
///     )
///     .unwrap();
///
/// // The merged descriptor covers the whole chain.
/// let descriptor = registry.descriptor(button).unwrap();
/// assert!(descriptor.property("hiddenText").is_some());
/// assert!(descriptor.property("pressed").is_some());
///
/// // Tag definition is idempotent.
/// assert_eq!(registry.define_tag("x-button", button), DefineOutcome::Defined);
/// assert_eq!(registry.define_tag("x-button", button), DefineOutcome::AlreadyDefined);
/// assert_eq!(registry.define_tag("x-button", base), DefineOutcome::TagTaken);
/// ```
#[derive(Default)]
pub struct ClassRegistry {
    classes: Vec<ClassEntry>,
    by_name: HashMap<&'static str, ClassId>,
    tags: HashMap<String, ClassId>,
}

impl ClassRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class declaration and returns its id.
    ///
    /// Declarations are stored as-is; validation happens when the descriptor
    /// is first built. Fails if a class with the same name is already
    /// declared or if the parent id is unknown.
    pub fn declare(&mut self, declaration: ClassDeclaration) -> Result<ClassId, DescriptorError> {
        if self.by_name.contains_key(declaration.name()) {
            return Err(DescriptorError::DuplicateName {
                name: declaration.name(),
            });
        }
        if let Some(parent) = declaration.parent()
            && self.entry(parent).is_none()
        {
            return Err(DescriptorError::UnknownClass { id: parent });
        }

        #[expect(clippy::cast_possible_truncation, reason = "class count < u32::MAX")]
        let id = ClassId::new(self.classes.len() as u32);
        self.by_name.insert(declaration.name(), id);
        self.classes.push(ClassEntry {
            declaration,
            descriptor: None,
            default_state: None,
            serial: 0,
        });
        Ok(id)
    }

    /// Returns the number of declared classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no classes are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Looks up a class by name.
    #[must_use]
    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    fn entry(&self, id: ClassId) -> Option<&ClassEntry> {
        self.classes.get(id.index() as usize)
    }

    /// Returns the merged descriptor for a class, building and caching it on
    /// first use.
    ///
    /// Construction-time errors (reserved names, bad boolean defaults,
    /// duplicates) surface here.
    pub fn descriptor(&mut self, id: ClassId) -> Result<&ClassDescriptor, DescriptorError> {
        self.ensure_descriptor(id)?;
        Ok(self.classes[id.index() as usize]
            .descriptor
            .as_ref()
            .expect("descriptor built above"))
    }

    fn ensure_descriptor(&mut self, id: ClassId) -> Result<(), DescriptorError> {
        let entry = self
            .entry(id)
            .ok_or(DescriptorError::UnknownClass { id })?;
        if entry.descriptor.is_some() {
            return Ok(());
        }

        // Collect the ancestor chain, oldest first. Parent ids always
        // precede their children, so this terminates.
        let mut chain_ids: Vec<ClassId> = Vec::new();
        let mut current = Some(id);
        while let Some(class) = current {
            chain_ids.push(class);
            current = self
                .entry(class)
                .ok_or(DescriptorError::UnknownClass { id: class })?
                .declaration
                .parent();
        }
        chain_ids.reverse();

        let chain: Vec<&ClassDeclaration> = chain_ids
            .iter()
            .map(|class| &self.classes[class.index() as usize].declaration)
            .collect();
        let descriptor = ClassDescriptor::from_chain(&chain)?;

        self.classes[id.index() as usize].descriptor = Some(descriptor);
        Ok(())
    }

    /// Returns the merged descriptor for a class if it has already been
    /// built, without building it.
    ///
    /// Useful when the registry is only available behind a shared borrow;
    /// callers arrange for [`descriptor`](Self::descriptor) to have run.
    #[must_use]
    pub fn built_descriptor(&self, id: ClassId) -> Option<&ClassDescriptor> {
        self.entry(id).and_then(|entry| entry.descriptor.as_ref())
    }

    /// Returns the cached default-state snapshot for a class, building it on
    /// first use.
    pub fn default_state(&mut self, id: ClassId) -> Result<&StateStore, DescriptorError> {
        self.ensure_descriptor(id)?;
        let entry = &mut self.classes[id.index() as usize];
        if entry.default_state.is_none() {
            let descriptor = entry.descriptor.as_ref().expect("descriptor built above");
            entry.default_state = Some(StateStore::default_snapshot(descriptor));
        }
        Ok(entry.default_state.as_ref().expect("snapshot built above"))
    }

    /// Creates a fresh instance state for a class: a value copy of the
    /// cached snapshot, never an alias.
    pub fn new_instance_state(&mut self, id: ClassId) -> Result<StateStore, DescriptorError> {
        Ok(self.default_state(id)?.clone())
    }

    /// Returns the next per-class instance serial (1-based, monotonic).
    ///
    /// # Panics
    ///
    /// Panics if the class id is unknown.
    pub fn next_instance_serial(&mut self, id: ClassId) -> u32 {
        let entry = &mut self.classes[id.index() as usize];
        entry.serial += 1;
        entry.serial
    }

    /// Registers `class` under `tag`.
    ///
    /// Idempotent process-wide: re-registering the same class is a no-op
    /// ([`DefineOutcome::AlreadyDefined`]); registering a different class
    /// under a taken tag is a no-op ([`DefineOutcome::TagTaken`]).
    pub fn define_tag(&mut self, tag: &str, class: ClassId) -> DefineOutcome {
        match self.tags.get(tag) {
            Some(&existing) if existing == class => DefineOutcome::AlreadyDefined,
            Some(_) => DefineOutcome::TagTaken,
            None => {
                self.tags.insert(tag.to_string(), class);
                DefineOutcome::Defined
            }
        }
    }

    /// Returns the class registered under `tag`, if any.
    #[must_use]
    pub fn tag_class(&self, tag: &str) -> Option<ClassId> {
        self.tags.get(tag).copied()
    }

    /// Returns whether `tag` has a registered class.
    #[must_use]
    pub fn is_tag_defined(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }
}

impl core::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.by_name.keys().collect::<Vec<_>>())
            .field("tags", &self.tags.keys().collect::<Vec<_>>())
            .finish()
    }
}
