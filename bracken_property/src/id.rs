// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identification types.
//!
//! This module provides [`ClassId`] for identifying component classes within
//! a [`ClassRegistry`](crate::ClassRegistry) and [`NodeKey`] for identifying
//! host nodes.

use core::fmt;

/// A runtime component-class identifier.
///
/// This is a lightweight handle (u32) that uniquely identifies a class within
/// a [`ClassRegistry`](crate::ClassRegistry). Ids are handed out by
/// [`ClassRegistry::declare`](crate::ClassRegistry::declare) in declaration
/// order and are never reused.
///
/// # Example
///
/// ```rust
/// use bracken_property::ClassId;
///
/// let id = ClassId::new(3);
/// assert_eq!(id.index(), 3);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(u32);

impl ClassId {
    /// Creates a new class ID from the given index.
    ///
    /// This is typically called by [`ClassRegistry::declare`](crate::ClassRegistry::declare)
    /// rather than directly.
    #[must_use]
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the underlying index of this class ID.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassId").field(&self.0).finish()
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// An opaque host-node handle.
///
/// The runtime never inspects host nodes directly; it refers to them through
/// `NodeKey` and asks its host adapter for anything node-specific. Component
/// instances are keyed by the `NodeKey` of their host element, and slot
/// contents are stored as sequences of `NodeKey`s.
///
/// How keys map onto actual nodes is entirely up to the embedder; the runtime
/// only requires that keys are stable and unique for the lifetime of a node.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKey(u64);

impl NodeKey {
    /// Creates a new node key from the given raw value.
    #[must_use]
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value of this node key.
    #[must_use]
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeKey").field(&self.0).finish()
    }
}
