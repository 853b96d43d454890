// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property values.
//!
//! This module provides [`Value`], the tagged runtime representation of every
//! property and slot value, and [`ErasedValue`] for carrying embedder-defined
//! payloads through `Object` and `Custom` properties.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::id::NodeKey;

/// A type-erased, shared property payload.
///
/// This wraps a value of any `Send + Sync + 'static` type behind an [`Arc`],
/// storing its type information for later downcasting.
///
/// # Equality
///
/// Two `ErasedValue`s compare equal when they point at the **same** payload
/// (pointer identity), never by deep comparison. This is what makes setting a
/// property to the object it already holds a no-op, while a freshly built but
/// structurally identical object still counts as a change.
///
/// # Example
///
/// ```rust
/// use bracken_property::ErasedValue;
///
/// let value = ErasedValue::new(42_i32);
/// assert!(value.is::<i32>());
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
///
/// let same = value.clone();
/// assert_eq!(value, same);
///
/// let other = ErasedValue::new(42_i32);
/// assert_ne!(value, other); // identical contents, different payload
/// ```
#[derive(Clone)]
pub struct ErasedValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
}

impl ErasedValue {
    /// Creates a new erased value from a concrete value.
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            inner: Arc::new(value),
        }
    }

    /// Returns the [`TypeId`] of the contained value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns `true` if the contained value is of type `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Attempts to downcast to a reference of type `T`.
    ///
    /// Returns `None` if the contained value is not of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Returns `true` if both values share the same payload.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for ErasedValue {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedValue")
            .field("type_id", &self.type_id)
            .finish_non_exhaustive()
    }
}

/// The runtime representation of a property or slot value.
///
/// Every declared property stores exactly one `Value`; `multiple` properties
/// and slot-backed properties store a [`Value::Seq`] of per-item values.
///
/// # Equality
///
/// Equality is shallow: scalars compare by value, [`Value::Object`] by payload
/// identity (see [`ErasedValue`]), and sequences element-wise with the same
/// rules. The accessor layer uses this to decide whether a set is a no-op.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The absent value, used as the default for `Object` and `Custom`
    /// properties with no declared default.
    Null,
    /// A boolean.
    Bool(bool),
    /// A text string.
    Text(String),
    /// A signed integer.
    Int(i64),
    /// A host node, as distributed into a slot.
    Node(NodeKey),
    /// An embedder-defined payload.
    Object(ErasedValue),
    /// An ordered sequence (for `multiple` properties and slot contents).
    Seq(Vec<Value>),
}

impl Value {
    /// Returns the contained boolean, if this is a [`Value::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the contained text, if this is a [`Value::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained integer, if this is a [`Value::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the contained node key, if this is a [`Value::Node`].
    #[must_use]
    pub fn as_node(&self) -> Option<NodeKey> {
        match self {
            Self::Node(key) => Some(*key),
            _ => None,
        }
    }

    /// Returns the contained sequence, if this is a [`Value::Seq`].
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Returns `true` if this is [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Creates an empty sequence value.
    #[must_use]
    pub fn empty_seq() -> Self {
        Self::Seq(Vec::new())
    }

    /// Creates a sequence of node values in the given order.
    #[must_use]
    pub fn nodes(keys: impl IntoIterator<Item = NodeKey>) -> Self {
        Self::Seq(keys.into_iter().map(Self::Node).collect())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(String::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<NodeKey> for Value {
    fn from(key: NodeKey) -> Self {
        Self::Node(key)
    }
}

impl From<ErasedValue> for Value {
    fn from(value: ErasedValue) -> Self {
        Self::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn erased_value_downcast() {
        let value = ErasedValue::new(42_i32);
        assert!(value.is::<i32>());
        assert!(!value.is::<f64>());
        assert_eq!(value.downcast_ref::<i32>(), Some(&42));
        assert_eq!(value.downcast_ref::<f64>(), None);
    }

    #[test]
    fn erased_value_identity_equality() {
        let a = ErasedValue::new("payload".to_string());
        let b = a.clone();
        let c = ErasedValue::new("payload".to_string());

        assert_eq!(a, b);
        assert!(a.ptr_eq(&b));
        assert_ne!(a, c); // same contents, different allocation
    }

    #[test]
    fn erased_value_debug() {
        let value = ErasedValue::new(42_i32);
        let debug = format!("{:?}", value);
        assert!(debug.contains("ErasedValue"));
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Text("hi".into()).as_text(), Some("hi"));
        assert_eq!(Value::Node(NodeKey::new(3)).as_node(), Some(NodeKey::new(3)));
        assert!(Value::Null.is_null());
        assert_eq!(Value::Bool(true).as_int(), None);
    }

    #[test]
    fn value_shallow_equality() {
        assert_eq!(Value::Int(1), Value::Int(1));
        assert_ne!(Value::Int(1), Value::Int(2));

        let object = ErasedValue::new(vec![1_u8, 2, 3]);
        assert_eq!(
            Value::Object(object.clone()),
            Value::Object(object.clone())
        );
        assert_ne!(
            Value::Object(object),
            Value::Object(ErasedValue::new(vec![1_u8, 2, 3]))
        );
    }

    #[test]
    fn value_sequences() {
        let seq = Value::nodes([NodeKey::new(1), NodeKey::new(2)]);
        let items = seq.as_seq().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_node(), Some(NodeKey::new(1)));

        assert_eq!(Value::empty_seq(), Value::Seq(vec![]));
    }

    #[test]
    fn value_from_impls() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(3_i64), Value::Int(3));
        assert_eq!(Value::from("x"), Value::Text("x".into()));
    }
}
