// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component behaviors.
//!
//! A component class contributes one [`ComponentBehavior`] implementation;
//! the runtime boxes one instance of it per connected node. The behavior is
//! the only place class-specific code runs: it builds render output from the
//! instance state and gets the lifecycle hooks.
//!
//! Whether a node "is a component" is never probed structurally; a node is a
//! component exactly when the runtime holds a registered instance for it.

use alloc::string::String;
use core::fmt;

use bracken_property::{
    ClassDescriptor, ErasedValue, SetOutcome, StateError, StateStore, Value,
};

/// Opaque render output, produced by a behavior and consumed by the
/// embedder's renderer.
///
/// The runtime never looks inside; the renderer downcasts to whatever
/// payload type it agreed on with the component classes.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOutput(ErasedValue);

impl RenderOutput {
    /// Wraps a renderer-defined payload.
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(payload: T) -> Self {
        Self(ErasedValue::new(payload))
    }

    /// Attempts to downcast the payload.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

/// A renderer or lifecycle hook failed.
///
/// This is treated as a programming error: the runtime propagates it to the
/// caller without recovery, leaving the instance mid-render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderError {
    message: String,
}

impl RenderError {
    /// Creates an error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "render failed: {}", self.message)
    }
}

impl core::error::Error for RenderError {}

/// Accessor-layer access to the instance state for pre-render hooks.
///
/// Writes go through the same coerce/validate/diff path as external
/// property sets. Invalidation is suppressed while the hooks run, so
/// changes made here are picked up by the very render in progress.
pub struct HookContext<'a> {
    descriptor: &'a ClassDescriptor,
    state: &'a mut StateStore,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(descriptor: &'a ClassDescriptor, state: &'a mut StateStore) -> Self {
        Self { descriptor, state }
    }

    /// Reads a property value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.state.get(name)
    }

    /// Writes a property through the accessor path.
    pub fn set(&mut self, name: &str, value: Value) -> Result<SetOutcome, StateError> {
        self.state.set(self.descriptor, name, value)
    }

    /// The merged descriptor of the instance's class.
    #[must_use]
    pub fn descriptor(&self) -> &ClassDescriptor {
        self.descriptor
    }
}

impl fmt::Debug for HookContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("class", &self.descriptor.class_name())
            .finish_non_exhaustive()
    }
}

/// Class-specific behavior, one boxed instance per connected node.
///
/// Every hook has a default so simple components implement only
/// [`build_output`](Self::build_output). Hook order within one render:
/// `before_render` → `finalize_render` → (invalidation unsuppressed) →
/// `build_output` + external renderer → static output → `after_render`.
pub trait ComponentBehavior {
    /// Builds the render output for the instance's current state.
    fn build_output(&mut self, state: &StateStore) -> RenderOutput;

    /// Builds the out-of-tree (static-area) output, if the component has
    /// one. Returning `None` removes a previously created fragment.
    fn build_static_output(&mut self, _state: &StateStore) -> Option<RenderOutput> {
        None
    }

    /// Runs first in every render, with invalidation suppressed.
    fn before_render(&mut self, _ctx: &mut HookContext<'_>) -> Result<(), RenderError> {
        Ok(())
    }

    /// Runs after [`before_render`](Self::before_render), still suppressed.
    /// Composite behaviors recompute derived state here (item indices, tab
    /// order) before output is built.
    fn finalize_render(&mut self, _ctx: &mut HookContext<'_>) -> Result<(), RenderError> {
        Ok(())
    }

    /// Runs last in every render, after the renderer and slot attributes.
    fn after_render(&mut self, _state: &StateStore) -> Result<(), RenderError> {
        Ok(())
    }

    /// The instance finished its first render and is ready.
    fn entered(&mut self) {}

    /// The instance was disconnected.
    fn exited(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use bracken_property::{ClassDeclaration, PropertySpec};

    #[test]
    fn render_output_downcast() {
        let output = RenderOutput::new("markup".to_string());
        assert_eq!(output.downcast_ref::<String>().map(String::as_str), Some("markup"));
        assert_eq!(output.downcast_ref::<i32>(), None);
    }

    #[test]
    fn hook_context_uses_accessor_path() {
        let declaration =
            ClassDeclaration::new("Counter").property("count", PropertySpec::integer(0));
        let descriptor = ClassDescriptor::from_chain(&[&declaration]).unwrap();
        let mut state = StateStore::default_snapshot(&descriptor);

        let mut ctx = HookContext::new(&descriptor, &mut state);
        // Coercion applies to hook writes too.
        let outcome = ctx.set("count", Value::from("7")).unwrap();
        assert_eq!(outcome, SetOutcome::Changed { name: "count" });
        assert_eq!(ctx.get("count"), Some(&Value::Int(7)));
    }
}
