// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator seams.
//!
//! Rendering, the host tree, styling, event dispatch, and the static area
//! are all opaque to the runtime: it drives them through the narrow traits
//! here and never looks behind them. The embedder implements these once and
//! passes a [`Collaborators`] bundle into every runtime call that needs
//! them.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use bracken_property::{ClassId, ErasedValue, NodeKey};
use bracken_slots::ChildSource;

use crate::component::RenderOutput;

/// Animation richness, set once at runtime construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum AnimationMode {
    /// All animations.
    #[default]
    Full,
    /// Only essential animations.
    Basic,
    /// Only animations that carry meaning.
    Minimal,
    /// No animations.
    None,
}

/// Runtime-wide configuration, read-only after construction.
#[derive(Copy, Clone, Debug, Default)]
pub struct RuntimeConfig {
    /// Animation richness advertised to components.
    pub animation_mode: AnimationMode,
    /// When set, `fire_event` dispatches only the `ui5-`-prefixed legacy
    /// event and skips the canonical one.
    pub skip_canonical_events: bool,
}

/// The external renderer.
pub trait Renderer {
    /// Renders `output` into the node's render target, with the class's
    /// effective style prepended when present.
    fn render(&mut self, output: &RenderOutput, target: NodeKey, style: Option<&str>);
}

/// The host tree: children, attributes, observation, and focus.
///
/// The [`ChildSource`] supertrait answers the distribution pass's queries
/// about individual children.
pub trait HostAdapter: ChildSource<NodeKey> {
    /// The node's current children, in document order.
    fn children(&self, node: NodeKey) -> Vec<NodeKey>;

    /// Writes a child's `slot` attribute.
    fn set_slot_attribute(&mut self, child: NodeKey, value: &str);

    /// Writes an attribute on a node.
    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str);

    /// Removes an attribute from a node.
    fn remove_attribute(&mut self, node: NodeKey, name: &str);

    /// Starts child-list observation; mutations arrive back through
    /// `Runtime::children_changed`.
    fn observe_children(&mut self, node: NodeKey);

    /// Stops child-list observation.
    fn unobserve_children(&mut self, node: NodeKey);

    /// Moves host focus to the node.
    fn focus(&mut self, node: NodeKey);
}

/// Style-sheet materialization, opaque to the runtime.
pub trait StyleProvider {
    /// The effective style text for a class, if it has one.
    fn effective_style(&self, class: ClassId) -> Option<String>;
}

/// Host event dispatch.
pub trait EventDispatcher {
    /// Dispatches an event from `node`. Returns `false` if a listener
    /// cancelled it.
    fn dispatch(
        &mut self,
        node: NodeKey,
        event_type: &str,
        data: Option<&ErasedValue>,
        cancelable: bool,
    ) -> bool;
}

/// The out-of-tree fragment host (popovers and similar float out of the
/// component's own render target).
pub trait StaticAreaHost {
    /// Creates or updates the node's static fragment.
    fn update(&mut self, node: NodeKey, output: &RenderOutput);

    /// Removes the node's static fragment.
    fn remove(&mut self, node: NodeKey);
}

/// The collaborator bundle runtime operations borrow for their duration.
pub struct Collaborators<'a> {
    /// Host tree access.
    pub host: &'a mut dyn HostAdapter,
    /// The external renderer.
    pub renderer: &'a mut dyn Renderer,
    /// Style materialization.
    pub style: &'a dyn StyleProvider,
    /// Event dispatch.
    pub events: &'a mut dyn EventDispatcher,
    /// Static-area fragments.
    pub static_area: &'a mut dyn StaticAreaHost,
}

impl fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
