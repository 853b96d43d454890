// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render phases and invalidation outcomes.

/// The render lifecycle phase of a component instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum RenderPhase {
    /// Rendered output is up to date with the instance state.
    #[default]
    Clean,
    /// A re-render has been requested and queued.
    Invalidated,
    /// The instance is currently between `take_next` and `finish_render`.
    Rendering,
}

/// Why an instance was invalidated.
///
/// When several invalidations coalesce into one queued render, the reason of
/// the **first** request is kept; later reasons are dropped with their
/// requests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InvalidationReason {
    /// A declared property changed value.
    Property {
        /// The declared property name.
        name: &'static str,
    },
    /// Slot contents were redistributed.
    Slots,
    /// A watched child's property changed.
    Child,
    /// An unconditional re-render was requested.
    Forced,
}

/// The result of an invalidation request.
///
/// Only [`Scheduled`](Self::Scheduled) queues work; every other outcome is a
/// deliberate no-op.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InvalidateOutcome {
    /// A render task was queued.
    Scheduled,
    /// A render was already pending; this request folded into it.
    Coalesced,
    /// The instance has never rendered; the request was absorbed. The first
    /// render picks the state up unconditionally.
    NotRendered,
    /// The instance is mid-render with invalidation suppressed.
    Suppressed,
    /// The key is not registered.
    Unknown,
}
