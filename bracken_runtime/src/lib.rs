// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bracken Runtime: The component runtime.
//!
//! This crate ties the data model (`bracken_property`), slot distribution
//! (`bracken_slots`), and the render scheduler (`bracken_scheduler`)
//! together behind one [`Runtime`] handle, and defines the seams the
//! embedder fills in:
//!
//! - [`ComponentBehavior`] — what a component class contributes: output
//!   building and lifecycle hooks, one boxed instance per connected node.
//! - The collaborator traits ([`Renderer`], [`HostAdapter`],
//!   [`StyleProvider`], [`EventDispatcher`], [`StaticAreaHost`]) — the host
//!   environment, opaque to the runtime, passed as a [`Collaborators`]
//!   bundle into the calls that need them.
//!
//! Scheduling is cooperative and single-threaded: the embedder forwards
//! host callbacks (`connect`, `attribute_changed`, `children_changed`) and
//! calls [`Runtime::advance_to`] with a monotonic millisecond clock to run
//! deferred work — definition waits, pass commits, and batched renders.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod collab;
mod component;
mod runtime;

pub use collab::{
    AnimationMode, Collaborators, EventDispatcher, HostAdapter, Renderer, RuntimeConfig,
    StaticAreaHost, StyleProvider,
};
pub use component::{ComponentBehavior, HookContext, RenderError, RenderOutput};
pub use runtime::{Runtime, RuntimeError};
