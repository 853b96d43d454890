// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bracken Scheduler: Render phase tracking and invalidation coalescing.
//!
//! This crate provides [`RenderScheduler`], the per-instance state machine
//! behind deferred rendering. Instances move through
//! [`RenderPhase::Clean`] → [`RenderPhase::Invalidated`] →
//! [`RenderPhase::Rendering`] → back to `Clean`, and any number of
//! invalidations between two queue pops collapse into a single render that
//! runs against the latest state.
//!
//! The scheduler is passive: it never calls anything. The embedder's event
//! loop pops work with [`RenderScheduler::take_next`], performs the render,
//! and reports back with [`RenderScheduler::finish_render`].
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod phase;
mod scheduler;

pub use phase::{InvalidateOutcome, InvalidationReason, RenderPhase};
pub use scheduler::RenderScheduler;
