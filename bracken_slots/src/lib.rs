// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bracken Slots: Slot distribution and child-change propagation.
//!
//! This crate assigns a component's host children to the slots its class
//! declares, and keeps track of which distributed children report their
//! property changes back to the parent.
//!
//! ## Distribution
//!
//! A [`Distributor`] turns a document-order snapshot of children into a
//! [`DistributionPass`]. Children with an undefined custom-element tag hold
//! the pass open, bounded by a per-tag deadline; once complete, the pass
//! commits into a [`DistributionResult`] whose groups are always in document
//! order, no matter when each definition arrived. The caller writes the
//! groups into the instance's state and requests a single invalidation.
//!
//! ## Propagation
//!
//! [`ChildWatchTable`] records the subscriptions a committed pass requested
//! for slots with a `listen_for` interest. A child's property change routes
//! to its watching parent if it passes the slot's filter, and is a safe
//! no-op for detached children.
//!
//! ## Observability
//!
//! Non-fatal oddities (unknown slot names, expired definition waits) are
//! reported through the additive [`DistributionTrace`] hook; see
//! [`NullTrace`] and [`RecordingTrace`].
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod distribute;
mod trace;
mod watch;

pub use distribute::{
    ChildSource, DEFAULT_DEFINITION_TIMEOUT_MS, DistributionPass, DistributionResult,
    Distributor, IncompatibleChild, IndividualAssignment, WatchRequest,
};
pub use trace::{DistributionEvent, DistributionTrace, NullTrace, RecordingTrace};
pub use watch::ChildWatchTable;
