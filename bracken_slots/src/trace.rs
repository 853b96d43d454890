// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explainability helpers for slot distribution.
//!
//! Distribution deliberately treats bad host markup as non-fatal: a child
//! naming an undeclared slot is dropped, and a child whose custom-element
//! definition never arrives is dropped when its wait deadline passes. The
//! core pass does not store why a child went missing.
//!
//! This module provides a minimal, additive hook for those events:
//! [`DistributionTrace`], plus [`NullTrace`] for embedders that do not care
//! and [`RecordingTrace`], which accumulates events for inspection.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// A distribution event worth reporting, as captured by [`RecordingTrace`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DistributionEvent<K> {
    /// A child named a slot the class does not declare and was dropped.
    UnknownSlot {
        /// The dropped child.
        child: K,
        /// The slot name the child asked for (after suffix stripping).
        slot: String,
    },
    /// Children with an undefined custom-element tag entered a wait.
    WaitStarted {
        /// The tag being waited on.
        tag: String,
        /// The absolute deadline, in the caller's clock.
        deadline: u64,
    },
    /// A definition wait expired; its children were dropped.
    WaitTimedOut {
        /// The tag that never got defined.
        tag: String,
        /// How many children were dropped with it.
        dropped: usize,
    },
}

/// A callback sink for distribution events.
pub trait DistributionTrace<K> {
    /// Called when a child names an undeclared slot and is dropped.
    fn unknown_slot(&mut self, child: K, slot: &str);

    /// Called when the first child with an undefined tag starts a wait.
    fn wait_started(&mut self, tag: &str, deadline: u64);

    /// Called when a wait deadline passes, dropping `dropped` children.
    fn wait_timed_out(&mut self, tag: &str, dropped: usize);
}

/// A trace sink that ignores every event.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullTrace;

impl<K> DistributionTrace<K> for NullTrace {
    fn unknown_slot(&mut self, _child: K, _slot: &str) {}
    fn wait_started(&mut self, _tag: &str, _deadline: u64) {}
    fn wait_timed_out(&mut self, _tag: &str, _dropped: usize) {}
}

/// A trace sink that records every event in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingTrace<K> {
    events: Vec<DistributionEvent<K>>,
}

impl<K> RecordingTrace<K> {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Returns the recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[DistributionEvent<K>] {
        &self.events
    }

    /// Clears all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<K> DistributionTrace<K> for RecordingTrace<K> {
    fn unknown_slot(&mut self, child: K, slot: &str) {
        self.events.push(DistributionEvent::UnknownSlot {
            child,
            slot: slot.to_string(),
        });
    }

    fn wait_started(&mut self, tag: &str, deadline: u64) {
        self.events.push(DistributionEvent::WaitStarted {
            tag: tag.to_string(),
            deadline,
        });
    }

    fn wait_timed_out(&mut self, tag: &str, dropped: usize) {
        self.events.push(DistributionEvent::WaitTimedOut {
            tag: tag.to_string(),
            dropped,
        });
    }
}
