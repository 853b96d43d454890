// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot distribution passes.
//!
//! Distribution takes a snapshot of a component's host children in document
//! order and assigns each to one of the class's declared slots. The pass is
//! atomic from the outside: children whose custom-element tag is not yet
//! defined put the pass into a waiting state, and nothing is committed until
//! every child has resolved or its wait has expired. Committed groups are
//! always in document order, never in resolution order.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use bracken_property::{ClassDescriptor, ListenFor, SlotSpec};

use crate::trace::DistributionTrace;

/// How long a distribution pass waits for an undefined custom-element tag,
/// in milliseconds.
pub const DEFAULT_DEFINITION_TIMEOUT_MS: u64 = 1000;

/// Host-side queries a distribution pass needs about children.
///
/// The runtime's host adapter implements this; tests use a fixture. All
/// queries are cheap reads against the host tree.
pub trait ChildSource<K> {
    /// The child's literal `slot` attribute, if present.
    fn slot_attribute(&self, child: K) -> Option<String>;

    /// Returns `true` if the child is a text node.
    fn is_text(&self, child: K) -> bool;

    /// The child's element tag name, lowercase. `None` for text nodes.
    fn tag_name(&self, child: K) -> Option<String>;

    /// Returns `true` if the custom-element tag has a registered definition.
    fn is_defined(&self, tag: &str) -> bool;

    /// Returns `true` if the child is a component instance (as opposed to a
    /// plain element or text node).
    fn is_component(&self, child: K) -> bool;

    /// Returns `true` if the child satisfies a slot's accepted type.
    fn accepts(&self, child: K, accepted: &'static str) -> bool;
}

/// Distribution failed because a child does not satisfy its slot's accepted
/// type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IncompatibleChild<K> {
    /// The offending child.
    pub child: K,
    /// The slot whose accepted type it violates.
    pub slot: &'static str,
}

impl<K: fmt::Debug> fmt::Display for IncompatibleChild<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "child {:?} is not accepted by slot `{}`",
            self.child, self.slot
        )
    }
}

impl<K: fmt::Debug> core::error::Error for IncompatibleChild<K> {}

/// A child assigned to an individually addressable slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IndividualAssignment<K> {
    /// The assigned child.
    pub child: K,
    /// The declared slot name.
    pub slot: &'static str,
    /// The 1-based sub-slot index, sequential per slot in document order.
    pub index: u32,
}

/// A child-watch subscription a committed pass asks the runtime to attach.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchRequest<K> {
    /// The child to watch.
    pub child: K,
    /// The slot the child was distributed into.
    pub slot: &'static str,
    /// The properties the parent wants reported.
    pub filter: ListenFor,
}

/// The outcome of a completed distribution pass.
///
/// `groups` holds one entry per declared slot-backed property, in
/// declaration order, children in document order. Slots that received no
/// children appear with an empty group so the caller clears their previous
/// contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributionResult<K> {
    /// Per backing property, the distributed children in document order.
    pub groups: Vec<(&'static str, Vec<K>)>,
    /// Sub-slot assignments for individually addressable slots.
    pub individual: Vec<IndividualAssignment<K>>,
    /// Watch subscriptions to attach per the slots' `listen_for` interests.
    pub watches: Vec<WatchRequest<K>>,
}

impl<K> DistributionResult<K> {
    /// The backing properties this pass wrote (all declared slot properties,
    /// whether or not they received children).
    pub fn affected_properties(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.iter().map(|(name, _)| *name)
    }
}

/// A child that has been classified to a slot and is waiting for nothing.
#[derive(Copy, Clone, Debug)]
struct Placed<K> {
    child: K,
    /// Index in the original document-order snapshot.
    position: usize,
    slot: &'static str,
    text: bool,
}

#[derive(Clone, Debug)]
struct PendingTag<K> {
    tag: String,
    deadline: u64,
    children: Vec<Placed<K>>,
}

/// Distribution configuration; hands out [`DistributionPass`]es.
#[derive(Copy, Clone, Debug)]
pub struct Distributor {
    definition_timeout_ms: u64,
}

impl Default for Distributor {
    fn default() -> Self {
        Self::new()
    }
}

impl Distributor {
    /// Creates a distributor with the default definition-wait timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            definition_timeout_ms: DEFAULT_DEFINITION_TIMEOUT_MS,
        }
    }

    /// Creates a distributor with a custom definition-wait timeout in
    /// milliseconds.
    #[must_use]
    pub fn with_timeout(definition_timeout_ms: u64) -> Self {
        Self {
            definition_timeout_ms,
        }
    }

    /// Returns the configured definition-wait timeout in milliseconds.
    #[must_use]
    pub fn definition_timeout_ms(&self) -> u64 {
        self.definition_timeout_ms
    }

    /// Classifies a document-order snapshot of children against a class's
    /// declared slots and starts a pass.
    ///
    /// Text nodes are kept only when the default slot accepts raw text.
    /// Children naming an undeclared slot are dropped with a trace event.
    /// Children whose custom-element tag has no definition yet enter a wait
    /// shared per tag, with deadline `now` plus the configured timeout.
    pub fn begin<K, S>(
        &self,
        children: &[K],
        descriptor: &ClassDescriptor,
        source: &S,
        now: u64,
        trace: &mut dyn DistributionTrace<K>,
    ) -> DistributionPass<K>
    where
        K: Copy + Eq + Hash,
        S: ChildSource<K>,
    {
        let default_takes_text = descriptor
            .default_slot()
            .is_some_and(SlotSpec::accepts_raw_text);

        let mut resolved: Vec<Placed<K>> = Vec::new();
        let mut pending: Vec<PendingTag<K>> = Vec::new();

        for (position, &child) in children.iter().enumerate() {
            if source.is_text(child) {
                if default_takes_text {
                    let slot = descriptor.default_slot().map(SlotSpec::name);
                    resolved.push(Placed {
                        child,
                        position,
                        slot: slot.expect("default slot present when it takes text"),
                        text: true,
                    });
                }
                continue;
            }

            let attribute = source.slot_attribute(child);
            let requested = attribute
                .as_deref()
                .filter(|name| !name.is_empty())
                .map_or(bracken_property::DEFAULT_SLOT, strip_index_suffix);
            let Some(spec) = descriptor.slot(requested) else {
                trace.unknown_slot(child, requested);
                continue;
            };

            let placed = Placed {
                child,
                position,
                slot: spec.name(),
                text: false,
            };

            let undefined_tag = source
                .tag_name(child)
                .filter(|tag| tag.contains('-') && !source.is_defined(tag));
            if let Some(tag) = undefined_tag {
                if let Some(entry) = pending.iter_mut().find(|entry| entry.tag == tag) {
                    entry.children.push(placed);
                } else {
                    let deadline = now + self.definition_timeout_ms;
                    trace.wait_started(&tag, deadline);
                    pending.push(PendingTag {
                        tag,
                        deadline,
                        children: alloc::vec![placed],
                    });
                }
            } else {
                resolved.push(placed);
            }
        }

        DistributionPass { resolved, pending }
    }
}

/// An in-flight distribution pass.
///
/// Poll with [`poll`](Self::poll) until [`is_complete`](Self::is_complete),
/// then [`commit`](Self::commit).
#[derive(Clone, Debug)]
pub struct DistributionPass<K> {
    resolved: Vec<Placed<K>>,
    pending: Vec<PendingTag<K>>,
}

impl<K> DistributionPass<K>
where
    K: Copy + Eq + Hash,
{
    /// Re-checks the pending definition waits.
    ///
    /// Tags that have become defined resolve their children into the pass;
    /// tags whose deadline has passed drop theirs with a trace event.
    pub fn poll<S>(&mut self, source: &S, now: u64, trace: &mut dyn DistributionTrace<K>)
    where
        S: ChildSource<K>,
    {
        let mut still_pending = Vec::new();
        for entry in self.pending.drain(..) {
            if source.is_defined(&entry.tag) {
                self.resolved.extend(entry.children);
            } else if now >= entry.deadline {
                trace.wait_timed_out(&entry.tag, entry.children.len());
            } else {
                still_pending.push(entry);
            }
        }
        self.pending = still_pending;
    }

    /// Returns `true` once no definition waits remain.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// The earliest pending deadline, for embedders that schedule wakeups.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.iter().map(|entry| entry.deadline).min()
    }

    /// Commits the pass: accepted-type validation, grouping by backing
    /// property in document order, sub-slot index assignment, and watch
    /// requests.
    ///
    /// # Panics
    ///
    /// Panics if the pass is not complete; callers poll first.
    pub fn commit<S>(
        mut self,
        descriptor: &ClassDescriptor,
        source: &S,
    ) -> Result<DistributionResult<K>, IncompatibleChild<K>>
    where
        S: ChildSource<K>,
    {
        assert!(
            self.is_complete(),
            "distribution committed with definition waits outstanding"
        );

        // Resolution order is arbitrary (waits resolve per tag); committed
        // order is always the snapshot's document order.
        self.resolved.sort_by_key(|placed| placed.position);

        for placed in &self.resolved {
            let spec = descriptor
                .slot(placed.slot)
                .expect("classified against this descriptor");
            if let Some(accepted) = spec.accepted()
                && !placed.text
                && !source.accepts(placed.child, accepted)
            {
                return Err(IncompatibleChild {
                    child: placed.child,
                    slot: placed.slot,
                });
            }
        }

        let mut groups: Vec<(&'static str, Vec<K>)> = Vec::new();
        let mut individual = Vec::new();
        let mut watches = Vec::new();

        for spec in descriptor.slots() {
            let children: Vec<K> = self
                .resolved
                .iter()
                .filter(|placed| placed.slot == spec.name())
                .map(|placed| placed.child)
                .collect();

            if spec.has_individual_slots() {
                for (i, &child) in children.iter().enumerate() {
                    #[expect(clippy::cast_possible_truncation, reason = "child count < u32::MAX")]
                    let index = i as u32 + 1;
                    individual.push(IndividualAssignment {
                        child,
                        slot: spec.name(),
                        index,
                    });
                }
            }

            if let Some(filter) = spec.listened() {
                for placed in self
                    .resolved
                    .iter()
                    .filter(|placed| placed.slot == spec.name())
                {
                    if !placed.text && source.is_component(placed.child) {
                        watches.push(WatchRequest {
                            child: placed.child,
                            slot: spec.name(),
                            filter: filter.clone(),
                        });
                    }
                }
            }

            groups.push((spec.backing_property(), children));
        }

        Ok(DistributionResult {
            groups,
            individual,
            watches,
        })
    }
}

/// Strips an auto-generated `-<digits>` suffix from a slot name.
fn strip_index_suffix(name: &str) -> &str {
    if let Some(pos) = name.rfind('-')
        && pos > 0
        && name.len() > pos + 1
        && name[pos + 1..].bytes().all(|b| b.is_ascii_digit())
    {
        &name[..pos]
    } else {
        name
    }
}
