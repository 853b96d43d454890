// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The deferred render queue.

use alloc::collections::VecDeque;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::phase::{InvalidateOutcome, InvalidationReason, RenderPhase};

#[derive(Debug)]
struct Entry {
    phase: RenderPhase,
    /// Whether the instance has completed at least one render. Until then,
    /// invalidations are absorbed; the first render is unconditional.
    rendered: bool,
    /// Set between `take_next` and `resume_invalidation`.
    suppressed: bool,
    pending: Option<InvalidationReason>,
}

/// Per-instance render phase tracking and a FIFO queue of deferred renders.
///
/// Any number of invalidations between two `take_next` calls collapse into a
/// single queued render for that instance, which then runs against the
/// instance's latest state. While an instance is mid-render, its own
/// invalidations are suppressed until [`resume_invalidation`] lifts the
/// guard; changes made by the pre-render hooks are folded into the very
/// render that is running instead of queueing another.
///
/// [`resume_invalidation`]: RenderScheduler::resume_invalidation
///
/// # Type Parameters
///
/// - `K`: The instance key type, typically a node identifier. Must be
///   `Copy + Eq + Hash`.
///
/// # Example
///
/// ```
/// use bracken_scheduler::{InvalidateOutcome, InvalidationReason, RenderScheduler};
///
/// let mut scheduler = RenderScheduler::<u32>::new();
/// scheduler.register(1);
/// scheduler.mark_rendered(1);
///
/// // Three writes, one queued render.
/// let reason = InvalidationReason::Property { name: "text" };
/// assert_eq!(scheduler.invalidate(1, reason), InvalidateOutcome::Scheduled);
/// assert_eq!(scheduler.invalidate(1, reason), InvalidateOutcome::Coalesced);
/// assert_eq!(scheduler.invalidate(1, InvalidationReason::Slots), InvalidateOutcome::Coalesced);
/// assert_eq!(scheduler.pending_len(), 1);
///
/// let (key, reason) = scheduler.take_next().unwrap();
/// assert_eq!(key, 1);
/// assert_eq!(reason, InvalidationReason::Property { name: "text" });
/// scheduler.resume_invalidation(key);
/// scheduler.finish_render(key);
/// assert!(!scheduler.has_pending());
/// ```
#[derive(Debug)]
pub struct RenderScheduler<K>
where
    K: Copy + Eq + Hash,
{
    entries: HashMap<K, Entry>,
    /// Queued keys, oldest first. May hold keys unregistered since they were
    /// queued; `take_next` skips those.
    queue: VecDeque<K>,
    pending: usize,
}

impl<K> Default for RenderScheduler<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RenderScheduler<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates a new scheduler with no registered instances.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            queue: VecDeque::new(),
            pending: 0,
        }
    }

    /// Registers an instance key.
    ///
    /// Registering an already registered key resets its phase tracking.
    pub fn register(&mut self, key: K) {
        if let Some(old) = self.entries.insert(
            key,
            Entry {
                phase: RenderPhase::Clean,
                rendered: false,
                suppressed: false,
                pending: None,
            },
        ) && old.pending.is_some()
        {
            self.pending -= 1;
        }
    }

    /// Removes an instance key, dropping any pending render for it.
    pub fn unregister(&mut self, key: K) {
        if let Some(entry) = self.entries.remove(&key)
            && entry.pending.is_some()
        {
            self.pending -= 1;
        }
    }

    /// Records that the instance has completed its first, unconditional
    /// render. Invalidations before this point are absorbed.
    pub fn mark_rendered(&mut self, key: K) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.rendered = true;
        }
    }

    /// Requests a re-render of `key`.
    ///
    /// At most one render is queued per instance; see [`InvalidateOutcome`]
    /// for the no-op cases. When requests coalesce, the first reason wins.
    pub fn invalidate(&mut self, key: K, reason: InvalidationReason) -> InvalidateOutcome {
        let Some(entry) = self.entries.get_mut(&key) else {
            return InvalidateOutcome::Unknown;
        };
        if !entry.rendered {
            return InvalidateOutcome::NotRendered;
        }
        if entry.suppressed {
            return InvalidateOutcome::Suppressed;
        }
        if entry.pending.is_some() {
            return InvalidateOutcome::Coalesced;
        }

        entry.pending = Some(reason);
        if entry.phase == RenderPhase::Clean {
            entry.phase = RenderPhase::Invalidated;
        }
        self.queue.push_back(key);
        self.pending += 1;
        InvalidateOutcome::Scheduled
    }

    /// Pops the oldest queued render, transitioning its instance to
    /// [`RenderPhase::Rendering`] with invalidation suppressed.
    ///
    /// Returns `None` when the queue is empty.
    pub fn take_next(&mut self) -> Option<(K, InvalidationReason)> {
        while let Some(key) = self.queue.pop_front() {
            // Unregistered since it was queued, or re-registered (which
            // clears pending).
            let Some(entry) = self.entries.get_mut(&key) else {
                continue;
            };
            let Some(reason) = entry.pending.take() else {
                continue;
            };
            entry.phase = RenderPhase::Rendering;
            entry.suppressed = true;
            self.pending -= 1;
            return Some((key, reason));
        }
        None
    }

    /// Lifts invalidation suppression for an instance mid-render.
    ///
    /// Called after the pre-render hooks have run; state changes from this
    /// point on queue a fresh render.
    pub fn resume_invalidation(&mut self, key: K) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.suppressed = false;
        }
    }

    /// Completes a render taken with [`take_next`](Self::take_next).
    ///
    /// The instance returns to [`RenderPhase::Clean`], or straight to
    /// [`RenderPhase::Invalidated`] if a fresh render was queued after
    /// suppression was lifted.
    pub fn finish_render(&mut self, key: K) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.rendered = true;
            entry.suppressed = false;
            entry.phase = if entry.pending.is_some() {
                RenderPhase::Invalidated
            } else {
                RenderPhase::Clean
            };
        }
    }

    /// Returns the phase of a registered instance.
    #[must_use]
    pub fn phase(&self, key: K) -> Option<RenderPhase> {
        self.entries.get(&key).map(|entry| entry.phase)
    }

    /// Returns `true` if any renders are queued.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    /// Returns the number of queued renders (one per pending instance).
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: InvalidationReason = InvalidationReason::Property { name: "text" };

    fn rendered_scheduler(keys: &[u32]) -> RenderScheduler<u32> {
        let mut scheduler = RenderScheduler::new();
        for &key in keys {
            scheduler.register(key);
            scheduler.mark_rendered(key);
        }
        scheduler
    }

    #[test]
    fn invalidations_coalesce_keeping_first_reason() {
        let mut scheduler = rendered_scheduler(&[1]);

        assert_eq!(scheduler.invalidate(1, TEXT), InvalidateOutcome::Scheduled);
        assert_eq!(scheduler.phase(1), Some(RenderPhase::Invalidated));
        assert_eq!(
            scheduler.invalidate(1, InvalidationReason::Slots),
            InvalidateOutcome::Coalesced
        );
        assert_eq!(
            scheduler.invalidate(1, InvalidationReason::Forced),
            InvalidateOutcome::Coalesced
        );
        assert_eq!(scheduler.pending_len(), 1);

        assert_eq!(scheduler.take_next(), Some((1, TEXT)));
        assert_eq!(scheduler.take_next(), None);
    }

    #[test]
    fn pre_first_render_invalidations_absorbed() {
        let mut scheduler = RenderScheduler::new();
        scheduler.register(1_u32);

        assert_eq!(scheduler.invalidate(1, TEXT), InvalidateOutcome::NotRendered);
        assert!(!scheduler.has_pending());

        scheduler.mark_rendered(1);
        assert_eq!(scheduler.invalidate(1, TEXT), InvalidateOutcome::Scheduled);
    }

    #[test]
    fn unknown_key() {
        let mut scheduler = RenderScheduler::<u32>::new();
        assert_eq!(scheduler.invalidate(7, TEXT), InvalidateOutcome::Unknown);
        assert_eq!(scheduler.phase(7), None);
    }

    #[test]
    fn suppression_during_render() {
        let mut scheduler = rendered_scheduler(&[1]);
        scheduler.invalidate(1, TEXT);

        let (key, _) = scheduler.take_next().unwrap();
        assert_eq!(scheduler.phase(key), Some(RenderPhase::Rendering));

        // Hook-driven writes while suppressed fold into this render.
        assert_eq!(scheduler.invalidate(key, TEXT), InvalidateOutcome::Suppressed);

        // After the guard lifts, new writes queue a fresh render.
        scheduler.resume_invalidation(key);
        assert_eq!(
            scheduler.invalidate(key, InvalidationReason::Child),
            InvalidateOutcome::Scheduled
        );

        scheduler.finish_render(key);
        assert_eq!(scheduler.phase(key), Some(RenderPhase::Invalidated));
        assert_eq!(
            scheduler.take_next(),
            Some((key, InvalidationReason::Child))
        );
        scheduler.resume_invalidation(key);
        scheduler.finish_render(key);
        assert_eq!(scheduler.phase(key), Some(RenderPhase::Clean));
    }

    #[test]
    fn queue_is_fifo_across_instances() {
        let mut scheduler = rendered_scheduler(&[1, 2, 3]);
        scheduler.invalidate(2, InvalidationReason::Slots);
        scheduler.invalidate(1, TEXT);
        scheduler.invalidate(3, InvalidationReason::Forced);

        assert_eq!(scheduler.take_next(), Some((2, InvalidationReason::Slots)));
        assert_eq!(scheduler.take_next(), Some((1, TEXT)));
        assert_eq!(scheduler.take_next(), Some((3, InvalidationReason::Forced)));
        assert_eq!(scheduler.take_next(), None);
    }

    #[test]
    fn unregister_drops_pending_render() {
        let mut scheduler = rendered_scheduler(&[1, 2]);
        scheduler.invalidate(1, TEXT);
        scheduler.invalidate(2, InvalidationReason::Slots);

        scheduler.unregister(1);
        assert_eq!(scheduler.pending_len(), 1);
        assert_eq!(scheduler.take_next(), Some((2, InvalidationReason::Slots)));
        assert_eq!(scheduler.take_next(), None);
    }

    #[test]
    fn reregister_resets_tracking() {
        let mut scheduler = rendered_scheduler(&[1]);
        scheduler.invalidate(1, TEXT);

        scheduler.register(1);
        assert_eq!(scheduler.pending_len(), 0);
        // The stale queue entry is skipped.
        assert_eq!(scheduler.take_next(), None);
        // And the fresh registration absorbs pre-render invalidations again.
        assert_eq!(scheduler.invalidate(1, TEXT), InvalidateOutcome::NotRendered);
    }
}
