// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child-change watch tables.
//!
//! A slot declared with a `listen_for` interest keeps its parent informed of
//! the distributed children's property changes. [`ChildWatchTable`] is the
//! runtime's record of those subscriptions: which child reports to which
//! parent, and which properties are worth reporting.

use core::hash::Hash;

use hashbrown::HashMap;

use bracken_property::ListenFor;

#[derive(Clone, Debug)]
struct WatchEntry<K> {
    parent: K,
    slot: &'static str,
    filter: ListenFor,
}

/// Subscriptions from distributed children to their slot parents.
///
/// A child has at most one watching parent (it occupies one slot at a time).
/// Change reports for detached or never-attached children are safe no-ops.
///
/// # Example
///
/// ```
/// use bracken_property::ListenFor;
/// use bracken_slots::ChildWatchTable;
///
/// let mut table = ChildWatchTable::<u32>::new();
/// table.attach(10, 1, "items", ListenFor::props(["selected"]).exclude(["text"]));
///
/// assert_eq!(table.on_child_change(10, "selected"), Some(1));
/// assert_eq!(table.on_child_change(10, "text"), None); // excluded
/// assert_eq!(table.on_child_change(99, "selected"), None); // not watched
///
/// table.detach(10);
/// assert_eq!(table.on_child_change(10, "selected"), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ChildWatchTable<K>
where
    K: Copy + Eq + Hash,
{
    entries: HashMap<K, WatchEntry<K>>,
}

impl<K> ChildWatchTable<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Subscribes `parent` to changes of `child`, distributed into `slot`.
    ///
    /// A child redistributed elsewhere is simply re-attached; the previous
    /// subscription is replaced.
    pub fn attach(&mut self, child: K, parent: K, slot: &'static str, filter: ListenFor) {
        self.entries.insert(
            child,
            WatchEntry {
                parent,
                slot,
                filter,
            },
        );
    }

    /// Removes the subscription for `child`, if any.
    pub fn detach(&mut self, child: K) {
        self.entries.remove(&child);
    }

    /// Removes every subscription a parent holds through one slot.
    ///
    /// Used when a slot's contents are about to be redistributed.
    pub fn detach_parent_slot(&mut self, parent: K, slot: &str) {
        self.entries
            .retain(|_, entry| !(entry.parent == parent && entry.slot == slot));
    }

    /// Removes every subscription involving `key`, as child or as parent.
    ///
    /// Used when an instance leaves the tree entirely.
    pub fn detach_all(&mut self, key: K) {
        self.entries
            .retain(|&child, entry| child != key && entry.parent != key);
    }

    /// Reports a property change of `child`.
    ///
    /// Returns the watching parent when the change passes the slot's filter,
    /// `None` for unwatched children or filtered-out properties.
    #[must_use]
    pub fn on_child_change(&self, child: K, property: &str) -> Option<K> {
        let entry = self.entries.get(&child)?;
        entry.filter.matches(property).then_some(entry.parent)
    }

    /// Returns `true` if `child` currently reports to a parent.
    #[must_use]
    pub fn is_watched(&self, child: K) -> bool {
        self.entries.contains_key(&child)
    }

    /// Returns the number of active subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no subscriptions are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_routing() {
        let mut table = ChildWatchTable::<u32>::new();
        table.attach(10, 1, "items", ListenFor::all().exclude(["internal"]));

        assert_eq!(table.on_child_change(10, "anything"), Some(1));
        assert_eq!(table.on_child_change(10, "internal"), None);
    }

    #[test]
    fn named_filter_routing() {
        let mut table = ChildWatchTable::<u32>::new();
        table.attach(10, 1, "items", ListenFor::props(["selected", "enabled"]));

        assert_eq!(table.on_child_change(10, "selected"), Some(1));
        assert_eq!(table.on_child_change(10, "text"), None);
    }

    #[test]
    fn detached_child_is_a_no_op() {
        let mut table = ChildWatchTable::<u32>::new();
        table.attach(10, 1, "items", ListenFor::all());
        table.detach(10);

        assert_eq!(table.on_child_change(10, "selected"), None);
        assert!(!table.is_watched(10));
    }

    #[test]
    fn detach_parent_slot_only_clears_that_slot() {
        let mut table = ChildWatchTable::<u32>::new();
        table.attach(10, 1, "items", ListenFor::all());
        table.attach(11, 1, "items", ListenFor::all());
        table.attach(12, 1, "header", ListenFor::all());
        table.attach(13, 2, "items", ListenFor::all());

        table.detach_parent_slot(1, "items");

        assert!(!table.is_watched(10));
        assert!(!table.is_watched(11));
        assert!(table.is_watched(12));
        assert!(table.is_watched(13));
    }

    #[test]
    fn detach_all_clears_both_roles() {
        let mut table = ChildWatchTable::<u32>::new();
        table.attach(10, 1, "items", ListenFor::all());
        table.attach(1, 5, "items", ListenFor::all());

        table.detach_all(1);
        assert!(table.is_empty());
    }

    #[test]
    fn reattach_replaces_subscription() {
        let mut table = ChildWatchTable::<u32>::new();
        table.attach(10, 1, "items", ListenFor::all());
        table.attach(10, 2, "header", ListenFor::props(["text"]));

        assert_eq!(table.len(), 1);
        assert_eq!(table.on_child_change(10, "text"), Some(2));
        assert_eq!(table.on_child_change(10, "selected"), None);
    }
}
