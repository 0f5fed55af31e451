//! Identifier-keyed selection sets.
//!
//! A [`SelectionSet`] holds the entities a user has marked for a batch
//! operation. Membership is decided by identifier, never by instance, so a
//! task re-fetched from the backend toggles off the copy selected before the
//! refetch.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::models::{Employee, EmployeeId, Task, TaskId};

/// An entity that can be placed in a [`SelectionSet`].
pub trait Selectable: Clone {
    type Id: Copy + Eq + Hash + std::fmt::Debug;

    fn selection_id(&self) -> Self::Id;
}

impl Selectable for Task {
    type Id = TaskId;

    fn selection_id(&self) -> TaskId {
        self.task_id
    }
}

impl Selectable for Employee {
    type Id = EmployeeId;

    fn selection_id(&self) -> EmployeeId {
        self.employee_id
    }
}

/// Set of entities keyed by identifier, iterated in insertion order.
///
/// Entries map `id -> (sequence, entity)`; `order` maps the sequence back to
/// the id so iteration follows insertion without scanning for membership.
#[derive(Debug, Clone)]
pub struct SelectionSet<T: Selectable> {
    entries: HashMap<T::Id, (u64, T)>,
    order: BTreeMap<u64, T::Id>,
    next_seq: u64,
}

impl<T: Selectable> Default for SelectionSet<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<T: Selectable> SelectionSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the entity if its id is selected, otherwise add it.
    ///
    /// Returns `true` when the entity is selected after the call.
    pub fn toggle(&mut self, entity: T) -> bool {
        let id = entity.selection_id();
        if self.remove(id) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, id);
        self.entries.insert(id, (seq, entity));
        true
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: T::Id) -> bool {
        match self.entries.remove(&id) {
            Some((seq, _)) => {
                self.order.remove(&seq);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selected entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.order
            .values()
            .filter_map(move |id| self.entries.get(id).map(|(_, entity)| entity))
    }

    /// Selected identifiers in insertion order.
    pub fn ids(&self) -> Vec<T::Id> {
        self.order.values().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        label: &'static str,
    }

    impl Selectable for Item {
        type Id = u32;

        fn selection_id(&self) -> u32 {
            self.id
        }
    }

    fn item(id: u32, label: &'static str) -> Item {
        Item { id, label }
    }

    #[test]
    fn reinsertion_moves_to_the_end() {
        let mut set = SelectionSet::new();
        set.toggle(item(1, "a"));
        set.toggle(item(2, "b"));
        set.toggle(item(1, "a"));
        set.toggle(item(1, "a"));

        assert_eq!(set.ids(), vec![2, 1]);
    }

    #[test]
    fn membership_ignores_instance_fields() {
        let mut set = SelectionSet::new();
        set.toggle(item(5, "before refetch"));
        let selected = set.toggle(item(5, "after refetch"));

        assert!(!selected);
        assert!(set.is_empty());
    }

    #[test]
    fn iter_returns_stored_entities() {
        let mut set = SelectionSet::new();
        set.toggle(item(3, "c"));
        set.toggle(item(1, "a"));

        let labels: Vec<_> = set.iter().map(|i| i.label).collect();
        assert_eq!(labels, vec!["c", "a"]);
    }
}
