//! Copy-on-write dependent object lists.
//!
//! Readers take a snapshot and iterate it without holding anything; writers
//! build the next list from the current one and swap it in. A snapshot
//! handed out before a write keeps showing the old contents.

use crate::types::ObjectId;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Objects whose relevancy piggybacks on an owner object.
#[derive(Debug)]
pub struct DependentActorList {
    current: ArcSwap<Vec<ObjectId>>,
}

impl DependentActorList {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Stable view of the current dependents
    pub fn snapshot(&self) -> Arc<Vec<ObjectId>> {
        self.current.load_full()
    }

    /// Private copy of the current list for a writer to mutate and commit.
    pub fn prepare_for_write(&self) -> Vec<ObjectId> {
        self.current.load().iter().copied().collect()
    }

    fn commit(&self, next: Vec<ObjectId>) {
        self.current.store(Arc::new(next));
    }

    /// Adds a dependent. Returns `false` if it was already present.
    pub fn add(&self, dependent: ObjectId) -> bool {
        let mut next = self.prepare_for_write();
        if next.contains(&dependent) {
            return false;
        }
        next.push(dependent);
        self.commit(next);
        true
    }

    /// Removes a dependent. Returns `false` if it was absent.
    pub fn remove(&self, dependent: ObjectId) -> bool {
        let mut next = self.prepare_for_write();
        let Some(position) = next.iter().position(|d| *d == dependent) else {
            return false;
        };
        next.remove(position);
        self.commit(next);
        true
    }

    pub fn contains(&self, dependent: ObjectId) -> bool {
        self.current.load().contains(&dependent)
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

impl Default for DependentActorList {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DependentActorList {
    fn clone(&self) -> Self {
        Self {
            current: ArcSwap::new(self.current.load_full()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_stable_across_writes() {
        let list = DependentActorList::new();
        let weapon = ObjectId::new();
        let hat = ObjectId::new();

        assert!(list.add(weapon));
        let before = list.snapshot();

        assert!(list.add(hat));
        assert!(list.remove(weapon));

        assert_eq!(before.as_slice(), &[weapon]);
        assert_eq!(list.snapshot().as_slice(), &[hat]);
    }

    #[test]
    fn test_add_and_remove_report_changes() {
        let list = DependentActorList::new();
        let weapon = ObjectId::new();
        assert!(list.add(weapon));
        assert!(!list.add(weapon));
        assert_eq!(list.len(), 1);
        assert!(list.remove(weapon));
        assert!(!list.remove(weapon));
        assert!(list.is_empty());
    }
}
