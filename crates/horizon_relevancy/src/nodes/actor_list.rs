//! Flat routing container
use crate::types::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered list of objects relevant through one routing rule.
///
/// Removal swaps the last element into the freed slot, so order is stable
/// between mutations but not across removals.
#[derive(Debug, Clone, Default)]
pub struct ActorListNode {
    objects: Vec<ObjectId>,
    index: HashMap<ObjectId, usize>,
    stats: NodeStats,
}

impl ActorListNode {
    /// Creates an empty node
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object. Returns `false` if it was already present.
    pub fn add(&mut self, object: ObjectId) -> bool {
        if self.index.contains_key(&object) {
            return false;
        }
        self.index.insert(object, self.objects.len());
        self.objects.push(object);
        self.stats.additions += 1;
        self.stats.update_peak(self.objects.len());
        true
    }

    /// Removes an object. Returns `false` if it was absent.
    pub fn remove(&mut self, object: ObjectId) -> bool {
        let Some(slot) = self.index.remove(&object) else {
            return false;
        };
        self.objects.swap_remove(slot);
        if let Some(moved) = self.objects.get(slot) {
            self.index.insert(*moved, slot);
        }
        self.stats.removals += 1;
        true
    }

    /// Checks if the node contains an object
    pub fn contains(&self, object: ObjectId) -> bool {
        self.index.contains_key(&object)
    }

    /// Objects in gather order
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Appends the node's contents to `out`
    pub fn gather_into(&self, out: &mut Vec<ObjectId>) {
        out.extend_from_slice(&self.objects);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Drops every object
    pub fn reset(&mut self) {
        self.stats.removals += self.objects.len() as u64;
        self.objects.clear();
        self.index.clear();
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }
}

/// Statistics for a routing container
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NodeStats {
    /// Number of objects added
    pub additions: u64,
    /// Number of objects removed, resets included
    pub removals: u64,
    /// Peak object count
    pub peak_len: usize,
}

impl NodeStats {
    /// Updates peak object count
    pub fn update_peak(&mut self, current_len: usize) {
        if current_len > self.peak_len {
            self.peak_len = current_len;
        }
    }

    /// Additions plus removals
    pub fn churn(&self) -> u64 {
        self.additions + self.removals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_rejects_duplicates() {
        let mut node = ActorListNode::new();
        let object = ObjectId::new();
        assert!(node.add(object));
        assert!(!node.add(object));
        assert_eq!(node.len(), 1);
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut node = ActorListNode::new();
        let ids: Vec<ObjectId> = (0..4).map(|_| ObjectId::new()).collect();
        for id in &ids {
            node.add(*id);
        }

        assert!(node.remove(ids[0]));
        assert!(!node.remove(ids[0]));
        assert_eq!(node.objects(), &[ids[3], ids[1], ids[2]]);

        // The moved element must still be removable through the index.
        assert!(node.remove(ids[3]));
        assert_eq!(node.objects(), &[ids[2], ids[1]]);
        assert!(node.contains(ids[1]));
        assert!(!node.contains(ids[3]));
    }

    #[test]
    fn test_reset_counts_removals() {
        let mut node = ActorListNode::new();
        node.add(ObjectId::new());
        node.add(ObjectId::new());
        node.reset();
        assert!(node.is_empty());
        assert_eq!(node.stats().additions, 2);
        assert_eq!(node.stats().removals, 2);
        assert_eq!(node.stats().peak_len, 2);
        assert_eq!(node.stats().churn(), 4);
    }
}
