use std::collections::{BTreeSet, HashSet};

use shared::domain::DogId;

/// Favorite selection with a lifecycle independent of the current page,
/// filter, and sort. Mutated only by explicit user toggles; the search and
/// match workflows read it but never change it.
#[derive(Debug, Default)]
pub struct FavoritesTracker {
    ids: HashSet<DogId>,
}

impl FavoritesTracker {
    /// Flips membership for `id` and returns the new membership.
    pub fn toggle(&mut self, id: &DogId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn contains(&self, id: &DogId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Sorted snapshot, so request bodies built from it are deterministic.
    pub fn snapshot(&self) -> Vec<DogId> {
        let ordered: BTreeSet<&DogId> = self.ids.iter().collect();
        ordered.into_iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_original_membership() {
        let mut tracker = FavoritesTracker::default();
        let id = DogId::from("d1");
        assert!(!tracker.contains(&id));
        assert!(tracker.toggle(&id));
        assert!(tracker.contains(&id));
        assert!(!tracker.toggle(&id));
        assert!(!tracker.contains(&id));
        assert_eq!(tracker.len(), 0);
    }

    #[test]
    fn snapshot_is_sorted_and_detached() {
        let mut tracker = FavoritesTracker::default();
        tracker.toggle(&DogId::from("z9"));
        tracker.toggle(&DogId::from("a1"));
        tracker.toggle(&DogId::from("m5"));
        assert_eq!(
            tracker.snapshot(),
            vec![DogId::from("a1"), DogId::from("m5"), DogId::from("z9")]
        );
        tracker.clear();
        assert!(tracker.is_empty());
    }
}
