//! Insertion-ordered entity storage.
//!
//! Update order inside a group is significant (it is the order entities
//! were spawned), so a [`Registry`] keeps its entries in a `Vec` rather
//! than a hash map. Ids are handed out monotonically, which keeps the
//! vector sorted by id and lets lookups binary-search.

use serde::{Deserialize, Serialize};

use crate::components::EntityId;

/// Id-keyed storage that iterates in insertion order.
///
/// # Example
///
/// ```
/// use salvo_core::storage::Registry;
///
/// let mut names = Registry::new();
/// let a = names.insert("first");
/// let b = names.insert("second");
/// assert!(a < b);
///
/// names.remove(a);
/// assert_eq!(names.get(b), Some(&"second"));
/// assert_eq!(names.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry<T> {
    entries: Vec<(EntityId, T)>,
    next_id: EntityId,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    /// Create an empty registry. The first id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Store a value and return its id.
    pub fn insert(&mut self, value: T) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, value));
        id
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |(key, _)| *key).ok()
    }

    /// Get a value by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.index_of(id).map(|index| &self.entries[index].1)
    }

    /// Get a mutable value by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        let index = self.index_of(id)?;
        Some(&mut self.entries[index].1)
    }

    /// Check if an id is live.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// Remove a value by id.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let index = self.index_of(id)?;
        Some(self.entries.remove(index).1)
    }

    /// Remove the entry at a position. Out-of-range positions are a no-op.
    pub fn remove_at(&mut self, index: usize) -> Option<(EntityId, T)> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Keep only the entries the predicate accepts, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(EntityId, &mut T) -> bool) {
        self.entries.retain_mut(|(id, value)| keep(*id, value));
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Ids are not reused.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    /// Iterate mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entries.iter_mut().map(|(id, value)| (*id, value))
    }

    /// Iterate over values only.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Entry at a position.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<(EntityId, &T)> {
        self.entries.get(index).map(|(id, value)| (*id, value))
    }

    /// Mutable access to two distinct positions at once.
    ///
    /// Returns `None` when the positions are equal or out of range.
    pub fn pair_mut(&mut self, first: usize, second: usize) -> Option<(&mut T, &mut T)> {
        if first == second || first >= self.entries.len() || second >= self.entries.len() {
            return None;
        }
        if first < second {
            let (head, tail) = self.entries.split_at_mut(second);
            Some((&mut head[first].1, &mut tail[0].1))
        } else {
            let (head, tail) = self.entries.split_at_mut(first);
            Some((&mut tail[0].1, &mut head[second].1))
        }
    }
}
