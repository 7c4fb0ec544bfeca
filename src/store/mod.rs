//! Ordered, capacity-bounded timeline item store.
//!
//! The store is the single source of truth for a session's row list:
//! strictly sorted newest-first, no duplicate ids, trimmed from the tail
//! when it outgrows its capacity. All bulk mutation goes through
//! [`ItemStore::merge`].

mod merge;

pub use merge::{MergeMode, MergeResult};

use crate::models::{Item, ItemId};

/// Default row cap per timeline session.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Ordered, capacity-bounded collection of timeline items.
#[derive(Debug, Clone)]
pub struct ItemStore {
    /// Rows, strictly sorted newest-first with unique ids
    pub(crate) items: Vec<Item>,
    /// Maximum number of rows retained
    pub(crate) capacity: usize,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    /// Create an empty store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty store with an explicit capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Configured row cap.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of rows currently held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ordered view of the rows (newest first).
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Look up a row by id.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether a row with this id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The newest row, if any.
    pub fn newest(&self) -> Option<&Item> {
        self.items.first()
    }

    /// The oldest row, if any.
    pub fn oldest(&self) -> Option<&Item> {
        self.items.last()
    }

    /// Ids in row order (newest first).
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    /// Remove a single row, e.g. for a deletion event.
    ///
    /// Returns `true` if the row existed and was removed. No-op if absent.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Drop all rows.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Clone the newest `limit` rows, for host-side persistence.
    pub fn head(&self, limit: usize) -> Vec<Item> {
        self.items.iter().take(limit).cloned().collect()
    }
}
