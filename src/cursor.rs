//! Pagination cursor derived from store state.
//!
//! Tracks the oldest and newest known ids to compute fetch boundaries
//! (`max_id`/`since_id` equivalents). Recomputed from the store before
//! every fetch; `None` when the store is empty.

use crate::models::ItemId;
use crate::store::ItemStore;

/// Which end of the timeline a fetch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDirection {
    /// Page backwards past the oldest known row
    Older,
    /// Pull rows newer than the newest known row
    Newer,
    /// Cold-start cache snapshot; never carries a boundary
    Snapshot,
}

/// Fetch boundaries derived from the current store contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationCursor {
    /// Id of the newest row
    pub newest_id: ItemId,
    /// Id of the oldest row
    pub oldest_id: ItemId,
    /// Older-direction paging key of the oldest row (its reference id
    /// when it points at another item, else its own id)
    oldest_boundary_key: u64,
}

impl PaginationCursor {
    /// Derive a cursor from the store, or `None` when it is empty.
    pub fn from_store(store: &ItemStore) -> Option<Self> {
        let newest = store.newest()?;
        let oldest = store.oldest()?;
        Some(Self {
            newest_id: newest.id.clone(),
            oldest_id: oldest.id.clone(),
            oldest_boundary_key: oldest.boundary_key(),
        })
    }

    /// Boundary id for the next fetch in the given direction.
    ///
    /// `Older` is exclusive: the boundary is one below the oldest paging
    /// key, so the collaborator fetches strictly older rows. `Newer` is
    /// inclusive ("since" semantics); the overlap row comes back and is
    /// dropped as a duplicate on merge.
    pub fn next(&self, direction: FetchDirection) -> Option<ItemId> {
        match direction {
            FetchDirection::Older => {
                Some(self.oldest_boundary_key.saturating_sub(1).to_string())
            }
            FetchDirection::Newer => Some(self.newest_id.clone()),
            FetchDirection::Snapshot => None,
        }
    }
}
