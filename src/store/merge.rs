//! Merge operations for [`ItemStore`].
//!
//! A merge reconciles a freshly fetched batch into the ordered store:
//! dedup by id (existing rows win), mode-specific placement, then a tail
//! trim back down to capacity. Items that violate the mode's ordering
//! assumption are dropped and counted rather than failing the batch, so
//! the pipeline stays resilient to flaky backends.

use std::collections::HashSet;
use std::ops::Range;

use crate::models::{sort_timeline, Item};

use super::ItemStore;

/// Where a fetched batch lands relative to the current rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Batch is older than everything held; appended after the tail.
    Older,
    /// Batch is newer than everything held; prepended before the head.
    Newer,
    /// Batch replaces the store wholesale (cold-start cache, refresh).
    Snapshot,
}

/// Outcome of a single merge, in ordinal positions rather than any
/// UI-framework type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// Mode the merge ran in
    pub mode: MergeMode,
    /// Rows actually inserted (after dedup, validation and trim)
    pub inserted: usize,
    /// Incoming items dropped because their id was already present
    /// (in the store, or earlier in the same batch)
    pub duplicates: usize,
    /// Incoming items dropped for violating the mode's ordering assumption
    pub invalid: usize,
    /// Rows evicted by the capacity trim
    pub evicted: usize,
    /// Contiguous positions of the inserted rows in the post-merge list
    pub inserted_range: Option<Range<usize>>,
}

impl MergeResult {
    fn new(mode: MergeMode) -> Self {
        Self {
            mode,
            inserted: 0,
            duplicates: 0,
            invalid: 0,
            evicted: 0,
            inserted_range: None,
        }
    }
}

impl ItemStore {
    /// Merge a fetched batch into the store.
    ///
    /// Dedup: an incoming item whose id is already present is dropped —
    /// the existing row wins, since "newer" data is not guaranteed to be
    /// fresher for already-tracked ids. Within the batch, the first
    /// occurrence of an id wins.
    pub fn merge(&mut self, new_items: Vec<Item>, mode: MergeMode) -> MergeResult {
        let result = match mode {
            MergeMode::Snapshot => self.merge_snapshot(new_items),
            MergeMode::Older | MergeMode::Newer => self.merge_paged(new_items, mode),
        };
        tracing::debug!(
            mode = ?result.mode,
            inserted = result.inserted,
            duplicates = result.duplicates,
            invalid = result.invalid,
            evicted = result.evicted,
            rows = self.items.len(),
            "merge applied"
        );
        debug_assert!(self.items.len() <= self.capacity);
        result
    }

    fn merge_snapshot(&mut self, new_items: Vec<Item>) -> MergeResult {
        let mut result = MergeResult::new(MergeMode::Snapshot);
        let batch_len = new_items.len();

        let mut seen: HashSet<String> = HashSet::with_capacity(batch_len);
        let mut fresh: Vec<Item> = Vec::with_capacity(batch_len);
        for item in new_items {
            if !seen.insert(item.id.clone()) {
                continue;
            }
            fresh.push(item);
        }
        result.duplicates = batch_len - fresh.len();

        sort_timeline(&mut fresh);
        result.evicted = fresh.len().saturating_sub(self.capacity);
        fresh.truncate(self.capacity);
        result.inserted = fresh.len();
        if result.inserted > 0 {
            result.inserted_range = Some(0..result.inserted);
        }
        self.items = fresh;
        result
    }

    fn merge_paged(&mut self, new_items: Vec<Item>, mode: MergeMode) -> MergeResult {
        let mut result = MergeResult::new(mode);

        // Ordering bound the batch was pre-validated against: older items
        // must sort below the current oldest, newer items above the
        // current newest. Offenders are dropped, not fatal.
        let bound = match mode {
            MergeMode::Older => self.items.last().map(Item::sort_key),
            MergeMode::Newer => self.items.first().map(Item::sort_key),
            MergeMode::Snapshot => unreachable!("snapshot handled separately"),
        };

        let mut seen: HashSet<String> = self.items.iter().map(|item| item.id.clone()).collect();
        let mut fresh: Vec<Item> = Vec::with_capacity(new_items.len());
        for item in new_items {
            if seen.contains(&item.id) {
                result.duplicates += 1;
                continue;
            }
            if let Some(bound) = bound {
                let out_of_order = match mode {
                    MergeMode::Older => item.sort_key() >= bound,
                    MergeMode::Newer => item.sort_key() <= bound,
                    MergeMode::Snapshot => unreachable!(),
                };
                if out_of_order {
                    tracing::warn!(id = %item.id, ?mode, "dropping item out of merge order");
                    result.invalid += 1;
                    continue;
                }
            }
            seen.insert(item.id.clone());
            fresh.push(item);
        }
        sort_timeline(&mut fresh);

        let old_len = self.items.len();
        let fresh_len = fresh.len();
        match mode {
            MergeMode::Older => self.items.extend(fresh),
            MergeMode::Newer => {
                fresh.append(&mut self.items);
                self.items = fresh;
            }
            MergeMode::Snapshot => unreachable!(),
        }

        result.evicted = self.items.len().saturating_sub(self.capacity);
        self.items.truncate(self.capacity);

        match mode {
            MergeMode::Older => {
                // Appended rows sit at the tail; whatever the trim ate
                // came out of this batch first.
                result.inserted = self.items.len().saturating_sub(old_len);
                if result.inserted > 0 {
                    result.inserted_range = Some(old_len..self.items.len());
                }
            }
            MergeMode::Newer => {
                result.inserted = fresh_len.min(self.capacity);
                if result.inserted > 0 {
                    result.inserted_range = Some(0..result.inserted);
                }
            }
            MergeMode::Snapshot => unreachable!(),
        }
        result
    }
}
