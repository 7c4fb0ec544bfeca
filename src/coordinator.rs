//! Single-flight fetch coordination.
//!
//! The coordinator is the only path that talks to the [`ItemSource`] and
//! the only writer of the store. It is a two-state machine (`Idle` /
//! `Fetching`): requests arriving while a fetch is in flight are rejected
//! with [`TimelineError::Busy`] without contacting the collaborator, which
//! keeps concurrent completions from racing on one store. The gate is
//! released by a guard on drop, so the coordinator returns to `Idle`
//! after any outcome.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::cursor::{FetchDirection, PaginationCursor};
use crate::error::{TimelineError, TimelineResult};
use crate::models::Item;
use crate::planner::{row_refs, RowRef};
use crate::store::{ItemStore, MergeMode, MergeResult};
use crate::traits::ItemSource;

/// Fetch gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// No fetch outstanding
    Idle,
    /// Exactly one fetch in flight
    Fetching,
}

/// RAII gate guard; restores `Idle` when dropped.
struct FetchGuard<'a> {
    state: &'a Mutex<FetchState>,
}

impl<'a> FetchGuard<'a> {
    fn acquire(state: &'a Mutex<FetchState>) -> TimelineResult<Self> {
        let mut current = state.lock().unwrap();
        if *current == FetchState::Fetching {
            return Err(TimelineError::Busy);
        }
        *current = FetchState::Fetching;
        Ok(Self { state })
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap() = FetchState::Idle;
    }
}

/// Everything a merge produced, captured for render planning.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Row references before the merge
    pub before: Vec<RowRef>,
    /// Row references after the merge
    pub after: Vec<RowRef>,
    /// Counts and positions reported by the store
    pub result: MergeResult,
}

/// Serializes fetches against one store: at most one in flight, merges
/// applied in fetch-initiation order by construction.
pub struct FetchCoordinator<S> {
    source: Arc<S>,
    store: Mutex<ItemStore>,
    state: Mutex<FetchState>,
    closed: AtomicBool,
}

impl<S: ItemSource> FetchCoordinator<S> {
    /// Create a coordinator over an empty store with the default capacity.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_store(source, ItemStore::new())
    }

    /// Create a coordinator over a pre-configured store.
    pub fn with_store(source: Arc<S>, store: ItemStore) -> Self {
        Self {
            source,
            store: Mutex::new(store),
            state: Mutex::new(FetchState::Idle),
            closed: AtomicBool::new(false),
        }
    }

    /// Current gate state.
    pub fn state(&self) -> FetchState {
        *self.state.lock().unwrap()
    }

    /// Whether no fetch is outstanding.
    pub fn is_idle(&self) -> bool {
        self.state() == FetchState::Idle
    }

    /// Mark the owning session as torn down. Fetch results resolving
    /// after this point are discarded without merging.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Whether the owning session was torn down.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Read the store under its lock.
    pub fn read_store<R>(&self, f: impl FnOnce(&ItemStore) -> R) -> R {
        f(&self.store.lock().unwrap())
    }

    /// Fetch the page past the oldest known row and append it.
    pub async fn load_older(&self) -> TimelineResult<MergeOutcome> {
        self.run(FetchDirection::Older, MergeMode::Older, true).await
    }

    /// Fetch rows since the newest known row and prepend them.
    pub async fn load_newer(&self) -> TimelineResult<MergeOutcome> {
        self.run(FetchDirection::Newer, MergeMode::Newer, true).await
    }

    /// Load the cold-start cache snapshot, replacing the store.
    pub async fn load_snapshot(&self) -> TimelineResult<MergeOutcome> {
        self.run(FetchDirection::Snapshot, MergeMode::Snapshot, true)
            .await
    }

    /// Fetch from the top of the feed and replace the store wholesale.
    pub async fn refresh(&self) -> TimelineResult<MergeOutcome> {
        self.run(FetchDirection::Older, MergeMode::Snapshot, false)
            .await
    }

    async fn run(
        &self,
        direction: FetchDirection,
        mode: MergeMode,
        use_cursor: bool,
    ) -> TimelineResult<MergeOutcome> {
        if self.is_closed() {
            return Err(TimelineError::Closed);
        }
        let _guard = FetchGuard::acquire(&self.state).map_err(|err| {
            tracing::debug!(?direction, "fetch rejected: one already in flight");
            err
        })?;

        let boundary = if use_cursor {
            let store = self.store.lock().unwrap();
            PaginationCursor::from_store(&store).and_then(|cursor| cursor.next(direction))
        } else {
            None
        };
        tracing::debug!(?direction, boundary = boundary.as_deref(), "dispatching fetch");

        let items = match direction {
            FetchDirection::Older => self.source.fetch_older(boundary.as_deref()).await?,
            FetchDirection::Newer => self.source.fetch_newer(boundary.as_deref()).await?,
            FetchDirection::Snapshot => self.source.fetch_snapshot().await?,
        };

        if self.is_closed() {
            tracing::debug!(?direction, "fetch resolved after close; discarding result");
            return Err(TimelineError::Closed);
        }
        self.apply(items, mode)
    }

    /// Merge a batch under the store lock. Shared by the fetch path and
    /// out-of-band pushes.
    pub(crate) fn apply(&self, items: Vec<Item>, mode: MergeMode) -> TimelineResult<MergeOutcome> {
        let mut store = self.store.lock().unwrap();
        let before = row_refs(store.items());
        let batch_len = items.len();
        let result = store.merge(items, mode);
        if batch_len > 0 && result.invalid == batch_len {
            // Losing every item to ordering validation means the backend
            // answered a different question than we asked.
            return Err(TimelineError::InvalidMerge {
                dropped: result.invalid,
            });
        }
        let after = row_refs(store.items());
        Ok(MergeOutcome {
            before,
            after,
            result,
        })
    }

    /// Remove one row. Returns the before/after row references when the
    /// row existed.
    pub(crate) fn apply_remove(&self, id: &str) -> Option<(Vec<RowRef>, Vec<RowRef>)> {
        let mut store = self.store.lock().unwrap();
        let before = row_refs(store.items());
        if !store.remove(id) {
            return None;
        }
        let after = row_refs(store.items());
        Some((before, after))
    }
}
