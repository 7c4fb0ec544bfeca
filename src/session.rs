//! Timeline session: the surface the UI layer talks to.
//!
//! One session owns one store/coordinator pair; independent timelines
//! (tabs) each get their own session and share nothing. Structural
//! changes are delivered as [`RenderPlan`] values through per-session
//! subscription callbacks rather than any global broadcast.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coordinator::{FetchCoordinator, FetchState};
use crate::error::{TimelineError, TimelineResult};
use crate::models::{Item, ItemId};
use crate::planner::{RenderPlan, RenderPlanner, RowRef};
use crate::store::{ItemStore, MergeMode};
use crate::traits::ItemSource;

type RenderPlanHandler = Arc<dyn Fn(&RenderPlan) + Send + Sync>;
type AcceptFn = Box<dyn Fn(&Item) -> bool + Send + Sync>;

/// Point-in-time export of the newest rows, for host-side persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
    /// Newest rows, in timeline order
    pub items: Vec<Item>,
}

/// A timeline session bound to one [`ItemSource`].
pub struct TimelineSession<S> {
    coordinator: FetchCoordinator<S>,
    subscribers: Mutex<Vec<RenderPlanHandler>>,
    accept: Mutex<Option<AcceptFn>>,
    first_visible: Mutex<Option<ItemId>>,
}

impl<S: ItemSource> TimelineSession<S> {
    /// Create a session with the default row capacity.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_store(source, ItemStore::new())
    }

    /// Create a session with an explicit row capacity.
    pub fn with_capacity(source: Arc<S>, capacity: usize) -> Self {
        Self::with_store(source, ItemStore::with_capacity(capacity))
    }

    fn with_store(source: Arc<S>, store: ItemStore) -> Self {
        Self {
            coordinator: FetchCoordinator::with_store(source, store),
            subscribers: Mutex::new(Vec::new()),
            accept: Mutex::new(None),
            first_visible: Mutex::new(None),
        }
    }

    /// Subscribe to structural diffs. Handlers run on the task that
    /// completed the merge, after the store already reflects the change,
    /// and may call back into the session.
    pub fn on_render_plan(&self, handler: impl Fn(&RenderPlan) + Send + Sync + 'static) {
        self.subscribers.lock().unwrap().push(Arc::new(handler));
    }

    /// Install the accept filter applied to pushed items.
    pub fn set_accept(&self, predicate: impl Fn(&Item) -> bool + Send + Sync + 'static) {
        *self.accept.lock().unwrap() = Some(Box::new(predicate));
    }

    /// Report which row is currently at the top of the viewport; it
    /// becomes the anchor of subsequent render plans.
    pub fn set_first_visible(&self, id: Option<ItemId>) {
        *self.first_visible.lock().unwrap() = id;
    }

    /// Fetch the page past the oldest known row.
    pub async fn load_older(&self) -> TimelineResult<()> {
        let outcome = self.coordinator.load_older().await?;
        self.publish(&outcome.before, &outcome.after);
        Ok(())
    }

    /// Fetch rows newer than the newest known row. On an empty store
    /// this degrades to [`TimelineSession::refresh`].
    pub async fn load_newer(&self) -> TimelineResult<()> {
        if self.coordinator.read_store(|store| store.is_empty()) {
            return self.refresh().await;
        }
        let outcome = self.coordinator.load_newer().await?;
        self.publish(&outcome.before, &outcome.after);
        Ok(())
    }

    /// Load the cold-start cache snapshot, replacing the store.
    pub async fn load_snapshot(&self) -> TimelineResult<()> {
        let outcome = self.coordinator.load_snapshot().await?;
        self.publish(&outcome.before, &outcome.after);
        Ok(())
    }

    /// Fetch from the top of the feed and replace the store wholesale.
    pub async fn refresh(&self) -> TimelineResult<()> {
        let outcome = self.coordinator.refresh().await?;
        self.publish(&outcome.before, &outcome.after);
        Ok(())
    }

    /// Scroll-triggered auto-fetch. Issues an older fetch only when
    /// idle; repeated signals while one is in flight are coalesced.
    ///
    /// Returns whether a fetch was actually dispatched.
    pub async fn scrolled_near_bottom(&self) -> TimelineResult<bool> {
        if self.coordinator.read_store(|store| store.is_empty()) {
            return Ok(false);
        }
        match self.coordinator.load_older().await {
            Ok(outcome) => {
                self.publish(&outcome.before, &outcome.after);
                Ok(true)
            }
            Err(err) if err.is_busy() => {
                tracing::debug!("scroll fetch coalesced; one already in flight");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Insert streamed items out of band (no fetch, no single-flight
    /// interaction). The accept filter decides which items belong to
    /// this timeline; nothing is published when none survive it.
    pub fn push_newer(&self, items: Vec<Item>) -> TimelineResult<()> {
        if self.coordinator.is_closed() {
            return Err(TimelineError::Closed);
        }
        let accepted: Vec<Item> = {
            let accept = self.accept.lock().unwrap();
            match accept.as_ref() {
                Some(predicate) => items.into_iter().filter(|item| predicate(item)).collect(),
                None => items,
            }
        };
        if accepted.is_empty() {
            return Ok(());
        }
        let outcome = self.coordinator.apply(accepted, MergeMode::Newer)?;
        self.publish(&outcome.before, &outcome.after);
        Ok(())
    }

    /// Remove one row for a deletion event. Publishes a delete-only plan
    /// when the row existed; `Ok(false)` otherwise.
    pub fn delete_item(&self, id: &str) -> TimelineResult<bool> {
        if self.coordinator.is_closed() {
            return Err(TimelineError::Closed);
        }
        match self.coordinator.apply_remove(id) {
            Some((before, after)) => {
                self.publish(&before, &after);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Read-only ordered snapshot of the rows.
    pub fn items(&self) -> Vec<Item> {
        self.coordinator.read_store(|store| store.items().to_vec())
    }

    /// Number of rows currently held.
    pub fn len(&self) -> usize {
        self.coordinator.read_store(|store| store.len())
    }

    /// Whether the session holds no rows.
    pub fn is_empty(&self) -> bool {
        self.coordinator.read_store(|store| store.is_empty())
    }

    /// Export the newest `limit` rows for the host's persistence layer.
    pub fn cache_snapshot(&self, limit: usize) -> CacheSnapshot {
        CacheSnapshot {
            taken_at: Utc::now(),
            items: self.coordinator.read_store(|store| store.head(limit)),
        }
    }

    /// Current fetch gate state.
    pub fn fetch_state(&self) -> FetchState {
        self.coordinator.state()
    }

    /// Tear the session down. In-flight fetch results are discarded;
    /// subsequent operations fail with [`TimelineError::Closed`].
    pub fn close(&self) {
        self.coordinator.close();
    }

    /// Whether the session was torn down.
    pub fn is_closed(&self) -> bool {
        self.coordinator.is_closed()
    }

    fn publish(&self, before: &[RowRef], after: &[RowRef]) {
        let first_visible = self.first_visible.lock().unwrap().clone();
        let plan = RenderPlanner::plan(before, after, first_visible.as_deref());
        // Handlers may re-enter the session and publish again, so the
        // subscriber list is cloned out and the lock released first.
        let subscribers: Vec<RenderPlanHandler> = self.subscribers.lock().unwrap().clone();
        for handler in &subscribers {
            handler(&plan);
        }
    }
}
