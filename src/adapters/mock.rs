//! Mock item source for testing.
//!
//! Provides a configurable mock source that serves scripted batches or
//! errors per fetch direction, records every call for verification, and
//! can hold fetches in flight (pause/resume) so tests can observe the
//! single-flight gate deterministically.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{watch, Notify};

use crate::cursor::FetchDirection;
use crate::models::Item;
use crate::traits::{FetchError, ItemSource};

/// A recorded fetch call for verification in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    /// Which direction was requested
    pub direction: FetchDirection,
    /// Boundary id the engine passed
    pub boundary: Option<String>,
}

type ScriptedResponse = Result<Vec<Item>, FetchError>;

/// Mock item source.
///
/// Responses are queued per direction and consumed in order; an empty
/// queue serves an empty batch. Calls are recorded *before* the pause
/// gate, so a held fetch is observable via [`MockItemSource::calls`].
///
/// # Example
///
/// ```ignore
/// let source = Arc::new(MockItemSource::new());
/// source.push_older(Ok(vec![Item::new("5", Value::Null)]));
///
/// let session = TimelineSession::new(Arc::clone(&source));
/// session.load_older().await?;
///
/// assert_eq!(source.calls().len(), 1);
/// ```
#[derive(Debug)]
pub struct MockItemSource {
    older: Mutex<VecDeque<ScriptedResponse>>,
    newer: Mutex<VecDeque<ScriptedResponse>>,
    snapshot: Mutex<VecDeque<ScriptedResponse>>,
    calls: Mutex<Vec<RecordedFetch>>,
    paused: watch::Sender<bool>,
    call_signal: Notify,
}

impl Default for MockItemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockItemSource {
    /// Create a mock with no scripted responses.
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            older: Mutex::new(VecDeque::new()),
            newer: Mutex::new(VecDeque::new()),
            snapshot: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            paused,
            call_signal: Notify::new(),
        }
    }

    /// Queue a response for the next `fetch_older` call.
    pub fn push_older(&self, response: ScriptedResponse) {
        self.older.lock().unwrap().push_back(response);
    }

    /// Queue a response for the next `fetch_newer` call.
    pub fn push_newer(&self, response: ScriptedResponse) {
        self.newer.lock().unwrap().push_back(response);
    }

    /// Queue a response for the next `fetch_snapshot` call.
    pub fn push_snapshot(&self, response: ScriptedResponse) {
        self.snapshot.lock().unwrap().push_back(response);
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<RecordedFetch> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls in one direction.
    pub fn call_count(&self, direction: FetchDirection) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.direction == direction)
            .count()
    }

    /// Forget all recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Hold subsequent fetches in flight until [`MockItemSource::resume`].
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    /// Release fetches held by [`MockItemSource::pause`].
    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Wait until at least `count` calls were recorded.
    pub async fn wait_for_calls(&self, count: usize) {
        loop {
            let notified = self.call_signal.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.calls.lock().unwrap().len() >= count {
                return;
            }
            notified.await;
        }
    }

    fn record(&self, direction: FetchDirection, boundary: Option<&str>) {
        self.calls.lock().unwrap().push(RecordedFetch {
            direction,
            boundary: boundary.map(str::to_string),
        });
        self.call_signal.notify_waiters();
    }

    async fn wait_if_paused(&self) {
        let mut rx = self.paused.subscribe();
        while *rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    fn pop(&self, queue: &Mutex<VecDeque<ScriptedResponse>>) -> ScriptedResponse {
        queue.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl ItemSource for MockItemSource {
    async fn fetch_older(&self, boundary: Option<&str>) -> Result<Vec<Item>, FetchError> {
        self.record(FetchDirection::Older, boundary);
        self.wait_if_paused().await;
        self.pop(&self.older)
    }

    async fn fetch_newer(&self, boundary: Option<&str>) -> Result<Vec<Item>, FetchError> {
        self.record(FetchDirection::Newer, boundary);
        self.wait_if_paused().await;
        self.pop(&self.newer)
    }

    async fn fetch_snapshot(&self) -> Result<Vec<Item>, FetchError> {
        self.record(FetchDirection::Snapshot, None);
        self.wait_if_paused().await;
        self.pop(&self.snapshot)
    }
}
