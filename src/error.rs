//! Unified error type for the timeline engine.
//!
//! `Busy` is a normal control signal (a fetch was already in flight) and
//! is swallowed by the coalescing entry points; everything else is
//! surfaced to the caller. No error mutates the store, and the fetch
//! gate always returns to idle after any outcome.

use thiserror::Error;

use crate::traits::FetchError;

/// Result alias used throughout the engine.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Errors produced by the timeline engine.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// A fetch is already in flight; the request was rejected, not queued.
    #[error("a fetch is already in flight")]
    Busy,

    /// The item source failed.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Every item in a non-empty fetched batch violated the merge mode's
    /// ordering assumption. Individual offenders are dropped silently;
    /// losing the whole batch points at a broken backend.
    #[error("merge rejected: all {dropped} fetched items violated ordering")]
    InvalidMerge { dropped: usize },

    /// The session was closed while the fetch was in flight; the result
    /// was discarded without merging.
    #[error("session closed before the fetch resolved")]
    Closed,
}

impl TimelineError {
    /// Whether this is the single-flight rejection signal.
    pub fn is_busy(&self) -> bool {
        matches!(self, TimelineError::Busy)
    }

    /// Whether retrying the triggering operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TimelineError::Busy => true,
            TimelineError::Fetch(err) => err.is_retryable(),
            TimelineError::InvalidMerge { .. } => false,
            TimelineError::Closed => false,
        }
    }
}
