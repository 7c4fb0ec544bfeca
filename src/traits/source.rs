//! Item source trait abstraction.
//!
//! Provides the trait-based contract for the network/cache layer the
//! timeline engine consumes, enabling dependency injection and mocking
//! in tests. The engine never performs I/O itself.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Item;

/// Errors surfaced by an [`ItemSource`] collaborator.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection could not be established
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request exceeded its deadline
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Backend asked us to back off
    #[error("rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Backend returned an error status
    #[error("server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Response body could not be decoded into items
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Request was cancelled by the host
    #[error("request cancelled")]
    Cancelled,

    /// Anything else
    #[error("fetch error: {0}")]
    Other(String),
}

impl FetchError {
    /// Whether retrying the same fetch may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::ConnectionFailed(_) => true,
            FetchError::Timeout { .. } => true,
            FetchError::RateLimited { .. } => true,
            FetchError::ServerError { status, .. } => *status >= 500,
            FetchError::Decode(_) => false,
            FetchError::Cancelled => false,
            FetchError::Other(_) => false,
        }
    }
}

/// Contract for the collaborator that serves timeline batches.
///
/// Boundary semantics:
/// - `fetch_older(boundary)`: return items strictly older than the
///   boundary id (exclusive; the engine pre-decrements, so an inclusive
///   backend works too — overlap is absorbed by dedup).
/// - `fetch_newer(boundary)`: return items at or newer than the boundary
///   id ("since" semantics, inclusive; duplicates are dropped on merge).
/// - `fetch_snapshot()`: return a persisted snapshot for cold start.
///
/// A `None` boundary means "from the top of the feed".
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Fetch a page of items older than the boundary.
    async fn fetch_older(&self, boundary: Option<&str>) -> Result<Vec<Item>, FetchError>;

    /// Fetch items newer than (or at) the boundary.
    async fn fetch_newer(&self, boundary: Option<&str>) -> Result<Vec<Item>, FetchError>;

    /// Fetch the cold-start cache snapshot.
    async fn fetch_snapshot(&self) -> Result<Vec<Item>, FetchError>;
}
