//! Trait abstractions for dependency injection and testability.
//!
//! The engine talks to the outside world through exactly one seam: the
//! [`ItemSource`] collaborator that serves paged timeline batches. The
//! production implementation wraps whatever network/cache client the host
//! application uses; tests use [`crate::adapters::MockItemSource`].

pub mod source;

pub use source::{FetchError, ItemSource};
