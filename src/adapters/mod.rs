//! Test doubles for the engine's trait seams.
//!
//! The engine performs no I/O itself, so there is no production adapter
//! here: hosts implement [`crate::traits::ItemSource`] over whatever
//! network/cache client they already have. The [`mock`] submodule
//! provides a configurable source for tests:
//!
//! - [`mock::MockItemSource`] - scripted batches/errors per direction,
//!   recorded calls for verification, pause/resume to hold fetches in
//!   flight deterministically

pub mod mock;

pub use mock::{MockItemSource, RecordedFetch};
