//! Plumage - a framework-agnostic timeline pagination engine.
//!
//! Plumage sits underneath any timeline UI: it fetches paged results
//! through a pluggable [`traits::ItemSource`], merges them into an
//! ordered, size-capped row list, deduplicates overlapping ids across
//! forward/backward fetches, and emits pure [`planner::RenderPlan`]
//! diffs the UI layer applies however it wishes. At most one fetch is in
//! flight per session.

pub mod adapters;
pub mod coordinator;
pub mod cursor;
pub mod error;
pub mod models;
pub mod planner;
pub mod prelude;
pub mod session;
pub mod store;
pub mod traits;
