//! Prelude module for convenient imports.
//!
//! Re-exports the types most hosts need:
//!
//! ```ignore
//! use plumage::prelude::*;
//! ```

// Session surface
pub use crate::session::{CacheSnapshot, TimelineSession};

// Model types
pub use crate::models::{Item, ItemId};

// Store and merge reporting
pub use crate::store::{ItemStore, MergeMode, MergeResult};

// Render planning
pub use crate::planner::{RenderOp, RenderPlan};

// Fetch machinery
pub use crate::coordinator::FetchState;
pub use crate::cursor::FetchDirection;
pub use crate::error::{TimelineError, TimelineResult};
pub use crate::traits::{FetchError, ItemSource};
