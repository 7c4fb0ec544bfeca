//! Shared fixtures for integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use plumage::prelude::*;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Route engine tracing through the test harness, honoring `RUST_LOG`.
/// Only the first call installs the subscriber; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Build a batch of payload-less items from ids.
pub fn items(ids: &[&str]) -> Vec<Item> {
    ids.iter().map(|id| Item::new(*id, Value::Null)).collect()
}

/// Ids of a session's rows, in timeline order.
pub fn ids_of(session_items: &[Item]) -> Vec<String> {
    session_items.iter().map(|item| item.id.clone()).collect()
}

/// Collects published render plans for later assertions.
pub struct PlanRecorder {
    plans: Arc<Mutex<Vec<RenderPlan>>>,
}

impl PlanRecorder {
    pub fn attach<S: ItemSource>(session: &plumage::session::TimelineSession<S>) -> Self {
        let plans: Arc<Mutex<Vec<RenderPlan>>> = Arc::new(Mutex::new(Vec::new()));
        {
            let plans = Arc::clone(&plans);
            session.on_render_plan(move |plan| plans.lock().unwrap().push(plan.clone()));
        }
        Self { plans }
    }

    pub fn plans(&self) -> Vec<RenderPlan> {
        self.plans.lock().unwrap().clone()
    }

    pub fn last(&self) -> RenderPlan {
        self.plans
            .lock()
            .unwrap()
            .last()
            .expect("no render plan published")
            .clone()
    }

    pub fn count(&self) -> usize {
        self.plans.lock().unwrap().len()
    }
}

/// Replay a render plan against the previous id list.
///
/// Deletes index into the working list; inserts consume the ids present
/// in `after` but not in `before`, in order. The result must equal
/// `after` if the plan's coordinates are correct.
pub fn apply_plan(plan: &RenderPlan, before: &[String], after: &[String]) -> Vec<String> {
    let before_set: HashSet<&String> = before.iter().collect();
    let mut pending: Vec<&String> = after.iter().filter(|id| !before_set.contains(id)).collect();
    pending.reverse();

    let mut working: Vec<String> = before.to_vec();
    for op in &plan.ops {
        match op {
            RenderOp::Delete { position } => {
                working.remove(*position);
            }
            RenderOp::Insert { position } => {
                let id = pending.pop().expect("more inserts than new ids");
                working.insert(*position, id.clone());
            }
        }
    }
    working
}
