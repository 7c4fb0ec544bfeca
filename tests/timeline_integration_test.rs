// Integration tests for the full session pipeline: cold start, paging
// in both directions, capacity windowing, and render plan fidelity.

mod common;

use std::sync::Arc;

use common::{apply_plan, ids_of, init_tracing, items, PlanRecorder};
use plumage::adapters::MockItemSource;
use plumage::prelude::*;
use plumage::session::TimelineSession;

#[tokio::test]
async fn test_cold_start_then_page_older() {
    init_tracing();
    let source = Arc::new(MockItemSource::new());
    source.push_snapshot(Ok(items(&["100", "90", "80"])));
    source.push_older(Ok(items(&["70", "60"])));
    source.push_older(Ok(items(&["50"])));

    let session = TimelineSession::new(Arc::clone(&source));
    let recorder = PlanRecorder::attach(&session);

    session.load_snapshot().await.unwrap();
    session.load_older().await.unwrap();
    session.load_older().await.unwrap();

    assert_eq!(
        ids_of(&session.items()),
        vec!["100", "90", "80", "70", "60", "50"]
    );

    // Boundary chain: snapshot carries none, older pages decrement past
    // the oldest known id.
    let calls = source.calls();
    assert_eq!(calls[0].boundary, None);
    assert_eq!(calls[1].boundary.as_deref(), Some("79"));
    assert_eq!(calls[2].boundary.as_deref(), Some("59"));

    assert_eq!(recorder.count(), 3);
}

#[tokio::test]
async fn test_render_plans_replay_to_store_state() {
    init_tracing();
    let source = Arc::new(MockItemSource::new());
    source.push_snapshot(Ok(items(&["30", "20", "10"])));
    source.push_newer(Ok(items(&["50", "40", "30"])));
    source.push_older(Ok(items(&["5"])));

    let session = TimelineSession::new(Arc::clone(&source));
    let recorder = PlanRecorder::attach(&session);

    let mut previous: Vec<String> = Vec::new();
    session.load_snapshot().await.unwrap();
    let current = ids_of(&session.items());
    assert_eq!(
        apply_plan(&recorder.last(), &previous, &current),
        current
    );
    previous = current;

    session.load_newer().await.unwrap();
    let current = ids_of(&session.items());
    assert_eq!(
        apply_plan(&recorder.last(), &previous, &current),
        current
    );
    previous = current;

    session.load_older().await.unwrap();
    let current = ids_of(&session.items());
    assert_eq!(
        apply_plan(&recorder.last(), &previous, &current),
        current
    );
}

#[tokio::test]
async fn test_capacity_window_slides_on_newer_merges() {
    init_tracing();
    let source = Arc::new(MockItemSource::new());
    source.push_snapshot(Ok(items(&["10", "9", "8"])));
    source.push_newer(Ok(items(&["12", "11"])));

    let session = TimelineSession::with_capacity(Arc::clone(&source), 3);
    session.load_snapshot().await.unwrap();
    session.load_newer().await.unwrap();

    // Window slid forward; smallest keys evicted.
    assert_eq!(ids_of(&session.items()), vec!["12", "11", "10"]);
    assert_eq!(session.len(), 3);
}

#[tokio::test]
async fn test_refresh_after_failure_leaves_store_intact() {
    init_tracing();
    let source = Arc::new(MockItemSource::new());
    source.push_snapshot(Ok(items(&["30", "20"])));
    source.push_older(Err(FetchError::ServerError {
        status: 503,
        message: "unavailable".to_string(),
    }));

    let session = TimelineSession::new(Arc::clone(&source));
    session.load_snapshot().await.unwrap();

    let err = session.load_older().await.unwrap_err();
    assert!(matches!(err, TimelineError::Fetch(_)));
    assert!(err.is_retryable());

    // Failed fetch mutated nothing.
    assert_eq!(ids_of(&session.items()), vec!["30", "20"]);
}

#[tokio::test]
async fn test_overlapping_pages_are_deduplicated() {
    init_tracing();
    let source = Arc::new(MockItemSource::new());
    source.push_snapshot(Ok(items(&["10", "8", "6"])));
    // Backend answers inclusively; the overlap rows must vanish.
    source.push_older(Ok(items(&["6", "5", "4"])));
    source.push_newer(Ok(items(&["14", "12", "10"])));

    let session = TimelineSession::new(Arc::clone(&source));
    session.load_snapshot().await.unwrap();
    session.load_older().await.unwrap();
    session.load_newer().await.unwrap();

    assert_eq!(
        ids_of(&session.items()),
        vec!["14", "12", "10", "8", "6", "5", "4"]
    );
}

#[tokio::test]
async fn test_snapshot_anchor_falls_back_when_row_vanishes() {
    init_tracing();
    let source = Arc::new(MockItemSource::new());
    source.push_snapshot(Ok(items(&["30", "20", "10"])));
    source.push_older(Ok(items(&["30", "12", "10"]))); // refresh answer

    let session = TimelineSession::new(Arc::clone(&source));
    let recorder = PlanRecorder::attach(&session);

    session.load_snapshot().await.unwrap();
    session.set_first_visible(Some("20".to_string()));
    session.refresh().await.unwrap();

    // 20 disappeared in the replace; the nearest surviving neighbor by
    // sort key takes over as anchor.
    let plan = recorder.last();
    assert_eq!(plan.anchor.as_deref(), Some("30"));
}

#[tokio::test]
async fn test_streamed_push_between_fetches() {
    init_tracing();
    let source = Arc::new(MockItemSource::new());
    source.push_snapshot(Ok(items(&["30", "20"])));

    let session = TimelineSession::new(Arc::clone(&source));
    session.load_snapshot().await.unwrap();

    session.push_newer(items(&["40"])).unwrap();
    session.push_newer(items(&["50", "40"])).unwrap();

    assert_eq!(ids_of(&session.items()), vec!["50", "40", "30", "20"]);
    // Pushes never touch the collaborator.
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test]
async fn test_delete_then_page_past_deleted_row() {
    init_tracing();
    let source = Arc::new(MockItemSource::new());
    source.push_snapshot(Ok(items(&["30", "20", "10"])));
    source.push_older(Ok(items(&["5"])));

    let session = TimelineSession::new(Arc::clone(&source));
    session.load_snapshot().await.unwrap();

    assert!(session.delete_item("10").unwrap());
    session.load_older().await.unwrap();

    // The older boundary reflects the new oldest row (20 -> 19).
    let calls = source.calls();
    assert_eq!(calls[1].boundary.as_deref(), Some("19"));
    assert_eq!(ids_of(&session.items()), vec!["30", "20", "5"]);
}

#[tokio::test]
async fn test_repost_boundary_pages_past_reference() {
    init_tracing();
    let source = Arc::new(MockItemSource::new());
    let mut batch = items(&["100"]);
    batch.push(Item::with_reference("90", "85", serde_json::Value::Null));
    source.push_snapshot(Ok(batch));
    source.push_older(Ok(items(&["80"])));

    let session = TimelineSession::new(Arc::clone(&source));
    session.load_snapshot().await.unwrap();
    session.load_older().await.unwrap();

    // The repost's referenced id (85) drives the boundary, not 90.
    assert_eq!(source.calls()[1].boundary.as_deref(), Some("84"));
}
