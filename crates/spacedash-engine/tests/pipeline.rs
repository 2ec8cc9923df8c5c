//! Integration tests for the work-item aggregation pipeline

use spacedash_core::{Context, SpaceRef, User};
use spacedash_engine::{SubscriptionLedger, WorkItemAggregator};
use spacedash_test_utils::{closed_item, open_item, ClosedByState, FakeWorkItemService};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

fn context(space_id: &str, user: &User) -> Context {
    Context::new(SpaceRef::new(space_id, format!("/{space_id}"))).with_user(user.clone())
}

#[tokio::test]
async fn publishes_count_excluding_closed_items() {
    let service = Arc::new(FakeWorkItemService::new());
    service.stub_items(
        "S1",
        vec![open_item("wi-1"), open_item("wi-2"), closed_item("wi-3")],
    );

    let user = User::new("U1", "alice");
    let (_ctx_tx, ctx_rx) = watch::channel(context("S1", &user));
    let ledger = Arc::new(SubscriptionLedger::new());

    let aggregator = WorkItemAggregator::spawn(
        service.clone(),
        Arc::new(ClosedByState),
        Some(&user),
        ctx_rx,
        &ledger,
    );
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(*aggregator.count().borrow(), 2);
    let items = aggregator.work_items().borrow().clone();
    assert!(items.iter().all(|i| i.state != "closed"));

    ledger.drain();
}

#[tokio::test]
async fn stale_context_results_are_never_published() {
    let service = Arc::new(FakeWorkItemService::new());
    service.stub_items("S1", vec![open_item("stale-1")]);
    service.stub_delay("S1", Duration::from_millis(80));
    service.stub_items("S2", vec![open_item("fresh-1"), open_item("fresh-2")]);

    let user = User::new("U1", "alice");
    let (ctx_tx, ctx_rx) = watch::channel(context("S1", &user));
    let ledger = Arc::new(SubscriptionLedger::new());

    let aggregator = WorkItemAggregator::spawn(
        service.clone(),
        Arc::new(ClosedByState),
        Some(&user),
        ctx_rx,
        &ledger,
    );

    // Record every published sequence
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut items_rx = aggregator.work_items();
    let collector = tokio::spawn(async move {
        while items_rx.changed().await.is_ok() {
            let value = items_rx.borrow().clone();
            sink.lock().unwrap().push(value);
        }
    });

    // Let the slow S1 fetch start, then switch context before it resolves
    tokio::time::sleep(Duration::from_millis(10)).await;
    ctx_tx.send(context("S2", &user)).unwrap();

    // Wait past the stale fetch's delay
    tokio::time::sleep(Duration::from_millis(150)).await;

    let published = seen.lock().unwrap().clone();
    assert!(!published.is_empty());
    for sequence in &published {
        assert!(
            sequence.iter().all(|item| item.id.starts_with("fresh")),
            "stale sequence published: {sequence:?}"
        );
    }
    assert_eq!(*aggregator.count().borrow(), 2);

    collector.abort();
    ledger.drain();
}

#[tokio::test]
async fn enrichment_runs_in_three_ordered_passes() {
    let service = Arc::new(FakeWorkItemService::new());
    service.stub_items("S1", vec![open_item("wi-1"), open_item("wi-2")]);

    let user = User::new("U1", "alice");
    let (_ctx_tx, ctx_rx) = watch::channel(context("S1", &user));
    let ledger = Arc::new(SubscriptionLedger::new());

    let aggregator = WorkItemAggregator::spawn(
        service.clone(),
        Arc::new(ClosedByState),
        Some(&user),
        ctx_rx,
        &ledger,
    );
    tokio::time::sleep(Duration::from_millis(30)).await;

    // Every type pass precedes every area pass, which precedes every
    // creator pass
    let journal = &service.journal;
    for id in ["wi-1", "wi-2"] {
        let type_at = journal.position(&format!("type:{id}")).unwrap();
        let area_at = journal.position(&format!("area:{id}")).unwrap();
        let creator_at = journal.position(&format!("creator:{id}")).unwrap();
        assert!(type_at < area_at);
        assert!(area_at < creator_at);
    }
    let last_area = journal
        .entries()
        .iter()
        .rposition(|e| e.starts_with("area:"))
        .unwrap();
    let first_creator = journal
        .entries()
        .iter()
        .position(|e| e.starts_with("creator:"))
        .unwrap();
    assert!(last_area < first_creator, "passes were interleaved");

    // Creator attribution saw the resolved area
    let items = aggregator.work_items().borrow().clone();
    assert!(items
        .iter()
        .all(|i| i.resolved_creator.as_deref() == Some("creator-1")));

    ledger.drain();
}

#[tokio::test]
async fn teardown_releases_every_pipeline_subscription() {
    let service = Arc::new(FakeWorkItemService::new());
    service.stub_items("S1", vec![open_item("wi-1")]);

    let user = User::new("U1", "alice");
    let (ctx_tx, ctx_rx) = watch::channel(context("S1", &user));
    let ledger = Arc::new(SubscriptionLedger::new());

    let _aggregator = WorkItemAggregator::spawn(
        service.clone(),
        Arc::new(ClosedByState),
        Some(&user),
        ctx_rx,
        &ledger,
    );
    tokio::time::sleep(Duration::from_millis(30)).await;

    // Driver plus one fetch cycle
    assert!(ledger.len() >= 2);

    ledger.drain();
    assert!(ledger.is_empty());

    // Emissions after teardown go nowhere; nothing panics
    let _ = ctx_tx.send(context("S2", &user));
    tokio::time::sleep(Duration::from_millis(20)).await;
}
