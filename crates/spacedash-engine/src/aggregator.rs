//! Work-item aggregation pipeline
//!
//! Reacts to the active-context stream with latest-context-wins semantics:
//! every context emission supersedes the previous in-flight fetch, and a
//! stale fetch that still resolves publishes nothing. Each cycle builds the
//! filter, fetches one page, drops closed items, enriches the survivors in
//! three point-wise passes and republishes the sequence and its count.

use crate::ledger::{SubscriptionHandle, SubscriptionLedger};
use crate::services::{StateClassifier, WorkItemService};
use spacedash_core::{work_item_query, Context, User, WorkItem};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Fetch page size; the sequence is unbounded below this cap
pub const WORK_ITEM_PAGE_SIZE: usize = 100_000;

/// Live aggregation of the current user's work items for the active space
#[derive(Debug)]
pub struct WorkItemAggregator {
    items: watch::Receiver<Vec<WorkItem>>,
    count: watch::Receiver<usize>,
}

impl WorkItemAggregator {
    /// Start the pipeline
    ///
    /// The user is resolved once, here; with no logged-in user the pipeline
    /// publishes an empty sequence on every context emission and never
    /// contacts the remote collaborator. All spawned tasks register in
    /// `ledger` and stop on drain.
    pub fn spawn(
        service: Arc<dyn WorkItemService>,
        classifier: Arc<dyn StateClassifier>,
        user: Option<&User>,
        contexts: watch::Receiver<Context>,
        ledger: &Arc<SubscriptionLedger>,
    ) -> Self {
        let (items_tx, items_rx) = watch::channel(Vec::new());
        let (count_tx, count_rx) = watch::channel(0);

        let pipeline = Arc::new(Pipeline {
            service,
            classifier,
            user_id: user.map(|u| u.id.clone()),
            generation: AtomicU64::new(0),
            items_tx,
            count_tx,
        });

        let driver = tokio::spawn(drive(pipeline, contexts, Arc::clone(ledger)));
        ledger.register_task(driver);

        Self {
            items: items_rx,
            count: count_rx,
        }
    }

    /// Receiver for the live work-item sequence
    #[inline]
    #[must_use]
    pub fn work_items(&self) -> watch::Receiver<Vec<WorkItem>> {
        self.items.clone()
    }

    /// Receiver for the derived count
    #[inline]
    #[must_use]
    pub fn count(&self) -> watch::Receiver<usize> {
        self.count.clone()
    }
}

struct Pipeline {
    service: Arc<dyn WorkItemService>,
    classifier: Arc<dyn StateClassifier>,
    user_id: Option<String>,
    generation: AtomicU64,
    items_tx: watch::Sender<Vec<WorkItem>>,
    count_tx: watch::Sender<usize>,
}

impl Pipeline {
    async fn run_cycle(&self, generation: u64, context: Context) {
        let filter = work_item_query(&context.space.id, self.user_id.as_deref());

        match self
            .service
            .fetch_work_items(WORK_ITEM_PAGE_SIZE, &filter)
            .await
        {
            Ok(items) => {
                let open: Vec<WorkItem> = items
                    .into_iter()
                    .filter(|item| !self.classifier.is_closed(item))
                    .collect();
                let enriched = self.enrich(open).await;
                self.publish(generation, enriched);
            }
            Err(err) => {
                // Keep the previous sequence; no retry
                tracing::warn!(space = %context.space.id, error = %err, "work item fetch failed");
            }
        }
    }

    /// Enrich as three point-wise passes, never interleaved
    async fn enrich(&self, items: Vec<WorkItem>) -> Vec<WorkItem> {
        let mut typed = Vec::with_capacity(items.len());
        for item in items {
            typed.push(self.service.resolve_type(item).await);
        }

        let mut with_area = Vec::with_capacity(typed.len());
        for item in typed {
            with_area.push(self.service.resolve_area(item).await);
        }

        // Creator resolution reads the area set in the previous pass; it
        // must stay last.
        let mut done = Vec::with_capacity(with_area.len());
        for item in with_area {
            done.push(self.service.resolve_creator(item).await);
        }
        done
    }

    fn publish(&self, generation: u64, items: Vec<WorkItem>) {
        let count = items.len();
        // The currency check runs under the channel lock, together with the
        // write it guards. A cycle superseded by a newer context publishes
        // nothing.
        let published = self.items_tx.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = items;
            true
        });
        if published {
            self.count_tx.send_replace(count);
        }
    }
}

async fn drive(
    pipeline: Arc<Pipeline>,
    mut contexts: watch::Receiver<Context>,
    ledger: Arc<SubscriptionLedger>,
) {
    let mut in_flight: Option<SubscriptionHandle> = None;

    loop {
        let context = contexts.borrow_and_update().clone();

        if let Some(previous) = in_flight.take() {
            previous.release();
        }
        let generation = pipeline.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if pipeline.user_id.is_some() {
            let cycle = Arc::clone(&pipeline);
            let task = tokio::spawn(async move {
                cycle.run_cycle(generation, context).await;
            });
            let handle = SubscriptionHandle::from_task(task);
            in_flight = Some(handle.clone());
            ledger.register(handle);
        } else {
            // No logged-in user: propagate an empty result, skip the fetch
            pipeline.publish(generation, Vec::new());
        }

        if contexts.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    // Use the library build of this crate (via the self dev-dependency) so
    // types unify with the fakes in spacedash-test-utils.
    use pretty_assertions::assert_eq;
    use spacedash_core::{Context, SpaceRef, User, WorkItem};
    use spacedash_engine::ledger::SubscriptionLedger;
    use spacedash_engine::services::StateClassifier;
    use spacedash_engine::WorkItemAggregator;
    use spacedash_test_utils::{ClosedByState, FakeWorkItemService};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    fn ctx(space_id: &str, user: Option<User>) -> Context {
        let mut context = Context::new(SpaceRef::new(space_id, format!("/{space_id}")));
        context.user = user;
        context
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    #[tokio::test]
    async fn publishes_open_items_and_count() {
        let service = Arc::new(FakeWorkItemService::new());
        service.stub_items(
            "S1",
            vec![
                WorkItem::new("wi-1", "one", "open"),
                WorkItem::new("wi-2", "two", "closed"),
                WorkItem::new("wi-3", "three", "open"),
            ],
        );

        let user = User::new("U1", "alice");
        let (_ctx_tx, ctx_rx) = watch::channel(ctx("S1", Some(user.clone())));
        let ledger = Arc::new(SubscriptionLedger::new());

        let aggregator = WorkItemAggregator::spawn(
            service.clone(),
            Arc::new(ClosedByState),
            Some(&user),
            ctx_rx,
            &ledger,
        );
        settle().await;

        let items = aggregator.work_items().borrow().clone();
        assert_eq!(items.len(), 2);
        assert_eq!(*aggregator.count().borrow(), 2);
        // Survivors are fully enriched
        assert!(items.iter().all(|i| i.resolved_type.is_some()));
        assert!(items.iter().all(|i| i.resolved_area.is_some()));

        ledger.drain();
    }

    #[tokio::test]
    async fn uses_page_size_and_assignee_filter() {
        let service = Arc::new(FakeWorkItemService::new());
        service.stub_items("S1", vec![]);

        let user = User::new("U1", "alice");
        let (_ctx_tx, ctx_rx) = watch::channel(ctx("S1", Some(user.clone())));
        let ledger = Arc::new(SubscriptionLedger::new());

        let _aggregator = WorkItemAggregator::spawn(
            service.clone(),
            Arc::new(ClosedByState),
            Some(&user),
            ctx_rx,
            &ledger,
        );
        settle().await;

        assert_eq!(service.journal.entries(), vec!["fetch:S1:100000".to_string()]);
        ledger.drain();
    }

    #[tokio::test]
    async fn no_user_publishes_empty_without_fetching() {
        let service = Arc::new(FakeWorkItemService::new());
        service.stub_items("S1", vec![WorkItem::new("wi-1", "one", "open")]);

        let (_ctx_tx, ctx_rx) = watch::channel(ctx("S1", None));
        let ledger = Arc::new(SubscriptionLedger::new());

        let aggregator = WorkItemAggregator::spawn(
            service.clone(),
            Arc::new(ClosedByState),
            None,
            ctx_rx,
            &ledger,
        );
        settle().await;

        assert!(aggregator.work_items().borrow().is_empty());
        assert_eq!(*aggregator.count().borrow(), 0);
        assert!(service.journal.entries().is_empty());

        ledger.drain();
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_sequence() {
        let service = Arc::new(FakeWorkItemService::new());
        service.stub_items("S1", vec![WorkItem::new("wi-1", "one", "open")]);
        service.stub_failure("S2");

        let user = User::new("U1", "alice");
        let (ctx_tx, ctx_rx) = watch::channel(ctx("S1", Some(user.clone())));
        let ledger = Arc::new(SubscriptionLedger::new());

        let aggregator = WorkItemAggregator::spawn(
            service.clone(),
            Arc::new(ClosedByState),
            Some(&user),
            ctx_rx,
            &ledger,
        );
        settle().await;
        assert_eq!(*aggregator.count().borrow(), 1);

        ctx_tx.send(ctx("S2", Some(user.clone()))).unwrap();
        settle().await;

        // Prior value remains observable
        assert_eq!(aggregator.work_items().borrow()[0].id, "wi-1");
        assert_eq!(*aggregator.count().borrow(), 1);

        ledger.drain();
    }

    #[tokio::test]
    async fn closed_filter_is_idempotent() {
        let classifier = ClosedByState;
        let items = vec![
            WorkItem::new("wi-1", "one", "open"),
            WorkItem::new("wi-2", "two", "closed"),
        ];

        let once: Vec<WorkItem> = items
            .into_iter()
            .filter(|i| !classifier.is_closed(i))
            .collect();
        let twice: Vec<WorkItem> = once
            .clone()
            .into_iter()
            .filter(|i| !classifier.is_closed(i))
            .collect();

        assert_eq!(once, twice);
    }
}
