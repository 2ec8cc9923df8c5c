//! Testing utilities for the spacedash workspace
//!
//! Hand-rolled recording fakes for every collaborator trait. The fakes
//! journal their calls so tests can assert ordering (enrichment passes,
//! guard short-circuits) and script their outcomes per space id.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use spacedash_core::{
    Creator, CreatorAttributes, FilterExpr, ProcessTemplate, RelationalData, Space, WorkItem,
};
use spacedash_engine::services::{
    NamespaceService, ServiceError, Severity, SpaceService, StateClassifier, UiGateway,
    WorkItemService,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

/// Ordered record of fake-service calls
#[derive(Debug, Default)]
pub struct CallJournal {
    entries: Mutex<Vec<String>>,
}

impl CallJournal {
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Entries starting with `prefix`
    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Index of the first entry equal to `entry`
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries.lock().iter().position(|e| e == entry)
    }
}

/// Space id referenced by a work-item filter, if any
pub fn filter_space_id(filter: &FilterExpr) -> Option<String> {
    match filter {
        FilterExpr::Equal { field, value } if field == "space" => Some(value.clone()),
        FilterExpr::Equal { .. } => None,
        FilterExpr::And { left, right } => {
            filter_space_id(left).or_else(|| filter_space_id(right))
        }
    }
}

/// Scriptable work-item collaborator
///
/// Fetch results and delays are keyed by the space id found in the filter.
/// Enrichment journals `type:`, `area:` and `creator:` entries per item;
/// creator resolution only attributes correctly when the area was resolved
/// first, mirroring the upstream ordering dependency.
#[derive(Debug, Default)]
pub struct FakeWorkItemService {
    results: Mutex<HashMap<String, Result<Vec<WorkItem>, ServiceError>>>,
    delays: Mutex<HashMap<String, Duration>>,
    pub journal: CallJournal,
}

impl FakeWorkItemService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stub_items(&self, space_id: &str, items: Vec<WorkItem>) {
        self.results.lock().insert(space_id.to_string(), Ok(items));
    }

    pub fn stub_failure(&self, space_id: &str) {
        self.results.lock().insert(
            space_id.to_string(),
            Err(ServiceError::Remote("fetch rejected".to_string())),
        );
    }

    pub fn stub_delay(&self, space_id: &str, delay: Duration) {
        self.delays.lock().insert(space_id.to_string(), delay);
    }
}

#[async_trait]
impl WorkItemService for FakeWorkItemService {
    async fn fetch_work_items(
        &self,
        page_size: usize,
        filter: &FilterExpr,
    ) -> Result<Vec<WorkItem>, ServiceError> {
        let space = filter_space_id(filter).unwrap_or_default();
        self.journal.record(format!("fetch:{space}:{page_size}"));

        let delay = self.delays.lock().get(&space).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.results
            .lock()
            .get(&space)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn resolve_type(&self, item: WorkItem) -> WorkItem {
        self.journal.record(format!("type:{}", item.id));
        item.with_resolved_type("task")
    }

    async fn resolve_area(&self, item: WorkItem) -> WorkItem {
        self.journal.record(format!("area:{}", item.id));
        item.with_resolved_area("area-1")
    }

    async fn resolve_creator(&self, item: WorkItem) -> WorkItem {
        self.journal.record(format!("creator:{}", item.id));
        let creator = if item.resolved_area.is_some() {
            "creator-1"
        } else {
            "stale-creator"
        };
        item.with_resolved_creator(creator)
    }
}

/// Classifier treating the `closed` state tag as done
#[derive(Debug, Default, Clone, Copy)]
pub struct ClosedByState;

impl StateClassifier for ClosedByState {
    fn is_closed(&self, item: &WorkItem) -> bool {
        item.state == "closed"
    }
}

/// Scriptable space collaborator
///
/// Without a scripted result, `create_space` echoes the submitted space
/// back with a minted id and a resolved creator identity.
#[derive(Debug)]
pub struct FakeSpaceService {
    templates: Mutex<Result<Vec<ProcessTemplate>, ServiceError>>,
    create_result: Mutex<Option<Result<Space, ServiceError>>>,
    create_delay: Mutex<Option<Duration>>,
    creator_username: Mutex<String>,
    pub journal: CallJournal,
}

impl Default for FakeSpaceService {
    fn default() -> Self {
        Self {
            templates: Mutex::new(Ok(Vec::new())),
            create_result: Mutex::new(None),
            create_delay: Mutex::new(None),
            creator_username: Mutex::new("creator".to_string()),
            journal: CallJournal::default(),
        }
    }
}

impl FakeSpaceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stub_templates(&self, result: Result<Vec<ProcessTemplate>, ServiceError>) {
        *self.templates.lock() = result;
    }

    pub fn stub_create(&self, result: Result<Space, ServiceError>) {
        *self.create_result.lock() = Some(result);
    }

    pub fn stub_create_delay(&self, delay: Duration) {
        *self.create_delay.lock() = Some(delay);
    }

    pub fn set_creator_username(&self, username: &str) {
        *self.creator_username.lock() = username.to_string();
    }

    /// Spaces submitted to `create_space`, by normalized name
    pub fn created_names(&self) -> Vec<String> {
        self.journal
            .with_prefix("create:")
            .into_iter()
            .map(|e| e.trim_start_matches("create:").to_string())
            .collect()
    }
}

#[async_trait]
impl SpaceService for FakeSpaceService {
    async fn get_space_templates(&self) -> Result<Vec<ProcessTemplate>, ServiceError> {
        self.journal.record("templates");
        self.templates.lock().clone()
    }

    async fn create_space(&self, space: &Space) -> Result<Space, ServiceError> {
        self.journal
            .record(format!("create:{}", space.attributes.name));

        let delay = *self.create_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(result) = self.create_result.lock().clone() {
            return result;
        }

        let mut created = space.clone();
        created.id = Some(Uuid::new_v4().to_string());
        created.relational_data = Some(RelationalData {
            creator: Some(Creator {
                attributes: CreatorAttributes {
                    username: self.creator_username.lock().clone(),
                },
            }),
        });
        Ok(created)
    }
}

/// Scriptable namespace-provisioning collaborator
#[derive(Debug, Default)]
pub struct FakeNamespaceService {
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl FakeNamespaceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let service = Self::default();
        service.fail.store(true, Ordering::SeqCst);
        service
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NamespaceService for FakeNamespaceService {
    async fn provision_namespace(&self, _space: &Space) -> Result<(), ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(ServiceError::Remote("config map update failed".to_string()))
        } else {
            Ok(())
        }
    }
}

/// UI gateway recording every fire-and-forget effect
#[derive(Debug, Default)]
pub struct RecordingUi {
    navigations: Mutex<Vec<Vec<String>>>,
    notifications: Mutex<Vec<(String, Severity)>>,
    broadcasts: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigations(&self) -> Vec<Vec<String>> {
        self.navigations.lock().clone()
    }

    pub fn notifications(&self) -> Vec<(String, Severity)> {
        self.notifications.lock().clone()
    }

    pub fn broadcasts(&self) -> Vec<(String, serde_json::Value)> {
        self.broadcasts.lock().clone()
    }

    pub fn broadcast_events(&self) -> Vec<String> {
        self.broadcasts.lock().iter().map(|(e, _)| e.clone()).collect()
    }
}

impl UiGateway for RecordingUi {
    fn navigate(&self, segments: &[String]) {
        self.navigations.lock().push(segments.to_vec());
    }

    fn notify(&self, message: &str, severity: Severity) {
        self.notifications.lock().push((message.to_string(), severity));
    }

    fn broadcast(&self, event: &str, payload: serde_json::Value) {
        self.broadcasts.lock().push((event.to_string(), payload));
    }
}

/// A server-returned space with a minted id and resolved creator
pub fn created_space(name: &str, creator: &str) -> Space {
    let mut space = Space::transient();
    space.attributes.name = name.to_string();
    space.id = Some(Uuid::new_v4().to_string());
    space.relational_data = Some(RelationalData {
        creator: Some(Creator {
            attributes: CreatorAttributes {
                username: creator.to_string(),
            },
        }),
    });
    space
}

/// An open work item
pub fn open_item(id: &str) -> WorkItem {
    WorkItem::new(id, format!("item {id}"), "open")
}

/// A closed work item
pub fn closed_item(id: &str) -> WorkItem {
    WorkItem::new(id, format!("item {id}"), "closed")
}
