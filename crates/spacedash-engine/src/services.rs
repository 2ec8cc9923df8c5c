//! Collaborator contracts
//!
//! Abstract boundaries to the remote services and the UI shell:
//! - Work-item fetch and enrichment
//! - Work-item state classification
//! - Space/template retrieval and creation
//! - Best-effort namespace provisioning
//! - Fire-and-forget UI effects (navigation, notifications, broadcasts)
//!
//! The engine owns none of the persistence or rendering behind these traits;
//! implementations are injected as `Arc<dyn ...>`.

use async_trait::async_trait;
use spacedash_core::{FilterExpr, ProcessTemplate, Space, WorkItem};

/// Error surfaced by a remote collaborator
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    /// The remote call was rejected
    #[error("remote call failed: {0}")]
    Remote(String),

    /// The collaborator is unreachable
    #[error("service unavailable")]
    Unavailable,
}

/// Remote work-item collaborator
///
/// The `resolve_*` calls are pure transformations returning enriched copies.
/// Creator resolution reads fields populated by area resolution, so callers
/// must sequence the three passes type -> area -> creator.
#[async_trait]
pub trait WorkItemService: Send + Sync {
    /// Fetch work items matching `filter`, up to `page_size` items
    async fn fetch_work_items(
        &self,
        page_size: usize,
        filter: &FilterExpr,
    ) -> Result<Vec<WorkItem>, ServiceError>;

    /// Resolve the work-item type
    async fn resolve_type(&self, item: WorkItem) -> WorkItem;

    /// Resolve the work-item area
    async fn resolve_area(&self, item: WorkItem) -> WorkItem;

    /// Resolve the work-item creator; requires the area to be resolved
    async fn resolve_creator(&self, item: WorkItem) -> WorkItem;
}

/// External work-item state classification
pub trait StateClassifier: Send + Sync {
    /// Whether the item is in a closed/done state
    fn is_closed(&self, item: &WorkItem) -> bool;
}

/// Remote space collaborator
#[async_trait]
pub trait SpaceService: Send + Sync {
    /// Fetch the selectable space templates
    async fn get_space_templates(&self) -> Result<Vec<ProcessTemplate>, ServiceError>;

    /// Create a persistent space from a transient one
    async fn create_space(&self, space: &Space) -> Result<Space, ServiceError>;
}

/// Auxiliary provisioning collaborator (best-effort)
#[async_trait]
pub trait NamespaceService: Send + Sync {
    /// Provision namespace/config resources for a created space
    async fn provision_namespace(&self, space: &Space) -> Result<(), ServiceError>;
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational
    Info,
    /// Operation succeeded
    Success,
    /// Operation failed
    Danger,
}

/// Fire-and-forget UI boundary
pub trait UiGateway: Send + Sync {
    /// Navigate to the route built from `segments`
    fn navigate(&self, segments: &[String]);

    /// Show a user-visible notification
    fn notify(&self, message: &str, severity: Severity);

    /// Broadcast an application event
    fn broadcast(&self, event: &str, payload: serde_json::Value);
}
