//! Work items
//!
//! A fetched work item carries a raw state tag plus three enrichment fields
//! resolved by the remote collaborator after the fetch. Enrichment returns
//! copies rather than mutating in place, so the type -> area -> creator
//! ordering is an explicit contract of the pipeline, not a hidden side
//! effect.

use serde::{Deserialize, Serialize};

/// A single work item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Work item id
    pub id: String,
    /// Title shown in widgets
    pub title: String,
    /// Raw workflow state tag as fetched
    pub state: String,
    /// Resolved work-item type, set by enrichment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_type: Option<String>,
    /// Resolved area, set by enrichment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_area: Option<String>,
    /// Resolved creator, set by enrichment (after area)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_creator: Option<String>,
}

impl WorkItem {
    /// Create a new unenriched work item
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            state: state.into(),
            resolved_type: None,
            resolved_area: None,
            resolved_creator: None,
        }
    }

    /// Copy with the resolved type set
    #[inline]
    #[must_use]
    pub fn with_resolved_type(mut self, value: impl Into<String>) -> Self {
        self.resolved_type = Some(value.into());
        self
    }

    /// Copy with the resolved area set
    #[inline]
    #[must_use]
    pub fn with_resolved_area(mut self, value: impl Into<String>) -> Self {
        self.resolved_area = Some(value.into());
        self
    }

    /// Copy with the resolved creator set
    #[inline]
    #[must_use]
    pub fn with_resolved_creator(mut self, value: impl Into<String>) -> Self {
        self.resolved_creator = Some(value.into());
        self
    }
}
