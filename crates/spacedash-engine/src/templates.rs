//! Template loading
//!
//! Fetches the selectable space templates and resolves one of three
//! outcomes: a filtered constructable list with the first element selected,
//! an empty list with no selection, or the synthetic default when retrieval
//! fails.

use crate::services::SpaceService;
use spacedash_core::ProcessTemplate;
use std::sync::Arc;

/// Outcome of a template load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSelection {
    /// Offered templates (constructable only, or the synthetic default)
    pub templates: Vec<ProcessTemplate>,
    /// Default selection, if any
    pub selected: Option<ProcessTemplate>,
}

impl TemplateSelection {
    /// Id of the selected template, if any
    #[inline]
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|t| t.id.as_str())
    }
}

/// Loads selectable space templates with fallback-to-default on failure
#[derive(Clone)]
pub struct TemplateLoader {
    spaces: Arc<dyn SpaceService>,
}

impl TemplateLoader {
    /// Create a loader backed by the space collaborator
    #[inline]
    #[must_use]
    pub fn new(spaces: Arc<dyn SpaceService>) -> Self {
        Self { spaces }
    }

    /// Fetch templates once and resolve the selection
    pub async fn load(&self) -> TemplateSelection {
        match self.spaces.get_space_templates().await {
            Ok(templates) => {
                let constructable: Vec<ProcessTemplate> = templates
                    .into_iter()
                    .filter(ProcessTemplate::can_construct)
                    .collect();
                let selected = constructable.first().cloned();
                TemplateSelection {
                    templates: constructable,
                    selected,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "template retrieval failed, offering the default template");
                let fallback = ProcessTemplate::default_template();
                TemplateSelection {
                    templates: vec![fallback.clone()],
                    selected: Some(fallback),
                }
            }
        }
    }
}

impl std::fmt::Debug for TemplateLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateLoader").finish_non_exhaustive()
    }
}
