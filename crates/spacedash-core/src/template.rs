//! Process templates
//!
//! Templates gate how a space is provisioned. Only constructable templates
//! are offered to the user; when template retrieval fails a synthetic
//! default with the sentinel id `"0"` stands in, and selecting it means
//! "no template".

use serde::{Deserialize, Serialize};

/// Sentinel id of the synthetic default template
pub const DEFAULT_TEMPLATE_ID: &str = "0";

/// Attributes carried by a process template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAttributes {
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Whether a space can be created from this template
    #[serde(rename = "can-construct", default)]
    pub can_construct: bool,
}

/// A selectable space template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTemplate {
    /// Template id
    pub id: String,
    /// Resource type tag
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Template attributes
    pub attributes: TemplateAttributes,
}

impl ProcessTemplate {
    /// Create a template with the given id and name
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "spacetemplates".to_string(),
            attributes: TemplateAttributes {
                name: name.into(),
                ..TemplateAttributes::default()
            },
        }
    }

    /// Mark the template as constructable
    #[inline]
    #[must_use]
    pub fn constructable(mut self) -> Self {
        self.attributes.can_construct = true;
        self
    }

    /// The synthetic fallback offered when template retrieval fails
    #[must_use]
    pub fn default_template() -> Self {
        Self {
            id: DEFAULT_TEMPLATE_ID.to_string(),
            kind: String::new(),
            attributes: TemplateAttributes {
                name: "Default template".to_string(),
                description: "This is a default space template".to_string(),
                can_construct: false,
            },
        }
    }

    /// Whether this is the sentinel default ("no template")
    #[inline]
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.id == DEFAULT_TEMPLATE_ID
    }

    /// Whether a space can be created from this template
    #[inline]
    #[must_use]
    pub fn can_construct(&self) -> bool {
        self.attributes.can_construct
    }
}
