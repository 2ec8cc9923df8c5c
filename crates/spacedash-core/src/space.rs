//! Collaboration space model
//!
//! Spaces are transient client-side values until a successful remote commit.
//! The wire shape mirrors the JSON:API payload the space collaborator
//! expects: attributes, link-only relationships and an `owned-by` identity
//! reference stamped before transmission.

use serde::{Deserialize, Serialize};

/// Attributes carried by a space
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceAttributes {
    /// Space name as transmitted (no internal whitespace)
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
}

/// Link-only relationship (areas, iterations, type groups)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLink {
    /// URL of the related collection
    pub related: String,
}

/// Identifier reference inside a data-bearing relationship
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRef {
    /// Referenced resource id
    pub id: String,
    /// Referenced resource type tag
    #[serde(rename = "type")]
    pub kind: String,
}

impl RelationRef {
    /// Create a new reference
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
        }
    }
}

/// Data-bearing relationship
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// The referenced resource
    pub data: RelationRef,
}

/// Relationships attached to a space
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRelationships {
    /// Areas collection link
    pub areas: RelatedLink,
    /// Iterations collection link
    pub iterations: RelatedLink,
    /// Work-item-type groups collection link
    #[serde(rename = "workitemtypegroups")]
    pub work_item_type_groups: RelatedLink,
    /// Owning identity; stamped with the acting user's id before commit
    #[serde(rename = "owned-by")]
    pub owned_by: Relation,
    /// Selected process template; absent when no template applies
    #[serde(rename = "space-template", skip_serializing_if = "Option::is_none")]
    pub space_template: Option<Relation>,
}

/// Attributes of the creator identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorAttributes {
    /// Login name used in navigation paths
    pub username: String,
}

/// Creator identity attached to server-returned spaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Creator attributes
    pub attributes: CreatorAttributes,
}

/// Server-resolved relational data, present only on created spaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationalData {
    /// Resolved creator identity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<Creator>,
}

/// A collaboration space
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Server-assigned id; `None` until created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Path segment
    pub path: String,
    /// Resource type tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Visibility flag
    #[serde(rename = "privateSpace")]
    pub is_private: bool,
    /// Space attributes
    pub attributes: SpaceAttributes,
    /// Space relationships
    pub relationships: SpaceRelationships,
    /// Server-resolved relational data
    #[serde(rename = "relationalData", skip_serializing_if = "Option::is_none")]
    pub relational_data: Option<RelationalData>,
}

impl Space {
    /// Create a transient (not yet committed) space skeleton
    #[must_use]
    pub fn transient() -> Self {
        Self {
            id: None,
            name: String::new(),
            path: String::new(),
            kind: "spaces".to_string(),
            is_private: false,
            attributes: SpaceAttributes::default(),
            relationships: SpaceRelationships {
                owned_by: Relation {
                    data: RelationRef::new("", "identities"),
                },
                ..SpaceRelationships::default()
            },
            relational_data: None,
        }
    }

    /// Normalize a display name for transmission
    ///
    /// Internal whitespace is not accepted by the space collaborator;
    /// spaces become underscores.
    #[must_use]
    pub fn normalize_name(name: &str) -> String {
        name.trim().replace(' ', "_")
    }

    /// Username of the resolved creator, if the server returned one
    #[inline]
    #[must_use]
    pub fn creator_username(&self) -> Option<&str> {
        self.relational_data
            .as_ref()?
            .creator
            .as_ref()
            .map(|c| c.attributes.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_space_shape() {
        let space = Space::transient();
        assert!(space.id.is_none());
        assert_eq!(space.kind, "spaces");
        assert_eq!(space.relationships.owned_by.data.kind, "identities");
        assert!(space.relationships.space_template.is_none());
        assert!(!space.is_private);
    }

    #[test]
    fn normalize_name_replaces_internal_spaces() {
        assert_eq!(Space::normalize_name("My Space"), "My_Space");
        assert_eq!(Space::normalize_name("  padded name "), "padded_name");
        assert_eq!(Space::normalize_name("plain"), "plain");
    }

    #[test]
    fn creator_username_absent_without_relational_data() {
        let space = Space::transient();
        assert!(space.creator_username().is_none());
    }

    #[test]
    fn creator_username_resolved() {
        let mut space = Space::transient();
        space.relational_data = Some(RelationalData {
            creator: Some(Creator {
                attributes: CreatorAttributes {
                    username: "u1".to_string(),
                },
            }),
        });
        assert_eq!(space.creator_username(), Some("u1"));
    }

    #[test]
    fn serializes_without_optional_fields() {
        let space = Space::transient();
        let json = serde_json::to_value(&space).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("relationalData").is_none());
        assert!(json["relationships"].get("space-template").is_none());
        assert_eq!(json["relationships"]["owned-by"]["data"]["type"], "identities");
    }
}
