//! spacedash Core - data model and query composition
//!
//! Pure value types shared by the engine and its collaborators:
//! - Collaboration spaces and their relationships
//! - Process templates (with the synthetic default fallback)
//! - Work items and their enrichment fields
//! - The active context (space + user)
//! - Immutable filter expressions and the work-item query builder
//!
//! Nothing in this crate performs I/O or holds async state.

#![warn(unreachable_pub)]

pub mod context;
pub mod query;
pub mod space;
pub mod template;
pub mod work_item;

// Re-exports for convenience
pub use context::{Context, SpaceRef, User};
pub use query::{work_item_query, FilterExpr, QueryEnvelope};
pub use space::{
    Creator, CreatorAttributes, RelatedLink, Relation, RelationRef, RelationalData, Space,
    SpaceAttributes, SpaceRelationships,
};
pub use template::{ProcessTemplate, TemplateAttributes, DEFAULT_TEMPLATE_ID};
pub use work_item::WorkItem;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
