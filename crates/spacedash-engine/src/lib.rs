//! spacedash Engine - reactive query composition and transactional workflow
//!
//! The orchestration core behind the dashboard widgets:
//! - Aggregates the current user's work items for the active space with
//!   latest-context-wins semantics
//! - Loads space templates with fallback-to-default on failure
//! - Drives the space-creation transaction (validate, lock, two-phase
//!   commit with a tolerated best-effort phase, redirect)
//! - Tracks every spawned subscription in a ledger drained on teardown
//!
//! Remote services and the UI shell are consumed through the traits in
//! [`services`]; nothing here renders or persists.

#![warn(unreachable_pub)]

pub mod aggregator;
pub mod error;
pub mod ledger;
pub mod services;
pub mod templates;
pub mod transaction;

// Re-exports for convenience
pub use aggregator::{WorkItemAggregator, WORK_ITEM_PAGE_SIZE};
pub use error::TransactionError;
pub use ledger::{SubscriptionHandle, SubscriptionId, SubscriptionLedger};
pub use services::{
    NamespaceService, ServiceError, Severity, SpaceService, StateClassifier, UiGateway,
    WorkItemService,
};
pub use templates::{TemplateLoader, TemplateSelection};
pub use transaction::{allowed_transitions, SpaceDraft, SpaceTransactionEngine, TransactionState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
