//! Space-creation transaction engine
//!
//! Drives a submission through `Idle -> Validating -> Submitting ->
//! {Succeeded, Failed}` with a two-phase remote commit: the create phase is
//! mandatory, the namespace-provisioning phase is best-effort and its
//! failure never aborts the transaction. `can_submit` is the single shared
//! UI lock, written only by transitions here.

use crate::error::TransactionError;
use crate::ledger::SubscriptionLedger;
use crate::services::{NamespaceService, Severity, SpaceService, UiGateway};
use serde_json::json;
use spacedash_core::{ProcessTemplate, Relation, RelationRef, Space, User};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};

/// Submission lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// No submission attempted yet
    Idle,
    /// Guard checks in progress
    Validating,
    /// Remote commit in flight
    Submitting,
    /// Space created; navigation follows
    Succeeded,
    /// Submission failed; the user may retry
    Failed,
}

/// States reachable from `from`
#[must_use]
pub fn allowed_transitions(from: TransactionState) -> Vec<TransactionState> {
    use TransactionState::*;
    match from {
        Idle => vec![Validating],
        Validating => vec![Submitting, Failed],
        Submitting => vec![Succeeded, Failed],
        Succeeded => vec![],
        Failed => vec![Validating],
    }
}

fn validate_transition(
    from: TransactionState,
    to: TransactionState,
) -> Result<(), TransactionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransactionError::IllegalTransition { from, to })
    }
}

/// User input bound to the creation overlay
#[derive(Debug, Clone, Default)]
pub struct SpaceDraft {
    /// Display name as typed
    pub name: String,
    /// Description from the bound input control
    pub description: String,
    /// Visibility flag
    pub is_private: bool,
    /// Selected template, if any
    pub template: Option<ProcessTemplate>,
}

impl SpaceDraft {
    /// Create a draft with the given display name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With a description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With a selected template
    #[inline]
    #[must_use]
    pub fn with_template(mut self, template: ProcessTemplate) -> Self {
        self.template = Some(template);
        self
    }
}

/// The space-creation state machine
pub struct SpaceTransactionEngine {
    spaces: Arc<dyn SpaceService>,
    namespaces: Arc<dyn NamespaceService>,
    ui: Arc<dyn UiGateway>,
    ledger: Arc<SubscriptionLedger>,
    user: Option<User>,
    state_tx: watch::Sender<TransactionState>,
    can_submit: AtomicBool,
}

impl SpaceTransactionEngine {
    /// Create an engine for one hosting component
    ///
    /// The user is the explicitly passed logged-in identity; `None` makes
    /// every submission fail validation without contacting a collaborator.
    #[must_use]
    pub fn new(
        spaces: Arc<dyn SpaceService>,
        namespaces: Arc<dyn NamespaceService>,
        ui: Arc<dyn UiGateway>,
        ledger: Arc<SubscriptionLedger>,
        user: Option<User>,
    ) -> Self {
        let (state_tx, _) = watch::channel(TransactionState::Idle);
        Self {
            spaces,
            namespaces,
            ui,
            ledger,
            user,
            state_tx,
            can_submit: AtomicBool::new(true),
        }
    }

    /// Observable lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> watch::Receiver<TransactionState> {
        self.state_tx.subscribe()
    }

    /// Current state snapshot
    #[inline]
    #[must_use]
    pub fn current_state(&self) -> TransactionState {
        *self.state_tx.borrow()
    }

    /// Whether the submit trigger is enabled
    #[inline]
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.can_submit.load(Ordering::SeqCst)
    }

    /// Submit a draft
    ///
    /// Enters `Validating` before returning, then spawns the commit as a
    /// task registered in the hosting ledger and returns a receiver for the
    /// outcome. A submission already in flight is rejected without side
    /// effects.
    pub fn submit(
        self: &Arc<Self>,
        draft: SpaceDraft,
    ) -> oneshot::Receiver<Result<Space, TransactionError>> {
        let (tx, rx) = oneshot::channel();

        if let Err(err) = self.begin_validating() {
            let _ = tx.send(Err(err));
            return rx;
        }

        let engine = Arc::clone(self);
        let task = tokio::spawn(async move {
            let _ = tx.send(engine.run_submit(draft).await);
        });
        self.ledger.register_task(task);
        rx
    }

    /// Claim the state machine for a new submission
    ///
    /// The in-flight check and the move to `Validating` happen as one
    /// transition, so of two racing submissions exactly one claims it.
    fn begin_validating(&self) -> Result<(), TransactionError> {
        self.transition(TransactionState::Validating)
            .map_err(|err| match err {
                TransactionError::IllegalTransition {
                    from: TransactionState::Validating | TransactionState::Submitting,
                    ..
                } => TransactionError::Busy,
                other => other,
            })
    }

    async fn run_submit(&self, draft: SpaceDraft) -> Result<Space, TransactionError> {
        let user = match self.user.as_ref().filter(|u| u.is_valid()) {
            Some(user) => user.clone(),
            None => {
                self.transition(TransactionState::Failed)?;
                self.ui.notify(
                    &format!("Failed to create \"{}\". Invalid user", draft.name),
                    Severity::Danger,
                );
                return Err(TransactionError::InvalidUser { space: draft.name });
            }
        };

        let space = build_space(&draft, &user);
        self.can_submit.store(false, Ordering::SeqCst);
        self.transition(TransactionState::Submitting)?;

        // Phase 1: mandatory create
        let created = match self.spaces.create_space(&space).await {
            Ok(created) => created,
            Err(err) => {
                self.transition(TransactionState::Failed)?;
                self.can_submit.store(true, Ordering::SeqCst);
                self.ui.notify(
                    &format!("Failed to create \"{}\"", draft.name),
                    Severity::Danger,
                );
                return Err(TransactionError::CreateFailed {
                    space: draft.name,
                    source: err,
                });
            }
        };

        // Phase 2: best-effort provisioning. Failures are logged and
        // swallowed; the created space stays available either way.
        if let Err(err) = self.namespaces.provision_namespace(&created).await {
            tracing::warn!(
                space = %created.attributes.name,
                error = %err,
                "namespace provisioning failed"
            );
        }

        self.transition(TransactionState::Succeeded)?;
        self.redirect(&created, &user);
        Ok(created)
    }

    /// Navigate to the created space and hand the overlay off
    fn redirect(&self, created: &Space, user: &User) {
        let owner = created
            .creator_username()
            .unwrap_or(&user.username)
            .to_string();
        self.ui
            .navigate(&[owner, created.attributes.name.clone()]);
        self.show_add_app_overlay();
        self.hide_add_space_overlay();
    }

    fn hide_add_space_overlay(&self) {
        self.ui.broadcast("showAddSpaceOverlay", json!(false));
        self.ui
            .broadcast("analyticsTracker", json!({"event": "add space closed"}));
    }

    fn show_add_app_overlay(&self) {
        self.ui.broadcast("showAddAppOverlay", json!(true));
        self.ui.broadcast(
            "analyticsTracker",
            json!({"event": "add app opened", "data": {"source": "space-overlay"}}),
        );
    }

    /// Validate and apply in one step under the channel lock
    fn transition(&self, to: TransactionState) -> Result<(), TransactionError> {
        let mut outcome = Ok(());
        self.state_tx
            .send_if_modified(|state| match validate_transition(*state, to) {
                Ok(()) => {
                    *state = to;
                    true
                }
                Err(err) => {
                    outcome = Err(err);
                    false
                }
            });
        outcome
    }
}

impl std::fmt::Debug for SpaceTransactionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceTransactionEngine")
            .field("state", &self.current_state())
            .field("can_submit", &self.can_submit())
            .finish_non_exhaustive()
    }
}

/// Build the transient space stamped for transmission
fn build_space(draft: &SpaceDraft, user: &User) -> Space {
    let mut space = Space::transient();
    space.name = draft.name.clone();
    space.is_private = draft.is_private;
    space.attributes.name = Space::normalize_name(&draft.name);
    space.attributes.description = draft.description.clone();

    // The sentinel template means "no template"; never attach it
    if let Some(template) = draft.template.as_ref().filter(|t| !t.is_sentinel()) {
        space.relationships.space_template = Some(Relation {
            data: RelationRef::new(template.id.as_str(), template.kind.as_str()),
        });
    }

    space.relationships.owned_by.data.id = user.id.clone();
    space
}
