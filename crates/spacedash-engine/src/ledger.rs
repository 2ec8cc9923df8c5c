//! Subscription ledger
//!
//! Tracks every cancellable handle a component creates during its lifetime
//! and releases them atomically on teardown:
//! - Append-only while the owner is alive
//! - `drain` releases each handle exactly once, in any order
//! - Releasing an already-released handle is a no-op
//! - Registering on a drained ledger releases the handle immediately, so a
//!   same-tick completion can never leak past teardown

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use ulid::Ulid;

/// Unique subscription identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub Ulid);

impl SubscriptionId {
    /// Generate new subscription ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Canceller = Box<dyn FnOnce() + Send>;

/// A cancellable handle to an asynchronous operation
///
/// Cloning shares the underlying canceller; whichever clone releases first
/// wins, all later releases are no-ops.
#[derive(Clone)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
    canceller: Arc<Mutex<Option<Canceller>>>,
}

impl SubscriptionHandle {
    /// Wrap an arbitrary cancel action
    #[must_use]
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id: SubscriptionId::new(),
            canceller: Arc::new(Mutex::new(Some(Box::new(cancel)))),
        }
    }

    /// Wrap a spawned task; releasing aborts it
    #[must_use]
    pub fn from_task<T: Send + 'static>(task: JoinHandle<T>) -> Self {
        Self::new(move || task.abort())
    }

    /// Handle identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Run the cancel action; no-op if already released
    pub fn release(&self) {
        if let Some(cancel) = self.canceller.lock().take() {
            cancel();
        }
    }

    /// Whether the handle has been released
    #[inline]
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.canceller.lock().is_none()
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("released", &self.is_released())
            .finish()
    }
}

/// Registry of live subscriptions owned by one component instance
#[derive(Debug, Default)]
pub struct SubscriptionLedger {
    handles: DashMap<SubscriptionId, SubscriptionHandle>,
    drained: AtomicBool,
}

impl SubscriptionLedger {
    /// Create an empty ledger
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle
    ///
    /// If the ledger was already drained the handle is released on the spot
    /// instead of being stored.
    pub fn register(&self, handle: SubscriptionHandle) -> SubscriptionId {
        let id = handle.id();
        if self.drained.load(Ordering::SeqCst) {
            handle.release();
            return id;
        }
        self.handles.insert(id, handle);
        // A drain may have raced the insert above
        if self.drained.load(Ordering::SeqCst) {
            if let Some((_, handle)) = self.handles.remove(&id) {
                handle.release();
            }
        }
        id
    }

    /// Register a spawned task; draining aborts it
    pub fn register_task<T: Send + 'static>(&self, task: JoinHandle<T>) -> SubscriptionId {
        self.register(SubscriptionHandle::from_task(task))
    }

    /// Release every registered handle, in any order
    pub fn drain(&self) {
        self.drained.store(true, Ordering::SeqCst);
        let ids: Vec<SubscriptionId> = self.handles.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if let Some((_, handle)) = self.handles.remove(&id) {
                handle.release();
            }
        }
    }

    /// Whether the ledger has been drained
    #[inline]
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.drained.load(Ordering::SeqCst)
    }

    /// Number of tracked handles
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no handles are tracked
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
