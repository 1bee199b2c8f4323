//! Receiver registry: the set of currently reachable endpoints.
//!
//! The registry maps [`ReceiverId`] to per-receiver completion state. It is
//! mutated by the transport's connect/disconnect hooks and read by every
//! fan-out operation, so all mutation happens under a single lock and reads
//! hand out independent snapshots.
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │ ReceiverRegistry                          │
//! │                                           │
//! │  ┌─────────────────────────────────────┐  │
//! │  │ receivers:                          │  │
//! │  │   ReceiverId → Arc<ReceiverState>   │  │
//! │  └─────────────────────────────────────┘  │
//! │  ┌─────────────────────────────────────┐  │
//! │  │ monitor: MembershipMonitor          │  │
//! │  └─────────────────────────────────────┘  │
//! │                                           │
//! │  placeholder: Arc<ReceiverState> (inert)  │
//! └───────────────────────────────────────────┘
//! ```

use crate::receiver::{CompletionSlot, MembershipMonitor, MonitorCallback, ReceiverId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Per-receiver completion state: one ack slot and one answer slot.
///
/// A receiver owns at most one live wait per slot at a time; arming a slot
/// while a wait is outstanding supersedes it (see
/// [`CompletionSlot::arm`]).
///
/// The registry's placeholder instance is *inert*: its slots can be armed
/// and delivered to, but an armed wait observes an already-closed channel
/// and therefore always resolves "not completed", and deliveries go
/// nowhere. This is what makes lookups of unknown ids harmless.
pub struct ReceiverState {
    /// Inert receivers never satisfy a wait.
    inert: bool,
    ack: CompletionSlot<()>,
    answer: CompletionSlot<String>,
}

impl ReceiverState {
    fn connected() -> Self {
        Self {
            inert: false,
            ack: CompletionSlot::new(),
            answer: CompletionSlot::new(),
        }
    }

    fn placeholder() -> Self {
        Self {
            inert: true,
            ack: CompletionSlot::new(),
            answer: CompletionSlot::new(),
        }
    }

    /// Arm the ack slot for a new wait.
    pub fn arm_ack(&self) -> oneshot::Receiver<()> {
        if self.inert {
            closed_receiver()
        } else {
            self.ack.arm()
        }
    }

    /// Arm the answer slot for a new wait.
    pub fn arm_answer(&self) -> oneshot::Receiver<String> {
        if self.inert {
            closed_receiver()
        } else {
            self.answer.arm()
        }
    }

    /// Deliver an acknowledgment. No-op when idle or inert.
    pub fn deliver_ack(&self) {
        if !self.inert {
            self.ack.deliver(());
        }
    }

    /// Deliver a raw answer payload. No-op when idle or inert.
    pub fn deliver_answer(&self, raw: String) {
        if !self.inert {
            self.answer.deliver(raw);
        }
    }
}

/// A receiver that can never complete: waits armed on it run to their
/// deadline and report "not completed".
fn closed_receiver<T>() -> oneshot::Receiver<T> {
    let (tx, rx) = oneshot::channel();
    drop(tx);
    rx
}

struct RegistryInner {
    receivers: HashMap<ReceiverId, Arc<ReceiverState>>,
    monitor: MembershipMonitor,
}

/// Registry of currently reachable receivers.
///
/// Created once per server process (no global singleton) and shared with
/// collaborators via `Arc`. The transport's connection lifecycle calls
/// [`add_receiver`](Self::add_receiver) /
/// [`remove_receiver`](Self::remove_receiver); fan-out operations take id
/// snapshots with [`all_ids`](Self::all_ids) and resolve individual ids
/// with [`resolve`](Self::resolve), which never fails.
///
/// # Example
///
/// ```rust,ignore
/// let registry = Arc::new(ReceiverRegistry::new());
///
/// registry.add_receiver("conn-1");
/// let state = registry.resolve(&"conn-1".into());
/// let rx = state.arm_ack();
///
/// // From the response-injection side:
/// registry.resolve(&"conn-1".into()).deliver_ack();
/// ```
pub struct ReceiverRegistry {
    inner: Mutex<RegistryInner>,
    placeholder: Arc<ReceiverState>,
}

impl ReceiverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                receivers: HashMap::new(),
                monitor: MembershipMonitor::new(),
            }),
            placeholder: Arc::new(ReceiverState::placeholder()),
        }
    }

    /// Register a receiver, replacing any previous state for the same id.
    ///
    /// Re-adding an id orphans waits armed on the old state; they resolve
    /// at their own deadline. Notifies the monitor with the updated id set.
    pub fn add_receiver(&self, id: impl Into<ReceiverId>) {
        let id = id.into();
        let mut inner = self.inner.lock();
        if inner
            .receivers
            .insert(id.clone(), Arc::new(ReceiverState::connected()))
            .is_some()
        {
            tracing::debug!(receiver = %id, "receiver re-registered, previous state orphaned");
        } else {
            tracing::debug!(receiver = %id, "receiver registered");
        }
        Self::notify(&inner);
    }

    /// Remove a receiver if present.
    ///
    /// In-flight waits on the removed id are not forcibly resolved; they
    /// time out naturally. The monitor is notified only when a deletion
    /// actually happened.
    pub fn remove_receiver(&self, id: &ReceiverId) {
        let mut inner = self.inner.lock();
        if inner.receivers.remove(id).is_some() {
            tracing::debug!(receiver = %id, "receiver removed");
            Self::notify(&inner);
        }
    }

    /// Resolve an id to its completion state. Never fails: unknown ids
    /// resolve to the inert placeholder.
    pub fn resolve(&self, id: &ReceiverId) -> Arc<ReceiverState> {
        self.inner
            .lock()
            .receivers
            .get(id)
            .cloned()
            .unwrap_or_else(|| self.placeholder.clone())
    }

    /// Check whether an id is currently registered.
    pub fn contains(&self, id: &ReceiverId) -> bool {
        self.inner.lock().receivers.contains_key(id)
    }

    /// Point-in-time snapshot of all registered ids, sorted.
    ///
    /// The snapshot is an independent copy, safe to iterate while the
    /// registry keeps mutating. Sorting makes fan-out order deterministic
    /// for a given snapshot.
    pub fn all_ids(&self) -> Vec<ReceiverId> {
        let inner = self.inner.lock();
        Self::sorted_ids(&inner)
    }

    /// Number of registered receivers.
    pub fn len(&self) -> usize {
        self.inner.lock().receivers.len()
    }

    /// Whether no receivers are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().receivers.is_empty()
    }

    /// Install the membership observer, replacing any previous one.
    ///
    /// The callback runs synchronously under the registry's mutation lock
    /// with the full sorted id set; it must not call back into the
    /// registry.
    pub fn set_monitor(&self, callback: MonitorCallback) {
        self.inner.lock().monitor.set(callback);
    }

    /// Remove the membership observer.
    pub fn clear_monitor(&self) {
        self.inner.lock().monitor.clear();
    }

    fn notify(inner: &RegistryInner) {
        let ids = Self::sorted_ids(inner);
        inner.monitor.notify(&ids);
    }

    fn sorted_ids(inner: &RegistryInner) -> Vec<ReceiverId> {
        let mut ids: Vec<ReceiverId> = inner.receivers.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for ReceiverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
