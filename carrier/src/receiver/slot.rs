//! Single-shot completion slot for acks and answers.
//!
//! This module provides [`CompletionSlot`], the deliver-once primitive that
//! connects a response injected from the outside (an ack or an answer) to
//! the wait that is currently racing a deadline for it.
//!
//! # Lifecycle
//!
//! ```text
//! Wait side:
//!   1. arm() creates a fresh oneshot channel
//!   2. Sender is stored in the slot (superseding any previous one)
//!   3. Receiver is raced against the wait's deadline
//!
//! Response side:
//!   4. deliver(value) takes the stored sender, if any
//!   5. Sender fires exactly once; the waiting task resumes
//!
//! Timeout side:
//!   4'. Deadline elapses first; the receiver is dropped
//!   5'. A later deliver() finds the sender but the send fails harmlessly
//! ```
//!
//! # Re-arming
//!
//! Arming while a previous wait is still outstanding overwrites the stored
//! sender: only the most recently armed wait can ever be satisfied
//! (last-armed-wins). The superseded wait's receiver observes a closed
//! channel and resolves "not completed" at its own deadline.

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Thread-safe single-shot completion slot.
///
/// At most one value is ever delivered to a given waiter. Deliveries with
/// no armed wait, duplicate deliveries, and deliveries whose waiter has
/// already given up are all harmless no-ops, so response injection can stay
/// fire-and-forget.
///
/// # Example
///
/// ```rust,ignore
/// let slot = CompletionSlot::new();
///
/// // Wait side
/// let rx = slot.arm();
///
/// // Response side (possibly another task)
/// slot.deliver(());
///
/// assert!(rx.await.is_ok());
/// ```
pub struct CompletionSlot<T> {
    /// Pending sender for the most recently armed wait.
    ///
    /// `None` when idle (never armed, already delivered, or consumed).
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> CompletionSlot<T> {
    /// Create an idle slot.
    pub fn new() -> Self {
        Self {
            sender: Mutex::new(None),
        }
    }

    /// Arm the slot for a new wait, returning the receiver to race.
    ///
    /// Overwrites any previously stored sender: the superseded wait can no
    /// longer be satisfied and resolves at its own deadline.
    pub fn arm(&self) -> oneshot::Receiver<T> {
        let (tx, rx) = oneshot::channel();
        if self.sender.lock().replace(tx).is_some() {
            tracing::debug!("completion slot re-armed, superseding previous wait");
        }
        rx
    }

    /// Deliver a completion value to the armed wait, if any.
    ///
    /// Returns `true` if a waiter actually received the value. Idempotent:
    /// the slot is disarmed by the first delivery, so later calls return
    /// `false` without effect.
    pub fn deliver(&self, value: T) -> bool {
        match self.sender.lock().take() {
            Some(tx) => match tx.send(value) {
                Ok(()) => true,
                Err(_) => {
                    tracing::warn!("completion delivered after waiter gave up, dropping");
                    false
                }
            },
            None => {
                tracing::debug!("completion delivered with no armed wait, ignoring");
                false
            }
        }
    }

    /// Check whether a wait is currently armed.
    pub fn is_armed(&self) -> bool {
        self.sender.lock().is_some()
    }
}

impl<T> Default for CompletionSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
